//! Single-slot page cache with a passive TTL.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

/// Default time a cached page stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
struct CachedPage<T> {
    value: T,
    stored_at: Instant,
}

/// Process-wide cache holding one rendered page.
///
/// Readers get the stored value until the TTL runs out or [`PageCache::clear`]
/// is called. Nothing else invalidates it. Clones share the same slot.
#[derive(Debug, Clone)]
pub struct PageCache<T> {
    slot: Arc<RwLock<Option<CachedPage<T>>>>,
    ttl: Duration,
}

impl<T: Clone> PageCache<T> {
    /// Create an empty cache.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value, if one is stored and still fresh.
    pub async fn get(&self) -> Option<T> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some(cached) if cached.stored_at.elapsed() < self.ttl => {
                tracing::debug!("Page cache hit");
                Some(cached.value.clone())
            }
            _ => {
                tracing::debug!("Page cache miss");
                None
            }
        }
    }

    /// Store a value, replacing whatever was there.
    pub async fn set(&self, value: T) {
        *self.slot.write().await = Some(CachedPage {
            value,
            stored_at: Instant::now(),
        });
    }

    /// Drop the cached value regardless of its remaining TTL.
    pub async fn clear(&self) {
        *self.slot.write().await = None;
        tracing::info!("Page cache cleared");
    }
}

impl<T: Clone> Default for PageCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
