//! Page-number pagination for post listings.

use serde::Serialize;

/// Number of posts on every feed page.
pub const PAGE_SIZE: u64 = 10;

/// One page of a filtered, ordered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number actually served (after clamping).
    pub number: u64,
    /// Total number of pages; at least 1.
    pub num_pages: u64,
    /// Number of items matching the filter across all pages.
    pub total_count: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Build a page from its items and the listing totals.
    #[must_use]
    pub const fn new(items: Vec<T>, number: u64, num_pages: u64, total_count: u64) -> Self {
        Self {
            items,
            number,
            num_pages,
            total_count,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }

    /// Convert the items while keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total_count: self.total_count,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Number of pages needed for `total_count` items. An empty listing still has one page.
#[must_use]
pub const fn num_pages(total_count: u64, page_size: u64) -> u64 {
    if total_count == 0 {
        1
    } else {
        total_count.div_ceil(page_size)
    }
}

/// Resolve a requested page number against the number of pages.
///
/// Missing or zero requests get the first page; requests past the end are
/// clamped to the last page.
#[must_use]
pub fn resolve_page_number(requested: Option<u64>, num_pages: u64) -> u64 {
    requested.unwrap_or(1).clamp(1, num_pages.max(1))
}
