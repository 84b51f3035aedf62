//! Banned-word filter for post text.

use quill_common::{AppError, AppResult};
use regex::Regex;

/// Outcome of checking post text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationResult {
    Ok,
    /// The text contains this banned word.
    Rejected(String),
}

/// Rejects text containing a banned word as a standalone word.
///
/// Matching is case-insensitive and Unicode-aware; a banned word embedded
/// inside a longer word does not match.
#[derive(Debug, Clone)]
pub struct ModerationFilter {
    words: Vec<String>,
    pattern: Option<Regex>,
}

impl ModerationFilter {
    /// Compile a filter for the given words. Blank entries are ignored.
    pub fn new<I, S>(words: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        let pattern = if words.is_empty() {
            None
        } else {
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            let regex = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
                .map_err(|e| AppError::Config(format!("Invalid banned word list: {e}")))?;
            Some(regex)
        };

        Ok(Self { words, pattern })
    }

    /// The configured words.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Check post text against the banned words.
    #[must_use]
    pub fn check_post_text(&self, text: &str) -> ModerationResult {
        let Some(found) = self.pattern.as_ref().and_then(|p| p.find(text)) else {
            return ModerationResult::Ok;
        };

        let matched = found.as_str().to_lowercase();
        let word = self
            .words
            .iter()
            .find(|w| w.to_lowercase() == matched)
            .cloned()
            .unwrap_or_else(|| found.as_str().to_string());

        ModerationResult::Rejected(word)
    }

    /// Like [`Self::check_post_text`], but a rejection becomes a validation error on `text`.
    pub fn validate_post_text(&self, text: &str) -> AppResult<()> {
        match self.check_post_text(text) {
            ModerationResult::Ok => Ok(()),
            ModerationResult::Rejected(word) => Err(AppError::validation(
                "text",
                format!("Word \"{word}\" is not allowed in post text"),
            )),
        }
    }
}
