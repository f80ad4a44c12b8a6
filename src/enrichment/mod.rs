//! Plan-day enrichment sources: scripture text and quotations.
//!
//! Both lookups are best-effort. Implementations absorb every failure into a
//! fallback value and never return an error to the caller, so a broken
//! upstream degrades a plan instead of failing it.

pub mod quotes;
pub mod scripture;

pub use quotes::{Quote, QuotableClient};
pub use scripture::{BibleApiClient, VERSE_ERROR, VERSE_NOT_FOUND, normalize_verse_text};

use async_trait::async_trait;

/// Resolves a scripture reference such as `"Proverbs 21:5"` to verse text.
#[async_trait]
pub trait ScriptureSource: Send + Sync {
    /// Always returns display text: the verse, or a fallback message.
    async fn lookup(&self, reference: &str) -> String;
}

/// Finds a quotation matching a space-separated tag query.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// `None` when nothing matched or the upstream failed.
    async fn search(&self, query: &str) -> Option<Quote>;
}

/// Internal failure of an enrichment request, logged and then absorbed.
#[derive(Debug, thiserror::Error)]
pub(crate) enum LookupError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
