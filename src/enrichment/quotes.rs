//! Quotation search against a quotable.io compatible endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{LookupError, QuoteSource};
use crate::config::ExternalApisConfig;

/// A single quotation and its attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
}

#[derive(Debug, Deserialize)]
struct QuoteSearchResponse {
    #[serde(default)]
    results: Vec<QuoteResult>,
}

/// Upstream entries may carry `null` for either field.
#[derive(Debug, Deserialize)]
struct QuoteResult {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    author: Option<String>,
}

impl From<QuoteResult> for Quote {
    fn from(result: QuoteResult) -> Self {
        Self {
            content: result.content.unwrap_or_default(),
            author: result.author.unwrap_or_default(),
        }
    }
}

/// Client that appends the tag query to a fixed search URL.
#[derive(Clone)]
pub struct QuotableClient {
    client: reqwest::Client,
    search_url: String,
}

impl QuotableClient {
    pub fn new(client: reqwest::Client, config: &ExternalApisConfig) -> Self {
        Self {
            client,
            search_url: config.quote_api.clone(),
        }
    }

    async fn fetch(&self, query: &str) -> Result<Option<Quote>, LookupError> {
        // The query is appended as-is; the URL parser escapes spaces.
        let url = format!("{}{}", self.search_url, query);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body = response.text().await?;
        let parsed: QuoteSearchResponse = serde_json::from_str(&body)?;
        Ok(parsed.results.into_iter().next().map(Quote::from))
    }
}

#[async_trait]
impl QuoteSource for QuotableClient {
    async fn search(&self, query: &str) -> Option<Quote> {
        match self.fetch(query).await {
            Ok(Some(quote)) => Some(quote),
            Ok(None) => {
                debug!(query, "No quote matched");
                None
            }
            Err(e) => {
                warn!(query, error = %e, "Quote search failed");
                None
            }
        }
    }
}
