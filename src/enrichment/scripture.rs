//! Scripture lookup against a bible-api.com compatible endpoint.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{LookupError, ScriptureSource};
use crate::config::ExternalApisConfig;

/// Returned when the endpoint answers with a non-success status.
pub const VERSE_NOT_FOUND: &str = "Bible verse not found";
/// Returned when the request or response decoding fails.
pub const VERSE_ERROR: &str = "Error retrieving Bible verse";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Deserialize)]
struct BibleResponse {
    #[serde(default)]
    verses: Vec<BibleVerse>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BibleVerse {
    #[serde(default)]
    text: String,
}

/// Client for `GET {base}{reference}?translation={translation}`.
#[derive(Clone)]
pub struct BibleApiClient {
    client: reqwest::Client,
    base_url: String,
    translation: String,
}

impl BibleApiClient {
    pub fn new(client: reqwest::Client, config: &ExternalApisConfig) -> Self {
        Self {
            client,
            base_url: config.bible_api.clone(),
            translation: config.bible_translation.clone(),
        }
    }

    /// Build the lookup URL with the reference as one encoded path segment.
    fn lookup_url(&self, reference: &str) -> Result<Url, LookupError> {
        let invalid = |reason: String| LookupError::InvalidUrl {
            url: self.base_url.clone(),
            reason,
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(reference);
        url.query_pairs_mut()
            .append_pair("translation", &self.translation);
        Ok(url)
    }

    async fn fetch(&self, reference: &str) -> Result<Option<String>, LookupError> {
        let url = self.lookup_url(reference)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body = response.text().await?;
        let parsed: BibleResponse = serde_json::from_str(&body)?;

        if !parsed.verses.is_empty() {
            let joined = parsed
                .verses
                .iter()
                .map(|v| v.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            return Ok(Some(joined));
        }

        Ok(parsed.text)
    }
}

#[async_trait]
impl ScriptureSource for BibleApiClient {
    async fn lookup(&self, reference: &str) -> String {
        match self.fetch(reference).await {
            Ok(Some(raw)) => normalize_verse_text(&raw),
            Ok(None) => {
                debug!(reference, "Scripture response had no verse text");
                VERSE_NOT_FOUND.to_string()
            }
            Err(LookupError::Status(status)) => {
                debug!(reference, status = status.as_u16(), "Scripture reference not found");
                VERSE_NOT_FOUND.to_string()
            }
            Err(e) => {
                warn!(reference, error = %e, "Scripture lookup failed");
                VERSE_ERROR.to_string()
            }
        }
    }
}

/// Clean verse text for display.
///
/// Escaped (`\n`, `\t`, `\r`) and literal line breaks and tabs become spaces,
/// escaped quotes, apostrophes and backslashes are unescaped, whitespace runs
/// collapse to one space and the ends are trimmed.
///
/// Escapes are decoded once, so applying this again is a no-op unless the
/// result still holds an escape sequence: `\\n` becomes `\n`, which a
/// second pass turns into a space.
pub fn normalize_verse_text(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some('n' | 't' | 'r') => {
                    chars.next();
                    unescaped.push(' ');
                }
                Some(&escaped @ ('"' | '\'' | '\\')) => {
                    chars.next();
                    unescaped.push(escaped);
                }
                _ => unescaped.push('\\'),
            },
            '\n' | '\t' | '\r' => unescaped.push(' '),
            other => unescaped.push(other),
        }
    }

    WHITESPACE_RUN
        .replace_all(&unescaped, " ")
        .trim()
        .to_string()
}
