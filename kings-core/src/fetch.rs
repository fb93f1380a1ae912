//! Chapter text retrieval from the Sefaria text repository.
//!
//! The fetcher is behind the [`TextSource`] trait so the chapter store can
//! be driven by a scripted source in tests. A missing chapter is a distinct
//! outcome, not an error: the store returns empty text for it and retries
//! the fetch on a later run.

use crate::chapter::ChapterKey;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const API_BASE: &str = "https://www.sefaria.org/api/v3/texts";

/// Errors from the text-fetch collaborator. All of these are fatal for the
/// run; only [`FetchOutcome::NotFound`] is recoverable.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Text API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed text API response: {0}")]
    Malformed(String),
}

/// Result of fetching one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The chapter's verses, in canonical order. May contain markup entities.
    Found(Vec<String>),
    /// The chapter does not exist upstream.
    NotFound,
}

/// A source of raw chapter text.
#[async_trait]
pub trait TextSource {
    async fn fetch(&self, key: &ChapterKey) -> Result<FetchOutcome, FetchError>;
}

/// Client for the Sefaria v3 texts API.
#[derive(Clone)]
pub struct SefariaClient {
    client: reqwest::Client,
}

impl SefariaClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .connect_timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for SefariaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextSource for SefariaClient {
    async fn fetch(&self, key: &ChapterKey) -> Result<FetchOutcome, FetchError> {
        let url = format!(
            "{API_BASE}/{}%20{}?version=primary&return_format=text_only",
            key.book.api_token(),
            key.chapter
        );
        debug!(%key, %url, "fetching chapter text");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Ok(FetchOutcome::NotFound);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status,
                message: body,
            });
        }

        let texts: TextsResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        let version = texts
            .versions
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Malformed("response contained no versions".to_string()))?;

        Ok(FetchOutcome::Found(version.text))
    }
}

#[derive(Debug, Deserialize)]
struct TextsResponse {
    #[serde(default)]
    versions: Vec<TextVersion>,
}

#[derive(Debug, Deserialize)]
struct TextVersion {
    #[serde(default)]
    text: Vec<String>,
}

/// Decode the HTML entities that occur in repository verse text.
///
/// Handles the five core named entities, the whitespace entities Sefaria
/// emits, and numeric references (`&#39;`, `&#x27;`). Unrecognized
/// sequences pass through unchanged.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        // An entity is '&' + up to ~8 chars + ';'.
        let end = rest[1..].find(';').map(|i| i + 1);
        match end {
            Some(end) if end <= 10 => {
                if let Some(decoded) = decode_entity(&rest[1..end]) {
                    out.push(decoded);
                    rest = &rest[end + 1..];
                } else {
                    out.push('&');
                    rest = &rest[1..];
                }
            }
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = entity.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "thinsp" => Some('\u{2009}'),
        _ => None,
    }
}
