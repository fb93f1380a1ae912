//! Idempotent chapter-text and summary stores.
//!
//! Each store composes a cache lookup with its external collaborator: a hit
//! short-circuits the collaborator entirely, a miss invokes it and persists
//! the result before returning. Getting the same key twice therefore
//! triggers the collaborator at most once.

use crate::analyzer::{build_prompt, system_instruction, SummarizeError, Summarizer};
use crate::cache::{CacheDir, CacheError};
use crate::chapter::{ChapterKey, ChapterText};
use crate::fetch::{decode_entities, FetchError, FetchOutcome, TextSource};
use crate::summary::{response_schema, ChapterSummary};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the stores. Everything except an upstream not-found (which is
/// not an error) aborts the run.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Summarize(#[from] SummarizeError),

    #[error("Summary did not match the expected schema: {0}")]
    Schema(#[source] serde_json::Error),
}

/// File-backed cache of raw chapter text, fetching on miss.
pub struct ChapterStore {
    cache: CacheDir,
    source: Box<dyn TextSource + Send + Sync>,
}

impl ChapterStore {
    pub fn new(cache: CacheDir, source: Box<dyn TextSource + Send + Sync>) -> Self {
        Self { cache, source }
    }

    /// Get the chapter's text, from cache if present.
    ///
    /// A chapter missing upstream yields empty text and leaves no cache
    /// entry, so a later run retries the fetch.
    pub async fn get(&self, key: &ChapterKey) -> Result<ChapterText, StoreError> {
        if let Some(text) = self.cache.lookup_text(key).await? {
            debug!(%key, "chapter text already downloaded");
            return Ok(text);
        }

        info!(%key, "downloading chapter text");
        match self.source.fetch(key).await? {
            FetchOutcome::NotFound => {
                warn!(%key, "chapter not found upstream");
                Ok(ChapterText::empty())
            }
            FetchOutcome::Found(verses) => {
                let decoded: Vec<String> =
                    verses.iter().map(|verse| decode_entities(verse)).collect();
                let text = ChapterText::new(decoded);
                info!(%key, verses = text.verse_count(), "downloaded chapter");
                self.cache.store_text(key, &text).await?;
                Ok(text)
            }
        }
    }
}

/// File-backed cache of structured summaries, summarizing on miss.
pub struct SummaryStore {
    cache: CacheDir,
    summarizer: Box<dyn Summarizer + Send + Sync>,
}

impl SummaryStore {
    pub fn new(cache: CacheDir, summarizer: Box<dyn Summarizer + Send + Sync>) -> Self {
        Self { cache, summarizer }
    }

    /// Get the chapter's summary, from cache if present.
    ///
    /// On a miss the collaborator's output must parse as a
    /// [`ChapterSummary`]; malformed output is a [`StoreError::Schema`] and
    /// nothing is persisted for the chapter.
    pub async fn get(
        &self,
        key: &ChapterKey,
        text: &ChapterText,
    ) -> Result<ChapterSummary, StoreError> {
        if let Some(summary) = self.cache.lookup_summary(key).await? {
            debug!(%key, "chapter already summarized");
            return Ok(summary);
        }

        info!(%key, "sending chapter for summarization");
        let prompt = build_prompt(key, text);
        let body = self
            .summarizer
            .summarize(system_instruction(), &prompt, response_schema())
            .await?;

        let summary: ChapterSummary = serde_json::from_str(&body).map_err(StoreError::Schema)?;
        self.cache.store_summary(key, &summary).await?;
        info!(%key, "summarization complete");
        Ok(summary)
    }
}
