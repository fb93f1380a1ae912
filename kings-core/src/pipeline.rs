//! The batch pipeline: fetch, summarize, and aggregate chapters in order.
//!
//! Processing is strictly sequential in increasing chapter order. Any
//! failure aborts the run carrying the failing chapter key; recovery is a
//! rerun, which is cheap because both stores short-circuit on cache hits.

use crate::aggregate::{AggregateReport, EntityAggregator};
use crate::chapter::{Book, ChapterKey};
use crate::store::{ChapterStore, StoreError, SummaryStore};
use crate::summary::ChapterSummary;
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::info;

/// A failure in processing one chapter, carrying which chapter it was.
#[derive(Debug, Error)]
#[error("{key}: {source}")]
pub struct PipelineError {
    key: ChapterKey,
    #[source]
    source: StoreError,
}

impl PipelineError {
    pub fn key(&self) -> ChapterKey {
        self.key
    }
}

/// Everything the report needs: the ordered summaries and the finalized
/// cross-reference.
#[derive(Debug)]
pub struct PipelineOutput {
    pub summaries: Vec<ChapterSummary>,
    pub aggregate: AggregateReport,
}

/// The chapter-processing pipeline.
pub struct Pipeline {
    chapters: ChapterStore,
    summaries: SummaryStore,
}

impl Pipeline {
    pub fn new(chapters: ChapterStore, summaries: SummaryStore) -> Self {
        Self {
            chapters,
            summaries,
        }
    }

    /// Process the given chapters of a book in increasing order.
    ///
    /// A chapter whose text comes back empty (missing upstream) is skipped:
    /// it is neither summarized nor aggregated, and contributes nothing to
    /// the report.
    pub async fn run(
        &self,
        book: Book,
        chapters: RangeInclusive<u32>,
    ) -> Result<PipelineOutput, PipelineError> {
        let mut aggregator = EntityAggregator::new();
        let mut summaries = Vec::new();

        for chapter in chapters {
            let key = ChapterKey::new(book, chapter);

            let text = self
                .chapters
                .get(&key)
                .await
                .map_err(|source| PipelineError { key, source })?;

            if text.is_empty() {
                info!(%key, "no text for chapter, skipping");
                continue;
            }

            let summary = self
                .summaries
                .get(&key, &text)
                .await
                .map_err(|source| PipelineError { key, source })?;

            aggregator.absorb(&summary);
            summaries.push(summary);
        }

        info!(chapters = summaries.len(), "pipeline run complete");
        Ok(PipelineOutput {
            summaries,
            aggregate: aggregator.finalize(),
        })
    }
}
