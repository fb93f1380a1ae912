//! Book of Kings summarization pipeline.
//!
//! This crate provides:
//! - Idempotent file-backed caching of chapter text and structured summaries
//! - A Sefaria text-repository client and a Gemini-backed summarizer
//! - Cross-chapter aggregation of characters and places into a
//!   deduplicated, sorted cross-reference
//! - Markdown report rendering
//!
//! # Quick Start
//!
//! ```ignore
//! use kings_core::{
//!     Book, CacheDir, ChapterStore, GeminiSummarizer, Pipeline, ReportAssembler,
//!     SefariaClient, SummaryStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = CacheDir::open("data")?;
//!     let pipeline = Pipeline::new(
//!         ChapterStore::new(cache.clone(), Box::new(SefariaClient::new())),
//!         SummaryStore::new(cache, Box::new(GeminiSummarizer::from_env()?)),
//!     );
//!
//!     let output = pipeline.run(Book::FirstKings, 1..=8).await?;
//!     let report = ReportAssembler::new().assemble(&output.summaries, &output.aggregate);
//!     std::fs::write("kings_summary.md", report)?;
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod analyzer;
pub mod cache;
pub mod chapter;
pub mod fetch;
pub mod hebrew;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod summary;

// Primary public API
pub use aggregate::{AggregateReport, EntityAggregator, MergedEntity};
pub use analyzer::{GeminiSummarizer, SummarizeError, Summarizer};
pub use cache::{CacheDir, CacheError};
pub use chapter::{Book, ChapterKey, ChapterText, ParseBookError};
pub use fetch::{FetchError, FetchOutcome, SefariaClient, TextSource};
pub use pipeline::{Pipeline, PipelineError, PipelineOutput};
pub use report::ReportAssembler;
pub use store::{ChapterStore, StoreError, SummaryStore};
pub use summary::{ChapterSummary, EntityMention};
