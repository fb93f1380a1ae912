//! Chapter summarization via the generative text service.
//!
//! The collaborator is behind the [`Summarizer`] trait (returning the raw
//! JSON body text) so the summary store can be driven by scripted output in
//! tests. Prompt assembly embeds the Hebrew book name, the chapter number
//! in traditional Hebrew numerals, a response example, and the chapter text.

use crate::chapter::{ChapterKey, ChapterText};
use crate::hebrew::int_to_gematria;
use async_trait::async_trait;
use gemini::Gemini;
use thiserror::Error;
use tracing::debug;

/// Errors from the summarization collaborator. Transport and service
/// failures abort the run; malformed output is handled by the summary store.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Gemini API error: {0}")]
    Api(#[from] gemini::Error),

    #[error("Summarizer returned an empty response")]
    Empty,
}

/// A collaborator that turns a prompt into structured-summary JSON text.
#[async_trait]
pub trait Summarizer {
    async fn summarize(
        &self,
        system_instruction: &str,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<String, SummarizeError>;
}

/// Summarizer backed by the Gemini `generateContent` API.
pub struct GeminiSummarizer {
    client: Gemini,
}

impl GeminiSummarizer {
    pub fn new(client: Gemini) -> Self {
        Self { client }
    }

    /// Create a summarizer from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, SummarizeError> {
        Ok(Self::new(Gemini::from_env()?))
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(
        &self,
        system_instruction: &str,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<String, SummarizeError> {
        let request = gemini::Request::new(prompt)
            .with_system_instruction(system_instruction)
            .with_response_schema(schema);

        let response = self.client.generate(request).await?;
        debug!(
            prompt_tokens = response.usage.prompt_tokens,
            response_tokens = response.usage.response_tokens,
            "summarization complete"
        );

        if response.text.is_empty() {
            return Err(SummarizeError::Empty);
        }
        Ok(response.text)
    }
}

/// The fixed system instruction for chapter summarization.
pub fn system_instruction() -> &'static str {
    include_str!("prompts/system_instruction.txt")
}

/// Build the summarization prompt for one chapter.
pub fn build_prompt(key: &ChapterKey, text: &ChapterText) -> String {
    include_str!("prompts/summarize_chapter.txt")
        .replace("{BOOK_NAME}", key.book.hebrew_name())
        .replace("{CHAPTER}", &int_to_gematria(key.chapter))
        .replace(
            "{JSON_SAMPLE}",
            include_str!("prompts/response_sample.json").trim_end(),
        )
        .replace("{TEXT}", &text.as_text())
}
