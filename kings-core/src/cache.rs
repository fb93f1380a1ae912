//! File-backed caches for chapter text and chapter summaries.
//!
//! Cache file names are deterministic functions of the chapter key, so a
//! rerun with the same identifiers resolves to the same files. Lookup and
//! store are separate operations; composing them (fetch on miss, persist on
//! success) is the job of the stores in [`crate::store`].

use crate::chapter::{ChapterKey, ChapterText};
use crate::summary::ChapterSummary;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors from cache operations.
///
/// A cache file that exists but cannot be read or parsed is surfaced as an
/// error rather than treated as a miss, so corruption is loud.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt summary cache file: {0}")]
    Json(#[from] serde_json::Error),
}

/// The on-disk cache location, one file per (book, chapter) per kind.
#[derive(Debug, Clone)]
pub struct CacheDir {
    dir: PathBuf,
}

impl CacheDir {
    /// Open the cache directory, creating it if absent.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path of the raw-text cache file for a chapter.
    pub fn text_path(&self, key: &ChapterKey) -> PathBuf {
        self.dir
            .join(format!("{}_{}.text.txt", key.book.api_token(), key.chapter))
    }

    /// Path of the summary cache file for a chapter.
    pub fn summary_path(&self, key: &ChapterKey) -> PathBuf {
        self.dir.join(format!(
            "{}_{}.summary.json",
            key.book.api_token(),
            key.chapter
        ))
    }

    /// Look up cached chapter text. `None` means no cache entry exists.
    pub async fn lookup_text(&self, key: &ChapterKey) -> Result<Option<ChapterText>, CacheError> {
        let path = self.text_path(key);
        match fs::read_to_string(&path).await {
            Ok(joined) => Ok(Some(ChapterText::from_joined(&joined))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist chapter text, newline-joined.
    pub async fn store_text(&self, key: &ChapterKey, text: &ChapterText) -> Result<(), CacheError> {
        let path = self.text_path(key);
        debug!(%key, path = %path.display(), "saving chapter text");
        let mut joined = text.as_text();
        joined.push('\n');
        fs::write(&path, joined).await?;
        Ok(())
    }

    /// Look up a cached, schema-valid summary. `None` means no cache entry.
    pub async fn lookup_summary(
        &self,
        key: &ChapterKey,
    ) -> Result<Option<ChapterSummary>, CacheError> {
        let path = self.summary_path(key);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a validated summary as pretty-printed UTF-8 JSON.
    pub async fn store_summary(
        &self,
        key: &ChapterKey,
        summary: &ChapterSummary,
    ) -> Result<(), CacheError> {
        let path = self.summary_path(key);
        debug!(%key, path = %path.display(), "saving chapter summary");
        let content = serde_json::to_string_pretty(summary)?;
        fs::write(&path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapter::Book;
    use crate::summary::EntityMention;
    use tempfile::TempDir;

    fn sample_summary() -> ChapterSummary {
        ChapterSummary {
            chapter: "מלכים א פרק א".to_string(),
            synopsis: "דוד המלך זקן".to_string(),
            characters: vec![EntityMention {
                name: "דוד".to_string(),
                description: "מלך ישראל".to_string(),
            }],
            places: vec![],
        }
    }

    #[test]
    fn test_paths_are_deterministic() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let cache = CacheDir::open(temp.path()).unwrap();
        let key = ChapterKey::new(Book::FirstKings, 3);

        assert!(cache
            .text_path(&key)
            .to_string_lossy()
            .ends_with("I_Kings_3.text.txt"));
        assert!(cache
            .summary_path(&key)
            .to_string_lossy()
            .ends_with("I_Kings_3.summary.json"));
        assert_eq!(cache.text_path(&key), cache.text_path(&key));
    }

    #[test]
    fn test_open_creates_directory() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let nested = temp.path().join("data");
        assert!(!nested.exists());

        CacheDir::open(&nested).unwrap();
        assert!(nested.exists());
    }

    #[tokio::test]
    async fn test_text_lookup_miss_then_hit() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let cache = CacheDir::open(temp.path()).unwrap();
        let key = ChapterKey::new(Book::SecondKings, 1);

        assert!(cache.lookup_text(&key).await.unwrap().is_none());

        let text = ChapterText::new(vec!["פסוק א".to_string(), "פסוק ב".to_string()]);
        cache.store_text(&key, &text).await.unwrap();

        let loaded = cache.lookup_text(&key).await.unwrap().unwrap();
        assert_eq!(loaded, text);
    }

    #[tokio::test]
    async fn test_summary_lookup_miss_then_hit() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let cache = CacheDir::open(temp.path()).unwrap();
        let key = ChapterKey::new(Book::FirstKings, 1);

        assert!(cache.lookup_summary(&key).await.unwrap().is_none());

        let summary = sample_summary();
        cache.store_summary(&key, &summary).await.unwrap();

        let loaded = cache.lookup_summary(&key).await.unwrap().unwrap();
        assert_eq!(loaded, summary);
    }

    #[tokio::test]
    async fn test_summary_file_preserves_hebrew() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let cache = CacheDir::open(temp.path()).unwrap();
        let key = ChapterKey::new(Book::FirstKings, 1);

        cache.store_summary(&key, &sample_summary()).await.unwrap();

        let raw = std::fs::read_to_string(cache.summary_path(&key)).unwrap();
        assert!(raw.contains("מלכים א פרק א"));
        assert!(!raw.contains("\\u"));
    }

    #[tokio::test]
    async fn test_corrupt_summary_is_an_error_not_a_miss() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let cache = CacheDir::open(temp.path()).unwrap();
        let key = ChapterKey::new(Book::FirstKings, 2);

        std::fs::write(cache.summary_path(&key), "{not json").unwrap();

        assert!(matches!(
            cache.lookup_summary(&key).await,
            Err(CacheError::Json(_))
        ));
    }
}
