//! Chapter identity: which book, which chapter, and the raw chapter text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A book of Kings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Book {
    /// I Kings (מלכים א).
    FirstKings,
    /// II Kings (מלכים ב).
    SecondKings,
}

impl Book {
    /// The token used in the text-repository API and in cache file names.
    pub fn api_token(&self) -> &'static str {
        match self {
            Book::FirstKings => "I_Kings",
            Book::SecondKings => "II_Kings",
        }
    }

    /// The Hebrew name of the book, as rendered into prompts.
    pub fn hebrew_name(&self) -> &'static str {
        match self {
            Book::FirstKings => "מלכים א",
            Book::SecondKings => "מלכים ב",
        }
    }

    /// The English display name.
    pub fn english_name(&self) -> &'static str {
        match self {
            Book::FirstKings => "I Kings",
            Book::SecondKings => "II Kings",
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_token())
    }
}

/// Error parsing a book name from the command line.
#[derive(Debug, Error)]
#[error("unknown book '{0}' (expected I_Kings or II_Kings)")]
pub struct ParseBookError(String);

impl FromStr for Book {
    type Err = ParseBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "i_kings" | "1" | "i" | "1_kings" => Ok(Book::FirstKings),
            "ii_kings" | "2" | "ii" | "2_kings" => Ok(Book::SecondKings),
            _ => Err(ParseBookError(s.to_string())),
        }
    }
}

/// Identity of a single chapter: the caching and lookup key.
///
/// `chapter` is 1-based; chapter 0 does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterKey {
    pub book: Book,
    pub chapter: u32,
}

impl ChapterKey {
    pub fn new(book: Book, chapter: u32) -> Self {
        Self { book, chapter }
    }
}

impl fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book.api_token(), self.chapter)
    }
}

/// The raw text of one chapter: an ordered sequence of verses.
///
/// Persisted newline-joined; once a chapter is cached its text is read-only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChapterText {
    verses: Vec<String>,
}

impl ChapterText {
    pub fn new(verses: Vec<String>) -> Self {
        Self { verses }
    }

    /// The empty text returned for a chapter that does not exist upstream.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn verse_count(&self) -> usize {
        self.verses.len()
    }

    pub fn verses(&self) -> &[String] {
        &self.verses
    }

    /// The chapter as a single newline-joined blob, as embedded in prompts.
    pub fn as_text(&self) -> String {
        self.verses.join("\n")
    }

    /// Rebuild from the newline-joined on-disk form.
    pub fn from_joined(joined: &str) -> Self {
        Self {
            verses: joined.lines().map(str::to_string).collect(),
        }
    }
}
