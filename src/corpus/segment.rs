//! Stored segment format used by the vector index
//!
//! Every verse is embedded as a single line of the form
//! `[TAG] BookName C:V <Title> text`. The title is optional, and so is the
//! tag when parsing (older indexes were built without it).

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use super::Verse;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentParseError {
    #[error("Segment has no chapter:verse reference: {0}")]
    MissingReference(String),

    #[error("Invalid chapter or verse number in segment: {0}")]
    InvalidNumber(String),
}

/// A verse reconstructed from its stored text representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseSegment {
    pub translation: String,
    pub book_name: String,
    pub chapter: u32,
    pub verse: u32,
    pub title: Option<String>,
    pub text: String,
}

fn segment_regex() -> &'static Regex {
    static SEGMENT: OnceLock<Regex> = OnceLock::new();
    SEGMENT.get_or_init(|| {
        Regex::new(
            r"(?s)^\s*(?:\[(?P<tag>[^\]]+)\]\s*)?(?P<book>.+?)\s+(?P<chapter>\d+):(?P<verse>\d+)(?:\s*<(?P<title>[^>]*)>)?\s*(?P<text>.*)$",
        )
        .expect("segment regex is valid")
    })
}

impl VerseSegment {
    pub fn from_verse(verse: &Verse) -> Self {
        Self {
            translation: verse.translation.clone(),
            book_name: verse.book_name.clone(),
            chapter: verse.chapter,
            verse: verse.verse,
            title: verse.title.clone(),
            text: verse.text.clone(),
        }
    }

    /// Parse a stored segment back into structured form
    ///
    /// `default_translation` is used when the segment carries no `[TAG]`.
    pub fn parse(raw: &str, default_translation: &str) -> Result<Self, SegmentParseError> {
        let caps = segment_regex()
            .captures(raw)
            .ok_or_else(|| SegmentParseError::MissingReference(raw.to_string()))?;

        let chapter = caps["chapter"]
            .parse::<u32>()
            .map_err(|_| SegmentParseError::InvalidNumber(raw.to_string()))?;
        let verse = caps["verse"]
            .parse::<u32>()
            .map_err(|_| SegmentParseError::InvalidNumber(raw.to_string()))?;

        let translation = caps
            .name("tag")
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| default_translation.to_string());

        let title = caps
            .name("title")
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            translation,
            book_name: caps["book"].trim().to_string(),
            chapter,
            verse,
            title,
            text: caps["text"].trim().to_string(),
        })
    }
}

impl fmt::Display for VerseSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}:{}",
            self.translation, self.book_name, self.chapter, self.verse
        )?;
        if let Some(title) = &self.title {
            if !title.is_empty() {
                write!(f, " <{}>", title)?;
            }
        }
        if !self.text.is_empty() {
            write!(f, " {}", self.text)?;
        }
        Ok(())
    }
}
