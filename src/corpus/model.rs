//! Verse, book and testament types shared by the corpus and retrieval layers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Testament a book belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Testament {
    /// Old Testament (numbered 1 in corpus files)
    #[serde(rename = "OT")]
    Old,
    /// New Testament (numbered 2 in corpus files)
    #[serde(rename = "NT")]
    New,
}

impl Testament {
    /// Convert the numeric code used by corpus files (1 = OT, 2 = NT)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Testament::Old),
            2 => Some(Testament::New),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Testament::Old => 1,
            Testament::New => 2,
        }
    }
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Testament::Old => write!(f, "OT"),
            Testament::New => write!(f, "NT"),
        }
    }
}

impl FromStr for Testament {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ot" | "old" | "1" | "구약" => Ok(Testament::Old),
            "nt" | "new" | "2" | "신약" => Ok(Testament::New),
            other => Err(format!("Unknown testament: {}", other)),
        }
    }
}

/// A book of the corpus, unified across translations by its number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Canonical short name (from the primary translation)
    pub short: String,
    /// Canonical full name (from the primary translation)
    pub name: String,
    pub testament: Testament,
    /// Canonical ordering number (1-based)
    pub number: u32,
    /// Names and short names used by the other translations
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Book {
    /// Every name this book answers to, canonical names first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        [self.name.as_str(), self.short.as_str()]
            .into_iter()
            .chain(self.aliases.iter().map(|a| a.as_str()))
    }
}

/// Identity of a verse independent of translation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseKey {
    pub book_short: String,
    pub chapter: u32,
    pub verse: u32,
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.book_short, self.chapter, self.verse)
    }
}

/// A single verse of one translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// Translation tag (e.g. "KRV", "ASV")
    pub translation: String,
    pub book_short: String,
    pub book_name: String,
    pub book_number: u32,
    pub testament: Testament,
    pub chapter: u32,
    pub verse: u32,
    pub title: Option<String>,
    pub text: String,
}

impl Verse {
    /// Human-readable reference, e.g. "창세기 1:1"
    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book_name, self.chapter, self.verse)
    }

    pub fn key(&self) -> VerseKey {
        VerseKey {
            book_short: self.book_short.clone(),
            chapter: self.chapter,
            verse: self.verse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testament_codes() {
        assert_eq!(Testament::from_code(1), Some(Testament::Old));
        assert_eq!(Testament::from_code(2), Some(Testament::New));
        assert_eq!(Testament::from_code(3), None);
        assert_eq!(Testament::New.code(), 2);
    }

    #[test]
    fn test_testament_parse() {
        assert_eq!("nt".parse::<Testament>().unwrap(), Testament::New);
        assert_eq!("구약".parse::<Testament>().unwrap(), Testament::Old);
        assert!("apocrypha".parse::<Testament>().is_err());
    }

    #[test]
    fn test_book_names_include_aliases() {
        let book = Book {
            short: "롬".to_string(),
            name: "로마서".to_string(),
            testament: Testament::New,
            number: 45,
            aliases: vec!["Romans".to_string()],
        };

        let names: Vec<&str> = book.names().collect();
        assert_eq!(names, vec!["로마서", "롬", "Romans"]);
    }
}
