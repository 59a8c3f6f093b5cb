//! In-memory corpus loaded from per-translation JSON files

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{Book, CorpusError, CorpusIndex, Testament, Verse};
use crate::classify::ScopeConstraint;

/// Where to load one translation from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSource {
    /// Translation tag used in stored segments (e.g. "KRV")
    pub tag: String,
    /// Path to the translation's JSON file
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBible {
    #[serde(default)]
    books: Vec<RawBook>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBook {
    book_short: String,
    book_name: String,
    testament: u8,
    #[serde(default)]
    book_number: Option<u32>,
    #[serde(default)]
    chapters: Vec<RawChapter>,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    chapter: u32,
    #[serde(default)]
    verses: Vec<RawVerse>,
}

#[derive(Debug, Deserialize)]
struct RawVerse {
    verse: u32,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Occurrence count of a keyword within one book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookCount {
    pub book_name: String,
    pub count: usize,
}

/// Frequency of a keyword across the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordStatistics {
    pub keyword: String,
    /// Number of verses containing the keyword
    pub total_occurrences: usize,
    /// Per-book verse counts, in corpus order
    pub book_counts: Vec<BookCount>,
    /// Up to five references of matching verses
    pub sample_references: Vec<String>,
    pub books_with_keyword: usize,
}

const MAX_SAMPLE_REFERENCES: usize = 5;

/// Read-only verse corpus spanning one or more parallel translations
///
/// Books are unified across translations by their number: the first
/// translation loaded provides the canonical names, the others contribute
/// aliases, so `resolve_book("Genesis")` and `resolve_book("창세기")` agree.
pub struct BibleCorpus {
    books: Vec<Book>,
    book_lookup: AHashMap<String, usize>,
    translations: Vec<String>,
    verses: Vec<Verse>,
    /// Lowercased verse text, parallel to `verses`
    lowered: Vec<String>,
    /// Lowercased, whitespace-collapsed verse text, parallel to `verses`
    normalized: Vec<String>,
    /// (translation index, book number, chapter) -> range into `verses`
    chapters: AHashMap<(usize, u32, u32), Range<usize>>,
}

impl BibleCorpus {
    /// Load every configured translation from disk
    pub fn load(sources: &[TranslationSource]) -> Result<Self, CorpusError> {
        let mut raws = Vec::with_capacity(sources.len());

        for source in sources {
            let content = read_source(&source.path)?;
            let raw: RawBible =
                serde_json::from_str(&content).map_err(|e| CorpusError::Json {
                    translation: source.tag.clone(),
                    source: e,
                })?;
            info!(
                "Loaded {} translation from {} ({} books)",
                source.tag,
                source.path.display(),
                raw.books.len()
            );
            raws.push((source.tag.clone(), raw));
        }

        Self::build(raws)
    }

    /// Build a corpus from in-memory JSON documents, as (tag, json) pairs
    pub fn from_json(documents: &[(&str, &str)]) -> Result<Self, CorpusError> {
        let raws = documents
            .iter()
            .map(|(tag, json)| {
                serde_json::from_str::<RawBible>(json)
                    .map(|raw| (tag.to_string(), raw))
                    .map_err(|e| CorpusError::Json {
                        translation: tag.to_string(),
                        source: e,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::build(raws)
    }

    fn build(raws: Vec<(String, RawBible)>) -> Result<Self, CorpusError> {
        if raws.is_empty() {
            return Err(CorpusError::Invalid(
                "At least one translation is required".to_string(),
            ));
        }

        let mut books: Vec<Book> = Vec::new();
        let mut by_number: AHashMap<u32, usize> = AHashMap::new();
        let mut translations = Vec::with_capacity(raws.len());
        let mut verses = Vec::new();
        let mut chapters = AHashMap::new();

        for (t_idx, (tag, raw)) in raws.into_iter().enumerate() {
            if translations.iter().any(|t: &String| t.eq_ignore_ascii_case(&tag)) {
                return Err(CorpusError::Invalid(format!(
                    "Duplicate translation tag: {}",
                    tag
                )));
            }

            for (pos, raw_book) in raw.books.into_iter().enumerate() {
                let number = raw_book.book_number.unwrap_or(pos as u32 + 1);
                let testament = Testament::from_code(raw_book.testament).ok_or_else(|| {
                    CorpusError::Invalid(format!(
                        "Book {} in {} has unknown testament code {}",
                        raw_book.book_name, tag, raw_book.testament
                    ))
                })?;

                let book_idx = match by_number.get(&number) {
                    Some(&idx) => {
                        let book = &mut books[idx];
                        for alias in [&raw_book.book_name, &raw_book.book_short] {
                            if !book.names().any(|n| n == alias.as_str()) {
                                book.aliases.push(alias.clone());
                            }
                        }
                        idx
                    }
                    None => {
                        books.push(Book {
                            short: raw_book.book_short.clone(),
                            name: raw_book.book_name.clone(),
                            testament,
                            number,
                            aliases: Vec::new(),
                        });
                        by_number.insert(number, books.len() - 1);
                        books.len() - 1
                    }
                };
                let canonical_short = books[book_idx].short.clone();
                let canonical_testament = books[book_idx].testament;

                for raw_chapter in raw_book.chapters {
                    let start = verses.len();
                    for raw_verse in raw_chapter.verses {
                        verses.push(Verse {
                            translation: tag.clone(),
                            book_short: canonical_short.clone(),
                            book_name: raw_book.book_name.clone(),
                            book_number: number,
                            testament: canonical_testament,
                            chapter: raw_chapter.chapter,
                            verse: raw_verse.verse,
                            title: raw_verse.title.filter(|t| !t.trim().is_empty()),
                            text: raw_verse.text.unwrap_or_default(),
                        });
                    }
                    chapters.insert((t_idx, number, raw_chapter.chapter), start..verses.len());
                }
            }

            translations.push(tag);
        }

        books.sort_by_key(|b| b.number);

        let mut book_lookup = AHashMap::new();
        for (idx, book) in books.iter().enumerate() {
            for name in book.names() {
                book_lookup.entry(name.to_lowercase()).or_insert(idx);
            }
        }

        let lowered: Vec<String> = verses.iter().map(|v| v.text.to_lowercase()).collect();
        let normalized: Vec<String> = lowered.iter().map(|t| collapse_whitespace(t)).collect();

        info!(
            "Corpus ready: {} books, {} verses across {} translation(s)",
            books.len(),
            verses.len(),
            translations.len()
        );

        Ok(Self {
            books,
            book_lookup,
            translations,
            verses,
            lowered,
            normalized,
            chapters,
        })
    }

    /// All canonical books, in canonical order
    pub fn all_books(&self) -> &[Book] {
        &self.books
    }

    /// Translation tags, primary first
    pub fn translations(&self) -> &[String] {
        &self.translations
    }

    /// Every verse, in corpus order
    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    fn translation_index(&self, translation: Option<&str>) -> Option<usize> {
        match translation {
            None => (!self.translations.is_empty()).then_some(0),
            Some(tag) => self
                .translations
                .iter()
                .position(|t| t.eq_ignore_ascii_case(tag.trim())),
        }
    }

    /// All verses of one chapter; `translation = None` means the primary one
    pub fn get_chapter(&self, book: &str, chapter: u32, translation: Option<&str>) -> &[Verse] {
        let Some(book) = self.resolve_book(book) else {
            return &[];
        };
        let Some(t_idx) = self.translation_index(translation) else {
            return &[];
        };

        self.chapters
            .get(&(t_idx, book.number, chapter))
            .map(|range| &self.verses[range.clone()])
            .unwrap_or(&[])
    }

    pub fn get_verse(
        &self,
        book: &str,
        chapter: u32,
        verse: u32,
        translation: Option<&str>,
    ) -> Option<&Verse> {
        self.get_chapter(book, chapter, translation)
            .iter()
            .find(|v| v.verse == verse)
    }

    /// Verses `start..=end` of one chapter
    pub fn verse_range(
        &self,
        book: &str,
        chapter: u32,
        start: u32,
        end: u32,
        translation: Option<&str>,
    ) -> Vec<&Verse> {
        self.get_chapter(book, chapter, translation)
            .iter()
            .filter(|v| v.verse >= start && v.verse <= end)
            .collect()
    }

    /// A verse plus up to `context` verses on either side, within its chapter
    pub fn verse_with_context(
        &self,
        book: &str,
        chapter: u32,
        verse: u32,
        context: u32,
        translation: Option<&str>,
    ) -> Vec<&Verse> {
        let start = verse.saturating_sub(context).max(1);
        let end = verse.saturating_add(context);
        self.verse_range(book, chapter, start, end, translation)
    }

    /// Number of chapters a book has in the primary translation
    pub fn chapter_count(&self, book: &str) -> usize {
        let Some(book) = self.resolve_book(book) else {
            return 0;
        };
        self.chapters
            .keys()
            .filter(|(t_idx, number, _)| *t_idx == 0 && *number == book.number)
            .count()
    }

    /// Count verses containing `keyword`, restricted to `scope` and optionally one translation
    pub fn keyword_statistics(
        &self,
        keyword: &str,
        scope: &ScopeConstraint,
        translation: Option<&str>,
    ) -> KeywordStatistics {
        let needle = keyword.trim().to_lowercase();
        let mut book_counts: Vec<BookCount> = Vec::new();
        let mut sample_references = Vec::new();
        let mut total = 0;

        if !needle.is_empty() {
            for (verse, lowered) in self.verses.iter().zip(&self.lowered) {
                if let Some(tag) = translation {
                    if !verse.translation.eq_ignore_ascii_case(tag) {
                        continue;
                    }
                }
                if !scope.matches(Some(&verse.book_short), Some(verse.testament)) {
                    continue;
                }
                if !lowered.contains(&needle) {
                    continue;
                }

                total += 1;
                if sample_references.len() < MAX_SAMPLE_REFERENCES {
                    sample_references.push(verse.reference());
                }
                match book_counts.iter_mut().find(|c| c.book_name == verse.book_name) {
                    Some(entry) => entry.count += 1,
                    None => book_counts.push(BookCount {
                        book_name: verse.book_name.clone(),
                        count: 1,
                    }),
                }
            }
        }

        debug!(
            "Keyword statistics for '{}': {} occurrences in {} books",
            keyword,
            total,
            book_counts.len()
        );

        KeywordStatistics {
            keyword: keyword.trim().to_string(),
            total_occurrences: total,
            books_with_keyword: book_counts.len(),
            book_counts,
            sample_references,
        }
    }
}

impl CorpusIndex for BibleCorpus {
    fn keyword_search(&self, term: &str) -> Result<Vec<Verse>, CorpusError> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .verses
            .iter()
            .zip(&self.lowered)
            .filter(|(_, text)| text.contains(&needle))
            .map(|(verse, _)| verse.clone())
            .collect())
    }

    fn phrase_search(&self, phrase: &str) -> Result<Vec<Verse>, CorpusError> {
        let needle = collapse_whitespace(&phrase.to_lowercase());
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .verses
            .iter()
            .zip(&self.normalized)
            .filter(|(_, text)| text.contains(&needle))
            .map(|(verse, _)| verse.clone())
            .collect())
    }

    fn resolve_book(&self, name: &str) -> Option<Book> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(&idx) = self.book_lookup.get(&needle) {
            return Some(self.books[idx].clone());
        }

        // Partial match: "요한" -> "요한복음", "the Gospel of John" -> "John"
        let needle_len = needle.chars().count();
        self.books
            .iter()
            .find(|book| {
                book.names().any(|n| {
                    let n = n.to_lowercase();
                    let n_len = n.chars().count();
                    (needle_len >= 2 && n.contains(&needle)) || (n_len >= 2 && needle.contains(&n))
                })
            })
            .cloned()
    }

    fn canonical_short(&self, name: &str) -> Option<String> {
        let needle = name.trim().to_lowercase();
        self.book_lookup
            .get(&needle)
            .map(|&idx| self.books[idx].short.clone())
    }
}

fn read_source(path: &Path) -> Result<String, CorpusError> {
    if !path.exists() {
        return Err(CorpusError::NotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| CorpusError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}


#[cfg(test)]
mod tests {
    use super::fixtures::{ASV, KRV};
    use super::*;
    use std::collections::BTreeSet;

    fn corpus() -> BibleCorpus {
        BibleCorpus::from_json(&[("KRV", KRV), ("ASV", ASV)]).unwrap()
    }

    #[test]
    fn test_books_unified_across_translations() {
        let corpus = corpus();
        assert_eq!(corpus.all_books().len(), 3);
        assert_eq!(corpus.translations(), &["KRV".to_string(), "ASV".to_string()]);

        let genesis = corpus.resolve_book("Genesis").unwrap();
        assert_eq!(genesis.short, "창");
        assert_eq!(genesis.testament, Testament::Old);
        assert_eq!(corpus.resolve_book("창세기").unwrap(), genesis);
    }

    #[test]
    fn test_resolve_book_partial_and_missing() {
        let corpus = corpus();
        assert_eq!(corpus.resolve_book("로마").unwrap().short, "롬");
        assert!(corpus.resolve_book("Leviticus").is_none());
        assert!(corpus.resolve_book("   ").is_none());
    }

    #[test]
    fn test_canonical_short_follows_first_translation() {
        let corpus = corpus();
        assert_eq!(corpus.canonical_short("John").as_deref(), Some("요"));
        assert_eq!(corpus.canonical_short("요").as_deref(), Some("요"));

        let corpus = BibleCorpus::from_json(&[("ASV", ASV), ("KRV", KRV)]).unwrap();
        assert_eq!(corpus.canonical_short("요").as_deref(), Some("John"));
        assert_eq!(corpus.canonical_short("창").as_deref(), Some("Gen"));
        // Exact names only: "로마" would partially match 로마서
        assert!(corpus.canonical_short("로마").is_none());
        assert!(corpus.canonical_short("마").is_none());
    }

    #[test]
    fn test_asv_verses_carry_canonical_short() {
        let corpus = corpus();
        let hits = corpus.keyword_search("loved").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].book_short, "요");
        assert_eq!(hits[0].book_name, "John");
        assert_eq!(hits[0].translation, "ASV");
    }

    #[test]
    fn test_keyword_search_is_case_insensitive_and_ordered() {
        let corpus = corpus();
        let hits = corpus.keyword_search("GOD").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].book_short, "창");
        assert_eq!(hits[1].book_short, "요");

        assert!(corpus.keyword_search("  ").unwrap().is_empty());
    }

    #[test]
    fn test_phrase_search_collapses_whitespace() {
        let corpus = corpus();
        let hits = corpus.phrase_search("the   heavens and").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].reference(), "Genesis 1:1");
    }

    #[test]
    fn test_chapter_lookups() {
        let corpus = corpus();
        assert_eq!(corpus.get_chapter("창세기", 1, None).len(), 3);
        assert_eq!(corpus.get_chapter("Genesis", 1, Some("asv")).len(), 1);
        assert!(corpus.get_chapter("창세기", 2, None).is_empty());
        assert_eq!(corpus.chapter_count("창"), 1);

        let verse = corpus.get_verse("창", 1, 1, None).unwrap();
        assert_eq!(verse.title.as_deref(), Some("천지 창조"));

        let context = corpus.verse_with_context("창세기", 1, 1, 1, None);
        let numbers: Vec<u32> = context.iter().map(|v| v.verse).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_keyword_statistics_respects_scope() {
        let corpus = corpus();
        let all = corpus.keyword_statistics("하나님", &ScopeConstraint::none("하나님"), None);
        assert_eq!(all.total_occurrences, 4);
        assert_eq!(all.books_with_keyword, 3);
        assert_eq!(all.sample_references[0], "창세기 1:1");

        let nt = ScopeConstraint::testament(Testament::New, "하나님", "하나님", "신약", 1.0);
        let scoped = corpus.keyword_statistics("하나님", &nt, Some("KRV"));
        assert_eq!(scoped.total_occurrences, 2);
        assert_eq!(
            scoped.book_counts.iter().map(|c| c.book_name.as_str()).collect::<Vec<_>>(),
            vec!["요한복음", "로마서"]
        );

        let romans = ScopeConstraint::books(
            crate::classify::ScopeKind::SingleBook,
            BTreeSet::from(["롬".to_string()]),
            "하나님",
            "로마서에서 하나님",
            "로마서",
            1.0,
        );
        assert_eq!(corpus.keyword_statistics("하나님", &romans, None).total_occurrences, 1);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            BibleCorpus::from_json(&[]),
            Err(CorpusError::Invalid(_))
        ));
        assert!(matches!(
            BibleCorpus::from_json(&[("KRV", "{not json")]),
            Err(CorpusError::Json { .. })
        ));
        assert!(matches!(
            BibleCorpus::from_json(&[("KRV", KRV), ("krv", KRV)]),
            Err(CorpusError::Invalid(_))
        ));
        let bad_testament =
            r#"{"books": [{"bookShort": "X", "bookName": "X", "testament": 9, "chapters": []}]}"#;
        assert!(matches!(
            BibleCorpus::from_json(&[("KRV", bad_testament)]),
            Err(CorpusError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("krv.json");
        std::fs::write(&path, KRV).unwrap();

        let corpus = BibleCorpus::load(&[TranslationSource {
            tag: "KRV".to_string(),
            path,
        }])
        .unwrap();
        assert_eq!(corpus.len(), 5);

        let missing = BibleCorpus::load(&[TranslationSource {
            tag: "ASV".to_string(),
            path: temp.path().join("missing.json"),
        }]);
        assert!(matches!(missing, Err(CorpusError::NotFound { .. })));
    }
}
