//! Scope extraction: turn "in the Gospels" or "신약에서" into a hard filter

use super::PrototypeSet;
use crate::corpus::{CorpusIndex, Testament, Verse};
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::prototypes::{PrototypeRegistry, BOOK_NAME_PLACEHOLDER};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Scores closer than this are treated as a tie
const TIE_EPSILON: f32 = 1e-6;

/// Kind of restriction a query carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeKind {
    None,
    Testament,
    BookGroup,
    SingleBook,
}

impl ScopeKind {
    /// Tie-break rank when two categories score the same; higher wins
    pub fn priority(self) -> u8 {
        match self {
            ScopeKind::SingleBook => 3,
            ScopeKind::BookGroup => 2,
            ScopeKind::Testament => 1,
            ScopeKind::None => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScopeKind::None => "NONE",
            ScopeKind::Testament => "TESTAMENT",
            ScopeKind::BookGroup => "BOOK_GROUP",
            ScopeKind::SingleBook => "SINGLE_BOOK",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hard filter derived from query phrasing
///
/// `None` matches every verse. Scope is never a ranking signal: a verse
/// outside the constraint is dropped regardless of its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeConstraint {
    pub kind: ScopeKind,
    /// Member book short names, for book-group and single-book scopes
    pub books: Option<BTreeSet<String>>,
    pub testament: Option<Testament>,
    /// Query with the scope phrase removed
    pub cleaned_query: String,
    pub original_query: String,
    /// Human-readable label, e.g. "사복음서"
    pub description: Option<String>,
    pub confidence: f32,
}

impl ScopeConstraint {
    pub fn none(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            kind: ScopeKind::None,
            books: None,
            testament: None,
            cleaned_query: query.clone(),
            original_query: query,
            description: None,
            confidence: 0.0,
        }
    }

    pub fn testament(
        testament: Testament,
        cleaned_query: impl Into<String>,
        original_query: impl Into<String>,
        description: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            kind: ScopeKind::Testament,
            books: None,
            testament: Some(testament),
            cleaned_query: cleaned_query.into(),
            original_query: original_query.into(),
            description: Some(description.into()),
            confidence,
        }
    }

    /// Book-group or single-book scope over `books` (short names)
    pub fn books(
        kind: ScopeKind,
        books: BTreeSet<String>,
        cleaned_query: impl Into<String>,
        original_query: impl Into<String>,
        description: impl Into<String>,
        confidence: f32,
    ) -> Self {
        debug_assert!(matches!(kind, ScopeKind::BookGroup | ScopeKind::SingleBook));
        Self {
            kind,
            books: Some(books),
            testament: None,
            cleaned_query: cleaned_query.into(),
            original_query: original_query.into(),
            description: Some(description.into()),
            confidence,
        }
    }

    pub fn is_scoped(&self) -> bool {
        self.kind != ScopeKind::None
    }

    /// Text to search with: the cleaned query, or the original when nothing is left
    pub fn search_query(&self) -> &str {
        if self.cleaned_query.trim().is_empty() {
            &self.original_query
        } else {
            &self.cleaned_query
        }
    }

    /// Whether a verse from `book_short` in `testament` passes this filter
    ///
    /// Unknown book or testament never passes a restricting scope.
    pub fn matches(&self, book_short: Option<&str>, testament: Option<Testament>) -> bool {
        match self.kind {
            ScopeKind::None => true,
            ScopeKind::Testament => testament.is_some() && testament == self.testament,
            ScopeKind::BookGroup | ScopeKind::SingleBook => match (book_short, &self.books) {
                (Some(short), Some(books)) => books.contains(short),
                _ => false,
            },
        }
    }

    pub fn matches_verse(&self, verse: &Verse) -> bool {
        self.matches(Some(&verse.book_short), Some(verse.testament))
    }

    /// Rewrite member books to the short names `corpus` uses
    ///
    /// Books the corpus does not know are kept as given.
    pub fn with_canonical_books(mut self, corpus: &dyn CorpusIndex) -> Self {
        if let Some(books) = self.books.take() {
            self.books = Some(
                books
                    .into_iter()
                    .map(|short| corpus.canonical_short(&short).unwrap_or(short))
                    .collect(),
            );
        }
        self
    }
}

impl fmt::Display for ScopeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{} ({})", self.kind, description),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Literal scope phrases, tried longest first
struct TriggerSet {
    patterns: Vec<Regex>,
}

impl TriggerSet {
    fn new(triggers: impl IntoIterator<Item = String>) -> Self {
        let mut triggers: Vec<String> = triggers
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        triggers.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        triggers.dedup();

        let patterns = triggers
            .iter()
            .filter_map(|t| match Regex::new(&format!("(?i){}", regex::escape(t))) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Skipping scope trigger '{}': {}", t, e);
                    None
                }
            })
            .collect();

        Self { patterns }
    }

    /// Remove the first trigger found in `query`
    ///
    /// Returns `None` when no trigger occurs, or when the first one found
    /// occurs more than once (removal would be ambiguous).
    fn strip(&self, query: &str) -> Option<String> {
        for pattern in &self.patterns {
            let spans: Vec<Range<usize>> = pattern.find_iter(query).map(|m| m.range()).collect();
            match spans.as_slice() {
                [] => continue,
                [span] => {
                    let joined = format!("{} {}", &query[..span.start], &query[span.end..]);
                    return Some(tidy(&joined));
                }
                _ => return None,
            }
        }
        None
    }

    fn len(&self) -> usize {
        self.patterns.len()
    }
}

fn tidy(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | ';' | '-' | '·'))
        .to_string()
}

struct TestamentCategory {
    testament: Testament,
    label: String,
    triggers: TriggerSet,
    prototypes: PrototypeSet,
}

struct GroupCategory {
    label: String,
    books: BTreeSet<String>,
    triggers: TriggerSet,
    prototypes: PrototypeSet,
}

struct BookCategory {
    short: String,
    name: String,
    mentions: Vec<Regex>,
    triggers: TriggerSet,
    prototypes: PrototypeSet,
}

/// One scored scope category
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub kind: ScopeKind,
    pub score: f32,
    pub threshold: f32,
    /// Index into the category list for `kind`
    pub index: usize,
}

/// Highest-scoring candidate that clears its threshold; ties go to the more specific kind
pub(crate) fn select(candidates: &[Candidate]) -> Option<Candidate> {
    candidates
        .iter()
        .filter(|c| c.score >= c.threshold)
        .fold(None, |best: Option<Candidate>, c| match best {
            None => Some(*c),
            Some(b) if c.score > b.score + TIE_EPSILON => Some(*c),
            Some(b)
                if (c.score - b.score).abs() <= TIE_EPSILON
                    && c.kind.priority() > b.kind.priority() =>
            {
                Some(*c)
            }
            Some(b) => Some(b),
        })
}

/// Extracts testament, book-group and single-book scopes from queries
pub struct ScopeClassifier {
    provider: Arc<dyn EmbeddingProvider>,
    none_threshold: f32,
    testament_threshold: f32,
    group_threshold: f32,
    book_threshold: f32,
    none: PrototypeSet,
    testaments: Vec<TestamentCategory>,
    groups: Vec<GroupCategory>,
    books: Vec<BookCategory>,
}

impl ScopeClassifier {
    /// Embed every scope prototype up front
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        registry: &PrototypeRegistry,
    ) -> Result<Self, EmbeddingError> {
        let start = std::time::Instant::now();
        let scope = &registry.scope;

        let none = PrototypeSet::build("none", &scope.none, provider.as_ref())?;

        let testaments = scope
            .testament
            .iter()
            .map(|t| {
                Ok(TestamentCategory {
                    testament: t.testament,
                    label: t.label.clone(),
                    triggers: TriggerSet::new(t.triggers.iter().cloned()),
                    prototypes: PrototypeSet::build(&t.label, &t.phrases, provider.as_ref())?,
                })
            })
            .collect::<Result<Vec<_>, EmbeddingError>>()?;

        let groups = scope
            .group
            .iter()
            .map(|g| {
                Ok(GroupCategory {
                    label: g.label.clone(),
                    books: g.books.iter().cloned().collect(),
                    triggers: TriggerSet::new(g.triggers.iter().cloned()),
                    prototypes: PrototypeSet::build(&g.name, &g.phrases, provider.as_ref())?,
                })
            })
            .collect::<Result<Vec<_>, EmbeddingError>>()?;

        let mut books = Vec::with_capacity(registry.books.len());
        for entry in &registry.books {
            let mut phrases = render(&scope.book_templates_ko, &entry.name);
            let mut names = vec![entry.name.clone()];
            if let Some(english) = &entry.english {
                phrases.extend(render(&scope.book_templates_en, english));
                names.push(english.clone());
            }

            let mentions = entry
                .mention_names()
                .filter_map(|name| mention_regex(name).ok())
                .collect();

            books.push(BookCategory {
                short: entry.short.clone(),
                name: entry.name.clone(),
                mentions,
                triggers: TriggerSet::new(phrases.iter().cloned().chain(names)),
                prototypes: PrototypeSet::build(&entry.short, &phrases, provider.as_ref())?,
            });
        }

        let classifier = Self {
            provider,
            none_threshold: scope.none_threshold,
            testament_threshold: scope.testament_threshold,
            group_threshold: scope.group_threshold,
            book_threshold: scope.book_threshold,
            none,
            testaments,
            groups,
            books,
        };

        info!(
            "Scope classifier initialized in {}ms ({})",
            start.elapsed().as_millis(),
            classifier.stats()
        );

        Ok(classifier)
    }

    /// Extract the scope of `query`
    ///
    /// Never fails: blank input and embedding errors yield a `None` scope.
    pub fn extract(&self, query: &str) -> ScopeConstraint {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return ScopeConstraint::none("");
        }

        let embedding = match self.provider.embed(trimmed) {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Scope extraction degraded to NONE for '{}': {}", trimmed, e);
                return ScopeConstraint::none(trimmed);
            }
        };

        let candidates = self.score(trimmed, &embedding);
        let winner = select(&candidates);

        debug!(
            "Scope scores for '{}': {}",
            trimmed,
            candidates
                .iter()
                .filter(|c| c.score > 0.0)
                .map(|c| format!("{}[{}]={:.3}", c.kind, c.index, c.score))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let Some(winner) = winner else {
            return ScopeConstraint::none(trimmed);
        };

        let constraint = self.build_constraint(trimmed, winner);
        debug!(
            "Scope for '{}': {} -> '{}' (confidence {:.3})",
            trimmed, constraint, constraint.cleaned_query, constraint.confidence
        );
        constraint
    }

    fn score(&self, query: &str, embedding: &[f32]) -> Vec<Candidate> {
        let mut candidates = vec![Candidate {
            kind: ScopeKind::None,
            score: self.none.score(embedding),
            threshold: self.none_threshold,
            index: 0,
        }];

        candidates.extend(self.testaments.iter().enumerate().map(|(index, t)| Candidate {
            kind: ScopeKind::Testament,
            score: t.prototypes.score(embedding),
            threshold: self.testament_threshold,
            index,
        }));

        candidates.extend(self.groups.iter().enumerate().map(|(index, g)| Candidate {
            kind: ScopeKind::BookGroup,
            score: g.prototypes.score(embedding),
            threshold: self.group_threshold,
            index,
        }));

        // Single-book scope requires the book to be named literally
        candidates.extend(self.mentioned_books(query).into_iter().map(|index| Candidate {
            kind: ScopeKind::SingleBook,
            score: self.books[index].prototypes.score(embedding),
            threshold: self.book_threshold,
            index,
        }));

        candidates
    }

    /// Books named in `query`; a name nested inside a longer match is ignored
    fn mentioned_books(&self, query: &str) -> Vec<usize> {
        let hits: Vec<(usize, Range<usize>)> = self
            .books
            .iter()
            .enumerate()
            .flat_map(|(index, book)| {
                book.mentions
                    .iter()
                    .flat_map(move |re| re.find_iter(query).map(move |m| (index, m.range())))
            })
            .collect();

        let mut mentioned = Vec::new();
        for (index, span) in &hits {
            let nested = hits.iter().any(|(other, o)| {
                other != index && o.start <= span.start && span.end <= o.end && o.len() > span.len()
            });
            if !nested && !mentioned.contains(index) {
                mentioned.push(*index);
            }
        }
        mentioned
    }

    fn build_constraint(&self, query: &str, winner: Candidate) -> ScopeConstraint {
        match winner.kind {
            ScopeKind::None => ScopeConstraint {
                confidence: winner.score,
                ..ScopeConstraint::none(query)
            },
            ScopeKind::Testament => {
                let t = &self.testaments[winner.index];
                ScopeConstraint::testament(
                    t.testament,
                    self.clean(query, &t.triggers),
                    query,
                    t.label.clone(),
                    winner.score,
                )
            }
            ScopeKind::BookGroup => {
                let g = &self.groups[winner.index];
                ScopeConstraint::books(
                    ScopeKind::BookGroup,
                    g.books.clone(),
                    self.clean(query, &g.triggers),
                    query,
                    g.label.clone(),
                    winner.score,
                )
            }
            ScopeKind::SingleBook => {
                let b = &self.books[winner.index];
                ScopeConstraint::books(
                    ScopeKind::SingleBook,
                    BTreeSet::from([b.short.clone()]),
                    self.clean(query, &b.triggers),
                    query,
                    b.name.clone(),
                    winner.score,
                )
            }
        }
    }

    fn clean(&self, query: &str, triggers: &TriggerSet) -> String {
        match triggers.strip(query) {
            Some(cleaned) => cleaned,
            None => {
                debug!("Scope phrase not removable from '{}'; keeping original", query);
                query.to_string()
            }
        }
    }

    pub fn stats(&self) -> String {
        let book_prototypes: usize = self.books.iter().map(|b| b.prototypes.len()).sum();
        let triggers: usize = self.testaments.iter().map(|t| t.triggers.len()).sum::<usize>()
            + self.groups.iter().map(|g| g.triggers.len()).sum::<usize>();
        format!(
            "ScopeClassifier: {} no-scope, {} testament, {} group, {} book prototypes ({} books, {} triggers)",
            self.none.len(),
            self.testaments.iter().map(|t| t.prototypes.len()).sum::<usize>(),
            self.groups.iter().map(|g| g.prototypes.len()).sum::<usize>(),
            book_prototypes,
            self.books.len(),
            triggers
        )
    }
}

fn render(templates: &[String], name: &str) -> Vec<String> {
    templates
        .iter()
        .map(|t| t.replace(BOOK_NAME_PLACEHOLDER, name))
        .collect()
}

/// ASCII names must stand alone as words ("Acts" not in "facts")
fn mention_regex(name: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(name);
    if name.is_ascii() {
        Regex::new(&format!(r"(?i)\b{}\b", escaped))
    } else {
        Regex::new(&escaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::test_support::{test_registry, StubEmbedder};

    const NT: usize = 0;
    const GOSPELS: usize = 1;
    const ROMANS: usize = 2;
    const NO_SCOPE: usize = 3;
    const JOHN: usize = 4;
    const FIRST_JOHN: usize = 5;

    fn classifier() -> ScopeClassifier {
        let stub = StubEmbedder::new(8);
        let both = {
            let mut v = vec![0.0; 8];
            v[NT] = 1.0;
            v[ROMANS] = 1.0;
            v
        };
        let stub = StubEmbedder::new(8)
            .with("신약에서", stub.axis(NT, 0, 0.0))
            .with("복음서에서", stub.axis(GOSPELS, 0, 0.0))
            .with("로마서에서", stub.axis(ROMANS, 0, 0.0))
            .with("in Romans", stub.axis(ROMANS, 0, 0.0))
            .with("요한복음에서", stub.axis(JOHN, 0, 0.0))
            .with("in John", stub.axis(JOHN, 0, 0.0))
            .with("요한일서에서", stub.axis(FIRST_JOHN, 0, 0.0))
            .with("in 1 John", stub.axis(FIRST_JOHN, 0, 0.0))
            .with("verses about love", stub.axis(NO_SCOPE, 0, 0.0))
            .with("신약에서 사랑", stub.axis(NT, 0, 0.0))
            .with("love in the new testament", stub.axis(NT, 0, 0.0))
            .with("신약 사랑 신약", stub.axis(NT, 0, 0.0))
            .with("복음서에서 사랑", stub.axis(GOSPELS, 0, 0.0))
            .with("로마서에서 사랑", both)
            .with("사랑 in everything", stub.axis(ROMANS, 0, 0.0))
            .with("love in 1 John", stub.axis(FIRST_JOHN, JOHN, 0.1))
            .with("verses about love please", stub.axis(NO_SCOPE, 0, 0.0))
            .failing_on("boom");
        ScopeClassifier::new(Arc::new(stub), &test_registry()).unwrap()
    }

    #[test]
    fn test_blank_query_is_none_with_empty_cleaned() {
        let classifier = classifier();
        for q in ["", "   "] {
            let scope = classifier.extract(q);
            assert_eq!(scope.kind, ScopeKind::None);
            assert_eq!(scope.cleaned_query, "");
        }
    }

    #[test]
    fn test_testament_scope_strips_trigger() {
        let scope = classifier().extract("신약에서 사랑");
        assert_eq!(scope.kind, ScopeKind::Testament);
        assert_eq!(scope.testament, Some(Testament::New));
        assert_eq!(scope.cleaned_query, "사랑");
        assert_eq!(scope.original_query, "신약에서 사랑");
        assert!((scope.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_english_trigger_is_case_insensitive() {
        let scope = classifier().extract("love in the new testament");
        assert_eq!(scope.kind, ScopeKind::Testament);
        assert_eq!(scope.cleaned_query, "love");
    }

    #[test]
    fn test_ambiguous_trigger_keeps_original_but_filters() {
        let scope = classifier().extract("신약 사랑 신약");
        assert_eq!(scope.kind, ScopeKind::Testament);
        assert_eq!(scope.cleaned_query, "신약 사랑 신약");
        assert!(!scope.matches(Some("창"), Some(Testament::Old)));
    }

    #[test]
    fn test_book_group_scope() {
        let scope = classifier().extract("복음서에서 사랑");
        assert_eq!(scope.kind, ScopeKind::BookGroup);
        assert_eq!(scope.cleaned_query, "사랑");
        let books: Vec<&str> = scope.books.as_ref().unwrap().iter().map(|s| s.as_str()).collect();
        assert_eq!(books, vec!["눅", "마", "막", "요"]);
        assert!(scope.matches(Some("마"), Some(Testament::New)));
        assert!(!scope.matches(Some("롬"), Some(Testament::New)));
    }

    #[test]
    fn test_tie_prefers_single_book() {
        let scope = classifier().extract("로마서에서 사랑");
        assert_eq!(scope.kind, ScopeKind::SingleBook);
        assert_eq!(scope.books, Some(BTreeSet::from(["롬".to_string()])));
        assert_eq!(scope.cleaned_query, "사랑");
        assert_eq!(scope.description.as_deref(), Some("로마서"));
    }

    #[test]
    fn test_single_book_requires_literal_mention() {
        let scope = classifier().extract("사랑 in everything");
        assert_eq!(scope.kind, ScopeKind::None);
        assert_eq!(scope.cleaned_query, "사랑 in everything");
    }

    #[test]
    fn test_nested_book_name_ignored() {
        let scope = classifier().extract("love in 1 John");
        assert_eq!(scope.kind, ScopeKind::SingleBook);
        assert_eq!(scope.books, Some(BTreeSet::from(["요일".to_string()])));
        assert_eq!(scope.cleaned_query, "love");
    }

    #[test]
    fn test_no_scope_phrasing_wins() {
        let scope = classifier().extract("verses about love please");
        assert_eq!(scope.kind, ScopeKind::None);
        assert_eq!(scope.search_query(), "verses about love please");
        assert!((scope.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_embedding_failure_degrades_to_none() {
        let scope = classifier().extract("boom");
        assert_eq!(scope.kind, ScopeKind::None);
        assert_eq!(scope.cleaned_query, "boom");
    }

    #[test]
    fn test_none_matches_everything() {
        let scope = ScopeConstraint::none("query");
        assert!(scope.matches(Some("마"), Some(Testament::New)));
        assert!(scope.matches(Some("창"), Some(Testament::Old)));
        assert!(scope.matches(None, None));
        assert!(!scope.is_scoped());
    }

    #[test]
    fn test_testament_and_book_matching() {
        let nt = ScopeConstraint::testament(Testament::New, "q", "original", "신약", 1.0);
        assert!(nt.matches(Some("마"), Some(Testament::New)));
        assert!(!nt.matches(Some("창"), Some(Testament::Old)));
        assert!(!nt.matches(Some("마"), None));

        let romans = ScopeConstraint::books(
            ScopeKind::SingleBook,
            BTreeSet::from(["롬".to_string()]),
            "q",
            "original",
            "로마서",
            1.0,
        );
        assert!(romans.matches(Some("롬"), Some(Testament::New)));
        assert!(!romans.matches(Some("고전"), Some(Testament::New)));
        assert!(!romans.matches(None, Some(Testament::New)));
    }

    #[test]
    fn test_search_query_falls_back_to_original() {
        let scope = ScopeConstraint {
            cleaned_query: String::new(),
            ..ScopeConstraint::none("original query")
        };
        assert_eq!(scope.search_query(), "original query");

        let gospels = ScopeConstraint::books(
            ScopeKind::BookGroup,
            BTreeSet::from(["마".to_string(), "막".to_string(), "눅".to_string(), "요".to_string()]),
            "사랑에 대한 말씀",
            "사복음서에서 사랑에 대한 말씀",
            "사복음서",
            1.0,
        );
        assert_eq!(gospels.search_query(), "사랑에 대한 말씀");
    }

    #[test]
    fn test_select_threshold_and_priority() {
        let c = |kind, score, threshold| Candidate {
            kind,
            score,
            threshold,
            index: 0,
        };

        assert_eq!(select(&[c(ScopeKind::Testament, 0.4, 0.5)]), None);

        let winner = select(&[
            c(ScopeKind::Testament, 0.7, 0.5),
            c(ScopeKind::BookGroup, 0.7, 0.5),
            c(ScopeKind::None, 0.7, 0.5),
        ])
        .unwrap();
        assert_eq!(winner.kind, ScopeKind::BookGroup);

        let winner = select(&[
            c(ScopeKind::SingleBook, 0.6, 0.5),
            c(ScopeKind::Testament, 0.8, 0.5),
        ])
        .unwrap();
        assert_eq!(winner.kind, ScopeKind::Testament);
    }

    #[test]
    fn test_stats_mentions_prototype_counts() {
        let stats = classifier().stats();
        assert!(stats.contains("ScopeClassifier"));
        assert!(stats.contains("no-scope"));
        assert!(stats.contains("book prototypes"));
    }
}
