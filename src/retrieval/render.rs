//! Plain-text rendering for terminals and prompt context

use crate::corpus::{KeywordStatistics, Verse};
use crate::retrieval::{SearchResult, VerseMatch};
use std::fmt::Write;

/// Books listed in a statistics summary
const MAX_BOOKS_SHOWN: usize = 10;

pub fn render_search_result(result: &SearchResult) -> String {
    let mut out = String::new();

    if !result.success {
        let _ = writeln!(
            out,
            "Search failed for '{}': {}",
            result.query,
            result.error.as_deref().unwrap_or("unknown error")
        );
        return out;
    }

    let method = result
        .search_method()
        .map(|m| m.as_str())
        .unwrap_or("UNKNOWN");
    let _ = write!(
        out,
        "{} result(s) for '{}' [{}, {}ms]",
        result.total_results, result.query, method, result.elapsed_ms
    );
    if let Some(scope) = result.scope.as_ref().filter(|s| s.is_scoped()) {
        let _ = write!(out, " scope: {}", scope);
    }
    out.push('\n');

    if result.results.is_empty() {
        let _ = writeln!(out, "No verses found for: {}", result.query);
        return out;
    }

    for (rank, m) in result.results.iter().enumerate() {
        out.push('\n');
        let _ = writeln!(out, "{:>2}. {}", rank + 1, render_match(m));
    }

    out
}

fn render_match(m: &VerseMatch) -> String {
    let mut line = format!("[{}] {}", m.translation, m.reference);
    if let Some(title) = &m.title {
        let _ = write!(line, " <{}>", title);
    }
    let _ = write!(line, " ({:.3})\n    {}", m.reranked_score, m.text);
    line
}

/// Verses as "Reference <Title>\ntext" blocks separated by blank lines
pub fn render_verses(verses: &[&Verse]) -> String {
    verses
        .iter()
        .map(|v| match &v.title {
            Some(title) => format!("[{}] {} <{}>\n{}", v.translation, v.reference(), title, v.text),
            None => format!("[{}] {}\n{}", v.translation, v.reference(), v.text),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_statistics(stats: &KeywordStatistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Keyword: {}", stats.keyword);
    let _ = writeln!(out, "Total occurrences: {}", stats.total_occurrences);
    let _ = writeln!(out, "Found in {} book(s)", stats.books_with_keyword);

    if !stats.book_counts.is_empty() {
        let mut counts: Vec<_> = stats.book_counts.iter().collect();
        // Stable: equal counts stay in corpus order
        counts.sort_by(|a, b| b.count.cmp(&a.count));

        out.push_str("\nOccurrences by book:\n");
        for entry in counts.into_iter().take(MAX_BOOKS_SHOWN) {
            let _ = writeln!(out, "  - {}: {} times", entry.book_name, entry.count);
        }
    }

    if !stats.sample_references.is_empty() {
        out.push_str("\nSample references:\n");
        for reference in &stats.sample_references {
            let _ = writeln!(out, "  - {}", reference);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{IntentType, ScopeConstraint, SearchIntent};
    use crate::corpus::fixtures::KRV;
    use crate::corpus::BibleCorpus;

    #[test]
    fn test_failure_and_empty_render_differently() {
        let failed = SearchResult::failure("사랑", "vector index unavailable", 2, None, None);
        let rendered = render_search_result(&failed);
        assert!(rendered.starts_with("Search failed"));
        assert!(rendered.contains("vector index unavailable"));

        let empty = SearchResult::success(
            "사랑",
            Vec::new(),
            1,
            SearchIntent::new(IntentType::Semantic, None, "사랑", "conceptual phrasing"),
            ScopeConstraint::none("사랑"),
        );
        let rendered = render_search_result(&empty);
        assert!(rendered.contains("No verses found"));
        assert!(!rendered.contains("failed"));
    }

    #[test]
    fn test_renders_ranked_matches() {
        let corpus = BibleCorpus::from_json(&[("KRV", KRV)]).unwrap();
        let verse = corpus.get_verse("창세기", 1, 1, None).unwrap();
        let result = SearchResult::success(
            "태초",
            vec![VerseMatch::exact(verse)],
            1,
            SearchIntent::new(IntentType::Hybrid, Some("태초".to_string()), "태초", "short token"),
            ScopeConstraint::none("태초"),
        );

        let rendered = render_search_result(&result);
        assert!(rendered.contains("1 result(s) for '태초' [HYBRID"));
        assert!(rendered.contains(" 1. [KRV] 창세기 1:1 <천지 창조> (1.000)"));
    }

    #[test]
    fn test_render_statistics() {
        let corpus = BibleCorpus::from_json(&[("KRV", KRV)]).unwrap();
        let stats = corpus.keyword_statistics("하나님", &ScopeConstraint::none(""), None);
        let rendered = render_statistics(&stats);

        assert!(rendered.starts_with("Keyword: 하나님\n"));
        assert!(rendered.contains("Total occurrences: 4"));
        assert!(rendered.contains("  - 창세기: 2 times"));
        assert!(rendered.contains("Sample references:"));
    }

    #[test]
    fn test_render_verses() {
        let corpus = BibleCorpus::from_json(&[("KRV", KRV)]).unwrap();
        let verses = corpus.verse_range("창", 1, 1, 2, None);
        let rendered = render_verses(&verses);
        assert!(rendered.starts_with("[KRV] 창세기 1:1 <천지 창조>\n태초에"));
        assert!(rendered.contains("\n\n[KRV] 창세기 1:2\n"));
    }
}
