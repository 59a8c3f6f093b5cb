//! Result deduplication by verse identity

use crate::corpus::VerseKey;
use crate::retrieval::VerseMatch;
use std::collections::HashSet;

/// Deduplicate matches by book/chapter/verse, keeping the first instance
///
/// Callers pass matches in rank order, so the survivor is the best-ranked one.
pub fn deduplicate_matches(matches: Vec<VerseMatch>) -> Vec<VerseMatch> {
    let mut seen: HashSet<VerseKey> = HashSet::new();

    matches
        .into_iter()
        .filter(|m| seen.insert(m.key()))
        .collect()
}

/// Drop matches whose verse is already in `taken`
pub fn exclude_matches(matches: Vec<VerseMatch>, taken: &HashSet<VerseKey>) -> Vec<VerseMatch> {
    matches
        .into_iter()
        .filter(|m| !taken.contains(&m.key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Testament;

    fn scored(book_short: &str, verse: u32, translation: &str, score: f32) -> VerseMatch {
        VerseMatch {
            reference: format!("{} 1:{}", book_short, verse),
            translation: translation.to_string(),
            book_name: book_short.to_string(),
            book_short: book_short.to_string(),
            chapter: 1,
            verse,
            title: None,
            text: format!("text {}", verse),
            testament: Some(Testament::Old),
            raw_score: score,
            reranked_score: score,
        }
    }

    #[test]
    fn test_deduplication() {
        let matches = vec![
            scored("창", 1, "KRV", 0.9),
            scored("창", 2, "KRV", 0.8),
            scored("창", 1, "ASV", 0.7), // Same verse, other translation
        ];

        let deduped = deduplicate_matches(matches);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].verse, 1);
        assert_eq!(deduped[0].translation, "KRV");
        assert_eq!(deduped[0].reranked_score, 0.9);
    }

    #[test]
    fn test_exclusion() {
        let taken: HashSet<VerseKey> = [scored("창", 1, "KRV", 1.0).key()].into_iter().collect();
        let remaining = exclude_matches(
            vec![scored("창", 1, "ASV", 0.8), scored("창", 3, "KRV", 0.6)],
            &taken,
        );
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].verse, 3);
    }
}
