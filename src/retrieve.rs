//! Keyword-overlap source retrieval.
//!
//! Scores every chunk of the candidate documents by how many question
//! keywords it contains and returns the best few as [`SourceCitation`]s.
//! This is a highlighting heuristic: no stemming, no term weighting, no
//! semantics. The citations are computed independently of whatever the
//! LLM actually used to answer.

use crate::models::{Document, SourceCitation};

/// Number of citations returned when none is configured.
pub const DEFAULT_MAX_SOURCES: usize = 3;

/// Words must be longer than this (in characters) to count as keywords.
const MIN_KEYWORD_CHARS: usize = 3;

/// Lower-cased words of `question` longer than three characters.
///
/// Splits on the space character only, so punctuation stays attached
/// ("cat?" is a keyword, "do?" is not). Repeated words are kept.
pub fn extract_keywords(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split(' ')
        .filter(|w| w.chars().count() > MIN_KEYWORD_CHARS)
        .map(str::to_string)
        .collect()
}

/// Number of keywords occurring anywhere in the lower-cased chunk.
pub fn score_chunk(keywords: &[String], chunk: &str) -> usize {
    let chunk = chunk.to_lowercase();
    keywords.iter().filter(|k| chunk.contains(k.as_str())).count()
}

/// Top `limit` chunks across `documents`, by relevance descending.
///
/// Chunks with no keyword hits are dropped. Ties keep document order,
/// then chunk order.
pub fn find_sources(question: &str, documents: &[Document], limit: usize) -> Vec<SourceCitation> {
    let keywords = extract_keywords(question);
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut sources: Vec<SourceCitation> = documents
        .iter()
        .flat_map(|doc| {
            let keywords = &keywords;
            doc.chunks.iter().filter_map(move |chunk| {
                let relevance = score_chunk(keywords, chunk);
                (relevance > 0).then(|| SourceCitation {
                    document_name: doc.name.clone(),
                    document_id: doc.id.clone(),
                    text: chunk.clone(),
                    relevance,
                })
            })
        })
        .collect();

    // sort_by is stable
    sources.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    sources.truncate(limit);
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn doc(id: &str, name: &str, chunks: &[&str]) -> Document {
        Document {
            id: id.to_string(),
            name: name.to_string(),
            filename: format!("{}-{}", id, name),
            content: chunks.concat(),
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_extract_keywords() {
        let kws = extract_keywords("What did the Cat do?");
        assert_eq!(kws, vec!["what"]);

        let kws = extract_keywords("Where  does rust rust");
        assert_eq!(kws, vec!["where", "does", "rust", "rust"]);
    }

    #[test]
    fn test_keyword_length_counts_chars() {
        // "café" is four chars but five bytes
        assert_eq!(extract_keywords("café éte"), vec!["café"]);
    }

    #[test]
    fn test_score_is_substring_and_case_insensitive() {
        let kws = extract_keywords("cats running");
        assert_eq!(score_chunk(&kws, "Two CATS were RUNNING."), 2);
        assert_eq!(score_chunk(&kws, "The cat ran."), 0);
    }

    #[test]
    fn test_repeated_keyword_counts_twice() {
        let kws = extract_keywords("mat mat? mats mats");
        assert_eq!(score_chunk(&kws, "two mats"), 2);
    }

    #[test]
    fn test_pets_scenario() {
        let docs = vec![doc("d1", "pets.txt", &["The cat sat on the mat. The dog ran fast."])];
        let sources = find_sources("What did the cat sat on?", &docs, 3);
        assert!(sources.is_empty(), "no keyword longer than 3 chars matches");

        let sources = find_sources("Where was the cat sitting on the mat. Fast?", &docs, 3);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].document_name, "pets.txt");
        assert!(sources[0].text.contains("cat"));
        assert!(sources[0].relevance >= 1);
    }

    #[test]
    fn test_zero_relevance_dropped_and_sorted() {
        let docs = vec![
            doc("a", "a.txt", &["nothing here", "rust only"]),
            doc("b", "b.txt", &["rust and cargo", "cargo"]),
        ];
        let sources = find_sources("rust cargo", &docs, 3);
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].text, "rust and cargo");
        assert_eq!(sources[0].relevance, 2);
        // ties keep encounter order
        assert_eq!(sources[1].text, "rust only");
        assert_eq!(sources[2].text, "cargo");
    }

    #[test]
    fn test_limit_applies() {
        let docs = vec![doc("a", "a.txt", &["rust", "rust", "rust", "rust", "rust"])];
        assert_eq!(find_sources("rust", &docs, 3).len(), 3);
        assert_eq!(find_sources("rust", &docs, 1).len(), 1);
    }

    #[test]
    fn test_no_keywords_no_sources() {
        let docs = vec![doc("a", "a.txt", &["the cat"])];
        assert!(find_sources("the cat", &docs, 3).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_sorted_positive_and_bounded(
            chunks in proptest::collection::vec("[a-e ]{0,30}", 0..12),
            question in "[a-e ]{0,30}",
            limit in 1usize..6,
        ) {
            let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
            let docs = vec![doc("d", "d.txt", &refs)];
            let sources = find_sources(&question, &docs, limit);

            prop_assert!(sources.len() <= limit);
            prop_assert!(sources.iter().all(|s| s.relevance > 0));
            prop_assert!(sources.windows(2).all(|w| w[0].relevance >= w[1].relevance));

            let kws = extract_keywords(&question);
            let matching = chunks.iter().filter(|c| score_chunk(&kws, c) > 0).count();
            prop_assert_eq!(sources.len(), matching.min(limit));
        }
    }
}
