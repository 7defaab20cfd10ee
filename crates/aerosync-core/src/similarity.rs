//! TF-IDF cosine similarity between two text blocks
//!
//! Vectorizes both texts over their shared two-document corpus using the
//! smoothed idf formulation (`ln((1 + n) / (1 + df)) + 1`), L2-normalizes,
//! and returns the dot product. Matches the conventional TfidfVectorizer
//! defaults: tokens are lowercased runs of two or more word characters.

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

fn term_counts(text: &str) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for token in TOKEN.find_iter(text) {
        *counts.entry(token.as_str().to_lowercase()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Lexical similarity of two texts in [0, 1].
///
/// Returns 0.0 if either text has no tokens or the texts share no
/// vocabulary. Symmetric and deterministic.
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let counts_a = term_counts(a);
    let counts_b = term_counts(b);

    if counts_a.is_empty() || counts_b.is_empty() {
        return 0.0;
    }

    let vocabulary: BTreeSet<&String> = counts_a.keys().chain(counts_b.keys()).collect();

    // Smoothed idf over the two-document corpus (n = 2)
    let n_docs = 2.0;
    let mut vec_a = Vec::with_capacity(vocabulary.len());
    let mut vec_b = Vec::with_capacity(vocabulary.len());
    for term in &vocabulary {
        let df = counts_a.contains_key(*term) as u8 + counts_b.contains_key(*term) as u8;
        let idf = ((1.0 + n_docs) / (1.0 + f64::from(df))).ln() + 1.0;
        vec_a.push(counts_a.get(*term).copied().unwrap_or(0.0) * idf);
        vec_b.push(counts_b.get(*term).copied().unwrap_or(0.0) * idf);
    }

    let norm_a = vec_a.iter().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = vec_b.iter().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let dot: f64 = vec_a.iter().zip(&vec_b).map(|(x, y)| x * y).sum();
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_texts_score_one() {
        let text = "The operator shall have a management system that ensures oversight.";
        let score = cosine_similarity(text, text);
        assert!((score - 1.0).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_disjoint_vocabulary_scores_zero() {
        let score = cosine_similarity("alpha bravo charlie", "delta echo foxtrot");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_empty_text_scores_zero() {
        assert_eq!(cosine_similarity("", "some words here"), 0.0);
        assert_eq!(cosine_similarity("some words here", ""), 0.0);
        assert_eq!(cosine_similarity("", ""), 0.0);
    }

    #[test]
    fn test_single_char_tokens_ignored() {
        // Tokens need at least two word characters
        assert_eq!(cosine_similarity("a b c", "a b c d"), 0.0);
    }

    #[test]
    fn test_partial_overlap_reference_value() {
        // Shared term idf = 1, unique term idf = ln(3/2) + 1
        let score = cosine_similarity("alpha beta", "alpha gamma");
        let unique_idf = (3.0f64 / 2.0).ln() + 1.0;
        let expected = 1.0 / (1.0 + unique_idf * unique_idf);
        assert!((score - expected).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_case_insensitive() {
        let score = cosine_similarity("Compliance Audit", "compliance audit");
        assert!((score - 1.0).abs() < 1e-9);
    }

    proptest! {
        /// Similarity is symmetric for arbitrary texts
        #[test]
        fn prop_symmetric(a in "[a-z ]{0,60}", b in "[a-z ]{0,60}") {
            prop_assert_eq!(
                cosine_similarity(&a, &b).to_bits(),
                cosine_similarity(&b, &a).to_bits()
            );
        }

        /// Score always lands in [0, 1]
        #[test]
        fn prop_bounded(a in "\\PC{0,80}", b in "\\PC{0,80}") {
            let score = cosine_similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        /// A text is always maximally similar to itself (when non-degenerate)
        #[test]
        fn prop_self_similarity(a in "[a-z]{2,12}( [a-z]{2,12}){0,10}") {
            let score = cosine_similarity(&a, &a);
            prop_assert!((score - 1.0).abs() < 1e-9);
        }
    }
}
