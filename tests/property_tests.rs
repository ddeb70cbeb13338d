//! Property-based testing for palimpsest
//!
//! Uses proptest to verify alignment and scoring invariants across
//! randomly generated documents and token sequences.

use palimpsest::align::{align_leaves, compute_lcs, LeafDisposition};
use palimpsest::fingerprint::collect_text_leaves;
use palimpsest::worddiff::diff_words;
use palimpsest::{compare_documents, CompareOptions, Document};
use proptest::prelude::*;

/// A lowercase word, short enough to keep cases readable
fn word_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

/// A paragraph of 1..=6 words
fn paragraph_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(word_strategy(), 1..=6).prop_map(|words| words.join(" "))
}

/// A page body of 0..8 paragraphs
fn page_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(paragraph_strategy(), 0..8).prop_map(|paragraphs| {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<p>{p}</p>"))
            .collect();
        format!("<html><body>{body}</body></html>")
    })
}

/// Hash sequences with a small value range, so repeats (and therefore
/// non-trivial common subsequences) are frequent
fn hash_seq_strategy() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(0..6i32, 0..20)
}

proptest! {
    #[test]
    fn anchors_are_strictly_monotonic(a in hash_seq_strategy(), b in hash_seq_strategy()) {
        let anchors = compute_lcs(&a, &b);
        for pair in anchors.windows(2) {
            prop_assert!(pair[1].archived > pair[0].archived);
            prop_assert!(pair[1].current > pair[0].current);
        }
        for anchor in &anchors {
            prop_assert_eq!(a[anchor.archived], b[anchor.current]);
        }
    }

    #[test]
    fn alignment_covers_every_leaf_exactly_once(
        archived_page in page_strategy(),
        current_page in page_strategy(),
    ) {
        let archived = Document::parse(&archived_page).unwrap();
        let current = Document::parse(&current_page).unwrap();
        let archived_leaves = collect_text_leaves(&archived);
        let current_leaves = collect_text_leaves(&current);

        let dispositions = align_leaves(&archived_leaves, &current_leaves, 0.5);

        let mut seen_archived = vec![0usize; archived_leaves.len()];
        let mut seen_current = vec![0usize; current_leaves.len()];
        for disposition in &dispositions {
            match *disposition {
                LeafDisposition::Anchored { archived, current }
                | LeafDisposition::Paired { archived, current } => {
                    seen_archived[archived] += 1;
                    seen_current[current] += 1;
                }
                LeafDisposition::Removed { archived } => seen_archived[archived] += 1,
                LeafDisposition::Added { current } => seen_current[current] += 1,
            }
        }
        prop_assert!(seen_archived.iter().all(|&n| n == 1));
        prop_assert!(seen_current.iter().all(|&n| n == 1));
    }

    #[test]
    fn similarity_stays_in_bounds(
        archived_page in page_strategy(),
        current_page in page_strategy(),
    ) {
        let report =
            compare_documents(&archived_page, &current_page, &CompareOptions::default()).unwrap();
        prop_assert!(report.similarity <= 100);
    }

    #[test]
    fn identity_comparison_is_full_similarity(page in page_strategy()) {
        let report = compare_documents(&page, &page, &CompareOptions::default()).unwrap();
        let doc = Document::parse(&page).unwrap();
        if collect_text_leaves(&doc).is_empty() {
            // Degenerate document: no extractable text scores zero
            prop_assert_eq!(report.similarity, 0);
        } else {
            prop_assert_eq!(report.similarity, 100);
            prop_assert!(!report.stats.has_changes());
        }
    }

    #[test]
    fn word_diff_reconstructs_both_sides(
        archived in paragraph_strategy(),
        current in paragraph_strategy(),
    ) {
        let diff = diff_words(&archived, &current, 4096).unwrap();
        let archived_tokens: Vec<&str> = diff
            .archived
            .iter()
            .flat_map(|span| span.text.split_whitespace())
            .collect();
        let current_tokens: Vec<&str> = diff
            .current
            .iter()
            .flat_map(|span| span.text.split_whitespace())
            .collect();
        prop_assert_eq!(archived_tokens, archived.split_whitespace().collect::<Vec<_>>());
        prop_assert_eq!(current_tokens, current.split_whitespace().collect::<Vec<_>>());
    }
}
