//! Sequence alignment of text leaves
//!
//! Alignment runs in two passes. First, a longest-common-subsequence pass
//! over the leaf fingerprints finds anchors: positions where content is
//! byte-identical in both documents. The anchors partition both sequences
//! into short gaps, and a second greedy pass pairs leaves inside each gap
//! using a word-overlap similarity gate, falling back to unmatched
//! removal/addition when no pairing clears the gate.
//!
//! The output is an explicit per-leaf disposition stream, kept separate
//! from rendering so alignment and annotation can be tested on their own.
//! Every leaf of both sequences appears in exactly one disposition.

use crate::fingerprint::TextLeaf;
use crate::types::AnchorMatch;

/// What the aligner decided for one leaf (or leaf pair)
///
/// Indices point into the archived and current leaf sequences that were
/// passed to [`align_leaves`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafDisposition {
    /// Fingerprint-identical pair on the LCS backbone
    Anchored {
        /// Index into the archived sequence
        archived: usize,
        /// Index into the current sequence
        current: usize,
    },
    /// Pair joined by the word-overlap gate inside a gap
    Paired {
        /// Index into the archived sequence
        archived: usize,
        /// Index into the current sequence
        current: usize,
    },
    /// Archived leaf with no counterpart
    Removed {
        /// Index into the archived sequence
        archived: usize,
    },
    /// Current leaf with no counterpart
    Added {
        /// Index into the current sequence
        current: usize,
    },
}

/// Longest common subsequence of two fingerprint sequences
///
/// Classic O(m*n) dynamic programming with backward reconstruction. On a
/// tie (`dp[i-1][j] == dp[i][j-1]`) the archived index is consumed first,
/// matching the iterative left-to-right reconstruction of the alignment.
/// Returned anchors are strictly increasing in both indices.
pub fn compute_lcs(archived: &[i32], current: &[i32]) -> Vec<AnchorMatch> {
    let m = archived.len();
    let n = current.len();
    if m == 0 || n == 0 {
        return Vec::new();
    }

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            if archived[i - 1] == current[j - 1] {
                dp[i][j] = dp[i - 1][j - 1] + 1;
            } else {
                dp[i][j] = dp[i - 1][j].max(dp[i][j - 1]);
            }
        }
    }

    let mut anchors = Vec::with_capacity(dp[m][n]);
    let mut i = m;
    let mut j = n;
    while i > 0 && j > 0 {
        if archived[i - 1] == current[j - 1] {
            anchors.push(AnchorMatch {
                archived: i - 1,
                current: j - 1,
            });
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] >= dp[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    anchors.reverse();
    anchors
}

/// Word-overlap similarity between two texts
///
/// The fraction of one side's words found anywhere in the other,
/// normalized by the larger word count. Word-set containment, not edit
/// distance: cheap, order-insensitive, and good enough to gate pairing of
/// short gap segments. Returns 0.0 when either side has no words.
pub fn word_overlap(a: &str, b: &str) -> f64 {
    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }
    let b_set: std::collections::HashSet<&str> = words_b.iter().copied().collect();
    let common = words_a.iter().filter(|w| b_set.contains(*w)).count();
    common as f64 / words_a.len().max(words_b.len()) as f64
}

/// Align two leaf sequences into a disposition stream
///
/// `threshold` is the word-overlap gate for fuzzy pairing inside gaps
/// (0.5 in the original design; heuristic, not load-bearing).
pub fn align_leaves(
    archived: &[TextLeaf],
    current: &[TextLeaf],
    threshold: f64,
) -> Vec<LeafDisposition> {
    let archived_hashes: Vec<i32> = archived.iter().map(|l| l.hash).collect();
    let current_hashes: Vec<i32> = current.iter().map(|l| l.hash).collect();
    let anchors = compute_lcs(&archived_hashes, &current_hashes);

    let mut out = Vec::with_capacity(archived.len().max(current.len()));
    let mut a_start = 0;
    let mut c_start = 0;
    for anchor in &anchors {
        align_segment(
            &archived[a_start..anchor.archived],
            &current[c_start..anchor.current],
            a_start,
            c_start,
            threshold,
            &mut out,
        );
        out.push(LeafDisposition::Anchored {
            archived: anchor.archived,
            current: anchor.current,
        });
        a_start = anchor.archived + 1;
        c_start = anchor.current + 1;
    }
    align_segment(
        &archived[a_start..],
        &current[c_start..],
        a_start,
        c_start,
        threshold,
        &mut out,
    );
    out
}

/// Greedily pair the leaves of one inter-anchor gap
///
/// While both slices have leaves left: pair when the overlap clears the
/// gate, otherwise emit the shorter candidate (by character count)
/// unpaired and advance only that side. Remainders after one slice runs
/// out are emitted unpaired. O(gap) and not globally optimal; gaps are
/// short because anchors are dense on real pages.
fn align_segment(
    archived: &[TextLeaf],
    current: &[TextLeaf],
    a_base: usize,
    c_base: usize,
    threshold: f64,
    out: &mut Vec<LeafDisposition>,
) {
    let mut i = 0;
    let mut j = 0;
    while i < archived.len() && j < current.len() {
        if word_overlap(&archived[i].text, &current[j].text) >= threshold {
            out.push(LeafDisposition::Paired {
                archived: a_base + i,
                current: c_base + j,
            });
            i += 1;
            j += 1;
        } else if archived[i].len < current[j].len {
            out.push(LeafDisposition::Removed {
                archived: a_base + i,
            });
            i += 1;
        } else {
            out.push(LeafDisposition::Added { current: c_base + j });
            j += 1;
        }
    }
    while i < archived.len() {
        out.push(LeafDisposition::Removed {
            archived: a_base + i,
        });
        i += 1;
    }
    while j < current.len() {
        out.push(LeafDisposition::Added { current: c_base + j });
        j += 1;
    }
}
