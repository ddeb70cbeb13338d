//! Core data types used throughout the palimpsest library
//!
//! This module contains fundamental data structures that are shared across
//! different components of the library.
//!
//! ## Overview
//!
//! The types in this module represent:
//! - **Alignment**: [`AnchorMatch`] - exact-match fixed points between the
//!   two leaf sequences
//! - **Word diff output**: [`SpanKind`], [`DiffSpan`] - the atomic units of
//!   token-level diff output
//! - **Configuration**: [`CompareOptions`] - parameters of a comparison run
//! - **Results**: [`ComparisonReport`], [`CompareStats`], [`MetaRow`] -
//!   everything a comparison produces
//!
//! ## Examples
//!
//! ```rust
//! use palimpsest::types::CompareOptions;
//!
//! // Tighten the fuzzy-pairing gate for noisy pages
//! let options = CompareOptions {
//!     similarity_threshold: 0.7,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

/// Classification of a word-diff span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanKind {
    /// Token run present in both documents
    Equal,
    /// Token run present only in the current document
    Added,
    /// Token run present only in the archived document
    Removed,
}

impl SpanKind {
    /// The annotation class used when rendering this span
    ///
    /// `added` and `removed` are the only two classes in the markup
    /// contract; `Equal` spans render bare and have no class.
    pub const fn css_class(self) -> Option<&'static str> {
        match self {
            SpanKind::Equal => None,
            SpanKind::Added => Some("added"),
            SpanKind::Removed => Some("removed"),
        }
    }
}

/// The atomic unit of word-level diff output
///
/// A diffed leaf's rendered replacement is an ordered sequence of spans
/// joined by single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSpan {
    /// What happened to this token run
    pub kind: SpanKind,
    /// The tokens of the run, space-joined
    pub text: String,
}

impl DiffSpan {
    /// Construct a span from a kind and text
    pub fn new(kind: SpanKind, text: impl Into<String>) -> Self {
        DiffSpan {
            kind,
            text: text.into(),
        }
    }
}

/// A pair of positions in the two leaf sequences whose fingerprints are
/// equal and which participate in the longest common subsequence
///
/// Anchors are monotonically increasing in both indices by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorMatch {
    /// Index into the archived leaf sequence
    pub archived: usize,
    /// Index into the current leaf sequence
    pub current: usize,
}

/// Options controlling a comparison run
///
/// The similarity threshold and the degradation token budget are heuristic
/// constants inherited from the original design; they are exposed here for
/// tuning rather than treated as load-bearing invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareOptions {
    /// Minimum word-overlap ratio for fuzzy-pairing two leaves (0.0..=1.0)
    pub similarity_threshold: f64,
    /// Remove archive-service toolbar/footer chrome from the archived
    /// document before extraction
    pub strip_archive_chrome: bool,
    /// Per-side token budget of the word diff engine; a leaf pair over
    /// budget degrades to a whole-leaf removal/addition
    pub max_word_diff_tokens: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions {
            similarity_threshold: 0.5,
            strip_archive_chrome: true,
            max_word_diff_tokens: 4096,
        }
    }
}

/// One row of the metadata diff
///
/// Keys missing from a document compare as the empty string, which is
/// itself a visible "value appeared/disappeared" case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRow {
    /// Metadata key (the `name` or `property` attribute)
    pub key: String,
    /// Value in the archived document ("" when absent)
    pub archived: String,
    /// Value in the current document ("" when absent)
    pub current: String,
}

impl MetaRow {
    /// Whether the two sides disagree
    pub fn changed(&self) -> bool {
        self.archived != self.current
    }
}

/// Statistics about one comparison run
///
/// Every extracted leaf is accounted for in exactly one of the first four
/// counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareStats {
    /// Leaf pairs proven identical by fingerprint + text equality
    pub anchored: usize,
    /// Leaf pairs joined by the fuzzy word-overlap gate
    pub fuzzy_paired: usize,
    /// Archived leaves with no counterpart
    pub leaves_removed: usize,
    /// Current leaves with no counterpart
    pub leaves_added: usize,
    /// Leaf pairs that went through the word diff engine
    pub word_diffed: usize,
    /// Leaf pairs demoted to whole-leaf removal/addition after a word
    /// diff failure
    pub degraded_pairs: usize,
    /// Archived images with no normalized-URL match
    pub images_removed: usize,
    /// Current images with no normalized-URL match
    pub images_added: usize,
    /// Metadata keys whose values differ
    pub meta_changed: usize,
}

impl CompareStats {
    /// Check if the comparison found any difference at all
    pub fn has_changes(&self) -> bool {
        self.fuzzy_paired > 0
            || self.leaves_removed > 0
            || self.leaves_added > 0
            || self.word_diffed > 0
            || self.images_removed > 0
            || self.images_added > 0
            || self.meta_changed > 0
    }

    /// Total number of archived leaves accounted for
    pub fn archived_leaves(&self) -> usize {
        self.anchored + self.fuzzy_paired + self.leaves_removed
    }

    /// Total number of current leaves accounted for
    pub fn current_leaves(&self) -> usize {
        self.anchored + self.fuzzy_paired + self.leaves_added
    }
}

/// Everything a comparison run produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// The archived document, annotated and serialized as a
    /// self-contained HTML page
    pub archived_html: String,
    /// The current document, annotated and serialized as a
    /// self-contained HTML page
    pub current_html: String,
    /// Percentage (0..=100) of archived characters exactly preserved in
    /// the current document
    ///
    /// Only anchored leaves count toward the numerator; fuzzy-paired
    /// content is deliberately excluded, trading coverage for precision.
    /// The score therefore understates similarity for heavily reordered
    /// but equivalent documents.
    pub similarity: u8,
    /// Rendered metadata diff table fragment
    pub meta_table_html: String,
    /// Per-category change counts
    pub stats: CompareStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_css_classes() {
        assert_eq!(SpanKind::Added.css_class(), Some("added"));
        assert_eq!(SpanKind::Removed.css_class(), Some("removed"));
        assert_eq!(SpanKind::Equal.css_class(), None);
    }

    #[test]
    fn test_default_options() {
        let options = CompareOptions::default();
        assert_eq!(options.similarity_threshold, 0.5);
        assert!(options.strip_archive_chrome);
    }

    #[test]
    fn test_meta_row_changed() {
        let row = MetaRow {
            key: "description".to_string(),
            archived: "old".to_string(),
            current: "".to_string(),
        };
        assert!(row.changed());

        let same = MetaRow {
            key: "viewport".to_string(),
            archived: "width=device-width".to_string(),
            current: "width=device-width".to_string(),
        };
        assert!(!same.changed());
    }

    #[test]
    fn test_stats_accounting() {
        let stats = CompareStats {
            anchored: 3,
            fuzzy_paired: 2,
            leaves_removed: 1,
            leaves_added: 4,
            ..Default::default()
        };
        assert_eq!(stats.archived_leaves(), 6);
        assert_eq!(stats.current_leaves(), 9);
        assert!(stats.has_changes());
    }
}
