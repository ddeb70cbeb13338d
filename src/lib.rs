//! # Palimpsest - Word-level diffing of archived and live web documents
//!
//! Palimpsest compares two versions of the same web document - an archived
//! snapshot and the live page - and produces annotated renderings that
//! highlight additions and removals at word granularity, plus structural
//! diffs of embedded images and metadata, and a similarity score.
//!
//! ## Overview
//!
//! Given the markup of both versions, palimpsest will:
//! - Parse both into arena-backed document trees
//! - Strip archive-service chrome from the archived snapshot
//! - Extract and fingerprint every text leaf in reading order
//! - Anchor byte-identical leaves with a longest-common-subsequence pass
//! - Fuzzily pair the leaves between anchors by word overlap
//! - Word-diff every paired-but-unequal leaf
//! - Annotate both trees in place with `added`/`removed` spans
//! - Diff the image sets and metadata maps independently of text
//! - Serialize two self-contained HTML pages plus a similarity score
//!
//! ## Architecture
//!
//! The pipeline is strictly one-directional:
//!
//! - **Extraction** ([`fingerprint`]): document-order text leaves, each
//!   fingerprinted with the fast order-sensitive djb2 hash
//! - **Alignment** ([`align`]): LCS anchors over fingerprints, then a
//!   greedy similarity-gated pass for the gaps between anchors
//! - **Word diff** ([`worddiff`]): Myers-style token diff with semantic
//!   cleanup, rendered as inline markup
//! - **Structural diff** ([`structural`]): image references (normalized
//!   URLs) and metadata key/value maps
//! - **Annotation** ([`engine`], [`dom`]): in-place leaf replacement and
//!   serialization
//!
//! Everything runs synchronously on the calling thread; each comparison
//! owns its inputs and shares nothing with other runs.
//!
//! ## Quick Start
//!
//! ```rust
//! use palimpsest::{compare_documents, CompareOptions};
//!
//! # fn main() -> palimpsest::Result<()> {
//! let archived = "<html><body><h1>News</h1><p>The quick fox jumps</p></body></html>";
//! let current = "<html><body><h1>News</h1><p>The quick brown fox jumps</p></body></html>";
//!
//! let report = compare_documents(archived, current, &CompareOptions::default())?;
//!
//! println!("similarity: {}%", report.similarity);
//! assert!(report.current_html.contains("<span class=\"added\">brown</span>"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Concepts
//!
//! ### Anchors
//!
//! An anchor is a pair of leaves, one per document, proven identical by
//! fingerprint plus a text equality re-check. Anchors are the fixed
//! points of alignment; the cheap hash only nominates candidates and a
//! collision costs one extra word diff, never a wrong result.
//!
//! ### Fuzzy pairing
//!
//! Leaves trapped between anchors are paired greedily when they share
//! at least half their words (configurable). Unpairable leaves are
//! emitted whole as removed or added.
//!
//! ### Similarity score
//!
//! The percentage of archived characters exactly preserved in the
//! current document. Fuzzy-paired content does not count toward the
//! score - an intentional precision-over-coverage choice, which
//! understates similarity for heavily reordered documents.
//!
//! ## Error Handling
//!
//! All operations return `Result<T, PalimpsestError>`. Unparsable input
//! fails the whole comparison with `MalformedDocument`; a word-diff
//! failure on a single leaf pair silently degrades that pair to a
//! whole-leaf removal/addition instead of aborting the run.
//!
//! ## Module Organization
//!
//! - [`engine`]: end-to-end comparison entry points
//! - [`dom`]: arena document tree, parsing, serialization
//! - [`fingerprint`]: text-leaf extraction and hashing
//! - [`align`]: anchor and fuzzy alignment
//! - [`worddiff`]: token-level diff and inline rendering
//! - [`structural`]: image and metadata diffs
//! - [`archive`]: wayback URL handling and CDX snapshot listings
//! - [`types`]: shared types and options
//! - [`error`]: error types and handling

pub mod align;
pub mod archive;
pub mod dom;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod structural;
pub mod types;
pub mod worddiff;

// Re-export main types for convenience
pub use dom::Document;
pub use engine::{compare_documents, compare_parsed};
pub use error::{PalimpsestError, Result};
pub use types::{
    AnchorMatch, CompareOptions, CompareStats, ComparisonReport, DiffSpan, MetaRow, SpanKind,
};

#[cfg(test)]
mod tests;
