//! Error types for the palimpsest library
//!
//! This module defines all error types that can occur while parsing,
//! aligning, and annotating documents. Errors are designed to be
//! informative: they carry enough context for a caller to show a useful
//! message without inspecting the documents themselves.

use thiserror::Error;

/// Type alias for Results in the palimpsest library
pub type Result<T> = std::result::Result<T, PalimpsestError>;

/// Main error type for all palimpsest operations
#[derive(Debug, Error)]
pub enum PalimpsestError {
    /// Input markup could not be turned into a usable document
    ///
    /// Raised before any diffing happens; a comparison never produces a
    /// partial result from a document that failed to parse.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// I/O errors while reading markup or writing rendered output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors while decoding archive listing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive listing rows did not match the expected CDX shape
    #[error("Invalid archive listing: {0}")]
    InvalidListing(String),

    /// A leaf pair exceeded the word diff engine's token budget
    ///
    /// The comparison engine catches this per pair and degrades the pair
    /// to a whole-leaf removal/addition instead of aborting the run.
    #[error(
        "Word diff overflow: {archived_tokens}x{current_tokens} tokens exceeds limit of {limit}"
    )]
    WordDiffOverflow {
        /// Token count of the archived-side leaf
        archived_tokens: usize,
        /// Token count of the current-side leaf
        current_tokens: usize,
        /// Configured per-side token limit
        limit: usize,
    },

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PalimpsestError {
    /// Create a malformed-document error with a custom message
    pub fn malformed(msg: impl Into<String>) -> Self {
        PalimpsestError::MalformedDocument(msg.into())
    }

    /// Create an invalid-listing error with a custom message
    pub fn listing(msg: impl Into<String>) -> Self {
        PalimpsestError::InvalidListing(msg.into())
    }

    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        PalimpsestError::Internal(msg.into())
    }

    /// Check whether this error may be absorbed by degrading a single
    /// leaf pair rather than failing the whole comparison
    pub fn is_degradable(&self) -> bool {
        matches!(self, PalimpsestError::WordDiffOverflow { .. })
    }
}
