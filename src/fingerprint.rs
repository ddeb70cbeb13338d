//! Text-leaf extraction and fingerprinting
//!
//! The extractor walks a document's body in reading order and yields every
//! text leaf whose trimmed content is non-empty; whitespace-only runs are
//! excluded entirely and never resurface in alignment or rendering.
//!
//! Each leaf carries a djb2 fingerprint of its normalized text. The hash
//! is fast and order-sensitive but not collision-free; anchor processing
//! re-verifies string equality before treating content as identical, so a
//! collision costs one extra word diff rather than a wrong result.

use crate::dom::{Document, NodeData, NodeId};

/// One extracted text leaf, bound to its position in the owning document
///
/// `node` is a back-reference, never an ownership edge: replacing the leaf
/// in the document later does not invalidate this record.
#[derive(Debug, Clone)]
pub struct TextLeaf {
    /// Arena slot of the originating text node
    pub node: NodeId,
    /// Leaf text trimmed of leading/trailing whitespace; no case or
    /// punctuation folding
    pub text: String,
    /// djb2 fingerprint of `text`
    pub hash: i32,
    /// Length of `text` in UTF-16 code units
    pub len: usize,
}

/// djb2 hash with 32-bit signed wrap-around
///
/// Iterates `hash = hash * 33 + unit` over the UTF-16 code units of the
/// input, truncating to 32 bits at each step. UTF-16 units (not bytes,
/// not scalar values) keep fingerprints stable for documents containing
/// text outside the BMP.
///
/// # Example
///
/// ```rust
/// use palimpsest::fingerprint::djb2;
///
/// assert_eq!(djb2(""), 5381);
/// assert_eq!(djb2("a"), 5381 * 33 + 97);
/// assert_ne!(djb2("ab"), djb2("ba"));
/// ```
pub fn djb2(text: &str) -> i32 {
    let mut hash: i32 = 5381;
    for unit in text.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(unit as i32);
    }
    hash
}

/// Extract the ordered leaf sequence of a document's body
///
/// Traversal is depth-first in document order, so the sequence follows
/// the page's natural reading order. The sequence order is semantically
/// meaningful: alignment is sequence-aware, not set-based.
pub fn collect_text_leaves(doc: &Document) -> Vec<TextLeaf> {
    let Some(body) = doc.body() else {
        return Vec::new();
    };
    let mut leaves = Vec::new();
    for id in doc.descendants(body) {
        if let NodeData::Text(raw) = doc.data(id) {
            let text = raw.trim();
            if text.is_empty() {
                continue;
            }
            leaves.push(TextLeaf {
                node: id,
                text: text.to_string(),
                hash: djb2(text),
                len: text.encode_utf16().count(),
            });
        }
    }
    leaves
}
