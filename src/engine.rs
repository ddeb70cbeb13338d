//! The comparison engine
//!
//! This module wires the pipeline together: parse both markup inputs,
//! strip archive chrome, extract and fingerprint text leaves, align the
//! two sequences, word-diff every aligned-but-unequal pair, annotate both
//! trees in place, run the structural diffs, and serialize the results.
//!
//! The whole run is a synchronous, single-threaded transformation. Each
//! invocation owns its two documents for the duration of the call; there
//! is no shared state and no persistence across runs.
//!
//! ## Example
//!
//! ```rust
//! use palimpsest::{compare_documents, CompareOptions};
//!
//! # fn main() -> palimpsest::Result<()> {
//! let archived = "<html><body><p>The quick fox jumps</p></body></html>";
//! let current = "<html><body><p>The quick brown fox jumps</p></body></html>";
//!
//! let report = compare_documents(archived, current, &CompareOptions::default())?;
//! assert!(report.current_html.contains("<span class=\"added\">brown</span>"));
//! # Ok(())
//! # }
//! ```

use crate::align::{align_leaves, LeafDisposition};
use crate::archive::strip_wayback_chrome;
use crate::dom::{escape_text, Document, NodeId};
use crate::error::Result;
use crate::fingerprint::{collect_text_leaves, TextLeaf};
use crate::structural::{diff_images, diff_metadata, render_meta_table};
use crate::types::{CompareOptions, CompareStats, ComparisonReport};
use crate::worddiff::diff_words;
use tracing::{debug, info, warn};

/// Compare two documents given their raw markup
///
/// Parses both inputs and runs [`compare_parsed`]. Parsing failures
/// surface as [`MalformedDocument`](crate::PalimpsestError::MalformedDocument)
/// before any diffing happens; there is no partial-result mode.
pub fn compare_documents(
    archived_markup: &str,
    current_markup: &str,
    options: &CompareOptions,
) -> Result<ComparisonReport> {
    let archived = Document::parse(archived_markup)?;
    let current = Document::parse(current_markup)?;
    compare_parsed(archived, current, options)
}

/// Compare two parsed documents
///
/// Takes ownership of both trees: annotation mutates them in place and
/// they are consumed into the serialized report.
pub fn compare_parsed(
    mut archived: Document,
    mut current: Document,
    options: &CompareOptions,
) -> Result<ComparisonReport> {
    if options.strip_archive_chrome {
        strip_wayback_chrome(&mut archived);
    }

    let archived_leaves = collect_text_leaves(&archived);
    let current_leaves = collect_text_leaves(&current);
    info!(
        "Comparing documents: {} archived leaves, {} current leaves",
        archived_leaves.len(),
        current_leaves.len()
    );

    let dispositions = align_leaves(&archived_leaves, &current_leaves, options.similarity_threshold);
    debug!("Alignment produced {} dispositions", dispositions.len());

    let mut stats = CompareStats::default();
    let mut matched_chars: usize = 0;

    for disposition in &dispositions {
        match *disposition {
            LeafDisposition::Anchored {
                archived: a,
                current: c,
            } => {
                stats.anchored += 1;
                let arch_leaf = &archived_leaves[a];
                let cur_leaf = &current_leaves[c];
                if arch_leaf.text == cur_leaf.text {
                    matched_chars += arch_leaf.len;
                } else {
                    // Fingerprint collision: same hash, different text.
                    // Diff the pair instead of silently skipping it.
                    debug!("Hash collision on anchored pair, word-diffing");
                    diff_pair(
                        &mut archived,
                        &mut current,
                        arch_leaf,
                        cur_leaf,
                        options,
                        &mut stats,
                    )?;
                }
            }
            LeafDisposition::Paired {
                archived: a,
                current: c,
            } => {
                stats.fuzzy_paired += 1;
                diff_pair(
                    &mut archived,
                    &mut current,
                    &archived_leaves[a],
                    &current_leaves[c],
                    options,
                    &mut stats,
                )?;
            }
            LeafDisposition::Removed { archived: a } => {
                stats.leaves_removed += 1;
                wrap_leaf(&mut archived, &archived_leaves[a], "removed");
            }
            LeafDisposition::Added { current: c } => {
                stats.leaves_added += 1;
                wrap_leaf(&mut current, &current_leaves[c], "added");
            }
        }
    }

    let images = diff_images(&archived, &current);
    stats.images_removed = images.removed.len();
    stats.images_added = images.added.len();
    for id in images.removed {
        wrap_node(&mut archived, id, "removed");
    }
    for id in images.added {
        wrap_node(&mut current, id, "added");
    }

    let meta_rows = diff_metadata(&archived, &current);
    stats.meta_changed = meta_rows.iter().filter(|r| r.changed()).count();
    let meta_table_html = render_meta_table(&meta_rows);

    let total_archived_chars: usize = archived_leaves.iter().map(|l| l.len).sum();
    // Precision over coverage: only anchored content counts as matched,
    // and integer division keeps 100 reserved for exact preservation.
    let similarity = if total_archived_chars == 0 {
        0
    } else {
        (matched_chars * 100 / total_archived_chars) as u8
    };

    info!(
        "Comparison finished: similarity {}%, {} anchored, {} fuzzy, {} removed, {} added",
        similarity, stats.anchored, stats.fuzzy_paired, stats.leaves_removed, stats.leaves_added
    );

    Ok(ComparisonReport {
        archived_html: archived.build_full_html(),
        current_html: current.build_full_html(),
        similarity,
        meta_table_html,
        stats,
    })
}

/// Word-diff one aligned pair and annotate both leaves
///
/// A word diff failure for a single pair must not abort the run: the pair
/// degrades to a whole-leaf removal/addition instead.
fn diff_pair(
    archived: &mut Document,
    current: &mut Document,
    arch_leaf: &TextLeaf,
    cur_leaf: &TextLeaf,
    options: &CompareOptions,
    stats: &mut CompareStats,
) -> Result<()> {
    match diff_words(&arch_leaf.text, &cur_leaf.text, options.max_word_diff_tokens) {
        Ok(diff) => {
            annotate_leaf(archived, arch_leaf.node, &diff.archived_html());
            annotate_leaf(current, cur_leaf.node, &diff.current_html());
            stats.word_diffed += 1;
            Ok(())
        }
        Err(err) if err.is_degradable() => {
            warn!("Word diff degraded to whole-leaf pair: {err}");
            wrap_leaf(archived, arch_leaf, "removed");
            wrap_leaf(current, cur_leaf, "added");
            stats.degraded_pairs += 1;
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Replace a leaf with a wrapping element carrying annotation markup
fn annotate_leaf(doc: &mut Document, node: NodeId, inner_html: &str) {
    doc.replace_with_fragment(node, format!("<span>{inner_html}</span>"));
}

/// Wrap an entire leaf as removed/added
fn wrap_leaf(doc: &mut Document, leaf: &TextLeaf, class: &str) {
    annotate_leaf(
        doc,
        leaf.node,
        &format!("<span class=\"{}\">{}</span>", class, escape_text(&leaf.text)),
    );
}

/// Wrap a whole element (serialized in place) as removed/added
fn wrap_node(doc: &mut Document, node: NodeId, class: &str) {
    let html = doc.serialize_node(node);
    doc.replace_with_fragment(node, format!("<span class=\"{class}\">{html}</span>"));
}
