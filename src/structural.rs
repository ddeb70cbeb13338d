//! Structural diffing: embedded images and document metadata
//!
//! Both diffs run independently of text alignment. Images are compared as
//! sets of normalized resource URLs (archive-service rewriting stripped),
//! metadata as key/value maps keyed by the `name` or `property` attribute
//! of `<meta>` tags. Matching is exact: normalized-URL equality for
//! images, string equality for metadata values.

use crate::archive::original_url;
use crate::dom::{escape_text, Document, NodeId};
use crate::types::MetaRow;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Wrap decisions for the image diff
///
/// Node ids index into the document each vector belongs to: `removed`
/// into the archived document, `added` into the current one.
#[derive(Debug, Clone, Default)]
pub struct ImageDiff {
    /// Archived images whose normalized URL has no match in the current set
    pub removed: Vec<NodeId>,
    /// Current images whose normalized URL has no match in the archived set
    pub added: Vec<NodeId>,
}

/// Collect `(node, normalized src)` for every image in the body
fn collect_image_refs(doc: &Document) -> Vec<(NodeId, String)> {
    let Some(body) = doc.body() else {
        return Vec::new();
    };
    doc.descendants(body)
        .filter(|&id| doc.tag(id) == Some("img"))
        .filter_map(|id| {
            doc.attr(id, "src")
                .map(|src| (id, original_url(src).to_string()))
        })
        .collect()
}

/// Compare the embedded-image sets of the two documents
pub fn diff_images(archived: &Document, current: &Document) -> ImageDiff {
    let archived_refs = collect_image_refs(archived);
    let current_refs = collect_image_refs(current);

    let archived_urls: HashSet<&str> = archived_refs.iter().map(|(_, u)| u.as_str()).collect();
    let current_urls: HashSet<&str> = current_refs.iter().map(|(_, u)| u.as_str()).collect();

    let diff = ImageDiff {
        removed: archived_refs
            .iter()
            .filter(|(_, url)| !current_urls.contains(url.as_str()))
            .map(|(id, _)| *id)
            .collect(),
        added: current_refs
            .iter()
            .filter(|(_, url)| !archived_urls.contains(url.as_str()))
            .map(|(id, _)| *id)
            .collect(),
    };
    debug!(
        "Image diff: {} removed, {} added",
        diff.removed.len(),
        diff.added.len()
    );
    diff
}

/// Build a document's metadata map: key = `name` or `property` attribute
/// of a `<meta>` tag, value = its `content` attribute
pub fn collect_metadata(doc: &Document) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for id in doc.descendants(doc.root()) {
        if doc.tag(id) != Some("meta") {
            continue;
        }
        let key = doc.attr(id, "name").or_else(|| doc.attr(id, "property"));
        if let Some(key) = key {
            let content = doc.attr(id, "content").unwrap_or_default();
            map.insert(key.to_string(), content.to_string());
        }
    }
    map
}

/// Compare the metadata maps of the two documents
///
/// The key sets are unioned; a key missing from one side compares as the
/// empty string. Rows come out in key order.
pub fn diff_metadata(archived: &Document, current: &Document) -> Vec<MetaRow> {
    let archived_meta = collect_metadata(archived);
    let current_meta = collect_metadata(current);

    let keys: std::collections::BTreeSet<&String> =
        archived_meta.keys().chain(current_meta.keys()).collect();
    keys.into_iter()
        .map(|key| MetaRow {
            key: key.clone(),
            archived: archived_meta.get(key).cloned().unwrap_or_default(),
            current: current_meta.get(key).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Render the metadata diff as an HTML table fragment
///
/// Unchanged rows render plain; changed rows mark the archived value
/// `removed` and the current value `added`. Empty values render as empty
/// cells, so an appeared/disappeared key is visible as a half-marked row.
pub fn render_meta_table(rows: &[MetaRow]) -> String {
    let mut out = String::from(
        "<table class=\"meta-diff\">\n<tr><th>Key</th><th>Archived</th><th>Current</th></tr>\n",
    );
    for row in rows {
        out.push_str("<tr><td>");
        out.push_str(&escape_text(&row.key));
        out.push_str("</td><td>");
        out.push_str(&meta_cell(&row.archived, row.changed(), "removed"));
        out.push_str("</td><td>");
        out.push_str(&meta_cell(&row.current, row.changed(), "added"));
        out.push_str("</td></tr>\n");
    }
    out.push_str("</table>\n");
    out
}

fn meta_cell(value: &str, changed: bool, class: &str) -> String {
    if value.is_empty() {
        String::new()
    } else if changed {
        format!("<span class=\"{}\">{}</span>", class, escape_text(value))
    } else {
        escape_text(value)
    }
}
