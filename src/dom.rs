//! Arena-backed document tree
//!
//! This module owns the document model the rest of the library works on.
//! Markup is parsed with html5ever and converted into a flat arena of
//! nodes addressed by stable [`NodeId`] indices.
//!
//! ## Why an arena
//!
//! Annotation replaces leaves in place: a diffed text run becomes a markup
//! fragment carrying `added`/`removed` spans. With an arena, that
//! replacement is a swap of the slot's content tag (`Text` -> `Fragment`)
//! rather than pointer surgery, so every other [`NodeId`] handed out
//! earlier stays valid and parent/sibling structure is untouched.
//!
//! ## Serialization
//!
//! Serialization is the crate's own: fragments hold raw diff markup that
//! must be emitted verbatim, which rules out a generic HTML serializer.
//! [`Document::build_full_html`] produces a self-contained page carrying
//! over the source document's stylesheet links plus the two highlight
//! rules of the annotation contract.

use crate::error::{PalimpsestError, Result};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use tracing::debug;

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Raw-text elements whose contents are emitted without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Highlight rules injected into every rendered page; `added` and
/// `removed` are the only two classes in the annotation contract.
const DIFF_STYLE: &str = "\
.added { background-color: #e6ffe6; }\n\
.removed { background-color: #ffe6e6; text-decoration: line-through; }";

/// Stable index of a node slot in a [`Document`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Content of one arena slot
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Structural element with its tag and source-ordered attributes
    Element {
        /// Lowercased tag name
        tag: String,
        /// Attributes in source order
        attrs: Vec<(String, String)>,
    },
    /// Text run
    Text(String),
    /// Raw markup that replaced a node during annotation; emitted verbatim
    Fragment(String),
}

/// A single node: tree links plus content
#[derive(Debug, Clone)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Slot content; swapped in place by annotation
    pub data: NodeData,
}

/// An ordered tree of nodes parsed from HTML markup
///
/// Each comparison run owns its two `Document` instances exclusively;
/// nothing is shared across runs.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Parse HTML markup into a document
    ///
    /// html5ever error-corrects aggressively, so "unparsable" in practice
    /// means markup that yields no usable tree at all: empty or
    /// whitespace-only input, or a parse that produces no `<body>`.
    ///
    /// # Errors
    ///
    /// Returns [`PalimpsestError::MalformedDocument`] for such input; no
    /// partial document is ever produced.
    pub fn parse(markup: &str) -> Result<Document> {
        if markup.trim().is_empty() {
            return Err(PalimpsestError::malformed("empty input markup"));
        }

        let rcdom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut markup.as_bytes())
            .map_err(|e| PalimpsestError::malformed(format!("parse failed: {e}")))?;

        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let root = doc.push_node(
            NodeData::Element {
                tag: "#document".to_string(),
                attrs: Vec::new(),
            },
            None,
        );
        doc.root = root;
        convert_children(&rcdom.document, &mut doc, root);

        if doc.body().is_none() {
            return Err(PalimpsestError::malformed("document has no body"));
        }
        debug!("Parsed document with {} nodes", doc.nodes.len());
        Ok(doc)
    }

    fn push_node(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            data,
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    /// The synthetic document root
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Slot content of a node
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Children of a node, in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent of a node, if still attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Tag name, for element nodes
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Attribute lookup on an element node
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Depth-first, document-order traversal starting at (and including)
    /// `start`
    pub fn descendants(&self, start: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![start],
        }
    }

    /// The `<body>` element, when present
    pub fn body(&self) -> Option<NodeId> {
        self.find_tag("body")
    }

    /// The `<head>` element, when present
    pub fn head(&self) -> Option<NodeId> {
        self.find_tag("head")
    }

    fn find_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .find(|&id| self.tag(id) == Some(tag))
    }

    /// First element whose `id` attribute equals `value`
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .find(|&id| self.attr(id, "id") == Some(value))
    }

    /// Detach a node from its parent
    ///
    /// The arena slot stays allocated (ids remain stable) but the node no
    /// longer appears in traversal or serialization.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Replace a node's content with a raw markup fragment
    ///
    /// This is the annotation primitive: the slot's content is swapped,
    /// its children are dropped from traversal, and surrounding structure
    /// is untouched.
    pub fn replace_with_fragment(&mut self, id: NodeId, html: impl Into<String>) {
        self.nodes[id.0].children.clear();
        self.nodes[id.0].data = NodeData::Fragment(html.into());
    }

    /// Serialize the subtree rooted at `id`
    pub fn serialize_node(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_into(id, &mut out);
        out
    }

    fn serialize_into(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => out.push_str(&escape_text(text)),
            NodeData::Fragment(html) => out.push_str(html),
            NodeData::Element { tag, attrs } => {
                // The synthetic root has no markup of its own
                if tag == "#document" {
                    for &child in &self.nodes[id.0].children {
                        self.serialize_into(child, out);
                    }
                    return;
                }
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                let raw_text = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
                for &child in &self.nodes[id.0].children {
                    match &self.nodes[child.0].data {
                        NodeData::Text(text) if raw_text => out.push_str(text),
                        _ => self.serialize_into(child, out),
                    }
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    /// Serialize the body's inner content
    pub fn body_html(&self) -> String {
        let mut out = String::new();
        if let Some(body) = self.body() {
            for &child in self.children(body) {
                self.serialize_into(child, &mut out);
            }
        }
        out
    }

    /// Collect the document's own styling: `<link rel="stylesheet">` and
    /// `<style>` tags, serialized in document order
    pub fn head_css(&self) -> String {
        let mut css = String::new();
        for id in self.descendants(self.root) {
            let keep = match self.tag(id) {
                Some("style") => true,
                Some("link") => self.attr(id, "rel") == Some("stylesheet"),
                _ => false,
            };
            if keep {
                css.push_str(&self.serialize_node(id));
                css.push('\n');
            }
        }
        css
    }

    /// Render the document as a self-contained page
    ///
    /// The output carries the source document's stylesheet links plus the
    /// `added`/`removed` highlight rules, wrapped around the (annotated)
    /// body content.
    pub fn build_full_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n{}<style>\n{}\n</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            self.head_css(),
            DIFF_STYLE,
            self.body_html(),
        )
    }
}

/// Depth-first preorder traversal over a [`Document`]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        // Reverse push keeps children in document order
        for &child in self.doc.children(id).iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}

/// Copy rcdom children into the arena, dropping comments, doctypes, and
/// processing instructions
fn convert_children(handle: &Handle, doc: &mut Document, parent: NodeId) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            RcNodeData::Element { name, attrs, .. } => {
                let attrs = attrs
                    .borrow()
                    .iter()
                    .map(|a| (a.name.local.to_string(), a.value.to_string()))
                    .collect();
                let id = doc.push_node(
                    NodeData::Element {
                        tag: name.local.to_string(),
                        attrs,
                    },
                    Some(parent),
                );
                convert_children(child, doc, id);
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                doc.push_node(NodeData::Text(text), Some(parent));
            }
            RcNodeData::Document
            | RcNodeData::Doctype { .. }
            | RcNodeData::Comment { .. }
            | RcNodeData::ProcessingInstruction { .. } => {}
        }
    }
}

/// Escape text content for HTML emission
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value for HTML emission
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
