//! Flattening a chapter tree into plain text.
//!
//! Paragraphs end with a blank line, `<br>` becomes a single newline, `<hr>`
//! an empty paragraph, and `<img>` an inline marker (see [`crate::marker`]).
//! Every other element is a transparent container.

use crate::dom::{ArenaDom, ArenaNodeData, ArenaNodeId};
use crate::marker::{DEFAULT_ASPECT_RATIO, encode};
use crate::path::resolve;
use crate::resource::{ResourceTable, aspect_ratio};

const PARAGRAPH_BREAK: &str = "\n\n";

/// How the walker treats a node, by tag name (ASCII case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind<'a> {
    Paragraph,
    LineBreak,
    Rule,
    Image,
    Text(&'a str),
    Container,
}

pub(crate) fn classify(dom: &ArenaDom, id: ArenaNodeId) -> NodeKind<'_> {
    match dom.get(id).map(|n| &n.data) {
        Some(ArenaNodeData::Text(text)) => NodeKind::Text(text),
        Some(ArenaNodeData::Element { name, .. }) => {
            let tag: &str = &name.local;
            if tag.eq_ignore_ascii_case("p") {
                NodeKind::Paragraph
            } else if tag.eq_ignore_ascii_case("br") {
                NodeKind::LineBreak
            } else if tag.eq_ignore_ascii_case("hr") {
                NodeKind::Rule
            } else if tag.eq_ignore_ascii_case("img") {
                NodeKind::Image
            } else {
                NodeKind::Container
            }
        }
        _ => NodeKind::Container,
    }
}

/// `h1` through `h6`.
pub(crate) fn is_heading(dom: &ArenaDom, id: ArenaNodeId) -> bool {
    dom.element_name(id).is_some_and(|name| {
        matches!(name.as_bytes(), [b'h' | b'H', b'1'..=b'6'])
    })
}

/// HTML whitespace plus NBSP. Other Unicode spaces, such as the
/// ideographic space in CJK text, are content.
fn is_collapsible(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{000C}' | '\u{00A0}')
}

/// Append `text` with every whitespace run collapsed to one space.
fn push_collapsed(out: &mut String, text: &str) {
    let mut in_space = false;
    for c in text.chars() {
        if is_collapsible(c) {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
}

/// Visible text of an element: descendant text in document order, `<br>`
/// read as a space, whitespace collapsed and trimmed.
pub(crate) fn element_text(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let mut raw = String::new();
    for node in dom.descendants(id) {
        match classify(dom, node) {
            NodeKind::Text(text) => raw.push_str(text),
            NodeKind::LineBreak => raw.push(' '),
            _ => {}
        }
    }
    let mut out = String::with_capacity(raw.len());
    push_collapsed(&mut out, &raw);
    out.trim().to_string()
}

/// Where the walker currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Inside a `<p>`: text flows inline and only the paragraph as a whole
    /// is trimmed.
    Paragraph,
    /// Block level. Loose text becomes its own paragraph, except directly
    /// under the root, where it is emitted bare.
    Block { outermost: bool },
}

/// Walks a parsed chapter and emits its flattened text.
pub(crate) struct TextWalker<'a, R: ResourceTable + ?Sized> {
    dom: &'a ArenaDom,
    document_path: &'a str,
    resources: &'a R,
}

impl<'a, R: ResourceTable + ?Sized> TextWalker<'a, R> {
    pub(crate) fn new(dom: &'a ArenaDom, document_path: &'a str, resources: &'a R) -> Self {
        Self {
            dom,
            document_path,
            resources,
        }
    }

    /// Flatten everything below `root`.
    pub(crate) fn render(&self, root: ArenaNodeId) -> String {
        let mut out = String::new();
        self.walk(root, Context::Block { outermost: true }, &mut out);
        out
    }

    fn walk(&self, node: ArenaNodeId, context: Context, out: &mut String) {
        for child in self.dom.children(node) {
            match (classify(self.dom, child), context) {
                (NodeKind::LineBreak, _) => out.push('\n'),
                (NodeKind::Image, _) => self.image(child, out),
                (NodeKind::Text(text), Context::Paragraph) => push_collapsed(out, text),
                (NodeKind::Text(text), Context::Block { outermost }) => {
                    let mut collapsed = String::new();
                    push_collapsed(&mut collapsed, text);
                    let trimmed = collapsed.trim();
                    if !trimmed.is_empty() {
                        out.push_str(trimmed);
                        if !outermost {
                            out.push_str(PARAGRAPH_BREAK);
                        }
                    }
                }
                (NodeKind::Paragraph, Context::Block { .. }) => self.paragraph(child, out),
                (NodeKind::Rule, Context::Block { .. }) => out.push_str(PARAGRAPH_BREAK),
                (NodeKind::Container, Context::Block { .. }) => {
                    self.walk(child, Context::Block { outermost: false }, out)
                }
                (NodeKind::Paragraph | NodeKind::Rule | NodeKind::Container, Context::Paragraph) => {
                    self.walk(child, Context::Paragraph, out)
                }
            }
        }
    }

    fn paragraph(&self, node: ArenaNodeId, out: &mut String) {
        let mut inner = String::new();
        self.walk(node, Context::Paragraph, &mut inner);
        let trimmed = inner.trim();
        if !trimmed.is_empty() {
            out.push_str(trimmed);
            out.push_str(PARAGRAPH_BREAK);
        }
    }

    fn image(&self, node: ArenaNodeId, out: &mut String) {
        let Some(src) = self.dom.get_attr(node, "src") else {
            tracing::debug!(document = self.document_path, "skipping <img> without src");
            return;
        };

        let path = resolve(self.document_path, src);
        let ratio = aspect_ratio(self.resources, &path).unwrap_or_else(|| {
            tracing::debug!(%path, "image missing or unreadable, using default aspect ratio");
            DEFAULT_ASPECT_RATIO
        });
        out.push_str(&encode(&path, ratio));
    }
}
