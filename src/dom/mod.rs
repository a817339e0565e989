//! Markup tree for a single chapter document.
//!
//! html5ever does the tokenizing and error recovery; [`ArenaSink`] collects
//! its output into an [`ArenaDom`] that the text walker reads.

mod arena;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute};
pub use tree_sink::ArenaSink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse markup into an arena DOM.
///
/// Never fails: malformed markup is repaired the way a browser would.
pub fn parse_html(html: &str) -> ArenaDom {
    let sink = ArenaSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}
