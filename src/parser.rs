//! Chapter parsing entry point.
//!
//! [`ChapterParser::parse`] turns the raw bytes of one chapter document into a
//! [`Chapter`]: the text of its first heading as the title, and the rest of
//! the body flattened by [`crate::text`].

use crate::dom::{self, ArenaDom, ArenaNodeId};
use crate::error::{Error, Result};
use crate::resource::ResourceTable;
use crate::text::{NodeKind, TextWalker, classify, element_text, is_heading};
use crate::util::{decode_text, extract_xml_encoding, looks_binary};

/// Options for [`ChapterParser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Emit inline markers for `<img>` elements.
    ///
    /// Off by default: images are dropped before the body is flattened,
    /// for readers that cannot yet render markers.
    pub include_images: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether images become inline markers.
    pub fn with_images(mut self, include_images: bool) -> Self {
        self.include_images = include_images;
        self
    }
}

/// A parsed chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chapter {
    /// Text of the first `h1` to `h6`, if any.
    pub title: Option<String>,
    /// Flattened body text, heading removed.
    pub body: String,
}

/// Parses chapter documents into [`Chapter`]s.
///
/// Holds only options; one parser can be shared across threads and reused
/// for every chapter of a book.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterParser {
    options: ParseOptions,
}

impl ChapterParser {
    /// Create a parser with default options (images stripped).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with the specified options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parse one chapter.
    ///
    /// `document_path` is the chapter's location inside its container; image
    /// links are resolved against it and looked up in `resources`.
    ///
    /// Fails only when `data` cannot be markup at all, such as an image or
    /// other binary content. A document without `<body>` (a frameset) is
    /// flattened from its frameset instead.
    pub fn parse<R>(&self, data: &[u8], document_path: &str, resources: &R) -> Result<Chapter>
    where
        R: ResourceTable + ?Sized,
    {
        if looks_binary(data) {
            return Err(Error::UnparsableDocument(format!(
                "{document_path}: binary content"
            )));
        }

        let html = decode_text(data, extract_xml_encoding(data));
        let mut dom = dom::parse_html(&html);
        let body = dom.content_root();

        let heading = first_heading(&dom, body);
        let title = heading.map(|id| element_text(&dom, id));
        if let Some(id) = heading {
            dom.detach(id);
        }

        if !self.options.include_images {
            let stripped = strip_images(&mut dom, body);
            tracing::trace!(document = document_path, stripped, "removed images");
        }

        let text = TextWalker::new(&dom, document_path, resources).render(body);
        tracing::debug!(
            document = document_path,
            title = title.as_deref(),
            chars = text.len(),
            "parsed chapter"
        );

        Ok(Chapter { title, body: text })
    }
}

/// Parse one chapter with default options.
///
/// ```
/// use std::collections::HashMap;
///
/// let resources: HashMap<String, Vec<u8>> = HashMap::new();
/// let chapter = chaptext::parse_chapter(
///     b"<h2>Chapter 1</h2><p>Hello<br/>World</p><hr/><p>  </p>",
///     "OEBPS/text/ch1.xhtml",
///     &resources,
/// )
/// .unwrap();
///
/// assert_eq!(chapter.title.as_deref(), Some("Chapter 1"));
/// assert_eq!(chapter.body, "Hello\nWorld\n\n\n\n");
/// ```
pub fn parse_chapter<R>(data: &[u8], document_path: &str, resources: &R) -> Result<Chapter>
where
    R: ResourceTable + ?Sized,
{
    ChapterParser::new().parse(data, document_path, resources)
}

fn first_heading(dom: &ArenaDom, body: ArenaNodeId) -> Option<ArenaNodeId> {
    dom.descendants(body).find(|&id| is_heading(dom, id))
}

/// Detach every `<img>` below `root`; returns how many were removed.
fn strip_images(dom: &mut ArenaDom, root: ArenaNodeId) -> usize {
    let view: &ArenaDom = dom;
    let images: Vec<_> = view
        .descendants(root)
        .filter(|&id| classify(view, id) == NodeKind::Image)
        .collect();
    for &id in &images {
        dom.detach(id);
    }
    images.len()
}
