//! # chaptext
//!
//! Flattens one chapter of an EPUB-style book into plain text for a reading
//! view: the first heading becomes the title, paragraphs are separated by
//! blank lines, `<br>` keeps its line break, and images turn into inline
//! markers that carry their container path and aspect ratio.
//!
//! ## Quick Start
//!
//! ```
//! use std::collections::HashMap;
//!
//! use chaptext::{ChapterParser, ParseOptions};
//! use chaptext::marker::{Segment, segments};
//!
//! let mut resources: HashMap<String, Vec<u8>> = HashMap::new();
//! resources.insert("OEBPS/images/map.png".into(), Vec::new());
//!
//! let parser = ChapterParser::with_options(ParseOptions::new().with_images(true));
//! let chapter = parser
//!     .parse(
//!         br#"<h1>The Road</h1><p>It began.</p><p><img src="../images/map.png"/></p>"#,
//!         "OEBPS/text/ch1.xhtml",
//!         &resources,
//!     )
//!     .unwrap();
//!
//! assert_eq!(chapter.title.as_deref(), Some("The Road"));
//! match &segments(&chapter.body)[1] {
//!     // An empty file can't be measured, so the default ratio applies.
//!     Segment::Image(img) => assert_eq!(img.aspect_ratio, 1.45),
//!     other => panic!("expected an image, got {other:?}"),
//! }
//! ```
//!
//! Any [`ResourceTable`] works as the lookup: a `HashMap`/`BTreeMap` of path
//! to bytes, or [`Resources`] loaded from a ZIP container.

pub mod dom;
pub mod error;
pub mod marker;
pub mod parser;
pub mod path;
pub mod resource;
mod text;
pub(crate) mod util;

pub use error::{Error, Result};
pub use marker::{DEFAULT_ASPECT_RATIO, ImgEntry};
pub use parser::{Chapter, ChapterParser, ParseOptions, parse_chapter};
pub use resource::{ResourceTable, Resources};
