//! Inline image markers embedded in chapter text.
//!
//! An image becomes its own paragraph in the flattened body:
//!
//! ```text
//! \n\n<img src="OEBPS/images/cover.jpg" yrel="1.6"/>\n\n
//! ```
//!
//! `src` is the container-root path of the image and `yrel` its height over
//! width. The renderer splits the body on blank lines and turns any paragraph
//! that parses as a marker back into an [`ImgEntry`].

use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;

/// Aspect ratio (height / width) used when an image can't be measured.
pub const DEFAULT_ASPECT_RATIO: f32 = 1.45;

const TAG: &[u8] = b"img";
const PATH_ATTR: &[u8] = b"src";
const RATIO_ATTR: &[u8] = b"yrel";

/// An image reference resolved against the container.
#[derive(Debug, Clone, PartialEq)]
pub struct ImgEntry {
    pub path: String,
    pub aspect_ratio: f32,
}

impl ImgEntry {
    pub fn new(path: impl Into<String>, aspect_ratio: f32) -> Self {
        Self {
            path: path.into(),
            aspect_ratio,
        }
    }

    /// Serialize as a bare marker, without the surrounding blank lines.
    pub fn to_marker(&self) -> String {
        format!(
            r#"<img src="{}" yrel="{}"/>"#,
            escape(self.path.as_str()),
            self.aspect_ratio
        )
    }

    /// Parse a marker produced by [`ImgEntry::to_marker`].
    ///
    /// Leading and trailing whitespace is ignored. Returns `None` for
    /// anything else, including a marker whose ratio is not a positive
    /// finite number.
    pub fn from_marker(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with("<img") {
            return None;
        }

        let mut reader = Reader::from_str(text);
        let entry = match reader.read_event().ok()? {
            Event::Empty(e) if e.name().as_ref() == TAG => {
                let mut path = None;
                let mut ratio = None;
                for attr in e.attributes().flatten() {
                    let raw = std::str::from_utf8(&attr.value).ok()?;
                    match attr.key.as_ref() {
                        PATH_ATTR => path = Some(unescape(raw).ok()?.into_owned()),
                        RATIO_ATTR => ratio = raw.parse::<f32>().ok(),
                        _ => {}
                    }
                }
                Self::new(path?, ratio.filter(|r| r.is_finite() && *r > 0.0)?)
            }
            _ => return None,
        };

        // A marker stands alone; trailing markup means this was body text.
        matches!(reader.read_event(), Ok(Event::Eof)).then_some(entry)
    }
}

/// Encode an image as a standalone paragraph of the flattened body.
pub fn encode(path: &str, aspect_ratio: f32) -> String {
    format!("\n\n{}\n\n", ImgEntry::new(path, aspect_ratio).to_marker())
}

/// Decode a paragraph produced by [`encode`].
pub fn decode(text: &str) -> Option<ImgEntry> {
    ImgEntry::from_marker(text)
}

/// One blank-line separated piece of a chapter body.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'a> {
    /// Paragraph text; may contain single newlines from `<br>`.
    Text(&'a str),
    /// An inline image marker.
    Image(ImgEntry),
}

/// Split a chapter body into paragraphs and images.
///
/// Paragraphs are separated by one or more blank lines; empty pieces are
/// dropped and surrounding whitespace is trimmed.
pub fn segments(body: &str) -> Vec<Segment<'_>> {
    body.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match ImgEntry::from_marker(p) {
            Some(img) => Segment::Image(img),
            None => Segment::Text(p),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_framing() {
        assert_eq!(
            encode("OEBPS/images/cover.jpg", 1.6),
            "\n\n<img src=\"OEBPS/images/cover.jpg\" yrel=\"1.6\"/>\n\n"
        );
    }

    #[test]
    fn test_default_ratio_formatting() {
        assert_eq!(
            ImgEntry::new("a.png", DEFAULT_ASPECT_RATIO).to_marker(),
            r#"<img src="a.png" yrel="1.45"/>"#
        );
    }

    #[test]
    fn test_path_with_markup_characters() {
        let entry = ImgEntry::new(r#"img/"quotes" & <angles>.png"#, 0.5);
        let marker = entry.to_marker();
        assert!(!marker.contains("& "));
        assert_eq!(ImgEntry::from_marker(&marker), Some(entry));
    }

    #[test]
    fn test_decode_rejects_non_markers() {
        assert_eq!(decode("Hello world"), None);
        assert_eq!(decode(r#"<img src="a.png"/>"#), None);
        assert_eq!(decode(r#"<img src="a.png" yrel="-1"/>"#), None);
        assert_eq!(decode(r#"<img src="a.png" yrel="NaN"/>"#), None);
        assert_eq!(decode(r#"<img src="a.png" yrel="1.2"/> and more"#), None);
        assert_eq!(decode(r#"<image src="a.png" yrel="1.2"/>"#), None);
    }

    #[test]
    fn test_segments() {
        let body = format!(
            "First line\nsecond line\n\n{}Closing words",
            encode("OEBPS/a.png", 1.45)
        );
        assert_eq!(
            segments(&body),
            vec![
                Segment::Text("First line\nsecond line"),
                Segment::Image(ImgEntry::new("OEBPS/a.png", 1.45)),
                Segment::Text("Closing words"),
            ]
        );
    }

    #[test]
    fn test_segments_of_empty_body() {
        assert!(segments("").is_empty());
        assert!(segments("\n\n\n\n").is_empty());
    }

    proptest! {
        #[test]
        fn prop_marker_round_trip(
            path in "[A-Za-z0-9_ ./&<>\"'-]{1,40}",
            ratio in 0.001f32..1000.0,
        ) {
            let decoded = decode(&encode(&path, ratio));
            prop_assert_eq!(decoded, Some(ImgEntry::new(path, ratio)));
        }
    }
}
