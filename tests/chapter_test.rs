//! End-to-end chapter parsing: title extraction, body flattening and image
//! markers against an in-memory resource table.

use std::collections::HashMap;

use chaptext::marker::{self, ImgEntry, Segment, segments};
use chaptext::{Chapter, ChapterParser, DEFAULT_ASPECT_RATIO, ParseOptions, parse_chapter};
use proptest::prelude::*;

const CHAPTER_PATH: &str = "OEBPS/text/ch1.xhtml";

/// Minimal PNG header with the given pixel size.
fn png(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data
}

fn empty() -> HashMap<String, Vec<u8>> {
    HashMap::new()
}

fn with_images() -> ChapterParser {
    ChapterParser::with_options(ParseOptions::new().with_images(true))
}

fn xhtml(body: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
    <title>Book</title>
    <link href="../css/core.css" rel="stylesheet" type="text/css"/>
</head>
<body>
{body}
</body>
</html>
"#
    )
    .into_bytes()
}

#[test]
fn test_heading_paragraph_rule_scenario() {
    let chapter = parse_chapter(
        b"<h2>Chapter 1</h2><p>Hello<br/>World</p><hr/><p>  </p>",
        CHAPTER_PATH,
        &empty(),
    )
    .unwrap();

    assert_eq!(
        chapter,
        Chapter {
            title: Some("Chapter 1".to_string()),
            body: "Hello\nWorld\n\n\n\n".to_string(),
        }
    );
}

#[test]
fn test_cover_image_with_known_ratio() {
    let mut resources = HashMap::new();
    resources.insert("OEBPS/images/cover.jpg".to_string(), png(500, 800));

    let chapter = with_images()
        .parse(
            br#"<p><img src="../images/cover.jpg"/></p>"#,
            CHAPTER_PATH,
            &resources,
        )
        .unwrap();

    assert_eq!(
        segments(&chapter.body),
        vec![Segment::Image(ImgEntry::new("OEBPS/images/cover.jpg", 1.6))]
    );
    assert_eq!(
        chapter.body,
        format!("{}\n\n", marker::encode("OEBPS/images/cover.jpg", 1.6).trim())
    );
}

#[test]
fn test_cover_image_missing_uses_default_ratio() {
    let chapter = with_images()
        .parse(
            br#"<p><img src="../images/cover.jpg"/></p>"#,
            CHAPTER_PATH,
            &empty(),
        )
        .unwrap();

    assert_eq!(
        segments(&chapter.body),
        vec![Segment::Image(ImgEntry::new(
            "OEBPS/images/cover.jpg",
            DEFAULT_ASPECT_RATIO
        ))]
    );
}

#[test]
fn test_undecodable_image_uses_default_ratio() {
    let mut resources = HashMap::new();
    resources.insert(
        "OEBPS/images/broken.png".to_string(),
        b"this file is corrupt and has no header".to_vec(),
    );

    let chapter = with_images()
        .parse(br#"<div><img src="../images/broken.png"/></div>"#, CHAPTER_PATH, &resources)
        .unwrap();

    assert_eq!(
        decode_only_image(&chapter),
        ImgEntry::new("OEBPS/images/broken.png", 1.45)
    );
}

#[test]
fn test_link_outside_container_still_emits_marker() {
    let chapter = with_images()
        .parse(br#"<p><img src="../../../escape.png"/></p>"#, CHAPTER_PATH, &empty())
        .unwrap();

    assert_eq!(
        decode_only_image(&chapter),
        ImgEntry::new("../escape.png", DEFAULT_ASPECT_RATIO)
    );
}

#[test]
fn test_image_marker_mid_paragraph() {
    let chapter = with_images()
        .parse(
            br#"<p>Before<img src="fig%201.png"/>after</p>"#,
            CHAPTER_PATH,
            &empty(),
        )
        .unwrap();

    assert_eq!(
        segments(&chapter.body),
        vec![
            Segment::Text("Before"),
            Segment::Image(ImgEntry::new("OEBPS/text/fig 1.png", 1.45)),
            Segment::Text("after"),
        ]
    );
}

#[test]
fn test_images_dropped_by_default() {
    let mut resources = HashMap::new();
    resources.insert("OEBPS/images/cover.jpg".to_string(), png(1, 1));

    let chapter = parse_chapter(
        br#"<p><img src="../images/cover.jpg"/></p><p>Text</p><img src="x.png"/>"#,
        CHAPTER_PATH,
        &resources,
    )
    .unwrap();

    assert_eq!(chapter.body, "Text\n\n");
    assert!(segments(&chapter.body)
        .iter()
        .all(|s| matches!(s, Segment::Text(_))));
}

#[test]
fn test_full_xhtml_document() {
    let data = xhtml(
        r#"<section epub:type="chapter" id="chapter-1">
    <h2 epub:type="title">I</h2>
    <p>The sea was calm.</p>
    <p>The <i>Pequod</i> sailed
       on.</p>
    <blockquote>
        <p>Call me Ishmael.</p>
    </blockquote>
    <hr class="transition"/>
    <p>
    </p>
</section>"#,
    );

    let chapter = parse_chapter(&data, CHAPTER_PATH, &empty()).unwrap();
    assert_eq!(chapter.title.as_deref(), Some("I"));
    assert_eq!(
        chapter.body,
        "The sea was calm.\n\nThe Pequod sailed on.\n\nCall me Ishmael.\n\n\n\n"
    );
}

#[test]
fn test_title_never_reappears_in_body() {
    let data = xhtml("<h1>Unique Heading</h1><p>Body text.</p><h2>Subheading</h2>");
    let chapter = parse_chapter(&data, CHAPTER_PATH, &empty()).unwrap();

    assert_eq!(chapter.title.as_deref(), Some("Unique Heading"));
    assert!(!chapter.body.contains("Unique Heading"));
    assert!(chapter.body.contains("Subheading"));
}

#[test]
fn test_uppercase_tags() {
    let chapter = parse_chapter(
        b"<H3>Loud</H3><P>One<BR>Two</P><HR>",
        CHAPTER_PATH,
        &empty(),
    )
    .unwrap();

    assert_eq!(chapter.title.as_deref(), Some("Loud"));
    assert_eq!(chapter.body, "One\nTwo\n\n\n\n");
}

#[test]
fn test_parser_is_reusable_across_threads() {
    let parser = with_images();
    let resources = empty();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let resources = &resources;
                scope.spawn(move || {
                    let html = format!("<h1>Ch {i}</h1><p>Text {i}</p>");
                    parser.parse(html.as_bytes(), CHAPTER_PATH, resources).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let chapter = handle.join().unwrap();
            assert_eq!(chapter.title, Some(format!("Ch {i}")));
            assert_eq!(chapter.body, format!("Text {i}\n\n"));
        }
    });
}

fn decode_only_image(chapter: &Chapter) -> ImgEntry {
    match segments(&chapter.body).as_slice() {
        [Segment::Image(img)] => img.clone(),
        other => panic!("expected a single image, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn prop_no_heading_means_no_title(words in prop::collection::vec("[a-z]{1,10}", 1..8)) {
        let html: String = words.iter().map(|w| format!("<p>{w}</p>")).collect();
        let chapter = parse_chapter(html.as_bytes(), CHAPTER_PATH, &empty()).unwrap();

        prop_assert_eq!(chapter.title, None);
        let expected: String = words.iter().map(|w| format!("{w}\n\n")).collect();
        prop_assert_eq!(chapter.body, expected);
    }

    #[test]
    fn prop_first_heading_is_title(
        level in 1u8..=6,
        title in "[A-Za-z]{1,12}",
        rest in "[a-z]{1,12}",
    ) {
        let html = format!("<div><h{level}>{title}</h{level}></div><p>{rest}</p><h1>Later</h1>");
        let chapter = parse_chapter(html.as_bytes(), CHAPTER_PATH, &empty()).unwrap();

        prop_assert_eq!(chapter.title.as_deref(), Some(title.as_str()));
        prop_assert_eq!(chapter.body, format!("{rest}\n\nLater\n\n"));
    }

    #[test]
    fn prop_blank_paragraphs_emit_nothing(
        pieces in prop::collection::vec(
            prop_oneof![Just(" "), Just("\n"), Just("\t"), Just("<br/>"), Just("&nbsp;"),
                        Just("<img src=\"a.png\"/>"), Just("<span> </span>")],
            0..10,
        )
    ) {
        let html = format!("<p>{}</p>", pieces.concat());
        let chapter = parse_chapter(html.as_bytes(), CHAPTER_PATH, &empty()).unwrap();
        prop_assert_eq!(chapter.body, "");
    }
}
