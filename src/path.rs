//! Resolution of links found in a chapter to container-root paths.
//!
//! Resource tables are keyed by the path of each entry inside the container,
//! slash-separated and without a leading slash (`OEBPS/images/cover.jpg`).
//! [`resolve`] maps an `<img src>` written relative to its document onto that
//! same key space.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Resolve `link` against the directory holding `document_path`.
///
/// The link is percent-decoded first. Empty and `.` segments are dropped, so
/// `img/a.png`, `./img/a.png` and `/img/a.png` all land on the same key. A
/// `..` that climbs past the container root is kept verbatim: the result is
/// then a path no table entry can have, and the miss surfaces at lookup.
///
/// ```
/// use chaptext::path::resolve;
///
/// assert_eq!(
///     resolve("OEBPS/text/ch1.xhtml", "../images/cover%20art.jpg"),
///     "OEBPS/images/cover art.jpg"
/// );
/// ```
pub fn resolve(document_path: &str, link: &str) -> String {
    let document_path = document_path.replace('\\', "/");
    let mut segments: Vec<Cow<'_, str>> = document_path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(Cow::Borrowed)
        .collect();
    // The document itself is the last segment; links are relative to its folder.
    segments.pop();

    let link = strip_fragment(link);
    let decoded = percent_decode_str(link).decode_utf8_lossy().replace('\\', "/");

    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                _ => segments.push(Cow::Borrowed("..")),
            },
            other => segments.push(Cow::Owned(other.to_string())),
        }
    }

    segments.join("/")
}

/// Drop a `#fragment` or `?query` suffix; neither names a file.
fn strip_fragment(link: &str) -> &str {
    match link.find(['#', '?']) {
        Some(pos) => &link[..pos],
        None => link,
    }
}
