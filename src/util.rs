//! Byte-level helpers: text decoding and media sniffing.

use std::borrow::Cow;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. Honors a UTF-8 or UTF-16 BOM (via encoding_rs sniffing)
/// 2. Keeps valid UTF-8 as is
/// 3. If malformed, tries the hint encoding (from `<?xml encoding="..."?>`)
/// 4. Keeps lossy UTF-8 when the bytes otherwise decode as UTF-8 text,
///    so a single stray byte does not garble the rest of the chapter
/// 5. Falls back to Windows-1252 (common in old ebooks)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed || encoding != encoding_rs::UTF_8 {
        return result;
    }

    // A declaration readable as ASCII rules out UTF-16 labels.
    if let Some(encoding) = hint_encoding
        .and_then(|name| encoding_rs::Encoding::for_label(name.as_bytes()))
        .filter(|encoding| encoding.is_ascii_compatible())
    {
        if encoding == encoding_rs::UTF_8 {
            return result;
        }
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    if has_utf8_text(&result) {
        return result;
    }

    // Windows-1252 is a superset of ISO-8859-1 and maps every byte.
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Whether lossy UTF-8 output holds any correctly decoded non-ASCII text.
fn has_utf8_text(decoded: &str) -> bool {
    decoded
        .chars()
        .any(|c| !c.is_ascii() && c != char::REPLACEMENT_CHARACTER)
}

/// Extract encoding from XML declaration.
///
/// Parses `<?xml ... encoding="..." ?>` within the first 100 bytes.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(100);
    let prefix = &bytes[..check_len];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let (&quote, rest) = after_enc.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = rest.iter().position(|&b| b == quote)?;
    std::str::from_utf8(&rest[..value_end]).ok()
}

// ============================================================================
// Image Dimension Extraction
// ============================================================================

/// Extract image dimensions from raw image data.
///
/// Supports PNG, JPEG, and GIF formats by parsing header bytes.
/// Returns `(width, height)` or `None` if format is unrecognized.
pub fn extract_image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 {
        return None;
    }

    // PNG: width/height at bytes 16-23 in IHDR chunk
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
        let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
        return Some((width, height));
    }

    if data.starts_with(&[0xFF, 0xD8]) {
        return extract_jpeg_dimensions(data);
    }

    // GIF: width/height at bytes 6-9 (little-endian)
    if data.starts_with(b"GIF") {
        let width = u16::from_le_bytes([data[6], data[7]]) as u32;
        let height = u16::from_le_bytes([data[8], data[9]]) as u32;
        return Some((width, height));
    }

    None
}

/// Extract dimensions from JPEG data by parsing SOF markers.
fn extract_jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut i = 2;
    while i + 4 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // SOF0..SOF15, minus DHT (C4), JPG (C8) and DAC (CC)
        if matches!(
            marker,
            0xC0 | 0xC1
                | 0xC2
                | 0xC3
                | 0xC5
                | 0xC6
                | 0xC7
                | 0xC9
                | 0xCA
                | 0xCB
                | 0xCD
                | 0xCE
                | 0xCF
        ) && i + 9 < data.len()
        {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Some((width, height));
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + length;
    }
    None
}

// ============================================================================
// Binary Detection
// ============================================================================

/// Check whether bytes are a binary media file rather than markup.
///
/// Looks for raster image signatures, then for a NUL byte near the start.
/// UTF-16 text (marked by its BOM) is full of NULs and is left alone.
pub fn looks_binary(data: &[u8]) -> bool {
    const PROBE_LEN: usize = 1024;

    let is_media = data.starts_with(&[0xFF, 0xD8, 0xFF])
        || data.starts_with(&[0x89, 0x50, 0x4E, 0x47])
        || is_gif(data)
        || (data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP");
    if is_media {
        return true;
    }

    if data.starts_with(&[0xFF, 0xFE]) || data.starts_with(&[0xFE, 0xFF]) {
        return false;
    }

    memchr::memchr(0, &data[..data.len().min(PROBE_LEN)]).is_some()
}

/// Full GIF signature followed by a logical screen descriptor holding at
/// least one control byte.
fn is_gif(data: &[u8]) -> bool {
    if !(data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a")) || data.len() < 13 {
        return false;
    }
    data[6..13]
        .iter()
        .any(|&b| b.is_ascii_control() && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0C))
}
