//! Text normalization helpers shared by the loader and filters.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

/// Remove combining marks after canonical decomposition (`ALTERAÇÃO` -> `ALTERACAO`).
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|ch| !is_combining_mark(*ch)).nfc().collect()
}

/// Normalize a CSV header for alias matching.
///
/// Trims, collapses inner whitespace, uppercases, and optionally strips
/// diacritics. A leading UTF-8 BOM is dropped.
pub fn normalize_header(raw: &str, strip_marks: bool) -> String {
    let raw = raw.trim_start_matches('\u{feff}');
    let collapsed = normalize_inline_whitespace(raw).to_uppercase();
    if strip_marks {
        strip_diacritics(&collapsed)
    } else {
        collapsed
    }
}

/// Truncate `text` to at most `max_width` terminal columns, appending an ellipsis when cut.
///
/// Wide characters such as emoji count as two columns.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0usize;
    let mut out = String::new();
    for ch in text.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width > budget {
            break;
        }
        used += width;
        out.push(ch);
    }
    out.push('…');
    out
}
