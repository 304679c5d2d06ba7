//! Run formatting codec
//!
//! Converts between [`RunNode`] markup runs and the flat [`RunFormat`]
//! records the editors capture and reapply. This is the leaf every editing
//! path goes through, so its behavior defines what "format-preserving" means
//! for the whole crate.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::RunNode;
use crate::extract::RunFormat;

/// Matches a parenthesized triple of hex byte values, with or without a
/// leading type name, e.g. `(0x4A, 0x2B, 0x00)` or `RGBColor(0x4a, 0x2b, 0x00)`.
static COLOR_TRIPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*0x([0-9A-Fa-f]{1,2})\s*,\s*0x([0-9A-Fa-f]{1,2})\s*,\s*0x([0-9A-Fa-f]{1,2})\s*\)")
        .expect("color triple pattern is valid")
});

static COLOR_HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{6}$").expect("hex color pattern is valid"));

/// Capture a run's text and inline formatting as a flat record.
pub fn capture_run(run: &RunNode) -> RunFormat {
    RunFormat {
        text: run.text.clone(),
        bold: run.bold,
        italic: run.italic,
        underline: run.underline,
        font: run.font.clone(),
        size: run.size,
        color: run.color.clone(),
    }
}

/// Apply a captured record onto a run, replacing its text and formatting.
///
/// A font name is written to both the primary and the East-Asian slot; the
/// override must carry the same value or East-Asian glyphs render in a
/// different font than the one requested. A color the codec cannot parse is
/// logged and skipped, never an error.
pub fn apply_format(format: &RunFormat, run: &mut RunNode) {
    run.text = format.text.clone();
    run.bold = format.bold;
    run.italic = format.italic;
    run.underline = format.underline;
    if let Some(font) = &format.font {
        run.font = Some(font.clone());
        run.east_asia_font = Some(font.clone());
    }
    if let Some(size) = format.size {
        run.size = Some(size);
    }
    if let Some(color) = &format.color {
        match normalize_color(color) {
            Some(hex) => run.color = Some(hex),
            None => warn!("skipping malformed color value {color:?}"),
        }
    }
}

/// Normalize a color value to uppercase six-digit hex.
///
/// Accepts a bare six-digit hex string or a parenthesized triple of hex byte
/// values; returns `None` for anything else.
pub fn normalize_color(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if COLOR_HEX.is_match(trimmed) {
        return Some(trimmed.to_ascii_uppercase());
    }
    if let Some(caps) = COLOR_TRIPLE.captures(trimmed) {
        let mut channels = [0u8; 3];
        for (slot, index) in channels.iter_mut().zip(1..=3) {
            *slot = u8::from_str_radix(caps.get(index)?.as_str(), 16).ok()?;
        }
        return Some(format!(
            "{:02X}{:02X}{:02X}",
            channels[0], channels[1], channels[2]
        ));
    }
    None
}
