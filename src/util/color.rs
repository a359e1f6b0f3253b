//! Hex color parsing and contrast helpers.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// Background used for new link tiles and for generic icons, which carry no color.
pub const DEFAULT_CELL_COLOR: &str = "#3e3e3e";

/// Perceived-brightness cutoff on the 0..=255 YIQ scale.
const DARK_THRESHOLD: u32 = 128;

/// Parse `#RGB` or `#RRGGBB` into channels.
#[must_use]
pub fn parse_hex_rgb(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_owned(),
        _ => return None,
    };
    let Ok(value) = u32::from_str_radix(&expanded, 16) else {
        return None;
    };
    let [_, r, g, b] = value.to_be_bytes();
    Some((r, g, b))
}

/// Normalize a color to canonical lowercase `#rrggbb`.
#[must_use]
pub fn normalize_hex_color(value: &str, fallback: &str) -> String {
    let fallback_rgb = parse_hex_rgb(fallback).unwrap_or((0x3e, 0x3e, 0x3e));
    let (r, g, b) = parse_hex_rgb(value).unwrap_or(fallback_rgb);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Prefix a bare backend hex (`"181717"`) with `#`. Already-prefixed values pass through.
#[must_use]
pub fn with_hash(hex: &str) -> String {
    let trimmed = hex.trim();
    if trimmed.starts_with('#') {
        trimmed.to_owned()
    } else {
        format!("#{trimmed}")
    }
}

/// Whether artwork drawn over `hex` should switch to a light rendering.
///
/// Unparseable input is treated as light.
#[must_use]
pub fn is_dark(hex: &str) -> bool {
    let Some((r, g, b)) = parse_hex_rgb(hex) else {
        return false;
    };
    let yiq = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
    yiq < DARK_THRESHOLD
}
