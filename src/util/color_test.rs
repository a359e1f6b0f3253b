use super::*;

#[test]
fn parse_hex_rgb_expands_short_form() {
    assert_eq!(parse_hex_rgb("#3E3"), Some((0x33, 0xee, 0x33)));
    assert_eq!(parse_hex_rgb(" #181717 "), Some((0x18, 0x17, 0x17)));
}

#[test]
fn parse_hex_rgb_needs_hash_and_hex_digits() {
    assert_eq!(parse_hex_rgb("181717"), None);
    assert_eq!(parse_hex_rgb("#3e3e"), None);
    assert_eq!(parse_hex_rgb("#zz0000"), None);
    assert_eq!(parse_hex_rgb("#+12345"), None);
    assert_eq!(parse_hex_rgb("#ééé"), None);
}

#[test]
fn normalize_hex_color_uses_canonical_lowercase() {
    assert_eq!(normalize_hex_color("#ABC", "#000000"), "#aabbcc");
    assert_eq!(normalize_hex_color("#F7DF1E", "#000000"), "#f7df1e");
}

#[test]
fn normalize_hex_color_falls_back() {
    assert_eq!(normalize_hex_color("teal", "#ff0000"), "#ff0000");
    assert_eq!(normalize_hex_color("teal", "invalid"), DEFAULT_CELL_COLOR);
}

#[test]
fn with_hash_prefixes_bare_hex_once() {
    assert_eq!(with_hash("181717"), "#181717");
    assert_eq!(with_hash("#181717"), "#181717");
}

// =============================================================
// is_dark
// =============================================================

#[test]
fn is_dark_classifies_extremes() {
    assert!(is_dark("#000000"));
    assert!(!is_dark("#ffffff"));
}

#[test]
fn is_dark_on_default_cell_color() {
    assert!(is_dark(DEFAULT_CELL_COLOR));
}

#[test]
fn is_dark_on_brand_colors() {
    assert!(is_dark("#181717"));
    assert!(!is_dark("#F7DF1E"));
}

#[test]
fn is_dark_is_pure() {
    let first = is_dark("#5865F2");
    for _ in 0..100 {
        assert_eq!(is_dark("#5865F2"), first);
    }
}

#[test]
fn is_dark_treats_garbage_as_light() {
    assert!(!is_dark("not-a-color"));
    assert!(!is_dark(""));
}
