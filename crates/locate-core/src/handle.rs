//! Handle (screen name) normalization.

/// Fold a handle into its comparison key.
///
/// Handles compare equal regardless of case, embedded whitespace, and
/// full-width ASCII forms, so `"Alice Smith"`, `"alicesmith"` and
/// `"ＡｌｉｃｅＳｍｉｔｈ"` all map to the same key.
pub fn normalize_handle(handle: &str) -> String {
    let mut out = String::with_capacity(handle.len());
    for c in handle.chars() {
        let c = fold_width(c);
        if c.is_whitespace() {
            continue;
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Compare two handles under normalization.
pub fn handles_equal(a: &str, b: &str) -> bool {
    normalize_handle(a) == normalize_handle(b)
}

// U+FF01..=U+FF5E mirror U+0021..=U+007E; U+3000 is the ideographic space.
fn fold_width(c: char) -> char {
    match c {
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        '\u{3000}' => ' ',
        _ => c,
    }
}
