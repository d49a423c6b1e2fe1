// src/core/sanitize.rs

/// Collapse runs of whitespace to one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// First `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => s[..cut].to_string(),
        None => s.to_string(),
    }
}

/// Pull a whole-pound amount out of a display price.
/// "£650,000" → 650000, "Offers over £700,000" → 700000, "POA" → None.
/// Only the first run of digits counts, so "£600,000 - £650,000" gives the lower bound.
pub fn parse_price(s: &str) -> Option<u32> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let mut digits = String::new();
    for ch in s[start..].chars() {
        match ch {
            '0'..='9' => digits.push(ch),
            ',' => {}
            _ => break,
        }
    }
    digits.parse().ok()
}

/// Keep the leading integer of a field like "4" or "4 bedrooms".
pub fn leading_u32(s: &str) -> Option<u32> {
    let t = s.trim();
    let end = t.find(|c: char| !c.is_ascii_digit()).unwrap_or(t.len());
    t[..end].parse().ok()
}
