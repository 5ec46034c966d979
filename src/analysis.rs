//! Text normalization shared by the training and inference paths.
//!
//! Both paths must clean text with byte-identical logic: any divergence
//! silently degrades accuracy without raising an error, so there is exactly
//! one normalizer and the vectorizer tokenizes its output.

/// Normalize raw message text into the restricted alphabet used for
/// feature extraction.
///
/// Steps, in order:
/// 1. lower-case;
/// 2. drop every character outside `{a-z, whitespace, $, !, ?, .}`;
/// 3. collapse consecutive whitespace to a single space and trim the edges.
///
/// The function is total (empty input yields an empty string) and
/// idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());

    for ch in text.chars() {
        for lower in ch.to_lowercase() {
            match lower {
                'a'..='z' | '$' | '!' | '?' | '.' => cleaned.push(lower),
                c if c.is_whitespace() => cleaned.push(' '),
                _ => {}
            }
        }
    }

    let mut out = String::with_capacity(cleaned.len());
    for word in cleaned.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Split normalized text into tokens.
///
/// Normalized text is already single-spaced, so this is a plain whitespace
/// split. Kept here so the vectorizer and tests share one definition.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}
