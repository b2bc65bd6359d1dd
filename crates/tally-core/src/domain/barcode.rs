//! Barcode normalisation.
//!
//! Both functions are pure and idempotent. Stripping is only ever used to
//! compare codes; stored and displayed barcodes keep their suffix.

/// Trim surrounding whitespace from a scanned code.
pub fn normalize(raw: &str) -> &str {
    raw.trim()
}

/// Remove a trailing run of ASCII letters (`"12345A"` -> `"12345"`).
pub fn strip_variant_suffix(code: &str) -> &str {
    code.trim_end_matches(|c: char| c.is_ascii_alphabetic())
}

/// True when the code ends in a variant suffix (special packaging SKU).
pub fn has_variant_suffix(code: &str) -> bool {
    code.trim()
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_alphabetic())
}

/// How a scanned code matched a line's barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    VariantStripped,
}

/// Compare a normalised scan against a stored barcode.
///
/// The stored barcode is trimmed first; manifests often carry stray
/// whitespace around codes.
pub fn match_barcode(stored: &str, scanned: &str) -> Option<MatchKind> {
    let stored = stored.trim();
    if stored.is_empty() || scanned.is_empty() {
        return None;
    }
    if stored == scanned {
        Some(MatchKind::Exact)
    } else if strip_variant_suffix(stored) == scanned {
        Some(MatchKind::VariantStripped)
    } else {
        None
    }
}
