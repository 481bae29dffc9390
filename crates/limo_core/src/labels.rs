//! Free-text label canonicalization shared by the rate and reservation engines.

/// Canonicalize a display label into its API spelling.
///
/// Drops `?`, lowercases, and collapses runs of whitespace, `-`, `/`, `_` and
/// `&` into a single `_`. Leading and trailing separators are removed.
///
/// `"Charter/Tour"` becomes `"charter_tour"`, `" Airport - To City? "` becomes
/// `"airport_to_city"`.
pub fn canonical_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.chars() {
        if ch == '?' {
            continue;
        }
        if ch.is_whitespace() || matches!(ch, '-' | '/' | '_' | '&') {
            pending_separator = !out.is_empty();
            continue;
        }
        if pending_separator {
            out.push('_');
            pending_separator = false;
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Lowercase alphanumerics only. Used for rate keys (`"Base_Rate"` -> `"baserate"`)
/// and for address comparison.
pub fn compact_key(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
