//! Display formatting for monetary amounts.

/// Truncate (toward zero) to whole cents.
///
/// A tiny bias in the direction of the value keeps binary artefacts such as
/// `0.29 * 100.0 == 28.999999999999996` from dropping a cent.
pub fn truncate_to_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0 + value.signum() * 1e-7).trunc() / 100.0
}

/// Two-decimal display string, truncated rather than rounded.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", truncate_to_cents(value))
}
