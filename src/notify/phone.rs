//! WhatsApp recipient numbers

/// Digits-only recipient for a deep link.
///
/// A bare 10-digit local number gets `country_code` prepended. Any other
/// non-empty digit string is used as-is. No digits at all yields
/// `fallback` (the clinic's own number).
pub fn normalize_phone(raw: &str, country_code: &str, fallback: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        0 => fallback.to_string(),
        10 => format!("{}{}", country_code, digits),
        _ => digits,
    }
}
