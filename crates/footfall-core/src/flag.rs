/// Offset from an ASCII uppercase letter to its Unicode regional-indicator
/// symbol; a pair of indicators renders as a flag glyph.
const REGIONAL_INDICATOR_OFFSET: u32 = 127_397;

/// Display glyph for a two-letter country code.
///
/// Codes that are not exactly two ASCII letters pass through unchanged.
pub fn country_code_to_flag(code: &str) -> String {
    if code.chars().count() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return code.to_string();
    }
    code.to_ascii_uppercase()
        .chars()
        .filter_map(|c| char::from_u32(c as u32 + REGIONAL_INDICATOR_OFFSET))
        .collect()
}
