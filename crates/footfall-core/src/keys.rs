//! Store key schema.
//!
//! The names must match exactly for interoperability with any counters and
//! markers already present in the store.

/// Global counter of recorded visits.
pub const TOTAL_VISITS_KEY: &str = "total_visits";

/// Prefix for per-session presence markers.
pub const PRESENCE_PREFIX: &str = "visitor:";

/// Pattern matching every presence marker.
pub const PRESENCE_PATTERN: &str = "visitor:*";

/// Prefix for per-country visit counters.
pub const COUNTRY_PREFIX: &str = "country:";

/// Pattern matching every country counter.
pub const COUNTRY_PATTERN: &str = "country:*";

/// Presence marker key for one session.
pub fn presence_key(session_id: &str) -> String {
    format!("{PRESENCE_PREFIX}{session_id}")
}

/// Visit counter key for one country code.
pub fn country_key(code: &str) -> String {
    format!("{COUNTRY_PREFIX}{code}")
}

/// Country code carried in a counter key, `None` for foreign keys.
pub fn country_code_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(COUNTRY_PREFIX).filter(|code| !code.is_empty())
}
