use serde::Serialize;

/// One ranked country row: ISO code, flag glyph, visit count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryStat {
    pub code: String,
    pub flag: String,
    pub count: i64,
}

/// Aggregate state exposed to the presentation layer.
///
/// Each field stays `None` until its producer completes at least once, so a
/// consumer can tell "not yet available" from a computed zero and render a
/// loading state instead of a wrong number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub live_count: Option<u64>,
    pub total_visits: Option<i64>,
    pub top_countries: Option<Vec<CountryStat>>,
}
