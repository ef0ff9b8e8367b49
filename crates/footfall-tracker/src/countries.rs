use std::sync::Arc;

use anyhow::Result;

use footfall_core::flag::country_code_to_flag;
use footfall_core::keys;
use footfall_core::snapshot::CountryStat;
use footfall_core::store::KvStore;

/// Ranks the per-country counters into a display-ready top list.
pub struct CountryAggregator {
    store: Arc<dyn KvStore>,
    limit: usize,
}

impl CountryAggregator {
    pub fn new(store: Arc<dyn KvStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    /// Enumerate every country counter and rank the highest `limit`.
    ///
    /// One GET per counter: O(k) round trips for k observed countries.
    /// Ties keep enumeration order (stable sort); display order among ties
    /// is not a correctness property.
    pub async fn top_countries(&self) -> Result<Vec<CountryStat>> {
        let counter_keys = self.store.keys(keys::COUNTRY_PATTERN).await?;
        let mut rows = Vec::with_capacity(counter_keys.len());
        for key in counter_keys {
            let Some(code) = keys::country_code_from_key(&key) else {
                continue;
            };
            let count = self.store.get(&key).await?.as_int().unwrap_or(0);
            rows.push(CountryStat {
                code: code.to_string(),
                flag: country_code_to_flag(code),
                count,
            });
        }
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows.truncate(self.limit);
        Ok(rows)
    }
}
