use std::sync::Arc;

use anyhow::Result;

use footfall_core::keys;
use footfall_core::session::SessionContext;
use footfall_core::store::KvStore;

/// At-most-once-per-session visit counting.
pub struct VisitCounter {
    store: Arc<dyn KvStore>,
}

impl VisitCounter {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Record this session's visit on its first call, then expose the total.
    ///
    /// The first activation increments the country counter (when a country
    /// resolved) and then the total counter; the two increments are
    /// independent round trips with no rollback on partial failure. Every
    /// later call is a plain read of the total, absent reading as 0.
    pub async fn record_visit(
        &self,
        session: &mut SessionContext,
        country: Option<&str>,
    ) -> Result<i64> {
        if session.consume_first_visit() {
            if let Some(code) = country {
                self.store.incr(&keys::country_key(code)).await?;
            }
            self.store.incr(keys::TOTAL_VISITS_KEY).await
        } else {
            let value = self.store.get(keys::TOTAL_VISITS_KEY).await?;
            Ok(value.as_int().unwrap_or(0))
        }
    }
}
