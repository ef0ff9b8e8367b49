use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

use footfall_core::keys;
use footfall_core::store::KvStore;

/// Keeps one session's presence marker alive and derives the live count.
///
/// The marker is never deleted explicitly, it disappears by expiry, so at
/// most one marker per active session exists at any instant.
pub struct PresenceTracker {
    store: Arc<dyn KvStore>,
    marker_key: String,
    ttl: Duration,
}

impl PresenceTracker {
    pub fn new(store: Arc<dyn KvStore>, session_id: &str, ttl: Duration) -> Self {
        Self {
            store,
            marker_key: keys::presence_key(session_id),
            ttl,
        }
    }

    /// Refresh this session's marker, then count all unexpired markers.
    ///
    /// A failed or empty enumeration reports 1: the marker write just
    /// succeeded, so this session is necessarily present. A failed marker
    /// write is an error and the caller keeps its previous value.
    pub async fn heartbeat(&self) -> Result<u64> {
        self.store.setex(&self.marker_key, self.ttl, "1").await?;
        let live = match self.store.keys(keys::PRESENCE_PATTERN).await {
            Ok(markers) => markers.len().max(1) as u64,
            Err(e) => {
                warn!(error = %e, "presence enumeration failed");
                1
            }
        };
        Ok(live)
    }
}
