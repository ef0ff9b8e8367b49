//! Live-stats orchestration.
//!
//! One init pass (country, visit count, top countries) plus a periodic
//! presence heartbeat, publishing into a `watch` channel the presentation
//! layer reads. Both tasks stop cleanly on [`LiveStatsHandle::stop`]: calls
//! in flight at cancellation time may complete, but their results are never
//! applied and no store write is issued afterwards.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use footfall_core::config::Config;
use footfall_core::session::SessionContext;
use footfall_core::snapshot::Snapshot;
use footfall_core::store::KvStore;
use footfall_redis::RestStore;

use crate::countries::CountryAggregator;
use crate::geo::{GeoLookup, GeoResolver, HttpGeoLookup};
use crate::presence::PresenceTracker;
use crate::visits::VisitCounter;

/// Live visitor stats, wired but not yet running.
pub struct LiveStats {
    store: Arc<dyn KvStore>,
    geo: Arc<dyn GeoLookup>,
    config: Config,
}

impl LiveStats {
    pub fn new(store: Arc<dyn KvStore>, geo: Arc<dyn GeoLookup>, config: Config) -> Self {
        Self { store, geo, config }
    }

    /// Wire the REST store and the HTTP geolocation lookup from environment
    /// configuration. A missing store URL or token is an error the host can
    /// treat as "feature absent".
    pub fn from_env() -> Result<Self> {
        let config = Config::from_env().map_err(anyhow::Error::msg)?;
        let store = RestStore::new(&config.store_url, config.store_token.clone())?;
        let geo = HttpGeoLookup::new(&config.geo_url)?;
        Ok(Self::new(Arc::new(store), Arc::new(geo), config))
    }

    /// Start the subsystem for `session`.
    ///
    /// The heartbeat fires immediately and then on the configured cadence;
    /// the init pass runs concurrently.
    pub fn spawn(self, session: SessionContext) -> LiveStatsHandle {
        let LiveStats { store, geo, config } = self;
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let publisher = Publisher {
            snapshot: Arc::new(snapshot_tx),
            shutdown: shutdown_rx.clone(),
        };

        debug!(session_id = session.id(), "live stats starting");

        let presence = PresenceTracker::new(Arc::clone(&store), session.id(), config.presence_ttl());
        let heartbeat = tokio::spawn(run_heartbeat(
            presence,
            config.heartbeat_interval(),
            publisher.clone(),
            shutdown_rx,
        ));
        let init = tokio::spawn(run_init(store, geo, config.top_countries, session, publisher));

        LiveStatsHandle {
            shutdown: shutdown_tx,
            snapshot: snapshot_rx,
            tasks: vec![init, heartbeat],
        }
    }
}

/// Running live-stats subsystem.
///
/// Dropping the handle signals shutdown; [`stop`](LiveStatsHandle::stop)
/// additionally waits for the background tasks to wind down.
pub struct LiveStatsHandle {
    shutdown: watch::Sender<bool>,
    snapshot: watch::Receiver<Snapshot>,
    tasks: Vec<JoinHandle<()>>,
}

impl LiveStatsHandle {
    /// Current aggregate values.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver observing every snapshot update.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }

    /// Stop both background tasks and wait for them to finish.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        for task in std::mem::take(&mut self.tasks) {
            let _ = task.await;
        }
    }
}

impl Drop for LiveStatsHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// Applies updates to the published snapshot unless shutdown was signalled.
///
/// This is the dangling-write guard: a store call that was in flight when
/// the handle stopped may still finish, but its result is discarded here.
#[derive(Clone)]
struct Publisher {
    snapshot: Arc<watch::Sender<Snapshot>>,
    shutdown: watch::Receiver<bool>,
}

impl Publisher {
    fn is_cancelled(&self) -> bool {
        *self.shutdown.borrow()
    }

    fn apply(&self, update: impl FnOnce(&mut Snapshot)) {
        if self.is_cancelled() {
            return;
        }
        self.snapshot.send_modify(update);
    }
}

async fn run_init(
    store: Arc<dyn KvStore>,
    geo: Arc<dyn GeoLookup>,
    top_limit: usize,
    mut session: SessionContext,
    publisher: Publisher,
) {
    let resolver = GeoResolver::new(geo);
    let country = resolver.resolve(&mut session).await;
    if publisher.is_cancelled() {
        return;
    }

    let visits = VisitCounter::new(Arc::clone(&store));
    match visits.record_visit(&mut session, country.as_deref()).await {
        Ok(total) => publisher.apply(|s| s.total_visits = Some(total)),
        Err(e) => warn!(error = %e, "visit recording failed"),
    }
    if publisher.is_cancelled() {
        return;
    }

    let aggregator = CountryAggregator::new(store, top_limit);
    match aggregator.top_countries().await {
        Ok(top) => publisher.apply(|s| s.top_countries = Some(top)),
        Err(e) => warn!(error = %e, "top countries aggregation failed"),
    }
}

async fn run_heartbeat(
    presence: PresenceTracker,
    interval: Duration,
    publisher: Publisher,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                match presence.heartbeat().await {
                    Ok(live) => publisher.apply(|s| s.live_count = Some(live)),
                    Err(e) => warn!(error = %e, "presence heartbeat failed"),
                }
            }
        }
    }
    debug!("presence heartbeat stopped");
}
