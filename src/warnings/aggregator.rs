//! Warning snapshot shared between the refresh loop and readers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use super::bom::BomWarningFeed;
use super::feed::WarningFeed;
use super::fire::StateFireFeed;
use crate::config::HandsUpConfig;
use crate::emergency::AustralianState;
use crate::models::{Coordinates, EmergencyWarning, WarningSeverity, WarningType};
use crate::{HandsUpError, Result};

pub const DEFAULT_WARNING_RADIUS_KM: f64 = 100.0;

/// Shortest period accepted by [`WarningAggregator::spawn_periodic`]
pub const MIN_REFRESH_PERIOD: Duration = Duration::from_secs(1);

/// Warnings as of the last successful refresh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarningSnapshot {
    pub warnings: Vec<EmergencyWarning>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Message from the most recent failed refresh, cleared on success
    pub error: Option<String>,
    /// True while any refresh is still in flight
    pub is_loading: bool,
}

impl WarningSnapshot {
    /// Warnings within `radius_km` of `point`, including those with no coordinates
    #[must_use]
    pub fn warnings_near(&self, point: &Coordinates, radius_km: f64) -> Vec<&EmergencyWarning> {
        self.warnings
            .iter()
            .filter(|warning| warning.is_relevant_to(point, radius_km))
            .collect()
    }

    /// Severe and critical warnings
    #[must_use]
    pub fn critical_warnings(&self) -> Vec<&EmergencyWarning> {
        self.warnings
            .iter()
            .filter(|warning| warning.severity >= WarningSeverity::Severe)
            .collect()
    }

    #[must_use]
    pub fn warnings_of_type(&self, warning_type: WarningType) -> Vec<&EmergencyWarning> {
        self.warnings
            .iter()
            .filter(|warning| warning.warning_type == warning_type)
            .collect()
    }
}

pub struct WarningAggregator {
    feeds: Vec<Box<dyn WarningFeed>>,
    timeout: Duration,
    in_flight: AtomicUsize,
    sender: watch::Sender<Arc<WarningSnapshot>>,
}

impl WarningAggregator {
    /// `timeout` bounds a whole refresh across all feeds
    #[must_use]
    pub fn new(feeds: Vec<Box<dyn WarningFeed>>, timeout: Duration) -> Self {
        let (sender, _) = watch::channel(Arc::new(WarningSnapshot::default()));
        Self {
            feeds,
            timeout,
            in_flight: AtomicUsize::new(0),
            sender,
        }
    }

    /// Weather bureau feed for `state`, plus its fire service when enabled
    pub fn from_config(config: &HandsUpConfig, state: AustralianState) -> Result<Self> {
        let timeout = Duration::from_secs(u64::from(config.warnings.timeout_seconds));
        let mut feeds: Vec<Box<dyn WarningFeed>> = vec![Box::new(BomWarningFeed::new(
            config.warnings.feed_url_for(state),
            state.name(),
            timeout,
            config.warnings.max_retries,
        )?)];
        if config.warnings.fire_feed_enabled {
            feeds.push(Box::new(StateFireFeed::new(state)));
        }

        Ok(Self::new(feeds, timeout))
    }

    /// Fetch every feed and publish the outcome.
    ///
    /// A failure keeps the previous warnings and records the error instead.
    /// When refreshes overlap, the last one to finish decides the warnings,
    /// and `is_loading` stays set until every one of them has finished.
    pub async fn refresh(&self) -> Arc<WarningSnapshot> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.sender.send_modify(|snapshot| Arc::make_mut(snapshot).is_loading = true);
        debug!("Refreshing warnings from {} feeds", self.feeds.len());

        let outcome = self.fetch_all().await;
        let still_loading = self.in_flight.fetch_sub(1, Ordering::SeqCst) > 1;

        let next = match outcome {
            Ok(warnings) => {
                let now = Utc::now();
                let mut warnings: Vec<EmergencyWarning> = warnings
                    .into_iter()
                    .filter(|warning| !warning.is_expired(now))
                    .collect();
                warnings.sort_by(|a, b| b.severity.cmp(&a.severity));
                info!("Warnings refreshed: {} active", warnings.len());
                WarningSnapshot {
                    warnings,
                    last_updated: Some(now),
                    error: None,
                    is_loading: still_loading,
                }
            }
            Err(e) => {
                error!("Warning refresh failed: {}", e);
                let previous = self.snapshot();
                WarningSnapshot {
                    warnings: previous.warnings.clone(),
                    last_updated: previous.last_updated,
                    error: Some(e.to_string()),
                    is_loading: still_loading,
                }
            }
        };

        let next = Arc::new(next);
        self.sender.send_replace(Arc::clone(&next));
        next
    }

    async fn fetch_all(&self) -> Result<Vec<EmergencyWarning>> {
        let fetches = join_all(self.feeds.iter().map(|feed| feed.fetch()));
        let results = tokio::time::timeout(self.timeout, fetches)
            .await
            .map_err(|_| {
                HandsUpError::network(format!(
                    "Warning refresh timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?;

        let mut warnings = Vec::new();
        for (feed, result) in self.feeds.iter().zip(results) {
            match result {
                Ok(mut fetched) => {
                    debug!("{} returned {} warnings", feed.name(), fetched.len());
                    warnings.append(&mut fetched);
                }
                Err(e) => {
                    warn!("{} failed: {}", feed.name(), e);
                    return Err(e);
                }
            }
        }
        Ok(warnings)
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<WarningSnapshot> {
        Arc::clone(&self.sender.borrow())
    }

    /// Receiver notified whenever a new snapshot is published
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<WarningSnapshot>> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.sender.borrow().is_loading
    }

    #[must_use]
    pub fn warnings_near(&self, point: &Coordinates, radius_km: f64) -> Vec<EmergencyWarning> {
        self.snapshot()
            .warnings_near(point, radius_km)
            .into_iter()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn critical_warnings(&self) -> Vec<EmergencyWarning> {
        self.snapshot()
            .critical_warnings()
            .into_iter()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn warnings_of_type(&self, warning_type: WarningType) -> Vec<EmergencyWarning> {
        self.snapshot()
            .warnings_of_type(warning_type)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Refresh now and then every `period` until the handle is dropped.
    ///
    /// Periods shorter than [`MIN_REFRESH_PERIOD`] are raised to it. The task
    /// holds a weak reference, so it also ends once the aggregator itself is
    /// dropped.
    pub fn spawn_periodic(self: &Arc<Self>, period: Duration) -> PeriodicRefresh {
        let period = period.max(MIN_REFRESH_PERIOD);
        let aggregator: Weak<Self> = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(aggregator) = aggregator.upgrade() else {
                    debug!("Warning aggregator dropped, stopping periodic refresh");
                    break;
                };
                aggregator.refresh().await;
            }
        });
        info!("Refreshing warnings every {}s", period.as_secs());
        PeriodicRefresh { handle }
    }
}

/// Handle to a periodic refresh task; dropping it stops the task
#[derive(Debug)]
pub struct PeriodicRefresh {
    handle: JoinHandle<()>,
}

impl PeriodicRefresh {
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PeriodicRefresh {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
