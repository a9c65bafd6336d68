//! Hazard warnings
//!
//! Feeds fetch warnings from emergency services; the aggregator merges them
//! into a snapshot that is refreshed on demand or on a schedule and published
//! to subscribers.

pub mod aggregator;
pub mod bom;
pub mod feed;
pub mod fire;

pub use aggregator::{
    DEFAULT_WARNING_RADIUS_KM, MIN_REFRESH_PERIOD, PeriodicRefresh, WarningAggregator,
    WarningSnapshot,
};
pub use bom::{BomWarningFeed, parse_feed};
pub use feed::WarningFeed;
pub use fire::StateFireFeed;
