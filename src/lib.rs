//! `HandsUp` - Emergency companion for campers and hikers
//!
//! This library provides the core of the app: the user's saved campsites with
//! search, filters and radius queries, hazard warnings aggregated from
//! emergency-service feeds, and the contacts and message text for SOS alerts.

pub mod campsites;
pub mod config;
pub mod emergency;
pub mod error;
pub mod models;
pub mod storage;
pub mod telemetry;
pub mod warnings;

// Re-export core types for public API
pub use campsites::{CampsiteStore, FilterOptions};
pub use config::HandsUpConfig;
pub use emergency::{AustralianState, ContactRegistry, EmergencyContact, EmergencyTemplate, SosAlert};
pub use error::HandsUpError;
pub use models::{Campsite, CampsiteDraft, Coordinates, EmergencyWarning, WarningSeverity, WarningType};
pub use storage::{FjallStore, KeyValueStore, MemoryStore};
pub use warnings::{WarningAggregator, WarningSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, HandsUpError>;
