//! Domain models for HandsUp
//!
//! - Location: coordinates and great-circle distance
//! - Campsite: user-recorded campsites and their attributes
//! - Warning: hazard warnings and severity ranking

pub mod campsite;
pub mod location;
pub mod warning;

pub use campsite::{
    AmenityFilter, AmenityType, Amenities, Campsite, CampsiteCategory, CampsiteDraft, CampingType,
    CellReception, EmergencyInfo, Season,
};
pub use location::{Coordinates, format_distance};
pub use warning::{EmergencyWarning, WarningSeverity, WarningType};
