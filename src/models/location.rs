//! Geographic coordinates and distance helpers

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};

/// A point on the globe
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres
    #[must_use]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        distance(
            HaversineLocation {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            HaversineLocation {
                latitude: other.latitude,
                longitude: other.longitude,
            },
            Units::Kilometers,
        )
    }

    /// Whether `other` lies within `radius_km` (inclusive)
    #[must_use]
    pub fn is_within(&self, other: &Coordinates, radius_km: f64) -> bool {
        self.distance_km(other) <= radius_km
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Location line used in outgoing SOS messages
    #[must_use]
    pub fn emergency_text(&self) -> String {
        format!("Lat: {:.6}, Long: {:.6}", self.latitude, self.longitude)
    }
}

/// Human readable distance, e.g. "850m away" or "12km away"
#[must_use]
pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{}m away", (distance_km * 1000.0) as i64)
    } else if distance_km < 10.0 {
        format!("{distance_km:.1}km away")
    } else {
        format!("{distance_km:.0}km away")
    }
}
