//! Hazard warnings published by emergency services

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningType {
    Fire,
    SevereWeather,
    Flood,
    Storm,
    Heatwave,
    Medical,
    Other,
}

impl WarningType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            WarningType::Fire => "Fire",
            WarningType::SevereWeather => "Severe Weather",
            WarningType::Flood => "Flood",
            WarningType::Storm => "Storm",
            WarningType::Heatwave => "Heatwave",
            WarningType::Medical => "Medical Emergency",
            WarningType::Other => "Other",
        }
    }
}

impl fmt::Display for WarningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Warning severity. Declaration order is the ranking used by threshold queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    Low,
    Moderate,
    High,
    Severe,
    Critical,
}

impl WarningSeverity {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            WarningSeverity::Low => "Low",
            WarningSeverity::Moderate => "Moderate",
            WarningSeverity::High => "High",
            WarningSeverity::Severe => "Severe",
            WarningSeverity::Critical => "Critical",
        }
    }
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyWarning {
    pub id: Uuid,
    pub warning_type: WarningType,
    pub severity: WarningSeverity,
    pub title: String,
    pub description: String,
    /// Free-text area name, e.g. "Blue Mountains, NSW"
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub source: String,
}

impl EmergencyWarning {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    /// Warnings without coordinates apply everywhere
    #[must_use]
    pub fn is_relevant_to(&self, point: &Coordinates, radius_km: f64) -> bool {
        self.coordinates
            .is_none_or(|coordinates| coordinates.is_within(point, radius_km))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn warning(coordinates: Option<Coordinates>) -> EmergencyWarning {
        EmergencyWarning {
            id: Uuid::new_v4(),
            warning_type: WarningType::Fire,
            severity: WarningSeverity::Critical,
            title: "Bushfire Warning - Blue Mountains".to_string(),
            description: "Evacuate immediately if in affected areas.".to_string(),
            location: "Blue Mountains, NSW".to_string(),
            coordinates,
            issued_at: Utc::now(),
            expires_at: None,
            source: "NSW Rural Fire Service".to_string(),
        }
    }

    #[test]
    fn test_severity_total_order() {
        use WarningSeverity::*;
        let ordered = [Low, Moderate, High, Severe, Critical];
        for pair in ordered.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(Critical >= Severe);
        assert!(High < Severe);
    }

    #[test]
    fn test_warning_without_coordinates_is_always_relevant() {
        let far_away = Coordinates::new(51.5, -0.12);
        assert!(warning(None).is_relevant_to(&far_away, 1.0));
    }

    #[test]
    fn test_warning_relevance_by_radius() {
        let fire = warning(Some(Coordinates::new(-33.7128, 150.3119)));
        assert!(fire.is_relevant_to(&Coordinates::new(-33.8688, 151.2093), 100.0));
        assert!(!fire.is_relevant_to(&Coordinates::new(-37.8136, 144.9631), 100.0));
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let mut fire = warning(None);
        assert!(!fire.is_expired(now));

        fire.expires_at = Some(now - Duration::hours(1));
        assert!(fire.is_expired(now));

        fire.expires_at = Some(now + Duration::hours(6));
        assert!(!fire.is_expired(now));
    }
}
