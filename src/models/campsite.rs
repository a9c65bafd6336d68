//! Campsite records and their attribute enumerations

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::Coordinates;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

fn clamp_rating(rating: i32) -> u8 {
    // Within 1..=5 after clamping, so the cast cannot truncate.
    rating.clamp(MIN_RATING, MAX_RATING) as u8
}

fn deserialize_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    let bounded = raw.clamp(i64::from(MIN_RATING), i64::from(MAX_RATING));
    Ok(clamp_rating(bounded as i32))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampsiteCategory {
    BushCamping,
    CaravanPark,
    FreeCamping,
    NationalPark,
    PrivateProperty,
    Other,
}

impl CampsiteCategory {
    pub const ALL: [CampsiteCategory; 6] = [
        CampsiteCategory::BushCamping,
        CampsiteCategory::CaravanPark,
        CampsiteCategory::FreeCamping,
        CampsiteCategory::NationalPark,
        CampsiteCategory::PrivateProperty,
        CampsiteCategory::Other,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CampsiteCategory::BushCamping => "Bush Camping",
            CampsiteCategory::CaravanPark => "Caravan Park",
            CampsiteCategory::FreeCamping => "Free Camping",
            CampsiteCategory::NationalPark => "National Park",
            CampsiteCategory::PrivateProperty => "Private Property",
            CampsiteCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampingType {
    Tent,
    Caravan,
    Motorhome,
    Cabin,
    Glamping,
    Hammock,
    Bivouac,
    Other,
}

impl CampingType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CampingType::Tent => "Tent",
            CampingType::Caravan => "Caravan",
            CampingType::Motorhome => "Motorhome",
            CampingType::Cabin => "Cabin",
            CampingType::Glamping => "Glamping",
            CampingType::Hammock => "Hammock",
            CampingType::Bivouac => "Bivouac",
            CampingType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellReception {
    Excellent,
    Good,
    Fair,
    Poor,
    None,
    Unknown,
}

impl CellReception {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CellReception::Excellent => "Excellent",
            CellReception::Good => "Good",
            CellReception::Fair => "Fair",
            CellReception::Poor => "Poor",
            CellReception::None => "No Signal",
            CellReception::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

macro_rules! impl_display_via_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

impl_display_via_label!(CampsiteCategory, CampingType, CellReception, Season);

/// Individual amenity, used when listing what a set of campsites offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmenityType {
    Water,
    Electricity,
    Toilets,
    Showers,
    FirePit,
    Bbq,
    Parking,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenities {
    pub water: bool,
    pub electricity: bool,
    pub toilets: bool,
    pub showers: bool,
    pub fire_pit: bool,
    pub bbq: bool,
    pub parking: bool,
}

impl Amenities {
    /// Amenities that are present, in declaration order
    #[must_use]
    pub fn present(&self) -> Vec<AmenityType> {
        [
            (self.water, AmenityType::Water),
            (self.electricity, AmenityType::Electricity),
            (self.toilets, AmenityType::Toilets),
            (self.showers, AmenityType::Showers),
            (self.fire_pit, AmenityType::FirePit),
            (self.bbq, AmenityType::Bbq),
            (self.parking, AmenityType::Parking),
        ]
        .into_iter()
        .filter_map(|(has, amenity)| has.then_some(amenity))
        .collect()
    }
}

/// Partial amenity predicate: `None` means "don't care"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmenityFilter {
    pub water: Option<bool>,
    pub electricity: Option<bool>,
    pub toilets: Option<bool>,
    pub showers: Option<bool>,
    pub fire_pit: Option<bool>,
    pub bbq: Option<bool>,
    pub parking: Option<bool>,
}

impl AmenityFilter {
    #[must_use]
    pub fn matches(&self, amenities: &Amenities) -> bool {
        [
            (self.water, amenities.water),
            (self.electricity, amenities.electricity),
            (self.toilets, amenities.toilets),
            (self.showers, amenities.showers),
            (self.fire_pit, amenities.fire_pit),
            (self.bbq, amenities.bbq),
            (self.parking, amenities.parking),
        ]
        .into_iter()
        .all(|(wanted, actual)| wanted.is_none_or(|wanted| wanted == actual))
    }
}

/// Safety information recorded against a campsite
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyInfo {
    pub contact: Option<String>,
    pub nearest_hospital: Option<String>,
    pub nearest_police: Option<String>,
    #[serde(default)]
    pub notes: String,
}

impl EmergencyInfo {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contact.is_none()
            && self.nearest_hospital.is_none()
            && self.nearest_police.is_none()
            && self.notes.trim().is_empty()
    }
}

/// User-editable campsite fields, before the store assigns identity
#[derive(Debug, Clone, PartialEq)]
pub struct CampsiteDraft {
    pub name: String,
    pub address: String,
    pub location: Coordinates,
    pub notes: String,
    /// Clamped into 1..=5 when the record is created
    pub rating: i32,
    pub category: CampsiteCategory,
    pub camping_type: CampingType,
    pub cell_reception: CellReception,
    pub seasons: BTreeSet<Season>,
    pub amenities: Amenities,
    pub is_accessible: bool,
    pub accessibility_notes: String,
    pub emergency: EmergencyInfo,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub cost: Option<String>,
    pub max_occupancy: Option<u32>,
}

impl CampsiteDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>, location: Coordinates) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            location,
            ..Self::default()
        }
    }
}

impl Default for CampsiteDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            location: Coordinates::new(0.0, 0.0),
            notes: String::new(),
            rating: 3,
            category: CampsiteCategory::BushCamping,
            camping_type: CampingType::Tent,
            cell_reception: CellReception::Unknown,
            seasons: Season::ALL.into_iter().collect(),
            amenities: Amenities::default(),
            is_accessible: false,
            accessibility_notes: String::new(),
            emergency: EmergencyInfo::default(),
            phone: None,
            website: None,
            cost: None,
            max_occupancy: None,
        }
    }
}

/// A user-recorded campsite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campsite {
    id: Uuid,
    created_at: DateTime<Utc>,
    pub name: String,
    pub address: String,
    pub location: Coordinates,
    #[serde(default)]
    pub notes: String,
    #[serde(deserialize_with = "deserialize_rating")]
    rating: u8,
    pub category: CampsiteCategory,
    pub camping_type: CampingType,
    pub cell_reception: CellReception,
    #[serde(default)]
    pub seasons: BTreeSet<Season>,
    #[serde(default)]
    pub amenities: Amenities,
    #[serde(default)]
    pub is_accessible: bool,
    #[serde(default)]
    pub accessibility_notes: String,
    #[serde(default)]
    pub emergency: EmergencyInfo,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub cost: Option<String>,
    pub max_occupancy: Option<u32>,
}

impl Campsite {
    /// Build a record with a fresh id and the current time
    #[must_use]
    pub fn new(draft: CampsiteDraft) -> Self {
        Self::with_identity(Uuid::new_v4(), Utc::now(), draft)
    }

    fn with_identity(id: Uuid, created_at: DateTime<Utc>, draft: CampsiteDraft) -> Self {
        Self {
            id,
            created_at,
            name: draft.name,
            address: draft.address,
            location: draft.location,
            notes: draft.notes,
            rating: clamp_rating(draft.rating),
            category: draft.category,
            camping_type: draft.camping_type,
            cell_reception: draft.cell_reception,
            seasons: draft.seasons,
            amenities: draft.amenities,
            is_accessible: draft.is_accessible,
            accessibility_notes: draft.accessibility_notes,
            emergency: draft.emergency,
            phone: draft.phone,
            website: draft.website,
            cost: draft.cost,
            max_occupancy: draft.max_occupancy,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Set the star rating, clamped into 1..=5
    pub fn set_rating(&mut self, rating: i32) {
        self.rating = clamp_rating(rating);
    }

    pub(crate) fn keep_created_at(&mut self, created_at: DateTime<Utc>) {
        self.created_at = created_at;
    }

    /// Whether any of the emergency fields carry information
    #[must_use]
    pub fn has_emergency_info(&self) -> bool {
        !self.emergency.is_empty()
    }

    /// A campsite without a listed cost, or listed as "Free", counts as free
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.cost
            .as_deref()
            .is_none_or(|cost| cost.trim().eq_ignore_ascii_case("free"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft_with_rating(rating: i32) -> CampsiteDraft {
        CampsiteDraft {
            rating,
            ..CampsiteDraft::new("Test", "Somewhere", Coordinates::new(-33.0, 150.0))
        }
    }

    #[rstest]
    #[case(7, 5)]
    #[case(-2, 1)]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(3, 3)]
    #[case(5, 5)]
    #[case(i32::MAX, 5)]
    fn test_rating_is_clamped(#[case] given: i32, #[case] stored: u8) {
        let campsite = Campsite::new(draft_with_rating(given));
        assert_eq!(campsite.rating(), stored);
    }

    #[test]
    fn test_set_rating_clamps() {
        let mut campsite = Campsite::new(draft_with_rating(3));
        campsite.set_rating(11);
        assert_eq!(campsite.rating(), 5);
        campsite.set_rating(-4);
        assert_eq!(campsite.rating(), 1);
    }

    #[test]
    fn test_new_campsites_get_distinct_ids() {
        let a = Campsite::new(draft_with_rating(3));
        let b = Campsite::new(draft_with_rating(3));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_decoded_rating_is_clamped() {
        let mut value = serde_json::to_value(Campsite::new(draft_with_rating(4))).unwrap();
        value["rating"] = serde_json::json!(42);
        let decoded: Campsite = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.rating(), 5);
    }

    #[test]
    fn test_draft_defaults() {
        let draft = CampsiteDraft::default();
        assert_eq!(draft.rating, 3);
        assert_eq!(draft.category, CampsiteCategory::BushCamping);
        assert_eq!(draft.cell_reception, CellReception::Unknown);
        assert_eq!(draft.seasons.len(), 4);
        assert!(draft.emergency.contact.is_none());
    }

    #[test]
    fn test_amenity_filter_ignores_unspecified_flags() {
        let amenities = Amenities {
            water: true,
            toilets: true,
            ..Amenities::default()
        };

        assert!(AmenityFilter::default().matches(&amenities));
        assert!(
            AmenityFilter {
                water: Some(true),
                showers: Some(false),
                ..AmenityFilter::default()
            }
            .matches(&amenities)
        );
        assert!(
            !AmenityFilter {
                water: Some(true),
                electricity: Some(true),
                ..AmenityFilter::default()
            }
            .matches(&amenities)
        );
    }

    #[test]
    fn test_amenities_present() {
        let amenities = Amenities {
            water: true,
            bbq: true,
            ..Amenities::default()
        };
        assert_eq!(amenities.present(), vec![AmenityType::Water, AmenityType::Bbq]);
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some("Free"), true)]
    #[case(Some(" free "), true)]
    #[case(Some("$25/night"), false)]
    fn test_is_free(#[case] cost: Option<&str>, #[case] expected: bool) {
        let campsite = Campsite::new(CampsiteDraft {
            cost: cost.map(str::to_string),
            ..draft_with_rating(3)
        });
        assert_eq!(campsite.is_free(), expected);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(CampsiteCategory::BushCamping.to_string(), "Bush Camping");
        assert_eq!(CampsiteCategory::PrivateProperty.label(), "Private Property");
    }
}
