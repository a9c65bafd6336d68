//! Australian states and territories, and the user's selected one

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{KeyValueStore, save_json};

pub const SELECTED_STATE_KEY: &str = "SelectedState";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AustralianState {
    AustralianCapitalTerritory,
    NewSouthWales,
    NorthernTerritory,
    Queensland,
    SouthAustralia,
    Tasmania,
    #[default]
    Victoria,
    WesternAustralia,
}

impl AustralianState {
    pub const ALL: [AustralianState; 8] = [
        AustralianState::AustralianCapitalTerritory,
        AustralianState::NewSouthWales,
        AustralianState::NorthernTerritory,
        AustralianState::Queensland,
        AustralianState::SouthAustralia,
        AustralianState::Tasmania,
        AustralianState::Victoria,
        AustralianState::WesternAustralia,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AustralianState::AustralianCapitalTerritory => "Australian Capital Territory",
            AustralianState::NewSouthWales => "New South Wales",
            AustralianState::NorthernTerritory => "Northern Territory",
            AustralianState::Queensland => "Queensland",
            AustralianState::SouthAustralia => "South Australia",
            AustralianState::Tasmania => "Tasmania",
            AustralianState::Victoria => "Victoria",
            AustralianState::WesternAustralia => "Western Australia",
        }
    }

    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            AustralianState::AustralianCapitalTerritory => "ACT",
            AustralianState::NewSouthWales => "NSW",
            AustralianState::NorthernTerritory => "NT",
            AustralianState::Queensland => "QLD",
            AustralianState::SouthAustralia => "SA",
            AustralianState::Tasmania => "TAS",
            AustralianState::Victoria => "VIC",
            AustralianState::WesternAustralia => "WA",
        }
    }

    #[must_use]
    pub fn fire_service_name(self) -> &'static str {
        match self {
            AustralianState::Victoria => "CFA (Country Fire Authority)",
            AustralianState::NewSouthWales => "RFS (Rural Fire Service)",
            AustralianState::Queensland => "QFES (Queensland Fire and Emergency Services)",
            AustralianState::WesternAustralia => {
                "DFES (Department of Fire and Emergency Services)"
            }
            AustralianState::SouthAustralia => "CFS (Country Fire Service)",
            AustralianState::Tasmania => "TFS (Tasmania Fire Service)",
            AustralianState::NorthernTerritory => "NT Fire and Rescue",
            AustralianState::AustralianCapitalTerritory => "ACT Fire and Rescue",
        }
    }

    /// Bureau of Meteorology warnings RSS feed covering this state
    #[must_use]
    pub fn bom_warnings_feed_url(self) -> &'static str {
        match self {
            AustralianState::NewSouthWales | AustralianState::AustralianCapitalTerritory => {
                "https://www.bom.gov.au/fwo/IDZ00054.warnings_nsw.xml"
            }
            AustralianState::NorthernTerritory => {
                "https://www.bom.gov.au/fwo/IDZ00055.warnings_nt.xml"
            }
            AustralianState::Queensland => "https://www.bom.gov.au/fwo/IDZ00056.warnings_qld.xml",
            AustralianState::SouthAustralia => "https://www.bom.gov.au/fwo/IDZ00057.warnings_sa.xml",
            AustralianState::Tasmania => "https://www.bom.gov.au/fwo/IDZ00058.warnings_tas.xml",
            AustralianState::Victoria => "https://www.bom.gov.au/fwo/IDZ00059.warnings_vic.xml",
            AustralianState::WesternAustralia => {
                "https://www.bom.gov.au/fwo/IDZ00060.warnings_wa.xml"
            }
        }
    }

    /// Look up by full name or abbreviation, ignoring case
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|state| {
            state.name().eq_ignore_ascii_case(name) || state.abbreviation().eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for AustralianState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The selected state, persisted under [`SELECTED_STATE_KEY`]
pub struct RegionPreference {
    selected: AustralianState,
    backend: Arc<dyn KeyValueStore>,
}

impl RegionPreference {
    /// Load the saved selection, or use `fallback` when nothing usable is stored
    pub fn open(backend: Arc<dyn KeyValueStore>, fallback: AustralianState) -> Self {
        let selected = match backend.get(SELECTED_STATE_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or(fallback),
            Ok(None) => fallback,
            Err(e) => {
                warn!("Failed to read selected state: {}", e);
                fallback
            }
        };
        Self { selected, backend }
    }

    #[must_use]
    pub fn selected(&self) -> AustralianState {
        self.selected
    }

    pub fn select(&mut self, state: AustralianState) {
        self.selected = state;
        if let Err(e) = save_json(self.backend.as_ref(), SELECTED_STATE_KEY, &state) {
            warn!("Failed to save selected state {}: {}", state, e);
        }
    }
}
