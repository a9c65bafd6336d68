use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    AmenityFilter, AmenityType, Campsite, CampsiteCategory, CampsiteDraft, CampingType,
    CellReception, Coordinates, Season,
};
use crate::storage::{KeyValueStore, load_json_or_default, save_json};
use crate::{HandsUpError, Result};

/// Key the whole campsite collection is stored under
pub const CAMPSITES_KEY: &str = "SavedCampsites";

/// Attribute values present across a set of campsites
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub categories: BTreeSet<CampsiteCategory>,
    pub camping_types: BTreeSet<CampingType>,
    pub seasons: BTreeSet<Season>,
    pub amenities: BTreeSet<AmenityType>,
    pub cell_reception: BTreeSet<CellReception>,
    pub has_accessible: bool,
}

/// Authoritative list of user-entered campsites.
///
/// Every mutation rewrites the whole collection to the backing store. A failed
/// write is logged and kept in [`CampsiteStore::persistence_error`]; the
/// in-memory list stays authoritative for the session.
pub struct CampsiteStore {
    campsites: Vec<Campsite>,
    backend: Arc<dyn KeyValueStore>,
    persistence_error: Option<String>,
}

impl CampsiteStore {
    /// Load the saved collection. Missing or undecodable data yields an empty store.
    pub fn open(backend: Arc<dyn KeyValueStore>) -> Self {
        let campsites: Vec<Campsite> = load_json_or_default(backend.as_ref(), CAMPSITES_KEY);
        info!("Loaded {} campsites", campsites.len());
        Self {
            campsites,
            backend,
            persistence_error: None,
        }
    }

    #[must_use]
    pub fn all(&self) -> &[Campsite] {
        &self.campsites
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.campsites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.campsites.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Campsite> {
        self.campsites.iter().find(|c| c.id() == id)
    }

    /// Message from the most recent failed save, cleared by the next successful one
    #[must_use]
    pub fn persistence_error(&self) -> Option<&str> {
        self.persistence_error.as_deref()
    }

    pub fn add(&mut self, draft: CampsiteDraft) -> &Campsite {
        let campsite = Campsite::new(draft);
        debug!("Adding campsite {} ({})", campsite.name, campsite.id());
        self.campsites.push(campsite);
        self.persist();
        let index = self.campsites.len() - 1;
        &self.campsites[index]
    }

    /// Replace the record with the same id. The stored creation time is kept.
    pub fn update(&mut self, mut campsite: Campsite) -> Result<()> {
        let Some(existing) = self.campsites.iter_mut().find(|c| c.id() == campsite.id()) else {
            return Err(HandsUpError::not_found(format!(
                "Campsite {} does not exist",
                campsite.id()
            )));
        };
        campsite.keep_created_at(existing.created_at());
        *existing = campsite;
        self.persist();
        Ok(())
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Campsite> {
        let index = self.campsites.iter().position(|c| c.id() == id)?;
        self.remove_at(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Campsite> {
        if index >= self.campsites.len() {
            return None;
        }
        let removed = self.campsites.remove(index);
        debug!("Removed campsite {} ({})", removed.name, removed.id());
        self.persist();
        Some(removed)
    }

    /// Case-insensitive match on name, notes, category label or address
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Campsite> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.campsites.iter().collect();
        }
        self.filter(|c| {
            [
                c.name.as_str(),
                c.notes.as_str(),
                c.category.label(),
                c.address.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
        })
    }

    #[must_use]
    pub fn filter_by_category(&self, category: Option<CampsiteCategory>) -> Vec<&Campsite> {
        match category {
            Some(category) => self.filter(|c| c.category == category),
            None => self.campsites.iter().collect(),
        }
    }

    #[must_use]
    pub fn filter_by_amenities(&self, wanted: &AmenityFilter) -> Vec<&Campsite> {
        self.filter(|c| wanted.matches(&c.amenities))
    }

    #[must_use]
    pub fn filter_by_accessibility(&self, is_accessible: bool) -> Vec<&Campsite> {
        self.filter(|c| c.is_accessible == is_accessible)
    }

    #[must_use]
    pub fn accessible(&self) -> Vec<&Campsite> {
        self.filter_by_accessibility(true)
    }

    #[must_use]
    pub fn filter_by_cell_reception(&self, level: CellReception) -> Vec<&Campsite> {
        self.filter(|c| c.cell_reception == level)
    }

    #[must_use]
    pub fn filter_by_camping_type(&self, camping_type: CampingType) -> Vec<&Campsite> {
        self.filter(|c| c.camping_type == camping_type)
    }

    #[must_use]
    pub fn filter_by_season(&self, season: Season) -> Vec<&Campsite> {
        self.filter(|c| c.seasons.contains(&season))
    }

    /// `Some(true)`: free or unpriced sites, `Some(false)`: paid sites, `None`: all
    #[must_use]
    pub fn filter_by_cost(&self, is_free: Option<bool>) -> Vec<&Campsite> {
        match is_free {
            Some(is_free) => self.filter(|c| c.is_free() == is_free),
            None => self.campsites.iter().collect(),
        }
    }

    #[must_use]
    pub fn with_emergency_info(&self) -> Vec<&Campsite> {
        self.filter(Campsite::has_emergency_info)
    }

    /// Campsites within `radius_km` of `center`, boundary inclusive
    #[must_use]
    pub fn nearby(&self, center: &Coordinates, radius_km: f64) -> Vec<&Campsite> {
        self.filter(|c| center.is_within(&c.location, radius_km))
    }

    /// Best-rated campsites near `center`, highest rating first
    #[must_use]
    pub fn nearby_by_rating(
        &self,
        center: &Coordinates,
        radius_km: f64,
        limit: usize,
    ) -> Vec<(&Campsite, f64)> {
        let mut results: Vec<(&Campsite, f64)> = self
            .campsites
            .iter()
            .map(|c| (c, center.distance_km(&c.location)))
            .filter(|(_, distance)| *distance <= radius_km)
            .collect();

        // Stable sort keeps insertion order among equal ratings.
        results.sort_by(|a, b| b.0.rating().cmp(&a.0.rating()));
        results.truncate(limit);
        results
    }

    /// Sorted, de-duplicated terms a search box can offer
    #[must_use]
    pub fn search_suggestions(&self) -> Vec<String> {
        let mut suggestions = BTreeSet::new();
        for campsite in &self.campsites {
            suggestions.insert(campsite.name.clone());
            suggestions.insert(campsite.category.label().to_string());
            suggestions.insert(campsite.camping_type.label().to_string());
            for part in campsite.address.split(',') {
                let part = part.trim();
                if part.chars().count() > 2 {
                    suggestions.insert(part.to_string());
                }
            }
        }
        suggestions.into_iter().collect()
    }

    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        let mut options = FilterOptions::default();
        for campsite in &self.campsites {
            options.categories.insert(campsite.category);
            options.camping_types.insert(campsite.camping_type);
            options.seasons.extend(campsite.seasons.iter().copied());
            options.amenities.extend(campsite.amenities.present());
            options.cell_reception.insert(campsite.cell_reception);
            options.has_accessible |= campsite.is_accessible;
        }
        options
    }

    fn filter<P>(&self, predicate: P) -> Vec<&Campsite>
    where
        P: Fn(&Campsite) -> bool,
    {
        self.campsites.iter().filter(|c| predicate(c)).collect()
    }

    fn persist(&mut self) {
        match save_json(self.backend.as_ref(), CAMPSITES_KEY, &self.campsites) {
            Ok(()) => self.persistence_error = None,
            Err(e) => {
                warn!("Failed to save {} campsites: {}", self.campsites.len(), e);
                self.persistence_error = Some(e.to_string());
            }
        }
    }
}
