//! Form-level checks for campsite input
//!
//! Problems are reported as a list of messages for display, never as an error.
//! A draft's rating is not checked: it is clamped into range when the record
//! is created.

use crate::models::campsite::{MAX_RATING, MIN_RATING};
use crate::models::{Campsite, CampsiteDraft, Coordinates};

fn collect_errors(
    name: &str,
    address: &str,
    max_occupancy: Option<u32>,
    location: &Coordinates,
) -> Vec<String> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push("Campsite name is required".to_string());
    }

    if address.trim().is_empty() {
        errors.push("Address is required".to_string());
    }

    if max_occupancy == Some(0) {
        errors.push("Maximum occupancy must be at least 1".to_string());
    }

    if !location.is_valid() {
        errors.push("Coordinates are out of range".to_string());
    }

    errors
}

/// Validate user input before it is added to the store
#[must_use]
pub fn validate_draft(draft: &CampsiteDraft) -> Vec<String> {
    collect_errors(
        &draft.name,
        &draft.address,
        draft.max_occupancy,
        &draft.location,
    )
}

/// Validate an existing record, e.g. before an update
#[must_use]
pub fn validate_campsite(campsite: &Campsite) -> Vec<String> {
    let mut errors = collect_errors(
        &campsite.name,
        &campsite.address,
        campsite.max_occupancy,
        &campsite.location,
    );
    if !(MIN_RATING..=MAX_RATING).contains(&i32::from(campsite.rating())) {
        errors.push(format!("Rating must be between {MIN_RATING} and {MAX_RATING}"));
    }
    errors
}
