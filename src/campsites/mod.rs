//! Campsite records entered by the user
//!
//! - Store: CRUD, text search, attribute filters and radius queries
//! - Validation: human-readable input checks

pub mod store;
pub mod validation;

pub use store::{CAMPSITES_KEY, CampsiteStore, FilterOptions};
pub use validation::{validate_campsite, validate_draft};
