//! Emergency support
//!
//! Templates and message text for SOS alerts, the contacts that receive them,
//! and the selected state whose fire service is monitored.

pub mod contacts;
pub mod message;
pub mod region;
pub mod templates;

pub use contacts::{ContactRegistry, EmergencyContact};
pub use message::{SosAlert, build_sos_message};
pub use region::{AustralianState, RegionPreference};
pub use templates::EmergencyTemplate;
