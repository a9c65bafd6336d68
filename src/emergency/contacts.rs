//! People to notify when an SOS is sent

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::storage::{KeyValueStore, load_json_or_default, save_json};
use crate::{HandsUpError, Result};

pub const CONTACTS_KEY: &str = "EmergencyContacts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: Uuid,
    pub name: String,
    pub phone_numbers: Vec<String>,
}

impl EmergencyContact {
    #[must_use]
    pub fn new(name: impl Into<String>, phone_numbers: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone_numbers,
        }
    }

    fn primary_number(&self) -> Option<&str> {
        self.phone_numbers
            .iter()
            .map(|number| number.trim())
            .find(|number| !number.is_empty())
    }

    /// Whether both contacts would receive the alert on the same number
    fn same_recipient(&self, other: &EmergencyContact) -> bool {
        match (self.primary_number(), other.primary_number()) {
            (Some(a), Some(b)) => normalise_number(a) == normalise_number(b),
            _ => false,
        }
    }
}

/// Digits and a leading `+`, so "0400 000 001" and "0400-000-001" compare equal
fn normalise_number(number: &str) -> String {
    number
        .trim()
        .chars()
        .enumerate()
        .filter(|(i, c)| c.is_ascii_digit() || (*i == 0 && *c == '+'))
        .map(|(_, c)| c)
        .collect()
}

pub struct ContactRegistry {
    contacts: Vec<EmergencyContact>,
    backend: Arc<dyn KeyValueStore>,
}

impl ContactRegistry {
    pub fn open(backend: Arc<dyn KeyValueStore>) -> Self {
        let contacts: Vec<EmergencyContact> = load_json_or_default(backend.as_ref(), CONTACTS_KEY);
        info!("Loaded {} emergency contacts", contacts.len());
        Self { contacts, backend }
    }

    #[must_use]
    pub fn contacts(&self) -> &[EmergencyContact] {
        &self.contacts
    }

    pub fn add(&mut self, contact: EmergencyContact) -> Result<()> {
        if self
            .contacts
            .iter()
            .any(|c| c.id == contact.id || c.same_recipient(&contact))
        {
            return Err(HandsUpError::validation("Contact already in emergency list"));
        }
        if contact.primary_number().is_none() {
            return Err(HandsUpError::validation("Selected contact has no phone number"));
        }
        debug!("Adding emergency contact {}", contact.name);
        self.contacts.push(contact);
        self.persist();
        Ok(())
    }

    pub fn remove(&mut self, id: Uuid) -> Option<EmergencyContact> {
        let index = self.contacts.iter().position(|c| c.id == id)?;
        self.remove_at(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<EmergencyContact> {
        if index >= self.contacts.len() {
            return None;
        }
        let removed = self.contacts.remove(index);
        self.persist();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
        self.persist();
    }

    /// First usable number of every contact
    #[must_use]
    pub fn phone_numbers(&self) -> Vec<String> {
        self.contacts
            .iter()
            .filter_map(EmergencyContact::primary_number)
            .map(str::to_string)
            .collect()
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.backend.as_ref(), CONTACTS_KEY, &self.contacts) {
            warn!("Failed to save {} emergency contacts: {}", self.contacts.len(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn registry() -> ContactRegistry {
        ContactRegistry::open(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_duplicate_contact_rejected() {
        let mut registry = registry();
        let alex = EmergencyContact::new("Alex", vec!["0400 000 001".to_string()]);
        registry.add(alex.clone()).unwrap();

        let err = registry.add(alex).unwrap_err();
        assert!(err.to_string().contains("already in emergency list"));
        assert_eq!(registry.contacts().len(), 1);
    }

    #[test]
    fn test_same_number_is_a_duplicate() {
        let mut registry = registry();
        registry
            .add(EmergencyContact::new("Alex", vec!["0400 000 001".to_string()]))
            .unwrap();

        let err = registry
            .add(EmergencyContact::new("Alex (work)", vec!["0400-000-001".to_string()]))
            .unwrap_err();
        assert!(err.to_string().contains("already in emergency list"));

        registry
            .add(EmergencyContact::new("Jo", vec!["0400 000 002".to_string()]))
            .unwrap();
        assert_eq!(registry.phone_numbers(), vec!["0400 000 001", "0400 000 002"]);
    }

    #[test]
    fn test_normalise_number() {
        assert_eq!(normalise_number(" +61 400 000 001 "), "+61400000001");
        assert_eq!(normalise_number("(02) 9999-0000"), "0299990000");
    }

    #[test]
    fn test_contact_without_number_rejected() {
        let mut registry = registry();
        let err = registry
            .add(EmergencyContact::new("Nobody", vec![" ".to_string()]))
            .unwrap_err();
        assert!(err.to_string().contains("no phone number"));
    }

    #[test]
    fn test_phone_numbers_use_first_number() {
        let mut registry = registry();
        registry
            .add(EmergencyContact::new(
                "Alex",
                vec!["0400 000 001".to_string(), "02 9999 0000".to_string()],
            ))
            .unwrap();
        registry
            .add(EmergencyContact::new("Jo", vec!["0400 000 002".to_string()]))
            .unwrap();

        assert_eq!(registry.phone_numbers(), vec!["0400 000 001", "0400 000 002"]);
    }

    #[test]
    fn test_remove_and_clear_persist() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut registry = ContactRegistry::open(backend.clone());
        let alex = EmergencyContact::new("Alex", vec!["0400 000 001".to_string()]);
        let jo = EmergencyContact::new("Jo", vec!["0400 000 002".to_string()]);
        registry.add(alex.clone()).unwrap();
        registry.add(jo).unwrap();

        assert_eq!(registry.remove(alex.id).unwrap().name, "Alex");
        assert!(registry.remove(alex.id).is_none());
        assert_eq!(ContactRegistry::open(backend.clone()).contacts().len(), 1);

        registry.clear();
        assert!(ContactRegistry::open(backend).contacts().is_empty());
    }
}
