//! The collectible registry: persons lying around the map.
//!
//! A collectible has two states, available (in the map) and removed
//! (gone). Removal is terminal. The catalog is placed once per process,
//! on the first connect, behind a [`Once`] latch rather than an
//! "is the map empty" check, so an emptied map stays empty.

use std::collections::BTreeMap;
use std::sync::Once;

use cabforge_protocol::PersonView;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::WorldError;

/// A person that players can pick up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: String,
    pub x: i32,
    pub y: i32,
    /// Image the client draws. Serialized as `file` on the wire.
    pub sprite: String,
}

impl Collectible {
    pub fn new(id: impl Into<String>, x: i32, y: i32, sprite: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            sprite: sprite.into(),
        }
    }

    /// The wire form used in `availablePersons`.
    pub fn view(&self) -> PersonView {
        PersonView {
            id: self.id.clone(),
            x: self.x,
            y: self.y,
            file: self.sprite.clone(),
        }
    }
}

/// Outcome of [`CollectibleRegistry::toggle`] on an existing collectible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// `active: false`, and this call is the one that removed it.
    Removed,
    /// `active: true`. Nothing changed.
    Kept,
}

/// All collectibles still available.
#[derive(Debug)]
pub struct CollectibleRegistry {
    persons: DashMap<String, Collectible>,
    seeded: Once,
    catalog: Vec<Collectible>,
}

impl CollectibleRegistry {
    /// Creates an empty registry that will seed `catalog` on first use.
    pub fn new(catalog: Vec<Collectible>) -> Self {
        Self {
            persons: DashMap::new(),
            seeded: Once::new(),
            catalog,
        }
    }

    /// Places the catalog if it has never been placed.
    ///
    /// Returns `true` only for the call that did the seeding. Concurrent
    /// callers block until seeding finishes, so every caller observes the
    /// seeded map on return.
    pub fn ensure_seeded(&self) -> bool {
        let mut seeded_now = false;
        self.seeded.call_once(|| {
            for person in &self.catalog {
                self.persons.insert(person.id.clone(), person.clone());
            }
            tracing::info!(count = self.catalog.len(), "collectibles seeded");
            seeded_now = true;
        });
        seeded_now
    }

    /// Applies an `active` flag to a collectible.
    ///
    /// `active == false` removes it. Of two racing deactivations only one
    /// sees [`Toggle::Removed`]; the other gets `UnknownPerson`.
    ///
    /// # Errors
    /// [`WorldError::UnknownPerson`] if the id is not available.
    pub fn toggle(&self, person_id: &str, active: bool) -> Result<Toggle, WorldError> {
        if active {
            return if self.persons.contains_key(person_id) {
                Ok(Toggle::Kept)
            } else {
                Err(WorldError::UnknownPerson(person_id.to_owned()))
            };
        }

        match self.persons.remove(person_id) {
            Some(_) => Ok(Toggle::Removed),
            None => Err(WorldError::UnknownPerson(person_id.to_owned())),
        }
    }

    /// Removes a collectible that a player picked up.
    ///
    /// Returns `None` if it was already gone.
    pub fn collect(&self, person_id: &str) -> Option<Collectible> {
        self.persons.remove(person_id).map(|(_, person)| person)
    }

    /// Snapshot of every available collectible, keyed by id.
    pub fn catalog(&self) -> BTreeMap<String, PersonView> {
        self.persons
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().view()))
            .collect()
    }

    pub fn contains(&self, person_id: &str) -> bool {
        self.persons.contains_key(person_id)
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CollectibleRegistry {
        CollectibleRegistry::new(vec![
            Collectible::new("p1", 4, 6, "PersonaCorbata.png"),
            Collectible::new("p2", 8, 5, "PersonaNaranja.png"),
        ])
    }

    #[test]
    fn test_new_registry_is_empty_until_seeded() {
        let registry = registry();
        assert!(registry.is_empty());

        assert!(registry.ensure_seeded());

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("p1"));
    }

    #[test]
    fn test_ensure_seeded_second_call_is_noop() {
        let registry = registry();
        assert!(registry.ensure_seeded());
        assert!(!registry.ensure_seeded());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_ensure_seeded_after_all_collected_does_not_respawn() {
        let registry = registry();
        registry.ensure_seeded();
        registry.collect("p1");
        registry.collect("p2");
        assert!(registry.is_empty());

        registry.ensure_seeded();

        assert!(registry.is_empty());
    }

    #[test]
    fn test_toggle_inactive_removes_person() {
        let registry = registry();
        registry.ensure_seeded();

        let outcome = registry.toggle("p1", false).unwrap();

        assert_eq!(outcome, Toggle::Removed);
        assert!(!registry.contains("p1"));
    }

    #[test]
    fn test_toggle_active_keeps_person() {
        let registry = registry();
        registry.ensure_seeded();

        assert_eq!(registry.toggle("p1", true).unwrap(), Toggle::Kept);
        assert!(registry.contains("p1"));
    }

    #[test]
    fn test_toggle_unknown_returns_error() {
        let registry = registry();
        registry.ensure_seeded();

        let result = registry.toggle("nope", false);

        assert!(matches!(result, Err(WorldError::UnknownPerson(id)) if id == "nope"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_collect_twice_second_returns_none() {
        let registry = registry();
        registry.ensure_seeded();

        assert_eq!(registry.collect("p2").map(|p| p.x), Some(8));
        assert!(registry.collect("p2").is_none());
    }

    #[test]
    fn test_catalog_uses_wire_field_names() {
        let registry = registry();
        registry.ensure_seeded();

        let catalog = registry.catalog();

        let keys: Vec<_> = catalog.keys().cloned().collect();
        assert_eq!(keys, vec!["p1", "p2"]);
        assert_eq!(catalog["p1"].file, "PersonaCorbata.png");
        assert_eq!(catalog["p1"].x, 4);
    }
}
