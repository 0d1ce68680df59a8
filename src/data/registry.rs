use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::PlateIdentifier;
use crate::error::RegistryError;

/// Registry shared between passes. A pass holds the read guard for its whole
/// duration, so writers only get in between passes.
pub type SharedRegistry = Arc<RwLock<ApprovedRegistry>>;

/// Set of approved plate identifiers. Never contains the empty identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApprovedRegistry {
    plates: HashSet<PlateIdentifier>,
}

impl ApprovedRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds a registry from raw plate strings, failing on the first one that
    /// normalizes to nothing.
    pub fn from_plates<S: AsRef<str>>(plates: &[S]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for plate in plates {
            registry.insert(plate.as_ref())?;
        }
        Ok(registry)
    }

    /// Normalizes `raw` and adds it. Returns `Ok(false)` if it was already present.
    pub fn insert(&mut self, raw: &str) -> Result<bool, RegistryError> {
        let plate = PlateIdentifier::normalize(raw);
        if plate.is_empty() {
            return Err(RegistryError::InvalidIdentifier(raw.to_string()));
        }
        Ok(self.plates.insert(plate))
    }

    pub fn remove(&mut self, raw: &str) -> bool {
        self.plates.remove(&PlateIdentifier::normalize(raw))
    }

    pub fn contains(&self, plate: &PlateIdentifier) -> bool {
        self.plates.contains(plate)
    }

    pub fn len(&self) -> usize {
        self.plates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }

    /// Sorted, for stable display.
    pub fn plates(&self) -> Vec<&PlateIdentifier> {
        let mut plates: Vec<_> = self.plates.iter().collect();
        plates.sort();
        plates
    }

    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }
}
