use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::common::PlateIdentifier;

/// One vehicle observation: an image file and when it was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub filename: String,
    pub timestamp: NaiveDateTime,
}

impl VehicleRecord {
    pub fn new(filename: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            filename: filename.into(),
            timestamp,
        }
    }
}

/// A record whose recognized plate is in the approved registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub filename: String,
    pub timestamp: NaiveDateTime,
    pub plate: PlateIdentifier,
}

impl MatchResult {
    pub fn new(record: &VehicleRecord, plate: PlateIdentifier) -> Self {
        Self {
            filename: record.filename.clone(),
            timestamp: record.timestamp,
            plate,
        }
    }
}
