use std::collections::BTreeMap;

use chrono::Timelike;

use crate::common::{MatchResult, VehicleRecord};

/// Vehicle count per hour of day (0..=23). Hours with no records are absent.
pub fn hourly_movement(records: &[VehicleRecord]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.timestamp.hour()).or_insert(0) += 1;
    }
    counts
}

/// Same histogram restricted to approved vehicles.
pub fn hourly_matches(matches: &[MatchResult]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for m in matches {
        *counts.entry(m.timestamp.hour()).or_insert(0) += 1;
    }
    counts
}
