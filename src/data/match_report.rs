use serde::Serialize;

use crate::common::{MatchResult, PlateIdentifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    LoadFailure,
    InvalidImage,
    ExtractionFailure,
}

/// Why one record was dropped from a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    /// Position in the input sequence.
    pub index: usize,
    pub filename: String,
    pub reason: SkipReason,
    pub message: String,
}

/// Terminal state of a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Matched(MatchResult),
    Unmatched(PlateIdentifier),
    Skipped(SkippedRecord),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub load_failure: usize,
    pub invalid_image: usize,
    pub extraction_failure: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.load_failure + self.invalid_image + self.extraction_failure
    }

    fn bump(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::LoadFailure => self.load_failure += 1,
            SkipReason::InvalidImage => self.invalid_image += 1,
            SkipReason::ExtractionFailure => self.extraction_failure += 1,
        }
    }
}

/// Result of one match pass: the matches in ingestion order plus counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchReport {
    pub matches: Vec<MatchResult>,
    pub processed: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub skipped: SkipCounts,
    pub diagnostics: Vec<SkippedRecord>,
}

impl MatchReport {
    /// Folds per-record outcomes, tagged with their input index, into a report.
    /// Outcomes may arrive in any order.
    pub fn from_outcomes(mut outcomes: Vec<(usize, RecordOutcome)>) -> Self {
        outcomes.sort_by_key(|(index, _)| *index);

        let mut report = MatchReport {
            processed: outcomes.len(),
            ..Default::default()
        };
        for (_, outcome) in outcomes {
            match outcome {
                RecordOutcome::Matched(m) => {
                    report.matched += 1;
                    report.matches.push(m);
                }
                RecordOutcome::Unmatched(_) => report.unmatched += 1,
                RecordOutcome::Skipped(skipped) => {
                    report.skipped.bump(skipped.reason);
                    report.diagnostics.push(skipped);
                }
            }
        }
        report
    }

    pub fn summary(&self) -> String {
        format!(
            "processed={} matched={} unmatched={} skipped={} (load={}, invalid_image={}, extraction={})",
            self.processed,
            self.matched,
            self.unmatched,
            self.skipped.total(),
            self.skipped.load_failure,
            self.skipped.invalid_image,
            self.skipped.extraction_failure,
        )
    }
}
