use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::common::{ImageLoader, MatchResult, PipelineConfig, PlateCandidate, PlateIdentifier, VehicleRecord};
use crate::data::send_channels::{worker_channels, Completion, WorkerState};
use crate::data::{
    ApprovedRegistry, MatchReport, RecordOutcome, SharedRegistry, SkipReason, SkippedRecord, Stage, TimeCalc,
};
use crate::error::{ExtractionError, MatchError};
use crate::extraction_runners::{image_ops, PlateTextExtractor};
use crate::utils;

/// Runs match passes: every record goes load → preprocess → OCR → normalize →
/// registry lookup, on a bounded pool of worker threads.
pub struct MatchEngine<E: PlateTextExtractor> {
    loader: ImageLoader,
    extractor: E,
    target_w: u32,
    target_h: u32,
    max_in_flight: usize,
    min_confidence: Option<f32>,
    profile: bool,
}

impl<E: PlateTextExtractor> MatchEngine<E> {
    pub fn new(config: &PipelineConfig, extractor: E) -> Self {
        Self {
            loader: ImageLoader::new(&config.base_dir),
            extractor,
            target_w: config.target_width,
            target_h: config.target_height,
            max_in_flight: config.max_in_flight.max(1),
            min_confidence: config.min_confidence,
            profile: config.profile,
        }
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Runs one pass against a registry snapshot that may be updated between passes.
    /// The read guard is held until the pass returns.
    pub fn match_shared(
        &self,
        records: &[VehicleRecord],
        registry: &SharedRegistry,
    ) -> Result<MatchReport, MatchError> {
        let guard = registry.read();
        self.match_records(records, &guard)
    }

    /// Runs one pass. Per-record failures become skipped entries in the report;
    /// only an unreachable OCR engine aborts the pass.
    pub fn match_records(
        &self,
        records: &[VehicleRecord],
        registry: &ApprovedRegistry,
    ) -> Result<MatchReport, MatchError> {
        if records.is_empty() {
            return Ok(MatchReport::default());
        }

        let started = Instant::now();
        let workers = self.max_in_flight.min(records.len());
        log::info!(
            "Matching {} records against {} approved plates with {} {} workers",
            records.len(),
            registry.len(),
            workers,
            self.extractor.name()
        );

        let stop = AtomicBool::new(false);
        let systemic: Mutex<Option<ExtractionError>> = Mutex::new(None);
        let (dispatch, worker) = worker_channels(workers);

        let completions = std::thread::scope(|s| -> Result<Vec<Completion>, MatchError> {
            for id in 0..workers {
                let state = worker.clone();
                let (stop, systemic) = (&stop, &systemic);
                std::thread::Builder::new()
                    .name(format!("plate-worker-{id}"))
                    .spawn_scoped(s, move || self.worker_loop(state, registry, stop, systemic))
                    .map_err(|e| MatchError::WorkerPool(e.to_string()))?;
            }
            drop(worker);

            let job_tx = dispatch.job_tx;
            for (index, record) in records.iter().enumerate() {
                if stop.load(Ordering::SeqCst) || job_tx.send((index, record.clone())).is_err() {
                    break;
                }
            }
            drop(job_tx);

            Ok(dispatch.done_rx.iter().collect())
        })?;

        if let Some(err) = systemic.into_inner() {
            log::error!("Aborting match pass: {}", err);
            return Err(MatchError::EngineUnavailable(err));
        }

        let mut timing = TimeCalc::default();
        let outcomes = completions
            .into_iter()
            .map(|c| {
                timing.merge(&c.timing);
                (c.index, c.outcome)
            })
            .collect();
        let report = MatchReport::from_outcomes(outcomes);

        log::info!("Match pass done in {:.2?}: {}", started.elapsed(), report.summary());
        if self.profile {
            log::info!("{}", timing.summary());
        }
        Ok(report)
    }

    fn worker_loop(
        &self,
        state: WorkerState,
        registry: &ApprovedRegistry,
        stop: &AtomicBool,
        systemic: &Mutex<Option<ExtractionError>>,
    ) {
        // Keep draining after a stop so the dispatcher never blocks on a full queue.
        for (index, record) in state.job_rx.iter() {
            if stop.load(Ordering::SeqCst) {
                continue;
            }
            match self.process_record(index, &record, registry) {
                Ok((outcome, timing)) => {
                    if state.done_tx.send(Completion { index, outcome, timing }).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    stop.store(true, Ordering::SeqCst);
                    systemic.lock().get_or_insert(err);
                }
            }
        }
    }

    /// Takes one record to a terminal state. `Err` only for systemic engine failures.
    pub fn process_record(
        &self,
        index: usize,
        record: &VehicleRecord,
        registry: &ApprovedRegistry,
    ) -> Result<(RecordOutcome, TimeCalc), ExtractionError> {
        let name = record.filename.as_str();
        let started = Instant::now();
        let mut timing = TimeCalc::default();
        let mut elapsed = Duration::ZERO;

        let loaded = self.loader.load(name);
        let prev = elapsed;
        elapsed = utils::trace(name, "Load", started, elapsed);
        timing.add(Stage::Load, elapsed - prev);
        let raw = match loaded {
            Ok(raw) => raw,
            Err(e) => return Ok((skip(index, record, SkipReason::LoadFailure, e.to_string()), timing)),
        };

        let normalized = image_ops::preprocess(&raw, self.target_w, self.target_h);
        drop(raw);
        let prev = elapsed;
        elapsed = utils::trace(name, "Preprocess", started, elapsed);
        timing.add(Stage::Preprocess, elapsed - prev);
        let normalized = match normalized {
            Ok(img) => img,
            Err(e) => return Ok((skip(index, record, SkipReason::InvalidImage, e.to_string()), timing)),
        };

        let extracted = self.extractor.extract(&normalized);
        let prev = elapsed;
        elapsed = utils::trace(name, "OCR", started, elapsed);
        timing.add(Stage::Extract, elapsed - prev);
        let candidate = match extracted {
            Ok(candidate) => self.gate(name, candidate),
            Err(e) if e.is_systemic() => return Err(e),
            Err(e) => return Ok((skip(index, record, SkipReason::ExtractionFailure, e.to_string()), timing)),
        };

        let plate = PlateIdentifier::from_candidate(&candidate);
        let outcome = if !plate.is_empty() && registry.contains(&plate) {
            log::debug!("{}: approved plate {}", name, plate);
            RecordOutcome::Matched(MatchResult::new(record, plate))
        } else {
            log::debug!("{}: read {:?}, not approved", name, plate.as_str());
            RecordOutcome::Unmatched(plate)
        };
        Ok((outcome, timing))
    }

    /// Applies the optional confidence floor. Candidates without a reported
    /// confidence pass through.
    fn gate(&self, filename: &str, candidate: PlateCandidate) -> PlateCandidate {
        match (self.min_confidence, candidate.confidence) {
            (Some(min), Some(conf)) if conf < min => {
                log::debug!(
                    "{}: dropping {:?} at confidence {:.1} < {:.1}",
                    filename, candidate.text, conf, min
                );
                PlateCandidate::empty()
            }
            _ => candidate,
        }
    }
}

fn skip(index: usize, record: &VehicleRecord, reason: SkipReason, message: String) -> RecordOutcome {
    log::warn!("Skipping {} ({:?}): {}", record.filename, reason, message);
    RecordOutcome::Skipped(SkippedRecord {
        index,
        filename: record.filename.clone(),
        reason,
        message,
    })
}
