use std::time::{Duration, Instant};

/// Logs how long `step` took for one record and returns the running total,
/// to be passed back in as `prev` for the next step.
pub(crate) fn trace(filename: &str, step: &str, started: Instant, prev: Duration) -> Duration {
    let now = started.elapsed();
    log::trace!("{} | Total={:.2?} | {}={:.2?}", filename, now, step, now - prev);
    now
}
