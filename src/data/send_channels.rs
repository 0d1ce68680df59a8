use crate::common::VehicleRecord;
use crate::data::{RecordOutcome, TimeCalc};

/// A record tagged with its position in the input sequence.
pub type Job = (usize, VehicleRecord);

/// What a worker sends back: an outcome for the indexed record, plus the
/// stage timings it measured for it.
#[derive(Debug)]
pub struct Completion {
    pub index: usize,
    pub outcome: RecordOutcome,
    pub timing: TimeCalc,
}

/// Worker side of a match pass.
#[derive(Debug, Clone)]
pub struct WorkerState {
    pub job_rx: crossbeam_channel::Receiver<Job>,
    pub done_tx: crossbeam_channel::Sender<Completion>,
}

/// Dispatcher side of a match pass.
#[derive(Debug)]
pub struct DispatchState {
    pub job_tx: crossbeam_channel::Sender<Job>,
    pub done_rx: crossbeam_channel::Receiver<Completion>,
}

/// Job queue bounded to `capacity`, completion queue unbounded.
pub fn worker_channels(capacity: usize) -> (DispatchState, WorkerState) {
    let (job_tx, job_rx) = crossbeam_channel::bounded(capacity);
    let (done_tx, done_rx) = crossbeam_channel::unbounded();
    (
        DispatchState { job_tx, done_rx },
        WorkerState { job_rx, done_tx },
    )
}
