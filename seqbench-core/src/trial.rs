//! Trial Coordinator
//!
//! One trial = one synchronized run of every worker over one container.
//!
//! ```text
//!  partition(size, workers)
//!        │
//!        ▼
//!  fresh rayon pool (workers threads) ──► one job per range
//!        │                                   │
//!        │                         Barrier::wait (all at once)
//!        │                                   │
//!        ▼                                   ▼
//!  pool dropped ◄──────────── WorkerOutcome per slot
//! ```
//!
//! The pool is built and dropped per trial so no thread carries state from one
//! cycle into the next.

use crate::container::Sequence;
use crate::worker::{Worker, WorkerError, WorkerOutcome};
use crate::workload::{Action, Workload, partition};
use rayon::ThreadPoolBuilder;
use std::sync::Barrier;
use thiserror::Error;

/// Default number of concurrent workers per trial
pub const DEFAULT_WORKERS: usize = 2;

/// Trial setup failure
#[derive(Debug, Error)]
pub enum TrialError {
    /// The per-trial thread pool could not be built
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Settings shared by every trial of an averaging pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialConfig {
    /// Number of workers (and pool threads) per trial
    pub workers: usize,
    /// Pin worker `i` to core `i` modulo the available cores
    pub pin_workers: bool,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            pin_workers: false,
        }
    }
}

/// Outcome of every worker in one trial, indexed by slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResult {
    /// One entry per worker slot
    pub outcomes: Vec<WorkerOutcome>,
}

impl TrialResult {
    /// Whether every worker completed
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(WorkerOutcome::is_completed)
    }

    /// First failed slot and its cause
    pub fn first_failure(&self) -> Option<(usize, &WorkerError)> {
        self.outcomes
            .iter()
            .enumerate()
            .find_map(|(slot, outcome)| match outcome {
                WorkerOutcome::Failed(e) => Some((slot, e)),
                WorkerOutcome::Completed(_) => None,
            })
    }

    /// Elapsed nanoseconds per slot, `None` for failed slots
    pub fn nanos(&self) -> Vec<Option<u64>> {
        self.outcomes.iter().map(WorkerOutcome::nanos).collect()
    }
}

/// Run one trial of `action` over `[0, size)` of `container`.
///
/// Worker failures are logged and recorded in the result; only failing to
/// create the pool is an error.
pub fn run_trial(
    container: &dyn Sequence,
    action: Action,
    size: usize,
    config: &TrialConfig,
) -> Result<TrialResult, TrialError> {
    let workers = config.workers.max(1);

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("seqbench-worker-{}", i))
        .build()?;

    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    let planned: Vec<Worker> = partition(size, workers)
        .into_iter()
        .enumerate()
        .map(|(slot, range)| {
            let worker = Worker::new(slot, Workload::new(action, range));
            if config.pin_workers {
                worker.pinned_to(slot % cores)
            } else {
                worker
            }
        })
        .collect();

    let barrier = Barrier::new(workers);
    let mut outcomes = vec![WorkerOutcome::Failed(WorkerError::NoResult); workers];

    // Every job blocks on the barrier, so the pool must hold one thread per worker.
    pool.scope(|s| {
        for (worker, outcome) in planned.iter().zip(outcomes.iter_mut()) {
            let barrier = &barrier;
            s.spawn(move |_| {
                *outcome = worker.run(container, barrier);
            });
        }
    });
    drop(pool);

    for (slot, outcome) in outcomes.iter().enumerate() {
        match outcome {
            WorkerOutcome::Completed(elapsed) => tracing::trace!(
                slot,
                nanos = elapsed.nanos,
                cycles = elapsed.cycles,
                "worker completed"
            ),
            WorkerOutcome::Failed(e) => tracing::warn!(
                container = container.label(),
                action = %action,
                "Failed to retrieve a result from worker {}: {}",
                slot + 1,
                e
            ),
        }
    }

    Ok(TrialResult { outcomes })
}
