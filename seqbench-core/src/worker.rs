//! Trial Worker
//!
//! A worker blocks on the trial's start barrier, then times its workload
//! against the shared container. Container errors and panics inside the timed
//! region come back as [`WorkerOutcome::Failed`] with the cause attached.

use crate::container::{ContainerError, Sequence};
use crate::measure::{Elapsed, Timer, pin_to_cpu};
use crate::workload::Workload;
use std::sync::Barrier;
use thiserror::Error;

/// Why a worker produced no timing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    /// The container rejected an operation
    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    /// The workload panicked; carries the panic message
    #[error("worker panicked: {0}")]
    Panicked(String),

    /// The pool job ended without reporting
    #[error("worker never reported a result")]
    NoResult,
}

/// Result of one worker in one trial
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Timed the whole range
    Completed(Elapsed),
    /// Stopped early; no timing
    Failed(WorkerError),
}

impl WorkerOutcome {
    /// Elapsed nanoseconds, if the worker completed
    pub fn nanos(&self) -> Option<u64> {
        match self {
            WorkerOutcome::Completed(elapsed) => Some(elapsed.nanos),
            WorkerOutcome::Failed(_) => None,
        }
    }

    /// Whether the worker timed its whole range
    pub fn is_completed(&self) -> bool {
        matches!(self, WorkerOutcome::Completed(_))
    }
}

/// One participant of a trial
#[derive(Debug, Clone)]
pub struct Worker {
    /// Position of this worker within the trial (0-based)
    pub slot: usize,
    /// Action and index range to run
    pub workload: Workload,
    /// CPU to pin to before waiting on the barrier
    pub pin_cpu: Option<usize>,
}

impl Worker {
    /// Unpinned worker
    pub fn new(slot: usize, workload: Workload) -> Self {
        Self {
            slot,
            workload,
            pin_cpu: None,
        }
    }

    /// Pin to `cpu` before the start barrier
    pub fn pinned_to(mut self, cpu: usize) -> Self {
        self.pin_cpu = Some(cpu);
        self
    }

    /// Wait for the barrier, then time the workload.
    pub fn run(&self, container: &dyn Sequence, barrier: &Barrier) -> WorkerOutcome {
        if let Some(cpu) = self.pin_cpu {
            if let Err(e) = pin_to_cpu(cpu) {
                tracing::debug!(slot = self.slot, cpu, "could not pin worker: {}", e);
            }
        }

        barrier.wait();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let timer = Timer::start();
            self.workload.apply(container).map(|()| timer.stop())
        }));

        match result {
            Ok(Ok(elapsed)) => WorkerOutcome::Completed(elapsed),
            Ok(Err(e)) => WorkerOutcome::Failed(WorkerError::Container(e)),
            Err(panic) => {
                let message = if let Some(s) = panic.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                WorkerOutcome::Failed(WorkerError::Panicked(message))
            }
        }
    }
}
