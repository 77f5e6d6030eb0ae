#![warn(missing_docs)]
//! SeqBench Core - Concurrent Timing Protocol
//!
//! This crate times sequence containers under concurrent access:
//! - [`Sequence`] trait and built-in containers
//! - Workload partitioning over `[0, size)`
//! - Barrier-released workers with per-worker timing
//! - Trial coordination on a per-trial thread pool
//! - Multi-cycle averaging with container restoration
//! - The validation gate that decides whether a run may start
//!
//! Everything is a function of its arguments; there is no global state.

mod comparator;
mod container;
mod cycle;
mod measure;
mod params;
mod trial;
mod validate;
mod worker;
mod workload;

pub use comparator::{
    Comparison, ComparisonError, ContainerReport, compare, compare_with_progress,
};
pub use container::{
    ContainerError, ContainerKind, CopyOnWriteVec, LinkedSeq, Sequence, SynchronizedVec,
    UnsyncVec, populate, repopulate,
};
pub use cycle::{AverageError, AverageResult, CycleAverager, FailurePolicy, average_micros};
/// Whether this platform provides hardware cycle counters (x86_64 RDTSCP or AArch64 CNTVCT_EL0).
pub use measure::HAS_CYCLE_COUNTER;
pub use measure::{Elapsed, Timer};
pub use params::{CycleCount, ParamError, SizeParams};
pub use trial::{DEFAULT_WORKERS, TrialConfig, TrialError, TrialResult, run_trial};
pub use validate::{ListSlot, ValidatedRun, ValidationError, check_size_params, validate};
pub use worker::{Worker, WorkerError, WorkerOutcome};
pub use workload::{Action, Workload, partition};
