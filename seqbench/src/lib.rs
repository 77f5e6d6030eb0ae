#![warn(missing_docs)]
//! # SeqBench
//!
//! Concurrent latency comparator for mutable sequence containers.
//!
//! Two workers (or N) are released together by a start barrier, each reads or
//! appends over its own slice of `[0, size)` on one shared container, and the
//! elapsed time per worker is averaged over repeated cycles:
//! - **Containers**: copy-on-write, mutex-guarded, unsynchronized and linked sequences
//! - **Validation Gate**: ordered checks with one diagnostic per failure
//! - **Failure Policy**: abort on the first failed worker, or exclude failed cycles
//! - **Restoration**: append runs leave the container at its configured size
//!
//! ## Quick Start
//!
//! ```no_run
//! use seqbench::prelude::*;
//!
//! let a = ContainerKind::CopyOnWrite.build();
//! let b = ContainerKind::Synchronized.build();
//! let params = SizeParams::new(1000, 0, 100).unwrap();
//! populate(a.as_ref(), &params).unwrap();
//! populate(b.as_ref(), &params).unwrap();
//!
//! let comparison = compare(
//!     Some(a.as_ref()),
//!     Some(b.as_ref()),
//!     Action::ReadByIndex,
//!     Some(&[1000, 0, 100]),
//!     5,
//!     &CycleAverager::default(),
//! )
//! .unwrap();
//! print!("{}", seqbench::format_human(&comparison));
//! ```

// Re-export the timing core
pub use seqbench_core::*;

// Re-export the CLI layer
pub use seqbench_cli::{
    Cli, Commands, Menu, OutputFormat, SeqConfig, Session, format_human, generate_json_report,
    render, run, run_with_cli,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use seqbench_core::{
        Action, Comparison, ContainerKind, CycleAverager, FailurePolicy, Sequence, SizeParams,
        TrialConfig, compare, populate,
    };
}
