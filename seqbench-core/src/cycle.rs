//! Cycle Averager
//!
//! Repeats a trial `cycles` times, sums elapsed nanoseconds per worker slot,
//! restores the container if the workload grew it, and reduces the sums to
//! integer averages.
//!
//! The reduction is `(sum_ns / cycles) / 1000` with both divisions truncating,
//! which yields microseconds. Results keep that exact arithmetic so numbers stay
//! comparable with earlier runs of the tool.

use crate::container::{ContainerError, Sequence, repopulate};
use crate::params::{CycleCount, SizeParams};
use crate::trial::{TrialConfig, TrialError, run_trial};
use crate::worker::WorkerError;
use crate::workload::Action;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use thiserror::Error;

/// What to do with a cycle in which some worker failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the pass at the first failed cycle and report it
    #[default]
    Abort,
    /// Drop failed cycles and average over the completed ones
    Exclude,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" | "fail-fast" => Ok(FailurePolicy::Abort),
            "exclude" | "skip" => Ok(FailurePolicy::Exclude),
            other => Err(format!("Unknown failure policy: {}", other)),
        }
    }
}

/// Why an averaging pass produced no result
#[derive(Debug, Error)]
pub enum AverageError {
    /// A worker failed under [`FailurePolicy::Abort`]
    #[error("cycle {cycle}: worker {worker} failed: {cause}")]
    WorkerFailed {
        /// 1-based cycle
        cycle: u64,
        /// 1-based worker
        worker: usize,
        /// Why the worker failed
        cause: WorkerError,
    },

    /// Every cycle had a failed worker
    #[error("none of {cycles} cycles completed")]
    NoCompletedCycles {
        /// Cycles that were run
        cycles: u64,
    },

    /// The trial could not start
    #[error(transparent)]
    Trial(#[from] TrialError),

    /// Repopulating after an append pass failed
    #[error("failed to restore container to {size} elements: {source}")]
    Restore {
        /// Target length
        size: usize,
        /// Underlying container error
        #[source]
        source: ContainerError,
    },
}

/// Averaged timings of one container over one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AverageResult {
    /// Per-worker average, `(sum_ns / cycles_counted) / 1000` (microseconds)
    pub per_worker: Vec<u64>,
    /// Cycles executed
    pub cycles_run: u64,
    /// Cycles that contributed to the averages
    pub cycles_counted: u64,
    /// Whether the container was repopulated afterwards
    pub restored: bool,
}

/// Reduce a nanosecond sum over `cycles` trials, truncating twice.
pub fn average_micros(sum_ns: u128, cycles: NonZeroU64) -> u64 {
    let per_cycle = sum_ns / u128::from(cycles.get());
    u64::try_from(per_cycle / 1000).unwrap_or(u64::MAX)
}

/// Runs averaging passes with a fixed trial configuration and failure policy
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleAverager {
    trial: TrialConfig,
    policy: FailurePolicy,
}

impl CycleAverager {
    /// Averager with `trial` settings and `policy`
    pub fn new(trial: TrialConfig, policy: FailurePolicy) -> Self {
        Self { trial, policy }
    }

    /// Settings used for every trial
    pub fn trial_config(&self) -> &TrialConfig {
        &self.trial
    }

    /// What happens when a worker fails
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Average `cycles` trials of `action` over `container`.
    pub fn average(
        &self,
        container: &dyn Sequence,
        action: Action,
        params: &SizeParams,
        cycles: CycleCount,
    ) -> Result<AverageResult, AverageError> {
        self.average_with_progress(container, action, params, cycles, |_| {})
    }

    /// Like [`average`](Self::average), calling `on_cycle` after every cycle.
    pub fn average_with_progress<F>(
        &self,
        container: &dyn Sequence,
        action: Action,
        params: &SizeParams,
        cycles: CycleCount,
        mut on_cycle: F,
    ) -> Result<AverageResult, AverageError>
    where
        F: FnMut(u64),
    {
        let accumulated = self.accumulate(container, action, params, cycles, &mut on_cycle);
        let restored = restore(container, action, params);

        let (sums, counted) = match accumulated {
            Ok(acc) => acc,
            Err(e) => {
                if let Err(restore_err) = restored {
                    tracing::warn!("{}", restore_err);
                }
                return Err(e);
            }
        };
        let restored = restored?;

        let Some(counted) = NonZeroU64::new(counted) else {
            return Err(AverageError::NoCompletedCycles {
                cycles: cycles.get(),
            });
        };

        Ok(AverageResult {
            per_worker: sums.iter().map(|&sum| average_micros(sum, counted)).collect(),
            cycles_run: cycles.get(),
            cycles_counted: counted.get(),
            restored,
        })
    }

    fn accumulate(
        &self,
        container: &dyn Sequence,
        action: Action,
        params: &SizeParams,
        cycles: CycleCount,
        on_cycle: &mut dyn FnMut(u64),
    ) -> Result<(Vec<u128>, u64), AverageError> {
        let mut sums = vec![0u128; self.trial.workers.max(1)];
        let mut counted = 0u64;

        for cycle in 1..=cycles.get() {
            let trial = run_trial(container, action, params.size(), &self.trial)?;

            match trial.first_failure() {
                None => {
                    for (sum, nanos) in sums.iter_mut().zip(trial.nanos()) {
                        *sum += u128::from(nanos.unwrap_or(0));
                    }
                    counted += 1;
                }
                Some((slot, cause)) => match self.policy {
                    FailurePolicy::Abort => {
                        return Err(AverageError::WorkerFailed {
                            cycle,
                            worker: slot + 1,
                            cause: cause.clone(),
                        });
                    }
                    FailurePolicy::Exclude => {
                        tracing::warn!(
                            container = container.label(),
                            "excluding cycle {} from the average: worker {} failed: {}",
                            cycle,
                            slot + 1,
                            cause
                        );
                    }
                },
            }

            tracing::debug!(container = container.label(), action = %action, cycle, "cycle done");
            on_cycle(cycle);
        }

        Ok((sums, counted))
    }
}

/// Repopulate `container` if a mutating action left its length off `params.size()`.
fn restore(
    container: &dyn Sequence,
    action: Action,
    params: &SizeParams,
) -> Result<bool, AverageError> {
    if !action.mutates() || container.len() == params.size() {
        return Ok(false);
    }

    tracing::debug!(
        container = container.label(),
        from = container.len(),
        to = params.size(),
        "restoring container size"
    );
    repopulate(container, params).map_err(|source| AverageError::Restore {
        size: params.size(),
        source,
    })?;
    Ok(true)
}
