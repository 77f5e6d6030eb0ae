//! Comparator
//!
//! Validation followed by one averaging pass per list, list 1 first.

use crate::container::Sequence;
use crate::cycle::{AverageError, AverageResult, CycleAverager};
use crate::params::{CycleCount, SizeParams};
use crate::validate::{ListSlot, ValidationError, validate};
use crate::workload::Action;
use serde::Serialize;
use thiserror::Error;

/// Why a comparison produced no report
#[derive(Debug, Error)]
pub enum ComparisonError {
    /// Rejected by the validation gate; nothing was timed
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// An averaging pass over one list failed
    #[error("{label} ({slot} list): {source}")]
    Average {
        /// Which list failed
        slot: ListSlot,
        /// Container type label of the failed list
        label: &'static str,
        /// Underlying averaging error
        #[source]
        source: AverageError,
    },
}

/// Averaged timings for one container
#[derive(Debug, Clone, Serialize)]
pub struct ContainerReport {
    /// Which list this report covers
    pub slot: ListSlot,
    /// Container type label
    pub label: &'static str,
    /// Container length after the pass (restored if it was grown)
    pub size: usize,
    /// Action that was timed
    pub action: Action,
    /// Per-worker averages
    pub average: AverageResult,
}

/// Result of comparing both lists under one action
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    /// Action timed on both lists
    pub action: Action,
    /// Validated size parameters
    pub params: SizeParams,
    /// Trials per averaging pass
    pub cycles: CycleCount,
    /// List 1 then list 2
    pub reports: Vec<ContainerReport>,
}

/// Validate, then average `action` over list 1 and list 2.
pub fn compare(
    list1: Option<&dyn Sequence>,
    list2: Option<&dyn Sequence>,
    action: Action,
    size_params: Option<&[i64]>,
    cycles: i64,
    averager: &CycleAverager,
) -> Result<Comparison, ComparisonError> {
    compare_with_progress(list1, list2, action, size_params, cycles, averager, |_, _| {})
}

/// Like [`compare`], calling `on_cycle(slot, cycle)` after every cycle.
pub fn compare_with_progress<F>(
    list1: Option<&dyn Sequence>,
    list2: Option<&dyn Sequence>,
    action: Action,
    size_params: Option<&[i64]>,
    cycles: i64,
    averager: &CycleAverager,
    mut on_cycle: F,
) -> Result<Comparison, ComparisonError>
where
    F: FnMut(ListSlot, u64),
{
    let run = validate(list1, list2, size_params, cycles)?;

    let mut reports = Vec::with_capacity(2);
    for (slot, list) in [(ListSlot::First, list1), (ListSlot::Second, list2)] {
        // Validation guarantees both lists are present.
        let Some(container) = list else { continue };

        let average = averager
            .average_with_progress(container, action, &run.params, run.cycles, |cycle| {
                on_cycle(slot, cycle)
            })
            .map_err(|source| ComparisonError::Average {
                slot,
                label: container.label(),
                source,
            })?;

        reports.push(ContainerReport {
            slot,
            label: container.label(),
            size: container.len(),
            action,
            average,
        });
    }

    Ok(Comparison {
        action,
        params: run.params,
        cycles: run.cycles,
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ContainerKind, LinkedSeq, SynchronizedVec};

    fn list(values: &[i64]) -> SynchronizedVec {
        let seq = SynchronizedVec::new();
        for &v in values {
            seq.push(v).unwrap();
        }
        seq
    }

    #[test]
    fn test_compare_reads_both_lists() {
        let a = list(&[0, 1, 2]);
        let b = LinkedSeq::new();
        for v in [9, 8, 7] {
            b.push(v).unwrap();
        }

        let mut calls = Vec::new();
        let comparison = compare_with_progress(
            Some(&a),
            Some(&b),
            Action::ReadByIndex,
            Some(&[3, 0, 10]),
            2,
            &CycleAverager::default(),
            |slot, cycle| calls.push((slot, cycle)),
        )
        .unwrap();

        assert_eq!(comparison.reports.len(), 2);
        assert_eq!(comparison.reports[0].label, "SynchronizedVec");
        assert_eq!(comparison.reports[1].label, "LinkedSeq");
        assert!(comparison.reports.iter().all(|r| r.size == 3));
        assert_eq!(
            calls,
            vec![
                (ListSlot::First, 1),
                (ListSlot::First, 2),
                (ListSlot::Second, 1),
                (ListSlot::Second, 2)
            ]
        );
        assert_eq!(a.to_vec(), vec![0, 1, 2]);
        assert_eq!(b.to_vec(), vec![9, 8, 7]);
    }

    #[test]
    fn test_compare_rejects_before_timing() {
        let a = list(&[]);
        let b = list(&[1, 2, 3]);
        let err = compare(
            Some(&a),
            Some(&b),
            Action::Append,
            Some(&[3, 0, 10]),
            1,
            &CycleAverager::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ComparisonError::Invalid(ValidationError::EmptyList { .. })));
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_compare_appends_and_restores() {
        let a = ContainerKind::CopyOnWrite.build();
        let b = ContainerKind::Linked.build();
        for v in 0..8 {
            a.push(v).unwrap();
            b.push(v).unwrap();
        }
        let comparison = compare(
            Some(a.as_ref()),
            Some(b.as_ref()),
            Action::Append,
            Some(&[8, 0, 3]),
            3,
            &CycleAverager::default(),
        )
        .unwrap();
        assert!(comparison.reports.iter().all(|r| r.average.restored && r.size == 8));
        assert_eq!(a.len(), 8);
        assert_eq!(b.len(), 8);
    }
}
