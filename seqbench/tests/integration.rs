//! Integration tests for SeqBench
//!
//! These tests verify the end-to-end behavior of the comparator: the validation
//! gate, trial partitioning, averaging and container restoration.

use seqbench::{
    Action, AverageError, ComparisonError, ContainerError, ContainerKind, CycleAverager,
    FailurePolicy, ListSlot, Menu, Sequence, Session, SizeParams, SynchronizedVec, TrialConfig,
    ValidationError, WorkerError, average_micros, compare, partition, populate, run_trial,
    validate,
};
use std::io::Cursor;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicUsize, Ordering};

fn filled(kind: ContainerKind, values: &[i64]) -> Box<dyn Sequence> {
    let seq = kind.build();
    for &v in values {
        seq.push(v).unwrap();
    }
    seq
}

/// Reads of index 0 fail until `failures` is used up
struct Fuse {
    inner: SynchronizedVec,
    failures: AtomicUsize,
}

impl Fuse {
    fn new(len: i64, failures: usize) -> Self {
        let inner = SynchronizedVec::new();
        for v in 0..len {
            inner.push(v).unwrap();
        }
        Self {
            inner,
            failures: AtomicUsize::new(failures),
        }
    }
}

impl Sequence for Fuse {
    fn label(&self) -> &'static str {
        "Fuse"
    }
    fn len(&self) -> usize {
        self.inner.len()
    }
    fn get(&self, index: usize) -> Result<i64, ContainerError> {
        if index == 0
            && self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(ContainerError::ConcurrentModification("Fuse"));
        }
        self.inner.get(index)
    }
    fn push(&self, value: i64) -> Result<(), ContainerError> {
        self.inner.push(value)
    }
    fn clear(&self) {
        self.inner.clear()
    }
    fn to_vec(&self) -> Vec<i64> {
        self.inner.to_vec()
    }
}

#[test]
fn test_populate_respects_params() {
    for kind in ContainerKind::ALL {
        let seq = kind.build();
        let params = SizeParams::new(257, -3, 4).unwrap();
        populate(seq.as_ref(), &params).unwrap();
        assert_eq!(seq.len(), 257, "{}", kind);
        assert!(seq.to_vec().iter().all(|v| (-3..4).contains(v)), "{}", kind);
    }
}

#[test]
fn test_read_scenario_end_to_end() {
    let list1 = filled(ContainerKind::CopyOnWrite, &[0, 1, 2]);
    let list2 = filled(ContainerKind::Linked, &[9, 8, 7]);

    let run = validate(Some(list1.as_ref()), Some(list2.as_ref()), Some(&[3, 0, 10]), 1).unwrap();
    assert_eq!(run.params.size(), 3);
    assert_eq!(partition(run.params.size(), 2), vec![0..1, 1..3]);

    let comparison = compare(
        Some(list1.as_ref()),
        Some(list2.as_ref()),
        Action::ReadByIndex,
        Some(&[3, 0, 10]),
        1,
        &CycleAverager::default(),
    )
    .unwrap();

    assert_eq!(comparison.reports.len(), 2);
    for report in &comparison.reports {
        assert_eq!(report.average.per_worker.len(), 2);
        assert_eq!(report.average.cycles_counted, 1);
        assert!(!report.average.restored);
    }
    assert_eq!(list1.to_vec(), vec![0, 1, 2]);
    assert_eq!(list2.to_vec(), vec![9, 8, 7]);
}

#[test]
fn test_empty_first_list_runs_nothing() {
    let list1 = ContainerKind::Synchronized.build();
    let list2 = filled(ContainerKind::Synchronized, &[9, 8, 7]);
    let err = compare(
        Some(list1.as_ref()),
        Some(list2.as_ref()),
        Action::Append,
        Some(&[3, 0, 10]),
        1,
        &CycleAverager::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ComparisonError::Invalid(ValidationError::EmptyList {
            slot: ListSlot::First
        })
    ));
    assert_eq!(err.to_string(), "The 1st list to compare has no data");
    // An append trial would have grown list 2 before restoring it.
    assert_eq!(list2.to_vec(), vec![9, 8, 7]);
}

#[test]
fn test_wrong_length_params_rejected() {
    let list1 = filled(ContainerKind::Synchronized, &[0, 1, 2]);
    let list2 = filled(ContainerKind::Synchronized, &[9, 8, 7]);
    let err = validate(Some(list1.as_ref()), Some(list2.as_ref()), Some(&[3, 4]), 1).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidSizeParams { .. }));
    assert!(err.to_string().contains("[3, 4]"));
}

#[test]
fn test_inverted_value_range_rejected() {
    let list1 = filled(ContainerKind::Synchronized, &[0; 10]);
    let list2 = filled(ContainerKind::Synchronized, &[0; 10]);
    let err =
        validate(Some(list1.as_ref()), Some(list2.as_ref()), Some(&[10, 7, 2]), 1).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidSizeParams { .. }));
}

#[test]
fn test_append_restores_size_with_fresh_values() {
    let params = [50, 100, 110];
    let list1 = filled(ContainerKind::Synchronized, &[0; 50]);
    let list2 = filled(ContainerKind::CopyOnWrite, &[0; 50]);

    let comparison = compare(
        Some(list1.as_ref()),
        Some(list2.as_ref()),
        Action::Append,
        Some(&params),
        3,
        &CycleAverager::default(),
    )
    .unwrap();

    assert!(comparison.reports.iter().all(|r| r.average.restored));
    for list in [&list1, &list2] {
        assert_eq!(list.len(), 50);
        assert!(list.to_vec().iter().all(|v| (100..110).contains(v)));
    }
}

#[test]
fn test_reads_leave_every_container_unchanged() {
    for kind in ContainerKind::ALL {
        let values: Vec<i64> = (0..64).collect();
        let seq = filled(kind, &values);
        let result =
            run_trial(seq.as_ref(), Action::ReadByIndex, 64, &TrialConfig::default()).unwrap();
        assert!(result.is_complete(), "{}", kind);
        assert_eq!(seq.to_vec(), values, "{}", kind);
    }
}

#[test]
fn test_partition_covers_range_once() {
    for size in [1usize, 2, 3, 10, 1001] {
        for parts in 1..=5 {
            let ranges = partition(size, parts);
            assert_eq!(ranges.len(), parts);
            let mut covered: Vec<usize> = ranges.iter().flat_map(|r| r.clone()).collect();
            covered.sort_unstable();
            assert_eq!(covered, (0..size).collect::<Vec<_>>());
        }
        let halves = partition(size, 2);
        assert_eq!(halves[0].end, size / 2);
        assert_eq!(halves[1].start, size / 2);
    }
}

#[test]
fn test_average_truncates_twice() {
    assert_eq!(average_micros(1_999, NonZeroU64::new(1).unwrap()), 1);
    assert_eq!(average_micros(5_999, NonZeroU64::new(3).unwrap()), 1);
    assert_eq!(average_micros(2_999, NonZeroU64::new(2).unwrap()), 1);
    assert_eq!(average_micros(0, NonZeroU64::new(7).unwrap()), 0);
}

#[test]
fn test_n_way_trial() {
    let seq = filled(ContainerKind::Synchronized, &[1; 12]);
    let config = TrialConfig {
        workers: 4,
        pin_workers: false,
    };
    let result = run_trial(seq.as_ref(), Action::Append, 12, &config).unwrap();
    assert_eq!(result.outcomes.len(), 4);
    assert!(result.is_complete());
    assert_eq!(seq.len(), 24);
    let mut appended = seq.to_vec().split_off(12);
    appended.sort_unstable();
    assert_eq!(appended, (0..12).collect::<Vec<i64>>());
}

#[test]
fn test_abort_policy_reports_failed_worker() {
    let fuse = Fuse::new(4, 1);
    let other = filled(ContainerKind::Synchronized, &[0; 4]);
    let err = compare(
        Some(&fuse),
        Some(other.as_ref()),
        Action::ReadByIndex,
        Some(&[4, 0, 10]),
        3,
        &CycleAverager::default(),
    )
    .unwrap_err();

    let ComparisonError::Average { slot, label, source } = err else {
        panic!("expected an averaging failure");
    };
    assert_eq!(slot, ListSlot::First);
    assert_eq!(label, "Fuse");
    assert!(matches!(
        source,
        AverageError::WorkerFailed {
            cycle: 1,
            worker: 1,
            cause: WorkerError::Container(ContainerError::ConcurrentModification("Fuse")),
        }
    ));
}

#[test]
fn test_exclude_policy_averages_completed_cycles() {
    let fuse = Fuse::new(4, 1);
    let other = filled(ContainerKind::Linked, &[0; 4]);
    let averager = CycleAverager::new(TrialConfig::default(), FailurePolicy::Exclude);
    let comparison = compare(
        Some(&fuse),
        Some(other.as_ref()),
        Action::ReadByIndex,
        Some(&[4, 0, 10]),
        3,
        &averager,
    )
    .unwrap();

    let first = &comparison.reports[0].average;
    assert_eq!(first.cycles_run, 3);
    assert_eq!(first.cycles_counted, 2);
    assert_eq!(comparison.reports[1].average.cycles_counted, 3);
}

#[test]
fn test_menu_drives_a_session() {
    // cycles 2, params [20, 0, 50], lists copy-on-write + synchronized, append, read, exit
    let script = "1\n2\n2\n20\n0\n50\n3\n1\n2\n5\n4\n9\n";
    let mut menu = Menu::new(Cursor::new(script), Vec::new(), Session::default());
    menu.run().unwrap();
    let (session, out) = menu.into_parts();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("CopyOnWriteVec, size [20]  -  action: add()"), "{}", out);
    assert!(out.contains("SynchronizedVec, size [20]  -  action: get()"), "{}", out);
    assert!(!out.contains("WARNING"), "{}", out);
    for slot in [ListSlot::First, ListSlot::Second] {
        assert_eq!(session.list(slot).unwrap().len(), 20);
    }
}

#[test]
fn test_json_report_labels_microseconds() {
    let list1 = filled(ContainerKind::Synchronized, &[4, 5, 6, 7]);
    let list2 = filled(ContainerKind::Linked, &[4, 5, 6, 7]);
    let comparison = compare(
        Some(list1.as_ref()),
        Some(list2.as_ref()),
        Action::ReadByIndex,
        Some(&[4, 0, 10]),
        2,
        &CycleAverager::default(),
    )
    .unwrap();

    let json = seqbench::generate_json_report(&comparison).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["unit"], "us");
    assert_eq!(value["comparison"]["cycles"], 2);
    assert_eq!(value["comparison"]["reports"][0]["label"], "SynchronizedVec");
    assert_eq!(value["comparison"]["reports"][1]["slot"], "Second");
}
