//! Comparison Session
//!
//! Holds everything a comparison needs between menu actions: the two lists,
//! the raw size parameters, the cycle count and the averager settings.
//! Setters only accept valid values; a rejected value leaves the previous one
//! in place.

use seqbench_core::{
    Action, Comparison, ComparisonError, ContainerError, ContainerKind, CycleAverager, CycleCount,
    ListSlot, Sequence, SizeParams, ValidationError, check_size_params, compare_with_progress,
    repopulate,
};
use std::fmt::Write;

/// Explicit comparison context
pub struct Session {
    list1: Option<Box<dyn Sequence>>,
    list2: Option<Box<dyn Sequence>>,
    size_params: Option<Vec<i64>>,
    cycles: i64,
    averager: CycleAverager,
}

impl Session {
    /// Empty session: no lists, no size parameters, one cycle
    pub fn new(averager: CycleAverager) -> Self {
        Self {
            list1: None,
            list2: None,
            size_params: None,
            cycles: CycleCount::default().get() as i64,
            averager,
        }
    }

    /// Current cycle count
    pub fn cycles(&self) -> i64 {
        self.cycles
    }

    /// Current raw size parameters
    pub fn size_params(&self) -> Option<&[i64]> {
        self.size_params.as_deref()
    }

    /// Trial and failure settings
    pub fn averager(&self) -> &CycleAverager {
        &self.averager
    }

    /// The list in `slot`, if selected
    pub fn list(&self, slot: ListSlot) -> Option<&dyn Sequence> {
        match slot {
            ListSlot::First => self.list1.as_deref(),
            ListSlot::Second => self.list2.as_deref(),
        }
    }

    /// Replace the cycle count if `cycles >= 1`.
    pub fn set_cycles(&mut self, cycles: i64) -> Result<(), ValidationError> {
        CycleCount::new(cycles).map_err(|_| ValidationError::InvalidCycleCount(cycles))?;
        self.cycles = cycles;
        Ok(())
    }

    /// Replace the size parameters if they are well-formed.
    pub fn set_size_params(&mut self, components: Vec<i64>) -> Result<(), ValidationError> {
        check_size_params(Some(components.as_slice()))?;
        self.size_params = Some(components);
        Ok(())
    }

    /// Install fresh containers of the given kinds, then populate both.
    pub fn select_lists(
        &mut self,
        first: ContainerKind,
        second: ContainerKind,
    ) -> Result<bool, ContainerError> {
        self.list1 = Some(first.build());
        self.list2 = Some(second.build());
        self.reset_lists()
    }

    /// Clear and repopulate both lists.
    ///
    /// Returns `false` without touching the lists when the size parameters are
    /// not valid.
    pub fn reset_lists(&mut self) -> Result<bool, ContainerError> {
        let params = match self.valid_params() {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!("lists not populated: {}", e);
                return Ok(false);
            }
        };
        for list in [&self.list1, &self.list2].into_iter().flatten() {
            repopulate(list.as_ref(), &params)?;
        }
        Ok(true)
    }

    fn valid_params(&self) -> Result<SizeParams, ValidationError> {
        check_size_params(self.size_params.as_deref())
    }

    /// Validate and run `action` on both lists.
    pub fn run<F>(&self, action: Action, on_cycle: F) -> Result<Comparison, ComparisonError>
    where
        F: FnMut(ListSlot, u64),
    {
        compare_with_progress(
            self.list1.as_deref(),
            self.list2.as_deref(),
            action,
            self.size_params.as_deref(),
            self.cycles,
            &self.averager,
            on_cycle,
        )
    }

    /// Human-readable dump of the whole configuration, list contents included.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "The number of test cycles : [{}]", self.cycles);
        match &self.size_params {
            Some(components) => {
                let _ = writeln!(out, "Parameters of the lists: {:?}", components);
            }
            None => out.push_str("Parameters of the lists: none\n"),
        }
        let trial = self.averager.trial_config();
        let _ = writeln!(
            out,
            "Workers per trial: {}  |  failure policy: {:?}",
            trial.workers,
            self.averager.policy()
        );
        for (name, slot) in [("List 1", ListSlot::First), ("List 2", ListSlot::Second)] {
            match self.list(slot) {
                None => {
                    let _ = writeln!(out, "{} - none", name);
                }
                Some(list) => {
                    let _ = write!(out, "{} - [{}] - size:{} | ", name, list.label(), list.len());
                    for item in list.to_vec() {
                        let _ = write!(out, "{}|", item);
                    }
                    out.push('\n');
                }
            }
        }
        out
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CycleAverager::default())
    }
}
