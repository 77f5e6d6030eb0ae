//! Workload Description
//!
//! A workload is an [`Action`] applied over one half-open index range. The
//! trial splits `[0, size)` into contiguous ranges with [`partition`], one per
//! worker.

use crate::container::{ContainerError, Sequence};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// The operation each worker performs per index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Read the element at each index and discard it
    ReadByIndex,
    /// Append the index itself as a new element
    Append,
}

impl Action {
    /// Short label shown in results
    pub fn label(self) -> &'static str {
        match self {
            Action::ReadByIndex => "get()",
            Action::Append => "add()",
        }
    }

    /// Whether this action changes the container's length
    pub fn mutates(self) -> bool {
        matches!(self, Action::Append)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_end_matches("()") {
            "get" | "read" | "access" => Ok(Action::ReadByIndex),
            "add" | "append" | "push" => Ok(Action::Append),
            other => Err(format!("Unknown action: {}", other)),
        }
    }
}

/// One worker's share of a trial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    /// Operation applied at each index
    pub action: Action,
    /// Indices this worker touches
    pub range: Range<usize>,
}

impl Workload {
    /// Workload running `action` over `range`
    pub fn new(action: Action, range: Range<usize>) -> Self {
        Self { action, range }
    }

    /// Run the action over every index in the range, stopping at the first error.
    #[inline]
    pub fn apply(&self, container: &dyn Sequence) -> Result<(), ContainerError> {
        match self.action {
            Action::ReadByIndex => {
                for i in self.range.clone() {
                    std::hint::black_box(container.get(i)?);
                }
            }
            Action::Append => {
                for i in self.range.clone() {
                    container.push(i as i64)?;
                }
            }
        }
        Ok(())
    }
}

/// Split `[0, size)` into `parts` contiguous, non-overlapping ranges.
///
/// Range `i` is `[i * size / parts, (i + 1) * size / parts)`, so two parts split
/// at `size / 2`. Ranges may be empty when `size < parts`.
pub fn partition(size: usize, parts: usize) -> Vec<Range<usize>> {
    (0..parts)
        .map(|i| (i * size / parts)..((i + 1) * size / parts))
        .collect()
}
