//! Validation Gate
//!
//! Decides whether a comparison may run at all. Checks run in a fixed order and
//! the first failure is the one reported:
//!
//! 1. list 1 present and non-empty
//! 2. list 2 present and non-empty
//! 3. size parameters present and well-formed
//! 4. cycle count positive
//! 5. both list lengths equal the configured size
//!
//! Nothing is modified, whatever the outcome.

use crate::container::Sequence;
use crate::params::{CycleCount, SizeParams};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which of the two compared lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListSlot {
    /// List 1
    First,
    /// List 2
    Second,
}

impl fmt::Display for ListSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListSlot::First => f.write_str("1st"),
            ListSlot::Second => f.write_str("2nd"),
        }
    }
}

/// Configuration rejected before any timing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A list is unset or empty
    #[error("The {slot} list to compare has no data")]
    EmptyList {
        /// Which list
        slot: ListSlot,
    },

    /// Missing, wrong-length or out-of-range size parameters
    #[error("The three list size parameters are not correct ({reason}). Actual: {actual}")]
    InvalidSizeParams {
        /// Components as supplied
        actual: String,
        /// What was wrong with them
        reason: String,
    },

    /// Cycle count below 1
    #[error("The number of test cycles is incorrect: [{0}]")]
    InvalidCycleCount(i64),

    /// A list length differs from the requested size
    #[error("The list size parameter {expected} is not synced with list sizes: [{first} and {second}]")]
    OutOfSync {
        /// Requested size
        expected: usize,
        /// Length of list 1
        first: usize,
        /// Length of list 2
        second: usize,
    },
}

/// Parameters that passed the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRun {
    /// Validated size parameters
    pub params: SizeParams,
    /// Validated cycle count
    pub cycles: CycleCount,
}

/// Check both lists and the run parameters, in order.
pub fn validate(
    list1: Option<&dyn Sequence>,
    list2: Option<&dyn Sequence>,
    size_params: Option<&[i64]>,
    cycles: i64,
) -> Result<ValidatedRun, ValidationError> {
    let first = require_data(list1, ListSlot::First)?;
    let second = require_data(list2, ListSlot::Second)?;
    let params = check_size_params(size_params)?;
    let cycles = CycleCount::new(cycles).map_err(|_| ValidationError::InvalidCycleCount(cycles))?;

    let (first_len, second_len) = (first.len(), second.len());
    if first_len != params.size() || second_len != params.size() {
        return Err(ValidationError::OutOfSync {
            expected: params.size(),
            first: first_len,
            second: second_len,
        });
    }

    Ok(ValidatedRun { params, cycles })
}

fn require_data(
    list: Option<&dyn Sequence>,
    slot: ListSlot,
) -> Result<&dyn Sequence, ValidationError> {
    match list {
        Some(list) if !list.is_empty() => Ok(list),
        _ => Err(ValidationError::EmptyList { slot }),
    }
}

/// Parse raw `[size, low, high]` input into [`SizeParams`].
pub fn check_size_params(size_params: Option<&[i64]>) -> Result<SizeParams, ValidationError> {
    let Some(components) = size_params else {
        return Err(ValidationError::InvalidSizeParams {
            actual: "none".to_string(),
            reason: "not configured".to_string(),
        });
    };
    SizeParams::from_components(components).map_err(|e| ValidationError::InvalidSizeParams {
        actual: format!("{:?}", components),
        reason: e.to_string(),
    })
}
