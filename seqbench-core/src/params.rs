//! Run Parameters
//!
//! `SizeParams` governs how containers are populated and what size the gate
//! expects; `CycleCount` is how many trials one averaging pass runs.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Rejected parameter input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// Not exactly three components
    #[error("expected 3 size parameters [size, low, high], got {0}")]
    WrongArity(usize),

    /// Size below 1
    #[error("size must be at least 1, got {0}")]
    SizeTooSmall(i64),

    /// `low >= high`
    #[error("low bound {low} must be below high bound {high}")]
    EmptyValueRange {
        /// Requested lower bound
        low: i64,
        /// Requested upper bound
        high: i64,
    },

    /// Cycle count below 1
    #[error("number of test cycles must be at least 1, got {0}")]
    CyclesTooSmall(i64),
}

/// Element count and half-open value range `[low, high)` for populating containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeParams {
    size: usize,
    low: i64,
    high: i64,
}

impl SizeParams {
    /// Build from the raw `[size, low, high]` triple supplied by configuration.
    pub fn from_components(components: &[i64]) -> Result<Self, ParamError> {
        let &[size, low, high] = components else {
            return Err(ParamError::WrongArity(components.len()));
        };
        Self::new(size, low, high)
    }

    /// Validate `size >= 1` and `low < high`.
    pub fn new(size: i64, low: i64, high: i64) -> Result<Self, ParamError> {
        if size < 1 {
            return Err(ParamError::SizeTooSmall(size));
        }
        if low >= high {
            return Err(ParamError::EmptyValueRange { low, high });
        }
        let size = usize::try_from(size).map_err(|_| ParamError::SizeTooSmall(size))?;
        Ok(Self { size, low, high })
    }

    /// Required element count
    pub fn size(&self) -> usize {
        self.size
    }

    /// Inclusive lower bound of populated values
    pub fn low(&self) -> i64 {
        self.low
    }

    /// Exclusive upper bound of populated values
    pub fn high(&self) -> i64 {
        self.high
    }
}

impl fmt::Display for SizeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.size, self.low, self.high)
    }
}

/// Number of trials per averaging pass, always >= 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleCount(u64);

impl CycleCount {
    /// Rejects anything below 1.
    pub fn new(cycles: i64) -> Result<Self, ParamError> {
        u64::try_from(cycles)
            .ok()
            .filter(|&c| c >= 1)
            .map(Self)
            .ok_or(ParamError::CyclesTooSmall(cycles))
    }

    /// Cycle count
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for CycleCount {
    fn default() -> Self {
        Self(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_components() {
        let params = SizeParams::from_components(&[3, 0, 10]).unwrap();
        assert_eq!(params.size(), 3);
        assert_eq!(params.low(), 0);
        assert_eq!(params.high(), 10);
        assert_eq!(params.to_string(), "[3, 0, 10]");
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(
            SizeParams::from_components(&[3, 4]),
            Err(ParamError::WrongArity(2))
        );
        assert_eq!(
            SizeParams::from_components(&[1, 2, 3, 4]),
            Err(ParamError::WrongArity(4))
        );
        assert_eq!(
            SizeParams::from_components(&[0, 0, 10]),
            Err(ParamError::SizeTooSmall(0))
        );
        assert_eq!(
            SizeParams::from_components(&[10, 7, 2]),
            Err(ParamError::EmptyValueRange { low: 7, high: 2 })
        );
        assert!(SizeParams::from_components(&[10, 5, 5]).is_err());
    }

    #[test]
    fn test_cycle_count() {
        assert_eq!(CycleCount::new(3).unwrap().get(), 3);
        assert_eq!(CycleCount::new(0), Err(ParamError::CyclesTooSmall(0)));
        assert_eq!(CycleCount::new(-4), Err(ParamError::CyclesTooSmall(-4)));
        assert_eq!(CycleCount::default().get(), 1);
    }
}
