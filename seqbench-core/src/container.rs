//! Containers Under Test
//!
//! The core only sees the [`Sequence`] capability set: read-by-index, append,
//! length, clear. Every implementation owns its own synchronization; the timing
//! core never adds locking around element access.
//!
//! Built-in containers:
//! - [`CopyOnWriteVec`] - snapshot reads, each append copies the whole vector
//! - [`SynchronizedVec`] - one mutex around every operation
//! - [`UnsyncVec`] - non-blocking; overlapping structural access is rejected
//! - [`LinkedSeq`] - mutex-guarded linked list, reads walk the list

use crate::params::SizeParams;
use rand::Rng;
use std::collections::LinkedList;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};
use thiserror::Error;

/// Errors raised by a container operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// Read past the end
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Length at the time of the read
        len: usize,
    },

    /// Overlapping mutation detected by the named container
    #[error("concurrent modification detected in {0}")]
    ConcurrentModification(&'static str),
}

/// A mutable, indexable sequence of integers shared by trial workers
pub trait Sequence: Send + Sync {
    /// Type label shown in results
    fn label(&self) -> &'static str;

    /// Current element count
    fn len(&self) -> usize;

    /// Whether the sequence holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the element at `index`
    fn get(&self, index: usize) -> Result<i64, ContainerError>;

    /// Append `value` at the end
    fn push(&self, value: i64) -> Result<(), ContainerError>;

    /// Remove every element
    fn clear(&self);

    /// Copy of the current contents, for display
    fn to_vec(&self) -> Vec<i64>;
}

/// Append `params.size()` random values drawn from `[low, high)`.
pub fn populate(seq: &dyn Sequence, params: &SizeParams) -> Result<(), ContainerError> {
    let mut rng = rand::thread_rng();
    for _ in 0..params.size() {
        seq.push(rng.gen_range(params.low()..params.high()))?;
    }
    Ok(())
}

/// Clear the sequence and populate it afresh.
pub fn repopulate(seq: &dyn Sequence, params: &SizeParams) -> Result<(), ContainerError> {
    seq.clear();
    populate(seq, params)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn out_of_bounds(index: usize, len: usize) -> ContainerError {
    ContainerError::IndexOutOfBounds { index, len }
}

// ─── CopyOnWriteVec ──────────────────────────────────────────────────────────

/// Readers clone an `Arc` snapshot; writers publish a full copy.
#[derive(Debug, Default)]
pub struct CopyOnWriteVec {
    current: RwLock<Arc<Vec<i64>>>,
}

impl CopyOnWriteVec {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Arc<Vec<i64>> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }
}

impl Sequence for CopyOnWriteVec {
    fn label(&self) -> &'static str {
        "CopyOnWriteVec"
    }

    fn len(&self) -> usize {
        self.snapshot().len()
    }

    fn get(&self, index: usize) -> Result<i64, ContainerError> {
        let snapshot = self.snapshot();
        snapshot
            .get(index)
            .copied()
            .ok_or_else(|| out_of_bounds(index, snapshot.len()))
    }

    fn push(&self, value: i64) -> Result<(), ContainerError> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend_from_slice(&current);
        next.push(value);
        *current = Arc::new(next);
        Ok(())
    }

    fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(Vec::new());
    }

    fn to_vec(&self) -> Vec<i64> {
        self.snapshot().as_ref().clone()
    }
}

// ─── SynchronizedVec ─────────────────────────────────────────────────────────

/// Every operation serializes on one mutex.
#[derive(Debug, Default)]
pub struct SynchronizedVec {
    items: Mutex<Vec<i64>>,
}

impl SynchronizedVec {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sequence for SynchronizedVec {
    fn label(&self) -> &'static str {
        "SynchronizedVec"
    }

    fn len(&self) -> usize {
        lock(&self.items).len()
    }

    fn get(&self, index: usize) -> Result<i64, ContainerError> {
        let items = lock(&self.items);
        items
            .get(index)
            .copied()
            .ok_or_else(|| out_of_bounds(index, items.len()))
    }

    fn push(&self, value: i64) -> Result<(), ContainerError> {
        lock(&self.items).push(value);
        Ok(())
    }

    fn clear(&self) {
        lock(&self.items).clear();
    }

    fn to_vec(&self) -> Vec<i64> {
        lock(&self.items).clone()
    }
}

// ─── UnsyncVec ───────────────────────────────────────────────────────────────

/// A vector that never waits for another thread.
///
/// Reads may overlap each other, but any access that meets an append in
/// progress (or an append that meets any access) fails with
/// [`ContainerError::ConcurrentModification`] instead of blocking.
#[derive(Debug, Default)]
pub struct UnsyncVec {
    items: RwLock<Vec<i64>>,
}

impl UnsyncVec {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sequence for UnsyncVec {
    fn label(&self) -> &'static str {
        "UnsyncVec"
    }

    // Length, clear and display are not part of any timed region and may block.
    fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn get(&self, index: usize) -> Result<i64, ContainerError> {
        let items = match self.items.try_read() {
            Ok(items) => items,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                return Err(ContainerError::ConcurrentModification(self.label()));
            }
        };
        items
            .get(index)
            .copied()
            .ok_or_else(|| out_of_bounds(index, items.len()))
    }

    fn push(&self, value: i64) -> Result<(), ContainerError> {
        let mut items = match self.items.try_write() {
            Ok(items) => items,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                return Err(ContainerError::ConcurrentModification(self.label()));
            }
        };
        items.push(value);
        Ok(())
    }

    fn clear(&self) {
        self.items.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn to_vec(&self) -> Vec<i64> {
        self.items.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

// ─── LinkedSeq ───────────────────────────────────────────────────────────────

/// Mutex-guarded doubly linked list; `get` is O(index).
#[derive(Debug, Default)]
pub struct LinkedSeq {
    items: Mutex<LinkedList<i64>>,
}

impl LinkedSeq {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sequence for LinkedSeq {
    fn label(&self) -> &'static str {
        "LinkedSeq"
    }

    fn len(&self) -> usize {
        lock(&self.items).len()
    }

    fn get(&self, index: usize) -> Result<i64, ContainerError> {
        let items = lock(&self.items);
        items
            .iter()
            .nth(index)
            .copied()
            .ok_or_else(|| out_of_bounds(index, items.len()))
    }

    fn push(&self, value: i64) -> Result<(), ContainerError> {
        lock(&self.items).push_back(value);
        Ok(())
    }

    fn clear(&self) {
        lock(&self.items).clear();
    }

    fn to_vec(&self) -> Vec<i64> {
        lock(&self.items).iter().copied().collect()
    }
}

// ─── ContainerKind ───────────────────────────────────────────────────────────

/// Selectable container implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// [`CopyOnWriteVec`]
    CopyOnWrite,
    /// [`SynchronizedVec`]
    Synchronized,
    /// [`UnsyncVec`]
    Unsync,
    /// [`LinkedSeq`]
    Linked,
}

impl ContainerKind {
    /// All kinds, in menu order
    pub const ALL: [ContainerKind; 4] = [
        ContainerKind::CopyOnWrite,
        ContainerKind::Synchronized,
        ContainerKind::Unsync,
        ContainerKind::Linked,
    ];

    /// Create an empty container of this kind
    pub fn build(self) -> Box<dyn Sequence> {
        match self {
            ContainerKind::CopyOnWrite => Box::new(CopyOnWriteVec::new()),
            ContainerKind::Synchronized => Box::new(SynchronizedVec::new()),
            ContainerKind::Unsync => Box::new(UnsyncVec::new()),
            ContainerKind::Linked => Box::new(LinkedSeq::new()),
        }
    }

    /// Configuration name
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::CopyOnWrite => "copy-on-write",
            ContainerKind::Synchronized => "synchronized",
            ContainerKind::Unsync => "unsync",
            ContainerKind::Linked => "linked",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "copy-on-write" | "cow" => Ok(ContainerKind::CopyOnWrite),
            "synchronized" | "sync" => Ok(ContainerKind::Synchronized),
            "unsync" | "unsynchronized" => Ok(ContainerKind::Unsync),
            "linked" | "linked-list" => Ok(ContainerKind::Linked),
            other => Err(format!("Unknown container kind: {}", other)),
        }
    }
}

impl serde::Serialize for ContainerKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for ContainerKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
