//! Shared storage cells that a hardware backend owns and handles point into.
//!
//! A [`Slot`] is the Rust counterpart of a raw `double*` handed to a driver:
//! the backend allocates it once, clones of it are passed to handles, and
//! every clone reads and writes the same value. Values are stored as the bit
//! pattern of an `f64` in an atomic word, so a driver thread may fill sensor
//! data without locks and without `unsafe`.

use core::fmt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One `f64` of backend-owned storage.
#[derive(Clone, Default)]
pub struct Slot(Arc<AtomicU64>);

impl Slot {
    pub fn new(value: f64) -> Self {
        Self(Arc::new(AtomicU64::new(value.to_bits())))
    }

    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }

    /// True when both slots refer to the same storage.
    pub fn ptr_eq(&self, other: &Slot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Stable address of the underlying storage, usable as an identity key.
    pub fn as_ptr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast()
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&self.get()).finish()
    }
}

/// A fixed-length run of `f64` storage, e.g. a PID gain triple.
#[derive(Clone)]
pub struct SlotArray(Arc<[AtomicU64]>);

impl SlotArray {
    pub fn new(values: &[f64]) -> Self {
        let cells: Vec<AtomicU64> = values
            .iter()
            .map(|v| AtomicU64::new(v.to_bits()))
            .collect();
        Self(cells.into())
    }

    pub fn filled(len: usize, value: f64) -> Self {
        Self::new(&vec![value; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0
            .get(index)
            .map(|cell| f64::from_bits(cell.load(Ordering::Acquire)))
    }

    /// Writes `value` at `index`; returns false when out of range.
    pub fn set(&self, index: usize, value: f64) -> bool {
        match self.0.get(index) {
            Some(cell) => {
                cell.store(value.to_bits(), Ordering::Release);
                true
            }
            None => false,
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }

    pub fn ptr_eq(&self, other: &SlotArray) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SlotArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlotArray").field(&self.to_vec()).finish()
    }
}

/// Backend-owned storage for a joint's current control mode.
#[derive(Clone, Default)]
pub struct ModeSlot(Arc<Mutex<String>>);

impl ModeSlot {
    pub fn new(mode: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(mode.into())))
    }

    pub fn get(&self) -> String {
        self.0.lock().clone()
    }

    pub fn set(&self, mode: &str) {
        let mut current = self.0.lock();
        current.clear();
        current.push_str(mode);
    }

    pub fn ptr_eq(&self, other: &ModeSlot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ModeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModeSlot").field(&*self.0.lock()).finish()
    }
}
