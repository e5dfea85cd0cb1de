use std::ops::Index;

use crate::error::{Error, Result};

/// A preallocated sequence with a fixed maximum size.
///
/// Storage is allocated once in [`FixedCapacitySequence::new`] and never
/// grows. Elements are inserted at the front and removed from the back, so
/// index 0 is always the most recently pushed value. Only intended for
/// plain `Copy` numeric values.
#[derive(Debug)]
pub struct FixedCapacitySequence<T: Copy + Default> {
    data: Box<[T]>,
    len: usize,
}

impl<T: Copy + Default> FixedCapacitySequence<T> {
    /// Creates an empty sequence able to hold `max_size` elements.
    pub fn new(max_size: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(Error::invalid_config("sequence capacity must be greater than zero"));
        }
        Ok(Self { data: vec![T::default(); max_size].into_boxed_slice(), len: 0 })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_size(&self) -> usize {
        self.data.len()
    }

    pub fn is_full(&self) -> bool {
        self.len == self.data.len()
    }

    /// Inserts `value` at index 0, shifting existing elements toward the back.
    ///
    /// Does nothing when the sequence is full; callers make room with
    /// [`pop_back`](Self::pop_back) first.
    pub fn push_front(&mut self, value: T) {
        if self.is_full() {
            return;
        }
        self.data.copy_within(0..self.len, 1);
        self.data[0] = value;
        self.len += 1;
    }

    /// Appends `value` after the last element. Does nothing when full.
    pub fn push_back(&mut self, value: T) {
        if self.is_full() {
            return;
        }
        self.data[self.len] = value;
        self.len += 1;
    }

    /// Drops the oldest element. Remaining values are left untouched.
    pub fn pop_back(&mut self) {
        self.len = self.len.saturating_sub(1);
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).copied()
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// The logically present elements, newest first.
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T: Copy + Default> Clone for FixedCapacitySequence<T> {
    fn clone(&self) -> Self {
        let mut data = vec![T::default(); self.data.len()].into_boxed_slice();
        data[..self.len].copy_from_slice(self.as_slice());
        Self { data, len: self.len }
    }
}

impl<T: Copy + Default> Index<usize> for FixedCapacitySequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<'a, T: Copy + Default> IntoIterator for &'a FixedCapacitySequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
