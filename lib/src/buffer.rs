/* -*- Mode: Rust; tab-width: 8; indent-tabs-mode: nil; rust-indent-offset: 2 -*-
 * vim: set ts=8 sts=2 et sw=2 tw=80:
*/

//! Owned slot buffers with exact, checked sizing.
//!
//! `SlotBuf` is the one place in the crate that talks to the allocator.  Its
//! tracked capacity is exact: the buffer never holds more slots than the
//! caller asked for, so the container types built on top of it can run their
//! own growth policy.  Every size computation goes through `byte_size`, which
//! refuses anything past `MAX_ALLOC_BYTES` before an allocation is attempted,
//! and every allocating operation either completes or leaves the buffer as it
//! was.

use std::fmt;
use std::mem;
use std::slice::Iter;

/// The largest allocation, in bytes, that a buffer will ever request.  This is
/// the limit the Rust allocator contract places on a single object.
pub const MAX_ALLOC_BYTES: usize = isize::MAX as usize;

/// Resource exhaustion while sizing or allocating a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferError {
  /// `requested` slots would need more than `MAX_ALLOC_BYTES` bytes.
  CapacityOverflow { requested: usize },

  /// The buffer already holds `capacity` slots, which is as many as fit.
  CapacityCeiling { capacity: usize },

  /// The allocator could not provide `bytes` bytes.
  AllocFailed { bytes: usize },
}

impl fmt::Display for BufferError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      BufferError::CapacityOverflow { requested } => {
        write!(f, "{} slots exceed the maximum allocation size", requested)
      }
      BufferError::CapacityCeiling { capacity } => {
        write!(f, "cannot grow past {} slots", capacity)
      }
      BufferError::AllocFailed { bytes } => {
        write!(f, "could not allocate {} bytes", bytes)
      }
    }
  }
}

impl std::error::Error for BufferError {}

/// Number of bytes `count` slots of `T` occupy, or `CapacityOverflow` if that
/// does not fit in `MAX_ALLOC_BYTES`.
pub fn byte_size<T>(count: usize) -> Result<usize, BufferError> {
  match count.checked_mul(mem::size_of::<T>()) {
    Some(bytes) if bytes <= MAX_ALLOC_BYTES => Ok(bytes),
    _ => Err(BufferError::CapacityOverflow { requested: count }),
  }
}

/// The most slots of `T` a single buffer can hold.
pub fn max_slots<T>() -> usize {
  match mem::size_of::<T>() {
    0 => usize::MAX,
    size => MAX_ALLOC_BYTES / size,
  }
}

//=============================================================================
// SlotBuf

/// A heap buffer of `Copy` slots with an exactly tracked capacity.
///
/// Invariants: `len() <= capacity()`, and the backing allocation always has
/// room for `capacity()` slots, so `push` and `insert` within capacity never
/// touch the allocator.
#[derive(Debug)]
pub(crate) struct SlotBuf<T> {
  slots: Vec<T>,
  capacity: usize,
}

impl<T: Copy> SlotBuf<T> {
  /// An empty buffer.  Does not allocate.
  pub(crate) const fn new() -> Self {
    Self { slots: Vec::new(), capacity: 0 }
  }

  pub(crate) fn with_capacity(capacity: usize) -> Result<Self, BufferError> {
    let mut buf = Self::new();
    buf.grow_to(capacity)?;
    Ok(buf)
  }

  /// A buffer holding exactly `len` copies of `value`.
  pub(crate) fn filled(len: usize, value: T) -> Result<Self, BufferError> {
    let mut buf = Self::with_capacity(len)?;
    buf.slots.resize(len, value);
    Ok(buf)
  }

  pub(crate) fn len(&self) -> usize {
    self.slots.len()
  }

  pub(crate) fn capacity(&self) -> usize {
    self.capacity
  }

  pub(crate) fn as_slice(&self) -> &[T] {
    &self.slots
  }

  pub(crate) fn iter(&self) -> Iter<T> {
    self.slots.iter()
  }

  pub(crate) fn get(&self, index: usize) -> Option<T> {
    self.slots.get(index).copied()
  }

  pub(crate) fn set(&mut self, index: usize, value: T) {
    self.slots[index] = value;
  }

  /// Append into spare capacity.  The caller must have made room first.
  pub(crate) fn push(&mut self, value: T) {
    debug_assert!(self.len() < self.capacity);
    self.slots.push(value);
  }

  /// Insert into spare capacity, shifting `index..` one slot to the right.
  pub(crate) fn insert(&mut self, index: usize, value: T) {
    debug_assert!(self.len() < self.capacity);
    self.slots.insert(index, value);
  }

  /// Remove the slot at `index`, shifting the tail one slot to the left.
  pub(crate) fn remove(&mut self, index: usize) -> T {
    self.slots.remove(index)
  }

  pub(crate) fn pop(&mut self) -> Option<T> {
    self.slots.pop()
  }

  /// Make the buffer hold exactly `len` slots, filling new ones with
  /// `value`.  Capacity is grown to exactly `len` when needed and is left
  /// alone when shrinking.  On failure nothing changes.
  pub(crate) fn resize(&mut self, len: usize, value: T) -> Result<(), BufferError> {
    byte_size::<T>(len)?;
    if len > self.capacity {
      self.grow_to(len)?;
    }
    self.slots.resize(len, value);
    Ok(())
  }

  /// Raise the capacity to exactly `capacity` slots.  A request at or below
  /// the current capacity is a no-op.
  pub(crate) fn grow_to(&mut self, capacity: usize) -> Result<(), BufferError> {
    if capacity <= self.capacity {
      return Ok(());
    }
    let bytes = byte_size::<T>(capacity)?;
    let additional = capacity - self.slots.len();
    self
      .slots
      .try_reserve_exact(additional)
      .map_err(|_| BufferError::AllocFailed { bytes })?;
    self.capacity = capacity;
    Ok(())
  }

  /// Move the live slots into a fresh allocation of exactly `capacity`
  /// slots.  `capacity` must be at least `len()`.  If the new allocation
  /// cannot be made the buffer keeps its old one.
  pub(crate) fn reallocate(&mut self, capacity: usize) -> Result<(), BufferError> {
    assert!(
      capacity >= self.len(),
      "cannot reallocate {} slots into a capacity of {}",
      self.len(),
      capacity
    );
    if capacity == self.capacity {
      return Ok(());
    }
    if capacity > self.capacity {
      return self.grow_to(capacity);
    }
    let bytes = byte_size::<T>(capacity)?;
    let mut fresh = Vec::new();
    fresh
      .try_reserve_exact(capacity)
      .map_err(|_| BufferError::AllocFailed { bytes })?;
    fresh.extend_from_slice(&self.slots);
    self.slots = fresh;
    self.capacity = capacity;
    Ok(())
  }
}
