/* -*- Mode: Rust; tab-width: 8; indent-tabs-mode: nil; rust-indent-offset: 2 -*-
 * vim: set ts=8 sts=2 et sw=2 tw=80:
*/

//! Per-register load/store costs.

use crate::buffer::{BufferError, SlotBuf};
use log::debug;
use std::fmt;
use std::slice::Iter;

/// What it costs to load into and store out of one register (or memory).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegisterCost {
  pub load: i32,
  pub store: i32,
}

impl RegisterCost {
  /// The cost every fresh register slot starts with.
  pub const DEFAULT: RegisterCost = RegisterCost { load: 1, store: 1 };

  pub const fn new(load: i32, store: i32) -> Self {
    Self { load, store }
  }

  /// Both components are positive.
  pub fn is_valid(&self) -> bool {
    self.load > 0 && self.store > 0
  }

  /// Either component is strictly above the matching one of `other`.
  pub fn exceeds(&self, other: &RegisterCost) -> bool {
    self.load > other.load || self.store > other.store
  }
}

impl Default for RegisterCost {
  fn default() -> Self {
    Self::DEFAULT
  }
}

impl fmt::Display for RegisterCost {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "load {}, store {}", self.load, self.store)
  }
}

pub(crate) fn assert_valid_cost(what: &str, cost: RegisterCost) {
  assert!(cost.load > 0, "{} load cost must be positive, got {}", what, cost.load);
  assert!(cost.store > 0, "{} store cost must be positive, got {}", what, cost.store);
}

//=============================================================================
// CostArray

/// One `RegisterCost` per register, addressed by register index.  The array
/// holds exactly `len()` slots.
#[derive(Debug)]
pub struct CostArray {
  costs: SlotBuf<RegisterCost>,
}

impl CostArray {
  /// An array of `count` registers, all at `RegisterCost::DEFAULT`.
  pub fn new(count: usize) -> Result<Self, BufferError> {
    Ok(Self { costs: SlotBuf::filled(count, RegisterCost::DEFAULT)? })
  }

  /// Change the number of registers.  Surviving registers keep their costs
  /// and new ones start at `RegisterCost::DEFAULT`.  On failure the array is
  /// left exactly as it was.
  pub fn resize(&mut self, new_count: usize) -> Result<(), BufferError> {
    let old_count = self.len();
    self.costs.resize(new_count, RegisterCost::DEFAULT)?;
    if new_count < old_count {
      // The truncation already happened; giving memory back is best effort.
      if let Err(err) = self.costs.reallocate(new_count) {
        debug!(
          "cost array kept {} slots after shrinking to {}: {}",
          self.costs.capacity(),
          new_count,
          err
        );
      }
    }
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.costs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.costs.len() == 0
  }

  pub fn get(&self, index: usize) -> RegisterCost {
    self.assert_in_range(index);
    self.costs.as_slice()[index]
  }

  pub fn try_get(&self, index: usize) -> Option<RegisterCost> {
    self.costs.get(index)
  }

  pub fn set(&mut self, index: usize, cost: RegisterCost) {
    self.assert_in_range(index);
    assert_valid_cost("register", cost);
    self.costs.set(index, cost);
  }

  pub fn iter(&self) -> Iter<RegisterCost> {
    self.costs.iter()
  }

  pub fn as_slice(&self) -> &[RegisterCost] {
    self.costs.as_slice()
  }

  fn assert_in_range(&self, index: usize) {
    assert!(
      index < self.len(),
      "register index {} out of range for {} registers",
      index,
      self.len()
    );
  }
}
