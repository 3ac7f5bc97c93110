/* -*- Mode: Rust; tab-width: 8; indent-tabs-mode: nil; rust-indent-offset: 2 -*-
 * vim: set ts=8 sts=2 et sw=2 tw=80:
*/

//! The ordered load/store instruction sequence of a scenario.
//!
//! `InstructionList` runs its own capacity policy on top of `SlotBuf`: the
//! first write allocates `INITIAL_CAPACITY` slots, a full list doubles, and
//! after a removal the buffer is cut down to `2 * len` once `len` has dropped
//! to a third of the capacity or less.  The gap between "full" and "a third
//! full" means a run of alternating appends and removals never reallocates
//! more than once.

use crate::buffer::{max_slots, BufferError, SlotBuf};
use log::{debug, trace};
use std::fmt;
use std::slice::Iter;

/// Slots allocated by the first write into an empty list.
pub const INITIAL_CAPACITY: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstKind {
  Load,
  Store,
}

impl fmt::Display for InstKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      InstKind::Load => write!(f, "load"),
      InstKind::Store => write!(f, "store"),
    }
  }
}

/// A load or store of one virtual register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegisterInstruction {
  pub kind: InstKind,
  pub vreg: i32,
}

impl RegisterInstruction {
  pub const fn new(kind: InstKind, vreg: i32) -> Self {
    Self { kind, vreg }
  }

  pub const fn load(vreg: i32) -> Self {
    Self::new(InstKind::Load, vreg)
  }

  pub const fn store(vreg: i32) -> Self {
    Self::new(InstKind::Store, vreg)
  }
}

impl fmt::Display for RegisterInstruction {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{} v{}", self.kind, self.vreg)
  }
}

//=============================================================================
// Capacity policy

/// The capacity a full buffer of `capacity` slots of `T` grows to.
///
/// Doubling saturates at `max_slots::<T>()`; a buffer already at that
/// ceiling cannot grow and `CapacityCeiling` is returned.
pub fn grown_capacity<T>(capacity: usize) -> Result<usize, BufferError> {
  if capacity == 0 {
    return Ok(INITIAL_CAPACITY);
  }
  let ceiling = max_slots::<T>();
  if capacity >= ceiling {
    return Err(BufferError::CapacityCeiling { capacity });
  }
  Ok(capacity.saturating_mul(2).min(ceiling))
}

/// The capacity to shrink to after a removal left `len` live slots, or `None`
/// if the buffer should stay as it is.
pub fn shrunk_capacity(len: usize, capacity: usize) -> Option<usize> {
  match len.checked_mul(3) {
    // len <= capacity / 3 here, so 2 * len cannot overflow.
    Some(threshold) if threshold <= capacity && 2 * len < capacity => {
      Some(2 * len)
    }
    _ => None,
  }
}

//=============================================================================
// InstructionList

#[derive(Debug)]
pub struct InstructionList {
  insts: SlotBuf<RegisterInstruction>,
}

impl InstructionList {
  /// An empty list.  Nothing is allocated until the first write.
  pub const fn new() -> Self {
    Self { insts: SlotBuf::new() }
  }

  pub fn len(&self) -> usize {
    self.insts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.insts.len() == 0
  }

  pub fn capacity(&self) -> usize {
    self.insts.capacity()
  }

  pub fn get(&self, index: usize) -> RegisterInstruction {
    assert!(
      index < self.len(),
      "instruction index {} out of range for {} instructions",
      index,
      self.len()
    );
    self.insts.as_slice()[index]
  }

  pub fn try_get(&self, index: usize) -> Option<RegisterInstruction> {
    self.insts.get(index)
  }

  pub fn iter(&self) -> Iter<RegisterInstruction> {
    self.insts.iter()
  }

  pub fn as_slice(&self) -> &[RegisterInstruction] {
    self.insts.as_slice()
  }

  /// Add `inst` at the end.  If the list is full and cannot grow, nothing
  /// changes and the reason is returned.
  pub fn append(&mut self, inst: RegisterInstruction) -> Result<(), BufferError> {
    self.reserve_one()?;
    self.insts.push(inst);
    Ok(())
  }

  /// Put `inst` at `index`, moving everything from `index` on one place
  /// back.  `index` may equal `len()`.  Grows like `append`, with the same
  /// all-or-nothing failure.
  pub fn insert_at(
    &mut self, index: usize, inst: RegisterInstruction,
  ) -> Result<(), BufferError> {
    assert!(
      index <= self.len(),
      "insertion index {} out of range for {} instructions",
      index,
      self.len()
    );
    self.reserve_one()?;
    self.insts.insert(index, inst);
    Ok(())
  }

  /// Remove the last instruction, if any.
  pub fn remove_behind(&mut self) -> Option<RegisterInstruction> {
    let inst = self.insts.pop()?;
    self.maybe_shrink();
    Some(inst)
  }

  /// Remove the instruction at `index`, moving everything after it one place
  /// forward.
  pub fn remove_at(&mut self, index: usize) -> RegisterInstruction {
    assert!(
      index < self.len(),
      "instruction index {} out of range for {} instructions",
      index,
      self.len()
    );
    let inst = self.insts.remove(index);
    self.maybe_shrink();
    inst
  }

  fn reserve_one(&mut self) -> Result<(), BufferError> {
    let capacity = self.insts.capacity();
    if self.insts.len() < capacity {
      return Ok(());
    }
    let grown = grown_capacity::<RegisterInstruction>(capacity)
      .and_then(|grown| self.insts.grow_to(grown).map(|()| grown))
      .map_err(|err| {
        debug!("instruction list stuck at {} slots: {}", capacity, err);
        err
      })?;
    trace!("instruction list grew from {} to {} slots", capacity, grown);
    Ok(())
  }

  fn maybe_shrink(&mut self) {
    let capacity = self.insts.capacity();
    let target = match shrunk_capacity(self.insts.len(), capacity) {
      Some(target) => target,
      None => return,
    };
    match self.insts.reallocate(target) {
      Ok(()) => {
        trace!("instruction list shrank from {} to {} slots", capacity, target)
      }
      // Still correct, just over-provisioned.
      Err(err) => debug!(
        "instruction list kept {} slots instead of {}: {}",
        capacity, target, err
      ),
    }
  }
}

impl Default for InstructionList {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn list_of(vregs: &[i32]) -> InstructionList {
    let mut list = InstructionList::new();
    for &v in vregs {
      list.append(RegisterInstruction::load(v)).unwrap();
    }
    list
  }

  fn vregs(list: &InstructionList) -> Vec<i32> {
    list.iter().map(|inst| inst.vreg).collect()
  }

  #[test]
  fn empty_list() {
    let list = InstructionList::new();
    assert_eq!(list.len(), 0);
    assert_eq!(list.capacity(), 0);
    assert!(list.is_empty());
    assert_eq!(list.try_get(0), None);
  }

  #[test]
  fn append_keeps_order() {
    let mut list = InstructionList::new();
    for k in 0..20 {
      let inst = if k % 2 == 0 {
        RegisterInstruction::load(k)
      } else {
        RegisterInstruction::store(k)
      };
      list.append(inst).unwrap();
      assert_eq!(list.len(), k as usize + 1);
    }
    for k in 0..20 {
      let inst = list.get(k);
      assert_eq!(inst.vreg, k as i32);
      let kind = if k % 2 == 0 { InstKind::Load } else { InstKind::Store };
      assert_eq!(inst.kind, kind);
    }
  }

  #[test]
  fn insert_shifts_right() {
    let mut list = list_of(&[0, 1, 2, 3]);
    list.insert_at(1, RegisterInstruction::store(9)).unwrap();
    assert_eq!(list.get(1), RegisterInstruction::store(9));
    assert_eq!(vregs(&list), vec![0, 9, 1, 2, 3]);

    list.insert_at(0, RegisterInstruction::load(7)).unwrap();
    assert_eq!(vregs(&list), vec![7, 0, 9, 1, 2, 3]);

    let end = list.len();
    list.insert_at(end, RegisterInstruction::load(8)).unwrap();
    assert_eq!(vregs(&list), vec![7, 0, 9, 1, 2, 3, 8]);
  }

  #[test]
  fn insert_into_empty_allocates() {
    let mut list = InstructionList::new();
    list.insert_at(0, RegisterInstruction::store(4)).unwrap();
    assert_eq!(list.capacity(), INITIAL_CAPACITY);
    assert_eq!(list.get(0), RegisterInstruction::store(4));
  }

  #[test]
  fn insert_grows_when_full() {
    let mut list = list_of(&[0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(list.capacity(), 8);
    list.insert_at(3, RegisterInstruction::load(42)).unwrap();
    assert_eq!(list.capacity(), 16);
    assert_eq!(vregs(&list), vec![0, 1, 2, 42, 3, 4, 5, 6, 7]);
  }

  #[test]
  fn remove_at_shifts_left() {
    let mut list = list_of(&[0, 1, 2, 3, 4]);
    assert_eq!(list.remove_at(2).vreg, 2);
    assert_eq!(vregs(&list), vec![0, 1, 3, 4]);
    assert_eq!(list.remove_at(3).vreg, 4);
    assert_eq!(list.remove_at(0).vreg, 0);
    assert_eq!(vregs(&list), vec![1, 3]);
  }

  #[test]
  fn remove_behind_on_empty() {
    let mut list = InstructionList::new();
    assert_eq!(list.remove_behind(), None);
    assert_eq!(list.len(), 0);
    list.append(RegisterInstruction::load(1)).unwrap();
    assert_eq!(list.remove_behind(), Some(RegisterInstruction::load(1)));
    assert_eq!(list.remove_behind(), None);
  }

  #[test]
  fn growth_sequence() {
    let mut list = InstructionList::new();
    let mut capacities = vec![];
    for k in 0..9 {
      list.append(RegisterInstruction::load(k)).unwrap();
      if capacities.last() != Some(&list.capacity()) {
        capacities.push(list.capacity());
      }
    }
    // Exactly two allocations: 8, then 16.
    assert_eq!(capacities, vec![8, 16]);
    for k in 9..17 {
      list.append(RegisterInstruction::load(k)).unwrap();
    }
    assert_eq!(list.capacity(), 32);
  }

  #[test]
  fn shrink_hysteresis() {
    let mut list = list_of(&[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(list.capacity(), 16);

    // 8, 7, 6 are all above a third of 16.
    for _ in 0..3 {
      list.remove_behind();
      assert_eq!(list.capacity(), 16);
    }
    // 5 * 3 <= 16
    list.remove_behind();
    assert_eq!(list.len(), 5);
    assert_eq!(list.capacity(), 10);
    assert_eq!(vregs(&list), vec![0, 1, 2, 3, 4]);

    // Anywhere in (10 / 3, 10] leaves the buffer alone.
    for k in 5..10 {
      list.append(RegisterInstruction::load(k)).unwrap();
      assert_eq!(list.capacity(), 10);
    }
    while list.len() > 4 {
      list.remove_at(0);
      assert_eq!(list.capacity(), 10);
    }
    list.remove_at(0);
    assert_eq!(list.len(), 3);
    assert_eq!(list.capacity(), 6);
    assert_eq!(vregs(&list), vec![7, 8, 9]);
  }

  #[test]
  fn shrink_to_nothing_then_reuse() {
    let mut list = list_of(&[1, 2]);
    list.remove_behind();
    list.remove_behind();
    assert_eq!(list.capacity(), 0);
    list.append(RegisterInstruction::store(3)).unwrap();
    assert_eq!(list.capacity(), INITIAL_CAPACITY);
    assert_eq!(list.get(0), RegisterInstruction::store(3));
  }

  #[test]
  fn alternating_at_boundary_does_not_thrash() {
    let mut list = list_of(&(0..16).collect::<Vec<i32>>());
    assert_eq!(list.capacity(), 16);
    list.append(RegisterInstruction::load(16)).unwrap();
    assert_eq!(list.capacity(), 32);
    for k in 0..10 {
      list.remove_behind();
      assert_eq!(list.capacity(), 32);
      list.append(RegisterInstruction::load(k)).unwrap();
      assert_eq!(list.capacity(), 32);
    }
  }

  #[test]
  fn grown_capacity_policy() {
    assert_eq!(grown_capacity::<RegisterInstruction>(0), Ok(8));
    assert_eq!(grown_capacity::<RegisterInstruction>(8), Ok(16));
    assert_eq!(grown_capacity::<RegisterInstruction>(1000), Ok(2000));

    let ceiling = max_slots::<RegisterInstruction>();
    // Doubling past the limit saturates at the largest capacity that fits.
    assert_eq!(grown_capacity::<RegisterInstruction>(ceiling / 2 + 1), Ok(ceiling));
    assert_eq!(
      grown_capacity::<RegisterInstruction>(ceiling),
      Err(BufferError::CapacityCeiling { capacity: ceiling })
    );
    assert_eq!(
      grown_capacity::<RegisterInstruction>(usize::MAX / 2 + 1),
      Err(BufferError::CapacityCeiling { capacity: usize::MAX / 2 + 1 })
    );
  }

  #[test]
  fn shrunk_capacity_policy() {
    assert_eq!(shrunk_capacity(8, 16), None);
    assert_eq!(shrunk_capacity(6, 16), None);
    assert_eq!(shrunk_capacity(5, 16), Some(10));
    assert_eq!(shrunk_capacity(0, 8), Some(0));
    assert_eq!(shrunk_capacity(0, 0), None);
    // Already at 2 * len.
    assert_eq!(shrunk_capacity(2, 4), None);
    assert_eq!(shrunk_capacity(usize::MAX / 2, usize::MAX), None);
  }

  #[test]
  #[should_panic(expected = "out of range")]
  fn get_out_of_range() {
    let list = list_of(&[1]);
    list.get(1);
  }

  #[test]
  #[should_panic(expected = "insertion index")]
  fn insert_past_end() {
    let mut list = list_of(&[1]);
    let _ = list.insert_at(2, RegisterInstruction::load(0));
  }

  #[test]
  #[should_panic(expected = "out of range")]
  fn remove_at_out_of_range() {
    let mut list = InstructionList::new();
    list.remove_at(0);
  }

  #[test]
  fn display() {
    assert_eq!(RegisterInstruction::load(3).to_string(), "load v3");
    assert_eq!(RegisterInstruction::store(-1).to_string(), "store v-1");
  }
}
