/* -*- Mode: Rust; tab-width: 8; indent-tabs-mode: nil; rust-indent-offset: 2 -*-
 * vim: set ts=8 sts=2 et sw=2 tw=80:
*/

//! A complete register allocation scenario: register costs, the cost of
//! spilling to memory, and the instruction sequence.

use crate::buffer::BufferError;
use crate::cost::{assert_valid_cost, CostArray, RegisterCost};
use crate::inst::{InstructionList, RegisterInstruction};
use log::{error, warn};
use smallvec::SmallVec;
use std::fmt;

//=============================================================================
// Spill advisories

/// A register whose load or store cost is above the memory spill cost.  Such
/// a scenario is still valid, but a solver will find spilling cheaper than
/// using that register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpillAdvisory {
  pub register: usize,
  pub register_cost: RegisterCost,
  pub spill_cost: RegisterCost,
}

impl SpillAdvisory {
  pub fn check(
    spill_cost: RegisterCost, register: usize, register_cost: RegisterCost,
  ) -> Option<SpillAdvisory> {
    if register_cost.exceeds(&spill_cost) {
      Some(SpillAdvisory { register, register_cost, spill_cost })
    } else {
      None
    }
  }
}

impl fmt::Display for SpillAdvisory {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "cost of spilling to memory is not set higher than using register {}; \
       solving this scenario without changing either cost will yield \
       unexpected results (memory spill cost: {}; register {} cost: {})",
      self.register, self.spill_cost, self.register, self.register_cost
    )
  }
}

pub type Advisories = SmallVec<[SpillAdvisory; 4]>;

//=============================================================================
// Scenario

/// Owns the cost array and the instruction list of one scenario.
#[derive(Debug)]
pub struct Scenario {
  costs: CostArray,
  insts: InstructionList,
  spill_cost: RegisterCost,
}

impl Scenario {
  /// A scenario with `register_count` registers at the default cost and no
  /// instructions.  Panics if `spill_cost` is not positive.
  pub fn new(
    register_count: usize, spill_cost: RegisterCost,
  ) -> Result<Scenario, BufferError> {
    assert_valid_cost("memory spill", spill_cost);
    let costs = CostArray::new(register_count).map_err(|err| {
      error!("could not create register cost array for scenario: {}", err);
      err
    })?;
    Ok(Scenario { costs, insts: InstructionList::new(), spill_cost })
  }

  // --------------
  // Spill cost
  // --------------

  pub fn memory_spill_cost(&self) -> RegisterCost {
    self.spill_cost
  }

  /// Replace the spill cost.  Every register that costs more than the new
  /// spill cost in load or store is logged and returned as an advisory; the new cost is
  /// applied either way.
  pub fn set_memory_spill_cost(&mut self, spill_cost: RegisterCost) -> Advisories {
    assert_valid_cost("memory spill", spill_cost);
    let advisories = advisories_for(spill_cost, &self.costs);
    for advisory in &advisories {
      warn!("{}", advisory);
    }
    self.spill_cost = spill_cost;
    advisories
  }

  /// All current advisories.  Nothing is logged.
  pub fn advisories(&self) -> Advisories {
    advisories_for(self.spill_cost, &self.costs)
  }

  // --------------
  // Registers
  // --------------

  pub fn register_count(&self) -> usize {
    self.costs.len()
  }

  /// Change the number of registers.  On failure the count is unchanged.
  pub fn set_register_count(&mut self, count: usize) -> Result<(), BufferError> {
    self.costs.resize(count).map_err(|err| {
      error!("could not change scenario register count to {}: {}", count, err);
      err
    })
  }

  pub fn register_cost(&self, index: usize) -> RegisterCost {
    self.costs.get(index)
  }

  pub fn try_register_cost(&self, index: usize) -> Option<RegisterCost> {
    self.costs.try_get(index)
  }

  /// Set one register's cost, returning (and logging) the advisory if it
  /// costs more than spilling in load or store.
  pub fn set_register_cost(
    &mut self, index: usize, cost: RegisterCost,
  ) -> Option<SpillAdvisory> {
    assert_valid_cost("register", cost);
    self.costs.set(index, cost);
    let advisory = SpillAdvisory::check(self.spill_cost, index, cost);
    if let Some(advisory) = &advisory {
      warn!("{}", advisory);
    }
    advisory
  }

  pub fn register_costs(&self) -> &CostArray {
    &self.costs
  }

  // --------------
  // Instructions
  // --------------

  pub fn instructions(&self) -> &InstructionList {
    &self.insts
  }

  pub fn instruction_count(&self) -> usize {
    self.insts.len()
  }

  pub fn instruction(&self, index: usize) -> RegisterInstruction {
    self.insts.get(index)
  }

  pub fn try_instruction(&self, index: usize) -> Option<RegisterInstruction> {
    self.insts.try_get(index)
  }

  pub fn append_instruction(
    &mut self, inst: RegisterInstruction,
  ) -> Result<(), BufferError> {
    self.insts.append(inst)
  }

  pub fn insert_instruction(
    &mut self, index: usize, inst: RegisterInstruction,
  ) -> Result<(), BufferError> {
    self.insts.insert_at(index, inst)
  }

  pub fn remove_instruction_behind(&mut self) -> Option<RegisterInstruction> {
    self.insts.remove_behind()
  }

  pub fn remove_instruction_at(&mut self, index: usize) -> RegisterInstruction {
    self.insts.remove_at(index)
  }
}

fn advisories_for(spill_cost: RegisterCost, costs: &CostArray) -> Advisories {
  costs
    .iter()
    .enumerate()
    .filter_map(|(register, &cost)| SpillAdvisory::check(spill_cost, register, cost))
    .collect()
}

impl fmt::Display for Scenario {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(
      f,
      "scenario: {} registers, memory spill cost {}",
      self.register_count(),
      self.spill_cost
    )?;
    for (ix, cost) in self.costs.iter().enumerate() {
      writeln!(f, "  r{:<4} {}", ix, cost)?;
    }
    writeln!(f, "instructions: {}", self.insts.len())?;
    for (ix, inst) in self.insts.iter().enumerate() {
      writeln!(f, "  i{:<4} {}", ix, inst)?;
    }
    Ok(())
  }
}
