//! A one-screen summary of a scenario for the `stats` command.

use std::fmt;

use mlra::{Advisories, InstKind, Scenario};
use rustc_hash::FxHashSet;

pub struct Summary {
  pub registers: usize,
  pub instructions: usize,
  pub loads: usize,
  pub stores: usize,
  /// Number of distinct virtual registers the instructions mention.
  pub vregs: usize,
  pub advisories: Advisories,
}

pub fn summarize(scenario: &Scenario) -> Summary {
  let mut vregs = FxHashSet::default();
  let mut loads = 0;
  let mut stores = 0;
  for inst in scenario.instructions().iter() {
    match inst.kind {
      InstKind::Load => loads += 1,
      InstKind::Store => stores += 1,
    }
    vregs.insert(inst.vreg);
  }
  Summary {
    registers: scenario.register_count(),
    instructions: scenario.instruction_count(),
    loads,
    stores,
    vregs: vregs.len(),
    advisories: scenario.advisories(),
  }
}

impl fmt::Display for Summary {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(f, "registers:     {}", self.registers)?;
    writeln!(
      f,
      "instructions:  {} ({} loads, {} stores)",
      self.instructions, self.loads, self.stores
    )?;
    writeln!(f, "virtual regs:  {}", self.vregs)?;
    if self.advisories.is_empty() {
      writeln!(f, "advisories:    none")?;
    } else {
      writeln!(f, "advisories:    {}", self.advisories.len())?;
      for advisory in &self.advisories {
        writeln!(f, "  {}", advisory)?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use mlra::{RegisterCost, RegisterInstruction};

  #[test]
  fn counts() {
    let mut s = Scenario::new(2, RegisterCost::new(3, 3)).unwrap();
    for inst in &[
      RegisterInstruction::load(1),
      RegisterInstruction::load(2),
      RegisterInstruction::store(1),
    ] {
      s.append_instruction(*inst).unwrap();
    }
    s.set_register_cost(0, RegisterCost::new(3, 3));
    s.set_register_cost(1, RegisterCost::new(4, 1));

    let summary = summarize(&s);
    assert_eq!(summary.registers, 2);
    assert_eq!(summary.instructions, 3);
    assert_eq!(summary.loads, 2);
    assert_eq!(summary.stores, 1);
    assert_eq!(summary.vregs, 2);
    assert_eq!(summary.advisories.len(), 1);
    assert_eq!(summary.advisories[0].register, 1);

    let text = summary.to_string();
    assert!(text.contains("instructions:  3 (2 loads, 1 stores)"));
    assert!(text.contains("advisories:    1"));
  }

  #[test]
  fn empty() {
    let s = Scenario::new(0, RegisterCost::new(1, 1)).unwrap();
    let text = summarize(&s).to_string();
    assert!(text.contains("virtual regs:  0"));
    assert!(text.contains("advisories:    none"));
  }
}
