//! Implements fuzzing primitives for the instruction list and the shell.

use arbitrary::{Arbitrary, Result, Unstructured};
use std::io;

use mlra::{
  grown_capacity, shrunk_capacity, InstKind, InstructionList, RegisterCost,
  RegisterInstruction, Scenario,
};

use crate::parser::Command;
use crate::shell::{Flow, Shell};

fn cost(u: &mut Unstructured) -> Result<RegisterCost> {
  Ok(RegisterCost::new(u.int_in_range(1..=64)?, u.int_in_range(1..=64)?))
}

fn inst(u: &mut Unstructured) -> Result<RegisterInstruction> {
  let kind = if bool::arbitrary(u)? { InstKind::Store } else { InstKind::Load };
  Ok(RegisterInstruction::new(kind, u.int_in_range(0..=31)?))
}

/// Indices are drawn small so they land in range often, but not always.
fn index(u: &mut Unstructured) -> Result<usize> {
  Ok(u8::arbitrary(u)? as usize)
}

impl<'a> Arbitrary<'a> for Command {
  fn arbitrary(u: &mut Unstructured<'a>) -> Result<Command> {
    const NUM_VARIANTS: u8 = 11;

    Ok(match u8::arbitrary(u)? % NUM_VARIANTS {
      0 => Command::Show,
      1 => Command::Stats,
      2 => Command::Help,
      3 => Command::Quit,
      4 => Command::Registers { count: u.int_in_range(0..=64)? },
      5 => Command::Cost { register: index(u)?, cost: cost(u)? },
      6 => Command::Spill { cost: cost(u)? },
      7 => Command::Append { inst: inst(u)? },
      8 => Command::Insert { index: index(u)?, inst: inst(u)? },
      9 => Command::Pop,
      _ => Command::Remove { index: index(u)? },
    })
  }
}

/// Run `commands` through a shell and check the scenario afterwards.
pub fn check_commands(commands: &[Command]) -> Scenario {
  let scenario = match Scenario::new(4, RegisterCost::new(5, 5)) {
    Ok(scenario) => scenario,
    Err(err) => panic!("could not create the initial scenario: {}", err),
  };
  let mut shell = Shell::new(scenario, false);
  let mut sink = io::sink();
  for &command in commands {
    match shell.execute(command, &mut sink) {
      Ok(Flow::Continue) => {}
      Ok(Flow::Quit) => break,
      Err(err) => panic!("writing to a sink failed: {}", err),
    }
    let s = shell.scenario();
    assert_eq!(s.register_count(), s.register_costs().len());
    assert!(s.memory_spill_cost().is_valid());
    assert!(s.register_costs().iter().all(|c| c.is_valid()));
    let list = s.instructions();
    assert!(list.len() <= list.capacity());
  }
  shell.into_scenario()
}

//=============================================================================
// Instruction list operations, checked against a Vec.

#[derive(Arbitrary, Clone, Copy, Debug)]
pub enum ListOp {
  Append { store: bool, vreg: i32 },
  Insert { index: u16, store: bool, vreg: i32 },
  RemoveBehind,
  RemoveAt { index: u16 },
}

fn make_inst(store: bool, vreg: i32) -> RegisterInstruction {
  if store {
    RegisterInstruction::store(vreg)
  } else {
    RegisterInstruction::load(vreg)
  }
}

/// Apply `ops` to an `InstructionList` and to a plain `Vec`, checking after
/// every step that they agree and that the capacity policy held.
pub fn check_list_ops(ops: &[ListOp]) -> InstructionList {
  let mut list = InstructionList::new();
  let mut model: Vec<RegisterInstruction> = Vec::new();

  for &op in ops {
    let before = list.capacity();
    match op {
      ListOp::Append { store, vreg } => {
        let inst = make_inst(store, vreg);
        list.append(inst).expect("small lists always grow");
        model.push(inst);
        if model.len() - 1 == before {
          assert_eq!(
            Ok(list.capacity()),
            grown_capacity::<RegisterInstruction>(before)
          );
        } else {
          assert_eq!(list.capacity(), before);
        }
      }
      ListOp::Insert { index, store, vreg } => {
        let index = index as usize % (model.len() + 1);
        let inst = make_inst(store, vreg);
        list.insert_at(index, inst).expect("small lists always grow");
        model.insert(index, inst);
      }
      ListOp::RemoveBehind => {
        assert_eq!(list.remove_behind(), model.pop());
      }
      ListOp::RemoveAt { index } => {
        if model.is_empty() {
          continue;
        }
        let index = index as usize % model.len();
        assert_eq!(list.remove_at(index), model.remove(index));
      }
    }

    assert_eq!(list.as_slice(), &model[..]);
    assert!(list.len() <= list.capacity());
    if let ListOp::RemoveBehind | ListOp::RemoveAt { .. } = op {
      // Nothing left for the shrink policy to do.
      assert_eq!(shrunk_capacity(list.len(), list.capacity()), None);
    }
  }
  list
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn list_ops_against_model() {
    let mut ops = vec![];
    for v in 0..40 {
      ops.push(ListOp::Append { store: v % 3 == 0, vreg: v });
      if v % 5 == 0 {
        ops.push(ListOp::Insert { index: (v * 7) as u16, store: true, vreg: -v });
      }
    }
    // 40 appends and 8 inserts.
    for i in 0..48u16 {
      ops.push(if i % 2 == 0 {
        ListOp::RemoveBehind
      } else {
        ListOp::RemoveAt { index: i * 3 }
      });
    }
    let list = check_list_ops(&ops);
    assert!(list.is_empty());
    assert_eq!(list.capacity(), 0);
  }

  #[test]
  fn commands_from_bytes() {
    let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let mut u = Unstructured::new(&bytes);
    let mut commands = vec![];
    while let Ok(command) = Command::arbitrary(&mut u) {
      if u.is_empty() {
        break;
      }
      if command != Command::Quit {
        commands.push(command);
      }
    }
    assert!(!commands.is_empty());
    check_commands(&commands);
  }
}
