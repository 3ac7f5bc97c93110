//! Named starting scenarios for the shell.

use std::fmt;

use mlra::{BufferError, RegisterCost, RegisterInstruction, Scenario};

#[derive(Debug)]
pub enum PresetError {
  /// No preset has the requested name.
  Unknown { available: Vec<&'static str> },
  Build(BufferError),
}

impl From<BufferError> for PresetError {
  fn from(err: BufferError) -> PresetError {
    PresetError::Build(err)
  }
}

impl fmt::Display for PresetError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      PresetError::Unknown { available } => {
        write!(f, "unknown preset; available presets are: {}", available.join(", "))
      }
      PresetError::Build(err) => write!(f, "could not build preset: {}", err),
    }
  }
}

type Builder = fn() -> Result<Scenario, BufferError>;

// This is the list of available presets.
const PRESETS: &[(&str, Builder)] = &[
  ("empty", preset_empty),
  ("balanced", preset_balanced),
  ("cheap-spill", preset_cheap_spill),
  ("streaming", preset_streaming),
];

pub fn preset_names() -> Vec<&'static str> {
  PRESETS.iter().map(|&(name, _)| name).collect()
}

/// Build the preset called `name`.
pub fn find_preset(name: &str) -> Result<Scenario, PresetError> {
  match PRESETS.iter().find(|&&(cand, _)| cand == name) {
    Some(&(_, builder)) => Ok(builder()?),
    None => Err(PresetError::Unknown { available: preset_names() }),
  }
}

fn build(
  spill: RegisterCost, costs: &[RegisterCost], insts: &[RegisterInstruction],
) -> Result<Scenario, BufferError> {
  let mut scenario = Scenario::new(costs.len(), spill)?;
  for (ix, &cost) in costs.iter().enumerate() {
    scenario.set_register_cost(ix, cost);
  }
  for &inst in insts {
    scenario.append_instruction(inst)?;
  }
  Ok(scenario)
}

fn preset_empty() -> Result<Scenario, BufferError> {
  Scenario::new(4, RegisterCost::new(5, 5))
}

// Mixed costs, a few short-lived values.
fn preset_balanced() -> Result<Scenario, BufferError> {
  use mlra::RegisterInstruction as I;
  build(
    RegisterCost::new(5, 5),
    &[
      RegisterCost::new(1, 1),
      RegisterCost::new(1, 2),
      RegisterCost::new(2, 1),
      RegisterCost::new(2, 2),
    ],
    &[I::load(0), I::load(1), I::store(0), I::load(2), I::store(1), I::store(2)],
  )
}

// Every register costs more than spilling in load or store, so every register
// is flagged.
fn preset_cheap_spill() -> Result<Scenario, BufferError> {
  use mlra::RegisterInstruction as I;
  build(
    RegisterCost::new(2, 2),
    &[RegisterCost::new(3, 3), RegisterCost::new(4, 2), RegisterCost::new(6, 6)],
    &[I::load(0), I::load(1), I::store(1), I::store(0)],
  )
}

// Many values, few registers.
fn preset_streaming() -> Result<Scenario, BufferError> {
  let insts: Vec<RegisterInstruction> = (0..6)
    .flat_map(|v| vec![RegisterInstruction::load(v), RegisterInstruction::store(v)])
    .collect();
  build(
    RegisterCost::new(8, 8),
    &[RegisterCost::new(1, 1), RegisterCost::new(2, 2)],
    &insts,
  )
}
