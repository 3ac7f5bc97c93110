/* -*- Mode: Rust; tab-width: 8; indent-tabs-mode: nil; rust-indent-offset: 2 -*-
 * vim: set ts=8 sts=2 et sw=2 tw=80:
*/

//! Main file / top-level module for the mlra library: the in-memory data
//! layer behind a minimum local register allocation scenario editor.
//!
//! The library is single-threaded and synchronous.  A `Scenario` exclusively
//! owns its `CostArray` and `InstructionList`; dropping it releases both.
//! Precondition violations (bad indices, non-positive costs) panic, while
//! running out of room is reported through `BufferError` and leaves the
//! container untouched.

mod buffer;
mod cost;
mod inst;
mod scenario;

pub use crate::buffer::{byte_size, max_slots, BufferError, MAX_ALLOC_BYTES};
pub use crate::cost::{CostArray, RegisterCost};
pub use crate::inst::{
  grown_capacity, shrunk_capacity, InstKind, InstructionList,
  RegisterInstruction, INITIAL_CAPACITY,
};
pub use crate::scenario::{Advisories, Scenario, SpillAdvisory};
