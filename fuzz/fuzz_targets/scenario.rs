#![no_main]
use libfuzzer_sys::fuzz_target;

use mlra_util::fuzzing::check_commands;
use mlra_util::parser::Command;

fuzz_target!(|commands: Vec<Command>| {
  let scenario = check_commands(&commands);
  // Rendering touches every register and instruction.
  let _ = scenario.to_string();
});
