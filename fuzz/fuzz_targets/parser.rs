#![no_main]
use libfuzzer_sys::fuzz_target;

use mlra_util::parser::{parse_line, Command};

fuzz_target!(|command: Command| {
  let printed = command.to_string();
  let parsed = parse_line(1, &printed).expect("parser error").expect("empty line");
  assert_eq!(parsed, command);

  let reprinted = parsed.to_string();
  assert_eq!(printed, reprinted);
});
