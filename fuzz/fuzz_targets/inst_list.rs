#![no_main]
use libfuzzer_sys::fuzz_target;

use mlra_util::fuzzing::{check_list_ops, ListOp};

fuzz_target!(|ops: Vec<ListOp>| {
  check_list_ops(&ops);
});
