//! The interactive shell: reads commands, applies them to one live
//! scenario, and prints what changed.
//!
//! All user input is checked here before it reaches the library, so the
//! library's assertions only ever fire on a bug in this file.

use std::io;
use std::io::prelude::*;

use log::{debug, info};
use mlra::Scenario;

use crate::parser::{parse_line, Command};
use crate::summary::summarize;

pub const HELP: &str = "\
commands:
  show                          print the scenario
  stats                         print a summary and all advisories
  regs N                        set the number of registers
  cost REG LOAD STORE           set the cost of register REG
  spill LOAD STORE              set the memory spill cost
  append load|store VREG        add an instruction at the end
  insert IX load|store VREG     add an instruction before IX
  pop                           remove the last instruction
  remove IX                     remove instruction IX
  help                          print this text
  quit                          leave the shell
";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Quit,
}

pub struct Shell {
  scenario: Scenario,
  /// Print the scenario after every change.
  echo: bool,
}

impl Shell {
  pub fn new(scenario: Scenario, echo: bool) -> Self {
    Self { scenario, echo }
  }

  pub fn scenario(&self) -> &Scenario {
    &self.scenario
  }

  pub fn into_scenario(self) -> Scenario {
    self.scenario
  }

  /// Apply one command.  Rejected commands print an error and leave the
  /// scenario as it was.
  pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
    debug!("executing '{}'", command);
    let s = &mut self.scenario;
    match command {
      Command::Show => write!(out, "{}", s)?,
      Command::Stats => write!(out, "{}", summarize(s))?,
      Command::Help => write!(out, "{}", HELP)?,
      Command::Quit => return Ok(Flow::Quit),
      Command::Registers { count } => {
        if let Err(err) = s.set_register_count(count) {
          writeln!(out, "error: cannot have {} registers: {}", count, err)?;
          return Ok(Flow::Continue);
        }
      }
      Command::Cost { register, cost } => {
        if register >= s.register_count() {
          return reject(out, register, "register", s.register_count());
        }
        if let Some(advisory) = s.set_register_cost(register, cost) {
          writeln!(out, "warning: {}", advisory)?;
        }
      }
      Command::Spill { cost } => {
        for advisory in s.set_memory_spill_cost(cost) {
          writeln!(out, "warning: {}", advisory)?;
        }
      }
      Command::Append { inst } => {
        if let Err(err) = s.append_instruction(inst) {
          writeln!(out, "error: cannot append '{}': {}", inst, err)?;
          return Ok(Flow::Continue);
        }
      }
      Command::Insert { index, inst } => {
        if index > s.instruction_count() {
          return reject(out, index, "insertion point", s.instruction_count() + 1);
        }
        if let Err(err) = s.insert_instruction(index, inst) {
          writeln!(out, "error: cannot insert '{}': {}", inst, err)?;
          return Ok(Flow::Continue);
        }
      }
      Command::Pop => {
        if s.remove_instruction_behind().is_none() {
          writeln!(out, "nothing to remove")?;
          return Ok(Flow::Continue);
        }
      }
      Command::Remove { index } => {
        if index >= s.instruction_count() {
          return reject(out, index, "instruction", s.instruction_count());
        }
        s.remove_instruction_at(index);
      }
    }
    if self.echo && command.mutates() {
      write!(out, "{}", self.scenario)?;
    }
    Ok(Flow::Continue)
  }

  /// Read and execute commands until `quit` or end of input.  Parse errors
  /// are reported and skipped.
  pub fn run<R: BufRead, W: Write>(
    &mut self, mut input: R, out: &mut W, prompt: bool,
  ) -> io::Result<()> {
    let mut line_no = 0;
    loop {
      if prompt {
        write!(out, "mlra> ")?;
        out.flush()?;
      }
      let mut line = String::new();
      if input.read_line(&mut line)? == 0 {
        break;
      }
      line_no += 1;
      match parse_line(line_no, &line) {
        Ok(Some(command)) => {
          if self.execute(command, out)? == Flow::Quit {
            break;
          }
        }
        Ok(None) => {}
        Err(err) => writeln!(out, "error: {}", err)?,
      }
    }
    info!("shell finished after {} lines", line_no);
    Ok(())
  }

  /// Execute already parsed commands, stopping at `quit`.
  pub fn run_commands<W: Write>(
    &mut self, commands: &[Command], out: &mut W,
  ) -> io::Result<()> {
    for (ix, &command) in commands.iter().enumerate() {
      if self.execute(command, out)? == Flow::Quit {
        info!("script quit after {} of {} commands", ix + 1, commands.len());
        return Ok(());
      }
    }
    info!("script finished after {} commands", commands.len());
    Ok(())
  }
}

fn reject<W: Write>(
  out: &mut W, index: usize, what: &str, bound: usize,
) -> io::Result<Flow> {
  writeln!(out, "error: {} {} out of range (must be below {})", what, index, bound)?;
  Ok(Flow::Continue)
}

#[cfg(test)]
mod test {
  use super::*;
  use mlra::{RegisterCost, RegisterInstruction};

  fn shell() -> Shell {
    Shell::new(Scenario::new(2, RegisterCost::new(5, 5)).unwrap(), false)
  }

  fn run(shell: &mut Shell, script: &str) -> String {
    let mut out = Vec::new();
    shell.run(script.as_bytes(), &mut out, false).unwrap();
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn script_builds_scenario() {
    let mut sh = shell();
    let out = run(
      &mut sh,
      "regs 3\ncost 2 2 3\nappend load 1\nappend store 1\ninsert 1 load 4\nremove 0\n",
    );
    assert_eq!(out, "");
    let s = sh.scenario();
    assert_eq!(s.register_count(), 3);
    assert_eq!(s.register_cost(2), RegisterCost::new(2, 3));
    assert_eq!(
      s.instructions().as_slice(),
      &[RegisterInstruction::load(4), RegisterInstruction::store(1)]
    );
  }

  #[test]
  fn out_of_range_input_is_rejected() {
    let mut sh = shell();
    let out = run(&mut sh, "cost 2 1 1\nremove 0\ninsert 1 load 0\npop\n");
    assert_eq!(
      out,
      "error: register 2 out of range (must be below 2)\n\
       error: instruction 0 out of range (must be below 0)\n\
       error: insertion point 1 out of range (must be below 1)\n\
       nothing to remove\n"
    );
    assert_eq!(sh.scenario().instruction_count(), 0);
  }

  #[test]
  fn advisories_are_printed() {
    let mut sh = shell();
    let out = run(&mut sh, "cost 0 10 1\n");
    assert!(out.starts_with("warning: cost of spilling"));
    assert_eq!(sh.scenario().register_cost(0), RegisterCost::new(10, 1));

    // Register 1 still has the default cost, which equals the new spill cost.
    let out = run(&mut sh, "spill 1 1\n");
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("register 0"));
  }

  #[test]
  fn failed_resize_keeps_count() {
    let mut sh = shell();
    let command = Command::Registers { count: usize::MAX };
    let mut out = Vec::new();
    assert_eq!(sh.execute(command, &mut out).unwrap(), Flow::Continue);
    assert!(String::from_utf8(out).unwrap().starts_with("error: cannot have"));
    assert_eq!(sh.scenario().register_count(), 2);
  }

  #[test]
  fn parse_errors_do_not_stop_the_shell() {
    let mut sh = shell();
    let out = run(&mut sh, "frobnicate\nappend load 2\n");
    assert_eq!(out, "error: line 1: unknown command 'frobnicate'\n");
    assert_eq!(sh.scenario().instruction_count(), 1);
  }

  #[test]
  fn quit_stops_reading() {
    let mut sh = shell();
    run(&mut sh, "append load 1\nquit\nappend load 2\n");
    assert_eq!(sh.into_scenario().instruction_count(), 1);
  }

  #[test]
  fn parsed_commands_run_until_quit() {
    let mut sh = shell();
    let commands = crate::parser::parse_content(
      "append load 1\ncost 5 1 1\nquit\nappend load 2\n",
    )
    .unwrap();
    let mut out = Vec::new();
    sh.run_commands(&commands, &mut out).unwrap();
    assert_eq!(
      String::from_utf8(out).unwrap(),
      "error: register 5 out of range (must be below 2)\n"
    );
    assert_eq!(sh.scenario().instruction_count(), 1);
  }

  #[test]
  fn echo_and_prompt() {
    let mut sh = Shell::new(Scenario::new(1, RegisterCost::new(5, 5)).unwrap(), true);
    let mut out = Vec::new();
    sh.run("append store 3\nshow\n".as_bytes(), &mut out, true).unwrap();
    let out = String::from_utf8(out).unwrap();
    let rendered = sh.scenario().to_string();
    assert_eq!(out, format!("mlra> {}mlra> {}mlra> ", rendered, rendered));
  }
}
