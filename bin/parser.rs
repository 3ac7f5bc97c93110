//! Parses shell commands.
//!
//! The grammar is one command per line, words separated by whitespace, with
//! `#` starting a comment:
//!
//!   show | stats | help | quit
//!   regs <count>
//!   cost <register> <load> <store>
//!   spill <load> <store>
//!   append (load|store) <vreg>
//!   insert <index> (load|store) <vreg>
//!   pop
//!   remove <index>
//!
//! Costs must be positive integers.  Range checks against the current
//! scenario are left to the shell.

use std::fmt;
use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::path::Path;
use std::str::SplitWhitespace;

use mlra::{InstKind, RegisterCost, RegisterInstruction};

#[derive(Debug)]
pub enum ParseError {
  IoError(io::Error),
  Parse { line: usize, msg: String },
}

impl From<io::Error> for ParseError {
  fn from(err: io::Error) -> ParseError {
    ParseError::IoError(err)
  }
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      ParseError::IoError(err) => write!(f, "i/o error: {}", err),
      ParseError::Parse { line, msg } => write!(f, "line {}: {}", line, msg),
    }
  }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
  Show,
  Stats,
  Help,
  Quit,
  Registers { count: usize },
  Cost { register: usize, cost: RegisterCost },
  Spill { cost: RegisterCost },
  Append { inst: RegisterInstruction },
  Insert { index: usize, inst: RegisterInstruction },
  Pop,
  Remove { index: usize },
}

impl Command {
  /// Does running this command change the scenario?
  pub fn mutates(&self) -> bool {
    match self {
      Command::Show | Command::Stats | Command::Help | Command::Quit => false,
      _ => true,
    }
  }
}

/// Renders in the syntax `parse_line` accepts.
impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Command::Show => write!(f, "show"),
      Command::Stats => write!(f, "stats"),
      Command::Help => write!(f, "help"),
      Command::Quit => write!(f, "quit"),
      Command::Registers { count } => write!(f, "regs {}", count),
      Command::Cost { register, cost } => {
        write!(f, "cost {} {} {}", register, cost.load, cost.store)
      }
      Command::Spill { cost } => write!(f, "spill {} {}", cost.load, cost.store),
      Command::Append { inst } => write!(f, "append {} {}", inst.kind, inst.vreg),
      Command::Insert { index, inst } => {
        write!(f, "insert {} {} {}", index, inst.kind, inst.vreg)
      }
      Command::Pop => write!(f, "pop"),
      Command::Remove { index } => write!(f, "remove {}", index),
    }
  }
}

/// Parse one line.  Blank and comment-only lines give `None`.
pub fn parse_line(line: usize, source: &str) -> ParseResult<Option<Command>> {
  let source = match source.find('#') {
    Some(start) => &source[..start],
    None => source,
  };
  Parser::new(line, source).command()
}

pub fn parse_content(content: &str) -> ParseResult<Vec<Command>> {
  let mut commands = Vec::new();
  for (ix, source) in content.lines().enumerate() {
    if let Some(command) = parse_line(ix + 1, source)? {
      commands.push(command);
    }
  }
  Ok(commands)
}

pub fn parse_file(path: &Path) -> ParseResult<Vec<Command>> {
  let mut file = File::open(path)?;
  let mut content = String::new();
  file.read_to_string(&mut content)?;
  parse_content(&content)
}

struct Parser<'str> {
  line: usize,
  words: SplitWhitespace<'str>,
}

impl<'str> Parser<'str> {
  fn new(line: usize, source: &'str str) -> Self {
    Self { line, words: source.split_whitespace() }
  }

  fn error<T>(&self, msg: impl Into<String>) -> ParseResult<T> {
    Err(ParseError::Parse { line: self.line, msg: msg.into() })
  }

  fn word(&mut self, what: &str) -> ParseResult<&'str str> {
    match self.words.next() {
      Some(word) => Ok(word),
      None => self.error(format!("missing {}", what)),
    }
  }

  fn index(&mut self, what: &str) -> ParseResult<usize> {
    let word = self.word(what)?;
    match word.parse::<usize>() {
      Ok(n) => Ok(n),
      Err(_) => self.error(format!("invalid {} '{}'", what, word)),
    }
  }

  fn cost_component(&mut self, what: &str) -> ParseResult<i32> {
    let word = self.word(what)?;
    match word.parse::<i32>() {
      Ok(n) if n > 0 => Ok(n),
      Ok(_) => self.error(format!("{} must be positive, got {}", what, word)),
      Err(_) => self.error(format!("invalid {} '{}'", what, word)),
    }
  }

  fn cost(&mut self) -> ParseResult<RegisterCost> {
    let load = self.cost_component("load cost")?;
    let store = self.cost_component("store cost")?;
    Ok(RegisterCost::new(load, store))
  }

  fn inst(&mut self) -> ParseResult<RegisterInstruction> {
    let kind = match self.word("instruction kind")? {
      "load" => InstKind::Load,
      "store" => InstKind::Store,
      other => {
        return self
          .error(format!("expected 'load' or 'store', got '{}'", other))
      }
    };
    let word = self.word("virtual register")?;
    let vreg = match word.strip_prefix('v').unwrap_or(word).parse::<i32>() {
      Ok(vreg) => vreg,
      Err(_) => return self.error(format!("invalid virtual register '{}'", word)),
    };
    Ok(RegisterInstruction::new(kind, vreg))
  }

  fn command(&mut self) -> ParseResult<Option<Command>> {
    let name = match self.words.next() {
      Some(name) => name,
      None => return Ok(None),
    };
    let command = match name {
      "show" => Command::Show,
      "stats" => Command::Stats,
      "help" => Command::Help,
      "quit" | "exit" => Command::Quit,
      "regs" => Command::Registers { count: self.index("register count")? },
      "cost" => {
        let register = self.index("register index")?;
        Command::Cost { register, cost: self.cost()? }
      }
      "spill" => Command::Spill { cost: self.cost()? },
      "append" => Command::Append { inst: self.inst()? },
      "insert" => {
        let index = self.index("instruction index")?;
        Command::Insert { index, inst: self.inst()? }
      }
      "pop" => Command::Pop,
      "remove" => Command::Remove { index: self.index("instruction index")? },
      other => return self.error(format!("unknown command '{}'", other)),
    };
    if let Some(extra) = self.words.next() {
      return self.error(format!("unexpected '{}' after '{}'", extra, name));
    }
    Ok(Some(command))
  }
}
