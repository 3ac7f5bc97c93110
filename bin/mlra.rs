/* -*- Mode: Rust; tab-width: 8; indent-tabs-mode: nil; rust-indent-offset: 2 -*-
 * vim: set ts=8 sts=2 et sw=2 tw=80:
*/

use std::io;
use std::path::Path;
use std::process;

use clap;
use log::{error, info};
use mlra::{RegisterCost, Scenario};
use mlra_util::parser::parse_file;
use mlra_util::presets::find_preset;
use mlra_util::shell::Shell;
use pretty_env_logger;

const APP_NAME: &str = "Minimum Local Register Allocation Visualizer";

//=============================================================================
// Top level

fn main() {
  pretty_env_logger::init();

  let app = clap::Command::new("mlra")
    .about(APP_NAME)
    .long_about(
      "Edit a minimum local register allocation scenario: per-register \
       load/store costs, the memory spill cost and a sequence of load/store \
       instructions.  Commands are read from stdin or a script; type 'help' \
       for the list.",
    )
    .arg(
      clap::Arg::new("registers")
        .short('r')
        .long("registers")
        .takes_value(true)
        .default_value("4")
        .help("number of registers in the initial scenario"),
    )
    .arg(
      clap::Arg::new("spill-load")
        .short('l')
        .long("spill-load")
        .takes_value(true)
        .default_value("5")
        .help("memory spill load cost"),
    )
    .arg(
      clap::Arg::new("spill-store")
        .short('s')
        .long("spill-store")
        .takes_value(true)
        .default_value("5")
        .help("memory spill store cost"),
    )
    .arg(
      clap::Arg::new("preset")
        .short('p')
        .long("preset")
        .takes_value(true)
        .help("start from a named preset scenario (overrides the other scenario options)"),
    )
    .arg(
      clap::Arg::new("script")
        .short('f')
        .long("script")
        .takes_value(true)
        .help("run commands from this file instead of stdin; the whole file is parsed first"),
    )
    .arg(
      clap::Arg::new("quiet")
        .short('q')
        .long("quiet")
        .help("no prompt, and do not print the scenario after each change"),
    );
  let matches = app.get_matches();

  let scenario = match matches.value_of("preset") {
    Some(name) => match find_preset(name) {
      Ok(scenario) => scenario,
      Err(err) => {
        error!("can't use preset '{}'", name);
        println!("{}", err);
        process::exit(1);
      }
    },
    None => {
      let (count, load, store) = match (
        matches.value_of("registers").unwrap_or("4").parse::<usize>(),
        matches.value_of("spill-load").unwrap_or("5").parse::<i32>(),
        matches.value_of("spill-store").unwrap_or("5").parse::<i32>(),
      ) {
        (Ok(count), Ok(load), Ok(store)) if load > 0 && store > 0 => {
          (count, load, store)
        }
        _other => {
          println!("invalid register count or spill cost values");
          process::exit(2);
        }
      };
      match Scenario::new(count, RegisterCost::new(load, store)) {
        Ok(scenario) => scenario,
        Err(err) => {
          println!("could not create a scenario with {} registers: {}", count, err);
          process::exit(1);
        }
      }
    }
  };

  let quiet = matches.is_present("quiet");
  info!("{}: {} registers", APP_NAME, scenario.register_count());
  let mut shell = Shell::new(scenario, !quiet);

  let stdout = io::stdout();
  let mut out = stdout.lock();
  let result = match matches.value_of("script") {
    Some(path) => match parse_file(Path::new(path)) {
      Ok(commands) => {
        info!("running {} commands from '{}'", commands.len(), path);
        shell.run_commands(&commands, &mut out)
      }
      Err(err) => {
        error!("can't run script '{}'", path);
        println!("{}", err);
        process::exit(1);
      }
    },
    None => {
      let stdin = io::stdin();
      let input = stdin.lock();
      shell.run(input, &mut out, !quiet)
    }
  };

  if let Err(err) = result {
    error!("shell stopped: {}", err);
    process::exit(1);
  }
}
