#![warn(clippy::all, rust_2018_idioms)]

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use universal_machine::emulator::{disassemble, loader, StdPort};
use universal_machine::{Emulator, MachineConfig, MachineState};

fn main() -> ExitCode {
    // stdout carries the machine's raw output, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        let name = args.first().map(String::as_str).unwrap_or("um");
        eprintln!("usage: {name} <program.um>");
        return ExitCode::FAILURE;
    }

    let config = match MachineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("um: {e}");
            return ExitCode::FAILURE;
        }
    };

    let program = match loader::read_program(&args[1]) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("um: {e}");
            return ExitCode::FAILURE;
        }
    };

    if tracing::enabled!(tracing::Level::DEBUG) {
        for line in disassemble(&program) {
            tracing::debug!("{line}");
        }
    }

    let mut emulator = Emulator::new(program, StdPort::new(config.flush_each_output));
    match emulator.run(config.max_steps) {
        Ok(MachineState::Halted) => ExitCode::SUCCESS,
        Ok(_) => {
            eprintln!(
                "um: step limit of {} reached without halting",
                emulator.steps()
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("um: {e}");
            ExitCode::FAILURE
        }
    }
}
