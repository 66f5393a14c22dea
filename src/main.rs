use clap::Parser;
use husk::error::ShellError;
use husk::flags::Flags;
use husk::shell::Shell;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(flags: &Flags) -> Result<(), ShellError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(flags.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init()
        .map_err(|e| ShellError::Logging(e.to_string()))
}

fn run(flags: Flags) -> Result<i32, ShellError> {
    let command = flags.command.clone();
    let mut shell = Shell::new(flags)?;
    match command {
        Some(line) => Ok(shell.run_command(&line)),
        None => shell.run(),
    }
}

fn main() -> ExitCode {
    let flags = Flags::parse();
    if let Err(e) = init_tracing(&flags) {
        eprintln!("husk: {}", e);
    }

    match run(flags) {
        Ok(code) => ExitCode::from(u8::try_from(code & 0xff).unwrap_or(1)),
        Err(e) => {
            eprintln!("husk: {}", e);
            ExitCode::FAILURE
        }
    }
}
