//! Main application entry point.

use photocheckr_app::{App, AppError, Command, CommandRegistry, parse_args};
use std::process::ExitCode;

fn run() -> Result<String, AppError> {
    let (config, command) = parse_args(std::env::args_os().skip(1).collect())?;
    if command == Command::Help {
        return Ok(CommandRegistry::usage());
    }
    App::new(config)?.run(command)
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            ExitCode::SUCCESS
        }
        Err(e @ (AppError::Usage(_) | AppError::Args(_))) => {
            eprintln!("Error: {}", e);
            eprintln!("Run `photocheckr help` for usage.");
            ExitCode::from(2)
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
