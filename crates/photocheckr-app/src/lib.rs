//! PhotoCheckr Application
//!
//! Command-line shell over the core session model: builds comparisons,
//! keeps them in the project store and exports them.

mod app;
mod commands;
mod config;

pub use app::{App, AppError};
pub use commands::{AddArgs, Command, CommandHelp, CommandRegistry, parse_args};
pub use config::AppConfig;
