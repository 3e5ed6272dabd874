//! CLI module for userbase
//!
//! Provides command-line interface for:
//! - serve: Connect, migrate and run the HTTP API
//! - migrate: Apply pending schema migrations
//! - rollback: Revert migrations down to a target version
//! - add-profile: Attach a profile to an existing user

mod args;
mod commands;
pub mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{add_profile, migrate, rollback, run, run_command, serve};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
