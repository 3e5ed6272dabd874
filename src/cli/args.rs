//! CLI argument definitions using clap
//!
//! Commands:
//! - userbase serve --config <path> [--port <n>]
//! - userbase migrate --config <path>
//! - userbase rollback --config <path> [--target <version>]
//! - userbase add-profile --config <path> --user-id <id> [--bio <text>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// userbase - users and profiles over HTTP
#[derive(Parser, Debug)]
#[command(name = "userbase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./userbase.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Apply pending schema migrations
    Migrate {
        /// Path to configuration file
        #[arg(long, default_value = "./userbase.json")]
        config: PathBuf,
    },

    /// Revert schema migrations
    Rollback {
        /// Path to configuration file
        #[arg(long, default_value = "./userbase.json")]
        config: PathBuf,

        /// Keep migrations up to and including this version (0 reverts all)
        #[arg(long, default_value_t = 0)]
        target: i64,
    },

    /// Attach a profile to an existing user
    AddProfile {
        /// Path to configuration file
        #[arg(long, default_value = "./userbase.json")]
        config: PathBuf,

        /// Owning user id
        #[arg(long)]
        user_id: i64,

        /// Profile text
        #[arg(long)]
        bio: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
