//! CLI argument parsing and command dispatch

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::commands;

/// Command Materializer - Resolve stored execution commands for dispatch
#[derive(Parser, Debug)]
#[command(name = "command-materializer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve stored commands against an inventory and print them
    Materialize(commands::materialize::MaterializeArgs),

    /// Print the agent command type of a stored command without resolving it
    CommandType(commands::command_type::CommandTypeArgs),

    /// Validate an inventory file
    Check(commands::check::CheckArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level)?;

        match self.command {
            Commands::Materialize(args) => commands::materialize::execute(args, &self.color),
            Commands::CommandType(args) => commands::command_type::execute(args),
            Commands::Check(args) => commands::check::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Log to stderr at `level` unless `RUST_LOG` says otherwise.
fn init_logging(level: &str) -> Result<()> {
    let env = env_logger::Env::default().default_filter_or(level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init()
        .context("Failed to initialise logging")
}
