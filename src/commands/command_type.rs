//! # Command Type Command Implementation
//!
//! Prints the agent command type of a stored command. Only the type field is
//! read, so this works without an inventory and on commands whose cluster is
//! gone.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use command_materializer::wrapper::ExecutionCommandWrapper;

/// Print the agent command type of a stored command
#[derive(Args, Debug)]
pub struct CommandTypeArgs {
    /// Stored command (JSON)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Execute the `command-type` command.
pub fn execute(args: CommandTypeArgs) -> Result<()> {
    let json = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let command_type = ExecutionCommandWrapper::from_json(json)
        .command_type()
        .with_context(|| format!("Failed to read the command type of {}", args.file.display()))?;

    println!("{}", command_type);
    Ok(())
}
