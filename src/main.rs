//! # Command Materializer CLI
//!
//! Binary entry point for the `command-materializer` tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and dispatching to the selected subcommand.
//! - Turning library errors into readable top-level failures.
//!
//! All resolution logic lives in the library crate; the binary only wires an
//! inventory file to it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
