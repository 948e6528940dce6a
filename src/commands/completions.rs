//! # Completions Command Implementation
//!
//! Prints a shell completion script for `command-materializer`, generated by
//! `clap_complete` from the same argument definitions the binary parses.
//!
//! ```bash
//! command-materializer completions bash > ~/.local/share/bash-completion/completions/command-materializer
//! command-materializer completions zsh --output ~/.zfunc/_command-materializer
//! ```

use anyhow::{Context, Result};
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::fs::File;
use std::io;
use std::path::PathBuf;

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    match args.output {
        Some(path) => {
            let mut file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            generate(args.shell, &mut cmd, bin_name, &mut file);
        }
        None => generate(args.shell, &mut cmd, bin_name, &mut io::stdout()),
    }
    Ok(())
}
