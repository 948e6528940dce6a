//! # Materialize Command Implementation
//!
//! Resolves stored execution commands against an inventory and prints the
//! dispatch-ready JSON, one document per input, in input order.
//!
//! Inputs are resolved in parallel. Each worker owns the wrapper for its
//! input and all workers share one resolver. A failing input does not stop
//! the others; the command exits non-zero once every input has been tried.

use anyhow::{bail, Context, Result};
use clap::Args;
use rayon::prelude::*;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use command_materializer::inventory::Inventory;
use command_materializer::output::{label, OutputConfig, Status};
use command_materializer::wrapper::{CommandResolver, ExecutionCommandWrapper};

/// Resolve stored commands and print them
#[derive(Args, Debug)]
pub struct MaterializeArgs {
    /// Inventory describing tasks, clusters and stacks
    #[arg(short, long, value_name = "FILE", env = "COMMAND_MATERIALIZER_INVENTORY")]
    pub inventory: PathBuf,

    /// Pretty-print the materialized JSON
    #[arg(long)]
    pub pretty: bool,

    /// Command files or glob patterns; `-` reads one command from stdin
    #[arg(value_name = "COMMAND", required = true)]
    pub commands: Vec<String>,
}

/// Where a stored command came from.
#[derive(Debug)]
enum Source {
    Stdin(String),
    File(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin(_) => f.write_str("<stdin>"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Source {
    fn read(&self) -> Result<String> {
        match self {
            Source::Stdin(content) => Ok(content.clone()),
            Source::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}

/// Execute the `materialize` command.
pub fn execute(args: MaterializeArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let inventory = Inventory::from_file(&args.inventory)
        .with_context(|| format!("Failed to load inventory {}", args.inventory.display()))?;
    let resolver = inventory.into_resolver();

    let sources = expand_sources(&args.commands)?;
    let total = sources.len();

    let results: Vec<(Source, Result<String>)> = sources
        .into_par_iter()
        .map(|source| {
            let result = materialize(&source, &resolver, args.pretty);
            (source, result)
        })
        .collect();

    let mut failures = 0;
    for (source, result) in results {
        match result {
            Ok(json) => {
                println!("{}", json);
                eprintln!("{} {}", label(&out, Status::Ok), source);
            }
            Err(e) => {
                failures += 1;
                eprintln!("{} {}: {:#}", label(&out, Status::Err), source, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} commands could not be materialized", failures, total);
    }
    Ok(())
}

fn materialize(source: &Source, resolver: &CommandResolver, pretty: bool) -> Result<String> {
    let mut wrapper = ExecutionCommandWrapper::from_json(source.read()?);

    if pretty {
        let command = wrapper.execution_command(resolver)?;
        return Ok(serde_json::to_string_pretty(command)?);
    }

    wrapper.execution_command(resolver)?;
    Ok(wrapper.json()?.to_string())
}

fn expand_sources(patterns: &[String]) -> Result<Vec<Source>> {
    let mut sources = Vec::new();

    if patterns.iter().filter(|pattern| *pattern == "-").count() > 1 {
        bail!("`-` may be given only once; stdin holds a single command");
    }

    for pattern in patterns {
        if pattern == "-" {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read command from stdin")?;
            sources.push(Source::Stdin(content));
            continue;
        }

        if !pattern.contains(['*', '?', '[']) {
            sources.push(Source::File(PathBuf::from(pattern)));
            continue;
        }

        let mut matched = Vec::new();
        for entry in glob::glob(pattern).with_context(|| format!("Invalid pattern {}", pattern))? {
            matched.push(entry.with_context(|| format!("Failed to expand {}", pattern))?);
        }
        if matched.is_empty() {
            bail!("No command files match {}", pattern);
        }
        matched.sort();
        sources.extend(matched.into_iter().map(Source::File));
    }

    Ok(sources)
}
