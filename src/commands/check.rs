//! # Check Command Implementation
//!
//! Parses an inventory file and reports what it contains. Structural problems
//! (undefined tags, duplicate ids, effective versions outside the history)
//! fail the parse. Clusters whose desired stack is not defined are reported
//! as warnings, because commands on them fail only once metadata is needed.

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use command_materializer::inventory::Inventory;
use command_materializer::output::{label, OutputConfig, Status};

/// Validate an inventory file
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Inventory describing tasks, clusters and stacks
    #[arg(short, long, value_name = "FILE", env = "COMMAND_MATERIALIZER_INVENTORY")]
    pub inventory: PathBuf,

    /// Use strict validation (fail on warnings).
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `check` command.
pub fn execute(args: CheckArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    let inventory = match Inventory::from_file(&args.inventory) {
        Ok(inventory) => inventory,
        Err(e) => {
            println!("{} {}: {}", label(&out, Status::Err), args.inventory.display(), e);
            bail!("Inventory check failed");
        }
    };

    println!(
        "{} {}: {} clusters, {} stacks, {} tasks",
        label(&out, Status::Ok),
        args.inventory.display(),
        inventory.clusters().count(),
        inventory.stack_ids().count(),
        inventory.task_count()
    );

    let missing = inventory.missing_stacks();
    for stack_id in &missing {
        println!(
            "{} stack {} is desired by a cluster but not defined",
            label(&out, Status::Warn),
            stack_id
        );
    }

    if args.strict && !missing.is_empty() {
        bail!("Inventory check failed with {} warnings", missing.len());
    }
    Ok(())
}
