//! # Version and Stack Metadata
//!
//! Fills in the command parameters an agent needs to locate its scripts:
//! the repository version, the stack hooks folder and the service package
//! folder. Each parameter is only ever added. A value the command already
//! carries is never replaced.

use crate::cluster::{Cluster, ClusterVersion, StackRegistry};
use crate::command::{key_names, ExecutionCommand};
use crate::error::Result;
use log::debug;

/// Pick the version a command should run against.
///
/// The cluster's effective version is preferred. While a cluster is still
/// being provisioned it has none; in that case any command other than an
/// install falls back to the cluster's only recorded version, if it has
/// exactly one.
pub fn target_version(command: &ExecutionCommand, cluster: &dyn Cluster) -> Option<ClusterVersion> {
    if let Some(effective) = cluster.effective_cluster_version() {
        return Some(effective);
    }

    if command.is_install() {
        return None;
    }

    let mut versions = cluster.all_cluster_versions();
    if versions.len() == 1 {
        versions.pop()
    } else {
        None
    }
}

/// Set `VERSION` if absent and a target version can be determined.
pub fn resolve_version(command: &mut ExecutionCommand, cluster: &dyn Cluster) {
    if command.command_params.contains_key(key_names::VERSION) {
        return;
    }

    if let Some(version) = target_version(command, cluster) {
        debug!(
            "Task {} will run against version {}",
            command.task_id, version.repository_version.version
        );
        command.command_params.insert(
            key_names::VERSION.to_string(),
            version.repository_version.version,
        );
    }
}

/// Set `HOOKS_FOLDER` and `SERVICE_PACKAGE_FOLDER` if absent, from the
/// cluster's desired stack.
///
/// Registry lookups only happen for parameters that are missing. A stack or
/// service unknown to the registry is an error.
pub fn resolve_stack_folders(
    command: &mut ExecutionCommand,
    cluster: &dyn Cluster,
    stacks: &dyn StackRegistry,
) -> Result<()> {
    let stack_id = cluster.desired_stack_version();

    if !command.command_params.contains_key(key_names::HOOKS_FOLDER) {
        let hooks_folder = stacks.stack_hooks_folder(&stack_id)?;
        debug!("Task {} uses hooks folder {}", command.task_id, hooks_folder);
        command
            .command_params
            .insert(key_names::HOOKS_FOLDER.to_string(), hooks_folder);
    }

    if !command
        .command_params
        .contains_key(key_names::SERVICE_PACKAGE_FOLDER)
    {
        if let Some(service_name) = command.service().map(str::to_owned) {
            let package_folder = stacks.service_package_folder(&stack_id, &service_name)?;
            debug!(
                "Task {} uses package folder {} for {}",
                command.task_id, package_folder, service_name
            );
            command
                .command_params
                .insert(key_names::SERVICE_PACKAGE_FOLDER.to_string(), package_folder);
        }
    }

    Ok(())
}

/// Run version resolution followed by stack folder resolution.
pub fn resolve_metadata(
    command: &mut ExecutionCommand,
    cluster: &dyn Cluster,
    stacks: &dyn StackRegistry,
) -> Result<()> {
    resolve_version(command, cluster);
    resolve_stack_folders(command, cluster, stacks)
}
