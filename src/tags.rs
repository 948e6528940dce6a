//! # Configuration Tag Resolution
//!
//! Commands are created with the configuration tags that were current at the
//! time. By the time a command is dispatched those tags may be stale: an
//! earlier command in the same request can have changed the cluster's desired
//! configs. A command can therefore ask for its tags to be recomputed right
//! before dispatch.
//!
//! This module makes that decision and then turns the (possibly refreshed)
//! tags into concrete values through the [`ConfigHelper`] collaborator.

use crate::cluster::{Cluster, ConfigHelper};
use crate::command::{ConfigurationAttributes, Configurations, ExecutionCommand};
use crate::error::Result;
use log::debug;

/// Values and attributes obtained by resolving a tag set against the cluster.
///
/// This is recomputed on every materialization and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    pub properties: Configurations,
    pub attributes: ConfigurationAttributes,
}

/// Recompute the command's tags if it asked for a refresh.
///
/// On refresh, the tags are replaced by the effective tags for the command's
/// host and **all** configuration values on the command are cleared, so the
/// merge step rebuilds them from the fresh tags alone. Types not covered by
/// the new tags are dropped along with everything else.
///
/// Returns whether a refresh happened. An empty tag set after a refresh is
/// valid.
pub fn refresh_configuration_tags(
    command: &mut ExecutionCommand,
    cluster: &dyn Cluster,
    helper: &dyn ConfigHelper,
) -> Result<bool> {
    if !command.force_refresh_config_tags_before_execution {
        return Ok(false);
    }

    let desired_configs = cluster.desired_configs();
    let tags = helper.effective_desired_tags(cluster, &command.host_name, &desired_configs)?;

    debug!(
        "While scheduling task {} on cluster {}, configurations are being refreshed using desired configurations of {:?}",
        command.task_id,
        cluster.cluster_name(),
        desired_configs
    );

    command.configurations.clear();
    command.configuration_tags = tags;
    Ok(true)
}

/// Resolve the command's current tags into values and attributes.
///
/// Returns `None` when the command has no tags, in which case nothing is
/// merged.
pub fn resolve_configuration(
    command: &ExecutionCommand,
    cluster: &dyn Cluster,
    helper: &dyn ConfigHelper,
) -> Result<Option<ResolvedConfiguration>> {
    let tags = &command.configuration_tags;
    if tags.is_empty() {
        return Ok(None);
    }

    let properties = helper.effective_config_properties(cluster, tags)?;
    let attributes = helper.effective_config_attributes(cluster, tags)?;

    Ok(Some(ResolvedConfiguration {
        properties,
        attributes,
    }))
}
