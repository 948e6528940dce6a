//! # Cluster and Stack Collaborators
//!
//! Materialization reads cluster state it does not own: which cluster a task
//! belongs to, what the cluster's desired configuration looks like, which
//! repository version it runs, and where the stack keeps its scripts. This
//! module defines that read-only surface as a set of traits.
//!
//! ## Design
//!
//! Each concern gets its own trait so that callers can back them with
//! whatever store they have:
//!
//! - **`TaskRegistry`**: maps a task to the cluster that owns it.
//! - **`Clusters`** / **`Cluster`**: cluster lookup and the per-cluster
//!   desired state.
//! - **`ConfigHelper`**: turns desired configs into effective tags, and tags
//!   into concrete property values and attributes.
//! - **`StackRegistry`**: stack metadata such as hooks and package folders.
//!
//! All traits are `Send + Sync` so one set of collaborators can be shared by
//! every worker preparing commands. The [`crate::inventory`] module provides a
//! YAML-backed implementation of all of them; tests replace them with mocks.

use crate::command::{ConfigurationAttributes, ConfigurationTags, Configurations, PropertyAttributes};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of a cluster.
pub type ClusterId = i64;

/// Name and version of a stack, e.g. `HDP-2.3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StackId {
    #[serde(alias = "stack_name")]
    pub stack_name: String,
    #[serde(alias = "stack_version")]
    pub stack_version: String,
}

impl StackId {
    pub fn new(stack_name: impl Into<String>, stack_version: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            stack_version: stack_version.into(),
        }
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.stack_name, self.stack_version)
    }
}

/// The desired configuration of one type, as recorded on the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredConfig {
    /// Tag of the cluster-level snapshot in effect.
    pub tag: String,
    /// Monotonic version of that snapshot.
    #[serde(default)]
    pub version: i64,
    /// Service that owns the configuration type, if any.
    #[serde(default)]
    pub service_name: Option<String>,
}

/// A repository version registered for a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryVersion {
    pub stack_id: StackId,
    /// Full version string, e.g. `2.3.0.0-2557`.
    pub version: String,
}

/// A repository version that a cluster has recorded in its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterVersion {
    pub cluster_id: ClusterId,
    pub repository_version: RepositoryVersion,
}

/// Looks up the cluster owning a task.
pub trait TaskRegistry: Send + Sync {
    /// Returns the id of the cluster whose stage contains `task_id`.
    ///
    /// Fails with [`crate::error::Error::TaskNotFound`] if the task is unknown.
    fn find_owning_cluster(&self, task_id: i64) -> Result<ClusterId>;
}

/// Read-only view of one cluster's desired state.
pub trait Cluster: Send + Sync {
    fn cluster_id(&self) -> ClusterId;

    fn cluster_name(&self) -> &str;

    /// Desired configuration per type.
    fn desired_configs(&self) -> BTreeMap<String, DesiredConfig>;

    /// The stack the cluster is meant to run.
    fn desired_stack_version(&self) -> StackId;

    /// The version currently in effect, or `None` while the cluster is still
    /// being provisioned.
    fn effective_cluster_version(&self) -> Option<ClusterVersion>;

    /// Every version the cluster has ever recorded.
    fn all_cluster_versions(&self) -> Vec<ClusterVersion>;
}

/// Cluster registry.
pub trait Clusters: Send + Sync {
    /// Fails with [`crate::error::Error::ClusterNotFound`] for unknown ids.
    fn cluster_by_id(&self, cluster_id: ClusterId) -> Result<Arc<dyn Cluster>>;
}

/// Resolves configuration tags into concrete values.
pub trait ConfigHelper: Send + Sync {
    /// Computes the tags in effect for `host_name`, per configuration type.
    fn effective_desired_tags(
        &self,
        cluster: &dyn Cluster,
        host_name: &str,
        desired_configs: &BTreeMap<String, DesiredConfig>,
    ) -> Result<ConfigurationTags>;

    /// Property values per type for the given tags, with host overrides
    /// already applied.
    fn effective_config_properties(
        &self,
        cluster: &dyn Cluster,
        tags: &ConfigurationTags,
    ) -> Result<Configurations>;

    /// Property attributes per type for the given tags.
    fn effective_config_attributes(
        &self,
        cluster: &dyn Cluster,
        tags: &ConfigurationTags,
    ) -> Result<ConfigurationAttributes>;

    /// Copies `source` into `target`, overwriting attributes both define.
    fn clone_attributes(&self, source: &PropertyAttributes, target: &mut PropertyAttributes) {
        crate::merge::attributes::clone_attributes_map(source, target);
    }
}

/// Stack metadata lookups.
pub trait StackRegistry: Send + Sync {
    /// Stack-relative path of the hooks folder.
    ///
    /// Fails with [`crate::error::Error::StackNotFound`] for unknown stacks.
    fn stack_hooks_folder(&self, stack: &StackId) -> Result<String>;

    /// Stack-relative path of a service's package folder.
    ///
    /// Fails with [`crate::error::Error::StackNotFound`] or
    /// [`crate::error::Error::ServiceNotFound`].
    fn service_package_folder(&self, stack: &StackId, service_name: &str) -> Result<String>;
}
