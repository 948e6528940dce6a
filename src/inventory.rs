//! # Inventory-backed Collaborators
//!
//! A static description of tasks, clusters and stacks, read from YAML, that
//! implements every collaborator trait in [`crate::cluster`]. It lets the CLI
//! materialize stored commands offline and gives integration tests a
//! realistic cluster to resolve against.
//!
//! ## Format
//!
//! ```yaml
//! tasks:
//!   - { task_id: 42, cluster_id: 2 }
//! clusters:
//!   - cluster_id: 2
//!     cluster_name: c1
//!     desired_stack: { stack_name: HDP, stack_version: "2.3" }
//!     effective_version: 2.3.0.0-2557
//!     versions: [2.3.0.0-2557]
//!     desired_configs:
//!       hdfs-site: { tag: version2, version: 2 }
//!     configurations:
//!       hdfs-site:
//!         version2:
//!           properties: { dfs.replication: "3" }
//!           attributes: { dfs.replication: { final: "true" } }
//!     config_groups:
//!       - { id: 7, name: fast-disks, hosts: [h2], tags: { hdfs-site: version3 } }
//! stacks:
//!   - stack_name: HDP
//!     stack_version: "2.3"
//!     hooks_folder: stacks/HDP/2.0.6/hooks
//!     services:
//!       HDFS: { package_folder: common-services/HDFS/2.1.0.2.0/package }
//! ```
//!
//! ## Effective configuration
//!
//! The tags in effect for a host are the cluster's desired tag for each type
//! (under the label `tag`) plus one label per config group containing the
//! host that overrides the type (labelled with the group id). Values are the
//! desired snapshot overlaid with each override snapshot in label order.

use crate::cluster::{
    Cluster, ClusterId, ClusterVersion, Clusters, ConfigHelper, DesiredConfig, RepositoryVersion,
    StackId, StackRegistry, TaskRegistry,
};
use crate::command::{
    ConfigurationAttributes, ConfigurationTags, Configurations, Properties, PropertyAttributes,
};
use crate::error::{Error, Result};
use crate::merge::{attributes::clone_attributes_map, merged_config};
use crate::wrapper::CommandResolver;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

/// Label of the cluster-level tag within a type's tag map.
pub const CLUSTER_TAG: &str = "tag";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct InventoryFile {
    #[serde(default)]
    tasks: Vec<TaskEntry>,
    #[serde(default)]
    clusters: Vec<ClusterEntry>,
    #[serde(default)]
    stacks: Vec<StackEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskEntry {
    task_id: i64,
    cluster_id: ClusterId,
}

/// A configuration snapshot identified by type and tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSnapshot {
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub attributes: PropertyAttributes,
}

/// Host-level overrides applied to a subset of a cluster's hosts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigGroup {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hosts: Vec<String>,
    /// `type → tag` of the snapshots this group applies.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// One cluster's desired state.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterEntry {
    pub cluster_id: ClusterId,
    pub cluster_name: String,
    pub desired_stack: StackId,
    #[serde(default)]
    pub effective_version: Option<String>,
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub desired_configs: BTreeMap<String, DesiredConfig>,
    /// `type → tag → snapshot`
    #[serde(default)]
    pub configurations: BTreeMap<String, BTreeMap<String, ConfigSnapshot>>,
    #[serde(default)]
    pub config_groups: Vec<ConfigGroup>,
}

impl ClusterEntry {
    fn cluster_version(&self, version: &str) -> ClusterVersion {
        ClusterVersion {
            cluster_id: self.cluster_id,
            repository_version: RepositoryVersion {
                stack_id: self.desired_stack.clone(),
                version: version.to_string(),
            },
        }
    }

    fn snapshot(&self, config_type: &str, tag: &str) -> Result<&ConfigSnapshot> {
        self.configurations
            .get(config_type)
            .and_then(|tags| tags.get(tag))
            .ok_or_else(|| Error::Registry {
                message: format!(
                    "cluster {} has no {} configuration tagged {}",
                    self.cluster_name, config_type, tag
                ),
            })
    }

    /// The snapshots to layer for one type: the cluster-level one first, then
    /// each override in label order.
    fn layers<'a>(
        &'a self,
        config_type: &str,
        labels: &'a BTreeMap<String, String>,
    ) -> Result<Vec<&'a ConfigSnapshot>> {
        let Some(cluster_tag) = labels.get(CLUSTER_TAG) else {
            return Ok(Vec::new());
        };

        let mut layers = vec![self.snapshot(config_type, cluster_tag)?];
        for (label, tag) in labels {
            if label != CLUSTER_TAG {
                layers.push(self.snapshot(config_type, tag)?);
            }
        }
        Ok(layers)
    }

    fn validate(&self) -> Result<()> {
        for (config_type, desired) in &self.desired_configs {
            if self.snapshot(config_type, &desired.tag).is_err() {
                return Err(Error::InventoryParse {
                    message: format!(
                        "Cluster {} desires {} tag {} which is not defined",
                        self.cluster_name, config_type, desired.tag
                    ),
                    hint: Some(format!(
                        "Add the tag under clusters[{}].configurations.{}",
                        self.cluster_name, config_type
                    )),
                });
            }
        }

        for group in &self.config_groups {
            for (config_type, tag) in &group.tags {
                if self.snapshot(config_type, tag).is_err() {
                    return Err(Error::InventoryParse {
                        message: format!(
                            "Config group {} of cluster {} overrides {} with undefined tag {}",
                            group.id, self.cluster_name, config_type, tag
                        ),
                        hint: None,
                    });
                }
            }
        }

        if let Some(effective) = &self.effective_version {
            if !self.versions.contains(effective) {
                return Err(Error::InventoryParse {
                    message: format!(
                        "Effective version {} of cluster {} is not in its version history",
                        effective, self.cluster_name
                    ),
                    hint: Some("List it under versions".to_string()),
                });
            }
        }

        Ok(())
    }
}

impl Cluster for ClusterEntry {
    fn cluster_id(&self) -> ClusterId {
        self.cluster_id
    }

    fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    fn desired_configs(&self) -> BTreeMap<String, DesiredConfig> {
        self.desired_configs.clone()
    }

    fn desired_stack_version(&self) -> StackId {
        self.desired_stack.clone()
    }

    fn effective_cluster_version(&self) -> Option<ClusterVersion> {
        self.effective_version
            .as_deref()
            .map(|version| self.cluster_version(version))
    }

    fn all_cluster_versions(&self) -> Vec<ClusterVersion> {
        self.versions
            .iter()
            .map(|version| self.cluster_version(version))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceEntry {
    package_folder: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct StackEntry {
    stack_name: String,
    stack_version: String,
    hooks_folder: String,
    #[serde(default)]
    services: BTreeMap<String, ServiceEntry>,
}

/// Tasks, clusters and stacks loaded from an inventory file.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    tasks: BTreeMap<i64, ClusterId>,
    clusters: BTreeMap<ClusterId, Arc<ClusterEntry>>,
    stacks: BTreeMap<StackId, StackEntry>,
}

impl Inventory {
    /// Parse an inventory from YAML and check that it is self-consistent.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        let file: InventoryFile = serde_yaml::from_str(yaml_content)?;
        let mut inventory = Inventory::default();

        for task in file.tasks {
            if inventory.tasks.insert(task.task_id, task.cluster_id).is_some() {
                return Err(duplicate("task", task.task_id));
            }
        }

        for cluster in file.clusters {
            cluster.validate()?;
            let cluster_id = cluster.cluster_id;
            if inventory
                .clusters
                .insert(cluster_id, Arc::new(cluster))
                .is_some()
            {
                return Err(duplicate("cluster", cluster_id));
            }
        }

        for stack in file.stacks {
            let stack_id = StackId::new(&stack.stack_name, &stack.stack_version);
            if inventory.stacks.contains_key(&stack_id) {
                return Err(duplicate("stack", &stack_id));
            }
            inventory.stacks.insert(stack_id, stack);
        }

        Ok(inventory)
    }

    /// Read and parse an inventory file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Build a resolver that uses this inventory for every collaborator.
    pub fn into_resolver(self) -> CommandResolver {
        let inventory = Arc::new(self);
        CommandResolver::new(
            inventory.clone(),
            inventory.clone(),
            inventory.clone(),
            inventory,
        )
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn clusters(&self) -> impl Iterator<Item = &ClusterEntry> {
        self.clusters.values().map(|cluster| cluster.as_ref())
    }

    pub fn stack_ids(&self) -> impl Iterator<Item = &StackId> {
        self.stacks.keys()
    }

    /// Stacks referenced by a cluster but not defined in the inventory.
    ///
    /// Resolving a command on such a cluster fails, so `check` reports them.
    pub fn missing_stacks(&self) -> BTreeSet<StackId> {
        self.clusters()
            .map(|cluster| cluster.desired_stack.clone())
            .filter(|stack_id| !self.stacks.contains_key(stack_id))
            .collect()
    }

    fn cluster_entry(&self, cluster_id: ClusterId) -> Result<&ClusterEntry> {
        self.clusters
            .get(&cluster_id)
            .map(|cluster| cluster.as_ref())
            .ok_or_else(|| Error::Registry {
                message: format!("cluster {} is not part of the inventory", cluster_id),
            })
    }

    fn stack(&self, stack_id: &StackId) -> Result<&StackEntry> {
        self.stacks.get(stack_id).ok_or_else(|| Error::StackNotFound {
            stack: stack_id.to_string(),
        })
    }
}

fn duplicate(kind: &str, id: impl std::fmt::Display) -> Error {
    Error::InventoryParse {
        message: format!("Duplicate {} {}", kind, id),
        hint: Some(format!("Each {} may only be listed once", kind)),
    }
}

impl TaskRegistry for Inventory {
    fn find_owning_cluster(&self, task_id: i64) -> Result<ClusterId> {
        self.tasks
            .get(&task_id)
            .copied()
            .ok_or(Error::TaskNotFound { task_id })
    }
}

impl Clusters for Inventory {
    fn cluster_by_id(&self, cluster_id: ClusterId) -> Result<Arc<dyn Cluster>> {
        let cluster: Arc<dyn Cluster> = self
            .clusters
            .get(&cluster_id)
            .cloned()
            .ok_or(Error::ClusterNotFound { cluster_id })?;
        Ok(cluster)
    }
}

impl ConfigHelper for Inventory {
    fn effective_desired_tags(
        &self,
        cluster: &dyn Cluster,
        host_name: &str,
        desired_configs: &BTreeMap<String, DesiredConfig>,
    ) -> Result<ConfigurationTags> {
        let entry = self.cluster_entry(cluster.cluster_id())?;
        let host_groups: Vec<&ConfigGroup> = entry
            .config_groups
            .iter()
            .filter(|group| group.hosts.iter().any(|host| host == host_name))
            .collect();

        let mut tags = ConfigurationTags::new();
        for (config_type, desired) in desired_configs {
            let mut labels = BTreeMap::new();
            labels.insert(CLUSTER_TAG.to_string(), desired.tag.clone());
            for group in &host_groups {
                if let Some(tag) = group.tags.get(config_type) {
                    labels.insert(group.id.to_string(), tag.clone());
                }
            }
            tags.insert(config_type.clone(), labels);
        }
        Ok(tags)
    }

    fn effective_config_properties(
        &self,
        cluster: &dyn Cluster,
        tags: &ConfigurationTags,
    ) -> Result<Configurations> {
        let entry = self.cluster_entry(cluster.cluster_id())?;
        let mut configurations = Configurations::new();

        for (config_type, labels) in tags {
            let layers = entry.layers(config_type, labels)?;
            if layers.is_empty() {
                continue;
            }
            let properties = layers
                .iter()
                .fold(Properties::new(), |acc, layer| {
                    merged_config(&acc, &layer.properties)
                });
            configurations.insert(config_type.clone(), properties);
        }
        Ok(configurations)
    }

    fn effective_config_attributes(
        &self,
        cluster: &dyn Cluster,
        tags: &ConfigurationTags,
    ) -> Result<ConfigurationAttributes> {
        let entry = self.cluster_entry(cluster.cluster_id())?;
        let mut attributes = ConfigurationAttributes::new();

        for (config_type, labels) in tags {
            let layers = entry.layers(config_type, labels)?;
            if layers.is_empty() {
                continue;
            }
            let mut merged = PropertyAttributes::new();
            for layer in layers {
                clone_attributes_map(&layer.attributes, &mut merged);
            }
            attributes.insert(config_type.clone(), merged);
        }
        Ok(attributes)
    }
}

impl StackRegistry for Inventory {
    fn stack_hooks_folder(&self, stack: &StackId) -> Result<String> {
        Ok(self.stack(stack)?.hooks_folder.clone())
    }

    fn service_package_folder(&self, stack: &StackId, service_name: &str) -> Result<String> {
        self.stack(stack)?
            .services
            .get(service_name)
            .map(|service| service.package_folder.clone())
            .ok_or_else(|| Error::ServiceNotFound {
                stack: stack.to_string(),
                service: service_name.to_string(),
            })
    }
}
