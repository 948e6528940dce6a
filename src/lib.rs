//! # Command Materializer Library
//!
//! This library turns execution commands stored for a cluster task into
//! self-contained commands that can be sent to a remote agent. A stored
//! command may carry stale configuration tags, partial configuration values
//! and no version information at all; materializing it resolves all of that
//! against the cluster's current desired state.
//!
//! ## Quick Example
//!
//! ```
//! use command_materializer::inventory::Inventory;
//! use command_materializer::wrapper::ExecutionCommandWrapper;
//!
//! let inventory = Inventory::parse(r#"
//! tasks:
//!   - { task_id: 1, cluster_id: 2 }
//! clusters:
//!   - cluster_id: 2
//!     cluster_name: c1
//!     desired_stack: { stack_name: HDP, stack_version: "2.3" }
//!     versions: [2.3.0.0-2557]
//!     desired_configs:
//!       core-site: { tag: version1 }
//!     configurations:
//!       core-site:
//!         version1:
//!           properties: { fs.defaultFS: "hdfs://nn:8020" }
//! stacks:
//!   - stack_name: HDP
//!     stack_version: "2.3"
//!     hooks_folder: stacks/HDP/2.0.6/hooks
//! "#).unwrap();
//! let resolver = inventory.into_resolver();
//!
//! let mut wrapper = ExecutionCommandWrapper::from_json(
//!     r#"{"taskId": 1, "hostname": "h1", "roleCommand": "START",
//!         "forceRefreshConfigTagsBeforeExecution": true}"#,
//! );
//! let command = wrapper.execution_command(&resolver).unwrap();
//!
//! assert_eq!(command.configurations["core-site"]["fs.defaultFS"], "hdfs://nn:8020");
//! assert_eq!(command.command_params["version"], "2.3.0.0-2557");
//! ```
//!
//! ## Core Concepts
//!
//! - **Command (`command`)**: the structured execution command and its wire
//!   format.
//! - **Collaborators (`cluster`)**: traits for the task, cluster,
//!   configuration and stack registries the resolution reads from.
//! - **Merging (`merge`)**: layering tag-derived configuration under values
//!   the command already carries, and propagating attributes.
//! - **Tags (`tags`)**: refreshing stale configuration tags and resolving
//!   them into values.
//! - **Metadata (`metadata`)**: version, hooks folder and service package
//!   folder injection.
//! - **Wrapper (`wrapper`)**: the lazily converted JSON / structured pair and
//!   the resolver that drives the steps above.
//! - **Inventory (`inventory`)**: a YAML-backed implementation of every
//!   collaborator.
//!
//! ## Execution Flow
//!
//! 1.  **Parse**: the stored JSON is parsed on first access.
//! 2.  **Locate**: the task's owning cluster is looked up. A missing cluster
//!     leaves the command as parsed.
//! 3.  **Refresh**: tags are recomputed if the command asks for it.
//! 4.  **Merge**: tag-derived values are merged under explicit values.
//! 5.  **Attributes**: tag-derived attributes are copied onto the command.
//! 6.  **Metadata**: version and stack paths are added where missing.

pub mod cluster;
pub mod command;
pub mod error;
pub mod inventory;
pub mod merge;
pub mod metadata;
pub mod output;
pub mod tags;
pub mod wrapper;

#[cfg(test)]
mod merge_proptest;
