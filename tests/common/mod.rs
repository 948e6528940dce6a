//! Shared test utilities for integration and E2E tests.
//!
//! Provides the inventory every test resolves against, a few stored commands,
//! and a temporary-directory fixture for driving the CLI binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_inventory(inventories::CLUSTERS);
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

use command_materializer::inventory::Inventory;
use command_materializer::wrapper::CommandResolver;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::commands;
    #[allow(unused_imports)]
    pub use super::inventories;
    #[allow(unused_imports)]
    pub use super::resolver;
    #[allow(unused_imports)]
    pub use super::TestFixture;
}

/// Inventory documents.
#[allow(dead_code)]
pub mod inventories {
    /// Two clusters on HDP-2.3:
    /// - `c1` (id 2): one recorded version, `hdfs-site` and `core-site`
    ///   desired, host `c6402` in a config group overriding `hdfs-site`;
    /// - `c2` (id 5): still provisioning, two recorded versions.
    ///
    /// Task 3 belongs to cluster 99, which does not exist.
    pub const CLUSTERS: &str = r#"
tasks:
  - { task_id: 1, cluster_id: 2 }
  - { task_id: 2, cluster_id: 2 }
  - { task_id: 3, cluster_id: 99 }
  - { task_id: 4, cluster_id: 5 }
clusters:
  - cluster_id: 2
    cluster_name: c1
    desired_stack: { stack_name: HDP, stack_version: "2.3" }
    versions: [2.3.0.0-2557]
    desired_configs:
      hdfs-site: { tag: version2, version: 2, service_name: HDFS }
      core-site: { tag: version1, version: 1, service_name: HDFS }
    configurations:
      hdfs-site:
        version1:
          properties: { a: "0", b: "0" }
        version2:
          properties: { a: "1", b: "2" }
          attributes: { a: { final: "true" } }
        version3:
          properties: { b: "7" }
      core-site:
        version1:
          properties: { fs.defaultFS: "hdfs://c6401:8020" }
    config_groups:
      - { id: 7, name: small-hosts, hosts: [c6402], tags: { hdfs-site: version3 } }
  - cluster_id: 5
    cluster_name: c2
    desired_stack: { stack_name: HDP, stack_version: "2.3" }
    versions: [2.2.0.0-100, 2.3.0.0-2557]
stacks:
  - stack_name: HDP
    stack_version: "2.3"
    hooks_folder: stacks/HDP/2.0.6/hooks
    services:
      HDFS: { package_folder: common-services/HDFS/2.1.0.2.0/package }
"#;

    /// A cluster whose desired stack is not defined.
    pub const MISSING_STACK: &str = r#"
clusters:
  - cluster_id: 2
    cluster_name: c1
    desired_stack: { stack_name: HDP, stack_version: "2.5" }
"#;

    /// Desires a tag that has no snapshot.
    pub const UNDEFINED_TAG: &str = r#"
clusters:
  - cluster_id: 2
    cluster_name: c1
    desired_stack: { stack_name: HDP, stack_version: "2.3" }
    desired_configs:
      hdfs-site: { tag: version9 }
"#;
}

/// Stored commands.
#[allow(dead_code)]
pub mod commands {
    /// Task 1 on `c6401`, stale tags and explicit `hdfs-site` values.
    pub const START_DATANODE: &str = r#"{
  "commandType": "EXECUTION_COMMAND",
  "clusterName": "c1",
  "taskId": 1,
  "hostname": "c6401",
  "role": "DATANODE",
  "roleCommand": "START",
  "serviceName": "HDFS",
  "configurationTags": {"hdfs-site": {"tag": "version2"}},
  "configurations": {"hdfs-site": {"b": "5", "c": "3"}},
  "configurationAttributes": {}
}"#;

    /// Same task, asking for a refresh, with a type no tag covers.
    pub const REFRESH_DATANODE: &str = r#"{
  "taskId": 1,
  "hostname": "c6401",
  "roleCommand": "START",
  "serviceName": "HDFS",
  "forceRefreshConfigTagsBeforeExecution": true,
  "configurationTags": {"hdfs-site": {"tag": "version1"}},
  "configurations": {"hdfs-site": {"b": "5"}, "cluster-env": {"user": "ambari"}}
}"#;

    /// Task 3, whose cluster does not exist.
    pub const ORPHAN: &str = r#"{
  "taskId": 3,
  "hostname": "c6401",
  "roleCommand": "START",
  "configurationTags": {"hdfs-site": {"tag": "version2"}}
}"#;

    /// Task 1 for a service the stack does not define.
    pub const UNKNOWN_SERVICE: &str = r#"{
  "taskId": 1,
  "hostname": "c6401",
  "roleCommand": "START",
  "serviceName": "FLUME"
}"#;

    /// A status command for a task that is not in any inventory.
    pub const STATUS: &str = r#"{"commandType": "STATUS_COMMAND", "taskId": 1000}"#;
}

/// A resolver backed by [`inventories::CLUSTERS`].
#[allow(dead_code)]
pub fn resolver() -> CommandResolver {
    Inventory::parse(inventories::CLUSTERS)
        .expect("fixture inventory parses")
        .into_resolver()
}

/// A temporary directory holding an inventory and stored commands.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_inventory(inventories::CLUSTERS)
///     .with_command("start.json", commands::START_DATANODE);
///
/// cargo_bin_cmd!("command-materializer")
///     .arg("materialize")
///     .arg("--inventory")
///     .arg(fixture.inventory_path())
///     .arg(fixture.child_path("start.json"))
///     .assert()
///     .success();
/// ```
#[allow(dead_code)]
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `inventory.yaml` with the given content.
    pub fn with_inventory(self, content: &str) -> Self {
        self.temp_dir
            .child("inventory.yaml")
            .write_str(content)
            .expect("Failed to write inventory");
        self
    }

    /// Write a stored command under `name`.
    pub fn with_command(self, name: &str, content: &str) -> Self {
        self.temp_dir
            .child(name)
            .write_str(content)
            .expect("Failed to write command");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the inventory file.
    pub fn inventory_path(&self) -> PathBuf {
        self.temp_dir.path().join("inventory.yaml")
    }

    /// Path of a file inside the temporary directory.
    pub fn child_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
