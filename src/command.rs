//! # Execution Command Model
//!
//! The structured form of a command sent to a remote agent, together with the
//! nested map shapes that carry its configuration.
//!
//! All maps are `BTreeMap`s so that configuration types and keys iterate in a
//! stable order; two resolutions of the same input always serialize to the
//! same text.
//!
//! ## Wire format
//!
//! Commands travel as JSON with camelCase field names. Fields that agents may
//! send as `null` (`configurations`, `configurationTags`, `commandParams`,
//! `hostLevelParams`, `roleParams`) are read as empty maps.
//! `configurationAttributes` keeps its nullability: a command without an
//! attribute map does not receive propagated attributes.

use crate::cluster::StackId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Flat `key → value` properties of one configuration type.
pub type Properties = BTreeMap<String, String>;

/// `type → (key → value)`
pub type Configurations = BTreeMap<String, Properties>;

/// Attributes of the properties of one configuration type:
/// `key → (attribute name → attribute value)`.
pub type PropertyAttributes = BTreeMap<String, BTreeMap<String, String>>;

/// `type → (key → (attribute name → attribute value))`
pub type ConfigurationAttributes = BTreeMap<String, PropertyAttributes>;

/// `type → (tag label → version)`
///
/// The label `"tag"` names the cluster-level snapshot; any other label is a
/// host-level override layered on top of it.
pub type ConfigurationTags = BTreeMap<String, BTreeMap<String, String>>;

/// Well-known keys of the command parameter map.
pub mod key_names {
    /// Repository version the command operates on.
    pub const VERSION: &str = "version";
    /// Stack-relative path to the hooks folder.
    pub const HOOKS_FOLDER: &str = "hooks_folder";
    /// Stack-relative path to the service package folder.
    pub const SERVICE_PACKAGE_FOLDER: &str = "service_package_folder";
}

/// The role-level action a command performs.
///
/// Only `Install` changes how a command is resolved. Kinds this crate does not
/// know are kept verbatim in `Other` so they round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoleCommand {
    Install,
    Uninstall,
    Start,
    Restart,
    Stop,
    Execute,
    Abort,
    Upgrade,
    ServiceCheck,
    CustomCommand,
    Actionexecute,
    Other(String),
}

impl RoleCommand {
    /// The wire name, e.g. `SERVICE_CHECK`.
    pub fn as_str(&self) -> &str {
        match self {
            RoleCommand::Install => "INSTALL",
            RoleCommand::Uninstall => "UNINSTALL",
            RoleCommand::Start => "START",
            RoleCommand::Restart => "RESTART",
            RoleCommand::Stop => "STOP",
            RoleCommand::Execute => "EXECUTE",
            RoleCommand::Abort => "ABORT",
            RoleCommand::Upgrade => "UPGRADE",
            RoleCommand::ServiceCheck => "SERVICE_CHECK",
            RoleCommand::CustomCommand => "CUSTOM_COMMAND",
            RoleCommand::Actionexecute => "ACTIONEXECUTE",
            RoleCommand::Other(name) => name,
        }
    }
}

impl From<String> for RoleCommand {
    fn from(name: String) -> Self {
        match name.as_str() {
            "INSTALL" => RoleCommand::Install,
            "UNINSTALL" => RoleCommand::Uninstall,
            "START" => RoleCommand::Start,
            "RESTART" => RoleCommand::Restart,
            "STOP" => RoleCommand::Stop,
            "EXECUTE" => RoleCommand::Execute,
            "ABORT" => RoleCommand::Abort,
            "UPGRADE" => RoleCommand::Upgrade,
            "SERVICE_CHECK" => RoleCommand::ServiceCheck,
            "CUSTOM_COMMAND" => RoleCommand::CustomCommand,
            "ACTIONEXECUTE" => RoleCommand::Actionexecute,
            _ => RoleCommand::Other(name),
        }
    }
}

impl From<RoleCommand> for String {
    fn from(role_command: RoleCommand) -> Self {
        match role_command {
            RoleCommand::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for RoleCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of agent command, as seen by the dispatch pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentCommandType {
    #[default]
    ExecutionCommand,
    BackgroundExecutionCommand,
    StatusCommand,
    CancelCommand,
    RegistrationCommand,
    AlertDefinitionCommand,
    AlertExecutionCommand,
}

impl std::fmt::Display for AgentCommandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AgentCommandType::ExecutionCommand => "EXECUTION_COMMAND",
            AgentCommandType::BackgroundExecutionCommand => "BACKGROUND_EXECUTION_COMMAND",
            AgentCommandType::StatusCommand => "STATUS_COMMAND",
            AgentCommandType::CancelCommand => "CANCEL_COMMAND",
            AgentCommandType::RegistrationCommand => "REGISTRATION_COMMAND",
            AgentCommandType::AlertDefinitionCommand => "ALERT_DEFINITION_COMMAND",
            AgentCommandType::AlertExecutionCommand => "ALERT_EXECUTION_COMMAND",
        };
        f.write_str(name)
    }
}

/// A unit of work for one host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionCommand {
    #[serde(default)]
    pub command_type: AgentCommandType,

    #[serde(default)]
    pub command_id: String,

    #[serde(default)]
    pub cluster_name: String,

    /// Identifier of the task this command was generated for.
    pub task_id: i64,

    #[serde(rename = "hostname", default)]
    pub host_name: String,

    #[serde(default)]
    pub role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_command: Option<RoleCommand>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,

    /// Stack the command was generated against. Metadata paths are always
    /// resolved from the cluster's desired stack, not from this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<StackId>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub configurations: Configurations,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_attributes: Option<ConfigurationAttributes>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub configuration_tags: ConfigurationTags,

    /// When set, the configuration tags are recomputed from the cluster's
    /// desired configs right before the command is dispatched.
    #[serde(default)]
    pub force_refresh_config_tags_before_execution: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub command_params: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub host_level_params: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub role_params: BTreeMap<String, String>,
}

impl ExecutionCommand {
    /// Create a command for `task_id` on `host_name` with everything else empty.
    pub fn new(task_id: i64, host_name: impl Into<String>) -> Self {
        Self {
            task_id,
            host_name: host_name.into(),
            ..Default::default()
        }
    }

    /// The service name, if one is set and non-empty.
    pub fn service(&self) -> Option<&str> {
        self.service_name.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether this command installs a component.
    pub fn is_install(&self) -> bool {
        matches!(self.role_command, Some(RoleCommand::Install))
    }
}

/// Only the fields needed to classify a command, so that callers asking for
/// the command type do not pay for a full parse.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommandTypeProbe {
    #[serde(default)]
    pub command_type: AgentCommandType,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
