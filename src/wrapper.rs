//! # Execution Command Materialization
//!
//! An execution command reaches the dispatch pipeline in one of two shapes:
//! the JSON text stored with its task, or an `ExecutionCommand` built in
//! memory. [`ExecutionCommandWrapper`] holds whichever one it was given and
//! converts lazily between them. [`CommandResolver`] performs the expensive
//! part of that conversion: turning a stored command into one with fully
//! resolved configuration.
//!
//! ## Representation states
//!
//! ```text
//!            parse + resolve            serialize
//!  Unparsed ────────────────▶ Structured ────────▶ StructuredAndSerialized
//!                                 ▲                          │
//!                                 └──────── invalidate ──────┘
//! ```
//!
//! A wrapper in the `Empty` state (only reachable through `Default`) has
//! nothing to work from and every operation on it fails with
//! [`Error::InvalidState`].
//!
//! ## Resolution pipeline
//!
//! 1. Find the owning cluster of the task. If the cluster does not exist, the
//!    parsed command is used as-is.
//! 2. Refresh configuration tags if the command asked for it.
//! 3. Merge tag-derived values under the command's own values.
//! 4. Propagate tag-derived attributes.
//! 5. Fill in version, hooks folder and service package folder.
//!
//! Any other failure aborts the resolution and leaves the wrapper unparsed.
//!
//! ## Concurrency
//!
//! Resolution and serialization take `&mut self`, so the borrow checker
//! enforces a single writer per wrapper. A resolved wrapper can be shared
//! behind `&` for comparisons and reads. One `CommandResolver` is meant to be
//! shared by every worker.

use crate::cluster::{Cluster, Clusters, ConfigHelper, StackRegistry, TaskRegistry};
use crate::command::{AgentCommandType, CommandTypeProbe, ExecutionCommand};
use crate::error::{Error, Result};
use crate::merge::{self, attributes};
use crate::{metadata, tags};
use log::warn;
use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Resolves a stored command against live cluster state.
#[derive(Clone)]
pub struct CommandResolver {
    tasks: Arc<dyn TaskRegistry>,
    clusters: Arc<dyn Clusters>,
    config_helper: Arc<dyn ConfigHelper>,
    stacks: Arc<dyn StackRegistry>,
}

impl fmt::Debug for CommandResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandResolver").finish_non_exhaustive()
    }
}

impl CommandResolver {
    pub fn new(
        tasks: Arc<dyn TaskRegistry>,
        clusters: Arc<dyn Clusters>,
        config_helper: Arc<dyn ConfigHelper>,
        stacks: Arc<dyn StackRegistry>,
    ) -> Self {
        Self {
            tasks,
            clusters,
            config_helper,
            stacks,
        }
    }

    /// Resolve a freshly parsed command.
    ///
    /// Returns the command unchanged if its cluster cannot be found.
    pub fn resolve(&self, command: ExecutionCommand) -> Result<ExecutionCommand> {
        let cluster_id = self.tasks.find_owning_cluster(command.task_id)?;

        let cluster = match self.clusters.cluster_by_id(cluster_id) {
            Ok(cluster) => cluster,
            Err(e) if e.is_cluster_not_found() => {
                // commands without a cluster exist; they simply carry no configs
                warn!(
                    "Unable to look up the cluster of task {}; assuming there is no cluster and therefore no configs for this execution command: {}",
                    command.task_id, e
                );
                return Ok(command);
            }
            Err(e) => return Err(e),
        };

        self.resolve_against(command, cluster.as_ref())
    }

    /// Run the resolution steps against a known cluster.
    pub fn resolve_against(
        &self,
        mut command: ExecutionCommand,
        cluster: &dyn Cluster,
    ) -> Result<ExecutionCommand> {
        let helper = self.config_helper.as_ref();

        tags::refresh_configuration_tags(&mut command, cluster, helper)?;

        if let Some(resolved) = tags::resolve_configuration(&command, cluster, helper)? {
            merge::merge_configurations(resolved.properties, &mut command.configurations);

            if let Some(target) = command.configuration_attributes.as_mut() {
                attributes::propagate_attributes_with(&resolved.attributes, target, |source, dest| {
                    helper.clone_attributes(source, dest)
                });
            }
        }

        metadata::resolve_metadata(&mut command, cluster, self.stacks.as_ref())?;

        Ok(command)
    }
}

#[derive(Debug, Clone, Default)]
enum Representation {
    #[default]
    Empty,
    Unparsed(String),
    Structured(ExecutionCommand),
    StructuredAndSerialized(ExecutionCommand, String),
}

/// A command held as JSON, as a structured value, or both.
#[derive(Debug, Clone, Default)]
pub struct ExecutionCommandWrapper {
    representation: Representation,
}

impl ExecutionCommandWrapper {
    /// Wrap a stored command. Nothing is parsed until it is needed.
    pub fn from_json(json: impl Into<String>) -> Self {
        Self {
            representation: Representation::Unparsed(json.into()),
        }
    }

    /// Wrap a command built in memory. It is treated as already resolved.
    pub fn from_command(command: ExecutionCommand) -> Self {
        Self {
            representation: Representation::Structured(command),
        }
    }

    /// The structured command, resolving it on first access.
    ///
    /// Resolution runs at most once per wrapper; later calls return the same
    /// command without consulting `resolver`. If resolution fails the wrapper
    /// keeps its JSON and a later call starts over.
    pub fn execution_command(&mut self, resolver: &CommandResolver) -> Result<&ExecutionCommand> {
        if let Representation::Unparsed(json) = &self.representation {
            let parsed: ExecutionCommand = serde_json::from_str(json)?;
            let resolved = resolver.resolve(parsed)?;
            self.representation = Representation::Structured(resolved);
        }

        self.structured().ok_or_else(empty_wrapper)
    }

    /// The structured command if one is held, without resolving anything.
    pub fn structured(&self) -> Option<&ExecutionCommand> {
        match &self.representation {
            Representation::Structured(command)
            | Representation::StructuredAndSerialized(command, _) => Some(command),
            Representation::Empty | Representation::Unparsed(_) => None,
        }
    }

    /// Mutable access to the structured command.
    ///
    /// The cached JSON is not touched; call [`Self::invalidate_json`] after
    /// mutating so the next [`Self::json`] reflects the change.
    pub fn command_mut(&mut self) -> Result<&mut ExecutionCommand> {
        match &mut self.representation {
            Representation::Structured(command)
            | Representation::StructuredAndSerialized(command, _) => Ok(command),
            Representation::Unparsed(_) => Err(Error::invalid_state(
                "the command has not been resolved yet",
            )),
            Representation::Empty => Err(empty_wrapper()),
        }
    }

    /// Whether the wrapper holds a structured command.
    pub fn is_resolved(&self) -> bool {
        self.structured().is_some()
    }

    /// The command type, reading only that field from the JSON when the
    /// command has not been resolved.
    pub fn command_type(&self) -> Result<AgentCommandType> {
        match &self.representation {
            Representation::Structured(command)
            | Representation::StructuredAndSerialized(command, _) => Ok(command.command_type),
            Representation::Unparsed(json) => {
                let probe: CommandTypeProbe = serde_json::from_str(json)?;
                Ok(probe.command_type)
            }
            Representation::Empty => Err(empty_wrapper()),
        }
    }

    /// The JSON form, serializing the structured command once if needed.
    pub fn json(&mut self) -> Result<&str> {
        if let Representation::Structured(command) = &mut self.representation {
            let json = serde_json::to_string(command)?;
            let command = std::mem::take(command);
            self.representation = Representation::StructuredAndSerialized(command, json);
        }

        match &self.representation {
            Representation::Unparsed(json) | Representation::StructuredAndSerialized(_, json) => {
                Ok(json)
            }
            Representation::Structured(_) | Representation::Empty => Err(empty_wrapper()),
        }
    }

    /// Drop the cached JSON so it is rebuilt from the structured command.
    pub fn invalidate_json(&mut self) -> Result<()> {
        match std::mem::take(&mut self.representation) {
            Representation::StructuredAndSerialized(command, _)
            | Representation::Structured(command) => {
                self.representation = Representation::Structured(command);
                Ok(())
            }
            other => {
                self.representation = other;
                Err(Error::invalid_state(
                    "no structured command to rebuild the JSON from",
                ))
            }
        }
    }

    /// Hash of the authoritative representation, the structured command if
    /// there is one.
    pub fn hash_code(&self) -> Result<u64> {
        let mut hasher = DefaultHasher::new();
        match &self.representation {
            Representation::Structured(command)
            | Representation::StructuredAndSerialized(command, _) => command.hash(&mut hasher),
            Representation::Unparsed(json) => json.hash(&mut hasher),
            Representation::Empty => return Err(empty_wrapper()),
        }
        Ok(hasher.finish())
    }

    /// JSON for comparisons, serializing on the fly without caching.
    fn json_view(&self) -> Result<Cow<'_, str>> {
        match &self.representation {
            Representation::Unparsed(json) | Representation::StructuredAndSerialized(_, json) => {
                Ok(Cow::Borrowed(json))
            }
            Representation::Structured(command) => Ok(Cow::Owned(serde_json::to_string(command)?)),
            Representation::Empty => Err(empty_wrapper()),
        }
    }
}

impl PartialEq for ExecutionCommandWrapper {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }

        if let (Some(a), Some(b)) = (self.structured(), other.structured()) {
            return a == b;
        }

        match (self.json_view(), other.json_view()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

fn empty_wrapper() -> Error {
    Error::invalid_state("both object and string representations are empty")
}
