//! # Error Handling
//!
//! This module defines the centralized error type for command materialization.
//! It uses the `thiserror` library to build an `Error` enum covering every
//! failure a resolution can run into, with messages that carry enough context
//! to tell which task, cluster or stack was involved.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants fall into three groups:
//!   - programmer errors (`InvalidState`), raised when a wrapper is asked to
//!     do something its current representation cannot support;
//!   - the degraded-mode signal (`ClusterNotFound`), which the resolver
//!     swallows and logs instead of propagating;
//!   - registry failures (`TaskNotFound`, `StackNotFound`, `ServiceNotFound`,
//!     `Registry`), which abort the in-flight resolution.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Parsing failures for the wire format (`Serialization`) and for inventory
//! files (`InventoryParse`, `Yaml`, `Io`) round out the set.

use thiserror::Error;

/// Main error type for command materialization
#[derive(Error, Debug)]
pub enum Error {
    /// The wrapper holds no representation that can satisfy the request.
    ///
    /// This is always a programming error on the caller's side, e.g. asking
    /// an empty wrapper for its JSON or invalidating a wrapper that was never
    /// parsed.
    #[error("Invalid execution command wrapper: {message}")]
    InvalidState { message: String },

    /// The cluster owning a task is not known to the cluster registry.
    #[error("Cluster not found: {cluster_id}")]
    ClusterNotFound { cluster_id: i64 },

    /// The task is not known to the task registry.
    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: i64 },

    /// The stack is not known to the stack registry.
    #[error("Stack not found: {stack}")]
    StackNotFound { stack: String },

    /// The stack exists but does not define the requested service.
    #[error("Service {service} not found in stack {stack}")]
    ServiceNotFound { stack: String, service: String },

    /// Any other failure reported by a cluster or configuration collaborator.
    #[error("Registry lookup failure: {message}")]
    Registry { message: String },

    /// The serialized command could not be read or written.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An inventory file parsed but is not internally consistent.
    #[error("Inventory parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    InventoryParse {
        message: String,
        /// Optional hint for how to fix the inventory
        hint: Option<String>,
    },

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for building an [`Error::InvalidState`].
    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Error::InvalidState {
            message: message.into(),
        }
    }

    /// Whether this error means the owning cluster does not exist.
    pub fn is_cluster_not_found(&self) -> bool {
        matches!(self, Error::ClusterNotFound { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
