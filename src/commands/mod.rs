//! # CLI Command Implementations
//!
//! Each subcommand of `command-materializer` lives in its own file with:
//! - an `Args` struct that defines the command-specific arguments, derived
//!   using `clap`;
//! - an `execute` function that takes the parsed `Args` and calls into the
//!   `command_materializer` library.

pub mod check;
pub mod command_type;
pub mod completions;
pub mod materialize;
