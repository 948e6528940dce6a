//! Layered configuration merging
//!
//! A command can carry configuration in two layers: values resolved from the
//! cluster's configuration tags, and values written onto the command when it
//! was created. This module combines them.
//!
//! ## Rules
//!
//! - Values the command already holds win over tag-derived values for the
//!   same key.
//! - Tag-derived keys the command does not mention are added.
//! - Types the tags do not cover are left exactly as they are.
//! - Merging never removes a key. Deletions only show up when the tag-derived
//!   snapshot no longer has the key and the command never set it.
//!
//! The attribute layer (`attributes`) follows the same per-type walk but
//! copies entries instead of overriding them.

pub mod attributes;

use crate::command::{Configurations, Properties};
use log::trace;
use std::collections::btree_map::Entry;

/// Overlay `overrides` on top of `base`.
///
/// Every key of `base` is kept unless `overrides` has a value for it, and
/// every key of `overrides` ends up in the result.
///
/// # Examples
///
/// ```
/// use command_materializer::command::Properties;
/// use command_materializer::merge::merged_config;
///
/// let base: Properties = [("a", "1"), ("b", "2")]
///     .into_iter()
///     .map(|(k, v)| (k.to_string(), v.to_string()))
///     .collect();
/// let explicit: Properties = [("b", "5"), ("c", "3")]
///     .into_iter()
///     .map(|(k, v)| (k.to_string(), v.to_string()))
///     .collect();
///
/// let merged = merged_config(&base, &explicit);
/// assert_eq!(merged["a"], "1");
/// assert_eq!(merged["b"], "5");
/// assert_eq!(merged["c"], "3");
/// ```
pub fn merged_config(base: &Properties, overrides: &Properties) -> Properties {
    let mut merged = base.clone();
    merged.extend(
        overrides
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    merged
}

/// Merge tag-resolved values into a command's configurations in place.
///
/// For every type in `resolved`, the command's own values for that type are
/// layered on top of the resolved ones. Types only present on the command are
/// not touched.
pub fn merge_configurations(resolved: Configurations, configurations: &mut Configurations) {
    for (config_type, tag_values) in resolved {
        match configurations.entry(config_type) {
            Entry::Occupied(mut entry) => {
                trace!(
                    "Merging {} tag-derived keys under {} explicit keys for {}",
                    tag_values.len(),
                    entry.get().len(),
                    entry.key()
                );
                let merged = merged_config(&tag_values, entry.get());
                *entry.get_mut() = merged;
            }
            Entry::Vacant(entry) => {
                trace!(
                    "Adopting {} tag-derived keys for {}",
                    tag_values.len(),
                    entry.key()
                );
                entry.insert(tag_values);
            }
        }
    }
}
