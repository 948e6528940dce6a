//! Attribute propagation
//!
//! Property attributes (`final`, password markers and the like) sit in a map
//! parallel to the configuration values. Unlike values, attributes resolved
//! from tags are copied onto the command entry by entry: attributes already on
//! the command survive unless the resolved set defines the same attribute for
//! the same key, in which case the resolved one replaces it.

use crate::command::{ConfigurationAttributes, PropertyAttributes};
use log::trace;

/// Copy every attribute of `source` into `target`.
///
/// Keys missing from `target` are created; attributes defined on both sides
/// take the value from `source`.
pub fn clone_attributes_map(source: &PropertyAttributes, target: &mut PropertyAttributes) {
    for (key, attributes) in source {
        let entry = target.entry(key.clone()).or_default();
        for (name, value) in attributes {
            entry.insert(name.clone(), value.clone());
        }
    }
}

/// Propagate tag-resolved attributes using a caller-supplied clone primitive.
///
/// Every type in `resolved` gets an entry in `target` (empty if it had none),
/// then `clone` copies the resolved attributes into it.
pub fn propagate_attributes_with<F>(
    resolved: &ConfigurationAttributes,
    target: &mut ConfigurationAttributes,
    mut clone: F,
) where
    F: FnMut(&PropertyAttributes, &mut PropertyAttributes),
{
    for (config_type, attributes) in resolved {
        trace!(
            "Propagating attributes of {} keys for {}",
            attributes.len(),
            config_type
        );
        let entry = target.entry(config_type.clone()).or_default();
        clone(attributes, entry);
    }
}
