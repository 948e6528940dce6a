//! Property-based tests for configuration merging.
//!
//! These tests use proptest to generate random configuration maps and verify
//! that the merge invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::command::{ConfigurationAttributes, Configurations, Properties, PropertyAttributes};
    use crate::merge::attributes::{clone_attributes_map, propagate_attributes_with};
    use crate::merge::{merge_configurations, merged_config};
    use proptest::collection::btree_map;
    use proptest::prelude::*;

    fn properties() -> impl Strategy<Value = Properties> {
        btree_map("[a-e]{1,2}", "[0-9]{1,3}", 0..8)
    }

    fn configurations() -> impl Strategy<Value = Configurations> {
        btree_map("(core|hdfs|yarn|zoo)-site", properties(), 0..4)
    }

    fn property_attributes() -> impl Strategy<Value = PropertyAttributes> {
        btree_map(
            "[a-e]{1,2}",
            btree_map("(final|hidden|password)", "(true|false)", 0..3),
            0..5,
        )
    }

    // ============================================================================
    // merged_config property tests
    // ============================================================================

    proptest! {
        /// Property: every explicit value survives the merge unchanged
        #[test]
        fn merged_config_explicit_values_win(base in properties(), explicit in properties()) {
            let merged = merged_config(&base, &explicit);
            for (key, value) in &explicit {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }

        /// Property: base keys absent from the explicit set keep their value
        #[test]
        fn merged_config_keeps_unshadowed_base(base in properties(), explicit in properties()) {
            let merged = merged_config(&base, &explicit);
            for (key, value) in base.iter().filter(|(k, _)| !explicit.contains_key(*k)) {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }

        /// Property: the merged key set is exactly the union of both key sets
        #[test]
        fn merged_config_key_union(base in properties(), explicit in properties()) {
            let merged = merged_config(&base, &explicit);
            let union: std::collections::BTreeSet<_> = base.keys().chain(explicit.keys()).collect();
            prop_assert_eq!(merged.keys().collect::<std::collections::BTreeSet<_>>(), union);
        }
    }

    // ============================================================================
    // merge_configurations property tests
    // ============================================================================

    proptest! {
        /// Property: types the tags do not cover are untouched
        #[test]
        fn merge_configurations_leaves_uncovered_types(
            resolved in configurations(),
            existing in configurations(),
        ) {
            let mut merged = existing.clone();
            merge_configurations(resolved.clone(), &mut merged);
            for (config_type, values) in existing.iter().filter(|(t, _)| !resolved.contains_key(*t)) {
                prop_assert_eq!(merged.get(config_type), Some(values));
            }
        }

        /// Property: merging the same resolved values twice changes nothing more
        #[test]
        fn merge_configurations_is_idempotent(
            resolved in configurations(),
            existing in configurations(),
        ) {
            let mut once = existing;
            merge_configurations(resolved.clone(), &mut once);
            let mut twice = once.clone();
            merge_configurations(resolved, &mut twice);
            prop_assert_eq!(once, twice);
        }

        /// Property: the merge never drops a key the command already had
        #[test]
        fn merge_configurations_never_removes_keys(
            resolved in configurations(),
            existing in configurations(),
        ) {
            let mut merged = existing.clone();
            merge_configurations(resolved, &mut merged);
            for (config_type, values) in &existing {
                for (key, value) in values {
                    prop_assert_eq!(merged[config_type].get(key), Some(value));
                }
            }
        }
    }

    // ============================================================================
    // attribute propagation property tests
    // ============================================================================

    proptest! {
        /// Property: after cloning, every source attribute is in the target
        #[test]
        fn clone_attributes_copies_everything(
            source in property_attributes(),
            target in property_attributes(),
        ) {
            let mut target = target;
            clone_attributes_map(&source, &mut target);
            for (key, attributes) in &source {
                for (name, value) in attributes {
                    prop_assert_eq!(target[key].get(name), Some(value));
                }
            }
        }

        /// Property: propagation creates an entry for every resolved type
        #[test]
        fn propagate_covers_every_resolved_type(
            resolved in btree_map("(core|hdfs)-site", property_attributes(), 0..3),
        ) {
            let mut target = ConfigurationAttributes::new();
            propagate_attributes_with(&resolved, &mut target, clone_attributes_map);
            for config_type in resolved.keys() {
                prop_assert!(target.contains_key(config_type));
            }
        }
    }
}
