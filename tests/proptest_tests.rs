// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests using proptest.
//!
//! These tests check the merge and diff laws and the value coercions against
//! arbitrary trees and inputs.

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use tierconf::domain::duration::{format_duration, parse_duration};
use tierconf::domain::tree::lookup;
use tierconf::domain::{diff, merge, ConfigKey, ConfigTree, ConfigValue, ValueView};

fn leaf() -> impl Strategy<Value = ConfigValue> {
    prop_oneof![
        any::<i64>().prop_map(ConfigValue::Int),
        "[a-z]{0,6}".prop_map(ConfigValue::String),
        any::<bool>().prop_map(ConfigValue::Bool),
    ]
}

fn value() -> impl Strategy<Value = ConfigValue> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-c]{1,2}", inner, 0..4).prop_map(ConfigValue::Tree)
    })
}

fn config_tree() -> impl Strategy<Value = ConfigTree> {
    prop::collection::btree_map("[a-c]{1,2}", value(), 0..5)
}

/// Collects every non-tree value with its dotted path.
fn leaves(tree: &ConfigTree, prefix: &ConfigKey, out: &mut Vec<(ConfigKey, ConfigValue)>) {
    for (name, value) in tree {
        let key = prefix.child(name);
        match value {
            ConfigValue::Tree(child) => leaves(child, &key, out),
            other => out.push((key, other.clone())),
        }
    }
}

// The higher priority tree wins on every leaf it defines
proptest! {
    #[test]
    fn test_merge_last_tree_wins(low in config_tree(), high in config_tree()) {
        let merged = merge([low, high.clone()]);

        let mut high_leaves = Vec::new();
        leaves(&high, &ConfigKey::root(), &mut high_leaves);
        for (key, expected) in high_leaves {
            prop_assert_eq!(lookup(&merged, &key), Some(&expected));
        }
    }
}

// Leaves of the lower tree survive unless the higher tree shadows their path
proptest! {
    #[test]
    fn test_merge_keeps_unshadowed_leaves(low in config_tree(), high in config_tree()) {
        let merged = merge([low.clone(), high.clone()]);

        let mut low_leaves = Vec::new();
        leaves(&low, &ConfigKey::root(), &mut low_leaves);
        for (key, expected) in low_leaves {
            let shadowed = key
                .as_str()
                .match_indices('.')
                .map(|(i, _)| &key.as_str()[..i])
                .chain(std::iter::once(key.as_str()))
                .any(|prefix| matches!(lookup(&high, &ConfigKey::from(prefix)), Some(v) if !v.is_tree()))
                || lookup(&high, &key).is_some();
            if !shadowed {
                prop_assert_eq!(lookup(&merged, &key), Some(&expected));
            }
        }
    }
}

proptest! {
    #[test]
    fn test_merge_is_idempotent(tree in config_tree()) {
        prop_assert_eq!(merge([tree.clone()]), tree.clone());
        prop_assert_eq!(merge([tree.clone(), tree.clone()]), tree);
    }
}

proptest! {
    #[test]
    fn test_diff_empty_iff_equal(old in config_tree(), new in config_tree()) {
        prop_assert!(diff(&old, &old).is_empty());
        prop_assert_eq!(diff(&old, &new).is_empty(), old == new);
    }
}

// Every reported change agrees with the new tree
proptest! {
    #[test]
    fn test_diff_reports_new_values(old in config_tree(), new in config_tree()) {
        for (key, change) in &diff(&old, &new) {
            match change {
                Some(value) => {
                    prop_assert_eq!(lookup(&new, key), Some(value));
                }
                None => {
                    prop_assert!(lookup(&new, key).is_none());
                    prop_assert!(lookup(&old, key).is_some());
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn test_int_coercions(n in any::<i64>()) {
        let view = ValueView::new("n", Some(ConfigValue::Int(n)));
        prop_assert_eq!(view.as_int(), n);
        prop_assert_eq!(view.as_string(), n.to_string());
        prop_assert_eq!(view.as_bool(), n != 0);

        let text = ValueView::new("n", Some(ConfigValue::from(n.to_string())));
        prop_assert_eq!(text.as_int(), n);
    }
}

proptest! {
    #[test]
    fn test_unparseable_strings_fall_back(s in "[g-hj-mo-z][a-z]{0,8}") {
        let view = ValueView::new("s", Some(ConfigValue::from(s.clone())));
        prop_assert_eq!(view.as_int_or(-1), -1);
        prop_assert_eq!(view.as_float_or(-1.0), -1.0);
        prop_assert_eq!(view.as_duration_or(Duration::from_secs(9)), Duration::from_secs(9));
        if !matches!(s.as_str(), "t" | "true" | "y" | "yes") {
            prop_assert!(view.as_bool_or(true));
            prop_assert!(!view.as_bool_or(false));
        }
    }
}

proptest! {
    #[test]
    fn test_duration_literal_roundtrip(nanos in 0u64..=u64::MAX / 2) {
        let duration = Duration::from_nanos(nanos);
        prop_assert_eq!(parse_duration(&format_duration(duration)), Some(duration));
    }
}

// Underscore separated variable names nest one level per segment
#[cfg(feature = "env")]
proptest! {
    #[test]
    fn test_env_names_nest(segments in prop::collection::vec("[A-Z]{1,5}", 1..4), n in any::<i32>()) {
        use tierconf::adapters::EnvVarAdapter;
        use tierconf::ports::ConfigSource;

        let name = format!("APP_{}", segments.join("_"));
        let values = HashMap::from([(name, n.to_string())]);
        let tree = EnvVarAdapter::with_prefix("APP_").with_values(values).load().unwrap();

        let path = segments.join(".").to_lowercase();
        let expected = match n {
            0 => ConfigValue::Bool(false),
            1 => ConfigValue::Bool(true),
            _ => ConfigValue::Int(i64::from(n)),
        };
        prop_assert_eq!(lookup(&tree, &ConfigKey::from(path)), Some(&expected));
    }
}

#[cfg(feature = "dotenv")]
proptest! {
    #[test]
    fn test_dotenv_keys_become_dotted(key in "[A-Z][A-Z_]{0,10}", value in "[a-z ]{0,10}") {
        use tierconf::adapters::DotenvParser;
        use tierconf::ports::ConfigParser;

        let tree = DotenvParser::new().parse(&format!("{}=\"{}\"\n", key, value)).unwrap();
        let dotted = key.to_lowercase().replace('_', ".");
        let expected = match value.as_str() {
            "true" => ConfigValue::Bool(true),
            "false" => ConfigValue::Bool(false),
            text => ConfigValue::from(text),
        };
        prop_assert_eq!(tree.get(&dotted), Some(&expected));
    }
}
