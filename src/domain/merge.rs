// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merge engine folding prioritized source trees into one tree.
//!
//! Trees are folded in the order given, so callers pass them in ascending
//! priority and the last tree wins on conflicting leaves:
//!
//! - tree onto tree merges recursively, keeping keys present on one side only;
//! - anything else (scalar, list, tree vs. non-tree) is replaced wholesale.
//!
//! Lists are never merged element-wise. Dotted keys inside an incoming tree
//! (as produced by the dotenv source) are expanded into nesting while folding,
//! so `{"a.b": 1}` and `{a: {b: 1}}` merge identically.

use crate::domain::config_value::{ConfigTree, ConfigValue};
use crate::domain::tree::descend;

/// Folds `trees` left to right into a fresh tree.
///
/// # Examples
///
/// ```
/// use tierconf::domain::{merge, ConfigTree, ConfigValue};
///
/// let mut low = ConfigTree::new();
/// low.insert("a".into(), ConfigValue::tree([("x", 1)]));
/// let mut high = ConfigTree::new();
/// high.insert("a".into(), ConfigValue::tree([("y", 2)]));
///
/// let merged = merge([low, high]);
/// assert_eq!(merged["a"], ConfigValue::tree([("x", 1), ("y", 2)]));
/// ```
pub fn merge<I>(trees: I) -> ConfigTree
where
    I: IntoIterator<Item = ConfigTree>,
{
    let mut acc = ConfigTree::new();
    for tree in trees {
        merge_into(&mut acc, tree);
    }
    acc
}

/// Folds one incoming tree onto the accumulator.
pub fn merge_into(acc: &mut ConfigTree, incoming: ConfigTree) {
    for (key, value) in incoming {
        let segments: Vec<&str> = key.split('.').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            tracing::debug!("Skipping empty configuration key during merge");
            continue;
        };

        let mut target = &mut *acc;
        for segment in parents {
            target = descend(target, segment);
        }
        merge_value(target, last, value);
    }
}

fn merge_value(target: &mut ConfigTree, key: &str, incoming: ConfigValue) {
    match incoming {
        ConfigValue::Tree(child) => {
            // A tree replaces a non-tree wholesale; `descend` starts it empty.
            let slot = descend(target, key);
            merge_into(slot, child);
        }
        other => {
            target.insert(key.to_string(), other);
        }
    }
}

/// Returns a copy of `tree` with every dotted key expanded into nesting.
pub fn normalize(tree: ConfigTree) -> ConfigTree {
    merge([tree])
}
