// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path navigation over a [`ConfigTree`].
//!
//! Reads and writes both follow `name[i]` indexes into lists. Writes create
//! nested trees as needed and replace any scalar or list they need to descend
//! through by name, but never grow a list.

use crate::domain::config_key::{ConfigKey, PathStep};
use crate::domain::config_value::{ConfigTree, ConfigValue};

/// Looks up the value at `key`, or `None` if any step is missing.
///
/// The root key is handled by the caller since it names the tree itself.
pub fn lookup<'a>(tree: &'a ConfigTree, key: &ConfigKey) -> Option<&'a ConfigValue> {
    let steps = key.steps()?;
    let (first, rest) = steps.split_first()?;

    let mut current = index_into(tree.get(first.name)?, &first.indexes)?;
    for step in rest {
        current = match current {
            ConfigValue::Tree(child) => index_into(child.get(step.name)?, &step.indexes)?,
            _ => return None,
        };
    }
    Some(current)
}

fn index_into<'a>(mut value: &'a ConfigValue, indexes: &[usize]) -> Option<&'a ConfigValue> {
    for &index in indexes {
        value = value.as_list()?.get(index)?;
    }
    Some(value)
}

/// Writes `value` at `key`, creating intermediate trees as needed.
///
/// Any non-tree value found on the way down is replaced by a fresh tree.
/// An indexed step such as `servers[0]` writes into an existing list element;
/// the list is never extended. Returns `false` and leaves `tree` untouched
/// for the root key, a malformed index, or an index with no element behind it.
pub fn set_path(tree: &mut ConfigTree, key: &ConfigKey, value: ConfigValue) -> bool {
    let Some(steps) = key.steps() else {
        return false;
    };
    let Some((last, parents)) = steps.split_last() else {
        return false;
    };

    if steps.iter().all(|step| step.indexes.is_empty()) {
        let mut current = tree;
        for step in parents {
            current = descend(current, step.name);
        }
        current.insert(last.name.to_string(), value);
        return true;
    }

    // Indexed writes can fail halfway down, so they are staged on a copy.
    let mut staged = tree.clone();
    if write_indexed(&mut staged, parents, last, value).is_none() {
        return false;
    }
    *tree = staged;
    true
}

fn write_indexed(
    tree: &mut ConfigTree,
    parents: &[PathStep<'_>],
    last: &PathStep<'_>,
    value: ConfigValue,
) -> Option<()> {
    let mut current = tree;
    for step in parents {
        current = if step.indexes.is_empty() {
            descend(current, step.name)
        } else {
            ensure_tree(index_into_mut(current.get_mut(step.name)?, &step.indexes)?)
        };
    }

    if last.indexes.is_empty() {
        current.insert(last.name.to_string(), value);
    } else {
        *index_into_mut(current.get_mut(last.name)?, &last.indexes)? = value;
    }
    Some(())
}

fn index_into_mut<'a>(
    mut value: &'a mut ConfigValue,
    indexes: &[usize],
) -> Option<&'a mut ConfigValue> {
    for &index in indexes {
        value = match value {
            ConfigValue::List(items) => items.get_mut(index)?,
            _ => return None,
        };
    }
    Some(value)
}

/// Returns the child tree under `segment`, replacing any non-tree value.
pub(crate) fn descend<'a>(tree: &'a mut ConfigTree, segment: &str) -> &'a mut ConfigTree {
    let slot = tree
        .entry(segment.to_string())
        .or_insert_with(|| ConfigValue::Tree(ConfigTree::new()));
    ensure_tree(slot)
}

fn ensure_tree(slot: &mut ConfigValue) -> &mut ConfigTree {
    if !slot.is_tree() {
        *slot = ConfigValue::Tree(ConfigTree::new());
    }
    match slot {
        ConfigValue::Tree(child) => child,
        _ => unreachable!("slot was just replaced with a tree"),
    }
}
