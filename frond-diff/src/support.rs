use std::collections::BTreeSet;

use frond_core::{Key, Record, Tuple, Value, all_leaves, all_leaves_with};
use frond_path::child_keys;

pub(crate) type LeafPred<'a> = &'a dyn Fn(&Value) -> bool;

/// Whether `value` is exactly one leaf under the given predicate: no
/// children, no childless-node special case.
pub(crate) fn strict_leaf(value: &Value, is_leaf: Option<LeafPred<'_>>) -> bool {
    match is_leaf {
        Some(pred) => all_leaves_with(core::slice::from_ref(value), pred),
        None => all_leaves(core::slice::from_ref(value)),
    }
}

/// The length of a builtin sequence node, where length disagreements read
/// better than child-count disagreements.
pub(crate) fn seq_len(value: &Value) -> Option<usize> {
    if let Some(list) = value.downcast_ref::<Vec<Value>>() {
        Some(list.len())
    } else if let Some(tuple) = value.downcast_ref::<Tuple>() {
        Some(tuple.len())
    } else if let Some(record) = value.downcast_ref::<Record>() {
        Some(record.values().len())
    } else {
        None
    }
}

/// The symmetric difference of the two child key sets, rendered for a
/// message, when both sides can produce keys.
pub(crate) fn key_set_difference(left: &Value, right: &Value) -> Option<String> {
    let left_keys: BTreeSet<Key> = child_keys(left)?.into_iter().collect();
    let right_keys: BTreeSet<Key> = child_keys(right)?.into_iter().collect();
    let difference: Vec<String> = left_keys
        .symmetric_difference(&right_keys)
        .map(|key| key.to_string())
        .collect();
    if difference.is_empty() {
        None
    } else {
        Some(difference.join(" "))
    }
}

pub(crate) fn child_word(count: usize) -> &'static str {
    if count == 1 { "child" } else { "children" }
}
