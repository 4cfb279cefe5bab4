#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

use std::sync::Arc;

use frond_core::{
    Aux, Key, KeyPath, Record, RecordMeta, TreeDef, TreeError, Value, decompose_one_level,
    decompose_one_level_keyed, structure, structure_with,
};

type LeafPred<'a> = &'a dyn Fn(&Value) -> bool;

/// The key paths and leaves of a tree, in flatten order.
///
/// The walk visits the same leaves as [`frond_core::flatten`], so the
/// `n`-th pair here describes the `n`-th leaf there.
pub fn key_paths(tree: &Value) -> Vec<(KeyPath, Value)> {
    let mut out = Vec::new();
    walk(&KeyPath::new(), tree, None, &mut out);
    out
}

/// [`key_paths`] with a caller predicate that turns matching subtrees into
/// leaves.
pub fn key_paths_with(
    tree: &Value,
    is_leaf: impl Fn(&Value) -> bool,
) -> Vec<(KeyPath, Value)> {
    let mut out = Vec::new();
    walk(&KeyPath::new(), tree, Some(&is_leaf), &mut out);
    out
}

/// Key-path flavored flatten: the keyed leaves plus the tree structure.
pub fn flatten_with_paths(tree: &Value) -> (Vec<(KeyPath, Value)>, TreeDef) {
    (key_paths(tree), structure(tree))
}

/// [`flatten_with_paths`] with a caller leaf predicate.
pub fn flatten_with_paths_with(
    tree: &Value,
    is_leaf: impl Fn(&Value) -> bool,
) -> (Vec<(KeyPath, Value)>, TreeDef) {
    (
        key_paths_with(tree, &is_leaf),
        structure_with(tree, &is_leaf),
    )
}

/// Applies `f` to every leaf together with its key path, rebuilding the
/// same structure around the results.
pub fn tree_map_with_path(
    mut f: impl FnMut(&KeyPath, &Value) -> Value,
    tree: &Value,
) -> Result<Value, TreeError> {
    let (pairs, def) = flatten_with_paths(tree);
    let mapped: Vec<Value> = pairs.iter().map(|(path, leaf)| f(path, leaf)).collect();
    def.unflatten(mapped)
}

/// [`tree_map_with_path`] with a caller leaf predicate.
pub fn tree_map_with_path_with(
    mut f: impl FnMut(&KeyPath, &Value) -> Value,
    tree: &Value,
    is_leaf: impl Fn(&Value) -> bool,
) -> Result<Value, TreeError> {
    let (pairs, def) = flatten_with_paths_with(tree, is_leaf);
    let mapped: Vec<Value> = pairs.iter().map(|(path, leaf)| f(path, leaf)).collect();
    def.unflatten(mapped)
}

/// The keys addressing each child of `value`: registered keys when the
/// type supplies them, field names for records, flat indices otherwise.
/// `None` when `value` is a leaf.
pub fn child_keys(value: &Value) -> Option<Vec<Key>> {
    if let Some((pairs, _)) = decompose_one_level_keyed(value) {
        return Some(pairs.into_iter().map(|(key, _)| key).collect());
    }
    if let Some(record) = value.downcast_ref::<Record>() {
        return Some(
            record
                .fields()
                .iter()
                .map(|field| Key::Attr(field.clone()))
                .collect(),
        );
    }
    let (children, _) = decompose_one_level(value)?;
    Some((0..children.len()).map(Key::Flat).collect())
}

fn walk(
    path: &KeyPath,
    tree: &Value,
    is_leaf: Option<LeafPred<'_>>,
    out: &mut Vec<(KeyPath, Value)>,
) {
    if let Some(pred) = is_leaf {
        if pred(tree) {
            out.push((path.clone(), tree.clone()));
            return;
        }
    }
    if let Some((pairs, _)) = decompose_one_level_keyed(tree) {
        for (key, child) in pairs {
            walk(&path.with(key), &child, is_leaf, out);
        }
        return;
    }
    let Some((children, aux)) = decompose_one_level(tree) else {
        out.push((path.clone(), tree.clone()));
        return;
    };
    // A record addressed by its own shape gets field-name keys; any other
    // keyless node falls back to positional keys.
    if let Some(record) = record_with_own_meta(tree, &aux) {
        for (field, child) in record.fields().iter().zip(&children) {
            walk(&path.with(Key::Attr(field.clone())), child, is_leaf, out);
        }
    } else {
        for (index, child) in children.iter().enumerate() {
            walk(&path.with(Key::Flat(index)), child, is_leaf, out);
        }
    }
}

fn record_with_own_meta<'a>(tree: &'a Value, aux: &Aux) -> Option<&'a Record> {
    let record = tree.downcast_ref::<Record>()?;
    let meta = aux.downcast_ref::<Arc<RecordMeta>>()?;
    (meta == record.meta()).then_some(record)
}
