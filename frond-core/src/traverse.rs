//! Flattening, rebuilding, and mapping over trees.
//!
//! Traversals are synchronous and recursive; stack depth follows the
//! nesting depth of the tree.

use crate::builtins::Absent;
use crate::error::TreeError;
use crate::registry::{self, LeafPolicy};
use crate::treedef::{TreeDef, TypeTag};
use crate::value::Value;

type LeafPred<'a> = &'a dyn Fn(&Value) -> bool;

fn flatten_into(
    policy: LeafPolicy,
    tree: &Value,
    is_leaf: Option<LeafPred<'_>>,
    leaves: &mut Vec<Value>,
) -> TreeDef {
    // The caller predicate outranks the registry: a match is a leaf even
    // if the type has a node handler.
    if let Some(pred) = is_leaf {
        if pred(tree) {
            leaves.push(tree.clone());
            return TreeDef::leaf();
        }
    }
    let Some(entry) = registry::node_entry(policy, tree.type_id()) else {
        leaves.push(tree.clone());
        return TreeDef::leaf();
    };
    let (children, aux) = (entry.decompose)(tree);
    let child_defs = children
        .iter()
        .map(|child| flatten_into(policy, child, is_leaf, leaves))
        .collect();
    TreeDef::node(TypeTag::new(tree.type_id(), tree.type_name()), aux, child_defs)
}

/// Flattens a tree depth-first, left to right.
///
/// Returns the leaves in traversal order together with the structure
/// needed to rebuild the tree from a same-length leaf sequence.
///
/// ```
/// use frond_core::{Value, flatten};
///
/// let tree = Value::list([Value::new(1i64), Value::new(2i64)]);
/// let (leaves, def) = flatten(&tree);
/// assert_eq!(leaves.len(), 2);
/// assert_eq!(def.to_string(), "TreeDef([*, *])");
/// ```
pub fn flatten(tree: &Value) -> (Vec<Value>, TreeDef) {
    flatten_in(LeafPolicy::Standard, tree)
}

/// [`flatten`] with a caller predicate that turns matching subtrees into
/// leaves. The predicate is consulted before the registry at every node.
pub fn flatten_with(tree: &Value, is_leaf: impl Fn(&Value) -> bool) -> (Vec<Value>, TreeDef) {
    flatten_in_with(LeafPolicy::Standard, tree, is_leaf)
}

/// [`flatten`] under an explicit leaf policy.
pub fn flatten_in(policy: LeafPolicy, tree: &Value) -> (Vec<Value>, TreeDef) {
    let mut leaves = Vec::new();
    let def = flatten_into(policy, tree, None, &mut leaves);
    (leaves, def)
}

/// [`flatten_with`] under an explicit leaf policy.
pub fn flatten_in_with(
    policy: LeafPolicy,
    tree: &Value,
    is_leaf: impl Fn(&Value) -> bool,
) -> (Vec<Value>, TreeDef) {
    let mut leaves = Vec::new();
    let def = flatten_into(policy, tree, Some(&is_leaf), &mut leaves);
    (leaves, def)
}

/// The leaves of a tree in traversal order.
pub fn leaves(tree: &Value) -> Vec<Value> {
    flatten(tree).0
}

/// [`leaves`] with a caller leaf predicate.
pub fn leaves_with(tree: &Value, is_leaf: impl Fn(&Value) -> bool) -> Vec<Value> {
    flatten_with(tree, is_leaf).0
}

/// The structure of a tree with the leaves erased.
pub fn structure(tree: &Value) -> TreeDef {
    flatten(tree).1
}

/// [`structure`] with a caller leaf predicate.
pub fn structure_with(tree: &Value, is_leaf: impl Fn(&Value) -> bool) -> TreeDef {
    flatten_with(tree, is_leaf).1
}

/// Rebuilds a tree from a structure and a flat leaf sequence. See
/// [`TreeDef::unflatten`].
pub fn unflatten(
    def: &TreeDef,
    leaves: impl IntoIterator<Item = Value>,
) -> Result<Value, TreeError> {
    def.unflatten(leaves)
}

fn map_impl(
    policy: LeafPolicy,
    tree: &Value,
    is_leaf: Option<LeafPred<'_>>,
    f: &mut dyn FnMut(&Value) -> Value,
) -> Value {
    if let Some(pred) = is_leaf {
        if pred(tree) {
            return f(tree);
        }
    }
    let Some(entry) = registry::node_entry(policy, tree.type_id()) else {
        return f(tree);
    };
    let (children, aux) = (entry.decompose)(tree);
    let mapped = children
        .iter()
        .map(|child| map_impl(policy, child, is_leaf, f))
        .collect();
    (entry.recompose)(&aux, mapped)
}

/// Applies `f` to every leaf, rebuilding the same structure around the
/// results.
pub fn tree_map(mut f: impl FnMut(&Value) -> Value, tree: &Value) -> Value {
    map_impl(LeafPolicy::Standard, tree, None, &mut f)
}

/// [`tree_map`] with a caller leaf predicate.
pub fn tree_map_with(
    mut f: impl FnMut(&Value) -> Value,
    tree: &Value,
    is_leaf: impl Fn(&Value) -> bool,
) -> Value {
    map_impl(LeafPolicy::Standard, tree, Some(&is_leaf), &mut f)
}

/// Applies `f` across a primary tree and companion trees of matching
/// structure.
///
/// Each call receives the primary leaf first, then one value per
/// companion. Companions are decomposed only as far as the primary
/// structure requires and may be deeper at the primary's leaf positions;
/// diverging earlier is a structure mismatch.
pub fn tree_map_many(
    f: impl FnMut(&[Value]) -> Value,
    tree: &Value,
    rest: &[Value],
) -> Result<Value, TreeError> {
    let (leaves, def) = flatten(tree);
    map_many_impl(f, &def, leaves, rest)
}

/// [`tree_map_many`] with a caller leaf predicate applied to the primary
/// tree.
pub fn tree_map_many_with(
    f: impl FnMut(&[Value]) -> Value,
    tree: &Value,
    rest: &[Value],
    is_leaf: impl Fn(&Value) -> bool,
) -> Result<Value, TreeError> {
    let (leaves, def) = flatten_with(tree, is_leaf);
    map_many_impl(f, &def, leaves, rest)
}

fn map_many_impl(
    mut f: impl FnMut(&[Value]) -> Value,
    def: &TreeDef,
    leaves: Vec<Value>,
    rest: &[Value],
) -> Result<Value, TreeError> {
    let mut columns = Vec::with_capacity(rest.len());
    for companion in rest {
        columns.push(def.flatten_up_to(companion)?);
    }
    let mut row = Vec::with_capacity(1 + rest.len());
    let mapped: Vec<Value> = leaves
        .iter()
        .enumerate()
        .map(|(index, leaf)| {
            row.clear();
            row.push(leaf.clone());
            for column in &columns {
                row.push(column[index].clone());
            }
            f(&row)
        })
        .collect();
    def.unflatten(mapped)
}

/// Left fold over the leaves with the first leaf as the initial
/// accumulator; `None` for a tree with no leaves.
pub fn tree_reduce(mut f: impl FnMut(Value, &Value) -> Value, tree: &Value) -> Option<Value> {
    leaves(tree).into_iter().reduce(|acc, leaf| f(acc, &leaf))
}

/// Left fold over the leaves with an explicit initial accumulator.
pub fn tree_fold<A>(f: impl FnMut(A, &Value) -> A, init: A, tree: &Value) -> A {
    leaves(tree).iter().fold(init, f)
}

/// Whether `pred` holds for every leaf. Vacuously true for a tree with no
/// leaves.
pub fn tree_all(mut pred: impl FnMut(&Value) -> bool, tree: &Value) -> bool {
    leaves(tree).iter().all(|leaf| pred(leaf))
}

/// Whether every given value is a leaf.
pub fn all_leaves(values: &[Value]) -> bool {
    values
        .iter()
        .all(|value| registry::node_entry(LeafPolicy::Standard, value.type_id()).is_none())
}

/// [`all_leaves`] with a caller leaf predicate.
pub fn all_leaves_with(values: &[Value], is_leaf: impl Fn(&Value) -> bool) -> bool {
    values.iter().all(|value| {
        is_leaf(value) || registry::node_entry(LeafPolicy::Standard, value.type_id()).is_none()
    })
}

/// Replaces every absent marker with `sentinel`, leaving other leaves
/// untouched.
pub fn replace_absents(sentinel: &Value, tree: &Value) -> Value {
    let mut swap = |leaf: &Value| {
        if leaf.is::<Absent>() {
            sentinel.clone()
        } else {
            leaf.clone()
        }
    };
    map_impl(LeafPolicy::AbsentLeaf, tree, None, &mut swap)
}

/// Repeats each leaf of `prefix` once per leaf of the corresponding
/// subtree of `full`, in traversal order.
///
/// `prefix` must be a structural prefix of `full`; the companion-tree
/// machinery reports the divergence otherwise.
pub fn broadcast_prefix(prefix: &Value, full: &Value) -> Result<Vec<Value>, TreeError> {
    let mut out = Vec::new();
    tree_map_many(
        |row| {
            let copies = leaves(&row[1]).len();
            out.extend(std::iter::repeat_n(row[0].clone(), copies));
            row[0].clone()
        },
        prefix,
        std::slice::from_ref(full),
    )?;
    Ok(out)
}

/// [`broadcast_prefix`] with a caller leaf predicate applied to the
/// prefix.
pub fn broadcast_prefix_with(
    prefix: &Value,
    full: &Value,
    is_leaf: impl Fn(&Value) -> bool,
) -> Result<Vec<Value>, TreeError> {
    let mut out = Vec::new();
    tree_map_many_with(
        |row| {
            let copies = leaves(&row[1]).len();
            out.extend(std::iter::repeat_n(row[0].clone(), copies));
            row[0].clone()
        },
        prefix,
        std::slice::from_ref(full),
        is_leaf,
    )?;
    Ok(out)
}
