//! Reordering a tree of trees from outer-inner nesting to inner-outer.

use crate::error::TreeError;
use crate::traverse::{flatten, structure};
use crate::treedef::TreeDef;
use crate::value::Value;

/// Turns a tree with structure `outer` whose leaves have structure `inner`
/// into a tree with structure `inner` whose leaves have structure `outer`.
///
/// When `inner` is `None` it is inferred from the tree's first outer leaf
/// slot. The only structural validation is the total leaf count; a tree
/// with the right count but internally inconsistent inner shapes is
/// reassembled without complaint.
pub fn transpose(
    outer: &TreeDef,
    inner: Option<&TreeDef>,
    tree: &Value,
) -> Result<Value, TreeError> {
    let inner = match inner {
        Some(def) => def.clone(),
        None => {
            let slots = outer.flatten_up_to(tree)?;
            let first = slots.first().ok_or_else(|| TreeError::Mismatch {
                expected: "an outer structure with at least one leaf slot".to_owned(),
                got: outer.to_string(),
            })?;
            structure(first)
        }
    };
    let (tree_leaves, tree_def) = flatten(tree);
    let inner_size = inner.num_leaves();
    let outer_size = outer.num_leaves();
    if tree_leaves.len() != inner_size * outer_size {
        return Err(TreeError::Mismatch {
            expected: outer.compose(&inner).to_string(),
            got: tree_def.to_string(),
        });
    }
    // Leaves arrive grouped by outer slot; bucket them by inner slot
    // instead, keeping the outer order within each bucket.
    let mut grid: Vec<Vec<Value>> = (0..inner_size)
        .map(|_| Vec::with_capacity(outer_size))
        .collect();
    for (index, leaf) in tree_leaves.into_iter().enumerate() {
        grid[index % inner_size].push(leaf);
    }
    let rows = grid
        .into_iter()
        .map(|row| outer.unflatten(row))
        .collect::<Result<Vec<Value>, TreeError>>()?;
    inner.unflatten(rows)
}
