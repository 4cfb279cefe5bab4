use tracing::debug;

use frond_core::{KeyPath, Value, flatten_one_level, short_type_name};
use frond_path::child_keys;

use crate::support::{LeafPred, key_set_difference, seq_len, strict_leaf};

/// Why a prefix comparison failed at some key path.
#[derive(Clone, Debug)]
pub enum PrefixErrorKind {
    /// The subtree types differ.
    DifferentTypes {
        /// Short name of the prefix subtree's type.
        prefix: String,
        /// Short name of the full subtree's type.
        full: String,
    },
    /// Same sequence type, different lengths.
    DifferentLengths {
        /// Short name of the sequence type.
        type_name: String,
        /// Length on the prefix side.
        prefix_len: usize,
        /// Length on the full side.
        full_len: usize,
    },
    /// Same node type, different child counts.
    DifferentChildCounts {
        /// Short name of the node type.
        type_name: String,
        /// Child count on the prefix side.
        prefix_children: usize,
        /// Child count on the full side.
        full_children: usize,
        /// Rendered symmetric difference of the child key sets, when both
        /// sides can produce keys.
        key_diff: Option<String>,
    },
    /// Same node type and arity, different node metadata.
    DifferentMetadata {
        /// Short name of the node type.
        type_name: String,
        /// Prefix-side metadata, rendered.
        prefix_meta: String,
        /// Full-side metadata, rendered.
        full_meta: String,
    },
}

/// One reason a tree fails to be a structural prefix of another.
///
/// The descriptor is plain data; [`render`](PrefixError::render) produces
/// the final message once the caller knows what the prefix operand is
/// called, so one walk can serve many call sites with different argument
/// names.
#[derive(Clone, Debug)]
pub struct PrefixError {
    /// Where the comparison failed.
    pub path: KeyPath,
    /// What failed there.
    pub kind: PrefixErrorKind,
}

impl PrefixError {
    /// Renders the failure, calling the prefix operand `name`.
    pub fn render(&self, name: &str) -> String {
        let path = &self.path;
        match &self.kind {
            PrefixErrorKind::DifferentTypes { prefix, full } => format!(
                "tree structure error: different types at key path\n\
                 \x20   {name}{path}\n\
                 At that key path, the prefix tree {name} has a subtree of type\n\
                 \x20   {prefix}\n\
                 but at the same key path the full tree has a subtree of a different type,\n\
                 \x20   {full}.",
            ),
            PrefixErrorKind::DifferentLengths {
                type_name,
                prefix_len,
                full_len,
            } => format!(
                "tree structure error: different lengths of {type_name} at key path\n\
                 \x20   {name}{path}\n\
                 At that key path, the prefix tree {name} has a subtree of type {type_name} of \
                 length {prefix_len}, but at the same key path the full tree has a subtree of \
                 the same type but of length {full_len}.",
            ),
            PrefixErrorKind::DifferentChildCounts {
                type_name,
                prefix_children,
                full_children,
                key_diff,
            } => {
                let mut message = format!(
                    "tree structure error: different numbers of tree children at key path\n\
                     \x20   {name}{path}\n\
                     At that key path, the prefix tree {name} has a subtree of type {type_name} \
                     with {prefix_children} children, but at the same key path the full tree has \
                     a subtree of the same type with {full_children} children.",
                );
                if let Some(difference) = key_diff {
                    message.push_str(&format!(
                        "\nThe symmetric difference of the key sets is: {{{difference}}}",
                    ));
                }
                message
            }
            PrefixErrorKind::DifferentMetadata {
                type_name,
                prefix_meta,
                full_meta,
            } => format!(
                "tree structure error: different tree metadata at key path\n\
                 \x20   {name}{path}\n\
                 At that key path, the prefix tree {name} has a subtree of type {type_name} \
                 with metadata\n\
                 \x20   {prefix_meta}\n\
                 but at the same key path the full tree has a subtree of the same type with \
                 different metadata,\n\
                 \x20   {full_meta}.",
            ),
        }
    }
}

/// The reasons `prefix` fails to be a structural prefix of `full`, one
/// entry per divergence point.
///
/// Empty exactly when every leaf position of `prefix` lands on a complete
/// subtree of `full`: a leaf in the prefix stands for whatever subtree the
/// full tree has there, so a lone leaf is a prefix of everything.
pub fn prefix_errors(prefix: &Value, full: &Value) -> Vec<PrefixError> {
    debug!("checking tree prefix structure");
    let mut out = Vec::new();
    walk(&KeyPath::new(), prefix, full, None, &mut out);
    out
}

/// [`prefix_errors`] with a caller predicate that turns matching subtrees
/// into leaves.
///
/// The predicate participates in the top-level comparison only; past the
/// root the walk compares raw structure.
pub fn prefix_errors_with(
    prefix: &Value,
    full: &Value,
    is_leaf: impl Fn(&Value) -> bool,
) -> Vec<PrefixError> {
    debug!("checking tree prefix structure");
    let mut out = Vec::new();
    walk(&KeyPath::new(), prefix, full, Some(&is_leaf), &mut out);
    out
}

fn walk(
    path: &KeyPath,
    prefix: &Value,
    full: &Value,
    is_leaf: Option<LeafPred<'_>>,
    out: &mut Vec<PrefixError>,
) {
    // A leaf in the prefix matches the whole subtree of the full tree.
    if strict_leaf(prefix, is_leaf) {
        return;
    }
    if prefix.type_id() != full.type_id() {
        out.push(PrefixError {
            path: path.clone(),
            kind: PrefixErrorKind::DifferentTypes {
                prefix: short_type_name(prefix.type_name()),
                full: short_type_name(full.type_name()),
            },
        });
        return;
    }
    let (Ok((prefix_children, prefix_aux)), Ok((full_children, full_aux))) =
        (flatten_one_level(prefix), flatten_one_level(full))
    else {
        return;
    };
    if let (Some(prefix_len), Some(full_len)) = (seq_len(prefix), seq_len(full)) {
        if prefix_len != full_len {
            out.push(PrefixError {
                path: path.clone(),
                kind: PrefixErrorKind::DifferentLengths {
                    type_name: short_type_name(prefix.type_name()),
                    prefix_len,
                    full_len,
                },
            });
            return;
        }
    } else if prefix_children.len() != full_children.len() {
        out.push(PrefixError {
            path: path.clone(),
            kind: PrefixErrorKind::DifferentChildCounts {
                type_name: short_type_name(prefix.type_name()),
                prefix_children: prefix_children.len(),
                full_children: full_children.len(),
                key_diff: key_set_difference(prefix, full),
            },
        });
        return;
    }
    if prefix_aux != full_aux {
        out.push(PrefixError {
            path: path.clone(),
            kind: PrefixErrorKind::DifferentMetadata {
                type_name: short_type_name(prefix.type_name()),
                prefix_meta: format!("{prefix_aux:?}"),
                full_meta: format!("{full_aux:?}"),
            },
        });
        return;
    }
    let Some(keys) = child_keys(prefix) else {
        return;
    };
    for (key, (prefix_child, full_child)) in keys
        .into_iter()
        .zip(prefix_children.iter().zip(&full_children))
    {
        walk(&path.with(key), prefix_child, full_child, None, out);
    }
}
