use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::aux::Aux;
use crate::builtins::{Absent, Record, RecordMeta, Tuple};
use crate::error::TreeError;
use crate::key::MapKey;
use crate::registry;
use crate::value::{Value, short_type_name};

/// Identity of a node type inside a treedef: a `TypeId` plus the type's
/// name for diagnostics. Equality and hashing use only the id.
#[derive(Clone, Copy, Debug)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// The tag for `T`.
    pub fn of<T: Any>() -> Self {
        TypeTag {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    pub(crate) fn new(id: TypeId, name: &'static str) -> Self {
        TypeTag { id, name }
    }

    /// The tagged `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The tagged type's full name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(PartialEq, Eq, Hash)]
enum DefNode {
    Leaf,
    Node {
        tag: TypeTag,
        aux: Aux,
        children: Vec<TreeDef>,
        num_leaves: usize,
        num_nodes: usize,
    },
}

/// The structure of a tree with the leaves erased.
///
/// Treedefs are immutable, cheap to clone, and usable as map keys: two
/// trees with the same nesting, node types, and node metadata produce
/// equal treedefs no matter what leaves they hold.
#[derive(Clone)]
pub struct TreeDef(Arc<DefNode>);

impl TreeDef {
    /// The treedef of a single leaf.
    pub fn leaf() -> Self {
        TreeDef(Arc::new(DefNode::Leaf))
    }

    pub(crate) fn node(tag: TypeTag, aux: Aux, children: Vec<TreeDef>) -> Self {
        let num_leaves = children.iter().map(TreeDef::num_leaves).sum::<usize>();
        let num_nodes = 1 + children.iter().map(TreeDef::num_nodes).sum::<usize>();
        TreeDef(Arc::new(DefNode::Node {
            tag,
            aux,
            children,
            num_leaves,
            num_nodes,
        }))
    }

    /// A treedef whose root is a tuple node over `children`.
    pub fn tuple(children: impl IntoIterator<Item = TreeDef>) -> Self {
        TreeDef::node(
            TypeTag::of::<Tuple>(),
            Aux::unit(),
            children.into_iter().collect(),
        )
    }

    /// Number of leaves this structure accounts for.
    pub fn num_leaves(&self) -> usize {
        match &*self.0 {
            DefNode::Leaf => 1,
            DefNode::Node { num_leaves, .. } => *num_leaves,
        }
    }

    /// Number of nodes, counting leaves and the root itself.
    pub fn num_nodes(&self) -> usize {
        match &*self.0 {
            DefNode::Leaf => 1,
            DefNode::Node { num_nodes, .. } => *num_nodes,
        }
    }

    /// Whether the root is the only node. True for a leaf, but also for a
    /// childless node such as an empty list.
    pub fn is_leaf(&self) -> bool {
        self.num_nodes() == 1
    }

    /// Whether this is exactly one leaf and nothing else.
    pub fn is_strict_leaf(&self) -> bool {
        self.num_nodes() == 1 && self.num_leaves() == 1
    }

    /// The treedefs of the root's children; empty for a leaf.
    pub fn children(&self) -> Vec<TreeDef> {
        match &*self.0 {
            DefNode::Leaf => Vec::new(),
            DefNode::Node { children, .. } => children.clone(),
        }
    }

    pub(crate) fn node_parts(&self) -> Option<(&TypeTag, &Aux, &[TreeDef])> {
        match &*self.0 {
            DefNode::Leaf => None,
            DefNode::Node {
                tag, aux, children, ..
            } => Some((tag, aux, children)),
        }
    }

    /// Rebuilds a tree from this structure and a flat leaf sequence.
    ///
    /// The sequence must supply exactly [`num_leaves`](Self::num_leaves)
    /// values, in the order a flatten of the original tree produced them.
    pub fn unflatten(&self, leaves: impl IntoIterator<Item = Value>) -> Result<Value, TreeError> {
        let leaves: Vec<Value> = leaves.into_iter().collect();
        let expected = self.num_leaves();
        if leaves.len() != expected {
            return Err(TreeError::LeafCount {
                expected,
                got: leaves.len(),
            });
        }
        self.build(&leaves)
    }

    fn build(&self, leaves: &[Value]) -> Result<Value, TreeError> {
        match &*self.0 {
            DefNode::Leaf => Ok(leaves[0].clone()),
            DefNode::Node {
                tag, aux, children, ..
            } => {
                let mut rebuilt = Vec::with_capacity(children.len());
                let mut rest = leaves;
                for child in children {
                    let (taken, remainder) = rest.split_at(child.num_leaves());
                    rebuilt.push(child.build(taken)?);
                    rest = remainder;
                }
                let entry = registry::entry_by_id(tag.id()).ok_or(TreeError::Unflattenable {
                    type_name: tag.name(),
                })?;
                Ok((entry.recompose)(aux, rebuilt))
            }
        }
    }

    /// Flattens `tree` only as far as this structure requires, returning
    /// one value per leaf slot.
    ///
    /// `tree` may be deeper than this structure, in which case each slot
    /// receives the whole remaining subtree, but it must not diverge from
    /// the structure earlier.
    pub fn flatten_up_to(&self, tree: &Value) -> Result<Vec<Value>, TreeError> {
        let mut slots = Vec::with_capacity(self.num_leaves());
        self.expand(tree, &mut slots)?;
        Ok(slots)
    }

    fn expand(&self, tree: &Value, slots: &mut Vec<Value>) -> Result<(), TreeError> {
        let (tag, aux, children) = match self.node_parts() {
            None => {
                slots.push(tree.clone());
                return Ok(());
            }
            Some(parts) => parts,
        };
        if tree.type_id() != tag.id() {
            return Err(TreeError::Mismatch {
                expected: short_type_name(tag.name()),
                got: short_type_name(tree.type_name()),
            });
        }
        let entry = registry::entry_by_id(tag.id()).ok_or(TreeError::Unflattenable {
            type_name: tag.name(),
        })?;
        let (tree_children, tree_aux) = (entry.decompose)(tree);
        // Metadata before arity: for mappings this reports the differing
        // key sets instead of a bare count.
        if tree_aux != *aux {
            return Err(TreeError::Mismatch {
                expected: format!("{} with metadata {aux:?}", short_type_name(tag.name())),
                got: format!("metadata {tree_aux:?}"),
            });
        }
        if tree_children.len() != children.len() {
            return Err(TreeError::Mismatch {
                expected: format!(
                    "{} with {} children",
                    short_type_name(tag.name()),
                    children.len(),
                ),
                got: format!("{} children", tree_children.len()),
            });
        }
        for (child_def, child) in children.iter().zip(&tree_children) {
            child_def.expand(child, slots)?;
        }
        Ok(())
    }

    /// Replaces every leaf of `self` with a copy of `inner`.
    pub fn compose(&self, inner: &TreeDef) -> TreeDef {
        match &*self.0 {
            DefNode::Leaf => inner.clone(),
            DefNode::Node {
                tag, aux, children, ..
            } => {
                let composed = children.iter().map(|child| child.compose(inner)).collect();
                TreeDef::node(*tag, aux.clone(), composed)
            }
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (tag, aux, children) = match self.node_parts() {
            None => return write!(f, "*"),
            Some(parts) => parts,
        };
        let id = tag.id();
        if id == TypeId::of::<Vec<Value>>() {
            write!(f, "[")?;
            fmt_children(f, children)?;
            write!(f, "]")
        } else if id == TypeId::of::<Tuple>() {
            write!(f, "(")?;
            fmt_children(f, children)?;
            if children.len() == 1 {
                write!(f, ",")?;
            }
            write!(f, ")")
        } else if id == TypeId::of::<Absent>() {
            write!(f, "Absent")
        } else if id == TypeId::of::<HashMap<MapKey, Value>>() {
            fmt_map(f, aux, children, "", "")
        } else if id == TypeId::of::<BTreeMap<MapKey, Value>>() {
            fmt_map(f, aux, children, "BTreeMap(", ")")
        } else if id == TypeId::of::<IndexMap<MapKey, Value>>() {
            fmt_map(f, aux, children, "IndexMap(", ")")
        } else if let Some(meta) = record_meta(id, aux) {
            write!(f, "{}(", meta.name())?;
            for (index, (field, child)) in meta.fields().iter().zip(children).enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{field}=")?;
                child.fmt_node(f)?;
            }
            write!(f, ")")
        } else {
            write!(f, "CustomNode({}[{aux:?}], [", short_type_name(tag.name()))?;
            fmt_children(f, children)?;
            write!(f, "])")
        }
    }
}

fn record_meta<'a>(id: TypeId, aux: &'a Aux) -> Option<&'a Arc<RecordMeta>> {
    if id != TypeId::of::<Record>() {
        return None;
    }
    aux.downcast_ref::<Arc<RecordMeta>>()
}

fn fmt_children(f: &mut fmt::Formatter<'_>, children: &[TreeDef]) -> fmt::Result {
    for (index, child) in children.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        child.fmt_node(f)?;
    }
    Ok(())
}

fn fmt_map(
    f: &mut fmt::Formatter<'_>,
    aux: &Aux,
    children: &[TreeDef],
    open: &str,
    close: &str,
) -> fmt::Result {
    write!(f, "{open}{{")?;
    if let Some(keys) = aux.downcast_ref::<Vec<MapKey>>() {
        for (index, (key, child)) in keys.iter().zip(children).enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: ")?;
            child.fmt_node(f)?;
        }
    }
    write!(f, "}}{close}")
}

impl PartialEq for TreeDef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for TreeDef {}

impl Hash for TreeDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for TreeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeDef(")?;
        self.fmt_node(f)?;
        write!(f, ")")
    }
}

impl fmt::Debug for TreeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
