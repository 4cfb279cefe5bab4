//! The process-wide table of node handlers.
//!
//! One table keyed by `TypeId` backs every traversal. Which entries are
//! visible to a given walk is controlled by [`LeafPolicy`], not by separate
//! tables, so a type registered once behaves consistently everywhere.
//!
//! Lookups clone an `Arc` under a short read lock and never hold the lock
//! while running handler closures, so handlers are free to flatten other
//! trees or register further types.

use core::any::{Any, TypeId};
use core::fmt;
use core::hash::Hash;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::aux::{Aux, AuxData};
use crate::builtins::{self, Absent};
use crate::error::TreeError;
use crate::key::Key;
use crate::value::Value;

pub(crate) type DecomposeFn = Box<dyn Fn(&Value) -> (Vec<Value>, Aux) + Send + Sync>;
pub(crate) type RecomposeFn = Box<dyn Fn(&Aux, Vec<Value>) -> Value + Send + Sync>;
pub(crate) type DecomposeKeyedFn = Box<dyn Fn(&Value) -> (Vec<(Key, Value)>, Aux) + Send + Sync>;

/// A registered node handler: how to take one structural step through a
/// type and how to rebuild it afterwards.
pub(crate) struct NodeEntry {
    pub(crate) name: &'static str,
    pub(crate) decompose: DecomposeFn,
    pub(crate) recompose: RecomposeFn,
    pub(crate) decompose_keyed: Option<DecomposeKeyedFn>,
    pub(crate) internal: bool,
}

static REGISTRY: OnceLock<RwLock<HashMap<TypeId, Arc<NodeEntry>>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<TypeId, Arc<NodeEntry>>> {
    REGISTRY.get_or_init(|| {
        debug!("seeding builtin node handlers");
        RwLock::new(builtins::builtin_entries())
    })
}

/// Controls which values count as leaves during a traversal.
///
/// The table of node handlers is shared; a policy only changes its view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LeafPolicy {
    /// The absent marker is a childless node and dispatch-only entries are
    /// hidden.
    #[default]
    Standard,
    /// The absent marker is an ordinary leaf.
    AbsentLeaf,
    /// Like [`Standard`](LeafPolicy::Standard), with dispatch-only entries
    /// visible.
    Dispatch,
}

pub(crate) fn node_entry(policy: LeafPolicy, type_id: TypeId) -> Option<Arc<NodeEntry>> {
    if policy == LeafPolicy::AbsentLeaf && type_id == TypeId::of::<Absent>() {
        return None;
    }
    let entry = registry().read().get(&type_id)?.clone();
    if entry.internal && policy != LeafPolicy::Dispatch {
        return None;
    }
    Some(entry)
}

/// Lookup that ignores policy and visibility. Reconstruction goes through
/// here: a treedef that names a type must rebuild it no matter which view
/// produced the treedef.
pub(crate) fn entry_by_id(type_id: TypeId) -> Option<Arc<NodeEntry>> {
    registry().read().get(&type_id).cloned()
}

fn erase_recompose<T, A>(
    recompose: impl Fn(&A, Vec<Value>) -> T + Send + Sync + 'static,
) -> RecomposeFn
where
    T: Any + Send + Sync,
    A: AuxData,
{
    Box::new(move |aux: &Aux, children: Vec<Value>| {
        let aux = aux
            .downcast_ref::<A>()
            .expect("aux was produced by this entry's decompose");
        Value::new(recompose(aux, children))
    })
}

pub(crate) fn plain_entry<T, A>(
    decompose: impl Fn(&T) -> (Vec<Value>, A) + Send + Sync + 'static,
    recompose: impl Fn(&A, Vec<Value>) -> T + Send + Sync + 'static,
) -> NodeEntry
where
    T: Any + Send + Sync,
    A: AuxData,
{
    NodeEntry {
        name: core::any::type_name::<T>(),
        decompose: Box::new(move |value: &Value| {
            let value = value.downcast_ref::<T>().expect("entry is dispatched by type id");
            let (children, aux) = decompose(value);
            (children, Aux::new(aux))
        }),
        recompose: erase_recompose(recompose),
        decompose_keyed: None,
        internal: false,
    }
}

pub(crate) fn keyed_entry<T, A>(
    decompose: impl Fn(&T) -> (Vec<(Key, Value)>, A) + Send + Sync + 'static,
    recompose: impl Fn(&A, Vec<Value>) -> T + Send + Sync + 'static,
) -> NodeEntry
where
    T: Any + Send + Sync,
    A: AuxData,
{
    // The unkeyed decomposition is derived from the keyed one so the two
    // can never disagree about child order.
    let keyed = Arc::new(decompose);
    let unkeyed = Arc::clone(&keyed);
    NodeEntry {
        name: core::any::type_name::<T>(),
        decompose: Box::new(move |value: &Value| {
            let value = value.downcast_ref::<T>().expect("entry is dispatched by type id");
            let (pairs, aux) = unkeyed(value);
            let children = pairs.into_iter().map(|(_, child)| child).collect();
            (children, Aux::new(aux))
        }),
        recompose: erase_recompose(recompose),
        decompose_keyed: Some(Box::new(move |value: &Value| {
            let value = value.downcast_ref::<T>().expect("entry is dispatched by type id");
            let (pairs, aux) = keyed(value);
            (pairs, Aux::new(aux))
        })),
        internal: false,
    }
}

fn insert_entry(type_id: TypeId, entry: NodeEntry) {
    let mut table = registry().write();
    if let Some(existing) = table.get(&type_id) {
        panic!("duplicate node registration for {}", existing.name);
    }
    debug!(type_name = entry.name, "registering node handler");
    table.insert(type_id, Arc::new(entry));
}

/// Registers `T` as an interior node type.
///
/// `decompose` splits a value into ordered children plus reusable node
/// metadata; `recompose` rebuilds a value from that metadata and
/// transformed children, which arrive in the order `decompose` produced
/// them.
///
/// # Panics
///
/// Panics if `T` already has a handler. Register each type once, during
/// setup.
pub fn register_node<T, A>(
    decompose: impl Fn(&T) -> (Vec<Value>, A) + Send + Sync + 'static,
    recompose: impl Fn(&A, Vec<Value>) -> T + Send + Sync + 'static,
) where
    T: Any + Send + Sync,
    A: AuxData,
{
    insert_entry(TypeId::of::<T>(), plain_entry(decompose, recompose));
}

/// Registers `T` as an interior node type that can also address its
/// children by key.
///
/// The unkeyed decomposition used by plain flattening is derived by
/// dropping the keys.
///
/// # Panics
///
/// Panics if `T` already has a handler.
pub fn register_node_with_keys<T, A>(
    decompose: impl Fn(&T) -> (Vec<(Key, Value)>, A) + Send + Sync + 'static,
    recompose: impl Fn(&A, Vec<Value>) -> T + Send + Sync + 'static,
) where
    T: Any + Send + Sync,
    A: AuxData,
{
    insert_entry(TypeId::of::<T>(), keyed_entry(decompose, recompose));
}

/// Registers `T` as a dispatch-only node type: visible under
/// [`LeafPolicy::Dispatch`] and treated as a leaf everywhere else.
///
/// # Panics
///
/// Panics if `T` already has a handler.
pub fn register_dispatch_node<T, A>(
    decompose: impl Fn(&T) -> (Vec<Value>, A) + Send + Sync + 'static,
    recompose: impl Fn(&A, Vec<Value>) -> T + Send + Sync + 'static,
) where
    T: Any + Send + Sync,
    A: AuxData,
{
    let mut entry = plain_entry(decompose, recompose);
    entry.internal = true;
    insert_entry(TypeId::of::<T>(), entry);
}

/// Registers `T` as a structural constant: a node with no children whose
/// metadata is the value itself.
///
/// The value travels inside treedefs rather than in the leaf sequence, so
/// two trees are structurally equal only when their constants compare
/// equal. Constants should be cheap to clone.
///
/// # Panics
///
/// Panics if `T` already has a handler.
pub fn register_static<T>()
where
    T: Any + Send + Sync + Clone + Eq + Hash + fmt::Debug,
{
    let entry = NodeEntry {
        name: core::any::type_name::<T>(),
        decompose: Box::new(|value: &Value| {
            let value = value.downcast_ref::<T>().expect("entry is dispatched by type id");
            (Vec::new(), Aux::new(value.clone()))
        }),
        recompose: Box::new(|aux: &Aux, _children: Vec<Value>| {
            let value: &T = aux.downcast_ref().expect("aux was produced by this entry's decompose");
            Value::new(value.clone())
        }),
        decompose_keyed: Some(Box::new(|value: &Value| {
            let value = value.downcast_ref::<T>().expect("entry is dispatched by type id");
            (Vec::new(), Aux::new(value.clone()))
        })),
        internal: false,
    };
    insert_entry(TypeId::of::<T>(), entry);
}

/// Takes one structural step: the children and metadata of `value`, or
/// `None` if `value` is a leaf.
pub fn decompose_one_level(value: &Value) -> Option<(Vec<Value>, Aux)> {
    decompose_one_level_in(LeafPolicy::Standard, value)
}

/// [`decompose_one_level`] under an explicit leaf policy.
pub fn decompose_one_level_in(policy: LeafPolicy, value: &Value) -> Option<(Vec<Value>, Aux)> {
    let entry = node_entry(policy, value.type_id())?;
    Some((entry.decompose)(value))
}

/// Takes one structural step, erroring if `value` is a leaf.
pub fn flatten_one_level(value: &Value) -> Result<(Vec<Value>, Aux), TreeError> {
    decompose_one_level(value).ok_or(TreeError::Unflattenable {
        type_name: value.type_name(),
    })
}

/// The children of `value` with their keys, or `None` when its type
/// supplies no keys. A `None` does not mean `value` is a leaf.
pub fn decompose_one_level_keyed(value: &Value) -> Option<(Vec<(Key, Value)>, Aux)> {
    let entry = node_entry(LeafPolicy::Standard, value.type_id())?;
    let keyed = entry.decompose_keyed.as_ref()?;
    Some(keyed(value))
}

/// Registers a struct as a node type from two field lists.
///
/// Fields listed under `data` must have type [`Value`]; they become the
/// node's children, addressed by field name. Fields listed under `meta`
/// are cloned into the node metadata and must be `Eq + Hash + Debug`.
/// Every field of the struct must appear in one of the two lists.
///
/// ```
/// use frond_core::{Value, flatten, register_struct};
///
/// struct Schedule {
///     base: Value,
///     warmup: Value,
///     label: String,
/// }
///
/// register_struct!(Schedule { data: [base, warmup], meta: [label] });
///
/// let schedule = Value::new(Schedule {
///     base: Value::new(0.1f64),
///     warmup: Value::new(0.0f64),
///     label: String::from("cosine"),
/// });
/// assert_eq!(flatten(&schedule).0.len(), 2);
/// ```
///
/// # Panics
///
/// Panics if the struct type already has a handler.
#[macro_export]
macro_rules! register_struct {
    ($ty:path { data: [$($data:ident),+ $(,)?], meta: [$($meta:ident),* $(,)?] $(,)? }) => {
        $crate::register_node_with_keys::<$ty, _>(
            |value: &$ty| {
                (
                    ::std::vec![$(
                        (
                            $crate::Key::attr(::core::stringify!($data)),
                            ::core::clone::Clone::clone(&value.$data),
                        ),
                    )+],
                    ($(::core::clone::Clone::clone(&value.$meta),)*),
                )
            },
            |meta, children| {
                let mut children = children.into_iter();
                let ($($meta,)*) = ::core::clone::Clone::clone(meta);
                $ty {
                    $($data: children.next().expect("child count is fixed by registration"),)+
                    $($meta,)*
                }
            },
        );
    };
}
