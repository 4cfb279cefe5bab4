#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod aux;
mod builtins;
mod error;
mod key;
mod partial;
mod registry;
mod transpose;
mod traverse;
mod treedef;
mod value;

pub use aux::{Aux, AuxData};
pub use builtins::{Absent, Record, RecordMeta, Tuple};
pub use error::TreeError;
pub use key::{Key, KeyPath, MapKey};
pub use partial::{Partial, PartialFn};
pub use registry::{
    LeafPolicy, decompose_one_level, decompose_one_level_in, decompose_one_level_keyed,
    flatten_one_level, register_dispatch_node, register_node, register_node_with_keys,
    register_static,
};
pub use transpose::transpose;
pub use traverse::{
    all_leaves, all_leaves_with, broadcast_prefix, broadcast_prefix_with, flatten, flatten_in,
    flatten_in_with, flatten_with, leaves, leaves_with, replace_absents, structure, structure_with,
    tree_all, tree_fold, tree_map, tree_map_many, tree_map_many_with, tree_map_with, tree_reduce,
    unflatten,
};
pub use treedef::{TreeDef, TypeTag};
pub use value::{Value, short_type_name};
