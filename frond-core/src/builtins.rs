//! Node handlers and node types that come pre-registered.
//!
//! Handlers dispatch on the exact concrete type, default hash builders
//! included: a `HashMap` with a custom hasher is a different type and
//! therefore an opaque leaf until registered.

use core::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::key::{Key, MapKey};
use crate::partial::{Partial, PartialFn};
use crate::registry::{NodeEntry, keyed_entry, plain_entry};
use crate::value::Value;

/// Tuple-like sequence node.
///
/// One concrete type regardless of arity, so an arity disagreement between
/// two trees surfaces as a length mismatch rather than a type mismatch.
#[derive(Clone, Debug, Default)]
pub struct Tuple(pub Vec<Value>);

impl Tuple {
    /// Builds a tuple from the given items.
    pub fn new(items: impl IntoIterator<Item = Value>) -> Self {
        Tuple(items.into_iter().collect())
    }

    /// The items in order.
    pub fn items(&self) -> &[Value] {
        &self.0
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the tuple has no items.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Tuple(iter.into_iter().collect())
    }
}

/// The name and field list shared by every record of one shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordMeta {
    name: SmolStr,
    fields: Vec<SmolStr>,
}

impl RecordMeta {
    /// A record shape with the given name and field names.
    pub fn new(
        name: impl Into<SmolStr>,
        fields: impl IntoIterator<Item = impl Into<SmolStr>>,
    ) -> Self {
        RecordMeta {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The record's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field names in order.
    pub fn fields(&self) -> &[SmolStr] {
        &self.fields
    }
}

/// A named-field tuple. Field names live in a shared [`RecordMeta`]; the
/// record itself holds only the values.
///
/// Records are registered without a keyed decomposition on purpose:
/// key-path generation recognizes them structurally and addresses their
/// children by field name.
#[derive(Clone, Debug)]
pub struct Record {
    meta: Arc<RecordMeta>,
    values: Vec<Value>,
}

impl Record {
    /// Builds a record from its shape and field values.
    ///
    /// # Panics
    ///
    /// Panics if the number of values differs from the number of fields.
    pub fn new(meta: Arc<RecordMeta>, values: Vec<Value>) -> Self {
        assert_eq!(
            meta.fields.len(),
            values.len(),
            "record {} declares {} fields",
            meta.name,
            meta.fields.len(),
        );
        Record { meta, values }
    }

    /// The record's shape.
    pub fn meta(&self) -> &Arc<RecordMeta> {
        &self.meta
    }

    /// The record's name.
    pub fn name(&self) -> &str {
        self.meta.name()
    }

    /// The field names in order.
    pub fn fields(&self) -> &[SmolStr] {
        self.meta.fields()
    }

    /// The field values in order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The value of the named field, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        let index = self.meta.fields.iter().position(|name| name == field)?;
        self.values.get(index)
    }
}

/// Marker for an intentionally absent value.
///
/// Under [`LeafPolicy::Standard`](crate::LeafPolicy::Standard) it is a
/// childless node and contributes no leaves; under
/// [`LeafPolicy::AbsentLeaf`](crate::LeafPolicy::AbsentLeaf) it is an
/// ordinary leaf.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Absent;

pub(crate) fn builtin_entries() -> HashMap<TypeId, Arc<NodeEntry>> {
    let mut entries = HashMap::new();

    entries.insert(
        TypeId::of::<Vec<Value>>(),
        Arc::new(keyed_entry::<Vec<Value>, ()>(
            |list| {
                let pairs = list
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (Key::Seq(index), item.clone()))
                    .collect();
                (pairs, ())
            },
            |_, children| children,
        )),
    );

    entries.insert(
        TypeId::of::<Tuple>(),
        Arc::new(keyed_entry::<Tuple, ()>(
            |tuple| {
                let pairs = tuple
                    .0
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (Key::Seq(index), item.clone()))
                    .collect();
                (pairs, ())
            },
            |_, children| Tuple(children),
        )),
    );

    // Unordered mapping: entries are sorted by key at decomposition time,
    // so insertion order never leaks into leaf order or the treedef.
    entries.insert(
        TypeId::of::<HashMap<MapKey, Value>>(),
        Arc::new(keyed_entry::<HashMap<MapKey, Value>, Vec<MapKey>>(
            |map| {
                let mut items: Vec<(&MapKey, &Value)> = map.iter().collect();
                items.sort_by(|a, b| a.0.cmp(b.0));
                let keys = items.iter().map(|(key, _)| (*key).clone()).collect();
                let pairs = items
                    .into_iter()
                    .map(|(key, value)| (Key::Map(key.clone()), value.clone()))
                    .collect();
                (pairs, keys)
            },
            |keys, children| keys.iter().cloned().zip(children).collect(),
        )),
    );

    entries.insert(
        TypeId::of::<BTreeMap<MapKey, Value>>(),
        Arc::new(keyed_entry::<BTreeMap<MapKey, Value>, Vec<MapKey>>(
            |map| {
                let keys = map.keys().cloned().collect();
                let pairs = map
                    .iter()
                    .map(|(key, value)| (Key::Map(key.clone()), value.clone()))
                    .collect();
                (pairs, keys)
            },
            |keys, children| keys.iter().cloned().zip(children).collect(),
        )),
    );

    // Insertion-ordered mapping: iteration order is the structure, so two
    // maps with the same entries in different orders differ structurally.
    entries.insert(
        TypeId::of::<IndexMap<MapKey, Value>>(),
        Arc::new(keyed_entry::<IndexMap<MapKey, Value>, Vec<MapKey>>(
            |map| {
                let keys = map.keys().cloned().collect();
                let pairs = map
                    .iter()
                    .map(|(key, value)| (Key::Map(key.clone()), value.clone()))
                    .collect();
                (pairs, keys)
            },
            |keys, children| keys.iter().cloned().zip(children).collect(),
        )),
    );

    entries.insert(
        TypeId::of::<Record>(),
        Arc::new(plain_entry::<Record, Arc<RecordMeta>>(
            |record| (record.values.to_vec(), Arc::clone(&record.meta)),
            |meta, children| Record::new(Arc::clone(meta), children),
        )),
    );

    entries.insert(
        TypeId::of::<Absent>(),
        Arc::new(plain_entry::<Absent, ()>(
            |_| (Vec::new(), ()),
            |_, _| Absent,
        )),
    );

    entries.insert(
        TypeId::of::<Partial>(),
        Arc::new(plain_entry::<Partial, PartialFn>(
            |partial| (partial.args().to_vec(), partial.func().clone()),
            |func, children| Partial::from_fn(func.clone(), children),
        )),
    );

    entries
}
