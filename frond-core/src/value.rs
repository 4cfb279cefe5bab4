use core::any::{Any, TypeId};
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::builtins::{Absent, Record, RecordMeta, Tuple};
use crate::key::MapKey;

/// A type-erased, cheaply clonable handle to one value in a tree.
///
/// A `Value` whose concrete type has a registered node handler is an
/// interior node; every other `Value` is an opaque leaf. Cloning bumps a
/// reference count and never copies the underlying data.
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Value {
    /// Wraps `value` in a type-erased handle.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Value {
            inner: Arc::new(value),
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Builds a list node from the given items.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::new(items.into_iter().collect::<Vec<Value>>())
    }

    /// Builds a tuple node from the given items.
    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::new(Tuple::new(items))
    }

    /// Builds an unordered mapping node from the given entries.
    ///
    /// Flattening sorts mapping entries by key, so trees built from the
    /// same entries in any order are structurally identical.
    pub fn map<K: Into<MapKey>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::new(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect::<HashMap<MapKey, Value>>(),
        )
    }

    /// Builds a record node with the given name and `(field, value)` pairs.
    pub fn record<N: Into<SmolStr>>(
        name: impl Into<SmolStr>,
        fields: impl IntoIterator<Item = (N, Value)>,
    ) -> Self {
        let (names, values): (Vec<SmolStr>, Vec<Value>) = fields
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .unzip();
        Value::new(Record::new(Arc::new(RecordMeta::new(name, names)), values))
    }

    /// The absent-value marker.
    pub fn absent() -> Self {
        Value::new(Absent)
    }

    /// Whether the underlying value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrows the underlying value as a `T`, if that is its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// The `TypeId` of the underlying value.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The full name of the underlying type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether two handles share one allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", short_type_name(self.type_name))
    }
}

/// Trims module paths out of a type name, inside generic arguments too.
///
/// `alloc::vec::Vec<frond_core::value::Value>` becomes `Vec<Value>`.
pub fn short_type_name(full: &str) -> String {
    fn flush(out: &mut String, segment: &str) {
        match segment.rsplit("::").next() {
            Some(tail) => out.push_str(tail),
            None => out.push_str(segment),
        }
    }

    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            flush(&mut out, &segment);
            segment.clear();
            out.push(ch);
        }
    }
    flush(&mut out, &segment);
    out
}
