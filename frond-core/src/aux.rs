use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

/// Node metadata that can be compared and hashed behind type erasure.
///
/// Implemented for free by any `'static` type that is `Eq + Hash + Debug`
/// and thread-safe, so registration closures can return plain values such
/// as `()`, a `Vec` of keys, or a tuple of configuration fields.
pub trait AuxData: Any + Send + Sync + fmt::Debug {
    /// Compares against metadata of any concrete type.
    fn dyn_eq(&self, other: &dyn AuxData) -> bool;
    /// Hashes through an erased hasher, mixing in the concrete type.
    fn dyn_hash(&self, state: &mut dyn Hasher);
    /// Upcast used to recover the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl<T> AuxData for T
where
    T: Any + Send + Sync + fmt::Debug + Eq + Hash,
{
    fn dyn_eq(&self, other: &dyn AuxData) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The erased metadata attached to each interior node of a treedef.
///
/// Two `Aux` values are equal when they hold the same concrete type and
/// the values compare equal; metadata of different types never matches.
#[derive(Clone)]
pub struct Aux(Arc<dyn AuxData>);

impl Aux {
    /// Erases `aux`.
    pub fn new<A: AuxData>(aux: A) -> Self {
        Aux(Arc::new(aux))
    }

    /// The "no metadata" marker, used by nodes that need none.
    pub fn unit() -> Self {
        Aux(Arc::new(()))
    }

    /// Whether this is the "no metadata" marker.
    pub fn is_unit(&self) -> bool {
        self.0.as_any().is::<()>()
    }

    /// Borrows the metadata as an `A`, if that is its concrete type.
    pub fn downcast_ref<A: Any>(&self) -> Option<&A> {
        self.0.as_any().downcast_ref::<A>()
    }
}

impl PartialEq for Aux {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(&*other.0)
    }
}

impl Eq for Aux {}

impl Hash for Aux {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}

impl fmt::Debug for Aux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
