use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::value::Value;

/// The callable held by a [`Partial`], comparable and hashable by
/// identity.
///
/// Clones of one `PartialFn` are equal; wrapping the same closure twice
/// produces two distinct callables. Identity is what node metadata needs:
/// treedefs built from clones of one partial application match, treedefs
/// built from unrelated ones do not.
#[derive(Clone)]
pub struct PartialFn(Arc<dyn Fn(&[Value]) -> Value + Send + Sync>);

impl PartialFn {
    /// Wraps a callable.
    pub fn new(func: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        PartialFn(Arc::new(func))
    }

    /// Invokes the callable.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for PartialFn {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for PartialFn {}

impl Hash for PartialFn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for PartialFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartialFn({:#x})", self.addr())
    }
}

/// A callable with bound arguments that traverses like data.
///
/// The bound arguments are the node's children, so they flatten, map, and
/// rebuild like any other subtree; the callable itself rides along as node
/// metadata.
#[derive(Clone, Debug)]
pub struct Partial {
    func: PartialFn,
    args: Vec<Value>,
}

impl Partial {
    /// Binds `args` to a fresh wrapping of `func`.
    pub fn new(
        func: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
        args: impl IntoIterator<Item = Value>,
    ) -> Self {
        Partial::from_fn(PartialFn::new(func), args)
    }

    /// Binds `args` to an existing callable, preserving its identity.
    pub fn from_fn(func: PartialFn, args: impl IntoIterator<Item = Value>) -> Self {
        Partial {
            func,
            args: args.into_iter().collect(),
        }
    }

    /// The wrapped callable.
    pub fn func(&self) -> &PartialFn {
        &self.func
    }

    /// The bound arguments.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Calls the function with the bound arguments followed by `extra`.
    pub fn call(&self, extra: &[Value]) -> Value {
        let mut args = self.args.clone();
        args.extend(extra.iter().cloned());
        self.func.call(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(args: &[Value]) -> Value {
        let total: i64 = args
            .iter()
            .map(|arg| arg.downcast_ref::<i64>().copied().unwrap())
            .sum();
        Value::new(total)
    }

    #[test]
    fn call_appends_extra_arguments() {
        let partial = Partial::new(sum, [Value::new(1i64), Value::new(2i64)]);
        let result = partial.call(&[Value::new(10i64)]);
        assert_eq!(result.downcast_ref::<i64>(), Some(&13));
    }

    #[test]
    fn identity_survives_clone_but_not_rewrapping() {
        let func = PartialFn::new(sum);
        assert_eq!(func, func.clone());
        assert_ne!(func, PartialFn::new(sum));
    }
}
