//! Capability traits for external objects taking part in resolution.
//!
//! A drop is an opaque host object stored in a `Value::Drop`. The resolver
//! asks it for capabilities through [`Droppable`]'s accessors and only ever
//! calls what was declared. All accessors default to "not supported".

use std::fmt;

use crate::errors::RenderResult;
use crate::value::Value;

/// The render context as seen by deferred computations, filters and drops.
///
/// Object-safe so values can hold computations without depending on the
/// crate that implements the context.
pub trait RenderContext {
    /// Resolve markup (a literal or a variable path) to a value.
    fn resolve(&mut self, markup: &str) -> RenderResult;

    /// Bind `key` in the innermost scope.
    fn set(&mut self, key: &str, value: Value);

    /// Number of scopes currently on the stack.
    fn depth(&self) -> usize;

    /// Read a host register.
    fn register(&self, name: &str) -> Option<Value>;
}

/// `object.name` / `object["name"]` support.
pub trait KeyedLookup {
    /// Whether `key` is present.
    fn contains_key(&self, key: &str) -> bool;

    /// Raw stored value, possibly `Value::Deferred`.
    fn fetch(&self, key: &str) -> Option<Value>;

    /// Memoize an evaluated deferred value. Read-only objects ignore it.
    fn store(&self, _key: &str, _value: Value) {}
}

/// `object[0]` support. Only consulted for integer keys.
pub trait IndexedLookup {
    /// Raw stored value at `index`; `None` when out of range.
    fn fetch_index(&self, index: i64) -> Option<Value>;

    /// Memoize an evaluated deferred value.
    fn store_index(&self, _index: i64, _value: Value) {}
}

/// The `size` / `first` / `last` pseudo-methods.
///
/// `size` is always exposed by a sizeable object. `first` and `last` return
/// `None` when the object does not expose them; an exposed but empty
/// collection returns `Some(Value::Nil)`.
pub trait Sizeable {
    fn size(&self) -> usize;

    fn first(&self) -> Option<Value> {
        None
    }

    fn last(&self) -> Option<Value> {
        None
    }
}

/// Conversion into a plain renderable value.
pub trait ToRenderable {
    fn to_renderable(&self) -> Value;
}

/// Receives the active context whenever the resolver hands the object out.
///
/// Implementors typically capture what they need (through interior
/// mutability) so later lookups can depend on the current scopes.
pub trait ContextBindable {
    fn bind_context(&self, ctx: &mut dyn RenderContext);
}

/// An external object exposed to templates.
pub trait Droppable: fmt::Debug {
    /// Name used in messages and debug output.
    fn type_name(&self) -> &'static str {
        "drop"
    }

    fn keyed(&self) -> Option<&dyn KeyedLookup> {
        None
    }

    fn indexed(&self) -> Option<&dyn IndexedLookup> {
        None
    }

    fn sizeable(&self) -> Option<&dyn Sizeable> {
        None
    }

    fn renderable(&self) -> Option<&dyn ToRenderable> {
        None
    }

    fn bindable(&self) -> Option<&dyn ContextBindable> {
        None
    }
}
