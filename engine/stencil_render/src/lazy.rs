//! Lookups that evaluate deferred values on first access.
//!
//! A [`Container`] is anything a path step can look a key up in. Fetching
//! through the context evaluates a stored `Deferred`, writes the result back
//! into the same entry when the container can store it, and coerces the
//! result before handing it out.

use std::rc::Rc;

use stencil_value::{
    stack_depth_exceeded, Deferred, DropRef, KeyedLookup, ListValue, MapValue, RenderResult,
    ToRenderable, Value,
};

use crate::context::Context;
use crate::environment::Environment;
use crate::path::Key;
use crate::scope::MAX_NESTING;

/// A value that supports keyed or indexed lookup.
#[derive(Clone)]
pub(crate) enum Container {
    Map(MapValue),
    List(ListValue),
    Provider(Rc<dyn KeyedLookup>),
    Drop(DropRef),
}

impl Container {
    /// Container for a path step on `object`, if `object` can answer `key`.
    ///
    /// Keyed containers must already contain the key. Indexed containers
    /// accept any integer; out-of-range indices fetch `Nil`.
    pub(crate) fn for_lookup(object: &Value, key: &Key) -> Option<Self> {
        match (object, key) {
            (Value::Map(entries), Key::Name(name)) if entries.borrow().contains_key(name) => {
                Some(Container::Map(entries.clone()))
            }
            (Value::List(items), Key::Index(_)) => Some(Container::List(items.clone())),
            (Value::Drop(object), Key::Name(name))
                if object.keyed().is_some_and(|keyed| keyed.contains_key(name)) =>
            {
                Some(Container::Drop(Rc::clone(object)))
            }
            (Value::Drop(object), Key::Index(_)) if object.indexed().is_some() => {
                Some(Container::Drop(Rc::clone(object)))
            }
            _ => None,
        }
    }

    /// Stored value, possibly still deferred.
    fn raw(&self, key: &Key) -> Option<Value> {
        match (self, key) {
            (Container::Map(entries), Key::Name(name)) => entries.borrow().get(name).cloned(),
            (Container::List(items), Key::Index(index)) => {
                let items = items.borrow();
                list_slot(*index, items.len()).and_then(|slot| items.get(slot).cloned())
            }
            (Container::Provider(provider), Key::Name(name)) => provider.fetch(name),
            (Container::Drop(object), Key::Name(name)) => {
                object.keyed().and_then(|keyed| keyed.fetch(name))
            }
            (Container::Drop(object), Key::Index(index)) => {
                object.indexed().and_then(|indexed| indexed.fetch_index(*index))
            }
            _ => None,
        }
    }

    /// Replace an existing entry with its evaluated value.
    fn memoize(&self, key: &Key, value: Value) {
        match (self, key) {
            (Container::Map(entries), Key::Name(name)) => {
                if let Some(slot) = entries.borrow_mut().get_mut(name) {
                    *slot = value;
                }
            }
            (Container::List(items), Key::Index(index)) => {
                let mut items = items.borrow_mut();
                let len = items.len();
                if let Some(slot) = list_slot(*index, len).and_then(|i| items.get_mut(i)) {
                    *slot = value;
                }
            }
            (Container::Provider(provider), Key::Name(name)) => provider.store(name, value),
            (Container::Drop(object), Key::Name(name)) => {
                if let Some(keyed) = object.keyed() {
                    keyed.store(name, value);
                }
            }
            (Container::Drop(object), Key::Index(index)) => {
                if let Some(indexed) = object.indexed() {
                    indexed.store_index(*index, value);
                }
            }
            _ => {}
        }
    }
}

impl Environment {
    pub(crate) fn container(&self) -> Container {
        match self {
            Environment::Mapping(entries) => Container::Map(entries.clone()),
            Environment::Provider(provider) => Container::Provider(Rc::clone(provider)),
        }
    }
}

/// Position of `index` in a list of `len` items; negative indices count
/// from the end.
pub(crate) fn list_slot(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index.checked_add(len)? } else { index };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

impl Context {
    /// Look `key` up in `container`, evaluating and memoizing a deferred
    /// entry, then coerce the result.
    pub(crate) fn fetch(&mut self, container: &Container, key: &Key) -> RenderResult {
        // The borrow taken by `raw` ends here, so the computation may read
        // or write the same container.
        let value = match container.raw(key).unwrap_or_default() {
            Value::Deferred(deferred) => {
                let value = self.evaluate_deferred(&deferred)?;
                container.memoize(key, value.clone());
                value
            }
            value => value,
        };
        Ok(self.coerce(value))
    }

    /// Apply to-renderable conversion, then hand the context to drops that
    /// want it.
    pub(crate) fn coerce(&mut self, value: Value) -> Value {
        let value = match value {
            Value::Drop(object) => {
                let converted = object.renderable().map(ToRenderable::to_renderable);
                converted.unwrap_or(Value::Drop(object))
            }
            value => value,
        };
        if let Value::Drop(object) = &value {
            if let Some(bindable) = object.bindable() {
                bindable.bind_context(self);
            }
        }
        value
    }

    pub(crate) fn evaluate_deferred(&mut self, deferred: &Deferred) -> RenderResult {
        if self.evaluation_depth >= MAX_NESTING {
            return Err(stack_depth_exceeded(MAX_NESTING));
        }
        self.evaluation_depth += 1;
        tracing::trace!(
            arity = deferred.arity(),
            depth = self.evaluation_depth,
            "evaluating deferred value"
        );
        let result = deferred.evaluate(self);
        self.evaluation_depth -= 1;
        result
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
