//! Markup resolution: literals first, then variable paths.
//!
//! A path starts with a root lookup across the scope stack and the
//! environment chain, then applies each remaining part in turn. A part the
//! current value cannot answer ends the path with `Nil`; "not found" is never
//! an error. Errors raised by deferred computations do propagate.

use stencil_stack::with_stack_headroom;
use stencil_value::{RenderResult, Value};

use crate::context::Context;
use crate::environment::Environment;
use crate::lazy::Container;
use crate::literal::{parse_literal, Literal};
use crate::path::{split_path, Key, PathPart};
use crate::pseudo::PseudoMethod;

impl Context {
    /// Resolve `markup` to a value.
    ///
    /// Surrounding whitespace is ignored. Range bounds may be variables and
    /// are coerced to integers.
    pub fn resolve(&mut self, markup: &str) -> RenderResult {
        let markup = markup.trim();
        with_stack_headroom(|| match parse_literal(markup) {
            Some(Literal::Value(value)) => Ok(value),
            Some(Literal::Range { start, end }) => {
                let start = self.resolve(start)?.to_integer();
                let end = self.resolve(end)?.to_integer();
                Ok(Value::Range(start, end))
            }
            None => self.variable(markup),
        })
    }

    /// Resolve a variable path such as `product.variants[0].title`.
    #[tracing::instrument(level = "trace", skip_all, fields(markup = %markup))]
    pub fn variable(&mut self, markup: &str) -> RenderResult {
        let parts = split_path(markup);
        let Some((root, rest)) = parts.split_first() else {
            return Ok(Value::Nil);
        };

        let root = match *root {
            PathPart::Name(name) => name.to_string(),
            PathPart::Bracket(inner) => match self.resolve(inner)? {
                Value::Str(name) => name.to_string(),
                _ => return Ok(Value::Nil),
            },
        };
        let mut object = self.find_variable(&root)?;

        for part in rest {
            let (key, bracketed) = match *part {
                PathPart::Name(name) => (Key::Name(name.to_string()), false),
                PathPart::Bracket(inner) => match Key::from_value(&self.resolve(inner)?) {
                    Some(key) => (key, true),
                    None => return Ok(Value::Nil),
                },
            };
            match self.step(&object, &key, bracketed)? {
                Some(next) => object = next,
                None => return Ok(Value::Nil),
            }
        }
        Ok(object)
    }

    /// Root lookup.
    ///
    /// The innermost scope binding `key` wins. Otherwise the first
    /// environment yielding a non-nil value wins. Otherwise the key is
    /// looked up once more in the last environment, or in the outermost
    /// scope when there are no environments.
    fn find_variable(&mut self, key: &str) -> RenderResult {
        let lookup = Key::Name(key.to_string());
        if let Some(scope) = self.scopes.find(key).cloned() {
            return self.fetch(&Container::Map(scope), &lookup);
        }

        for index in 0..self.environments.len() {
            let Some(container) = self.environments.get(index).map(Environment::container) else {
                break;
            };
            let value = self.fetch(&container, &lookup)?;
            if !value.is_nil() {
                return Ok(value);
            }
        }

        let fallback = match self.environments.last() {
            Some(environment) => environment.container(),
            None => Container::Map(self.scopes.outermost().clone()),
        };
        self.fetch(&fallback, &lookup)
    }

    /// Apply one path part to `object`; `None` ends the path.
    fn step(&mut self, object: &Value, key: &Key, bracketed: bool) -> RenderResult<Option<Value>> {
        if let Some(container) = Container::for_lookup(object, key) {
            return self.fetch(&container, key).map(Some);
        }
        if bracketed {
            return Ok(None);
        }
        let method = match key {
            Key::Name(name) => PseudoMethod::from_name(name),
            Key::Index(_) => None,
        };
        Ok(method
            .and_then(|method| method.apply(object))
            .map(|value| self.coerce(value)))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
