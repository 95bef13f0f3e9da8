//! Scope stack for template-local variables.
//!
//! Every block that introduces bindings (`for`, `capture`, an included
//! partial) pushes a scope and pops it when done. Lookups walk the stack
//! innermost-first, so inner bindings shadow outer ones.
//!
//! The initial scope is held apart from the nested ones and can never be
//! popped, which keeps "at least one scope" a structural fact instead of a
//! runtime check on every access.

use stencil_value::{balance_error, stack_depth_exceeded, MapValue, Mapping, RenderError, Value};

/// Maximum number of scopes nested above the initial one.
///
/// Unbounded recursive includes or loops would otherwise exhaust the native
/// stack; hitting this ceiling is a hard error.
pub const MAX_NESTING: usize = 100;

/// Stack of scopes, innermost last in `nested`.
#[derive(Clone, Debug)]
pub struct ScopeStack {
    /// Nested scopes, outermost first.
    nested: Vec<MapValue>,
    /// The initial scope (always at the bottom).
    base: MapValue,
}

impl ScopeStack {
    /// Create a stack holding only `initial`.
    pub fn new(initial: Mapping) -> Self {
        ScopeStack {
            nested: Vec::new(),
            base: MapValue::new(initial),
        }
    }

    /// Total number of scopes, including the initial one.
    #[inline]
    pub fn depth(&self) -> usize {
        self.nested.len() + 1
    }

    /// Push `scope` as the new innermost scope.
    ///
    /// Fails without touching the stack if it already holds
    /// [`MAX_NESTING`] nested scopes.
    pub fn push(&mut self, scope: Mapping) -> Result<(), RenderError> {
        if self.nested.len() >= MAX_NESTING {
            return Err(stack_depth_exceeded(MAX_NESTING));
        }
        self.nested.push(MapValue::new(scope));
        tracing::trace!(depth = self.depth(), "pushed scope");
        Ok(())
    }

    /// Remove the innermost scope and return its bindings.
    pub fn pop(&mut self) -> Result<Mapping, RenderError> {
        let scope = self.nested.pop().ok_or_else(balance_error)?;
        tracing::trace!(depth = self.depth(), "popped scope");
        let bindings = std::mem::take(&mut *scope.borrow_mut());
        Ok(bindings)
    }

    /// Innermost scope.
    #[inline]
    pub fn innermost(&self) -> &MapValue {
        self.nested.last().unwrap_or(&self.base)
    }

    /// Initial scope.
    #[inline]
    pub fn outermost(&self) -> &MapValue {
        &self.base
    }

    /// Bind `key` in the innermost scope.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.innermost().borrow_mut().insert(key.into(), value);
    }

    /// Merge `values` into the innermost scope only.
    pub fn merge(&mut self, values: Mapping) {
        self.innermost().borrow_mut().extend(values);
    }

    /// Drop every binding of the innermost scope.
    pub fn clear_innermost(&mut self) {
        self.innermost().borrow_mut().clear();
    }

    /// Scopes from innermost to outermost.
    pub fn iter(&self) -> impl Iterator<Item = &MapValue> {
        self.nested.iter().rev().chain(std::iter::once(&self.base))
    }

    /// Innermost scope that binds `key`.
    pub fn find(&self, key: &str) -> Option<&MapValue> {
        self.iter().find(|scope| scope.borrow().contains_key(key))
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new(Mapping::new())
    }
}
