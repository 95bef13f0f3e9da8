//! Computations evaluated on first access.

use std::fmt;
use std::rc::Rc;

use crate::capability::RenderContext;
use crate::errors::RenderResult;

type Thunk = dyn Fn() -> RenderResult;
type Contextual = dyn Fn(&mut dyn RenderContext) -> RenderResult;

/// A value that has not been computed yet.
///
/// Stored like any other value. The first fetch through the context
/// evaluates it and replaces the stored entry with the result, so the
/// computation runs at most once per container entry.
#[derive(Clone)]
pub enum Deferred {
    /// Zero-argument computation.
    Thunk(Rc<Thunk>),
    /// Computation that receives the active context, so it can resolve
    /// other variables.
    Contextual(Rc<Contextual>),
}

impl Deferred {
    /// Number of arguments the computation takes.
    pub fn arity(&self) -> usize {
        match self {
            Deferred::Thunk(_) => 0,
            Deferred::Contextual(_) => 1,
        }
    }

    /// Run the computation.
    pub fn evaluate(&self, ctx: &mut dyn RenderContext) -> RenderResult {
        match self {
            Deferred::Thunk(f) => f(),
            Deferred::Contextual(f) => f(ctx),
        }
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Deferred::Thunk(a), Deferred::Thunk(b)) => Rc::ptr_eq(a, b),
            (Deferred::Contextual(a), Deferred::Contextual(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<deferred/{}>", self.arity())
    }
}
