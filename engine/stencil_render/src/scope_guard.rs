//! RAII scope guards for the context's scope stack.
//!
//! [`ScopedContext`] pops the scope it pushed when dropped, including during
//! unwinding, so a tag body that fails or panics cannot leave the stack
//! unbalanced. The guard derefs to [`Context`], so it is used exactly like
//! the context itself.
//!
//! ```text
//! {
//!     let mut scoped = ctx.scoped(bindings)?;
//!     scoped.set("forloop", forloop);
//!     scoped.resolve("item.title")?;
//! } // scope popped here
//!
//! ctx.stack(bindings, |scoped| scoped.resolve("item.title"))?;
//! ```

use std::ops::{Deref, DerefMut};

use stencil_value::{Mapping, RenderError, RenderResult};

use crate::context::Context;

/// Guard holding a pushed scope. Dropping it pops the scope.
pub struct ScopedContext<'ctx> {
    context: &'ctx mut Context,
}

impl Drop for ScopedContext<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.context.pop() {
            tracing::warn!(%err, "scope guard found no scope to pop");
        }
    }
}

impl Deref for ScopedContext<'_> {
    type Target = Context;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ScopedContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Context {
    /// Push `scope` and return a guard that pops it on drop.
    ///
    /// Fails, without pushing, when the stack is already at its nesting
    /// limit.
    pub fn scoped(&mut self, scope: Mapping) -> Result<ScopedContext<'_>, RenderError> {
        self.push(scope)?;
        Ok(ScopedContext { context: self })
    }

    /// Run `f` with `scope` pushed; the scope is popped afterwards whether
    /// `f` succeeds, fails or panics.
    pub fn stack<T, F>(&mut self, scope: Mapping, f: F) -> RenderResult<T>
    where
        F: FnOnce(&mut ScopedContext<'_>) -> RenderResult<T>,
    {
        let mut scoped = self.scoped(scope)?;
        f(&mut scoped)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
