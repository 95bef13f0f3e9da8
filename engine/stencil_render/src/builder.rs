//! `ContextBuilder` for creating contexts with construction-time options.

use stencil_value::{Mapping, Value};

use crate::context::Context;
use crate::environment::{Environment, EnvironmentChain};
use crate::filters::SharedFilterRegistry;
use crate::limits::{ResourceLimiter, ResourceLimits};
use crate::recorder::ErrorRecorder;
use crate::scope::ScopeStack;

/// Builder for [`Context`].
///
/// Everything is optional: a bare `ContextBuilder::new().build()` gives a
/// context with one empty scope, no environments, no filters, inline error
/// recording and no resource limits.
#[derive(Debug, Default)]
pub struct ContextBuilder {
    environments: Vec<Environment>,
    scope: Mapping,
    registers: Mapping,
    rethrow_errors: bool,
    limits: ResourceLimits,
    filter_registry: Option<SharedFilterRegistry>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an environment; earlier environments are consulted first.
    #[must_use]
    pub fn environment(mut self, environment: impl Into<Environment>) -> Self {
        self.environments.push(environment.into());
        self
    }

    #[must_use]
    pub fn environments(mut self, environments: impl IntoIterator<Item = Environment>) -> Self {
        self.environments.extend(environments);
        self
    }

    /// Initial (outermost) scope.
    #[must_use]
    pub fn scope(mut self, scope: Mapping) -> Self {
        self.scope = scope;
        self
    }

    /// Bind one variable in the initial scope.
    #[must_use]
    pub fn assign(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.scope.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn registers(mut self, registers: Mapping) -> Self {
        self.registers = registers;
        self
    }

    #[must_use]
    pub fn register(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.registers.insert(name.into(), value.into());
        self
    }

    /// Return errors from `handle_error` instead of recording them.
    #[must_use]
    pub fn rethrow_errors(mut self, rethrow: bool) -> Self {
        self.rethrow_errors = rethrow;
        self
    }

    #[must_use]
    pub fn resource_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Process-wide filter modules, read when the filter table is built.
    #[must_use]
    pub fn filter_registry(mut self, registry: SharedFilterRegistry) -> Self {
        self.filter_registry = Some(registry);
        self
    }

    pub fn build(self) -> Context {
        tracing::debug!(
            environments = self.environments.len(),
            rethrow_errors = self.rethrow_errors,
            "building render context"
        );
        Context::from_parts(
            ScopeStack::new(self.scope),
            EnvironmentChain::new(self.environments),
            self.registers,
            ErrorRecorder::new(self.rethrow_errors),
            ResourceLimiter::new(self.limits),
            self.filter_registry,
        )
    }
}

#[cfg(test)]
mod tests;
