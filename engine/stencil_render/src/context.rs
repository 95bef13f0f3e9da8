//! The render context: variable state for one template render.
//!
//! A `Context` owns the scope stack and the environment chain, dispatches
//! filters, tracks interrupts, records inline errors, and counts resource
//! usage. Tags drive it through the methods here; values that need the
//! context (deferred computations, filters, bindable drops) see it through
//! the object-safe [`RenderContext`] trait.

use stencil_value::{undefined_filter, Mapping, RenderContext, RenderError, RenderResult, Value};

use crate::builder::ContextBuilder;
use crate::environment::EnvironmentChain;
use crate::filters::{FilterInvoker, FilterModule, SharedFilterRegistry};
use crate::interrupt::{Interrupt, InterruptStack};
use crate::limits::{ResourceKey, ResourceLimiter};
use crate::recorder::{ErrorRecord, ErrorRecorder};
use crate::scope::ScopeStack;

/// Render state for a single template render.
///
/// Not `Send`: scopes and values share containers through `Rc<RefCell<_>>`.
pub struct Context {
    pub(crate) scopes: ScopeStack,
    pub(crate) environments: EnvironmentChain,
    registers: Mapping,
    recorder: ErrorRecorder,
    interrupts: InterruptStack,
    limiter: ResourceLimiter,
    /// Global modules, read once when the filter table is built.
    filter_registry: Option<SharedFilterRegistry>,
    /// Modules registered before the filter table exists.
    pending_filters: Vec<FilterModule>,
    filters: Option<FilterInvoker>,
    /// Deferred computations currently running.
    pub(crate) evaluation_depth: usize,
}

impl Context {
    /// Context with no environments, an empty scope and default options.
    pub fn new() -> Self {
        ContextBuilder::new().build()
    }

    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub(crate) fn from_parts(
        scopes: ScopeStack,
        environments: EnvironmentChain,
        registers: Mapping,
        recorder: ErrorRecorder,
        limiter: ResourceLimiter,
        filter_registry: Option<SharedFilterRegistry>,
    ) -> Self {
        Context {
            scopes,
            environments,
            registers,
            recorder,
            interrupts: InterruptStack::new(),
            limiter,
            filter_registry,
            pending_filters: Vec::new(),
            filters: None,
            evaluation_depth: 0,
        }
    }

    // Scopes

    /// Resolve `markup` (a literal or a variable path).
    pub fn get(&mut self, markup: &str) -> RenderResult {
        self.resolve(markup)
    }

    /// Bind `key` in the innermost scope.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.scopes.set(key, value);
    }

    /// Whether `markup` resolves to something other than `Nil`.
    pub fn has_key(&mut self, markup: &str) -> RenderResult<bool> {
        Ok(!self.resolve(markup)?.is_nil())
    }

    /// Push a new innermost scope.
    pub fn push(&mut self, scope: Mapping) -> Result<(), RenderError> {
        self.scopes.push(scope)
    }

    /// Merge `values` into the innermost scope.
    pub fn merge(&mut self, values: Mapping) {
        self.scopes.merge(values);
    }

    /// Pop the innermost scope, returning its bindings.
    pub fn pop(&mut self) -> Result<Mapping, RenderError> {
        self.scopes.pop()
    }

    /// Forget everything assigned in the innermost scope.
    pub fn clear_instance_assigns(&mut self) {
        self.scopes.clear_innermost();
    }

    /// Number of scopes, including the initial one.
    pub fn depth(&self) -> usize {
        self.scopes.depth()
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn environments(&self) -> &EnvironmentChain {
        &self.environments
    }

    // Filters

    /// Add filter modules to this context.
    ///
    /// All modules are validated before any is applied. Before the first
    /// `invoke` they are queued; afterwards they extend the live table.
    pub fn register_filters(
        &mut self,
        modules: impl IntoIterator<Item = FilterModule>,
    ) -> Result<(), RenderError> {
        let modules: Vec<_> = modules.into_iter().collect();
        for module in &modules {
            module.validate()?;
        }
        match &mut self.filters {
            Some(invoker) => modules.iter().for_each(|module| invoker.extend(module)),
            None => self.pending_filters.extend(modules),
        }
        Ok(())
    }

    /// Call filter `name` with `args` (`args[0]` is the input).
    pub fn invoke(&mut self, name: &str, args: &[Value]) -> RenderResult {
        let filter = self
            .filter_invoker()
            .lookup(name)
            .cloned()
            .ok_or_else(|| undefined_filter(name))?;
        tracing::trace!(filter = name, args = args.len(), "invoking filter");
        filter(self, args)
    }

    /// The filter table, built on first use.
    pub fn filter_invoker(&mut self) -> &FilterInvoker {
        self.filters.get_or_insert_with(|| {
            let pending = std::mem::take(&mut self.pending_filters);
            match &self.filter_registry {
                Some(registry) => {
                    let global = registry.read();
                    FilterInvoker::new(global.modules().iter().chain(&pending))
                }
                None => FilterInvoker::new(&pending),
            }
        })
    }

    // Interrupts

    pub fn push_interrupt(&mut self, interrupt: Interrupt) {
        self.interrupts.push(interrupt);
    }

    pub fn pop_interrupt(&mut self) -> Option<Interrupt> {
        self.interrupts.pop()
    }

    pub fn has_interrupt(&self) -> bool {
        self.interrupts.has_interrupt()
    }

    // Errors

    /// Record `err` and return its inline message, or hand it back when
    /// errors are rethrown or structural.
    pub fn handle_error(&mut self, err: RenderError) -> Result<String, RenderError> {
        self.recorder.handle(err)
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        self.recorder.records()
    }

    pub fn rethrows_errors(&self) -> bool {
        self.recorder.rethrows()
    }

    // Resources

    pub fn increment_used(&mut self, key: ResourceKey, value: &Value) {
        self.limiter.increment_used(key, value);
    }

    pub fn limits_reached(&self) -> bool {
        self.limiter.limits_reached()
    }

    pub fn resource_limiter(&self) -> &ResourceLimiter {
        &self.limiter
    }

    // Registers

    /// Host data carried through the render untouched.
    pub fn registers(&self) -> &Mapping {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Mapping {
        &mut self.registers
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.scopes.depth())
            .field("environments", &self.environments.len())
            .field("errors", &self.recorder.records().len())
            .field("interrupts", &self.interrupts.len())
            .finish_non_exhaustive()
    }
}

impl RenderContext for Context {
    fn resolve(&mut self, markup: &str) -> RenderResult {
        Context::resolve(self, markup)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.scopes.set(key, value);
    }

    fn depth(&self) -> usize {
        self.scopes.depth()
    }

    fn register(&self, name: &str) -> Option<Value> {
        self.registers.get(name).cloned()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
