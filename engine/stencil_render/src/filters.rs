//! Filter modules, the process-wide registry, and per-context dispatch.
//!
//! Hosts group filters into named [`FilterModule`]s and register them either
//! globally (in a [`FilterRegistry`] shared by every context) or on a single
//! context. A context builds its [`FilterInvoker`] on first use from the
//! global modules followed by its own; later modules win on name clashes.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use stencil_value::{argument_error, RenderContext, RenderError, RenderResult, Value};

use crate::shared::SharedMutableRegistry;

/// A filter implementation. `args[0]` is the filtered input.
pub type FilterFn = Arc<dyn Fn(&mut dyn RenderContext, &[Value]) -> RenderResult + Send + Sync>;

/// Registry handle shared between contexts.
pub type SharedFilterRegistry = SharedMutableRegistry<FilterRegistry>;

/// A named group of filters.
#[derive(Clone)]
pub struct FilterModule {
    name: String,
    filters: Vec<(String, FilterFn)>,
}

impl FilterModule {
    pub fn new(name: impl Into<String>) -> Self {
        FilterModule {
            name: name.into(),
            filters: Vec::new(),
        }
    }

    /// Add a filter. A later filter with the same name replaces the earlier
    /// one when the module is applied.
    #[must_use]
    pub fn with_filter<F>(mut self, name: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&mut dyn RenderContext, &[Value]) -> RenderResult + Send + Sync + 'static,
    {
        self.filters.push((name.into(), Arc::new(filter)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|(name, _)| name.as_str())
    }

    /// Reject modules that define nothing or use names templates cannot call.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.filters.is_empty() {
            return Err(argument_error(format!(
                "filter module {} defines no filters",
                self.name
            )));
        }
        if let Some(bad) = self.filter_names().find(|name| !is_identifier(name)) {
            return Err(argument_error(format!(
                "filter module {} has invalid filter name {bad:?}",
                self.name
            )));
        }
        Ok(())
    }

    fn filters(&self) -> impl Iterator<Item = (&str, &FilterFn)> {
        self.filters.iter().map(|(name, filter)| (name.as_str(), filter))
    }
}

impl fmt::Debug for FilterModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterModule")
            .field("name", &self.name)
            .field("filters", &self.filter_names().collect::<Vec<_>>())
            .finish()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Modules registered for every context in the process.
///
/// Construct one at startup, share it through [`SharedFilterRegistry`], and
/// `clear` it at teardown. Contexts that already built their filter table
/// keep using it.
#[derive(Clone, Debug, Default)]
pub struct FilterRegistry {
    modules: Vec<FilterModule>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: FilterModule) -> Result<(), RenderError> {
        module.validate()?;
        tracing::debug!(module = module.name(), "registered global filter module");
        self.modules.push(module);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.modules.clear();
    }

    pub fn modules(&self) -> &[FilterModule] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Name-to-filter table for one context.
#[derive(Clone, Default)]
pub struct FilterInvoker {
    table: FxHashMap<String, FilterFn>,
    modules: Vec<String>,
}

impl FilterInvoker {
    /// Build a table from `modules` in order.
    pub fn new<'a>(modules: impl IntoIterator<Item = &'a FilterModule>) -> Self {
        let mut invoker = Self::default();
        for module in modules {
            invoker.apply(module);
        }
        tracing::debug!(
            modules = invoker.modules.len(),
            filters = invoker.table.len(),
            "built filter table"
        );
        invoker
    }

    /// Add a module after construction. Filters looked up earlier stay
    /// valid; names the module defines now resolve to its filters.
    pub fn extend(&mut self, module: &FilterModule) {
        self.apply(module);
        tracing::debug!(module = module.name(), "extended filter table");
    }

    fn apply(&mut self, module: &FilterModule) {
        for (name, filter) in module.filters() {
            self.table.insert(name.to_string(), Arc::clone(filter));
        }
        self.modules.push(module.name().to_string());
    }

    pub fn lookup(&self, name: &str) -> Option<&FilterFn> {
        self.table.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Names of applied modules, in application order.
    pub fn module_names(&self) -> &[String] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for FilterInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.table.keys().collect();
        names.sort();
        f.debug_struct("FilterInvoker")
            .field("modules", &self.modules)
            .field("filters", &names)
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
