//! Read-only data sources consulted after the scope stack.
//!
//! Environments are supplied by the host (site data, request data, computed
//! providers) and outlive the context. The chain never adds or removes
//! entries in them; the only write it performs is memoizing an evaluated
//! deferred value back into the entry it came from.

use std::fmt;
use std::rc::Rc;

use stencil_value::{KeyedLookup, MapValue, Mapping};

/// One external data source.
#[derive(Clone)]
pub enum Environment {
    /// Plain mapping, shared with the host.
    Mapping(MapValue),
    /// Computed provider answering keyed lookups.
    Provider(Rc<dyn KeyedLookup>),
}

impl Environment {
    pub fn mapping(entries: Mapping) -> Self {
        Environment::Mapping(MapValue::new(entries))
    }

    pub fn provider(provider: impl KeyedLookup + 'static) -> Self {
        Environment::Provider(Rc::new(provider))
    }
}

impl From<Mapping> for Environment {
    fn from(entries: Mapping) -> Self {
        Environment::mapping(entries)
    }
}

impl From<MapValue> for Environment {
    fn from(entries: MapValue) -> Self {
        Environment::Mapping(entries)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Mapping(entries) => f.debug_tuple("Mapping").field(entries).finish(),
            Environment::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Ordered environments, first match wins.
#[derive(Clone, Debug, Default)]
pub struct EnvironmentChain {
    environments: Vec<Environment>,
}

impl EnvironmentChain {
    pub fn new(environments: Vec<Environment>) -> Self {
        EnvironmentChain { environments }
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Environment> {
        self.environments.get(index)
    }

    /// Default lookup target when nothing else matched.
    pub fn last(&self) -> Option<&Environment> {
        self.environments.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Environment> {
        self.environments.iter()
    }
}
