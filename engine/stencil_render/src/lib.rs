//! Stencil Render - variable resolution and render state for the Stencil
//! template engine.
//!
//! A [`Context`] is created per render. Tags use it to bind and look up
//! variables, call filters, signal `break`/`continue`, report errors inline
//! and account for the work done.
//!
//! # Architecture
//!
//! - `ScopeStack`: template-local bindings, innermost first, at most 100 deep
//! - `EnvironmentChain`: read-only host data consulted after the scopes
//! - `parse_literal`: the ordered literal grammar
//! - `split_path` / `Context::variable`: variable path resolution
//! - lazy fetch: `Deferred` values are evaluated on first access and memoized
//! - `FilterInvoker`: per-context filter table over a shared `FilterRegistry`
//! - `ResourceLimiter`, `InterruptStack`, `ErrorRecorder`: render bookkeeping
//!
//! # Re-exports
//!
//! Value types and error constructors come from `stencil_value`.

mod builder;
mod context;
mod environment;
mod filters;
mod interrupt;
mod lazy;
mod limits;
mod literal;
mod path;
mod pseudo;
mod recorder;
mod resolve;
mod scope;
mod scope_guard;
mod shared;

use std::sync::Once;

pub use builder::ContextBuilder;
pub use context::Context;
pub use environment::{Environment, EnvironmentChain};
pub use filters::{FilterFn, FilterInvoker, FilterModule, FilterRegistry, SharedFilterRegistry};
pub use interrupt::{Interrupt, InterruptStack};
pub use limits::{ResourceKey, ResourceLimiter, ResourceLimits};
pub use literal::{parse_literal, Literal};
pub use path::{split_path, Key, PathPart, PathParts};
pub use pseudo::PseudoMethod;
pub use recorder::{message_for, ErrorRecord, ErrorRecorder, ERROR_PREFIX, SYNTAX_ERROR_PREFIX};
pub use scope::{ScopeStack, MAX_NESTING};
pub use scope_guard::ScopedContext;
pub use shared::SharedMutableRegistry;

pub use stencil_value::{
    argument_error, balance_error, evaluation_error, stack_depth_exceeded, syntax_error,
    undefined_filter, ContextBindable, Deferred, DropRef, Droppable, IndexedLookup, KeyedLookup,
    ListValue, MapValue, Mapping, Marker, RenderContext, RenderError, RenderResult, Shared,
    Sizeable, ToRenderable, Value,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=stencil_render=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // A host that installed its own subscriber keeps it.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
