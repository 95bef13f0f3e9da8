//! Stencil Value - runtime values for the Stencil render core.
//!
//! This crate provides:
//! - The `Value` model shared by scopes, environments and filters
//! - `Shared<T>`, the single-threaded container behind lists and maps
//! - `Deferred`, computations evaluated on first access
//! - Capability traits through which external objects (drops) take part in
//!   variable resolution
//! - `RenderError` and its constructors
//!
//! # Capabilities
//!
//! Resolution never probes an object for method names. A drop declares what it
//! supports by returning trait objects from the accessors on [`Droppable`]:
//!
//! | capability | used for |
//! |------------|----------|
//! | [`KeyedLookup`] | `object.name`, `object["name"]` |
//! | [`IndexedLookup`] | `object[0]` |
//! | [`Sizeable`] | `object.size`, `object.first`, `object.last` |
//! | [`ToRenderable`] | replacing the object with a plain value |
//! | [`ContextBindable`] | handing the object the active render context |

mod capability;
mod errors;
mod value;

pub use capability::{
    ContextBindable, Droppable, IndexedLookup, KeyedLookup, RenderContext, Sizeable, ToRenderable,
};
pub use errors::{
    argument_error, balance_error, evaluation_error, stack_depth_exceeded, syntax_error,
    undefined_filter, RenderError, RenderResult,
};
pub use value::{Deferred, DropRef, ListValue, MapValue, Mapping, Marker, Shared, Value};
