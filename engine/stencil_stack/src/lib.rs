//! Stack growth guard for recursive resolution.
//!
//! Resolving a variable path can re-enter the resolver: bracketed segments
//! such as `list[index.value]` resolve their inner markup through the full
//! pipeline, and deferred values evaluated with the render context may look
//! up further variables. Each of those hops is a native stack frame, so the
//! resolver entry point wraps its body in [`with_stack_headroom`].
//!
//! The nesting itself is bounded elsewhere (the scope stack and the deferred
//! evaluation depth both stop at 100). This crate only makes sure a legal,
//! deeply nested resolution never runs out of native stack on small threads.
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: plain call.

/// Remaining stack below which a new segment is allocated (64KB).
const RED_ZONE: usize = 64 * 1024;

/// Size of each newly allocated stack segment (512KB).
const SEGMENT_SIZE: usize = 512 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// pub fn resolve(&mut self, markup: &str) -> RenderResult {
///     with_stack_headroom(|| self.resolve_inner(markup))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn with_stack_headroom<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn with_stack_headroom<R>(f: impl FnOnce() -> R) -> R {
    f()
}
