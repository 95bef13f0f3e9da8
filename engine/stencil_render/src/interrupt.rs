//! Control-flow signals crossing nested block evaluation.
//!
//! A `break` or `continue` tag deep inside nested blocks cannot unwind the
//! host's call stack. It pushes a signal instead; each enclosing block checks
//! `has_interrupt` after rendering a child and stops early, and the loop that
//! owns the signal pops it.

/// A pending control-flow signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// Leave the innermost loop.
    Break,
    /// Skip to the next iteration of the innermost loop.
    Continue,
}

/// LIFO stack of pending signals.
#[derive(Clone, Debug, Default)]
pub struct InterruptStack {
    signals: Vec<Interrupt>,
}

impl InterruptStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, signal: Interrupt) {
        tracing::trace!(?signal, "interrupt raised");
        self.signals.push(signal);
    }

    /// Remove and return the most recent signal.
    pub fn pop(&mut self) -> Option<Interrupt> {
        self.signals.pop()
    }

    /// Whether any signal is pending.
    #[inline]
    pub fn has_interrupt(&self) -> bool {
        !self.signals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
