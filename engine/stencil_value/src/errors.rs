//! Error types for rendering.
//!
//! Structural misuse of the context API (`StackDepthExceeded`, `Balance`,
//! `Argument`) always propagates to the caller. Everything else is an
//! evaluation-time error that the context's error recorder may turn into an
//! inline message instead.
//!
//! Constructor functions (e.g. `balance_error()`) are the public way to build
//! errors, mirroring how the rest of the workspace creates them.

use thiserror::Error;

use crate::value::Value;

/// Result of rendering work.
pub type RenderResult<T = Value> = Result<T, RenderError>;

/// Error raised while resolving variables or invoking filters.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A push would nest scopes (or deferred evaluations) deeper than allowed.
    #[error("nesting too deep: more than {limit} nested levels")]
    StackDepthExceeded { limit: usize },

    /// `pop` was called with only the initial scope left.
    #[error("context push and pop calls are unbalanced")]
    Balance,

    /// A filter module could not be registered.
    #[error("{message}")]
    Argument { message: String },

    /// Malformed template markup, reported by the host parser or a tag.
    #[error("{message}")]
    Syntax { message: String },

    /// No registered filter has this name.
    #[error("undefined filter {name}")]
    UndefinedFilter { name: String },

    /// Any other failure raised while evaluating a template.
    #[error("{message}")]
    Evaluation { message: String },
}

impl RenderError {
    /// Structural errors come from API misuse and are never recorded.
    #[inline]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::StackDepthExceeded { .. } | Self::Balance | Self::Argument { .. }
        )
    }

    /// Syntax errors get their own prefix in inline messages.
    #[inline]
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

/// Scope or evaluation nesting passed `limit`.
#[cold]
pub fn stack_depth_exceeded(limit: usize) -> RenderError {
    RenderError::StackDepthExceeded { limit }
}

/// Unbalanced `pop`.
#[cold]
pub fn balance_error() -> RenderError {
    RenderError::Balance
}

/// Invalid filter registration.
#[cold]
pub fn argument_error(message: impl Into<String>) -> RenderError {
    RenderError::Argument {
        message: message.into(),
    }
}

/// Malformed markup.
#[cold]
pub fn syntax_error(message: impl Into<String>) -> RenderError {
    RenderError::Syntax {
        message: message.into(),
    }
}

/// Unknown filter name.
#[cold]
pub fn undefined_filter(name: &str) -> RenderError {
    RenderError::UndefinedFilter {
        name: name.to_string(),
    }
}

/// Generic evaluation failure.
#[cold]
pub fn evaluation_error(message: impl Into<String>) -> RenderError {
    RenderError::Evaluation {
        message: message.into(),
    }
}
