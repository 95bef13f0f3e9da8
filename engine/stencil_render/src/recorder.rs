//! Error policy for evaluation-time failures.
//!
//! In the default mode an error raised while rendering a node is recorded
//! and replaced by an inline message, so one broken expression does not take
//! down the whole template. With `rethrow` set the error is handed straight
//! back. Structural errors (nesting depth, unbalanced pops, bad filter
//! registration) are always handed back and never recorded.

use stencil_value::RenderError;

/// Prefix for inline messages of syntax errors.
pub const SYNTAX_ERROR_PREFIX: &str = "Stencil syntax error";

/// Prefix for inline messages of every other error.
pub const ERROR_PREFIX: &str = "Stencil error";

/// A recorded error and the message substituted into the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorRecord {
    pub error: RenderError,
    pub message: String,
}

/// Accumulates recorded errors for one render.
#[derive(Clone, Debug, Default)]
pub struct ErrorRecorder {
    rethrow: bool,
    records: Vec<ErrorRecord>,
}

impl ErrorRecorder {
    pub fn new(rethrow: bool) -> Self {
        Self {
            rethrow,
            records: Vec::new(),
        }
    }

    #[inline]
    pub fn rethrows(&self) -> bool {
        self.rethrow
    }

    /// Record `err` and return its inline message, or hand it back unchanged.
    pub fn handle(&mut self, err: RenderError) -> Result<String, RenderError> {
        if self.rethrow || err.is_structural() {
            return Err(err);
        }
        let message = message_for(&err);
        tracing::debug!(%message, "recorded render error");
        self.records.push(ErrorRecord {
            error: err,
            message: message.clone(),
        });
        Ok(message)
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Raw recorded errors, oldest first.
    pub fn errors(&self) -> impl Iterator<Item = &RenderError> {
        self.records.iter().map(|record| &record.error)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// User-facing message for `err`.
pub fn message_for(err: &RenderError) -> String {
    if err.is_syntax() {
        format!("{SYNTAX_ERROR_PREFIX}: {err}")
    } else {
        format!("{ERROR_PREFIX}: {err}")
    }
}
