//! Resource accounting for a single render.
//!
//! Three counters track how much work a render has done. Each may have a
//! ceiling; `limits_reached` reports whether any counter has gone strictly
//! past its ceiling. The limiter never stops evaluation itself: the host's
//! render loop polls it after each unit of work and aborts on its own.

use std::fmt;
use std::str::FromStr;

use stencil_value::{argument_error, RenderError, Value};

/// Optional ceilings, one per counter. `None` means unlimited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResourceLimits {
    pub render_length_limit: Option<u64>,
    pub render_score_limit: Option<u64>,
    pub assign_score_limit: Option<u64>,
}

impl ResourceLimits {
    /// No ceilings at all.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Build limits from `(key, ceiling)` pairs.
    ///
    /// Recognized keys are `render_length_limit`, `render_score_limit` and
    /// `assign_score_limit`; anything else is ignored with a warning.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        let mut limits = Self::default();
        for (key, ceiling) in pairs {
            match key {
                "render_length_limit" => limits.render_length_limit = Some(ceiling),
                "render_score_limit" => limits.render_score_limit = Some(ceiling),
                "assign_score_limit" => limits.assign_score_limit = Some(ceiling),
                other => tracing::warn!(key = other, "ignoring unknown resource limit"),
            }
        }
        limits
    }

    #[must_use]
    pub fn with_render_length_limit(mut self, ceiling: u64) -> Self {
        self.render_length_limit = Some(ceiling);
        self
    }

    #[must_use]
    pub fn with_render_score_limit(mut self, ceiling: u64) -> Self {
        self.render_score_limit = Some(ceiling);
        self
    }

    #[must_use]
    pub fn with_assign_score_limit(mut self, ceiling: u64) -> Self {
        self.assign_score_limit = Some(ceiling);
        self
    }

    fn ceiling(&self, key: ResourceKey) -> Option<u64> {
        match key {
            ResourceKey::RenderLength => self.render_length_limit,
            ResourceKey::RenderScore => self.render_score_limit,
            ResourceKey::AssignScore => self.assign_score_limit,
        }
    }
}

/// One of the three usage counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    /// Characters written to the output.
    RenderLength,
    /// Nodes rendered.
    RenderScore,
    /// Size of values assigned to variables.
    AssignScore,
}

impl ResourceKey {
    pub const ALL: [ResourceKey; 3] = [
        ResourceKey::RenderLength,
        ResourceKey::RenderScore,
        ResourceKey::AssignScore,
    ];

    /// Counter name as hosts spell it.
    pub fn name(self) -> &'static str {
        match self {
            ResourceKey::RenderLength => "render_length_current",
            ResourceKey::RenderScore => "render_score_current",
            ResourceKey::AssignScore => "assign_score_current",
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKey {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| argument_error(format!("unknown resource counter {s}")))
    }
}

/// Usage counters checked against [`ResourceLimits`].
#[derive(Clone, Debug, Default)]
pub struct ResourceLimiter {
    limits: ResourceLimits,
    render_length: u64,
    render_score: u64,
    assign_score: u64,
}

impl ResourceLimiter {
    pub fn new(limits: ResourceLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Current value of a counter.
    pub fn used(&self, key: ResourceKey) -> u64 {
        match key {
            ResourceKey::RenderLength => self.render_length,
            ResourceKey::RenderScore => self.render_score,
            ResourceKey::AssignScore => self.assign_score,
        }
    }

    /// Add the cost of `value` to a counter.
    pub fn increment_used(&mut self, key: ResourceKey, value: &Value) {
        let cost = Self::cost_of(value);
        let ceiling = self.limits.ceiling(key);
        let counter = match key {
            ResourceKey::RenderLength => &mut self.render_length,
            ResourceKey::RenderScore => &mut self.render_score,
            ResourceKey::AssignScore => &mut self.assign_score,
        };
        let before = *counter;
        *counter = before.saturating_add(cost);
        if let Some(ceiling) = ceiling {
            if before <= ceiling && *counter > ceiling {
                tracing::debug!(%key, used = *counter, ceiling, "resource limit exceeded");
            }
        }
    }

    /// Whether any counter is strictly past its ceiling.
    pub fn limits_reached(&self) -> bool {
        ResourceKey::ALL.into_iter().any(|key| {
            self.limits
                .ceiling(key)
                .is_some_and(|ceiling| self.used(key) > ceiling)
        })
    }

    /// Strings cost their length in characters, lists and maps their number
    /// of entries, every other value 1.
    pub fn cost_of(value: &Value) -> u64 {
        value
            .collection_len()
            .map_or(1, |len| u64::try_from(len).unwrap_or(u64::MAX))
    }
}
