//! # Fallback Policy
//!
//! Turns an undecided chain result into a concrete value. Four shapes are
//! supported:
//!
//! 1. a literal default
//! 2. a lazily evaluated predicate
//! 3. a typed default combined with value coercion
//! 4. a host permission-level check at a clamped level
//!
//! A fallback is only ever consulted when the chain result is undefined.

use config::LevelConfig;
use perm_core::{Identity, LevelSource, Source, TriState};
use tracing::trace;

use crate::telemetry::ResolverTelemetry;

/// The fallback a permission check applies when no provider answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Use this value.
    Value(bool),
    /// Ask the host whether the subject reaches this level.
    Level(i32),
    /// Ask the host whether the subject reaches the configured default level.
    DefaultLevel,
}

impl Default for Fallback {
    fn default() -> Self {
        Self::Value(false)
    }
}

impl From<bool> for Fallback {
    fn from(value: bool) -> Self {
        Self::Value(value)
    }
}

impl From<i32> for Fallback {
    fn from(level: i32) -> Self {
        Self::Level(level)
    }
}

/// Applies fallbacks using the host level bounds.
#[derive(Debug, Clone, Default)]
pub struct FallbackPolicy {
    levels: LevelConfig,
    telemetry: ResolverTelemetry,
}

impl FallbackPolicy {
    pub fn new(levels: LevelConfig, telemetry: ResolverTelemetry) -> Self {
        Self { levels, telemetry }
    }

    pub fn levels(&self) -> &LevelConfig {
        &self.levels
    }

    /// The level `fallback` asks for after clamping, if it asks for one.
    pub fn required_level(&self, fallback: Fallback) -> Option<u8> {
        match fallback {
            Fallback::Value(_) => None,
            Fallback::Level(level) => Some(self.levels.clamp(level)),
            Fallback::DefaultLevel => Some(
                self.levels
                    .clamp(i32::from(self.levels.default_required_level)),
            ),
        }
    }

    pub fn literal(&self, state: TriState, default: bool) -> bool {
        if !state.is_definite() {
            self.telemetry.record_fallback("literal");
        }
        state.or_else(default)
    }

    pub fn predicate<F>(&self, state: TriState, supplier: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        state.or_else_get(|| {
            self.telemetry.record_fallback("predicate");
            supplier()
        })
    }

    pub fn try_predicate<F, E>(&self, state: TriState, supplier: F) -> Result<bool, E>
    where
        F: FnOnce() -> Result<bool, E>,
    {
        state.or_else_try_get(|| {
            self.telemetry.record_fallback("predicate");
            supplier()
        })
    }

    pub fn typed<T>(&self, value: Option<T>, default: T) -> T {
        value.unwrap_or_else(|| {
            self.telemetry.record_fallback("typed");
            default
        })
    }

    /// Clamps `requested` and hands it to `check` when `state` is undefined.
    pub fn level<F>(&self, state: TriState, requested: i32, check: F) -> bool
    where
        F: FnOnce(u8) -> bool,
    {
        state.or_else_get(|| {
            let level = self.levels.clamp(requested);
            trace!(requested, level, "Falling back to permission level");
            self.telemetry.record_fallback("level");
            check(level)
        })
    }

    /// Applies `fallback` for an online source.
    pub fn online(&self, state: TriState, fallback: Fallback, source: &dyn Source) -> bool {
        match fallback {
            Fallback::Value(default) => self.literal(state, default),
            Fallback::Level(level) => {
                self.level(state, level, |level| source.has_permission_level(level))
            }
            Fallback::DefaultLevel => self.level(
                state,
                i32::from(self.levels.default_required_level),
                |level| source.has_permission_level(level),
            ),
        }
    }

    /// Applies a level fallback for an identity using the host's level
    /// lookup.
    pub fn offline_level(
        &self,
        state: TriState,
        requested: i32,
        identity: Identity,
        host: &dyn LevelSource,
    ) -> bool {
        self.level(state, requested, |level| {
            host.permission_level(identity) >= level
        })
    }
}
