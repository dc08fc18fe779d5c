//! Value types shared by providers, chains and callers.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::traits::Source;

/// A three-valued permission decision.
///
/// `Undefined` means "no opinion": a chain moves on to the next provider and
/// a caller applies its fallback.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TriState {
    True,
    False,
    #[default]
    Undefined,
}

impl TriState {
    pub fn is_definite(self) -> bool {
        self != Self::Undefined
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Undefined => None,
        }
    }

    /// Maps the state to a boolean, using `default` when undefined.
    pub fn or_else(self, default: bool) -> bool {
        self.as_bool().unwrap_or(default)
    }

    /// Maps the state to a boolean, computing the default only when undefined.
    pub fn or_else_get<F>(self, supplier: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        self.as_bool().unwrap_or_else(supplier)
    }

    /// Like [`TriState::or_else_get`] for a supplier that can fail.
    pub fn or_else_try_get<F, E>(self, supplier: F) -> Result<bool, E>
    where
        F: FnOnce() -> Result<bool, E>,
    {
        match self.as_bool() {
            Some(value) => Ok(value),
            None => supplier(),
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Undefined, Self::from)
    }
}

/// The answer type of a provider chain.
///
/// A chain stops at the first definite answer and yields
/// [`Decision::undefined`] when every provider declines.
pub trait Decision: Sized {
    fn undefined() -> Self;

    fn is_definite(&self) -> bool;

    /// Short label used in logs and metrics.
    fn outcome(&self) -> &'static str;
}

impl Decision for TriState {
    fn undefined() -> Self {
        Self::Undefined
    }

    fn is_definite(&self) -> bool {
        TriState::is_definite(*self)
    }

    fn outcome(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Undefined => "undefined",
        }
    }
}

impl Decision for Option<String> {
    fn undefined() -> Self {
        None
    }

    fn is_definite(&self) -> bool {
        self.is_some()
    }

    fn outcome(&self) -> &'static str {
        if self.is_some() { "present" } else { "absent" }
    }
}

/// A stable identifier for a subject that may not be online.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The nil identity stands for "no identity" and is rejected by queries.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for Identity {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for Identity {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The subject of a query, once reduced by the host.
///
/// `Online` subjects can be evaluated synchronously. `Unresolved` subjects
/// only carry an identity and go through the offline chains.
#[derive(Debug, Clone)]
pub enum Subject {
    Online(Arc<dyn Source>),
    Unresolved(Identity),
}

impl Subject {
    pub fn online(source: impl Source + 'static) -> Self {
        Self::Online(Arc::new(source))
    }

    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Online(source) => source.identity(),
            Self::Unresolved(identity) => Some(*identity),
        }
    }

    pub fn as_online(&self) -> Option<&Arc<dyn Source>> {
        match self {
            Self::Online(source) => Some(source),
            Self::Unresolved(_) => None,
        }
    }
}

impl From<Identity> for Subject {
    fn from(identity: Identity) -> Self {
        Self::Unresolved(identity)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online(source) => write!(f, "{}", source.name()),
            Self::Unresolved(identity) => write!(f, "{}", identity),
        }
    }
}
