//! # Permission Resolver
//!
//! Resolves permissions and options by asking registered providers in
//! order until one of them gives a definite answer.
//!
//! - [`ProviderRegistry`] owns the four provider chains
//! - [`Permissions`], [`Options`] and [`Meta`] are the query facades
//! - [`FallbackPolicy`] decides what an undecided query returns

pub mod async_chain;
pub mod chain;
pub mod coercion;
pub mod fallback;
pub mod meta;
pub mod options;
pub mod permissions;
mod query;
pub mod registry;
pub mod telemetry;

use errors::PermissionError;
use futures_util::future::BoxFuture;

pub use async_chain::{AsyncProviderChain, IdentityQuery};
pub use chain::{ProviderChain, SourceQuery};
pub use coercion::{Coerced, coerce};
pub use fallback::{Fallback, FallbackPolicy};
pub use meta::Meta;
pub use options::Options;
pub use permissions::{Permissions, Requirement};
pub use registry::{ProviderKind, ProviderRegistry, Registration};
pub use telemetry::ResolverTelemetry;

/// An offline query whose input has already been validated.
pub type Pending<T> = BoxFuture<'static, Result<T, PermissionError>>;
