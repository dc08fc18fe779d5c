//! # Permission Resolver Core
//!
//! Shared types and traits for the permission resolver.
//!
//! This crate provides:
//! - [`TriState`], the three-valued decision every permission query yields
//! - [`Identity`] and [`Subject`], the things a query is evaluated against
//! - The four provider traits the resolver chains are built from
//! - The host capabilities the resolver consumes ([`Source`],
//!   [`SubjectReducer`], [`LevelSource`])

pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use traits::{
    LevelSource, OfflineOptionProvider, OfflinePermissionProvider, OptionProvider,
    PermissionProvider, Source, SubjectReducer,
};
pub use types::{Decision, Identity, Subject, TriState};
