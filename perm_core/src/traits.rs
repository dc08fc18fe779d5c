//! Core traits for the permission resolver

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use errors::{PermissionError, ProviderError};

use crate::types::{Identity, Subject, TriState};

/// An online subject that can be evaluated synchronously.
pub trait Source: Send + Sync + fmt::Debug {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    fn identity(&self) -> Option<Identity> {
        None
    }

    /// Coarse host-level privilege check.
    fn has_permission_level(&self, level: u8) -> bool;
}

/// Supplies permission decisions for online sources.
///
/// Return [`TriState::Undefined`] to let the next provider answer.
pub trait PermissionProvider: Send + Sync {
    fn check_permission(
        &self,
        source: &dyn Source,
        permission: &str,
    ) -> Result<TriState, ProviderError>;
}

impl<F> PermissionProvider for F
where
    F: Fn(&dyn Source, &str) -> Result<TriState, ProviderError> + Send + Sync,
{
    fn check_permission(
        &self,
        source: &dyn Source,
        permission: &str,
    ) -> Result<TriState, ProviderError> {
        self(source, permission)
    }
}

/// Supplies option values for online sources.
///
/// Return `None` to let the next provider answer.
pub trait OptionProvider: Send + Sync {
    fn request_option(&self, source: &dyn Source, key: &str)
    -> Result<Option<String>, ProviderError>;
}

impl<F> OptionProvider for F
where
    F: Fn(&dyn Source, &str) -> Result<Option<String>, ProviderError> + Send + Sync,
{
    fn request_option(
        &self,
        source: &dyn Source,
        key: &str,
    ) -> Result<Option<String>, ProviderError> {
        self(source, key)
    }
}

/// Supplies permission decisions for identities that may be offline.
#[async_trait]
pub trait OfflinePermissionProvider: Send + Sync {
    async fn check_permission(
        &self,
        identity: Identity,
        permission: &str,
    ) -> Result<TriState, ProviderError>;
}

#[async_trait]
impl<F, Fut> OfflinePermissionProvider for F
where
    F: Fn(Identity, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<TriState, ProviderError>> + Send,
{
    async fn check_permission(
        &self,
        identity: Identity,
        permission: &str,
    ) -> Result<TriState, ProviderError> {
        self(identity, permission.to_string()).await
    }
}

/// Supplies option values for identities that may be offline.
#[async_trait]
pub trait OfflineOptionProvider: Send + Sync {
    async fn request_option(
        &self,
        identity: Identity,
        key: &str,
    ) -> Result<Option<String>, ProviderError>;
}

#[async_trait]
impl<F, Fut> OfflineOptionProvider for F
where
    F: Fn(Identity, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>, ProviderError>> + Send,
{
    async fn request_option(
        &self,
        identity: Identity,
        key: &str,
    ) -> Result<Option<String>, ProviderError> {
        self(identity, key.to_string()).await
    }
}

/// Host capability that reduces an entity to a query subject.
///
/// Fails with [`PermissionError::UnsupportedSubject`] when the entity has no
/// server-side context.
pub trait SubjectReducer<E: ?Sized>: Send + Sync {
    fn reduce(&self, entity: &E) -> Result<Subject, PermissionError>;
}

/// Host capability reporting the coarse privilege level of an identity.
pub trait LevelSource: Send + Sync {
    fn permission_level(&self, identity: Identity) -> u8;
}

impl<F> LevelSource for F
where
    F: Fn(Identity) -> u8 + Send + Sync,
{
    fn permission_level(&self, identity: Identity) -> u8 {
        self(identity)
    }
}
