//! # Permission Checks
//!
//! Caller-facing permission queries over a [`ProviderRegistry`].
//!
//! Online queries run synchronously on the caller's thread. Offline
//! queries validate their input immediately and return a [`Pending`]
//! future that runs the offline chain when polled.

use std::sync::Arc;

use config::{Config, LevelConfig};
use errors::PermissionError;
use futures_util::FutureExt;
use perm_core::{Identity, LevelSource, Source, Subject, SubjectReducer, TriState};

use crate::Pending;
use crate::fallback::{Fallback, FallbackPolicy};
use crate::query::{reduce_online, require_identity, require_key};
use crate::registry::ProviderRegistry;
use crate::telemetry::ResolverTelemetry;

/// Permission queries with fallbacks.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Resolves permissions through the registry's permission chains and
/// applies a [`Fallback`] when no provider answers.
///
/// ## Usage
/// ```rust,no_run
/// use perm_core::{Source, TriState};
/// use resolver::{Permissions, ProviderRegistry};
///
/// # fn demo(source: &dyn Source) -> Result<(), errors::PermissionError> {
/// let registry = ProviderRegistry::global();
/// registry.add_permission_provider(|_: &dyn Source, permission: &str| {
///     Ok::<_, errors::ProviderError>(TriState::from(permission == "fly"))
/// });
///
/// let permissions = Permissions::global();
/// assert!(permissions.check(source, "fly")?);
/// assert!(!permissions.check_or(source, "build", false)?);
/// # Ok(())
/// # }
/// ```
///
/// ## Errors
/// - [`PermissionError::InvalidInput`] for an empty permission or a nil
///   identity, before any provider runs
/// - [`PermissionError::UnsupportedSubject`] when an entity cannot be
///   reduced to an online source
/// - [`PermissionError::Provider`] when a provider fails
#[derive(Clone)]
pub struct Permissions {
    registry: Arc<ProviderRegistry>,
    fallback: FallbackPolicy,
}

impl Permissions {
    pub fn new(registry: Arc<ProviderRegistry>, levels: LevelConfig) -> Self {
        Self {
            registry,
            fallback: FallbackPolicy::new(levels, ResolverTelemetry::default()),
        }
    }

    pub fn from_config(registry: Arc<ProviderRegistry>, config: &Config) -> Self {
        Self {
            registry,
            fallback: FallbackPolicy::new(
                config.levels.clone(),
                ResolverTelemetry::from_config(&config.observability),
            ),
        }
    }

    /// Queries against the process-wide registry with default level bounds.
    pub fn global() -> Self {
        Self::new(ProviderRegistry::global(), LevelConfig::default())
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn fallback_policy(&self) -> &FallbackPolicy {
        &self.fallback
    }

    /// The raw chain result for `permission`.
    pub fn value(
        &self,
        source: &dyn Source,
        permission: &str,
    ) -> Result<TriState, PermissionError> {
        require_key("permission", permission)?;
        Ok(self.registry.resolve_permission(source, permission)?)
    }

    /// Checks `permission`, denying when no provider answers.
    pub fn check(&self, source: &dyn Source, permission: &str) -> Result<bool, PermissionError> {
        self.check_with(source, permission, Fallback::Value(false))
    }

    pub fn check_or(
        &self,
        source: &dyn Source,
        permission: &str,
        default: bool,
    ) -> Result<bool, PermissionError> {
        self.check_with(source, permission, Fallback::Value(default))
    }

    /// Checks `permission`, falling back to the source's permission level.
    pub fn check_level(
        &self,
        source: &dyn Source,
        permission: &str,
        level: i32,
    ) -> Result<bool, PermissionError> {
        self.check_with(source, permission, Fallback::Level(level))
    }

    /// Checks `permission`, running `supplier` only when no provider answers.
    pub fn check_or_else<F>(
        &self,
        source: &dyn Source,
        permission: &str,
        supplier: F,
    ) -> Result<bool, PermissionError>
    where
        F: FnOnce() -> bool,
    {
        let state = self.value(source, permission)?;
        Ok(self.fallback.predicate(state, supplier))
    }

    pub fn check_with(
        &self,
        source: &dyn Source,
        permission: &str,
        fallback: Fallback,
    ) -> Result<bool, PermissionError> {
        let state = self.value(source, permission)?;
        Ok(self.fallback.online(state, fallback, source))
    }

    /// A reusable check of `permission` with `fallback`.
    pub fn require(
        &self,
        permission: &str,
        fallback: impl Into<Fallback>,
    ) -> Result<Requirement, PermissionError> {
        require_key("permission", permission)?;
        Ok(Requirement {
            permissions: self.clone(),
            permission: permission.to_string(),
            fallback: fallback.into(),
        })
    }

    pub fn entity_value<E: ?Sized>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        permission: &str,
    ) -> Result<TriState, PermissionError> {
        let source = reduce_online(reducer, entity)?;
        self.value(source.as_ref(), permission)
    }

    pub fn entity_check<E: ?Sized>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        permission: &str,
    ) -> Result<bool, PermissionError> {
        self.entity_check_with(reducer, entity, permission, Fallback::Value(false))
    }

    pub fn entity_check_or<E: ?Sized>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        permission: &str,
        default: bool,
    ) -> Result<bool, PermissionError> {
        self.entity_check_with(reducer, entity, permission, Fallback::Value(default))
    }

    pub fn entity_check_level<E: ?Sized>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        permission: &str,
        level: i32,
    ) -> Result<bool, PermissionError> {
        self.entity_check_with(reducer, entity, permission, Fallback::Level(level))
    }

    pub fn entity_check_with<E: ?Sized>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        permission: &str,
        fallback: Fallback,
    ) -> Result<bool, PermissionError> {
        let source = reduce_online(reducer, entity)?;
        self.check_with(source.as_ref(), permission, fallback)
    }

    /// Checks `permission` for either kind of subject with a level fallback.
    ///
    /// Online subjects are resolved immediately and use their own level
    /// check. Unresolved subjects go through the offline chain and ask
    /// `host` for the identity's level.
    pub fn check_subject(
        &self,
        subject: &Subject,
        permission: &str,
        level: i32,
        host: Arc<dyn LevelSource>,
    ) -> Result<Pending<bool>, PermissionError> {
        match subject {
            Subject::Online(source) => {
                let allowed = self.check_level(source.as_ref(), permission, level)?;
                Ok(futures_util::future::ready(Ok::<_, PermissionError>(allowed)).boxed())
            }
            Subject::Unresolved(identity) => {
                self.offline_check_level(*identity, permission, level, host)
            }
        }
    }

    /// The raw offline chain result for `permission`.
    pub fn offline_value(
        &self,
        identity: Identity,
        permission: &str,
    ) -> Result<Pending<TriState>, PermissionError> {
        require_identity(identity)?;
        require_key("permission", permission)?;

        let pending = self.registry.resolve_offline_permission(identity, permission);
        Ok(async move { Ok::<_, PermissionError>(pending.await?) }.boxed())
    }

    pub fn offline_check(
        &self,
        identity: Identity,
        permission: &str,
    ) -> Result<Pending<bool>, PermissionError> {
        self.offline_check_or(identity, permission, false)
    }

    pub fn offline_check_or(
        &self,
        identity: Identity,
        permission: &str,
        default: bool,
    ) -> Result<Pending<bool>, PermissionError> {
        let pending = self.offline_value(identity, permission)?;
        let fallback = self.fallback.clone();
        Ok(async move {
            let state = pending.await?;
            Ok::<_, PermissionError>(fallback.literal(state, default))
        }
        .boxed())
    }

    /// Offline check falling back to the host-reported level of `identity`.
    pub fn offline_check_level(
        &self,
        identity: Identity,
        permission: &str,
        level: i32,
        host: Arc<dyn LevelSource>,
    ) -> Result<Pending<bool>, PermissionError> {
        let pending = self.offline_value(identity, permission)?;
        let fallback = self.fallback.clone();
        Ok(async move {
            let state = pending.await?;
            Ok::<_, PermissionError>(fallback.offline_level(state, level, identity, host.as_ref()))
        }
        .boxed())
    }
}

/// A permission check bound to a permission and a fallback.
#[derive(Clone)]
pub struct Requirement {
    permissions: Permissions,
    permission: String,
    fallback: Fallback,
}

impl Requirement {
    pub fn permission(&self) -> &str {
        &self.permission
    }

    pub fn fallback(&self) -> Fallback {
        self.fallback
    }

    pub fn test(&self, source: &dyn Source) -> Result<bool, PermissionError> {
        self.permissions
            .check_with(source, &self.permission, self.fallback)
    }
}

impl std::fmt::Debug for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Requirement")
            .field("permission", &self.permission)
            .field("fallback", &self.fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errors::ProviderError;

    #[derive(Debug)]
    struct Player {
        level: u8,
    }

    impl Source for Player {
        fn name(&self) -> &str {
            "player"
        }

        fn has_permission_level(&self, level: u8) -> bool {
            self.level >= level
        }
    }

    fn permissions() -> Permissions {
        let registry = Arc::new(ProviderRegistry::new());
        registry.add_permission_provider(|_: &dyn Source, permission: &str| {
            Ok::<_, ProviderError>(match permission {
                "fly" => TriState::True,
                "ban" => TriState::False,
                _ => TriState::Undefined,
            })
        });
        Permissions::new(registry, LevelConfig::default())
    }

    #[test]
    fn test_check_variants() {
        let permissions = permissions();
        let player = Player { level: 1 };

        assert!(permissions.check(&player, "fly").unwrap());
        assert!(!permissions.check_or(&player, "ban", true).unwrap());
        assert!(!permissions.check(&player, "build").unwrap());
        assert!(permissions.check_or(&player, "build", true).unwrap());
        assert!(permissions.check_level(&player, "build", 1).unwrap());
        assert!(!permissions.check_level(&player, "build", 2).unwrap());
    }

    #[test]
    fn test_empty_permission_is_rejected() {
        let permissions = permissions();
        let err = permissions.check(&Player { level: 0 }, "").unwrap_err();
        assert!(matches!(err, PermissionError::InvalidInput { .. }));
        assert!(permissions.require("", true).is_err());
    }

    #[test]
    fn test_requirement() {
        let permissions = permissions();
        let requirement = permissions.require("build", 2).unwrap();
        assert_eq!(requirement.fallback(), Fallback::Level(2));
        assert_eq!(requirement.permission(), "build");

        assert!(requirement.test(&Player { level: 3 }).unwrap());
        assert!(!requirement.test(&Player { level: 1 }).unwrap());
    }

    #[tokio::test]
    async fn test_offline_nil_identity_fails_before_future() {
        let permissions = permissions();
        let result = permissions.offline_check(Identity::new(uuid::Uuid::nil()), "fly");
        assert!(matches!(result, Err(PermissionError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_offline_without_providers_uses_default() {
        let permissions = permissions();
        let allowed = permissions
            .offline_check_or(Identity::random(), "fly", true)
            .unwrap()
            .await
            .unwrap();
        assert!(allowed);
    }
}
