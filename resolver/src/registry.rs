//! # Provider Registry
//!
//! Holds the four provider chains: online permissions, online options,
//! offline permissions and offline options.
//!
//! A process-wide registry is available through
//! [`ProviderRegistry::global`]. Isolated registries can be created with
//! [`ProviderRegistry::new`] for tests or embedding.

use std::sync::{Arc, LazyLock};

use errors::ProviderError;
use futures_util::future::BoxFuture;
use perm_core::{
    Identity, OfflineOptionProvider, OfflinePermissionProvider, OptionProvider,
    PermissionProvider, Source, TriState,
};
use strum::{Display, EnumString};

use crate::async_chain::AsyncProviderChain;
use crate::chain::ProviderChain;
use crate::telemetry::ResolverTelemetry;

static GLOBAL: LazyLock<Arc<ProviderRegistry>> =
    LazyLock::new(|| Arc::new(ProviderRegistry::default()));

/// The four provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ProviderKind {
    Permission,
    Option,
    OfflinePermission,
    OfflineOption,
}

/// A provider tagged with the chain it belongs to.
pub enum Registration {
    Permission(Arc<dyn PermissionProvider>),
    Option(Arc<dyn OptionProvider>),
    OfflinePermission(Arc<dyn OfflinePermissionProvider>),
    OfflineOption(Arc<dyn OfflineOptionProvider>),
}

impl Registration {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Permission(_) => ProviderKind::Permission,
            Self::Option(_) => ProviderKind::Option,
            Self::OfflinePermission(_) => ProviderKind::OfflinePermission,
            Self::OfflineOption(_) => ProviderKind::OfflineOption,
        }
    }

    pub fn permission(provider: impl PermissionProvider + 'static) -> Self {
        Self::Permission(Arc::new(provider))
    }

    pub fn option(provider: impl OptionProvider + 'static) -> Self {
        Self::Option(Arc::new(provider))
    }

    pub fn offline_permission(provider: impl OfflinePermissionProvider + 'static) -> Self {
        Self::OfflinePermission(Arc::new(provider))
    }

    pub fn offline_option(provider: impl OfflineOptionProvider + 'static) -> Self {
        Self::OfflineOption(Arc::new(provider))
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Registration").field(&self.kind()).finish()
    }
}

/// The four provider chains.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Owns one append-only chain per [`ProviderKind`] and exposes the
/// resolution operations the query facades are built on.
///
/// ## Usage
/// ```rust,no_run
/// use perm_core::TriState;
/// use resolver::{ProviderRegistry, Registration};
///
/// let registry = ProviderRegistry::new();
/// registry.add_provider(Registration::permission(
///     |_: &dyn perm_core::Source, permission: &str| {
///         Ok::<_, errors::ProviderError>(TriState::from(permission == "fly"))
///     }
/// ));
/// ```
///
/// ## Concurrency
/// Registration may happen from any thread at any time. A resolution uses
/// the provider list that was current when it started.
pub struct ProviderRegistry {
    permissions: ProviderChain<dyn PermissionProvider>,
    options: ProviderChain<dyn OptionProvider>,
    offline_permissions: AsyncProviderChain<dyn OfflinePermissionProvider>,
    offline_options: AsyncProviderChain<dyn OfflineOptionProvider>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::with_telemetry(ResolverTelemetry::default())
    }

    pub fn with_telemetry(telemetry: ResolverTelemetry) -> Self {
        Self {
            permissions: ProviderChain::new(ProviderKind::Permission, telemetry),
            options: ProviderChain::new(ProviderKind::Option, telemetry),
            offline_permissions: AsyncProviderChain::new(
                ProviderKind::OfflinePermission,
                telemetry,
            ),
            offline_options: AsyncProviderChain::new(ProviderKind::OfflineOption, telemetry),
        }
    }

    /// The process-wide registry.
    pub fn global() -> Arc<ProviderRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Appends a provider to the chain of its kind.
    pub fn add_provider(&self, registration: Registration) {
        match registration {
            Registration::Permission(provider) => {
                self.permissions.register(provider);
            }
            Registration::Option(provider) => {
                self.options.register(provider);
            }
            Registration::OfflinePermission(provider) => {
                self.offline_permissions.register(provider);
            }
            Registration::OfflineOption(provider) => {
                self.offline_options.register(provider);
            }
        }
    }

    pub fn add_permission_provider(&self, provider: impl PermissionProvider + 'static) {
        self.add_provider(Registration::permission(provider));
    }

    pub fn add_option_provider(&self, provider: impl OptionProvider + 'static) {
        self.add_provider(Registration::option(provider));
    }

    pub fn add_offline_permission_provider(
        &self,
        provider: impl OfflinePermissionProvider + 'static,
    ) {
        self.add_provider(Registration::offline_permission(provider));
    }

    pub fn add_offline_option_provider(&self, provider: impl OfflineOptionProvider + 'static) {
        self.add_provider(Registration::offline_option(provider));
    }

    /// Number of providers registered for `kind`.
    pub fn provider_count(&self, kind: ProviderKind) -> usize {
        match kind {
            ProviderKind::Permission => self.permissions.len(),
            ProviderKind::Option => self.options.len(),
            ProviderKind::OfflinePermission => self.offline_permissions.len(),
            ProviderKind::OfflineOption => self.offline_options.len(),
        }
    }

    pub fn resolve_permission(
        &self,
        source: &dyn Source,
        permission: &str,
    ) -> Result<TriState, ProviderError> {
        self.permissions.resolve(source, permission)
    }

    pub fn resolve_option(
        &self,
        source: &dyn Source,
        key: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.options.resolve(source, key)
    }

    pub fn resolve_offline_permission(
        &self,
        identity: Identity,
        permission: &str,
    ) -> BoxFuture<'static, Result<TriState, ProviderError>> {
        self.offline_permissions.resolve(identity, permission)
    }

    pub fn resolve_offline_option(
        &self,
        identity: Identity,
        key: &str,
    ) -> BoxFuture<'static, Result<Option<String>, ProviderError>> {
        self.offline_options.resolve(identity, key)
    }
}
