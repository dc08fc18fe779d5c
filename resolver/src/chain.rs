//! Synchronous provider chain.
//!
//! A [`ProviderChain`] is an ordered, append-only list of providers for one
//! query kind. Resolution asks each provider in registration order and stops
//! at the first definite answer; later providers are never invoked.

use std::sync::Arc;

use arc_swap::ArcSwap;
use errors::ProviderError;
use perm_core::{Decision, OptionProvider, PermissionProvider, Source, TriState};
use tracing::{debug, trace};

use crate::registry::ProviderKind;
use crate::telemetry::ResolverTelemetry;

/// How a synchronous chain consults one of its providers.
pub trait SourceQuery: Send + Sync {
    type Output: Decision;

    fn query(&self, source: &dyn Source, key: &str) -> Result<Self::Output, ProviderError>;
}

impl SourceQuery for dyn PermissionProvider {
    type Output = TriState;

    fn query(&self, source: &dyn Source, key: &str) -> Result<TriState, ProviderError> {
        self.check_permission(source, key)
    }
}

impl SourceQuery for dyn OptionProvider {
    type Output = Option<String>;

    fn query(&self, source: &dyn Source, key: &str) -> Result<Option<String>, ProviderError> {
        self.request_option(source, key)
    }
}

/// Ordered, append-only registry of providers for one synchronous query kind.
///
/// Appends publish a new provider list atomically; a resolution works on
/// the list that was current when it started.
pub struct ProviderChain<P: ?Sized> {
    kind: ProviderKind,
    providers: ArcSwap<Vec<Arc<P>>>,
    telemetry: ResolverTelemetry,
}

impl<P: ?Sized> ProviderChain<P> {
    pub fn new(kind: ProviderKind, telemetry: ResolverTelemetry) -> Self {
        Self {
            kind,
            providers: ArcSwap::from_pointee(Vec::new()),
            telemetry,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Appends a provider after every provider registered so far.
    ///
    /// Returns the zero-based position the provider was published at.
    pub fn register(&self, provider: Arc<P>) -> usize {
        let previous = self.providers.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&provider));
            next
        });
        let position = previous.len();
        debug!(kind = %self.kind, position, "Registered provider");
        position
    }

    pub fn len(&self) -> usize {
        self.providers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.load().is_empty()
    }
}

impl<P: ?Sized + SourceQuery> ProviderChain<P> {
    /// Resolves `key` for `source`.
    ///
    /// Returns the first definite answer, or the undefined answer when every
    /// provider declines. A provider error aborts the resolution and is
    /// returned as-is.
    pub fn resolve(&self, source: &dyn Source, key: &str) -> Result<P::Output, ProviderError> {
        let providers = self.providers.load_full();
        let _span = tracing::debug_span!("resolve", kind = %self.kind, key).entered();

        for (position, provider) in providers.iter().enumerate() {
            trace!(position, "Consulting provider");
            self.telemetry.record_invocation(self.kind);

            let answer = match provider.query(source, key) {
                Ok(answer) => answer,
                Err(err) => {
                    self.telemetry.record_failure(self.kind);
                    return Err(err);
                }
            };

            if answer.is_definite() {
                debug!(position, outcome = answer.outcome(), "Provider answered");
                self.telemetry
                    .record_resolution(self.kind, answer.outcome(), position + 1);
                return Ok(answer);
            }
        }

        let answer = P::Output::undefined();
        self.telemetry
            .record_resolution(self.kind, answer.outcome(), providers.len());
        Ok(answer)
    }
}
