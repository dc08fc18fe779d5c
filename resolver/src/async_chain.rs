//! Asynchronous provider chain for offline subjects.
//!
//! Offline providers are consulted strictly one after another: provider
//! `n + 1` is not invoked until provider `n` has completed with an
//! undefined answer. Dropping the returned future abandons the remaining
//! providers.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use errors::ProviderError;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use perm_core::{Decision, Identity, OfflineOptionProvider, OfflinePermissionProvider, TriState};
use tracing::{Instrument, debug, trace};

use crate::registry::ProviderKind;
use crate::telemetry::ResolverTelemetry;

/// How an asynchronous chain consults one of its providers.
#[async_trait]
pub trait IdentityQuery: Send + Sync {
    type Output: Decision + Send + 'static;

    async fn query(&self, identity: Identity, key: &str) -> Result<Self::Output, ProviderError>;
}

#[async_trait]
impl IdentityQuery for dyn OfflinePermissionProvider {
    type Output = TriState;

    async fn query(&self, identity: Identity, key: &str) -> Result<TriState, ProviderError> {
        self.check_permission(identity, key).await
    }
}

#[async_trait]
impl IdentityQuery for dyn OfflineOptionProvider {
    type Output = Option<String>;

    async fn query(&self, identity: Identity, key: &str) -> Result<Option<String>, ProviderError> {
        self.request_option(identity, key).await
    }
}

/// Ordered, append-only registry of offline providers for one query kind.
pub struct AsyncProviderChain<P: ?Sized> {
    kind: ProviderKind,
    providers: ArcSwap<Vec<Arc<P>>>,
    telemetry: ResolverTelemetry,
}

impl<P: ?Sized> AsyncProviderChain<P> {
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
    /// Resolutions already in flight keep the provider list they started
    /// with.
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

impl<P> AsyncProviderChain<P>
where
    P: ?Sized + IdentityQuery + 'static,
{
    /// Resolves `key` for `identity`.
    ///
    /// The provider list is captured before this returns, so providers
    /// registered afterwards never take part in the returned resolution.
    pub fn resolve(
        &self,
        identity: Identity,
        key: &str,
    ) -> BoxFuture<'static, Result<P::Output, ProviderError>> {
        let providers = self.providers.load_full();
        let kind = self.kind;
        let telemetry = self.telemetry;
        let key = key.to_string();
        let span = tracing::debug_span!("resolve_offline", %kind, key = %key, %identity);

        async move {
            for (position, provider) in providers.iter().enumerate() {
                trace!(position, "Consulting offline provider");
                telemetry.record_invocation(kind);

                let answer = match provider.query(identity, &key).await {
                    Ok(answer) => answer,
                    Err(err) => {
                        telemetry.record_failure(kind);
                        return Err(err);
                    }
                };

                if answer.is_definite() {
                    debug!(position, outcome = answer.outcome(), "Offline provider answered");
                    telemetry.record_resolution(kind, answer.outcome(), position + 1);
                    return Ok(answer);
                }
            }

            let answer = P::Output::undefined();
            telemetry.record_resolution(kind, answer.outcome(), providers.len());
            Ok(answer)
        }
        .instrument(span)
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn permission_chain() -> AsyncProviderChain<dyn OfflinePermissionProvider> {
        AsyncProviderChain::new(
            ProviderKind::OfflinePermission,
            ResolverTelemetry::default(),
        )
    }

    #[tokio::test]
    async fn test_empty_chain_is_undefined() {
        let chain = permission_chain();
        let answer = chain.resolve(Identity::random(), "fly").await.unwrap();
        assert_eq!(answer, TriState::Undefined);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_later_providers() {
        let chain = permission_chain();
        let later_calls = Arc::new(AtomicUsize::new(0));

        chain.register(Arc::new(|_: Identity, _: String| async {
            Ok::<_, ProviderError>(TriState::True)
        }));
        let counter = later_calls.clone();
        chain.register(Arc::new(move |_: Identity, _: String| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ProviderError>(TriState::False)
            }
        }));

        let answer = chain.resolve(Identity::random(), "fly").await.unwrap();
        assert_eq!(answer, TriState::True);
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_registration_after_start_is_not_observed() {
        let chain = permission_chain();
        chain.register(Arc::new(|_: Identity, _: String| async {
            Ok::<_, ProviderError>(TriState::Undefined)
        }));

        let pending = chain.resolve(Identity::random(), "fly");
        chain.register(Arc::new(|_: Identity, _: String| async {
            Ok::<_, ProviderError>(TriState::True)
        }));

        assert_eq!(pending.await.unwrap(), TriState::Undefined);
        assert_eq!(chain.resolve(Identity::random(), "fly").await.unwrap(), TriState::True);
    }

    #[tokio::test]
    async fn test_offline_option_error_propagates() {
        let chain: AsyncProviderChain<dyn OfflineOptionProvider> =
            AsyncProviderChain::new(ProviderKind::OfflineOption, ResolverTelemetry::default());
        chain.register(Arc::new(|_: Identity, _: String| async {
            Err::<Option<String>, _>(ProviderError::unavailable("storage", "offline"))
        }));

        let err = chain.resolve(Identity::random(), "prefix").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable { .. }));
    }

    #[test]
    fn test_register_reports_position() {
        let chain = permission_chain();
        let positions: Vec<usize> = (0..3)
            .map(|_| {
                chain.register(Arc::new(|_: Identity, _: String| async {
                    Ok::<_, ProviderError>(TriState::Undefined)
                }))
            })
            .collect();

        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(chain.len(), 3);
    }
}
