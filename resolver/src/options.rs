//! # Option Lookups
//!
//! Caller-facing option queries with literal and typed defaults.

use std::sync::Arc;

use config::Config;
use errors::PermissionError;
use futures_util::FutureExt;
use perm_core::{Identity, Source, SubjectReducer};

use crate::Pending;
use crate::coercion::{Coerced, coerce_resolved};
use crate::fallback::FallbackPolicy;
use crate::query::{reduce_online, require_identity, require_key};
use crate::registry::ProviderRegistry;
use crate::telemetry::ResolverTelemetry;

/// Option queries over a [`ProviderRegistry`].
///
/// Typed lookups pass the resolved value to a transform. A transform that
/// rejects the value yields "no value", so the default applies.
#[derive(Clone)]
pub struct Options {
    registry: Arc<ProviderRegistry>,
    fallback: FallbackPolicy,
    telemetry: ResolverTelemetry,
}

impl Options {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self::with_telemetry(registry, ResolverTelemetry::default())
    }

    pub fn from_config(registry: Arc<ProviderRegistry>, config: &Config) -> Self {
        Self::with_telemetry(
            registry,
            ResolverTelemetry::from_config(&config.observability),
        )
    }

    fn with_telemetry(registry: Arc<ProviderRegistry>, telemetry: ResolverTelemetry) -> Self {
        Self {
            registry,
            fallback: FallbackPolicy::new(Default::default(), telemetry),
            telemetry,
        }
    }

    pub fn global() -> Self {
        Self::new(ProviderRegistry::global())
    }

    pub fn get(&self, source: &dyn Source, key: &str) -> Result<Option<String>, PermissionError> {
        require_key("key", key)?;
        Ok(self.registry.resolve_option(source, key)?)
    }

    pub fn get_or(
        &self,
        source: &dyn Source,
        key: &str,
        default: &str,
    ) -> Result<String, PermissionError> {
        let value = self.get(source, key)?;
        Ok(self.fallback.typed(value, default.to_string()))
    }

    pub fn get_as<T, R, F>(
        &self,
        source: &dyn Source,
        key: &str,
        transform: F,
    ) -> Result<Option<T>, PermissionError>
    where
        F: FnOnce(&str) -> R,
        R: Coerced<T>,
    {
        let value = self.get(source, key)?;
        coerce_resolved(self.telemetry, value, transform)
    }

    pub fn get_as_or<T, R, F>(
        &self,
        source: &dyn Source,
        key: &str,
        default: T,
        transform: F,
    ) -> Result<T, PermissionError>
    where
        F: FnOnce(&str) -> R,
        R: Coerced<T>,
    {
        let value = self.get_as(source, key, transform)?;
        Ok(self.fallback.typed(value, default))
    }

    pub fn entity_get<E: ?Sized>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        key: &str,
    ) -> Result<Option<String>, PermissionError> {
        let source = reduce_online(reducer, entity)?;
        self.get(source.as_ref(), key)
    }

    pub fn entity_get_or<E: ?Sized>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        key: &str,
        default: &str,
    ) -> Result<String, PermissionError> {
        let source = reduce_online(reducer, entity)?;
        self.get_or(source.as_ref(), key, default)
    }

    pub fn entity_get_as<E, T, R, F>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        key: &str,
        transform: F,
    ) -> Result<Option<T>, PermissionError>
    where
        E: ?Sized,
        F: FnOnce(&str) -> R,
        R: Coerced<T>,
    {
        let source = reduce_online(reducer, entity)?;
        self.get_as(source.as_ref(), key, transform)
    }

    pub fn entity_get_as_or<E, T, R, F>(
        &self,
        reducer: &(impl SubjectReducer<E> + ?Sized),
        entity: &E,
        key: &str,
        default: T,
        transform: F,
    ) -> Result<T, PermissionError>
    where
        E: ?Sized,
        F: FnOnce(&str) -> R,
        R: Coerced<T>,
    {
        let source = reduce_online(reducer, entity)?;
        self.get_as_or(source.as_ref(), key, default, transform)
    }

    pub fn offline_get(
        &self,
        identity: Identity,
        key: &str,
    ) -> Result<Pending<Option<String>>, PermissionError> {
        require_identity(identity)?;
        require_key("key", key)?;

        let pending = self.registry.resolve_offline_option(identity, key);
        Ok(async move { Ok::<_, PermissionError>(pending.await?) }.boxed())
    }

    pub fn offline_get_or(
        &self,
        identity: Identity,
        key: &str,
        default: impl Into<String>,
    ) -> Result<Pending<String>, PermissionError> {
        let pending = self.offline_get(identity, key)?;
        let fallback = self.fallback.clone();
        let default = default.into();
        Ok(async move {
            let value = pending.await?;
            Ok::<_, PermissionError>(fallback.typed(value, default))
        }
        .boxed())
    }

    pub fn offline_get_as<T, R, F>(
        &self,
        identity: Identity,
        key: &str,
        transform: F,
    ) -> Result<Pending<Option<T>>, PermissionError>
    where
        T: Send + 'static,
        F: FnOnce(&str) -> R + Send + 'static,
        R: Coerced<T> + 'static,
    {
        let pending = self.offline_get(identity, key)?;
        let telemetry = self.telemetry;
        Ok(async move {
            let value = pending.await?;
            coerce_resolved(telemetry, value, transform)
        }
        .boxed())
    }

    pub fn offline_get_as_or<T, R, F>(
        &self,
        identity: Identity,
        key: &str,
        default: T,
        transform: F,
    ) -> Result<Pending<T>, PermissionError>
    where
        T: Send + 'static,
        F: FnOnce(&str) -> R + Send + 'static,
        R: Coerced<T> + 'static,
    {
        let pending = self.offline_get_as(identity, key, transform)?;
        let fallback = self.fallback.clone();
        Ok(async move {
            let value = pending.await?;
            Ok::<_, PermissionError>(fallback.typed(value, default))
        }
        .boxed())
    }
}
