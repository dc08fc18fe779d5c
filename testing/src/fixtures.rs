use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use errors::{PermissionError, ProviderError};
use parking_lot::Mutex;
use perm_core::{
    Identity, OfflineOptionProvider, OfflinePermissionProvider, OptionProvider,
    PermissionProvider, Source, Subject, SubjectReducer, TriState,
};

/// Ordered record of provider events shared between providers.
#[derive(Debug, Clone, Default)]
pub struct InvocationLog(Arc<Mutex<Vec<String>>>);

impl InvocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// An online source with a fixed permission level.
#[derive(Debug, Clone)]
pub struct StubSource {
    name: String,
    level: u8,
    identity: Option<Identity>,
}

impl StubSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: 0,
            identity: None,
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }
}

impl Source for StubSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn identity(&self) -> Option<Identity> {
        self.identity
    }

    fn has_permission_level(&self, level: u8) -> bool {
        self.level >= level
    }
}

/// Host entities as seen by [`StubReducer`].
#[derive(Debug, Clone)]
pub enum StubEntity {
    Player(StubSource),
    Offline(Identity),
    /// An entity without server-side context.
    Detached(String),
}

/// Reduces [`StubEntity`] values to query subjects.
#[derive(Debug, Default)]
pub struct StubReducer {
    reductions: AtomicUsize,
}

impl StubReducer {
    pub fn reductions(&self) -> usize {
        self.reductions.load(Ordering::SeqCst)
    }
}

impl SubjectReducer<StubEntity> for StubReducer {
    fn reduce(&self, entity: &StubEntity) -> Result<Subject, PermissionError> {
        self.reductions.fetch_add(1, Ordering::SeqCst);
        match entity {
            StubEntity::Player(source) => Ok(Subject::Online(Arc::new(source.clone()))),
            StubEntity::Offline(identity) => Ok(Subject::Unresolved(*identity)),
            StubEntity::Detached(name) => Err(PermissionError::unsupported_subject(name)),
        }
    }
}

/// Permission provider answering from a fixed table.
#[derive(Debug)]
pub struct ScriptedPermissions {
    name: String,
    answers: HashMap<String, TriState>,
    otherwise: TriState,
    calls: AtomicUsize,
    log: Option<InvocationLog>,
}

impl ScriptedPermissions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            answers: HashMap::new(),
            otherwise: TriState::Undefined,
            calls: AtomicUsize::new(0),
            log: None,
        }
    }

    pub fn answer(mut self, permission: &str, state: TriState) -> Self {
        self.answers.insert(permission.to_string(), state);
        self
    }

    /// Answer for permissions without an explicit entry.
    pub fn otherwise(mut self, state: TriState) -> Self {
        self.otherwise = state;
        self
    }

    pub fn logging_to(mut self, log: &InvocationLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl PermissionProvider for ScriptedPermissions {
    fn check_permission(
        &self,
        _source: &dyn Source,
        permission: &str,
    ) -> Result<TriState, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.record(&self.name);
        }
        Ok(self.answers.get(permission).copied().unwrap_or(self.otherwise))
    }
}

/// Option provider answering from a fixed table.
#[derive(Debug)]
pub struct ScriptedOptions {
    name: String,
    values: HashMap<String, String>,
    calls: AtomicUsize,
    log: Option<InvocationLog>,
}

impl ScriptedOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
            calls: AtomicUsize::new(0),
            log: None,
        }
    }

    pub fn value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn logging_to(mut self, log: &InvocationLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl OptionProvider for ScriptedOptions {
    fn request_option(
        &self,
        _source: &dyn Source,
        key: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.record(&self.name);
        }
        Ok(self.values.get(key).cloned())
    }
}

/// Offline provider that sleeps before answering.
///
/// Logs `"{name}:start"` when invoked and `"{name}:end"` right before it
/// answers.
#[derive(Debug)]
pub struct DelayedProvider {
    name: String,
    delay: Duration,
    state: TriState,
    value: Option<String>,
    calls: AtomicUsize,
    log: InvocationLog,
}

impl DelayedProvider {
    pub fn new(name: impl Into<String>, delay: Duration, log: &InvocationLog) -> Self {
        Self {
            name: name.into(),
            delay,
            state: TriState::Undefined,
            value: None,
            calls: AtomicUsize::new(0),
            log: log.clone(),
        }
    }

    /// Answer given to permission checks.
    pub fn state(mut self, state: TriState) -> Self {
        self.state = state;
        self
    }

    /// Answer given to option requests.
    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    async fn run(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.record(format!("{}:start", self.name));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.log.record(format!("{}:end", self.name));
    }
}

#[async_trait]
impl OfflinePermissionProvider for DelayedProvider {
    async fn check_permission(
        &self,
        _identity: Identity,
        _permission: &str,
    ) -> Result<TriState, ProviderError> {
        self.run().await;
        Ok(self.state)
    }
}

#[async_trait]
impl OfflineOptionProvider for DelayedProvider {
    async fn request_option(
        &self,
        _identity: Identity,
        _key: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.run().await;
        Ok(self.value.clone())
    }
}

/// Provider that fails every query.
#[derive(Debug, Clone)]
pub struct FailingProvider {
    name: String,
}

impl FailingProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn error(&self) -> ProviderError {
        ProviderError::failed(&self.name, "scripted failure")
    }
}

impl PermissionProvider for FailingProvider {
    fn check_permission(&self, _: &dyn Source, _: &str) -> Result<TriState, ProviderError> {
        Err(self.error())
    }
}

impl OptionProvider for FailingProvider {
    fn request_option(&self, _: &dyn Source, _: &str) -> Result<Option<String>, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl OfflinePermissionProvider for FailingProvider {
    async fn check_permission(&self, _: Identity, _: &str) -> Result<TriState, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl OfflineOptionProvider for FailingProvider {
    async fn request_option(&self, _: Identity, _: &str) -> Result<Option<String>, ProviderError> {
        Err(self.error())
    }
}
