//! Shared test fixtures for the permission resolver workspace.
//!
//! Provides stub sources, scripted providers that count and log their
//! invocations, and a tracing subscriber for test output.

mod fixtures;

pub use fixtures::*;

use config::ObservabilityConfig;
use perm_core::Identity;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn unique_id(prefix: &str) -> String {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", prefix, id)
}

pub fn unique_identity() -> Identity {
    Identity::random()
}

/// Installs a test-writer subscriber filtered by `RUST_LOG`, or by the
/// default observability level when `RUST_LOG` is unset.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    init_tracing_with(&ObservabilityConfig::default());
}

pub fn init_tracing_with(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging_level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(filter)
        .try_init();
}
