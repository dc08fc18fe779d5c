use config::ObservabilityConfig;
use metrics::{counter, histogram};

use crate::registry::ProviderKind;

/// Records resolver metrics.
///
/// All recording is a no-op when metrics are disabled in the
/// [`ObservabilityConfig`], or when the host installed no recorder.
#[derive(Debug, Clone, Copy)]
pub struct ResolverTelemetry {
    enabled: bool,
}

impl Default for ResolverTelemetry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ResolverTelemetry {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn from_config(config: &ObservabilityConfig) -> Self {
        Self::new(config.metrics_enabled)
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record_invocation(&self, kind: ProviderKind) {
        if !self.enabled {
            return;
        }
        counter!("permission_provider_invocations_total",
            "kind" => kind.to_string()
        )
        .increment(1);
    }

    pub fn record_resolution(&self, kind: ProviderKind, outcome: &'static str, consulted: usize) {
        if !self.enabled {
            return;
        }
        let labels = [("kind", kind.to_string()), ("outcome", outcome.to_string())];
        counter!("permission_resolutions_total", &labels).increment(1);

        histogram!("permission_providers_consulted",
            "kind" => kind.to_string()
        )
        .record(consulted as f64);
    }

    pub fn record_failure(&self, kind: ProviderKind) {
        if !self.enabled {
            return;
        }
        let labels = [("kind", kind.to_string()), ("outcome", "error".to_string())];
        counter!("permission_resolutions_total", &labels).increment(1);
    }

    pub fn record_fallback(&self, shape: &'static str) {
        if !self.enabled {
            return;
        }
        counter!("permission_fallbacks_total", "shape" => shape).increment(1);
    }

    pub fn record_coercion_failure(&self) {
        if !self.enabled {
            return;
        }
        counter!("permission_coercion_failures_total").increment(1);
    }
}
