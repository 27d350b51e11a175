//! Configuration types consumed by the orchestrator and bulk jobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-provider entry in the source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider id, matching `StagioneConnector::name` of the registered
    /// connector.
    pub id: String,
    /// Whether the orchestrator may use this provider at all.
    pub enabled: bool,
}

impl ProviderConfig {
    /// An enabled entry for the given provider id.
    #[must_use]
    pub fn enabled(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
        }
    }

    /// A disabled entry for the given provider id.
    #[must_use]
    pub fn disabled(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: false,
        }
    }
}

/// Configuration for source selection, timeouts, and bulk-job pacing.
///
/// Consumed read-only at the start of each orchestrator invocation; there
/// is no ambient global. Reloading swaps the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Providers in priority order: the first entry is the primary source,
    /// later entries are fallbacks. A connector with no entry here is
    /// treated as disabled.
    pub providers: Vec<ProviderConfig>,
    /// Ceiling for a single provider call.
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout: Duration,
    /// Ceiling for processing one entity (fetch plus aggregation) during a
    /// bulk job.
    #[serde(default = "default_entity_timeout")]
    pub entity_timeout: Duration,
    /// Number of store operations a bulk job performs on one handle before
    /// the lease recycles it.
    #[serde(default = "default_store_lease_ops")]
    pub store_lease_ops: usize,
}

const fn default_provider_timeout() -> Duration {
    Duration::from_secs(6)
}

const fn default_entity_timeout() -> Duration {
    Duration::from_secs(8)
}

const fn default_store_lease_ops() -> usize {
    50
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            provider_timeout: default_provider_timeout(),
            entity_timeout: default_entity_timeout(),
            store_lease_ops: default_store_lease_ops(),
        }
    }
}

impl SourceConfig {
    /// An enabled-providers config with default timeouts, priority in the
    /// order given.
    #[must_use]
    pub fn with_priority<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            providers: ids.into_iter().map(ProviderConfig::enabled).collect(),
            ..Self::default()
        }
    }

    /// Look up the entry for a provider id.
    #[must_use]
    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == id)
    }

    /// Whether a provider id is present and enabled.
    #[must_use]
    pub fn is_enabled(&self, id: &str) -> bool {
        self.provider(id).is_some_and(|p| p.enabled)
    }
}
