use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use stagione_core::{SourceConfig, StagioneConnector, StagioneError};

use crate::store::Store;

/// Orchestrator that routes acquisition across registered providers and
/// runs seasonality queries and bulk jobs against a store.
pub struct Stagione {
    pub(crate) connectors: Vec<Arc<dyn StagioneConnector>>,
    pub(crate) cfg: RwLock<SourceConfig>,
    pub(crate) store: Arc<dyn Store>,
}

impl Stagione {
    /// Start building a new `Stagione` instance.
    ///
    /// Typical usage registers providers in priority order, attaches a
    /// store, and wraps the result in an `Arc` so bulk jobs can run on
    /// their own tasks:
    ///
    /// ```rust,ignore
    /// let stagione = std::sync::Arc::new(
    ///     stagione::Stagione::builder()
    ///         .with_connector(tushare)
    ///         .with_connector(finnhub)
    ///         .source_config(cfg)
    ///         .with_store(store)
    ///         .build()?,
    /// );
    /// ```
    #[must_use]
    pub fn builder() -> StagioneBuilder {
        StagioneBuilder::new()
    }

    /// A snapshot of the current configuration.
    ///
    /// Each operation takes its snapshot once at the start and never sees
    /// a mid-flight reload.
    pub(crate) async fn config(&self) -> SourceConfig {
        self.cfg.read().await.clone()
    }

    /// Replace the configuration. Running operations keep the snapshot
    /// they started with; new operations see the new value.
    pub async fn reload_config(&self, mut cfg: SourceConfig) {
        prune_unknown_providers(&self.connectors, &mut cfg);
        *self.cfg.write().await = cfg;
    }

    /// Connectors eligible under `cfg`, in priority order: enabled in the
    /// config, registered, and configured.
    pub(crate) fn eligible(&self, cfg: &SourceConfig) -> Vec<Arc<dyn StagioneConnector>> {
        let mut out = Vec::new();
        for entry in &cfg.providers {
            if !entry.enabled {
                debug!(provider = %entry.id, "provider disabled; skipping");
                continue;
            }
            let Some(conn) = self.connectors.iter().find(|c| c.name() == entry.id) else {
                continue;
            };
            if !conn.configured() {
                debug!(provider = %entry.id, "provider not configured; skipping");
                continue;
            }
            out.push(Arc::clone(conn));
        }
        out
    }

    /// Tear down every registered connector's session state. Idempotent;
    /// bulk jobs call this on every exit path.
    pub async fn shutdown(&self) {
        for conn in &self.connectors {
            conn.teardown().await;
        }
    }
}

fn prune_unknown_providers(connectors: &[Arc<dyn StagioneConnector>], cfg: &mut SourceConfig) {
    let known: HashSet<&'static str> = connectors.iter().map(|c| c.name()).collect();
    let mut seen: HashSet<String> = HashSet::new();
    cfg.providers
        .retain(|p| known.contains(p.id.as_str()) && seen.insert(p.id.clone()));
}

/// Builder for constructing a [`Stagione`] orchestrator.
pub struct StagioneBuilder {
    connectors: Vec<Arc<dyn StagioneConnector>>,
    cfg: SourceConfig,
    store: Option<Arc<dyn Store>>,
}

impl Default for StagioneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StagioneBuilder {
    /// Create a new builder with default timeouts and no providers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            cfg: SourceConfig::default(),
            store: None,
        }
    }

    /// Register a provider connector.
    ///
    /// Behavior and trade-offs:
    /// - Registration alone does not enable a provider; it must also have an
    ///   enabled entry in the source configuration. When no configuration is
    ///   supplied, `build()` enables registered providers in registration
    ///   order as a convenience.
    /// - Duplicates are not deduplicated; avoid registering the same
    ///   connector twice.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn StagioneConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Attach the store queries and bulk jobs run against. Required.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Supply the full source configuration (priority order, enablement,
    /// timeouts, lease pacing).
    ///
    /// Behavior and trade-offs:
    /// - The provider list is authoritative: a registered connector with no
    ///   entry here is never called.
    /// - Entries naming unregistered providers are dropped during `build()`,
    ///   as are duplicate ids (first occurrence wins).
    #[must_use]
    pub fn source_config(mut self, cfg: SourceConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the per-provider call timeout.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Set the per-entity processing timeout used by bulk jobs.
    ///
    /// Behavior and trade-offs:
    /// - Bounds one entity's fetch plus aggregation as a whole; a stalled
    ///   entity is abandoned and counted as failed while the job moves on.
    /// - Should comfortably exceed the provider timeout, or slow providers
    ///   will be charged to the entity.
    #[must_use]
    pub const fn entity_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.entity_timeout = timeout;
        self
    }

    /// Set how many store operations a bulk job performs on one handle
    /// before the lease recycles it.
    #[must_use]
    pub const fn store_lease_ops(mut self, ops: usize) -> Self {
        self.cfg.store_lease_ops = ops;
        self
    }

    /// Build the `Stagione` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no connectors are registered or no store is
    /// attached.
    pub fn build(mut self) -> Result<Stagione, StagioneError> {
        if self.connectors.is_empty() {
            return Err(StagioneError::InvalidArg(
                "no connectors registered; add at least one via with_connector(...)".to_owned(),
            ));
        }
        let Some(store) = self.store else {
            return Err(StagioneError::InvalidArg(
                "no store attached; add one via with_store(...)".to_owned(),
            ));
        };

        if self.cfg.providers.is_empty() {
            self.cfg.providers = self
                .connectors
                .iter()
                .map(|c| stagione_core::ProviderConfig::enabled(c.name()))
                .collect();
        }
        prune_unknown_providers(&self.connectors, &mut self.cfg);

        Ok(Stagione {
            connectors: self.connectors,
            cfg: RwLock::new(self.cfg),
            store,
        })
    }
}
