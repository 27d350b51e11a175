use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the stagione workspace.
///
/// This covers provider-tagged failures (configuration, authentication,
/// upstream faults, timeouts), entity-level timeouts raised by bulk jobs,
/// not-found conditions, argument validation, and store failures.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StagioneError {
    /// The provider is registered but lacks the configuration it needs
    /// (missing credential, missing endpoint).
    #[error("provider not configured: {provider}")]
    NotConfigured {
        /// Provider name, as reported by `StagioneConnector::name`.
        provider: String,
    },

    /// The provider rejected the configured credential.
    #[error("{provider} authentication failed: {msg}")]
    AuthFailed {
        /// Provider name that rejected the credential.
        provider: String,
        /// Human-readable message from the provider, if any.
        msg: String,
    },

    /// The provider's upstream service failed (transport error, non-success
    /// status, malformed payload).
    #[error("{provider} upstream failure: {msg}")]
    Upstream {
        /// Provider name that failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The provider answered a valid call with zero rows.
    #[error("{provider} returned no rows")]
    Empty {
        /// Provider name that returned the empty result.
        provider: String,
    },

    /// An individual provider call exceeded the per-provider timeout.
    #[error("provider timed out: {provider}")]
    ProviderTimeout {
        /// Provider name that timed out.
        provider: String,
    },

    /// Processing of a single entity exceeded the per-entity timeout during
    /// a bulk job.
    #[error("entity timed out: {code}")]
    EntityTimeout {
        /// Entity code (stock or industry) that timed out.
        code: String,
    },

    /// A resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "stock 600000".
        what: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The store rejected or failed an operation.
    #[error("store error: {0}")]
    Store(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl StagioneError {
    /// Helper: build a `NotConfigured` error for a provider name.
    pub fn not_configured(provider: impl Into<String>) -> Self {
        Self::NotConfigured {
            provider: provider.into(),
        }
    }

    /// Helper: build an `AuthFailed` error with the provider name and message.
    pub fn auth_failed(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::AuthFailed {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Upstream` error with the provider name and message.
    pub fn upstream(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Empty` error for a provider name.
    pub fn empty(provider: impl Into<String>) -> Self {
        Self::Empty {
            provider: provider.into(),
        }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(provider: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            provider: provider.into(),
        }
    }

    /// Helper: build an `EntityTimeout` error for an entity code.
    pub fn entity_timeout(code: impl Into<String>) -> Self {
        Self::EntityTimeout { code: code.into() }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `Store` error from any displayable cause.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Returns true if this error is local to one provider, meaning the
    /// failover loop may recover by trying the next source.
    ///
    /// Entity timeouts, not-found conditions, argument and store errors are
    /// not provider-local: retrying another source cannot fix them.
    #[must_use]
    pub fn is_provider_local(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured { .. }
                | Self::AuthFailed { .. }
                | Self::Upstream { .. }
                | Self::Empty { .. }
                | Self::ProviderTimeout { .. }
        )
    }

    /// The provider name carried by provider-local variants, if any.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::NotConfigured { provider }
            | Self::AuthFailed { provider, .. }
            | Self::Upstream { provider, .. }
            | Self::Empty { provider }
            | Self::ProviderTimeout { provider } => Some(provider),
            _ => None,
        }
    }
}
