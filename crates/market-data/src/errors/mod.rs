//! Error types for the market data crate.
//!
//! Every provider failure is recovered by the resolver falling through to the
//! next tier, so callers rarely see these. They exist so the logs can tell a
//! missing API key apart from a network blip or a rate-limit rejection.

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider has no API credential configured.
    /// The resolver skips straight to the next tier.
    #[error("Configuration missing: {provider} has no API key")]
    ConfigurationMissing {
        /// The provider that is not configured
        provider: String,
    },

    /// The provider rate limited the request (HTTP 429 or an API-level note).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred (transport failure, non-2xx status,
    /// API-level error message).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider answered but the payload could not be mapped to a quote.
    #[error("Malformed payload from {provider}: {message}")]
    MalformedPayload {
        /// The provider that returned the payload
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The caller supplied an unusable symbol list.
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Every tier in the chain was tried and none produced a quote.
    #[error("All providers failed")]
    AllProvidersFailed,
}

impl MarketDataError {
    /// Short, stable tag for log lines.
    ///
    /// ```
    /// use tradedesk_market_data::errors::MarketDataError;
    ///
    /// let error = MarketDataError::ConfigurationMissing { provider: "FINNHUB".to_string() };
    /// assert_eq!(error.kind(), "configuration_missing");
    /// ```
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigurationMissing { .. } => "configuration_missing",
            Self::RateLimited { .. } => "rate_limited",
            Self::Timeout { .. } => "timeout",
            Self::ProviderError { .. } => "provider_error",
            Self::MalformedPayload { .. } => "malformed_payload",
            Self::SymbolNotFound(_) => "symbol_not_found",
            Self::InvalidSymbol(_) => "invalid_symbol",
            Self::AllProvidersFailed => "all_providers_failed",
        }
    }

    /// Build a `ProviderError` from a reqwest transport error, mapping
    /// timeouts to `Timeout`.
    pub(crate) fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::ProviderError {
                provider: provider.to_string(),
                message: format!("Request failed: {}", err),
            }
        }
    }
}
