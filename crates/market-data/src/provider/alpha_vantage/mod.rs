//! Alpha Vantage quote provider (primary tier).
//!
//! Uses the `REALTIME_BULK_QUOTES` endpoint so a whole symbol list costs one
//! request. Without an API key the provider refuses every call with
//! [`MarketDataError::ConfigurationMissing`] and the resolver moves on.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{AlphaVantageBulkQuote, Quote, QuoteSource, UpstreamQuote};
use crate::provider::{QuoteProvider, PROVIDER_TIMEOUT};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Upper bound on symbols per bulk request.
const MAX_SYMBOLS_PER_REQUEST: usize = 100;

/// REALTIME_BULK_QUOTES response
#[derive(Debug, Deserialize)]
struct BulkQuotesResponse {
    #[serde(default)]
    data: Option<Vec<AlphaVantageBulkQuote>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    /// Some plans answer with a top-level "message" instead of data
    #[serde(default)]
    message: Option<String>,
}

/// Alpha Vantage quote provider.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl AlphaVantageProvider {
    /// Create a provider. A `None` or blank key leaves it unconfigured.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Create a provider that talks to a different host (proxies, tests).
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, MarketDataError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| MarketDataError::ConfigurationMissing {
                provider: PROVIDER_ID.to_string(),
            })
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let api_key = self.api_key()?;
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", api_key));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(api_key, "***")
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })
    }

    /// Check for API-level errors in the response.
    fn check_api_error(
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(ref msg) = error_message {
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(msg.clone()));
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: msg.clone(),
            });
        }

        for msg in [note, information].into_iter().flatten() {
            if msg.contains("API call frequency") || msg.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            // Premium-only endpoints and invalid keys are reported here too
            if msg.contains("premium") || msg.contains("apikey") {
                return Err(MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: msg.clone(),
                });
            }
            warn!("Alpha Vantage note: {}", msg);
        }

        Ok(())
    }

    /// One `REALTIME_BULK_QUOTES` request for at most
    /// `MAX_SYMBOLS_PER_REQUEST` symbols.
    async fn fetch_chunk(&self, chunk: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        let joined = chunk.join(",");
        debug!("Fetching bulk quotes for {} from Alpha Vantage", joined);

        let params = [("function", "REALTIME_BULK_QUOTES"), ("symbol", joined.as_str())];
        let text = self.fetch(&params).await?;
        Self::parse_bulk_response(&text)
    }

    /// Parse a bulk quote body into normalized quotes.
    ///
    /// Entries that cannot be mapped are logged and skipped; an answer with
    /// no usable entry is an error.
    fn parse_bulk_response(text: &str) -> Result<Vec<Quote>, MarketDataError> {
        let response: BulkQuotesResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse bulk quote response: {}", e),
            })?;

        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        let entries = response.data.unwrap_or_default();
        if entries.is_empty() {
            return Err(MarketDataError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: response
                    .message
                    .unwrap_or_else(|| "Bulk quote response has no data".to_string()),
            });
        }

        let quotes: Vec<Quote> = entries
            .into_iter()
            .filter_map(|entry| {
                let symbol = entry.symbol.clone();
                match UpstreamQuote::AlphaVantage(entry).into_quote() {
                    Ok(quote) => Some(quote),
                    Err(e) => {
                        warn!("Alpha Vantage: skipping {}: {}", symbol, e);
                        None
                    }
                }
            })
            .collect();

        if quotes.is_empty() {
            return Err(MarketDataError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: "No entry in the bulk quote response could be mapped".to_string(),
            });
        }

        Ok(quotes)
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn source(&self) -> QuoteSource {
        QuoteSource::AlphaVantage
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let quotes = self.fetch_quotes(&[symbol.to_string()]).await?;
        quotes
            .into_iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))
    }

    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        // Fail before touching the network when there is no key
        self.api_key()?;

        let mut quotes = Vec::with_capacity(symbols.len());
        let mut last_error = None;
        for chunk in symbols.chunks(MAX_SYMBOLS_PER_REQUEST) {
            match self.fetch_chunk(chunk).await {
                Ok(chunk_quotes) => quotes.extend(chunk_quotes),
                Err(e) => {
                    warn!("Alpha Vantage chunk of {} symbols failed: {}", chunk.len(), e);
                    last_error = Some(e);
                }
            }
        }

        // Quotes from healthy chunks survive a later failure
        match last_error {
            Some(e) if quotes.is_empty() => Err(e),
            _ => Ok(quotes),
        }
    }
}
