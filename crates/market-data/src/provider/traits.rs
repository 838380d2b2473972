//! Quote provider trait definition.

use async_trait::async_trait;
use log::debug;

use crate::errors::MarketDataError;
use crate::models::{Quote, QuoteSource};

/// A single tier in the quote fallback chain.
///
/// Implement this trait to add a new quote source. The resolver walks its
/// providers in order, so adding or reordering sources is a change to the
/// list handed to [`QuoteResolver`](crate::resolver::QuoteResolver), not to
/// the resolver itself.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tradedesk_market_data::provider::QuoteProvider;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn source(&self) -> QuoteSource {
///         QuoteSource::Finnhub
///     }
///
///     async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs.
    fn id(&self) -> &'static str;

    /// Tag stamped on every quote this provider returns.
    fn source(&self) -> QuoteSource;

    /// Fetch the latest quote for one symbol.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    /// Fetch the latest quotes for several symbols.
    ///
    /// The default issues one [`fetch_quote`](Self::fetch_quote) per symbol,
    /// one after another. Symbols that fail are dropped from the result
    /// without being retried; the call only errors when no symbol succeeded.
    /// Providers with a batch endpoint override this with a single request.
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        let mut quotes = Vec::with_capacity(symbols.len());
        let mut last_error: Option<MarketDataError> = None;

        for symbol in symbols {
            match self.fetch_quote(symbol).await {
                Ok(quote) => quotes.push(quote),
                Err(e) => {
                    debug!(
                        "Provider '{}' dropped {} ({}): {}",
                        self.id(),
                        symbol,
                        e.kind(),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        if quotes.is_empty() {
            return Err(last_error.unwrap_or(MarketDataError::AllProvidersFailed));
        }

        Ok(quotes)
    }
}
