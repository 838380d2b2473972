//! Quote resolver - walks an ordered list of providers until every requested
//! symbol has a quote.
//!
//! The chain is data, not control flow: the providers handed to
//! [`QuoteResolver::new`] are tried in order, each seeing only the symbols the
//! earlier tiers could not answer. Every failure (missing key, network error,
//! rate limit, unparseable payload) is logged and treated the same way: fall
//! through to the next tier.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::cache::MarketCache;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Pause between symbols in [`QuoteResolver::get_bulk_quotes`].
pub const DEFAULT_BULK_DELAY: Duration = Duration::from_millis(500);

/// Most distinct symbols one [`QuoteResolver::get_bulk_quotes`] call accepts.
pub const MAX_BULK_SYMBOLS: usize = 50;

/// Longest symbol accepted from callers.
const MAX_SYMBOL_LEN: usize = 15;

/// Fallback-chain quote resolver.
pub struct QuoteResolver {
    providers: Vec<Arc<dyn QuoteProvider>>,
    cache: Arc<MarketCache>,
    bulk_delay: Duration,
}

impl QuoteResolver {
    /// Create a resolver over `providers`, tried in the given order.
    ///
    /// # Arguments
    ///
    /// * `providers` - Quote tiers, highest preference first. Put the
    ///   synthetic generator last to guarantee an answer.
    /// * `cache` - Shared cache used by [`get_quote`](Self::get_quote)
    pub fn new(providers: Vec<Arc<dyn QuoteProvider>>, cache: Arc<MarketCache>) -> Self {
        Self {
            providers,
            cache,
            bulk_delay: DEFAULT_BULK_DELAY,
        }
    }

    /// Override the pause between symbols in bulk lookups.
    pub fn with_bulk_delay(mut self, bulk_delay: Duration) -> Self {
        self.bulk_delay = bulk_delay;
        self
    }

    /// Provider ids in the order they are tried.
    pub fn providers(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn bulk_delay(&self) -> Duration {
        self.bulk_delay
    }

    pub fn cache(&self) -> &Arc<MarketCache> {
        &self.cache
    }

    /// Resolve quotes for `symbols` through the provider chain.
    ///
    /// Symbols are trimmed, upper-cased and de-duplicated; the result keeps
    /// the caller's order. Symbols no tier could answer are left out. The
    /// call only fails when the request is unusable or nothing was found.
    pub async fn resolve(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
        let requested = normalize_symbols(symbols)?;
        let mut found: HashMap<String, Quote> = HashMap::with_capacity(requested.len());

        for provider in &self.providers {
            let pending: Vec<String> = requested
                .iter()
                .filter(|s| !found.contains_key(*s))
                .cloned()
                .collect();

            if pending.is_empty() {
                break;
            }

            if provider.source().is_synthetic() {
                warn!(
                    "No live provider answered for [{}], serving synthetic quotes",
                    pending.join(",")
                );
            } else {
                debug!(
                    "Trying provider '{}' for [{}]",
                    provider.id(),
                    pending.join(",")
                );
            }

            match provider.fetch_quotes(&pending).await {
                Ok(quotes) => {
                    let wanted: HashSet<&String> = pending.iter().collect();
                    let mut answered = 0usize;
                    for quote in quotes {
                        let key = quote.symbol.trim().to_uppercase();
                        if wanted.contains(&key) && !found.contains_key(&key) {
                            found.insert(key, quote);
                            answered += 1;
                        }
                    }
                    info!(
                        "Provider '{}' answered {}/{} symbols",
                        provider.id(),
                        answered,
                        pending.len()
                    );
                }
                Err(e) => {
                    warn!(
                        "Provider '{}' failed ({}): {}, falling through",
                        provider.id(),
                        e.kind(),
                        e
                    );
                }
            }
        }

        let quotes: Vec<Quote> = requested
            .iter()
            .filter_map(|symbol| found.remove(symbol))
            .collect();

        if quotes.is_empty() {
            warn!("Every provider failed for [{}]", requested.join(","));
            return Err(MarketDataError::AllProvidersFailed);
        }

        Ok(quotes)
    }

    /// Latest quote for one symbol, served from the cache when fresh.
    ///
    /// A miss goes through [`resolve`](Self::resolve) and the result is
    /// cached under `stock:<symbol>` for
    /// [`STOCK_PRICE_TTL`](crate::cache::STOCK_PRICE_TTL).
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let symbol = normalize_symbol(symbol)?;

        if let Some(quote) = self.cache.get_stock_price(&symbol) {
            debug!("Cache hit for {}", symbol);
            return Ok(quote);
        }

        let quote = self
            .resolve(std::slice::from_ref(&symbol))
            .await?
            .into_iter()
            .next()
            .ok_or(MarketDataError::AllProvidersFailed)?;

        self.cache.set_stock_price(&symbol, quote.clone());
        Ok(quote)
    }

    /// Quotes for several symbols, fetched one at a time.
    ///
    /// Each symbol goes through [`get_quote`](Self::get_quote); the resolver
    /// sleeps for the bulk delay between symbols so upstream rate limits are
    /// not tripped. There is no concurrency, so N symbols take at least
    /// (N - 1) x delay. Symbols that fail are omitted from the map. More than
    /// [`MAX_BULK_SYMBOLS`] distinct symbols is rejected as `InvalidSymbol`.
    pub async fn get_bulk_quotes(
        &self,
        symbols: &[String],
    ) -> Result<BTreeMap<String, Quote>, MarketDataError> {
        let requested = normalize_symbols(symbols)?;
        if requested.len() > MAX_BULK_SYMBOLS {
            return Err(MarketDataError::InvalidSymbol(format!(
                "{} symbols requested, at most {} per bulk request",
                requested.len(),
                MAX_BULK_SYMBOLS
            )));
        }
        let mut quotes = BTreeMap::new();

        for (index, symbol) in requested.iter().enumerate() {
            if index > 0 && !self.bulk_delay.is_zero() {
                tokio::time::sleep(self.bulk_delay).await;
            }

            match self.get_quote(symbol).await {
                Ok(quote) => {
                    quotes.insert(symbol.clone(), quote);
                }
                Err(e) => {
                    warn!("Bulk lookup dropped {} ({}): {}", symbol, e.kind(), e);
                }
            }
        }

        if quotes.is_empty() {
            return Err(MarketDataError::AllProvidersFailed);
        }

        Ok(quotes)
    }
}

/// Trim and upper-case a caller-supplied symbol, rejecting anything that
/// can't be a ticker.
pub fn normalize_symbol(symbol: &str) -> Result<String, MarketDataError> {
    let normalized = symbol.trim().to_uppercase();

    let valid = !normalized.is_empty()
        && normalized.len() <= MAX_SYMBOL_LEN
        && normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=' | ':'));

    if !valid {
        return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
    }

    Ok(normalized)
}

/// Normalize a symbol list, dropping blanks and duplicates while keeping
/// first-seen order.
pub fn normalize_symbols(symbols: &[String]) -> Result<Vec<String>, MarketDataError> {
    let mut seen = HashSet::with_capacity(symbols.len());
    let mut normalized = Vec::with_capacity(symbols.len());

    for symbol in symbols.iter().filter(|s| !s.trim().is_empty()) {
        let symbol = normalize_symbol(symbol)?;
        if seen.insert(symbol.clone()) {
            normalized.push(symbol);
        }
    }

    if normalized.is_empty() {
        return Err(MarketDataError::InvalidSymbol(
            "no symbols requested".to_string(),
        ));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::QuoteSource;
    use crate::provider::{AlphaVantageProvider, FinnhubProvider, SyntheticProvider};

    struct MockProvider {
        id: &'static str,
        source: QuoteSource,
        known: Vec<&'static str>,
        call_count: AtomicUsize,
        requested: Mutex<Vec<Vec<String>>>,
    }

    impl MockProvider {
        fn new(id: &'static str, source: QuoteSource, known: &[&'static str]) -> Self {
            Self {
                id,
                source,
                known: known.to_vec(),
                call_count: AtomicUsize::new(0),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn failing(id: &'static str, source: QuoteSource) -> Self {
            Self::new(id, source, &[])
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteProvider for MockProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn source(&self) -> QuoteSource {
            self.source
        }

        async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
            if self.known.iter().any(|k| *k == symbol) {
                Ok(Quote::new(
                    symbol,
                    dec!(100.00),
                    dec!(1.00),
                    dec!(1.01),
                    1_000,
                    Utc::now(),
                    self.source,
                ))
            } else {
                Err(MarketDataError::SymbolNotFound(symbol.to_string()))
            }
        }

        async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(symbols.to_vec());

            if self.known.is_empty() {
                return Err(MarketDataError::ProviderError {
                    provider: self.id.to_string(),
                    message: "forced failure".to_string(),
                });
            }

            let mut quotes = Vec::new();
            for symbol in symbols {
                if let Ok(quote) = self.fetch_quote(symbol).await {
                    quotes.push(quote);
                }
            }
            Ok(quotes)
        }
    }

    /// Counts batch calls on a real provider.
    struct Counting<P> {
        inner: P,
        call_count: AtomicUsize,
    }

    impl<P> Counting<P> {
        fn new(inner: P) -> Self {
            Self {
                inner,
                call_count: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<P: QuoteProvider> QuoteProvider for Counting<P> {
        fn id(&self) -> &'static str {
            self.inner.id()
        }

        fn source(&self) -> QuoteSource {
            self.inner.source()
        }

        async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
            self.inner.fetch_quote(symbol).await
        }

        async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_quotes(symbols).await
        }
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn resolver(providers: Vec<Arc<dyn QuoteProvider>>) -> QuoteResolver {
        QuoteResolver::new(providers, Arc::new(MarketCache::new()))
    }

    #[tokio::test]
    async fn test_both_providers_fail_falls_back_to_synthetic() {
        let primary = Arc::new(MockProvider::failing("PRIMARY", QuoteSource::AlphaVantage));
        let secondary = Arc::new(MockProvider::failing("SECONDARY", QuoteSource::Finnhub));
        let resolver = resolver(vec![
            primary.clone(),
            secondary.clone(),
            Arc::new(SyntheticProvider::with_seed(3)),
        ]);

        let quotes = resolver.resolve(&symbols(&["AAPL"])).await.unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].symbol, "AAPL");
        assert_eq!(quotes[0].source, QuoteSource::Synthetic);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_real_providers_fall_through() {
        let resolver = resolver(vec![
            Arc::new(AlphaVantageProvider::new(None)),
            Arc::new(FinnhubProvider::new(None)),
            Arc::new(SyntheticProvider::new()),
        ]);

        let quotes = resolver.resolve(&symbols(&["AAPL"])).await.unwrap();
        assert_eq!(quotes.len(), 1);
        assert!(quotes[0].source.is_synthetic());
    }

    #[tokio::test]
    async fn test_primary_success_skips_later_tiers() {
        let primary = Arc::new(MockProvider::new(
            "PRIMARY",
            QuoteSource::AlphaVantage,
            &["X"],
        ));
        let secondary = Arc::new(MockProvider::new("SECONDARY", QuoteSource::Finnhub, &["X"]));
        let synthetic = Arc::new(Counting::new(SyntheticProvider::new()));
        let resolver = resolver(vec![primary.clone(), secondary.clone(), synthetic.clone()]);

        let quotes = resolver.resolve(&symbols(&["X"])).await.unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].source, QuoteSource::AlphaVantage);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
        assert_eq!(synthetic.calls(), 0);
    }

    #[tokio::test]
    async fn test_partial_primary_sends_only_missing_symbols_on() {
        let primary = Arc::new(MockProvider::new(
            "PRIMARY",
            QuoteSource::AlphaVantage,
            &["AAPL"],
        ));
        let secondary = Arc::new(MockProvider::new(
            "SECONDARY",
            QuoteSource::Finnhub,
            &["MSFT"],
        ));
        let synthetic = Arc::new(Counting::new(SyntheticProvider::new()));
        let resolver = resolver(vec![primary.clone(), secondary.clone(), synthetic.clone()]);

        let quotes = resolver
            .resolve(&symbols(&["AAPL", "MSFT", "TSLA"]))
            .await
            .unwrap();

        let sources: Vec<_> = quotes.iter().map(|q| (q.symbol.as_str(), q.source)).collect();
        assert_eq!(
            sources,
            vec![
                ("AAPL", QuoteSource::AlphaVantage),
                ("MSFT", QuoteSource::Finnhub),
                ("TSLA", QuoteSource::Synthetic),
            ]
        );
        assert_eq!(
            secondary.requested.lock().unwrap().clone(),
            vec![symbols(&["MSFT", "TSLA"])]
        );
        assert_eq!(synthetic.calls(), 1);
    }

    #[tokio::test]
    async fn test_without_synthetic_tier_all_failures_surface() {
        let resolver = resolver(vec![
            Arc::new(MockProvider::failing("PRIMARY", QuoteSource::AlphaVantage)),
            Arc::new(MockProvider::failing("SECONDARY", QuoteSource::Finnhub)),
        ]);

        let err = resolver.resolve(&symbols(&["AAPL"])).await.unwrap_err();
        assert!(matches!(err, MarketDataError::AllProvidersFailed));
    }

    #[tokio::test]
    async fn test_symbols_are_normalized_and_deduplicated() {
        let resolver = resolver(vec![Arc::new(SyntheticProvider::new())]);

        let quotes = resolver
            .resolve(&symbols(&[" aapl", "AAPL", "", "msft "]))
            .await
            .unwrap();

        let names: Vec<_> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(names, vec!["AAPL", "MSFT"]);
    }

    #[tokio::test]
    async fn test_invalid_symbols_are_rejected() {
        let resolver = resolver(vec![Arc::new(SyntheticProvider::new())]);

        let err = resolver.resolve(&[]).await.unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidSymbol(_)));

        let err = resolver
            .resolve(&symbols(&["AAPL", "DROP TABLE"]))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidSymbol(ref s) if s == "DROP TABLE"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_quote_is_served_from_cache() {
        let primary = Arc::new(MockProvider::new(
            "PRIMARY",
            QuoteSource::AlphaVantage,
            &["AAPL"],
        ));
        let resolver = resolver(vec![primary.clone()]);

        let first = resolver.get_quote("aapl").await.unwrap();
        let second = resolver.get_quote("AAPL").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(primary.calls(), 1);

        tokio::time::advance(Duration::from_secs(10)).await;
        resolver.get_quote("AAPL").await.unwrap();
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_is_sequential_with_delay() {
        let delay = Duration::from_millis(500);
        let resolver = resolver(vec![
            Arc::new(MockProvider::failing("PRIMARY", QuoteSource::AlphaVantage)),
            Arc::new(MockProvider::failing("SECONDARY", QuoteSource::Finnhub)),
            Arc::new(SyntheticProvider::with_seed(99)),
        ])
        .with_bulk_delay(delay);

        let started = tokio::time::Instant::now();
        let quotes = resolver
            .get_bulk_quotes(&symbols(&["A", "B", "C"]))
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(quotes.len(), 3);
        assert!(quotes.values().all(|q| q.source.is_synthetic()));
        let prices: HashSet<_> = quotes.values().map(|q| q.price).collect();
        assert_eq!(prices.len(), 3);
        assert!(elapsed >= delay * 2, "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_bulk_omits_failed_symbols() {
        let resolver = resolver(vec![Arc::new(MockProvider::new(
            "PRIMARY",
            QuoteSource::AlphaVantage,
            &["AAPL"],
        ))])
        .with_bulk_delay(Duration::ZERO);

        let quotes = resolver
            .get_bulk_quotes(&symbols(&["AAPL", "NOPE"]))
            .await
            .unwrap();
        assert_eq!(quotes.keys().collect::<Vec<_>>(), vec!["AAPL"]);
    }

    #[tokio::test]
    async fn test_bulk_rejects_oversized_requests() {
        let primary = Arc::new(MockProvider::failing("PRIMARY", QuoteSource::AlphaVantage));
        let resolver = resolver(vec![primary.clone(), Arc::new(SyntheticProvider::with_seed(7))])
            .with_bulk_delay(Duration::ZERO);

        let too_many: Vec<String> = (0..=MAX_BULK_SYMBOLS).map(|i| format!("S{}", i)).collect();
        let err = resolver.get_bulk_quotes(&too_many).await.unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidSymbol(_)));
        assert_eq!(primary.calls(), 0);

        // Duplicates collapse before the limit applies
        let mut at_limit: Vec<String> = too_many[..MAX_BULK_SYMBOLS].to_vec();
        at_limit.push("S0".to_string());
        let quotes = resolver.get_bulk_quotes(&at_limit).await.unwrap();
        assert_eq!(quotes.len(), MAX_BULK_SYMBOLS);
    }

    #[test]
    fn test_provider_order_is_preserved() {
        let resolver = resolver(vec![
            Arc::new(AlphaVantageProvider::new(None)),
            Arc::new(FinnhubProvider::new(None)),
            Arc::new(SyntheticProvider::new()),
        ]);
        assert_eq!(
            resolver.providers(),
            vec!["ALPHA_VANTAGE", "FINNHUB", "SYNTHETIC"]
        );
        assert_eq!(resolver.bulk_delay(), DEFAULT_BULK_DELAY);
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" brk.b ").unwrap(), "BRK.B");
        assert_eq!(normalize_symbol("^GSPC").unwrap(), "^GSPC");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("WAY_TOO_LONG_SYMBOL").is_err());
    }
}
