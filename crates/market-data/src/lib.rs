//! Tradedesk Market Data Crate
//!
//! Best-effort stock quotes from an ordered chain of sources, with a short-lived
//! in-memory cache in front.
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  HTTP handlers   | --> |  QuoteResolver   |  (fallback chain)
//! +------------------+     +------------------+
//!                            |            |
//!                            v            v
//!                  +---------------+  +------------------+
//!                  |  MarketCache  |  |  QuoteProvider   |  (Alpha Vantage,
//!                  +---------------+  +------------------+   Finnhub, Synthetic)
//!                                             |
//!                                             v
//!                                     +------------------+
//!                                     |  UpstreamQuote   |  (per-provider schema)
//!                                     +------------------+
//!                                             |
//!                                             v
//!                                     +------------------+
//!                                     |      Quote       |
//!                                     +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Quote`] - Normalized quote returned to callers
//! - [`QuoteSource`] - Which tier produced a quote
//! - [`QuoteProvider`] - One tier of the fallback chain
//! - [`QuoteResolver`] - Walks the chain, caches single lookups
//! - [`MarketCache`] - Namespaced TTL cache shared across domains

pub mod cache;
pub mod errors;
pub mod models;
pub mod provider;
pub mod resolver;

pub use cache::{MarketCache, TtlCache};
pub use errors::MarketDataError;
pub use models::{Quote, QuoteSource, UpstreamQuote};
pub use provider::{AlphaVantageProvider, FinnhubProvider, QuoteProvider, SyntheticProvider};
pub use resolver::{QuoteResolver, DEFAULT_BULK_DELAY, MAX_BULK_SYMBOLS};
