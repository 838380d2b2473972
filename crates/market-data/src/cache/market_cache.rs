//! Shared cache for the market data layer.
//!
//! One flat map holds values of unrelated types. Keys are namespaced
//! (`stock:<symbol>`, `portfolio:<userId>`, `orderbook:<symbol>`) so logical
//! domains don't collide, and each domain wrapper applies a fixed TTL.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use super::ttl_cache::TtlCache;
use crate::models::Quote;

/// TTL for `stock:<symbol>` entries.
pub const STOCK_PRICE_TTL: Duration = Duration::from_secs(10);

/// TTL for `portfolio:<userId>` entries.
pub const PORTFOLIO_TTL: Duration = Duration::from_secs(30);

/// TTL for `orderbook:<symbol>` entries.
pub const ORDER_BOOK_TTL: Duration = Duration::from_secs(15);

type CachedValue = Arc<dyn Any + Send + Sync>;

/// `stock:<SYMBOL>`, with the symbol trimmed and upper-cased.
pub fn stock_key(symbol: &str) -> String {
    format!("stock:{}", symbol.trim().to_uppercase())
}

/// `portfolio:<userId>`, user id kept verbatim.
pub fn portfolio_key(user_id: &str) -> String {
    format!("portfolio:{}", user_id)
}

/// `orderbook:<SYMBOL>`, normalized like [`stock_key`].
pub fn order_book_key(symbol: &str) -> String {
    format!("orderbook:{}", symbol.trim().to_uppercase())
}

/// Process-wide cache for quotes, portfolios and order books.
///
/// Built once at startup and handed to whoever needs it; there is no global
/// instance.
#[derive(Default)]
pub struct MarketCache {
    entries: TtlCache<CachedValue>,
}

impl MarketCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store any value. `ttl` of `None` means the cache's default TTL.
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T, ttl: Option<Duration>) {
        let value: CachedValue = Arc::new(value);
        match ttl {
            Some(ttl) => self.entries.set_with_ttl(key, value, ttl),
            None => self.entries.set(key, value),
        }
    }

    /// Fetch a live value of type `T`.
    ///
    /// An entry stored under a different type reads as absent.
    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    pub fn delete(&self, key: &str) -> bool {
        self.entries.delete(key)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Stock prices

    pub fn set_stock_price(&self, symbol: &str, quote: Quote) {
        self.set(stock_key(symbol), quote, Some(STOCK_PRICE_TTL));
    }

    pub fn get_stock_price(&self, symbol: &str) -> Option<Quote> {
        self.get(&stock_key(symbol))
    }

    pub fn invalidate_stock_price(&self, symbol: &str) -> bool {
        self.delete(&stock_key(symbol))
    }

    // Portfolios

    pub fn set_portfolio<T: Any + Send + Sync>(&self, user_id: &str, portfolio: T) {
        self.set(portfolio_key(user_id), portfolio, Some(PORTFOLIO_TTL));
    }

    pub fn get_portfolio<T: Any + Clone>(&self, user_id: &str) -> Option<T> {
        self.get(&portfolio_key(user_id))
    }

    pub fn invalidate_portfolio(&self, user_id: &str) -> bool {
        self.delete(&portfolio_key(user_id))
    }

    // Order books

    pub fn set_order_book<T: Any + Send + Sync>(&self, symbol: &str, order_book: T) {
        self.set(order_book_key(symbol), order_book, Some(ORDER_BOOK_TTL));
    }

    pub fn get_order_book<T: Any + Clone>(&self, symbol: &str) -> Option<T> {
        self.get(&order_book_key(symbol))
    }

    pub fn invalidate_order_book(&self, symbol: &str) -> bool {
        self.delete(&order_book_key(symbol))
    }
}
