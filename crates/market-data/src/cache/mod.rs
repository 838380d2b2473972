//! In-memory caching for upstream responses.

mod market_cache;
mod ttl_cache;

pub use market_cache::{
    order_book_key, portfolio_key, stock_key, MarketCache, ORDER_BOOK_TTL, PORTFOLIO_TTL,
    STOCK_PRICE_TTL,
};
pub use ttl_cache::{TtlCache, DEFAULT_TTL};
