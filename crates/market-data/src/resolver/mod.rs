//! Quote resolution across providers.
//!
//! ```text
//!   get_bulk_quotes ──(one symbol at a time, fixed delay)──┐
//!                                                          ▼
//!                      get_quote ──hit──▶ MarketCache (stock:<symbol>)
//!                          │ miss
//!                          ▼
//!                       resolve
//!                          │
//!   ┌──────────────────────┼───────────────────────────────┐
//!   │ 1. ALPHA_VANTAGE   one bulk request                  │
//!   │ 2. FINNHUB         one request per remaining symbol  │
//!   │ 3. SYNTHETIC       generated for whatever is left    │
//!   └──────────────────────────────────────────────────────┘
//! ```

mod quote_resolver;

pub use quote_resolver::{
    normalize_symbol, normalize_symbols, QuoteResolver, DEFAULT_BULK_DELAY, MAX_BULK_SYMBOLS,
};
