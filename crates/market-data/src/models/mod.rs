//! Market data models
//!
//! - `quote` - The normalized quote returned to callers (Quote, QuoteSource)
//! - `upstream` - Per-provider response schemas and their mapping (UpstreamQuote)

mod quote;
mod upstream;

pub use quote::{Quote, QuoteSource};
pub use upstream::{AlphaVantageBulkQuote, FinnhubQuote, SyntheticQuote, UpstreamQuote};
