//! Quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait every tier of the fallback chain implements
//! - Alpha Vantage (batch, primary), Finnhub (per symbol, secondary)
//! - The synthetic generator used as the last resort

use std::time::Duration;

mod traits;

pub mod alpha_vantage;
pub mod finnhub;
pub mod synthetic;

pub use alpha_vantage::AlphaVantageProvider;
pub use finnhub::FinnhubProvider;
pub use synthetic::SyntheticProvider;
pub use traits::QuoteProvider;

/// HTTP timeout for each live provider. Two live tiers back to back must
/// still leave room for the synthetic tier inside one request deadline.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
