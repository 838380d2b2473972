//! Synthetic quote generator (last tier).
//!
//! Produces plausible-looking but fabricated quotes so callers always get an
//! answer. Every quote is tagged [`QuoteSource::Synthetic`].

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{Quote, QuoteSource, SyntheticQuote, UpstreamQuote};
use crate::provider::QuoteProvider;

const PROVIDER_ID: &str = "SYNTHETIC";

/// Price range in cents: [50.00, 1000.00)
const PRICE_CENTS_RANGE: std::ops::Range<i64> = 5_000..100_000;

/// Daily move in hundredths of a percent: [-5.00 %, +5.00 %]
const CHANGE_BPS_RANGE: std::ops::RangeInclusive<i64> = -500..=500;

const VOLUME_RANGE: std::ops::Range<u64> = 100_000..10_000_000;

/// Random quote generator.
pub struct SyntheticProvider {
    rng: Mutex<StdRng>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| {
            warn!("Synthetic rng mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Draw raw values for `symbol`.
    pub fn generate(&self, symbol: &str) -> SyntheticQuote {
        let mut rng = self.lock_rng();

        SyntheticQuote {
            symbol: symbol.to_string(),
            price: Decimal::new(rng.gen_range(PRICE_CENTS_RANGE), 2),
            change_percent: Decimal::new(rng.gen_range(CHANGE_BPS_RANGE), 2),
            volume: rng.gen_range(VOLUME_RANGE),
        }
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for SyntheticProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn source(&self) -> QuoteSource {
        QuoteSource::Synthetic
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        UpstreamQuote::Synthetic(self.generate(symbol)).into_quote()
    }
}
