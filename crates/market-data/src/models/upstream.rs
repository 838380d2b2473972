//! Provider response schemas and their mapping into [`Quote`].
//!
//! Each upstream speaks its own JSON dialect. Rather than letting loosely typed
//! values leak into the rest of the crate, every schema gets a variant of
//! [`UpstreamQuote`] and one explicit mapping arm. A payload that lacks a
//! required field fails with [`MarketDataError::MalformedPayload`] instead of
//! producing a half-filled quote.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use super::quote::{Quote, QuoteSource};
use crate::errors::MarketDataError;

/// One entry of the Alpha Vantage `REALTIME_BULK_QUOTES` `data` array.
///
/// Alpha Vantage encodes every number as a string.
#[derive(Clone, Debug, Deserialize)]
pub struct AlphaVantageBulkQuote {
    pub symbol: String,
    /// `YYYY-MM-DD HH:MM:SS.fff`, exchange time
    pub timestamp: Option<String>,
    pub close: Option<String>,
    pub volume: Option<String>,
    pub previous_close: Option<String>,
    pub change: Option<String>,
    /// Either `"1.23"` or `"1.23%"`
    pub change_percent: Option<String>,
}

/// Finnhub `/quote` response.
#[derive(Clone, Debug, Deserialize)]
pub struct FinnhubQuote {
    /// Current price
    pub c: Option<f64>,
    /// Change
    pub d: Option<f64>,
    /// Percent change
    pub dp: Option<f64>,
    /// Previous close
    pub pc: Option<f64>,
    /// Open price of the day
    pub o: Option<f64>,
    /// Timestamp (Unix seconds)
    pub t: Option<i64>,
}

/// Locally generated values for the synthetic tier.
#[derive(Clone, Debug)]
pub struct SyntheticQuote {
    pub symbol: String,
    pub price: Decimal,
    pub change_percent: Decimal,
    pub volume: u64,
}

/// A provider response before it has been normalized.
#[derive(Clone, Debug)]
pub enum UpstreamQuote {
    AlphaVantage(AlphaVantageBulkQuote),
    /// Finnhub's payload does not echo the symbol, so it travels alongside.
    Finnhub {
        symbol: String,
        payload: FinnhubQuote,
    },
    Synthetic(SyntheticQuote),
}

impl UpstreamQuote {
    pub fn source(&self) -> QuoteSource {
        match self {
            Self::AlphaVantage(_) => QuoteSource::AlphaVantage,
            Self::Finnhub { .. } => QuoteSource::Finnhub,
            Self::Synthetic(_) => QuoteSource::Synthetic,
        }
    }

    /// Normalize into the internal quote shape.
    pub fn into_quote(self) -> Result<Quote, MarketDataError> {
        match self {
            Self::AlphaVantage(raw) => map_alpha_vantage(raw),
            Self::Finnhub { symbol, payload } => map_finnhub(symbol, payload),
            Self::Synthetic(raw) => Ok(map_synthetic(raw)),
        }
    }
}

fn map_alpha_vantage(raw: AlphaVantageBulkQuote) -> Result<Quote, MarketDataError> {
    let provider = QuoteSource::AlphaVantage.as_str();

    let price = raw
        .close
        .as_deref()
        .and_then(parse_decimal_str)
        .ok_or_else(|| malformed(provider, format!("missing close price for {}", raw.symbol)))?;

    let previous_close = raw.previous_close.as_deref().and_then(parse_decimal_str);

    let change = match raw.change.as_deref().and_then(parse_decimal_str) {
        Some(change) => change,
        None => change_from(provider, price, previous_close)?,
    };

    let reported_percent = raw
        .change_percent
        .as_deref()
        .map(|s| s.trim().trim_end_matches('%'))
        .and_then(parse_decimal_str);
    let change_percent = match reported_percent {
        Some(percent) => percent,
        None => percent_of(provider, change, previous_close)?,
    };

    let volume = raw
        .volume
        .as_deref()
        .and_then(parse_decimal_str)
        .and_then(|v| v.trunc().to_u64())
        .unwrap_or(0);

    let timestamp = raw
        .timestamp
        .as_deref()
        .and_then(parse_exchange_timestamp)
        .unwrap_or_else(Utc::now);

    Ok(Quote::new(
        raw.symbol.trim().to_uppercase(),
        price,
        change,
        change_percent,
        volume,
        timestamp,
        QuoteSource::AlphaVantage,
    ))
}

fn map_finnhub(symbol: String, raw: FinnhubQuote) -> Result<Quote, MarketDataError> {
    let provider = QuoteSource::Finnhub.as_str();

    let close = raw
        .c
        .ok_or_else(|| malformed(provider, format!("missing current price for {}", symbol)))?;

    // Finnhub answers unknown symbols with an all-zero payload instead of an error
    if close == 0.0 && raw.pc.unwrap_or(0.0) == 0.0 && raw.o.unwrap_or(0.0) == 0.0 {
        return Err(MarketDataError::SymbolNotFound(symbol));
    }

    let price = Decimal::try_from(close)
        .map_err(|_| malformed(provider, format!("invalid current price: {}", close)))?;
    let previous_close = raw.pc.and_then(|v| Decimal::try_from(v).ok());

    let change = match raw.d.and_then(|v| Decimal::try_from(v).ok()) {
        Some(change) => change,
        None => change_from(provider, price, previous_close)?,
    };

    let change_percent = match raw.dp.and_then(|v| Decimal::try_from(v).ok()) {
        Some(percent) => percent,
        None => percent_of(provider, change, previous_close)?,
    };

    let timestamp = raw
        .t
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(Utc::now);

    // /quote carries no volume
    Ok(Quote::new(
        symbol,
        price,
        change,
        change_percent,
        0,
        timestamp,
        QuoteSource::Finnhub,
    ))
}

fn map_synthetic(raw: SyntheticQuote) -> Quote {
    let change = (raw.price * raw.change_percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Quote::new(
        raw.symbol,
        raw.price,
        change,
        raw.change_percent,
        raw.volume,
        Utc::now(),
        QuoteSource::Synthetic,
    )
}

fn malformed(provider: &str, message: String) -> MarketDataError {
    MarketDataError::MalformedPayload {
        provider: provider.to_string(),
        message,
    }
}

fn parse_decimal_str(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    Decimal::from_str(trimmed)
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
}

/// `price - previous_close`, or zero without a previous close.
fn change_from(
    provider: &str,
    price: Decimal,
    previous_close: Option<Decimal>,
) -> Result<Decimal, MarketDataError> {
    match previous_close {
        Some(pc) => price
            .checked_sub(pc)
            .ok_or_else(|| malformed(provider, format!("change {} - {} overflows", price, pc))),
        None => Ok(Decimal::ZERO),
    }
}

/// Percent change against the previous close. Zero when there is nothing to
/// divide by; an overflowing ratio means the payload is nonsense.
fn percent_of(
    provider: &str,
    change: Decimal,
    previous_close: Option<Decimal>,
) -> Result<Decimal, MarketDataError> {
    match previous_close.filter(|pc| !pc.is_zero()) {
        Some(pc) => change
            .checked_div(pc)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|percent| percent.round_dp(4))
            .ok_or_else(|| {
                malformed(
                    provider,
                    format!("percent change {} / {} overflows", change, pc),
                )
            }),
        None => Ok(Decimal::ZERO),
    }
}

fn parse_exchange_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|dt| Utc.from_utc_datetime(&dt))
}
