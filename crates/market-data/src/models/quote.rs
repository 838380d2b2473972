use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a quote came from.
///
/// Serialized as `ALPHA_VANTAGE`, `FINNHUB` or `SYNTHETIC`. This tag is the
/// only thing that tells a consumer real market data apart from fabricated
/// data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteSource {
    /// Primary provider (batch capable).
    AlphaVantage,
    /// Secondary provider (one call per symbol).
    Finnhub,
    /// Generated locally when no real source answered.
    Synthetic,
}

impl QuoteSource {
    /// Stable identifier, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlphaVantage => "ALPHA_VANTAGE",
            Self::Finnhub => "FINNHUB",
            Self::Synthetic => "SYNTHETIC",
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic)
    }
}

impl fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time price/volume snapshot for a symbol.
///
/// Built fresh for every request and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,

    /// Last traded price
    pub price: Decimal,

    /// Absolute change against the previous close
    pub change: Decimal,

    /// Percentage change against the previous close
    pub change_percent: Decimal,

    pub volume: u64,

    /// Serialized as RFC 3339 / ISO-8601
    pub timestamp: DateTime<Utc>,

    pub source: QuoteSource,
}

impl Quote {
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        change: Decimal,
        change_percent: Decimal,
        volume: u64,
        timestamp: DateTime<Utc>,
        source: QuoteSource,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change,
            change_percent,
            volume,
            timestamp,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_serializes_camel_case() {
        let timestamp = DateTime::parse_from_rfc3339("2024-01-02T15:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let quote = Quote::new(
            "AAPL",
            dec!(150.25),
            dec!(1.50),
            dec!(1.01),
            1_000_000,
            timestamp,
            QuoteSource::Finnhub,
        );

        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(json["changePercent"], 1.01);
        assert_eq!(json["price"], 150.25);
        assert_eq!(json["volume"], 1_000_000);
        assert_eq!(json["timestamp"], "2024-01-02T15:30:00Z");
        assert_eq!(json["source"], "FINNHUB");
    }

    #[test]
    fn test_quote_source_display() {
        assert_eq!(QuoteSource::AlphaVantage.to_string(), "ALPHA_VANTAGE");
        assert_eq!(QuoteSource::Synthetic.to_string(), "SYNTHETIC");
        assert!(QuoteSource::Synthetic.is_synthetic());
        assert!(!QuoteSource::Finnhub.is_synthetic());
    }
}
