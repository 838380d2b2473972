//! Email payloads and the canned messages built from them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::kyc::KycVerification;

/// One outgoing email. The body is plain HTML, there is no template engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// What an order confirmation email reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl OrderSummary {
    pub fn total(&self) -> Decimal {
        self.quantity * self.price
    }
}

/// Escapes the characters that matter inside HTML text.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl EmailMessage {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        }
    }

    pub fn order_confirmation(to: impl Into<String>, order: &OrderSummary) -> Self {
        let symbol = escape_html(&order.symbol);
        let subject = format!(
            "Order confirmed: {} {} {}",
            order.side.as_str(),
            order.quantity.normalize(),
            order.symbol
        );
        let html = format!(
            "<h2>Order confirmed</h2>\
             <p>Order <strong>{}</strong> has been placed.</p>\
             <table>\
             <tr><td>Symbol</td><td>{}</td></tr>\
             <tr><td>Side</td><td>{}</td></tr>\
             <tr><td>Quantity</td><td>{}</td></tr>\
             <tr><td>Price</td><td>{}</td></tr>\
             <tr><td>Total</td><td>{}</td></tr>\
             </table>",
            escape_html(&order.order_id),
            symbol,
            order.side.as_str(),
            order.quantity.normalize(),
            order.price.round_dp(2),
            order.total().round_dp(2),
        );
        Self::new(to, subject, html)
    }

    pub fn price_alert(
        to: impl Into<String>,
        symbol: &str,
        current_price: Decimal,
        target_price: Decimal,
    ) -> Self {
        let direction = if current_price >= target_price {
            "risen above"
        } else {
            "fallen below"
        };
        let subject = format!("Price alert: {} at {}", symbol, current_price.round_dp(2));
        let html = format!(
            "<h2>Price alert</h2>\
             <p><strong>{}</strong> has {} your target of {}.</p>\
             <p>Current price: {}</p>",
            escape_html(symbol),
            direction,
            target_price.round_dp(2),
            current_price.round_dp(2),
        );
        Self::new(to, subject, html)
    }

    pub fn kyc_status(to: impl Into<String>, name: &str, result: &KycVerification) -> Self {
        let outcome = if result.is_valid {
            "approved"
        } else {
            "could not be approved"
        };
        let mut html = format!(
            "<h2>KYC update</h2>\
             <p>Hello {},</p>\
             <p>Your KYC verification {} (status: {}).</p>",
            escape_html(name),
            outcome,
            result.status,
        );
        if let Some(message) = &result.message {
            html.push_str(&format!("<p>{}</p>", escape_html(message)));
        }
        Self::new(to, format!("KYC verification {}", outcome), html)
    }
}
