//! Notification module.
//!
//! Stateless email dispatch over a transactional email HTTP API, plus the
//! canned messages the trading flows send (order confirmation, price alert,
//! KYC status).

mod client;
mod errors;
mod model;

pub use client::EmailClient;
pub use errors::NotificationError;
pub use model::{EmailMessage, OrderSide, OrderSummary};
