//! Tradedesk core services.
//!
//! - [`kyc`] - PAN/Aadhaar verification with a local format fallback
//! - [`notifications`] - transactional email dispatch

pub mod kyc;
pub mod notifications;

pub use kyc::{KycService, KycServiceTrait, KycVerification};
pub use notifications::{EmailClient, EmailMessage, NotificationError};
