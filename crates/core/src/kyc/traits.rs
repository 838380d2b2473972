//! KYC traits.
//!
//! - `KycVerifier` - a remote document verification backend
//! - `KycServiceTrait` - what the API layer calls

use async_trait::async_trait;

use super::errors::KycError;
use super::model::KycVerification;

/// A remote PAN/Aadhaar verification backend.
#[async_trait]
pub trait KycVerifier: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &'static str;

    async fn verify_pan(&self, pan: &str, name: &str) -> Result<KycVerification, KycError>;

    async fn verify_aadhaar(&self, aadhaar_number: &str) -> Result<KycVerification, KycError>;
}

/// KYC verification as seen by callers.
///
/// Infallible by contract: when the remote check cannot answer, the result
/// comes from the local format check instead.
#[async_trait]
pub trait KycServiceTrait: Send + Sync {
    async fn verify_pan(&self, pan: &str, name: &str) -> KycVerification;

    async fn verify_aadhaar(&self, aadhaar_number: &str) -> KycVerification;
}
