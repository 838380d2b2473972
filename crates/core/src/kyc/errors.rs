//! KYC error types.

use thiserror::Error;

/// Errors raised by a remote KYC verifier.
///
/// None of these reach API callers: the service answers with a local format
/// check whenever the verifier fails.
#[derive(Error, Debug)]
pub enum KycError {
    /// No verifier endpoint or API key is configured.
    #[error("KYC verifier is not configured")]
    NotConfigured,

    /// The verifier could not be reached or timed out.
    #[error("KYC verifier request failed: {0}")]
    Transport(String),

    /// The verifier answered with a non-success status.
    #[error("KYC verifier returned HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The verifier answered with a body we could not read.
    #[error("KYC verifier returned an unreadable response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for KycError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            KycError::MalformedResponse(err.to_string())
        } else {
            KycError::Transport(err.to_string())
        }
    }
}
