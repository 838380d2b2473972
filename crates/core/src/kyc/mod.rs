//! KYC module.
//!
//! PAN and Aadhaar verification against a remote verifier, answered by a local
//! format check whenever the verifier is missing or fails.
//!
//! ```text
//! KycService ──▶ KycVerifier (HTTP)  ──ok──▶ verified / rejected
//!      │                │ error
//!      ▼                ▼
//!   validation (regex) ───────────────────▶ format_valid / format_invalid
//! ```

mod errors;
mod http_verifier;
mod model;
mod service;
mod traits;
mod validation;

pub use errors::KycError;
pub use http_verifier::HttpKycVerifier;
pub use model::{KycDocument, KycStatus, KycVerification};
pub use service::KycService;
pub use traits::{KycServiceTrait, KycVerifier};
pub use validation::{
    is_valid_aadhaar_format, is_valid_pan_format, normalize_aadhaar, normalize_pan,
};
