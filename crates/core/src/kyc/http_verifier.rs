//! HTTP client for a JSON KYC verification API.
//!
//! Endpoints, relative to the configured base URL:
//! - `POST /pan`      `{"pan": "...", "name": "..."}`
//! - `POST /aadhaar`  `{"aadhaarNumber": "..."}`
//!
//! Both answer `{"valid": bool, "message": "..."}` (`isValid` is accepted too).

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::errors::KycError;
use super::model::KycVerification;
use super::traits::KycVerifier;

const VERIFIER_ID: &str = "KYC_HTTP";
/// Kept well under the server's request deadline so a hung verifier still
/// leaves time for the format-check fallback.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct PanRequest<'a> {
    pan: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AadhaarRequest<'a> {
    aadhaar_number: &'a str,
}

#[derive(Deserialize)]
struct VerifierResponse {
    #[serde(alias = "isValid")]
    valid: bool,
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpKycVerifier {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpKycVerifier {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && self.api_key.is_some()
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<KycVerification, KycError> {
        let api_key = match (&self.api_key, self.base_url.is_empty()) {
            (Some(key), false) => key,
            _ => return Err(KycError::NotConfigured),
        };

        let url = format!("{}/{}", self.base_url, path);
        debug!("KYC verifier request: POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(KycError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: VerifierResponse = response.json().await?;
        Ok(KycVerification::remote(parsed.valid, parsed.message))
    }
}

#[async_trait]
impl KycVerifier for HttpKycVerifier {
    fn id(&self) -> &'static str {
        VERIFIER_ID
    }

    async fn verify_pan(&self, pan: &str, name: &str) -> Result<KycVerification, KycError> {
        self.post("pan", &PanRequest { pan, name }).await
    }

    async fn verify_aadhaar(&self, aadhaar_number: &str) -> Result<KycVerification, KycError> {
        self.post("aadhaar", &AadhaarRequest { aadhaar_number })
            .await
    }
}
