use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};

use super::model::{KycDocument, KycVerification};
use super::traits::{KycServiceTrait, KycVerifier};
use super::validation::{
    is_valid_aadhaar_format, is_valid_pan_format, normalize_aadhaar, normalize_pan,
};

/// Remote verification with a local format check as the fallback.
pub struct KycService {
    verifier: Option<Arc<dyn KycVerifier>>,
}

impl KycService {
    pub fn new(verifier: Arc<dyn KycVerifier>) -> Self {
        Self {
            verifier: Some(verifier),
        }
    }

    /// A service that only ever runs the format check.
    pub fn local_only() -> Self {
        Self { verifier: None }
    }

    fn format_fallback(document: KycDocument, is_valid: bool) -> KycVerification {
        let message = if is_valid {
            format!(
                "{} format is valid; remote verification unavailable",
                document.label()
            )
        } else {
            format!("{} format is invalid", document.label())
        };
        KycVerification::format_check(is_valid, message)
    }
}

#[async_trait]
impl KycServiceTrait for KycService {
    async fn verify_pan(&self, pan: &str, name: &str) -> KycVerification {
        let pan = normalize_pan(pan);
        let name = name.trim();

        if let Some(verifier) = &self.verifier {
            match verifier.verify_pan(&pan, name).await {
                Ok(result) => {
                    info!("PAN verified by {}: {}", verifier.id(), result.status);
                    return result;
                }
                Err(e) => warn!(
                    "{} PAN verification failed, using format check: {}",
                    verifier.id(),
                    e
                ),
            }
        }

        Self::format_fallback(KycDocument::Pan, is_valid_pan_format(&pan))
    }

    async fn verify_aadhaar(&self, aadhaar_number: &str) -> KycVerification {
        let number = normalize_aadhaar(aadhaar_number);

        if let Some(verifier) = &self.verifier {
            match verifier.verify_aadhaar(&number).await {
                Ok(result) => {
                    info!("Aadhaar verified by {}: {}", verifier.id(), result.status);
                    return result;
                }
                Err(e) => warn!(
                    "{} Aadhaar verification failed, using format check: {}",
                    verifier.id(),
                    e
                ),
            }
        }

        Self::format_fallback(KycDocument::Aadhaar, is_valid_aadhaar_format(&number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kyc::errors::KycError;
    use crate::kyc::model::KycStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Verifier that either always fails or always answers `valid`.
    struct MockVerifier {
        fail: bool,
        valid: bool,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl MockVerifier {
        fn failing() -> Self {
            Self {
                fail: true,
                valid: false,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn answering(valid: bool) -> Self {
            Self {
                fail: false,
                valid,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn answer(&self, input: &str) -> Result<KycVerification, KycError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(input.to_string());
            if self.fail {
                Err(KycError::Transport("connection refused".to_string()))
            } else {
                Ok(KycVerification::remote(self.valid, None))
            }
        }
    }

    #[async_trait]
    impl KycVerifier for MockVerifier {
        fn id(&self) -> &'static str {
            "MOCK"
        }

        async fn verify_pan(&self, pan: &str, _name: &str) -> Result<KycVerification, KycError> {
            self.answer(pan)
        }

        async fn verify_aadhaar(&self, number: &str) -> Result<KycVerification, KycError> {
            self.answer(number)
        }
    }

    #[tokio::test]
    async fn pan_falls_back_to_format_check_on_remote_failure() {
        let verifier = Arc::new(MockVerifier::failing());
        let service = KycService::new(verifier.clone());

        let ok = service.verify_pan("ABCDE1234F", "Asha Rao").await;
        assert!(ok.is_valid);
        assert_eq!(ok.status, KycStatus::FormatValid);

        let bad = service.verify_pan("bad", "Asha Rao").await;
        assert!(!bad.is_valid);
        assert_eq!(bad.status, KycStatus::FormatInvalid);

        assert_eq!(verifier.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn remote_answer_is_returned_as_is() {
        let service = KycService::new(Arc::new(MockVerifier::answering(false)));

        // Well-formed but rejected upstream.
        let result = service.verify_pan("ABCDE1234F", "Asha Rao").await;
        assert!(!result.is_valid);
        assert_eq!(result.status, KycStatus::Rejected);
    }

    #[tokio::test]
    async fn inputs_are_normalized_before_verification() {
        let verifier = Arc::new(MockVerifier::answering(true));
        let service = KycService::new(verifier.clone());

        service.verify_pan("  abcde1234f ", "Asha").await;
        service.verify_aadhaar("1234 5678 9012").await;

        let seen = verifier.seen.lock().unwrap().clone();
        assert_eq!(seen, vec!["ABCDE1234F", "123456789012"]);
    }

    #[tokio::test]
    async fn local_only_service_checks_aadhaar_format() {
        let service = KycService::local_only();

        let ok = service.verify_aadhaar("1234 5678 9012").await;
        assert!(ok.is_valid);
        assert_eq!(ok.status, KycStatus::FormatValid);

        let bad = service.verify_aadhaar("12345").await;
        assert!(!bad.is_valid);
        assert_eq!(bad.status, KycStatus::FormatInvalid);
        assert_eq!(bad.message.as_deref(), Some("Aadhaar format is invalid"));
    }
}
