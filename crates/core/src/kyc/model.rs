//! KYC domain types.

use serde::{Deserialize, Serialize};

/// Outcome label attached to every verification.
///
/// `Verified` and `Rejected` come from the remote verifier. The `Format*`
/// variants mean only the local pattern check ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    Verified,
    Rejected,
    FormatValid,
    FormatInvalid,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Verified => "verified",
            KycStatus::Rejected => "rejected",
            KycStatus::FormatValid => "format_valid",
            KycStatus::FormatInvalid => "format_invalid",
        }
    }

    /// True when the status came from the local format check.
    pub fn is_fallback(&self) -> bool {
        matches!(self, KycStatus::FormatValid | KycStatus::FormatInvalid)
    }
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a PAN or Aadhaar verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycVerification {
    pub is_valid: bool,
    pub status: KycStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl KycVerification {
    pub fn remote(is_valid: bool, message: Option<String>) -> Self {
        Self {
            is_valid,
            status: if is_valid {
                KycStatus::Verified
            } else {
                KycStatus::Rejected
            },
            message,
        }
    }

    pub fn format_check(is_valid: bool, message: impl Into<String>) -> Self {
        Self {
            is_valid,
            status: if is_valid {
                KycStatus::FormatValid
            } else {
                KycStatus::FormatInvalid
            },
            message: Some(message.into()),
        }
    }
}

/// Document kinds the verifier understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KycDocument {
    Pan,
    Aadhaar,
}

impl KycDocument {
    pub fn label(&self) -> &'static str {
        match self {
            KycDocument::Pan => "PAN",
            KycDocument::Aadhaar => "Aadhaar",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_value(KycVerification::format_check(true, "ok")).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["status"], "format_valid");
        assert_eq!(json["message"], "ok");
    }

    #[test]
    fn remote_result_maps_status() {
        assert_eq!(KycVerification::remote(true, None).status, KycStatus::Verified);
        assert_eq!(KycVerification::remote(false, None).status, KycStatus::Rejected);
        assert!(!KycStatus::Verified.is_fallback());
        assert!(KycStatus::FormatInvalid.is_fallback());
    }

    #[test]
    fn message_omitted_when_absent() {
        let json = serde_json::to_value(KycVerification::remote(true, None)).unwrap();
        assert!(json.get("message").is_none());
    }
}
