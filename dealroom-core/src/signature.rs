//! NDA signature records, status derivation and integrity validation

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::agreement::AgreementConfig;
use crate::error::Error;
use crate::hash::DocumentHash;
use crate::Result;

/// A recorded signature. At most one exists per user; re-signing updates
/// the mutable fields and preserves the id.
#[derive(Debug, Clone)]
pub struct NdaSignature {
    pub id: String,
    pub user_id: String,
    /// Identity snapshot at signing time; stripped from sanitized views
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    /// Opaque encoded signature payload; validated, never interpreted
    pub signature_data: String,
    pub signed_at: DateTime<Utc>,
    pub nda_version: String,
    pub document_hash: DocumentHash,
}

/// Format check for a submitted signature payload: it must decode to a
/// non-empty byte blob. Nothing is asserted about its visual content.
pub fn validate_signature_data(data: &str) -> Result<()> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidSignatureData("empty payload".to_string()));
    }

    // Canvas exports arrive as data URLs; strip the media-type prefix
    let encoded = match trimmed.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, b)| b).unwrap_or(rest),
        None => trimmed,
    };

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| Error::InvalidSignatureData(e.to_string()))?;
    if bytes.is_empty() {
        return Err(Error::InvalidSignatureData(
            "decoded payload is empty".to_string(),
        ));
    }
    Ok(())
}

/// Derived signing status. Exemption is layered on by the caller via
/// [`NdaStatus::exempt`]; this type only reflects stored signatures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NdaStatus {
    pub is_signed: bool,
    pub is_exempt: bool,
    pub can_access_protected_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_id: Option<String>,
}

impl NdaStatus {
    pub fn from_signature(signature: Option<&NdaSignature>) -> Self {
        match signature {
            Some(sig) => Self {
                is_signed: true,
                is_exempt: false,
                can_access_protected_content: true,
                signed_at: Some(sig.signed_at),
                version: Some(sig.nda_version.clone()),
                signature_id: Some(sig.id.clone()),
            },
            None => Self {
                is_signed: false,
                is_exempt: false,
                can_access_protected_content: false,
                signed_at: None,
                version: None,
                signature_id: None,
            },
        }
    }

    /// Status for a role that bypasses the NDA entirely: treated as
    /// signed without a stored signature.
    pub fn exempt() -> Self {
        Self {
            is_signed: true,
            is_exempt: true,
            can_access_protected_content: true,
            signed_at: None,
            version: None,
            signature_id: None,
        }
    }
}

/// Check a stored signature against the agreement currently in force.
///
/// Checks run in a fixed order and the first failure wins: version
/// mismatch, then hash mismatch, then expiry.
pub fn validate_integrity(
    signature: &NdaSignature,
    current_hash: &DocumentHash,
    config: &AgreementConfig,
    now: DateTime<Utc>,
) -> Result<()> {
    if signature.nda_version != config.version {
        return Err(Error::VersionMismatch {
            signed: signature.nda_version.clone(),
            current: config.version.clone(),
        });
    }
    if &signature.document_hash != current_hash {
        return Err(Error::IntegrityFailure);
    }
    let expires_at = signature.signed_at + config.validity;
    if now > expires_at {
        return Err(Error::Expired {
            expired_at: expires_at,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::hash::document_hash;

    fn signature(version: &str, hash: DocumentHash, signed_at: DateTime<Utc>) -> NdaSignature {
        NdaSignature {
            id: "sig-1".to_string(),
            user_id: "user-1".to_string(),
            user_email: Some("user@example.com".to_string()),
            user_name: Some("User One".to_string()),
            signature_data: "aGVsbG8=".to_string(),
            signed_at,
            nda_version: version.to_string(),
            document_hash: hash,
        }
    }

    #[test]
    fn test_signature_data_rejects_empty_and_undecodable() {
        assert!(validate_signature_data("").is_err());
        assert!(validate_signature_data("   ").is_err());
        assert!(validate_signature_data("not base64 !!!").is_err());
        // Data URL with an empty payload decodes to zero bytes
        assert!(validate_signature_data("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_signature_data_accepts_opaque_blobs() {
        assert!(validate_signature_data("aGVsbG8=").is_ok());
        assert!(validate_signature_data("data:image/png;base64,aGVsbG8=").is_ok());
    }

    #[test]
    fn test_status_without_signature() {
        let status = NdaStatus::from_signature(None);
        assert!(!status.is_signed);
        assert!(!status.can_access_protected_content);
        assert!(status.signature_id.is_none());
    }

    #[test]
    fn test_status_with_signature() {
        let config = AgreementConfig::default();
        let sig = signature(&config.version, document_hash("text"), Utc::now());
        let status = NdaStatus::from_signature(Some(&sig));
        assert!(status.is_signed);
        assert!(!status.is_exempt);
        assert!(status.can_access_protected_content);
        assert_eq!(status.signature_id.as_deref(), Some("sig-1"));
        assert_eq!(status.version.as_deref(), Some(config.version.as_str()));
    }

    #[test]
    fn test_exempt_status() {
        let status = NdaStatus::exempt();
        assert!(status.is_signed);
        assert!(status.is_exempt);
        assert!(status.can_access_protected_content);
        assert!(status.signature_id.is_none());
    }

    #[test]
    fn test_integrity_passes_for_current_signature() {
        let config = AgreementConfig::default();
        let hash = document_hash("text");
        let sig = signature(&config.version, hash.clone(), Utc::now());
        assert!(validate_integrity(&sig, &hash, &config, Utc::now()).is_ok());
    }

    #[test]
    fn test_version_mismatch_wins_over_hash_mismatch() {
        let config = AgreementConfig::default();
        // Both the version and the hash are stale; version must win
        let sig = signature("0.9", document_hash("old text"), Utc::now());
        let err = validate_integrity(&sig, &document_hash("new text"), &config, Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::VersionMismatch { .. }));
    }

    #[test]
    fn test_hash_mismatch_is_integrity_failure() {
        let config = AgreementConfig::default();
        let sig = signature(&config.version, document_hash("old text"), Utc::now());
        let err = validate_integrity(&sig, &document_hash("new text"), &config, Utc::now())
            .unwrap_err();
        assert_eq!(err, Error::IntegrityFailure);
    }

    #[test]
    fn test_expired_signature_fails_even_with_matching_hash() {
        let config = AgreementConfig::default();
        let hash = document_hash("text");
        let signed_at = Utc::now() - config.validity - Duration::days(1);
        let sig = signature(&config.version, hash.clone(), signed_at);
        let err = validate_integrity(&sig, &hash, &config, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Expired { .. }));
    }

    #[test]
    fn test_signature_just_inside_validity_window_passes() {
        let config = AgreementConfig::default();
        let hash = document_hash("text");
        let signed_at = Utc::now() - config.validity + Duration::days(1);
        let sig = signature(&config.version, hash.clone(), signed_at);
        assert!(validate_integrity(&sig, &hash, &config, Utc::now()).is_ok());
    }
}
