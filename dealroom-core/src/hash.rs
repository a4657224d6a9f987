//! Document content hashing
//!
//! A signature is only meaningful against the exact agreement text the
//! signer saw, so the rendered text is hashed and the digest travels with
//! the signature record.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters exposed in sanitized views
const PREFIX_LEN: usize = 12;

/// Hex-encoded SHA-256 digest of agreement content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentHash(String);

impl DocumentHash {
    /// Wrap an already-computed hex digest, e.g. read back from storage
    pub fn from_hex(digest: impl Into<String>) -> Self {
        DocumentHash(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated digest for sanitized/exported views
    pub fn prefix(&self) -> &str {
        &self.0[..PREFIX_LEN.min(self.0.len())]
    }
}

impl std::fmt::Display for DocumentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash the exact bytes of a rendered agreement
pub fn document_hash(content: &str) -> DocumentHash {
    let digest = Sha256::digest(content.as_bytes());
    DocumentHash(hex::encode(digest))
}
