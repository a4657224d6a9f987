//! Error types for dealroom-core

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown phase: {0}")]
    UnknownPhase(String),

    #[error("Invalid signature data: {0}")]
    InvalidSignatureData(String),

    #[error("Agreement version mismatch: signed {signed}, current {current}")]
    VersionMismatch { signed: String, current: String },

    #[error("Signature does not match the current agreement text")]
    IntegrityFailure,

    #[error("Signature expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
}
