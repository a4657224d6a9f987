//! Dealroom Core Library
//!
//! Pure rules for the NDA workflow that gates a due-diligence data room:
//! - Agreements are rendered per signer and hashed for integrity
//! - Signatures are checked against the agreement version, hash and age
//! - Access decisions combine role, signature state and document phase

pub mod agreement;
pub mod error;
pub mod gate;
pub mod hash;
pub mod role;
pub mod signature;

pub use agreement::{render_agreement, AgreementConfig, Signer};
pub use error::Error;
pub use gate::{decide, AccessDecision, DenyReason, Phase};
pub use hash::{document_hash, DocumentHash};
pub use role::Role;
pub use signature::{
    validate_integrity, validate_signature_data, NdaSignature, NdaStatus,
};

/// Result type for dealroom-core operations
pub type Result<T> = std::result::Result<T, Error>;
