//! Storage abstractions for the portal

pub mod memory;
pub mod sqlite;

pub use memory::{InMemoryRoleStore, InMemorySignatureStore};
pub use sqlite::SqliteStore;

use dealroom_core::{DocumentHash, NdaSignature};

use crate::error::PortalError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, PortalError>;

/// A signature as submitted, before the store settles the record id
#[derive(Debug, Clone)]
pub struct SignatureDraft {
    pub user_id: String,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub signature_data: String,
    pub nda_version: String,
    pub document_hash: DocumentHash,
}

/// Trait for signature storage
///
/// Implementations must keep at most one record per user and must make
/// the check-then-write in [`SignatureStore::store`] atomic with respect
/// to concurrent upserts for the same user.
pub trait SignatureStore: Send + Sync {
    /// Upsert keyed by user identity. With `create_only`, an existing
    /// record fails with `AlreadyExists`; otherwise the existing record
    /// is merged in place and its id preserved.
    fn store(&self, draft: SignatureDraft, create_only: bool) -> StoreResult<NdaSignature>;

    /// Get a signature by record id
    fn get_by_id(&self, id: &str) -> StoreResult<Option<NdaSignature>>;

    /// Get a signature by user id, falling back to an email match.
    /// The fallback reconciles identities across auth-provider
    /// migrations; it is a compatibility shim, not a lookup key.
    fn get_by_user(&self, user_id: &str, email: Option<&str>)
        -> StoreResult<Option<NdaSignature>>;

    /// Whether a signature exists for the user id
    fn has_signed(&self, user_id: &str) -> StoreResult<bool>;

    /// List every stored signature (admin path only)
    fn list_all(&self) -> StoreResult<Vec<NdaSignature>>;

    /// Delete by record id, returning the removed record
    fn delete(&self, id: &str) -> StoreResult<NdaSignature>;
}

/// Trait for user-to-role assignments
///
/// Assignments are stored as the raw values the identity provider
/// reports; parsing into the closed role set happens at the request
/// boundary so unknown values are rejected in exactly one place.
pub trait RoleStore: Send + Sync {
    fn assign(&self, user_id: &str, role: &str) -> StoreResult<()>;

    fn role_for(&self, user_id: &str) -> StoreResult<Option<String>>;
}
