//! Dealroom NDA Portal
//!
//! HTTP service gating a single transaction's document room behind an
//! NDA signing workflow. Identity arrives from an external auth layer;
//! this service owns signature records, integrity checks, rate limiting
//! and per-request access decisions.

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod retry;
pub mod routes;
pub mod state;
pub mod store;

pub use audit::{AuditAction, AuditEntry, AuditLog};
pub use auth::{Identity, MaybeIdentity};
pub use config::Config;
pub use error::PortalError;
pub use rate_limit::RateLimiter;
pub use retry::{with_retry, RetryPolicy};
pub use state::AppState;
pub use store::{
    InMemoryRoleStore, InMemorySignatureStore, RoleStore, SignatureDraft, SignatureStore,
    SqliteStore,
};
