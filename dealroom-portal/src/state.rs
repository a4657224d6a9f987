//! Portal application state
//!
//! Constructed explicitly and injected into handlers; there is no
//! module-level singleton and no implicit initialization on import.

use std::sync::Arc;

use dealroom_core::{document_hash, render_agreement, AgreementConfig, DocumentHash, Signer};

use crate::audit::AuditLog;
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;
use crate::store::{RoleStore, SignatureStore};

pub struct AppState<S, R> {
    pub agreement: AgreementConfig,
    pub signatures: Arc<S>,
    pub roles: Arc<R>,
    pub rate_limiter: RateLimiter,
    pub audit: AuditLog,
    pub retry: RetryPolicy,
}

impl<S, R> AppState<S, R>
where
    S: SignatureStore,
    R: RoleStore,
{
    pub fn new(
        agreement: AgreementConfig,
        rate_limiter: RateLimiter,
        signatures: Arc<S>,
        roles: Arc<R>,
    ) -> Self {
        Self {
            agreement,
            signatures,
            roles,
            rate_limiter,
            audit: AuditLog::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Render the agreement as this signer sees it and hash that exact
    /// text. Signing and every later integrity check go through here so
    /// the hash is always computed over identical bytes.
    pub fn personalized_agreement(&self, signer: Option<&Signer>) -> (String, DocumentHash) {
        let content = render_agreement(&self.agreement, signer);
        let hash = document_hash(&content);
        (content, hash)
    }
}
