//! In-memory storage implementations

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use uuid::Uuid;

use dealroom_core::NdaSignature;

use super::{RoleStore, SignatureDraft, SignatureStore, StoreResult};
use crate::error::PortalError;

/// In-memory signature store
///
/// One mutex covers the whole map so the check-then-write in `store`
/// cannot interleave with another upsert for the same user. This
/// serializes within a single process only; multi-instance deployments
/// need the SQLite backend's unique-constraint upsert.
pub struct InMemorySignatureStore {
    signatures: Mutex<HashMap<String, NdaSignature>>,
}

impl InMemorySignatureStore {
    pub fn new() -> Self {
        Self {
            signatures: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySignatureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureStore for InMemorySignatureStore {
    fn store(&self, draft: SignatureDraft, create_only: bool) -> StoreResult<NdaSignature> {
        let mut signatures = self.signatures.lock().unwrap();
        match signatures.get_mut(&draft.user_id) {
            Some(_) if create_only => Err(PortalError::AlreadyExists),
            Some(existing) => {
                existing.user_email = draft.user_email;
                existing.user_name = draft.user_name;
                existing.signature_data = draft.signature_data;
                existing.nda_version = draft.nda_version;
                existing.document_hash = draft.document_hash;
                existing.signed_at = Utc::now();
                Ok(existing.clone())
            }
            None => {
                let signature = NdaSignature {
                    id: Uuid::new_v4().to_string(),
                    user_id: draft.user_id.clone(),
                    user_email: draft.user_email,
                    user_name: draft.user_name,
                    signature_data: draft.signature_data,
                    signed_at: Utc::now(),
                    nda_version: draft.nda_version,
                    document_hash: draft.document_hash,
                };
                signatures.insert(draft.user_id, signature.clone());
                Ok(signature)
            }
        }
    }

    fn get_by_id(&self, id: &str) -> StoreResult<Option<NdaSignature>> {
        let signatures = self.signatures.lock().unwrap();
        Ok(signatures.values().find(|s| s.id == id).cloned())
    }

    fn get_by_user(
        &self,
        user_id: &str,
        email: Option<&str>,
    ) -> StoreResult<Option<NdaSignature>> {
        let signatures = self.signatures.lock().unwrap();
        if let Some(signature) = signatures.get(user_id) {
            return Ok(Some(signature.clone()));
        }
        if let Some(email) = email {
            let normalized = email.to_lowercase();
            return Ok(signatures
                .values()
                .find(|s| {
                    s.user_email
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase() == normalized)
                })
                .cloned());
        }
        Ok(None)
    }

    fn has_signed(&self, user_id: &str) -> StoreResult<bool> {
        Ok(self.signatures.lock().unwrap().contains_key(user_id))
    }

    fn list_all(&self) -> StoreResult<Vec<NdaSignature>> {
        Ok(self.signatures.lock().unwrap().values().cloned().collect())
    }

    fn delete(&self, id: &str) -> StoreResult<NdaSignature> {
        let mut signatures = self.signatures.lock().unwrap();
        let user_id = signatures
            .values()
            .find(|s| s.id == id)
            .map(|s| s.user_id.clone())
            .ok_or(PortalError::NotFound)?;
        signatures.remove(&user_id).ok_or(PortalError::NotFound)
    }
}

/// In-memory role store
pub struct InMemoryRoleStore {
    roles: RwLock<HashMap<String, String>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRoleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleStore for InMemoryRoleStore {
    fn assign(&self, user_id: &str, role: &str) -> StoreResult<()> {
        self.roles
            .write()
            .unwrap()
            .insert(user_id.to_string(), role.to_string());
        Ok(())
    }

    fn role_for(&self, user_id: &str) -> StoreResult<Option<String>> {
        Ok(self.roles.read().unwrap().get(user_id).cloned())
    }
}
