//! Admin endpoints
//!
//! Every handler re-verifies the caller's role against the role store
//! before touching anything, and everything returned here is sanitized:
//! no email, name, raw signature bytes or full-length hashes leave the
//! admin path.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dealroom_core::{validate_integrity, DocumentHash, NdaSignature, Role, Signer};

use crate::audit::{AuditAction, AuditEntry};
use crate::auth::{require_admin, resolve_role, Identity};
use crate::error::PortalError;
use crate::retry::with_retry;
use crate::state::AppState;
use crate::store::{RoleStore, SignatureStore};

/// How many signatures the statistics view lists as recent
const RECENT_LIMIT: usize = 10;

/// Signature view with identifying fields stripped
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedSignature {
    pub id: String,
    pub role: String,
    pub version: String,
    pub signed_at: DateTime<Utc>,
    pub document_hash_prefix: String,
}

fn sanitize<R: RoleStore>(signature: &NdaSignature, roles: &R) -> SanitizedSignature {
    let role = roles
        .role_for(&signature.user_id)
        .ok()
        .flatten()
        .and_then(|raw| raw.parse::<Role>().ok())
        .map(|r| r.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    SanitizedSignature {
        id: signature.id.clone(),
        role,
        version: signature.nda_version.clone(),
        signed_at: signature.signed_at,
        document_hash_prefix: signature.document_hash.prefix().to_string(),
    }
}

fn admin_caller<S, R>(state: &AppState<S, R>, identity: &Identity) -> Result<(), PortalError>
where
    S: SignatureStore,
    R: RoleStore,
{
    let role = resolve_role(state.roles.as_ref(), &identity.user_id)?;
    require_admin(role)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSignaturesResponse {
    pub success: bool,
    pub count: usize,
    pub signatures: Vec<SanitizedSignature>,
}

/// GET /api/nda/admin/signatures
pub async fn list_signatures<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    identity: Identity,
) -> Result<Json<ListSignaturesResponse>, PortalError>
where
    S: SignatureStore,
    R: RoleStore,
{
    admin_caller(&state, &identity)?;
    state
        .audit
        .append(&identity.user_id, AuditAction::ListAllSignatures, None);

    let signatures = with_retry(&state.retry, || state.signatures.list_all()).await?;
    let sanitized: Vec<_> = signatures
        .iter()
        .map(|s| sanitize(s, state.roles.as_ref()))
        .collect();

    Ok(Json(ListSignaturesResponse {
        success: true,
        count: sanitized.len(),
        signatures: sanitized,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted: SanitizedSignature,
}

/// DELETE /api/nda/admin/signatures/{id}
pub async fn delete_signature<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, PortalError>
where
    S: SignatureStore,
    R: RoleStore,
{
    admin_caller(&state, &identity)?;

    let deleted = with_retry(&state.retry, || state.signatures.delete(&id)).await?;
    // Appended before success leaves the handler
    state
        .audit
        .append(&identity.user_id, AuditAction::DeleteSignature, Some(&id));
    tracing::info!(signature_id = %id, actor = %identity.user_id, "Signature deleted");

    Ok(Json(DeleteResponse {
        success: true,
        deleted: sanitize(&deleted, state.roles.as_ref()),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub signature_id: String,
    pub document_hash: DocumentHash,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SanitizedSignature>,
}

/// POST /api/nda/admin/validate
///
/// Re-hashes the current agreement text for the signer on record and
/// checks the stored signature against it. The supplied hash must match
/// the re-hash, so a stale client cannot "validate" against old text.
pub async fn validate_signature<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    identity: Identity,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, PortalError>
where
    S: SignatureStore,
    R: RoleStore,
{
    admin_caller(&state, &identity)?;

    let signature = with_retry(&state.retry, || {
        state.signatures.get_by_id(&req.signature_id)
    })
    .await?
    .ok_or(PortalError::NotFound)?;

    let signer = Signer::from_identity(
        signature.user_name.as_deref(),
        signature.user_email.as_deref(),
    );
    let (_, current_hash) = state.personalized_agreement(Some(&signer));

    if req.document_hash != current_hash {
        return Ok(Json(ValidateResponse {
            valid: false,
            error: Some("Supplied hash does not match the current agreement text".to_string()),
            signature: None,
        }));
    }

    match validate_integrity(&signature, &current_hash, &state.agreement, Utc::now()) {
        Ok(()) => Ok(Json(ValidateResponse {
            valid: true,
            error: None,
            signature: Some(sanitize(&signature, state.roles.as_ref())),
        })),
        Err(err) => Ok(Json(ValidateResponse {
            valid: false,
            error: Some(err.to_string()),
            signature: Some(sanitize(&signature, state.roles.as_ref())),
        })),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_signatures: usize,
    pub by_version: BTreeMap<String, usize>,
    pub by_role: BTreeMap<String, usize>,
    pub recent_signatures: Vec<SanitizedSignature>,
}

/// GET /api/nda/admin/statistics
pub async fn statistics<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    identity: Identity,
) -> Result<Json<StatisticsResponse>, PortalError>
where
    S: SignatureStore,
    R: RoleStore,
{
    admin_caller(&state, &identity)?;

    let mut signatures = with_retry(&state.retry, || state.signatures.list_all()).await?;
    signatures.sort_by(|a, b| b.signed_at.cmp(&a.signed_at));

    let mut by_version: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_role: BTreeMap<String, usize> = BTreeMap::new();
    for signature in &signatures {
        *by_version.entry(signature.nda_version.clone()).or_default() += 1;
        let role = sanitize(signature, state.roles.as_ref()).role;
        *by_role.entry(role).or_default() += 1;
    }

    let recent_signatures = signatures
        .iter()
        .take(RECENT_LIMIT)
        .map(|s| sanitize(s, state.roles.as_ref()))
        .collect();

    Ok(Json(StatisticsResponse {
        total_signatures: signatures.len(),
        by_version,
        by_role,
        recent_signatures,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub success: bool,
    pub entries: Vec<AuditEntry>,
}

/// GET /api/nda/admin/audit-log
pub async fn audit_log<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    identity: Identity,
) -> Result<Json<AuditLogResponse>, PortalError>
where
    S: SignatureStore,
    R: RoleStore,
{
    admin_caller(&state, &identity)?;

    Ok(Json(AuditLogResponse {
        success: true,
        entries: state.audit.entries(),
    }))
}
