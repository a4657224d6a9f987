//! Signing and status endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use dealroom_core::{validate_signature_data, DocumentHash, NdaStatus, Role};

use crate::auth::{resolve_role, Identity};
use crate::error::PortalError;
use crate::retry::with_retry;
use crate::state::AppState;
use crate::store::{RoleStore, SignatureDraft, SignatureStore};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: NdaStatus,
    pub role: Role,
}

/// GET /api/nda/status
pub async fn get_status<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    identity: Identity,
) -> Result<Json<StatusResponse>, PortalError>
where
    S: SignatureStore,
    R: RoleStore,
{
    let role = resolve_role(state.roles.as_ref(), &identity.user_id)?;

    let status = if state.agreement.is_exempt(role) {
        NdaStatus::exempt()
    } else {
        let signature = with_retry(&state.retry, || {
            state
                .signatures
                .get_by_user(&identity.user_id, identity.email.as_deref())
        })
        .await?;
        NdaStatus::from_signature(signature.as_ref())
    };

    Ok(Json(StatusResponse { status, role }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub signature_data: String,
    pub agreed_to_terms: bool,
    pub understood_binding: bool,
    pub document_hash: DocumentHash,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub success: bool,
    pub signature_id: String,
    pub message: String,
}

/// POST /api/nda/sign
///
/// Records a signature exactly once per user. The server recomputes the
/// current agreement hash and rejects stale or tampered submissions; the
/// client-supplied hash is never trusted on its own.
pub async fn sign<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    identity: Identity,
    Json(req): Json<SignRequest>,
) -> Result<Json<SignResponse>, PortalError>
where
    S: SignatureStore,
    R: RoleStore,
{
    let role = resolve_role(state.roles.as_ref(), &identity.user_id)?;

    // Exempt roles never sign; they already have access
    if state.agreement.is_exempt(role) {
        return Err(PortalError::Forbidden);
    }

    // Every submission counts as an attempt, valid or not
    state.rate_limiter.check(&identity.user_id)?;

    if !req.agreed_to_terms || !req.understood_binding {
        return Err(PortalError::InvalidInput(
            "Both consent confirmations are required".to_string(),
        ));
    }
    validate_signature_data(&req.signature_data)?;

    let signer = identity.signer();
    let (_, current_hash) = state.personalized_agreement(Some(&signer));
    if req.document_hash != current_hash {
        return Err(PortalError::DocumentHashMismatch);
    }

    // Same lookup the status endpoint uses, email fallback included: an
    // identity carried over from a previous auth provider is still signed
    // and cannot create a second record
    let existing = with_retry(&state.retry, || {
        state
            .signatures
            .get_by_user(&identity.user_id, identity.email.as_deref())
    })
    .await?;
    if existing.is_some() {
        return Err(PortalError::AlreadySigned);
    }

    let draft = SignatureDraft {
        user_id: identity.user_id.clone(),
        user_email: identity.email.clone(),
        user_name: identity.name.clone(),
        signature_data: req.signature_data.clone(),
        nda_version: state.agreement.version.clone(),
        document_hash: current_hash,
    };

    // create_only backstops the has_signed check: two racing requests
    // cannot both insert
    let signature = with_retry(&state.retry, || {
        state.signatures.store(draft.clone(), true)
    })
    .await
    .map_err(|e| match e {
        PortalError::AlreadyExists => PortalError::AlreadySigned,
        other => other,
    })?;

    tracing::info!(signature_id = %signature.id, "NDA signed");

    Ok(Json(SignResponse {
        success: true,
        signature_id: signature.id,
        message: "NDA signed successfully".to_string(),
    }))
}
