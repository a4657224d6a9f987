//! Server-side access decision endpoint
//!
//! The routing layer in front of protected documents asks this endpoint
//! before serving anything gated. The decision is recomputed on every
//! call; client-side "already signed" hints are never authoritative.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use dealroom_core::{decide, AccessDecision, DenyReason, Phase};

use crate::auth::{resolve_role, Identity};
use crate::error::PortalError;
use crate::retry::with_retry;
use crate::state::AppState;
use crate::store::{RoleStore, SignatureStore};

#[derive(Deserialize)]
pub struct AccessQuery {
    pub phase: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub allowed: bool,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

/// GET /api/nda/access?phase=p3
pub async fn check_access<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    identity: Identity,
    Query(query): Query<AccessQuery>,
) -> Result<Json<AccessResponse>, PortalError>
where
    S: SignatureStore,
    R: RoleStore,
{
    let role = resolve_role(state.roles.as_ref(), &identity.user_id)?;
    let phase = Phase::from_tag(query.phase.as_deref().unwrap_or_default());

    let signature = with_retry(&state.retry, || {
        state
            .signatures
            .get_by_user(&identity.user_id, identity.email.as_deref())
    })
    .await?;

    let signer = identity.signer();
    let (_, current_hash) = state.personalized_agreement(Some(&signer));

    let decision = decide(
        role,
        signature.as_ref(),
        &current_hash,
        phase,
        &state.agreement,
        Utc::now(),
    );

    let reason = match decision {
        AccessDecision::Allow => None,
        AccessDecision::Deny(reason) => Some(reason),
    };

    Ok(Json(AccessResponse {
        allowed: decision.is_allowed(),
        phase,
        reason,
    }))
}
