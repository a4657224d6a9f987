//! Agreement retrieval endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use dealroom_core::DocumentHash;

use crate::auth::{resolve_role, MaybeIdentity};
use crate::error::PortalError;
use crate::state::AppState;
use crate::store::{RoleStore, SignatureStore};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementResponse {
    pub content: String,
    pub hash: DocumentHash,
    pub version: String,
    pub effective_date: String,
    pub user_info: UserInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub role: String,
}

/// GET /api/nda/agreement
///
/// Returns the agreement text personalized for the caller, along with
/// the hash of exactly that text. Unauthenticated callers get the
/// generic rendering.
pub async fn get_agreement<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    MaybeIdentity(identity): MaybeIdentity,
) -> Result<Json<AgreementResponse>, PortalError>
where
    S: SignatureStore,
    R: RoleStore,
{
    let (signer, role) = match &identity {
        Some(identity) => {
            // Role is informational here; the agreement itself is public
            let role = match resolve_role(state.roles.as_ref(), &identity.user_id) {
                Ok(role) => role.to_string(),
                Err(_) => "guest".to_string(),
            };
            (Some(identity.signer()), role)
        }
        None => (None, "guest".to_string()),
    };

    let (content, hash) = state.personalized_agreement(signer.as_ref());
    let (name, email) = match &signer {
        Some(s) => (s.name.clone(), s.email.clone()),
        None => (String::new(), String::new()),
    };

    Ok(Json(AgreementResponse {
        content,
        hash,
        version: state.agreement.version.clone(),
        effective_date: state.agreement.effective_date.clone(),
        user_info: UserInfo { name, email, role },
    }))
}
