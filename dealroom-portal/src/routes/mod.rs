//! HTTP routes for the portal

mod access;
mod admin;
mod agreement;
mod sign;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::store::{RoleStore, SignatureStore};

/// Create the router with all routes
pub fn create_router<S, R>(state: Arc<AppState<S, R>>) -> Router
where
    S: SignatureStore + 'static,
    R: RoleStore + 'static,
{
    Router::new()
        .route("/api/nda/agreement", get(agreement::get_agreement))
        .route("/api/nda/status", get(sign::get_status))
        .route("/api/nda/sign", post(sign::sign))
        .route("/api/nda/access", get(access::check_access))
        .route("/api/nda/admin/validate", post(admin::validate_signature))
        .route("/api/nda/admin/signatures", get(admin::list_signatures))
        .route("/api/nda/admin/signatures/{id}", delete(admin::delete_signature))
        .route("/api/nda/admin/statistics", get(admin::statistics))
        .route("/api/nda/admin/audit-log", get(admin::audit_log))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
