//! Common test utilities for portal integration tests

use std::sync::Arc;

use axum_test::{TestRequest, TestServer};
use chrono::Duration;
use dealroom_core::AgreementConfig;
use dealroom_portal::{
    routes, AppState, InMemoryRoleStore, InMemorySignatureStore, RateLimiter, RoleStore,
};
use serde_json::{json, Value};

/// A 1x1 transparent PNG; stands in for a drawn signature
pub const SIGNATURE_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

pub struct TestPortal {
    pub server: TestServer,
    pub signatures: Arc<InMemorySignatureStore>,
    pub roles: Arc<InMemoryRoleStore>,
}

/// Create a test server with seeded role assignments
pub fn create_test_portal() -> TestPortal {
    let signatures = Arc::new(InMemorySignatureStore::new());
    let roles = Arc::new(InMemoryRoleStore::new());
    roles.assign("admin-1", "admin").unwrap();
    roles.assign("buyer-1", "buyer").unwrap();
    roles.assign("lawyer-1", "lawyer").unwrap();
    roles.assign("viewer-1", "viewer").unwrap();
    // Unrecognized on purpose; must be rejected, not defaulted
    roles.assign("intruder-1", "superuser").unwrap();

    let state = Arc::new(AppState::new(
        AgreementConfig::default(),
        RateLimiter::new(5, Duration::hours(1)),
        signatures.clone(),
        roles.clone(),
    ));

    let server =
        TestServer::new(routes::create_router(state)).expect("Failed to create test server");

    TestPortal {
        server,
        signatures,
        roles,
    }
}

/// Attach the identity headers the external auth layer would inject
pub fn as_user(request: TestRequest, user_id: &str, email: &str, name: &str) -> TestRequest {
    request
        .add_header("x-auth-user", user_id)
        .add_header("x-auth-email", email)
        .add_header("x-auth-name", name)
}

/// Fetch the agreement personalized for a user and return its hash
pub async fn agreement_hash(server: &TestServer, user_id: &str, email: &str, name: &str) -> String {
    let response = as_user(server.get("/api/nda/agreement"), user_id, email, name).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    body["hash"].as_str().expect("agreement hash").to_string()
}

/// Helper to sign the NDA as a user, asserting success
pub async fn sign_nda(server: &TestServer, user_id: &str, email: &str, name: &str) -> String {
    let hash = agreement_hash(server, user_id, email, name).await;
    let response = as_user(server.post("/api/nda/sign"), user_id, email, name)
        .json(&json!({
            "signatureData": SIGNATURE_PNG,
            "agreedToTerms": true,
            "understoodBinding": true,
            "documentHash": hash,
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    body["signatureId"].as_str().expect("signature id").to_string()
}
