//! Rate limiting across the signing endpoint

mod common;

use common::{as_user, create_test_portal, SIGNATURE_PNG};
use serde_json::{json, Value};

#[tokio::test]
async fn test_sixth_signing_attempt_is_rate_limited() {
    let portal = create_test_portal();

    // Five invalid attempts all count against the window
    for _ in 0..5 {
        let response = as_user(
            portal.server.post("/api/nda/sign"),
            "buyer-1",
            "buyer@example.com",
            "Buyer One",
        )
        .json(&json!({
            "signatureData": SIGNATURE_PNG,
            "agreedToTerms": false,
            "understoodBinding": false,
            "documentHash": "0".repeat(64),
        }))
        .await;
        assert_eq!(response.status_code(), 400);
    }

    let response = as_user(
        portal.server.post("/api/nda/sign"),
        "buyer-1",
        "buyer@example.com",
        "Buyer One",
    )
    .json(&json!({
        "signatureData": SIGNATURE_PNG,
        "agreedToTerms": true,
        "understoodBinding": true,
        "documentHash": "0".repeat(64),
    }))
    .await;
    assert_eq!(response.status_code(), 429);
    let body: Value = response.json();
    assert!(body["resetAt"].is_string());
}

#[tokio::test]
async fn test_rate_limit_is_per_user() {
    let portal = create_test_portal();

    for _ in 0..5 {
        as_user(
            portal.server.post("/api/nda/sign"),
            "buyer-1",
            "buyer@example.com",
            "Buyer One",
        )
        .json(&json!({
            "signatureData": SIGNATURE_PNG,
            "agreedToTerms": false,
            "understoodBinding": false,
            "documentHash": "0".repeat(64),
        }))
        .await;
    }

    // A different user is unaffected
    let hash = common::agreement_hash(
        &portal.server,
        "lawyer-1",
        "lawyer@example.com",
        "Lawyer One",
    )
    .await;
    let response = as_user(
        portal.server.post("/api/nda/sign"),
        "lawyer-1",
        "lawyer@example.com",
        "Lawyer One",
    )
    .json(&json!({
        "signatureData": SIGNATURE_PNG,
        "agreedToTerms": true,
        "understoodBinding": true,
        "documentHash": hash,
    }))
    .await;
    assert_eq!(response.status_code(), 200);
}
