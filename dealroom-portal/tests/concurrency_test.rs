//! Concurrency tests for the signature store's upsert discipline

use std::sync::Arc;

use dealroom_core::document_hash;
use dealroom_portal::{InMemorySignatureStore, PortalError, SignatureDraft, SignatureStore};

fn draft(user_id: &str, version: &str) -> SignatureDraft {
    SignatureDraft {
        user_id: user_id.to_string(),
        user_email: Some(format!("{user_id}@example.com")),
        user_name: Some("Test User".to_string()),
        signature_data: "aGVsbG8=".to_string(),
        nda_version: version.to_string(),
        document_hash: document_hash("agreement"),
    }
}

#[tokio::test]
async fn test_concurrent_upserts_leave_exactly_one_record() {
    let store = Arc::new(InMemorySignatureStore::new());

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.store(draft("user-1", &format!("1.{i}")), false)
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        let signature = handle.await.unwrap().unwrap();
        ids.push(signature.id);
    }

    // Every call observed the same record id
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    let all = store.list_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, ids[0]);
}

#[tokio::test]
async fn test_concurrent_create_only_admits_exactly_one() {
    let store = Arc::new(InMemorySignatureStore::new());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(
            async move { store.store(draft("user-1", "1.0"), true) },
        ));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(PortalError::AlreadyExists) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 15);
    assert_eq!(store.list_all().unwrap().len(), 1);
}
