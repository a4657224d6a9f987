//! Tests for the SQLite storage backend

use dealroom_core::document_hash;
use dealroom_portal::{PortalError, RoleStore, SignatureDraft, SignatureStore, SqliteStore};

fn open_store(dir: &tempfile::TempDir) -> SqliteStore {
    let path = dir.path().join("portal.db");
    SqliteStore::open(path.to_str().unwrap()).unwrap()
}

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

#[test]
fn test_store_and_lookup_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let created = store.store(draft("user-1", "1.0"), false).unwrap();
    assert!(store.has_signed("user-1").unwrap());

    let by_id = store.get_by_id(&created.id).unwrap().unwrap();
    assert_eq!(by_id.user_id, "user-1");
    assert_eq!(by_id.nda_version, "1.0");
    assert_eq!(by_id.document_hash, document_hash("agreement"));

    let by_user = store.get_by_user("user-1", None).unwrap().unwrap();
    assert_eq!(by_user.id, created.id);
}

#[test]
fn test_upsert_preserves_id_and_keeps_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let created = store.store(draft("user-1", "1.0"), false).unwrap();
    let updated = store.store(draft("user-1", "2.0"), false).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.nda_version, "2.0");
    assert_eq!(store.list_all().unwrap().len(), 1);
}

#[test]
fn test_create_only_hits_unique_constraint() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.store(draft("user-1", "1.0"), true).unwrap();
    assert!(matches!(
        store.store(draft("user-1", "1.0"), true),
        Err(PortalError::AlreadyExists)
    ));
}

#[test]
fn test_email_fallback_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.store(draft("old-id", "1.0"), false).unwrap();

    let found = store
        .get_by_user("new-id", Some("OLD-ID@example.com"))
        .unwrap();
    assert!(found.is_some());
    assert!(store.get_by_user("new-id", None).unwrap().is_none());
}

#[test]
fn test_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let created = store.store(draft("user-1", "1.0"), false).unwrap();
    let deleted = store.delete(&created.id).unwrap();
    assert_eq!(deleted.id, created.id);
    assert!(!store.has_signed("user-1").unwrap());
    assert!(matches!(
        store.delete(&created.id),
        Err(PortalError::NotFound)
    ));
}

#[test]
fn test_corrupt_signed_at_surfaces_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal.db");
    {
        let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
        store.store(draft("user-1", "1.0"), false).unwrap();
    }

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute("UPDATE signatures SET signed_at = 'garbage'", [])
        .unwrap();
    drop(conn);

    // The corrupt row must error out, not read back with a fresh timestamp
    let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
    assert!(matches!(
        store.get_by_user("user-1", None),
        Err(PortalError::StorageUnavailable(_))
    ));
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let created = {
        let store = open_store(&dir);
        store.store(draft("user-1", "1.0"), false).unwrap()
    };

    let store = open_store(&dir);
    let found = store.get_by_id(&created.id).unwrap().unwrap();
    assert_eq!(found.user_id, "user-1");
}

#[test]
fn test_role_assignments() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    assert_eq!(store.role_for("user-1").unwrap(), None);
    store.assign("user-1", "buyer").unwrap();
    assert_eq!(store.role_for("user-1").unwrap().as_deref(), Some("buyer"));
    store.assign("user-1", "lawyer").unwrap();
    assert_eq!(store.role_for("user-1").unwrap().as_deref(), Some("lawyer"));
}
