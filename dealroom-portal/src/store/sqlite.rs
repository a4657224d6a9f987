//! SQLite-based storage implementation
//!
//! The unique constraint on `user_id` plus a conflict-clause upsert make
//! the at-most-one-signature invariant hold across processes, not just
//! behind this instance's connection mutex.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use dealroom_core::{DocumentHash, NdaSignature};

use super::{RoleStore, SignatureDraft, SignatureStore, StoreResult};
use crate::error::PortalError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQLite-based store implementing both SignatureStore and RoleStore
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, PortalError> {
        let conn = Connection::open(path).map_err(storage_err)?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(storage_err)?;

        Self::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), PortalError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(storage_err)?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, PortalError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(storage_err)?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(storage_err)
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), PortalError> {
        conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Signatures: at most one per user, enforced by the database
            CREATE TABLE IF NOT EXISTS signatures (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL UNIQUE,
                user_email TEXT,
                user_name TEXT,
                signature_data TEXT NOT NULL,
                signed_at TEXT NOT NULL,
                nda_version TEXT NOT NULL,
                document_hash TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_signatures_email ON signatures(user_email);

            -- User-to-role assignments
            CREATE TABLE IF NOT EXISTS roles (
                user_id TEXT PRIMARY KEY,
                role TEXT NOT NULL
            );
            "#,
        )
        .map_err(storage_err)?;

        Ok(())
    }

    fn select_by_user_id(
        conn: &Connection,
        user_id: &str,
    ) -> Result<Option<NdaSignature>, PortalError> {
        conn.query_row(
            "SELECT id, user_id, user_email, user_name, signature_data, signed_at, nda_version, document_hash
             FROM signatures WHERE user_id = ?1",
            params![user_id],
            row_to_signature,
        )
        .optional()
        .map_err(storage_err)
    }
}

fn storage_err(e: rusqlite::Error) -> PortalError {
    PortalError::StorageUnavailable(e.to_string())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn row_to_signature(row: &Row<'_>) -> rusqlite::Result<NdaSignature> {
    let signed_at: String = row.get(5)?;
    Ok(NdaSignature {
        id: row.get(0)?,
        user_id: row.get(1)?,
        user_email: row.get(2)?,
        user_name: row.get(3)?,
        signature_data: row.get(4)?,
        // A corrupt timestamp must not silently reset the expiry clock
        signed_at: DateTime::parse_from_rfc3339(&signed_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
            })?,
        nda_version: row.get(6)?,
        document_hash: DocumentHash::from_hex(row.get::<_, String>(7)?),
    })
}

impl SignatureStore for SqliteStore {
    fn store(&self, draft: SignatureDraft, create_only: bool) -> StoreResult<NdaSignature> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let result = if create_only {
            conn.execute(
                "INSERT INTO signatures (id, user_id, user_email, user_name, signature_data, signed_at, nda_version, document_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id,
                    draft.user_id,
                    draft.user_email,
                    draft.user_name,
                    draft.signature_data,
                    now,
                    draft.nda_version,
                    draft.document_hash.as_str(),
                ],
            )
        } else {
            // Atomic upsert: a conflicting row keeps its id and gets the
            // mutable fields replaced in one statement
            conn.execute(
                "INSERT INTO signatures (id, user_id, user_email, user_name, signature_data, signed_at, nda_version, document_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(user_id) DO UPDATE SET
                     user_email = excluded.user_email,
                     user_name = excluded.user_name,
                     signature_data = excluded.signature_data,
                     signed_at = excluded.signed_at,
                     nda_version = excluded.nda_version,
                     document_hash = excluded.document_hash",
                params![
                    id,
                    draft.user_id,
                    draft.user_email,
                    draft.user_name,
                    draft.signature_data,
                    now,
                    draft.nda_version,
                    draft.document_hash.as_str(),
                ],
            )
        };

        match result {
            Ok(_) => {}
            Err(e) if create_only && is_unique_violation(&e) => {
                return Err(PortalError::AlreadyExists);
            }
            Err(e) => return Err(storage_err(e)),
        }

        Self::select_by_user_id(&conn, &draft.user_id)?.ok_or_else(|| {
            PortalError::StorageUnavailable("upserted signature not readable".to_string())
        })
    }

    fn get_by_id(&self, id: &str) -> StoreResult<Option<NdaSignature>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, user_id, user_email, user_name, signature_data, signed_at, nda_version, document_hash
             FROM signatures WHERE id = ?1",
            params![id],
            row_to_signature,
        )
        .optional()
        .map_err(storage_err)
    }

    fn get_by_user(
        &self,
        user_id: &str,
        email: Option<&str>,
    ) -> StoreResult<Option<NdaSignature>> {
        let conn = self.conn.lock().unwrap();
        if let Some(found) = Self::select_by_user_id(&conn, user_id)? {
            return Ok(Some(found));
        }
        let Some(email) = email else {
            return Ok(None);
        };
        conn.query_row(
            "SELECT id, user_id, user_email, user_name, signature_data, signed_at, nda_version, document_hash
             FROM signatures WHERE LOWER(user_email) = LOWER(?1)",
            params![email],
            row_to_signature,
        )
        .optional()
        .map_err(storage_err)
    }

    fn has_signed(&self, user_id: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM signatures WHERE user_id = ?1)",
            params![user_id],
            |row| row.get(0),
        )
        .map_err(storage_err)
    }

    fn list_all(&self) -> StoreResult<Vec<NdaSignature>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, user_email, user_name, signature_data, signed_at, nda_version, document_hash
                 FROM signatures ORDER BY signed_at DESC",
            )
            .map_err(storage_err)?;
        let rows = stmt
            .query_map([], row_to_signature)
            .map_err(storage_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_err)?;
        Ok(rows)
    }

    fn delete(&self, id: &str) -> StoreResult<NdaSignature> {
        let conn = self.conn.lock().unwrap();
        let signature = conn
            .query_row(
                "SELECT id, user_id, user_email, user_name, signature_data, signed_at, nda_version, document_hash
                 FROM signatures WHERE id = ?1",
                params![id],
                row_to_signature,
            )
            .optional()
            .map_err(storage_err)?
            .ok_or(PortalError::NotFound)?;

        conn.execute("DELETE FROM signatures WHERE id = ?1", params![id])
            .map_err(storage_err)?;
        Ok(signature)
    }
}

impl RoleStore for SqliteStore {
    fn assign(&self, user_id: &str, role: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO roles (user_id, role) VALUES (?1, ?2)",
            params![user_id, role],
        )
        .map_err(storage_err)?;
        Ok(())
    }

    fn role_for(&self, user_id: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT role FROM roles WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(storage_err)
    }
}
