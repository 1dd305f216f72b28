// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// SQLite store holding the seal registry and audit log.
//
// Both tables live in one database so that the lifecycle engine can update
// a seal's status and append the matching log entry in a single
// transaction.  The store itself only manages the connection and schema;
// table operations live in `registry.rs` and `audit.rs`.

use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info, instrument};

use sealtrack_core::SealtrackError;
use sealtrack_core::error::Result;

/// Schema for the seal registry and its append-only log.
const CREATE_TABLES_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS seals (
        seal_number TEXT PRIMARY KEY,
        status TEXT NOT NULL,
        box_number TEXT,
        installed_serial TEXT,
        assigned_to TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        is_deleted INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS seal_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        seal_number TEXT NOT NULL,
        actor TEXT NOT NULL,
        action TEXT NOT NULL,
        details TEXT,
        timestamp TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_seals_status ON seals(status);
    CREATE INDEX IF NOT EXISTS idx_seal_logs_seal ON seal_logs(seal_number);
"#;

/// Map a `rusqlite::Error` into the Sealtrack taxonomy.
///
/// Busy/locked failures mean the busy timeout elapsed while another
/// writer held the database, so they surface as `Timeout` rather than a
/// generic storage error.
pub(crate) fn db_err(e: rusqlite::Error) -> SealtrackError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &e {
        if matches!(
            failure.code,
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
        ) {
            return SealtrackError::Timeout(e.to_string());
        }
    }
    SealtrackError::Database(e.to_string())
}

/// Registry + audit log storage backed by a SQLite database.
///
/// All methods are synchronous because `rusqlite` does not support async
/// natively.  In an async context, wrap calls in `tokio::task::spawn_blocking`.
pub struct SealStore {
    /// The open SQLite connection.  Crate-visible so the engine can run
    /// multi-statement transactions across both tables.
    pub(crate) conn: Connection,
}

impl SealStore {
    /// Open (or create) the seal database at the given path.
    ///
    /// Applies WAL journal mode for concurrent-read performance, sets the
    /// busy timeout that bounds every blocking storage call, and creates
    /// the tables if they do not exist.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(db_err)?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db_err)?;
        conn.busy_timeout(busy_timeout).map_err(db_err)?;

        conn.execute_batch(CREATE_TABLES_SQL).map_err(db_err)?;

        info!("seal store opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLES_SQL).map_err(db_err)?;

        debug!("in-memory seal store opened");
        Ok(Self { conn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_schema_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seals.db");

        let store = SealStore::open(&path, Duration::from_millis(500)).expect("open");
        drop(store);

        // Re-opening an existing database must not fail on the schema.
        let store = SealStore::open(&path, Duration::from_millis(500)).expect("reopen");
        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM seals", [], |row| row.get(0))
            .expect("query");
        assert_eq!(count, 0);
    }

    #[test]
    fn busy_error_maps_to_timeout() {
        let failure = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".into()),
        );
        assert!(matches!(db_err(failure), SealtrackError::Timeout(_)));
    }
}
