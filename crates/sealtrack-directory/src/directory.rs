// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Technician directory backed by SQLite.
//
// The connection sits behind an internal mutex so the directory can be
// shared across request handlers and implement `TechnicianLookup` for
// the lifecycle engine.

use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use sealtrack_core::error::Result;
use sealtrack_core::{SealtrackError, Technician, TechnicianLookup};

use crate::credentials;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS technicians (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        technician_code TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        company_name TEXT NOT NULL DEFAULT '',
        department TEXT NOT NULL DEFAULT '',
        phone_number TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL DEFAULT '',
        password_salt TEXT,
        password_digest TEXT
    )
"#;

const TECHNICIAN_COLUMNS: &str =
    "id, technician_code, first_name, last_name, company_name, department, phone_number, email";

fn db_err(e: rusqlite::Error) -> SealtrackError {
    SealtrackError::Database(e.to_string())
}

/// Registration or import payload.  `password` is optional: imported
/// rosters often carry no credentials until the technician first logs in
/// through the back office.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTechnician {
    pub technician_code: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Outcome of a bulk roster import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: u32,
    /// Rows that could not be imported: (technician_code, reason).
    pub skipped: Vec<(String, String)>,
}

/// SQLite-backed technician roster.
pub struct TechnicianDirectory {
    conn: Mutex<Connection>,
}

impl TechnicianDirectory {
    /// Open (or create) the directory database at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(db_err)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db_err)?;
        conn.busy_timeout(busy_timeout).map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        info!("technician directory opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory directory (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("in-memory technician directory opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Register one technician.  A duplicate code is a validation error.
    #[instrument(skip(self, technician), fields(code = %technician.technician_code))]
    pub fn register(&self, technician: &NewTechnician) -> Result<Technician> {
        let conn = self.conn.lock().expect("directory lock poisoned");

        let (salt, digest) = match &technician.password {
            Some(password) => {
                let salt = credentials::new_salt();
                let digest = credentials::digest(&salt, password);
                (Some(salt), Some(digest))
            }
            None => (None, None),
        };

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO technicians
             (technician_code, first_name, last_name, company_name, department,
              phone_number, email, password_salt, password_digest)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                technician.technician_code,
                technician.first_name,
                technician.last_name,
                technician.company_name,
                technician.department,
                technician.phone_number,
                technician.email,
                salt,
                digest,
            ],
        )
        .map_err(db_err)?;

        if inserted == 0 {
            return Err(SealtrackError::Validation(format!(
                "technician code {} already registered",
                technician.technician_code
            )));
        }

        info!("technician registered");
        Self::find_by_code_locked(&conn, &technician.technician_code)?.ok_or_else(|| {
            SealtrackError::Database("registered technician not readable".into())
        })
    }

    /// Import a roster, best-effort per row.
    #[instrument(skip(self, technicians), fields(count = technicians.len()))]
    pub fn import(&self, technicians: &[NewTechnician]) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        for technician in technicians {
            match self.register(technician) {
                Ok(_) => report.imported += 1,
                Err(SealtrackError::Validation(reason)) => {
                    report
                        .skipped
                        .push((technician.technician_code.clone(), reason));
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            imported = report.imported,
            skipped = report.skipped.len(),
            "roster import finished"
        );
        Ok(report)
    }

    /// All technicians, ordered by code.
    pub fn list(&self) -> Result<Vec<Technician>> {
        let conn = self.conn.lock().expect("directory lock poisoned");
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {TECHNICIAN_COLUMNS} FROM technicians ORDER BY technician_code ASC"
            ))
            .map_err(db_err)?;
        let technicians = stmt
            .query_map([], row_to_technician)
            .map_err(db_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(technicians)
    }

    /// Update the profile fields of an existing technician.
    ///
    /// The code itself is immutable once registered; credentials are not
    /// touched here.
    #[instrument(skip(self, update))]
    pub fn update(&self, id: i64, update: &NewTechnician) -> Result<Technician> {
        let conn = self.conn.lock().expect("directory lock poisoned");
        let rows = conn
            .execute(
                "UPDATE technicians SET first_name = ?1, last_name = ?2, company_name = ?3,
                 department = ?4, phone_number = ?5, email = ?6 WHERE id = ?7",
                params![
                    update.first_name,
                    update.last_name,
                    update.company_name,
                    update.department,
                    update.phone_number,
                    update.email,
                    id,
                ],
            )
            .map_err(db_err)?;
        if rows == 0 {
            return Err(SealtrackError::NotFound(format!("technician id {id}")));
        }

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {TECHNICIAN_COLUMNS} FROM technicians WHERE id = ?1"
            ))
            .map_err(db_err)?;
        stmt.query_row(params![id], row_to_technician)
            .map_err(db_err)
    }

    /// Remove a technician.  Idempotent: deleting an absent id succeeds.
    #[instrument(skip(self))]
    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().expect("directory lock poisoned");
        conn.execute("DELETE FROM technicians WHERE id = ?1", params![id])
            .map_err(db_err)?;
        info!("technician deleted");
        Ok(())
    }

    /// Look up one technician by code.
    pub fn find_by_code(&self, code: &str) -> Result<Option<Technician>> {
        let conn = self.conn.lock().expect("directory lock poisoned");
        Self::find_by_code_locked(&conn, code)
    }

    /// Verify a technician login.
    ///
    /// Returns `None` for an unknown code, a missing credential, or a
    /// wrong password — the caller cannot tell which.
    #[instrument(skip(self, password))]
    pub fn verify_login(&self, code: &str, password: &str) -> Result<Option<Technician>> {
        let conn = self.conn.lock().expect("directory lock poisoned");
        let stored: Option<(Option<String>, Option<String>)> = conn
            .query_row(
                "SELECT password_salt, password_digest FROM technicians WHERE technician_code = ?1",
                params![code],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(db_err)?;

        match stored {
            Some((Some(salt), Some(digest))) if credentials::verify(&salt, &digest, password) => {
                Self::find_by_code_locked(&conn, code)
            }
            _ => Ok(None),
        }
    }

    /// Set (or replace) a technician's password.
    #[instrument(skip(self, password))]
    pub fn set_password(&self, code: &str, password: &str) -> Result<()> {
        let conn = self.conn.lock().expect("directory lock poisoned");
        let salt = credentials::new_salt();
        let digest = credentials::digest(&salt, password);
        let rows = conn
            .execute(
                "UPDATE technicians SET password_salt = ?1, password_digest = ?2
                 WHERE technician_code = ?3",
                params![salt, digest, code],
            )
            .map_err(db_err)?;
        if rows == 0 {
            return Err(SealtrackError::NotFound(format!("technician {code}")));
        }
        Ok(())
    }

    fn find_by_code_locked(conn: &Connection, code: &str) -> Result<Option<Technician>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {TECHNICIAN_COLUMNS} FROM technicians WHERE technician_code = ?1"
            ))
            .map_err(db_err)?;
        stmt.query_row(params![code], row_to_technician)
            .optional()
            .map_err(db_err)
    }
}

impl TechnicianLookup for TechnicianDirectory {
    fn find_by_code(&self, code: &str) -> Result<Option<Technician>> {
        TechnicianDirectory::find_by_code(self, code)
    }
}

fn row_to_technician(row: &rusqlite::Row<'_>) -> rusqlite::Result<Technician> {
    Ok(Technician {
        id: row.get(0)?,
        technician_code: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        company_name: row.get(4)?,
        department: row.get(5)?,
        phone_number: row.get(6)?,
        email: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn somchai() -> NewTechnician {
        NewTechnician {
            technician_code: "T-100".into(),
            first_name: "Somchai".into(),
            last_name: "Jaidee".into(),
            company_name: "Provincial Electric".into(),
            department: "Metering".into(),
            phone_number: "081-000-0000".into(),
            email: "somchai@example.com".into(),
            password: Some("hunter2".into()),
        }
    }

    #[test]
    fn register_and_find() {
        let directory = TechnicianDirectory::open_in_memory().unwrap();
        let registered = directory.register(&somchai()).unwrap();
        assert_eq!(registered.technician_code, "T-100");
        assert!(registered.id > 0);

        let found = directory.find_by_code("T-100").unwrap().unwrap();
        assert_eq!(found.first_name, "Somchai");
        assert!(directory.find_by_code("T-999").unwrap().is_none());
    }

    #[test]
    fn duplicate_code_is_validation_error() {
        let directory = TechnicianDirectory::open_in_memory().unwrap();
        directory.register(&somchai()).unwrap();
        let err = directory.register(&somchai()).unwrap_err();
        assert!(matches!(err, SealtrackError::Validation(_)));
    }

    #[test]
    fn import_is_best_effort() {
        let directory = TechnicianDirectory::open_in_memory().unwrap();
        let mut second = somchai();
        second.technician_code = "T-200".into();

        let report = directory
            .import(&[somchai(), second, somchai()])
            .unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "T-100");
        assert_eq!(directory.list().unwrap().len(), 2);
    }

    #[test]
    fn login_round_trip() {
        let directory = TechnicianDirectory::open_in_memory().unwrap();
        directory.register(&somchai()).unwrap();

        assert!(directory.verify_login("T-100", "hunter2").unwrap().is_some());
        assert!(directory.verify_login("T-100", "wrong").unwrap().is_none());
        assert!(directory.verify_login("T-999", "hunter2").unwrap().is_none());
    }

    #[test]
    fn login_without_credentials_is_refused() {
        let directory = TechnicianDirectory::open_in_memory().unwrap();
        let mut no_password = somchai();
        no_password.password = None;
        directory.register(&no_password).unwrap();

        assert!(directory.verify_login("T-100", "").unwrap().is_none());

        directory.set_password("T-100", "fresh-secret").unwrap();
        assert!(
            directory
                .verify_login("T-100", "fresh-secret")
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn update_profile_fields() {
        let directory = TechnicianDirectory::open_in_memory().unwrap();
        let registered = directory.register(&somchai()).unwrap();

        let mut update = somchai();
        update.department = "Field Operations".into();
        let updated = directory.update(registered.id, &update).unwrap();
        assert_eq!(updated.department, "Field Operations");

        let err = directory.update(9999, &update).unwrap_err();
        assert!(matches!(err, SealtrackError::NotFound(_)));
    }

    #[test]
    fn delete_is_idempotent() {
        let directory = TechnicianDirectory::open_in_memory().unwrap();
        let registered = directory.register(&somchai()).unwrap();

        directory.delete(registered.id).unwrap();
        directory.delete(registered.id).unwrap();
        assert!(directory.find_by_code("T-100").unwrap().is_none());
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("technicians.db");

        {
            let directory =
                TechnicianDirectory::open(&path, Duration::from_millis(500)).unwrap();
            directory.register(&somchai()).unwrap();
        }

        let directory = TechnicianDirectory::open(&path, Duration::from_millis(500)).unwrap();
        assert!(directory.find_by_code("T-100").unwrap().is_some());
    }
}
