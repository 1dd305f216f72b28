// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Seal registry — reads are public, writes are crate-private so that
// every status change goes through the lifecycle engine.

use chrono::{DateTime, Utc};
use rusqlite::{Transaction, params};
use tracing::{debug, instrument};

use sealtrack_core::error::Result;
use sealtrack_core::{Seal, SealStatus, SealtrackError};

use crate::store::{SealStore, db_err};

/// Columns selected by every seal query, in `row_to_seal` order.
const SEAL_COLUMNS: &str = "seal_number, status, box_number, installed_serial, \
     assigned_to, created_at, updated_at, is_deleted";

/// Filter for `SealStore::list_seals`.
///
/// `status` is exact-match; the "all" sentinel is represented as `None`.
/// `search` matches case-insensitively against the seal number and the
/// installed serial.
#[derive(Debug, Clone, Default)]
pub struct SealFilter {
    pub status: Option<SealStatus>,
    pub search: Option<String>,
    /// Restrict to seals currently assigned to this technician code.
    pub assigned_to: Option<String>,
}

impl SealStore {
    /// Retrieve a single seal, excluding soft-deleted rows.
    ///
    /// Returns `None` if the seal does not exist.
    #[instrument(skip(self))]
    pub fn try_get_seal(&self, seal_number: &str) -> Result<Option<Seal>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SEAL_COLUMNS} FROM seals WHERE seal_number = ?1 AND is_deleted = 0"
            ))
            .map_err(db_err)?;

        let mut rows = stmt
            .query_map(params![seal_number], row_to_seal)
            .map_err(db_err)?;

        match rows.next() {
            Some(Ok(seal)) => Ok(Some(seal)),
            Some(Err(e)) => Err(db_err(e)),
            None => Ok(None),
        }
    }

    /// Retrieve a single seal or fail with `NotFound`.
    pub fn get_seal(&self, seal_number: &str) -> Result<Seal> {
        self.try_get_seal(seal_number)?
            .ok_or_else(|| SealtrackError::NotFound(format!("seal {seal_number}")))
    }

    /// List seals matching the filter, ordered by seal number.
    #[instrument(skip(self, filter))]
    pub fn list_seals(&self, filter: &SealFilter) -> Result<Vec<Seal>> {
        let mut sql = format!("SELECT {SEAL_COLUMNS} FROM seals WHERE is_deleted = 0");
        let mut args: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            args.push(status.as_str().to_string());
        }
        if let Some(code) = &filter.assigned_to {
            sql.push_str(" AND assigned_to = ?");
            args.push(code.clone());
        }
        if let Some(term) = &filter.search {
            sql.push_str(
                " AND (LOWER(seal_number) LIKE ? OR LOWER(COALESCE(installed_serial, '')) LIKE ?)",
            );
            let pattern = format!("%{}%", term.to_lowercase());
            args.push(pattern.clone());
            args.push(pattern);
        }
        sql.push_str(" ORDER BY seal_number ASC");

        let mut stmt = self.conn.prepare(&sql).map_err(db_err)?;
        let seals = stmt
            .query_map(rusqlite::params_from_iter(args), row_to_seal)
            .map_err(db_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err)?;

        debug!(count = seals.len(), "listed seals");
        Ok(seals)
    }
}

// ---------------------------------------------------------------------------
// Crate-private write operations (engine transactions only)
// ---------------------------------------------------------------------------

/// How a transition affects the bound install serial.
pub(crate) enum SerialChange {
    Keep,
    Set(String),
    Clear,
}

/// How a transition affects the assigned technician code.
pub(crate) enum AssigneeChange {
    Keep,
    Set(String),
    Clear,
}

/// True if any row (including soft-deleted) claims this seal number.
pub(crate) fn seal_exists_tx(tx: &Transaction<'_>, seal_number: &str) -> Result<bool> {
    let count: i64 = tx
        .query_row(
            "SELECT COUNT(*) FROM seals WHERE seal_number = ?1",
            params![seal_number],
            |row| row.get(0),
        )
        .map_err(db_err)?;
    Ok(count > 0)
}

/// Insert a new seal row.
pub(crate) fn insert_seal_tx(tx: &Transaction<'_>, seal: &Seal) -> Result<()> {
    tx.execute(
        "INSERT INTO seals (seal_number, status, box_number, installed_serial,
         assigned_to, created_at, updated_at, is_deleted)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            seal.seal_number,
            seal.status.as_str(),
            seal.box_number,
            seal.installed_serial,
            seal.assigned_to,
            seal.created_at.to_rfc3339(),
            seal.updated_at.to_rfc3339(),
            seal.is_deleted as i64,
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

/// Compare-and-swap status update.
///
/// The `WHERE` clause pins the expected current status, so a concurrent
/// transition that got there first makes this a no-op; the returned row
/// count tells the engine whether it won the race.
pub(crate) fn cas_status_tx(
    tx: &Transaction<'_>,
    seal_number: &str,
    expected: SealStatus,
    next: SealStatus,
    serial: SerialChange,
    assignee: AssigneeChange,
    updated_at: DateTime<Utc>,
) -> Result<usize> {
    let serial_sql = match &serial {
        SerialChange::Keep => "installed_serial",
        SerialChange::Set(_) => "?4",
        SerialChange::Clear => "NULL",
    };
    let assignee_sql = match &assignee {
        AssigneeChange::Keep => "assigned_to",
        AssigneeChange::Set(_) => "?5",
        AssigneeChange::Clear => "NULL",
    };

    let sql = format!(
        "UPDATE seals SET status = ?1, updated_at = ?2, installed_serial = {serial_sql},
         assigned_to = {assignee_sql}
         WHERE seal_number = ?3 AND status = ?6 AND is_deleted = 0"
    );

    let new_serial = match &serial {
        SerialChange::Set(s) => Some(s.clone()),
        _ => None,
    };
    let new_assignee = match &assignee {
        AssigneeChange::Set(code) => Some(code.clone()),
        _ => None,
    };

    let rows = tx
        .execute(
            &sql,
            params![
                next.as_str(),
                updated_at.to_rfc3339(),
                seal_number,
                new_serial,
                new_assignee,
                expected.as_str(),
            ],
        )
        .map_err(db_err)?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Map a SQLite row to a `Seal`.
///
/// Column indices must match `SEAL_COLUMNS`.
pub(crate) fn row_to_seal(row: &rusqlite::Row<'_>) -> rusqlite::Result<Seal> {
    let status_str: String = row.get(1)?;
    let status = SealStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("unknown seal status {status_str:?}").into(),
        )
    })?;

    let created_at = parse_timestamp(row, 5)?;
    let updated_at = parse_timestamp(row, 6)?;

    Ok(Seal {
        seal_number: row.get(0)?,
        status,
        box_number: row.get(2)?,
        installed_serial: row.get(3)?,
        assigned_to: row.get(4)?,
        created_at,
        updated_at,
        is_deleted: row.get::<_, i64>(7)? != 0,
    })
}

pub(crate) fn parse_timestamp(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_seal(seal: &Seal) -> SealStore {
        let mut store = SealStore::open_in_memory().expect("open in-memory store");
        let tx = store.conn.transaction().expect("tx");
        insert_seal_tx(&tx, seal).expect("insert");
        tx.commit().expect("commit");
        store
    }

    #[test]
    fn insert_and_get() {
        let seal = Seal::new("F0001", Some("BOX-1".into()));
        let store = store_with_seal(&seal);

        let loaded = store.get_seal("F0001").expect("get");
        assert_eq!(loaded.seal_number, "F0001");
        assert_eq!(loaded.status, SealStatus::Ready);
        assert_eq!(loaded.box_number.as_deref(), Some("BOX-1"));
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = SealStore::open_in_memory().expect("open");
        let err = store.get_seal("F9999").unwrap_err();
        assert!(matches!(err, SealtrackError::NotFound(_)));
    }

    #[test]
    fn list_filters_by_status() {
        let mut store = SealStore::open_in_memory().expect("open");
        let tx = store.conn.transaction().expect("tx");
        insert_seal_tx(&tx, &Seal::new("F0001", None)).unwrap();
        let mut issued = Seal::new("F0002", None);
        issued.status = SealStatus::Issued;
        insert_seal_tx(&tx, &issued).unwrap();
        tx.commit().unwrap();

        let ready = store
            .list_seals(&SealFilter {
                status: Some(SealStatus::Ready),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].seal_number, "F0001");

        let all = store.list_seals(&SealFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn search_matches_number_and_serial_case_insensitively() {
        let mut store = SealStore::open_in_memory().expect("open");
        let tx = store.conn.transaction().expect("tx");
        let mut seal = Seal::new("F0001", None);
        seal.status = SealStatus::Installed;
        seal.installed_serial = Some("MTR-778".into());
        insert_seal_tx(&tx, &seal).unwrap();
        insert_seal_tx(&tx, &Seal::new("G0002", None)).unwrap();
        tx.commit().unwrap();

        let by_number = store
            .list_seals(&SealFilter {
                search: Some("f00".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_number.len(), 1);

        let by_serial = store
            .list_seals(&SealFilter {
                search: Some("mtr".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_serial.len(), 1);
        assert_eq!(by_serial[0].seal_number, "F0001");
    }

    #[test]
    fn cas_succeeds_only_from_expected_status() {
        let seal = Seal::new("F0001", None);
        let mut store = store_with_seal(&seal);

        let tx = store.conn.transaction().unwrap();
        let hit = cas_status_tx(
            &tx,
            "F0001",
            SealStatus::Ready,
            SealStatus::Issued,
            SerialChange::Keep,
            AssigneeChange::Set("T-100".into()),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(hit, 1);
        tx.commit().unwrap();

        // A second writer that still believes the seal is ready loses.
        let tx = store.conn.transaction().unwrap();
        let miss = cas_status_tx(
            &tx,
            "F0001",
            SealStatus::Ready,
            SealStatus::Issued,
            SerialChange::Keep,
            AssigneeChange::Keep,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(miss, 0);
        tx.commit().unwrap();

        let loaded = store.get_seal("F0001").unwrap();
        assert_eq!(loaded.status, SealStatus::Issued);
        assert_eq!(loaded.assigned_to.as_deref(), Some("T-100"));
    }

    #[test]
    fn cas_clear_drops_serial_and_assignee() {
        let mut seal = Seal::new("F0001", None);
        seal.status = SealStatus::Installed;
        seal.installed_serial = Some("MTR-1".into());
        seal.assigned_to = Some("T-100".into());
        let mut store = store_with_seal(&seal);

        let tx = store.conn.transaction().unwrap();
        let hit = cas_status_tx(
            &tx,
            "F0001",
            SealStatus::Installed,
            SealStatus::Ready,
            SerialChange::Clear,
            AssigneeChange::Clear,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(hit, 1);
        tx.commit().unwrap();

        let loaded = store.get_seal("F0001").unwrap();
        assert_eq!(loaded.status, SealStatus::Ready);
        assert!(loaded.installed_serial.is_none());
        assert!(loaded.assigned_to.is_none());
    }
}
