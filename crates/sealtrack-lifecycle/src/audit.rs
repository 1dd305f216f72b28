// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Audit log — append-only record of every status-changing action.
//
// Entries are written only by the lifecycle engine, inside the same
// transaction as the status change they describe, and are never mutated
// or deleted afterwards.  The log, not the current seal row, is the
// system of record for history.

use chrono::{DateTime, Utc};
use rusqlite::{Transaction, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use sealtrack_core::error::Result;
use sealtrack_core::{ActorId, LogBucket, LogEntry};

use crate::store::{SealStore, db_err};

const LOG_COLUMNS: &str = "id, seal_number, actor, action, details, timestamp";

impl SealStore {
    /// Audit trail for one seal, newest-first.
    #[instrument(skip(self))]
    pub fn logs_for_seal(&self, seal_number: &str) -> Result<Vec<LogEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {LOG_COLUMNS} FROM seal_logs WHERE seal_number = ?1 ORDER BY id DESC"
            ))
            .map_err(db_err)?;

        let entries = stmt
            .query_map(params![seal_number], row_to_log_entry)
            .map_err(db_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(entries)
    }

    /// Every log entry in the store, newest-first.
    #[instrument(skip(self))]
    pub fn all_logs(&self) -> Result<Vec<LogEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {LOG_COLUMNS} FROM seal_logs ORDER BY id DESC"
            ))
            .map_err(db_err)?;

        let entries = stmt
            .query_map([], row_to_log_entry)
            .map_err(db_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err)?;

        debug!(count = entries.len(), "retrieved all logs");
        Ok(entries)
    }

    /// Total number of log entries.
    pub fn log_count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM seal_logs", [], |row| row.get(0))
            .map_err(db_err)
    }
}

/// Append one log entry inside an engine transaction.
pub(crate) fn append_log_tx(
    tx: &Transaction<'_>,
    seal_number: &str,
    actor: &ActorId,
    action: &str,
    details: Option<&str>,
    timestamp: DateTime<Utc>,
) -> Result<()> {
    tx.execute(
        "INSERT INTO seal_logs (seal_number, actor, action, details, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            seal_number,
            actor.0,
            action,
            details,
            timestamp.to_rfc3339(),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

/// Log entries grouped into the dashboard timeline buckets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupedLogs {
    pub created: Vec<LogEntry>,
    pub issued: Vec<LogEntry>,
    pub used: Vec<LogEntry>,
    pub returned: Vec<LogEntry>,
    pub other: Vec<LogEntry>,
}

/// Partition entries by action keyword, preserving their order.
pub fn group_logs(entries: Vec<LogEntry>) -> GroupedLogs {
    let mut grouped = GroupedLogs::default();
    for entry in entries {
        match LogBucket::classify(&entry.action) {
            LogBucket::Created => grouped.created.push(entry),
            LogBucket::Issued => grouped.issued.push(entry),
            LogBucket::Used => grouped.used.push(entry),
            LogBucket::Returned => grouped.returned.push(entry),
            LogBucket::Other => grouped.other.push(entry),
        }
    }
    grouped
}

/// Map a SQLite row to a `LogEntry`.
fn row_to_log_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        seal_number: row.get(1)?,
        actor: ActorId(row.get(2)?),
        action: row.get(3)?,
        details: row.get(4)?,
        timestamp: crate::registry::parse_timestamp(row, 5)?,
    })
}
