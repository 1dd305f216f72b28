// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Reporting aggregator — dashboard status counts from the registry.

use tracing::instrument;

use sealtrack_core::error::Result;
use sealtrack_core::{SealReport, SealStatus};

use crate::engine::LifecycleEngine;
use crate::store::{SealStore, db_err};

impl SealStore {
    /// Status counts for every non-deleted seal.
    ///
    /// A single `GROUP BY` query, so all figures reflect the same
    /// snapshot even while writes are in flight.
    #[instrument(skip(self))]
    pub fn status_report(&self) -> Result<SealReport> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM seals WHERE is_deleted = 0 GROUP BY status")
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
            })
            .map_err(db_err)?;

        let mut report = SealReport::default();
        for row in rows {
            let (status_str, count) = row.map_err(db_err)?;
            report.total += count;
            match SealStatus::parse(&status_str) {
                Some(SealStatus::Ready) => report.ready = count,
                Some(SealStatus::Issued) => report.issued = count,
                Some(SealStatus::Installed) => report.installed = count,
                Some(SealStatus::Used) => report.used = count,
                // Damaged/lost only contribute to the total.
                Some(SealStatus::Damaged) | Some(SealStatus::Lost) | None => {}
            }
        }
        Ok(report)
    }
}

impl LifecycleEngine {
    /// Current status-count summary.
    pub fn report(&self) -> Result<SealReport> {
        self.with_store(|store| store.status_report())
    }
}
