// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Core domain types for the seal lifecycle service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Lifecycle states of a physical security seal.
///
/// `Damaged` and `Lost` are terminal statuses reported out-of-band; no
/// engine transition produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SealStatus {
    /// In stock, unassigned.
    Ready,
    /// Assigned to a technician.
    Issued,
    /// Physically applied by the technician.
    Installed,
    /// Fulfilled its purpose (terminal).
    Used,
    /// Reported damaged (terminal).
    Damaged,
    /// Reported lost (terminal).
    Lost,
}

impl SealStatus {
    /// Canonical storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Issued => "issued",
            Self::Installed => "installed",
            Self::Used => "used",
            Self::Damaged => "damaged",
            Self::Lost => "lost",
        }
    }

    /// Display label sent on the wire.  The mobile client renders these
    /// verbatim, so they must never drift.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready => "พร้อมใช้งาน",
            Self::Issued => "จ่าย",
            Self::Installed => "ติดตั้งแล้ว",
            Self::Used => "ใช้งานแล้ว",
            Self::Damaged => "เสียหาย",
            Self::Lost => "สูญหาย",
        }
    }

    /// Parse either the canonical storage form or the wire label.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ready" | "พร้อมใช้งาน" => Some(Self::Ready),
            "issued" | "จ่าย" => Some(Self::Issued),
            "installed" | "ติดตั้งแล้ว" => Some(Self::Installed),
            "used" | "ใช้งานแล้ว" => Some(Self::Used),
            "damaged" | "เสียหาย" => Some(Self::Damaged),
            "lost" | "สูญหาย" => Some(Self::Lost),
            _ => None,
        }
    }
}

impl std::fmt::Display for SealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque identifier of the actor performing an operation.
///
/// The engine never interprets this beyond attributing it in log entries;
/// the HTTP layer decides what goes in here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tracked physical security-seal instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seal {
    /// Immutable human/barcode-readable serial, the primary key.
    pub seal_number: String,
    pub status: SealStatus,
    /// Batch/lot grouping, if recorded at creation.
    pub box_number: Option<String>,
    /// External device serial bound at install time.
    pub installed_serial: Option<String>,
    /// Technician code set on assign, cleared on cancel.
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Seal {
    /// A fresh seal in `Ready` status with both timestamps set to now.
    pub fn new(seal_number: impl Into<String>, box_number: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            seal_number: seal_number.into(),
            status: SealStatus::Ready,
            box_number,
            installed_serial: None,
            assigned_to: None,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }
}

/// Immutable audit record of one lifecycle transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub seal_number: String,
    pub actor: ActorId,
    /// Free-text description of the transition, e.g. "Created", "Assigned".
    pub action: String,
    /// Optional context: remark, bound serial, technician code.
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Dashboard timeline buckets for audit log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogBucket {
    Created,
    Issued,
    Used,
    Returned,
    Other,
}

impl LogBucket {
    /// Classify an action string by keyword, case-insensitively.
    pub fn classify(action: &str) -> Self {
        let lower = action.to_ascii_lowercase();
        if lower.contains("creat") {
            Self::Created
        } else if lower.contains("assign") || lower.contains("issue") {
            Self::Issued
        } else if lower.contains("install") || lower.contains("use") {
            Self::Used
        } else if lower.contains("return") {
            Self::Returned
        } else {
            Self::Other
        }
    }
}

/// A status-changing operation requested against one seal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// `ready` → `issued`.
    Assign { technician_code: String },
    /// `issued` → `installed`; binds the external device serial.
    Install { serial: String },
    /// `installed` → `used`.
    Complete,
    /// `installed` or `used` → `ready`; clears the bound serial.
    Cancel,
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Self::Assign { .. } => TransitionKind::Assign,
            Self::Install { .. } => TransitionKind::Install,
            Self::Complete => TransitionKind::Complete,
            Self::Cancel => TransitionKind::Cancel,
        }
    }

    /// Action text recorded in the audit log.
    pub fn action_label(&self) -> &'static str {
        match self {
            Self::Assign { .. } => "Assigned",
            Self::Install { .. } => "Installed",
            Self::Complete => "Returned",
            Self::Cancel => "Cancelled",
        }
    }
}

/// Transition discriminant used by authorization policies.
///
/// `Create` covers batch creation, which has no current seal to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Create,
    Assign,
    Install,
    Complete,
    Cancel,
}

/// A technician in the external directory, referenced by code from the
/// seal side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    pub id: i64,
    pub technician_code: String,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub department: String,
    pub phone_number: String,
    pub email: String,
}

/// Resolution of technician codes, implemented by the directory crate.
pub trait TechnicianLookup: Send + Sync {
    fn find_by_code(&self, code: &str) -> Result<Option<Technician>>;
}

/// Status-count summary computed from a single registry snapshot.
///
/// `total` counts every non-deleted seal, including terminal `damaged`
/// and `lost` rows that have no dedicated field here.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SealReport {
    pub total: u64,
    pub ready: u64,
    pub issued: u64,
    pub installed: u64,
    pub used: u64,
}

/// Result of a read-only availability probe over a list of seal numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Numbers currently `ready`.
    pub found: Vec<String>,
    /// Numbers missing, soft-deleted, or in any other status.
    pub unavailable: Vec<String>,
}

/// One element of a bulk assignment that could not be issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignFailure {
    pub seal_number: String,
    /// Machine-readable error code (`SealtrackError::code`).
    pub code: String,
    pub message: String,
}

/// Per-element outcome of a bulk assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<AssignFailure>,
}
