// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Wire types for the REST API.
//
// Internally every status is a closed enum; the Thai display labels the
// mobile client renders exist only here, at the serialization boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sealtrack_core::{AssignFailure, LogEntry, Seal, SealReport, SealtrackError};
use sealtrack_lifecycle::GroupedLogs;

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

/// Error reported to HTTP clients as `{ "error": ..., "code": ... }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "unauthorized",
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "forbidden",
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message: message.into(),
        }
    }
}

impl From<SealtrackError> for ApiError {
    fn from(e: SealtrackError) -> Self {
        let status = match &e {
            SealtrackError::NotFound(_) => StatusCode::NOT_FOUND,
            SealtrackError::Validation(_) => StatusCode::BAD_REQUEST,
            SealtrackError::InvalidTransition { .. } | SealtrackError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            SealtrackError::Forbidden { .. } => StatusCode::FORBIDDEN,
            SealtrackError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            code: e.code(),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
            "code": self.code,
        });
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// ---------------------------------------------------------------------------
// Seal payloads
// ---------------------------------------------------------------------------

/// A seal as the client sees it: status carries the display label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealDto {
    pub seal_number: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Seal> for SealDto {
    fn from(seal: Seal) -> Self {
        Self {
            seal_number: seal.seal_number,
            status: seal.status.label().to_string(),
            box_number: seal.box_number,
            installed_serial: seal.installed_serial,
            assigned_to: seal.assigned_to,
            created_at: seal.created_at,
            updated_at: seal.updated_at,
        }
    }
}

/// Query parameters for GET /api/seals.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSealsRequest {
    pub seal_number: String,
    pub count: u32,
    #[serde(default)]
    pub box_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSealsResponse {
    pub success: bool,
    pub created: usize,
    pub seals: Vec<SealDto>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub seal_numbers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub found: Vec<String>,
    pub unavailable: Vec<String>,
}

/// Inclusive seal-number range, expanded server-side before the batcher
/// ever sees it.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeRequest {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub technician_code: String,
    #[serde(default)]
    pub seal_numbers: Vec<String>,
    #[serde(default)]
    pub range: Option<RangeRequest>,
    #[serde(default)]
    pub remark: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssignResponse {
    pub success: bool,
    pub succeeded: Vec<String>,
    pub failed: Vec<AssignFailure>,
}

#[derive(Debug, Deserialize)]
pub struct InstallRequest {
    pub serial: String,
}

/// Dashboard report keyed by the literal labels the client reads.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportDto {
    pub total_seals: u64,
    #[serde(rename = "พร้อมใช้งาน")]
    pub ready: u64,
    #[serde(rename = "จ่าย")]
    pub issued: u64,
    #[serde(rename = "ติดตั้งแล้ว")]
    pub installed: u64,
    #[serde(rename = "ใช้งานแล้ว")]
    pub used: u64,
}

impl From<SealReport> for ReportDto {
    fn from(report: SealReport) -> Self {
        Self {
            total_seals: report.total,
            ready: report.ready,
            issued: report.issued,
            installed: report.installed,
            used: report.used,
        }
    }
}

// ---------------------------------------------------------------------------
// Log payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogDto {
    pub id: i64,
    pub seal_number: String,
    pub user_id: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<LogEntry> for LogDto {
    fn from(entry: LogEntry) -> Self {
        Self {
            id: entry.id,
            seal_number: entry.seal_number,
            user_id: entry.actor.0,
            action: entry.action,
            details: entry.details,
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SealLogsResponse {
    pub success: bool,
    pub seal_number: String,
    pub logs: Vec<LogDto>,
}

#[derive(Debug, Serialize)]
pub struct LogBucketsDto {
    pub created: Vec<LogDto>,
    pub issued: Vec<LogDto>,
    pub used: Vec<LogDto>,
    pub returned: Vec<LogDto>,
    pub other: Vec<LogDto>,
}

impl From<GroupedLogs> for LogBucketsDto {
    fn from(grouped: GroupedLogs) -> Self {
        let convert = |entries: Vec<LogEntry>| entries.into_iter().map(LogDto::from).collect();
        Self {
            created: convert(grouped.created),
            issued: convert(grouped.issued),
            used: convert(grouped.used),
            returned: convert(grouped.returned),
            other: convert(grouped.other),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub success: bool,
    pub logs: LogBucketsDto,
}

// ---------------------------------------------------------------------------
// Auth payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TechnicianLoginRequest {
    pub technician_code: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub username: String,
    pub role: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: LoginUser,
}

// ---------------------------------------------------------------------------
// Technician payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub imported: u32,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Serialize)]
pub struct SkippedRow {
    pub technician_code: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealtrack_core::SealStatus;

    #[test]
    fn report_uses_literal_thai_keys() {
        let dto = ReportDto {
            total_seals: 10,
            ready: 4,
            issued: 3,
            installed: 2,
            used: 1,
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["total_seals"], 10);
        assert_eq!(json["พร้อมใช้งาน"], 4);
        assert_eq!(json["จ่าย"], 3);
        assert_eq!(json["ติดตั้งแล้ว"], 2);
        assert_eq!(json["ใช้งานแล้ว"], 1);
    }

    #[test]
    fn seal_dto_carries_display_label() {
        let mut seal = Seal::new("F0001", None);
        seal.status = SealStatus::Installed;
        let dto = SealDto::from(seal);
        assert_eq!(dto.status, "ติดตั้งแล้ว");
    }

    #[test]
    fn error_status_mapping() {
        let not_found: ApiError = SealtrackError::NotFound("seal F1".into()).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let invalid: ApiError = SealtrackError::InvalidTransition {
            seal_number: "F1".into(),
            from: SealStatus::Ready,
            requested: "Returned",
        }
        .into();
        assert_eq!(invalid.status, StatusCode::CONFLICT);
        assert_eq!(invalid.code, "invalid_transition");

        let conflict: ApiError = SealtrackError::Conflict {
            seal_number: "F1".into(),
            expected: SealStatus::Ready,
            actual: SealStatus::Issued,
        }
        .into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);
        assert_eq!(conflict.code, "conflict");

        let validation: ApiError = SealtrackError::Validation("bad".into()).into();
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);

        let timeout: ApiError = SealtrackError::Timeout("busy".into()).into();
        assert_eq!(timeout.status, StatusCode::GATEWAY_TIMEOUT);
    }
}
