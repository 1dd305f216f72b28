// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Unified error types for Sealtrack.

use thiserror::Error;

use crate::types::SealStatus;

/// Top-level error type for all Sealtrack operations.
#[derive(Debug, Error)]
pub enum SealtrackError {
    /// Unknown seal number or technician code.
    #[error("not found: {0}")]
    NotFound(String),

    /// The seal's current status does not accept the requested transition.
    #[error("seal {seal_number} is {from} and cannot accept {requested}")]
    InvalidTransition {
        seal_number: String,
        from: SealStatus,
        requested: &'static str,
    },

    /// Malformed input: bad count, duplicate seal number, empty batch.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The request was valid when issued but lost a race on a concurrent
    /// transition.
    #[error("seal {seal_number} changed concurrently: expected {expected}, now {actual}")]
    Conflict {
        seal_number: String,
        expected: SealStatus,
        actual: SealStatus,
    },

    /// Storage did not respond within the configured bound.
    #[error("storage timed out: {0}")]
    Timeout(String),

    /// The transition policy refused the actor.
    #[error("actor {actor} may not perform {action}")]
    Forbidden {
        actor: String,
        action: &'static str,
    },

    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SealtrackError {
    /// Stable machine-readable code reported on the wire and in per-seal
    /// batch results.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Validation(_) => "validation",
            Self::Conflict { .. } => "conflict",
            Self::Timeout(_) => "timeout",
            Self::Forbidden { .. } => "forbidden",
            Self::Database(_) => "database",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SealtrackError>;
