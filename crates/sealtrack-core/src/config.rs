// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Application configuration.

use serde::{Deserialize, Serialize};

/// Persistent service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP API binds to.
    pub bind_addr: String,
    /// SQLite busy timeout in milliseconds before a `Timeout` error
    /// surfaces to the caller.
    pub db_busy_timeout_ms: u64,
    /// Hours before an issued bearer token expires.
    pub session_ttl_hours: u64,
    /// Upper bound on seals created or range-expanded per request.
    pub max_batch: u32,
    /// Staff accounts accepted at /api/auth/login.
    pub staff_accounts: Vec<StaffAccount>,
}

/// A seeded staff login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffAccount {
    pub username: String,
    pub password: String,
    /// "admin" or "staff"; recorded in the session, not interpreted by
    /// the engine.
    pub role: String,
    pub display_name: String,
    pub email: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            db_busy_timeout_ms: 5_000,
            session_ttl_hours: 24,
            max_batch: 1_000,
            staff_accounts: vec![
                StaffAccount {
                    username: "admin".into(),
                    password: "admin123".into(),
                    role: "admin".into(),
                    display_name: "Administrator".into(),
                    email: "admin@sealtrack.local".into(),
                },
                StaffAccount {
                    username: "user".into(),
                    password: "user123".into(),
                    role: "staff".into(),
                    display_name: "Regular User".into(),
                    email: "user@sealtrack.local".into(),
                },
            ],
        }
    }
}
