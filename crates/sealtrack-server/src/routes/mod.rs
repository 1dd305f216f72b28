// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// REST route table.  One module per resource; handlers authenticate,
// hop to the blocking pool for the synchronous core, and translate
// domain results into wire types.

pub mod auth;
pub mod logs;
pub mod seals;
pub mod technician;

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;

use crate::state::AppState;
use crate::wire::ApiError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(auth::staff_login))
        .route("/api/technician/login", post(auth::technician_login))
        .route("/api/seals", get(seals::list).post(seals::create))
        .route("/api/seals/check", post(seals::check))
        .route("/api/seals/assign-by-techcode", post(seals::assign))
        .route("/api/seals/report", get(seals::report))
        .route("/api/seals/:seal_number", get(seals::get_one))
        .route("/api/seals/:seal_number/logs", get(seals::logs))
        .route("/api/seals/:seal_number/install", put(seals::install))
        .route("/api/seals/:seal_number/return", put(seals::complete))
        .route("/api/seals/:seal_number/cancel", put(seals::cancel))
        .route("/api/logs", get(logs::all))
        .route("/api/technician/list", get(technician::list))
        .route("/api/technician/register", post(technician::register))
        .route("/api/technician/import", post(technician::import))
        .route("/api/technician/update/:id", put(technician::update))
        .route("/api/technician/delete/:id", delete(technician::remove))
        .route("/api/technician/my-seals", get(technician::my_seals))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "time": Utc::now() }))
}

/// A panicked or cancelled blocking task.
pub(crate) fn join_err(e: tokio::task::JoinError) -> ApiError {
    ApiError::internal(format!("blocking task failed: {e}"))
}
