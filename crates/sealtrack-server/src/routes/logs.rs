// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Audit log endpoint: every entry, grouped into the dashboard buckets.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

use sealtrack_lifecycle::group_logs;

use crate::routes::join_err;
use crate::state::AppState;
use crate::wire::{ApiResult, LogsResponse};

pub async fn all(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<LogsResponse>> {
    state.sessions.authenticate_staff(&headers)?;

    let engine = state.engine.clone();
    let entries = tokio::task::spawn_blocking(move || engine.with_store(|store| store.all_logs()))
        .await
        .map_err(join_err)??;

    Ok(Json(LogsResponse {
        success: true,
        logs: group_logs(entries).into(),
    }))
}
