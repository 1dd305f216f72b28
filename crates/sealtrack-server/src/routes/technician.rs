// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Technician directory endpoints plus the technician-facing my-seals
// view.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;

use sealtrack_core::Technician;
use sealtrack_directory::NewTechnician;
use sealtrack_lifecycle::SealFilter;

use crate::routes::join_err;
use crate::state::AppState;
use crate::wire::{ApiError, ApiResult, ImportResponse, SealDto, SkippedRow};

/// Plain array body: the client reads `response.data` directly.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Technician>>> {
    state.sessions.authenticate(&headers)?;

    let directory = state.directory.clone();
    let technicians = tokio::task::spawn_blocking(move || directory.list())
        .await
        .map_err(join_err)??;
    Ok(Json(technicians))
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<NewTechnician>,
) -> ApiResult<Json<Technician>> {
    state.sessions.authenticate_staff(&headers)?;

    let directory = state.directory.clone();
    let technician = tokio::task::spawn_blocking(move || directory.register(&request))
        .await
        .map_err(join_err)??;
    Ok(Json(technician))
}

pub async fn import(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<Vec<NewTechnician>>,
) -> ApiResult<Json<ImportResponse>> {
    state.sessions.authenticate_staff(&headers)?;

    let directory = state.directory.clone();
    let report = tokio::task::spawn_blocking(move || directory.import(&request))
        .await
        .map_err(join_err)??;

    Ok(Json(ImportResponse {
        success: true,
        imported: report.imported,
        skipped: report
            .skipped
            .into_iter()
            .map(|(technician_code, reason)| SkippedRow {
                technician_code,
                reason,
            })
            .collect(),
    }))
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(request): Json<NewTechnician>,
) -> ApiResult<Json<Technician>> {
    state.sessions.authenticate_staff(&headers)?;

    let directory = state.directory.clone();
    let technician = tokio::task::spawn_blocking(move || directory.update(id, &request))
        .await
        .map_err(join_err)??;
    Ok(Json(technician))
}

pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    state.sessions.authenticate_staff(&headers)?;

    let directory = state.directory.clone();
    tokio::task::spawn_blocking(move || directory.delete(id))
        .await
        .map_err(join_err)??;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Seals currently issued to the calling technician.
pub async fn my_seals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<SealDto>>> {
    let session = state.sessions.authenticate_technician(&headers)?;
    let code = session
        .actor
        .0
        .strip_prefix("technician:")
        .ok_or_else(|| ApiError::internal("technician session without code"))?
        .to_string();

    let engine = state.engine.clone();
    let seals = tokio::task::spawn_blocking(move || {
        engine.with_store(|store| {
            store.list_seals(&SealFilter {
                assigned_to: Some(code),
                ..Default::default()
            })
        })
    })
    .await
    .map_err(join_err)??;

    Ok(Json(seals.into_iter().map(SealDto::from).collect()))
}
