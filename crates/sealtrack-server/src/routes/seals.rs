// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Seal endpoints: listing, batch creation, availability checks, bulk
// assignment, the install/return/cancel transitions, and the dashboard
// report.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;

use sealtrack_core::{SealStatus, SealtrackError, Transition};
use sealtrack_lifecycle::SealFilter;

use crate::range::expand_range;
use crate::routes::join_err;
use crate::state::AppState;
use crate::wire::{
    ApiError, ApiResult, AssignRequest, AssignResponse, CheckRequest, CheckResponse,
    CreateSealsRequest, CreateSealsResponse, InstallRequest, ListQuery, ReportDto, SealDto,
    SealLogsResponse,
};

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<SealDto>>> {
    state.sessions.authenticate(&headers)?;
    let filter = parse_filter(&query)?;

    let engine = state.engine.clone();
    let seals = tokio::task::spawn_blocking(move || {
        engine.with_store(|store| store.list_seals(&filter))
    })
    .await
    .map_err(join_err)??;

    Ok(Json(seals.into_iter().map(SealDto::from).collect()))
}

pub async fn get_one(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(seal_number): Path<String>,
) -> ApiResult<Json<SealDto>> {
    state.sessions.authenticate(&headers)?;

    let engine = state.engine.clone();
    let seal = tokio::task::spawn_blocking(move || {
        engine.with_store(|store| store.get_seal(&seal_number))
    })
    .await
    .map_err(join_err)??;

    Ok(Json(SealDto::from(seal)))
}

pub async fn logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(seal_number): Path<String>,
) -> ApiResult<Json<SealLogsResponse>> {
    state.sessions.authenticate(&headers)?;

    let engine = state.engine.clone();
    let number = seal_number.clone();
    let entries = tokio::task::spawn_blocking(move || {
        engine.with_store(|store| {
            // 404 for unknown seals rather than an empty trail.
            store.get_seal(&number)?;
            store.logs_for_seal(&number)
        })
    })
    .await
    .map_err(join_err)??;

    Ok(Json(SealLogsResponse {
        success: true,
        seal_number,
        logs: entries.into_iter().map(Into::into).collect(),
    }))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateSealsRequest>,
) -> ApiResult<Json<CreateSealsResponse>> {
    let session = state.sessions.authenticate_staff(&headers)?;

    if request.count > state.config.max_batch {
        return Err(SealtrackError::Validation(format!(
            "count {} exceeds the batch limit of {}",
            request.count, state.config.max_batch
        ))
        .into());
    }

    let engine = state.engine.clone();
    let created = tokio::task::spawn_blocking(move || {
        engine.create_batch(
            &session.actor,
            &request.seal_number,
            request.count,
            request.box_number,
        )
    })
    .await
    .map_err(join_err)??;

    Ok(Json(CreateSealsResponse {
        success: true,
        created: created.len(),
        seals: created.into_iter().map(SealDto::from).collect(),
    }))
}

pub async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckRequest>,
) -> ApiResult<Json<CheckResponse>> {
    state.sessions.authenticate(&headers)?;

    let engine = state.engine.clone();
    let outcome =
        tokio::task::spawn_blocking(move || engine.check_seals(&request.seal_numbers))
            .await
            .map_err(join_err)??;

    Ok(Json(CheckResponse {
        found: outcome.found,
        unavailable: outcome.unavailable,
    }))
}

pub async fn assign(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AssignRequest>,
) -> ApiResult<Json<AssignResponse>> {
    let session = state.sessions.authenticate_staff(&headers)?;

    // Flatten the staged input: explicit numbers plus any range, expanded
    // here so the batcher only ever sees individual seal numbers.
    let mut numbers = request.seal_numbers;
    if let Some(range) = &request.range {
        numbers.extend(expand_range(
            &range.start,
            &range.end,
            state.config.max_batch,
        )?);
    }

    let engine = state.engine.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        engine.assign_by_technician(
            &session.actor,
            &request.technician_code,
            &numbers,
            request.remark.as_deref(),
        )
    })
    .await
    .map_err(join_err)??;

    Ok(Json(AssignResponse {
        success: outcome.failed.is_empty(),
        succeeded: outcome.succeeded,
        failed: outcome.failed,
    }))
}

pub async fn install(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(seal_number): Path<String>,
    Json(request): Json<InstallRequest>,
) -> ApiResult<Json<SealDto>> {
    let session = state.sessions.authenticate(&headers)?;

    let engine = state.engine.clone();
    let seal = tokio::task::spawn_blocking(move || {
        engine.apply(
            &session.actor,
            &seal_number,
            Transition::Install {
                serial: request.serial,
            },
            None,
        )
    })
    .await
    .map_err(join_err)??;

    Ok(Json(SealDto::from(seal)))
}

pub async fn complete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(seal_number): Path<String>,
) -> ApiResult<Json<SealDto>> {
    let session = state.sessions.authenticate(&headers)?;

    let engine = state.engine.clone();
    let seal = tokio::task::spawn_blocking(move || {
        engine.apply(&session.actor, &seal_number, Transition::Complete, None)
    })
    .await
    .map_err(join_err)??;

    Ok(Json(SealDto::from(seal)))
}

pub async fn cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(seal_number): Path<String>,
) -> ApiResult<Json<SealDto>> {
    let session = state.sessions.authenticate_staff(&headers)?;

    let engine = state.engine.clone();
    let seal = tokio::task::spawn_blocking(move || {
        engine.apply(&session.actor, &seal_number, Transition::Cancel, None)
    })
    .await
    .map_err(join_err)??;

    Ok(Json(SealDto::from(seal)))
}

pub async fn report(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ReportDto>> {
    state.sessions.authenticate(&headers)?;

    let engine = state.engine.clone();
    let report = tokio::task::spawn_blocking(move || engine.report())
        .await
        .map_err(join_err)??;

    Ok(Json(ReportDto::from(report)))
}

/// Translate the query string into a registry filter.  `all` (in either
/// language) and an empty value mean no status filter.
fn parse_filter(query: &ListQuery) -> Result<SealFilter, ApiError> {
    let status = match query.status.as_deref() {
        None | Some("") | Some("all") | Some("สถานะทั้งหมด") => None,
        Some(raw) => Some(SealStatus::parse(raw).ok_or_else(|| {
            ApiError::from(SealtrackError::Validation(format!(
                "unknown status {raw:?}"
            )))
        })?),
    };

    Ok(SealFilter {
        status,
        search: query.search.clone().filter(|s| !s.is_empty()),
        assigned_to: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_parses_all_sentinels() {
        for raw in [None, Some(""), Some("all"), Some("สถานะทั้งหมด")] {
            let query = ListQuery {
                status: raw.map(str::to_string),
                search: None,
            };
            assert!(parse_filter(&query).unwrap().status.is_none());
        }
    }

    #[test]
    fn filter_accepts_both_status_forms() {
        for raw in ["ready", "พร้อมใช้งาน"] {
            let query = ListQuery {
                status: Some(raw.into()),
                search: None,
            };
            assert_eq!(
                parse_filter(&query).unwrap().status,
                Some(SealStatus::Ready)
            );
        }
    }

    #[test]
    fn filter_rejects_unknown_status() {
        let query = ListQuery {
            status: Some("pending".into()),
            search: None,
        };
        assert!(parse_filter(&query).is_err());
    }
}
