// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Login endpoints.  Staff accounts come from the config file; technician
// credentials live in the directory.

use axum::Json;
use axum::extract::State;
use tracing::{info, warn};

use sealtrack_core::ActorId;

use crate::auth::Role;
use crate::routes::join_err;
use crate::state::AppState;
use crate::wire::{
    ApiError, ApiResult, LoginRequest, LoginResponse, LoginUser, TechnicianLoginRequest,
};

pub async fn staff_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let account = state
        .config
        .staff_accounts
        .iter()
        .find(|a| a.username == request.username && a.password == request.password)
        .ok_or_else(|| {
            warn!(username = %request.username, "staff login rejected");
            ApiError::unauthorized("invalid username or password")
        })?;

    let actor = ActorId::new(format!("staff:{}", account.username));
    let session = state
        .sessions
        .issue(actor, Role::Staff, &account.display_name);

    info!(username = %account.username, "staff login");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".into(),
        user: LoginUser {
            username: account.username.clone(),
            role: account.role.clone(),
            name: session.display_name.clone(),
            email: account.email.clone(),
        },
        token: session.token,
    }))
}

pub async fn technician_login(
    State(state): State<AppState>,
    Json(request): Json<TechnicianLoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let directory = state.directory.clone();
    let code = request.technician_code.clone();
    let technician = tokio::task::spawn_blocking(move || {
        directory.verify_login(&code, &request.password)
    })
    .await
    .map_err(join_err)??
    .ok_or_else(|| {
        warn!(code = %request.technician_code, "technician login rejected");
        ApiError::unauthorized("invalid technician credentials")
    })?;

    let actor = ActorId::new(format!("technician:{}", technician.technician_code));
    let display_name = format!("{} {}", technician.first_name, technician.last_name);
    let session = state.sessions.issue(actor, Role::Technician, &display_name);

    info!(code = %technician.technician_code, "technician login");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".into(),
        user: LoginUser {
            username: technician.technician_code,
            role: "technician".into(),
            name: session.display_name.clone(),
            email: technician.email,
        },
        token: session.token,
    }))
}
