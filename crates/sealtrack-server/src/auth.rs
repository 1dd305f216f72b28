// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Bearer-token sessions.
//
// Tokens are opaque UUIDs held in memory; a restart invalidates every
// session.  The actor id stored in a session is what the lifecycle
// engine attributes in log entries: `staff:<username>` or
// `technician:<code>`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use sealtrack_core::ActorId;

use crate::wire::ApiError;

/// Who the bearer of a token is acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Staff,
    Technician,
}

/// An issued bearer token and the identity behind it.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub actor: ActorId,
    pub role: Role,
    pub display_name: String,
    pub expires_at: DateTime<Utc>,
}

/// In-memory session registry, cheap to clone across handlers.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_hours: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl: Duration::hours(ttl_hours as i64),
        }
    }

    /// Issue a fresh token for the given identity.
    pub fn issue(&self, actor: ActorId, role: Role, display_name: &str) -> Session {
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            actor,
            role,
            display_name: display_name.to_string(),
            expires_at: Utc::now() + self.ttl,
        };
        let mut sessions = self.inner.lock().expect("session lock poisoned");
        sessions.insert(session.token.clone(), session.clone());
        debug!(actor = %session.actor, "session issued");
        session
    }

    /// Resolve the `Authorization: Bearer` header to a live session.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Session, ApiError> {
        let token = bearer_token(headers)
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;

        let mut sessions = self.inner.lock().expect("session lock poisoned");
        match sessions.get(token) {
            Some(session) if session.expires_at > Utc::now() => Ok(session.clone()),
            Some(_) => {
                sessions.remove(token);
                Err(ApiError::unauthorized("session expired"))
            }
            None => Err(ApiError::unauthorized("unknown token")),
        }
    }

    /// As `authenticate`, but additionally requires the staff role.
    pub fn authenticate_staff(&self, headers: &HeaderMap) -> Result<Session, ApiError> {
        let session = self.authenticate(headers)?;
        if session.role != Role::Staff {
            return Err(ApiError::forbidden("staff credentials required"));
        }
        Ok(session)
    }

    /// As `authenticate`, but additionally requires the technician role.
    pub fn authenticate_technician(&self, headers: &HeaderMap) -> Result<Session, ApiError> {
        let session = self.authenticate(headers)?;
        if session.role != Role::Technician {
            return Err(ApiError::forbidden("technician credentials required"));
        }
        Ok(session)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        headers
    }

    #[test]
    fn issue_then_authenticate() {
        let store = SessionStore::new(24);
        let session = store.issue(ActorId::new("staff:admin"), Role::Staff, "Administrator");

        let resolved = store.authenticate(&headers_with(&session.token)).unwrap();
        assert_eq!(resolved.actor, session.actor);
        assert_eq!(resolved.role, Role::Staff);
    }

    #[test]
    fn unknown_token_is_unauthorized() {
        let store = SessionStore::new(24);
        let err = store
            .authenticate(&headers_with("no-such-token"))
            .unwrap_err();
        assert_eq!(err.code, "unauthorized");
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let store = SessionStore::new(24);
        let err = store.authenticate(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, "unauthorized");
    }

    #[test]
    fn role_gates() {
        let store = SessionStore::new(24);
        let tech = store.issue(
            ActorId::new("technician:T-100"),
            Role::Technician,
            "Somchai",
        );

        let headers = headers_with(&tech.token);
        assert!(store.authenticate_technician(&headers).is_ok());
        let err = store.authenticate_staff(&headers).unwrap_err();
        assert_eq!(err.code, "forbidden");
    }

    #[test]
    fn expired_session_is_rejected_and_pruned() {
        let store = SessionStore::new(0);
        let session = store.issue(ActorId::new("staff:admin"), Role::Staff, "Administrator");

        let err = store
            .authenticate(&headers_with(&session.token))
            .unwrap_err();
        assert_eq!(err.code, "unauthorized");

        // A second attempt hits the pruned path.
        let err = store
            .authenticate(&headers_with(&session.token))
            .unwrap_err();
        assert_eq!(err.message, "unknown token");
    }
}
