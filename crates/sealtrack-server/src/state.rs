// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Shared application state for the HTTP handlers.
//
// The seal store is `Send` but not `Sync`, so it sits behind a mutex
// inside the engine; everything here is cheaply cloneable (Arc-wrapped)
// for axum's state extractor.

use std::sync::{Arc, Mutex};

use sealtrack_core::AppConfig;
use sealtrack_directory::TechnicianDirectory;
use sealtrack_lifecycle::{LifecycleEngine, SealStore};

use crate::auth::SessionStore;
use crate::policy::RolePolicy;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LifecycleEngine>,
    pub directory: Arc<TechnicianDirectory>,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, store: SealStore, directory: TechnicianDirectory) -> Self {
        let directory = Arc::new(directory);
        let engine = LifecycleEngine::with_policy(
            Arc::new(Mutex::new(store)),
            directory.clone(),
            Arc::new(RolePolicy),
        );
        let sessions = SessionStore::new(config.session_ttl_hours);

        Self {
            engine: Arc::new(engine),
            directory,
            sessions,
            config: Arc::new(config),
        }
    }

    /// State over in-memory databases (useful for tests).
    #[cfg(test)]
    pub fn in_memory() -> Self {
        let store = SealStore::open_in_memory().expect("open in-memory store");
        let directory = TechnicianDirectory::open_in_memory().expect("open in-memory directory");
        Self::new(AppConfig::default(), store, directory)
    }
}
