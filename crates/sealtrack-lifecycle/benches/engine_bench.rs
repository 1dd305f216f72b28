// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Criterion benchmarks for the lifecycle engine.  Measures batch creation
// plus a full assign/install/complete walk against an in-memory store,
// the hot path of a busy issuing counter.

use std::sync::{Arc, Mutex};

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use sealtrack_core::error::Result;
use sealtrack_core::{ActorId, Technician, TechnicianLookup, Transition};
use sealtrack_lifecycle::{LifecycleEngine, SealStore};

struct OneTechnician;

impl TechnicianLookup for OneTechnician {
    fn find_by_code(&self, code: &str) -> Result<Option<Technician>> {
        Ok(Some(Technician {
            id: 1,
            technician_code: code.to_string(),
            first_name: "Somchai".into(),
            last_name: "Jaidee".into(),
            company_name: "Provincial Electric".into(),
            department: "Metering".into(),
            phone_number: "081-000-0000".into(),
            email: "somchai@example.com".into(),
        }))
    }
}

fn fresh_engine() -> LifecycleEngine {
    let store = Arc::new(Mutex::new(
        SealStore::open_in_memory().expect("open in-memory store"),
    ));
    LifecycleEngine::new(store, Arc::new(OneTechnician))
}

fn bench_batch_create(c: &mut Criterion) {
    c.bench_function("create_batch (100 seals)", |b| {
        b.iter(|| {
            let engine = fresh_engine();
            let actor = ActorId::new("staff:bench");
            let created = engine
                .create_batch(&actor, black_box("B0001"), black_box(100), None)
                .expect("create");
            black_box(created);
        });
    });
}

fn bench_lifecycle_walk(c: &mut Criterion) {
    c.bench_function("assign+install+complete (1 seal)", |b| {
        b.iter(|| {
            let engine = fresh_engine();
            let actor = ActorId::new("staff:bench");
            engine
                .create_batch(&actor, "W0001", 1, None)
                .expect("create");
            engine
                .apply(
                    &actor,
                    "W0001",
                    Transition::Assign {
                        technician_code: "T-100".into(),
                    },
                    None,
                )
                .expect("assign");
            engine
                .apply(
                    &actor,
                    "W0001",
                    Transition::Install {
                        serial: "MTR-1".into(),
                    },
                    None,
                )
                .expect("install");
            let done = engine
                .apply(&actor, "W0001", Transition::Complete, None)
                .expect("complete");
            black_box(done);
        });
    });
}

criterion_group!(benches, bench_batch_create, bench_lifecycle_walk);
criterion_main!(benches);
