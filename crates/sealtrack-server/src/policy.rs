// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Role policy installed into the lifecycle engine.
//
// Actor ids are minted by the auth layer as `staff:<username>` or
// `technician:<code>`, so the role is recoverable from the id without
// the engine ever seeing a session.

use sealtrack_core::{ActorId, Seal, TransitionKind};
use sealtrack_lifecycle::TransitionPolicy;

/// Staff create, assign, and cancel; install and return are open to
/// technicians and staff alike.
pub struct RolePolicy;

impl TransitionPolicy for RolePolicy {
    fn allow(&self, actor: &ActorId, _seal: Option<&Seal>, kind: TransitionKind) -> bool {
        let is_staff = actor.0.starts_with("staff:");
        match kind {
            TransitionKind::Create | TransitionKind::Assign | TransitionKind::Cancel => is_staff,
            TransitionKind::Install | TransitionKind::Complete => true,
        }
    }
}
