// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Injectable authorization hook consulted by the lifecycle engine.
//
// The engine itself never hardcodes who may trigger which transition;
// role-based restriction lives in whatever policy the host installs.

use sealtrack_core::{ActorId, Seal, TransitionKind};

/// Decides whether an actor may perform a transition.
///
/// `seal` is `None` for batch creation, where no seal exists yet.
pub trait TransitionPolicy: Send + Sync {
    fn allow(&self, actor: &ActorId, seal: Option<&Seal>, kind: TransitionKind) -> bool;
}

/// Default policy: any authenticated actor may perform any transition.
pub struct AllowAll;

impl TransitionPolicy for AllowAll {
    fn allow(&self, _actor: &ActorId, _seal: Option<&Seal>, _kind: TransitionKind) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_all_allows_everything() {
        let policy = AllowAll;
        let actor = ActorId::new("anyone");
        assert!(policy.allow(&actor, None, TransitionKind::Create));
        assert!(policy.allow(&actor, None, TransitionKind::Cancel));
    }
}
