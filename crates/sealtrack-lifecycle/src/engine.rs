// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Lifecycle engine — validates and applies seal status transitions.
//
// Transition table:
//
//   (none)            batch-create  -> ready      "Created"
//   ready             assign        -> issued     "Assigned"
//   issued            install       -> installed  "Installed"   binds serial
//   installed         complete      -> used       "Returned"
//   installed | used  cancel        -> ready      "Cancelled"   clears serial
//
// A transition and its log entry commit in one transaction; a rejected
// transition writes nothing.  The status update is a compare-and-swap
// pinned on the status observed at precondition time, so concurrent
// requests racing on one seal serialize to exactly one winner without a
// lock spanning unrelated seals.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use sealtrack_core::error::Result;
use sealtrack_core::{
    ActorId, Seal, SealStatus, SealtrackError, TechnicianLookup, Transition, TransitionKind,
};

use crate::audit;
use crate::policy::{AllowAll, TransitionPolicy};
use crate::registry::{self, AssigneeChange, SerialChange};
use crate::store::{SealStore, db_err};

/// The authoritative seal state machine.
///
/// `SealStore` is `Send` but not `Sync`, so it sits behind a mutex; the
/// engine is cheap to clone via `Arc` and safe to share across request
/// handlers.
pub struct LifecycleEngine {
    store: Arc<Mutex<SealStore>>,
    technicians: Arc<dyn TechnicianLookup>,
    policy: Arc<dyn TransitionPolicy>,
}

impl LifecycleEngine {
    /// Engine with the default allow-all policy.
    pub fn new(store: Arc<Mutex<SealStore>>, technicians: Arc<dyn TechnicianLookup>) -> Self {
        Self::with_policy(store, technicians, Arc::new(AllowAll))
    }

    /// Engine with an injected authorization policy.
    pub fn with_policy(
        store: Arc<Mutex<SealStore>>,
        technicians: Arc<dyn TechnicianLookup>,
        policy: Arc<dyn TransitionPolicy>,
    ) -> Self {
        Self {
            store,
            technicians,
            policy,
        }
    }

    /// Whether `from` is a valid source status for the transition.
    fn accepts(from: SealStatus, transition: &Transition) -> bool {
        match transition {
            Transition::Assign { .. } => from == SealStatus::Ready,
            Transition::Install { .. } => from == SealStatus::Issued,
            Transition::Complete => from == SealStatus::Installed,
            Transition::Cancel => {
                from == SealStatus::Installed || from == SealStatus::Used
            }
        }
    }

    fn target(transition: &Transition) -> SealStatus {
        match transition {
            Transition::Assign { .. } => SealStatus::Issued,
            Transition::Install { .. } => SealStatus::Installed,
            Transition::Complete => SealStatus::Used,
            Transition::Cancel => SealStatus::Ready,
        }
    }

    /// Apply one transition to one seal.
    ///
    /// On success the updated seal is returned and exactly one log entry
    /// has been appended.  A rejected transition leaves both the registry
    /// and the log untouched.
    #[instrument(skip(self, remark), fields(%actor, seal_number))]
    pub fn apply(
        &self,
        actor: &ActorId,
        seal_number: &str,
        transition: Transition,
        remark: Option<&str>,
    ) -> Result<Seal> {
        // Precondition read under its own lock scope.  The write below
        // re-checks the status via compare-and-swap, so the lock need not
        // span the directory lookup or policy call.
        let seal = {
            let store = self.store.lock().expect("seal store lock poisoned");
            store.get_seal(seal_number)?
        };
        if !Self::accepts(seal.status, &transition) {
            debug!(from = %seal.status, requested = transition.action_label(), "transition rejected");
            return Err(SealtrackError::InvalidTransition {
                seal_number: seal_number.to_string(),
                from: seal.status,
                requested: transition.action_label(),
            });
        }
        if !self.policy.allow(actor, Some(&seal), transition.kind()) {
            return Err(SealtrackError::Forbidden {
                actor: actor.to_string(),
                action: transition.action_label(),
            });
        }

        let context = match &transition {
            Transition::Assign { technician_code } => {
                let technician = self
                    .technicians
                    .find_by_code(technician_code)?
                    .ok_or_else(|| {
                        SealtrackError::NotFound(format!("technician {technician_code}"))
                    })?;
                Some(format!("technician {}", technician.technician_code))
            }
            Transition::Install { serial } => Some(format!("serial {serial}")),
            Transition::Complete | Transition::Cancel => None,
        };
        let details = join_details(context, remark);

        let serial_change = match &transition {
            Transition::Install { serial } => SerialChange::Set(serial.clone()),
            Transition::Cancel => SerialChange::Clear,
            _ => SerialChange::Keep,
        };
        let assignee_change = match &transition {
            Transition::Assign { technician_code } => {
                AssigneeChange::Set(technician_code.clone())
            }
            Transition::Cancel => AssigneeChange::Clear,
            _ => AssigneeChange::Keep,
        };

        let now = Utc::now();
        let next = Self::target(&transition);

        let mut store = self.store.lock().expect("seal store lock poisoned");
        let tx = store.conn.transaction().map_err(db_err)?;
        let hit = registry::cas_status_tx(
            &tx,
            seal_number,
            seal.status,
            next,
            serial_change,
            assignee_change,
            now,
        )?;
        if hit == 0 {
            // Lost the race between the precondition read and the swap.
            drop(tx);
            return match store.try_get_seal(seal_number)? {
                Some(current) => {
                    warn!(expected = %seal.status, actual = %current.status, "concurrent transition won");
                    Err(SealtrackError::Conflict {
                        seal_number: seal_number.to_string(),
                        expected: seal.status,
                        actual: current.status,
                    })
                }
                None => Err(SealtrackError::NotFound(format!("seal {seal_number}"))),
            };
        }
        audit::append_log_tx(
            &tx,
            seal_number,
            actor,
            transition.action_label(),
            details.as_deref(),
            now,
        )?;
        tx.commit().map_err(db_err)?;

        info!(from = %seal.status, to = %next, "seal transition applied");
        store.get_seal(seal_number)
    }

    /// Create `count` sequential seals starting at `start`, all `ready`.
    ///
    /// The numeric suffix of `start` is incremented per seal and
    /// zero-padded to the input width.  The whole batch is one
    /// transaction: any duplicate number rolls everything back.
    #[instrument(skip(self), fields(%actor, start, count))]
    pub fn create_batch(
        &self,
        actor: &ActorId,
        start: &str,
        count: u32,
        box_number: Option<String>,
    ) -> Result<Vec<Seal>> {
        if count == 0 {
            return Err(SealtrackError::Validation(
                "count must be a positive integer".into(),
            ));
        }
        let (prefix, base, width) = split_seal_number(start).ok_or_else(|| {
            SealtrackError::Validation(format!(
                "seal number {start:?} must end in a numeric suffix"
            ))
        })?;

        if !self.policy.allow(actor, None, TransitionKind::Create) {
            return Err(SealtrackError::Forbidden {
                actor: actor.to_string(),
                action: "Created",
            });
        }

        let numbers: Vec<String> = (0..u64::from(count))
            .map(|i| format_seal_number(prefix, base + i, width))
            .collect();

        let mut store = self.store.lock().expect("seal store lock poisoned");
        let tx = store.conn.transaction().map_err(db_err)?;

        for number in &numbers {
            if registry::seal_exists_tx(&tx, number)? {
                return Err(SealtrackError::Validation(format!(
                    "seal {number} already exists"
                )));
            }
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(numbers.len());
        for number in &numbers {
            let mut seal = Seal::new(number.clone(), box_number.clone());
            seal.created_at = now;
            seal.updated_at = now;
            registry::insert_seal_tx(&tx, &seal)?;
            audit::append_log_tx(&tx, number, actor, "Created", box_number.as_deref(), now)?;
            created.push(seal);
        }
        tx.commit().map_err(db_err)?;

        info!(count = created.len(), "seal batch created");
        Ok(created)
    }

    /// Run a closure against the underlying store, for read paths.
    ///
    /// Holds the store lock for the duration of the closure so multi-query
    /// reads see one consistent state.
    pub fn with_store<T>(&self, f: impl FnOnce(&SealStore) -> Result<T>) -> Result<T> {
        let store = self.store.lock().expect("seal store lock poisoned");
        f(&store)
    }

    pub(crate) fn technicians(&self) -> &Arc<dyn TechnicianLookup> {
        &self.technicians
    }
}

/// Split a seal number into prefix, numeric suffix value, and suffix width.
///
/// `"F0001"` -> `("F", 1, 4)`.  Returns `None` when there is no trailing
/// digit.
fn split_seal_number(number: &str) -> Option<(&str, u64, usize)> {
    let digits_start = number
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    let (prefix, digits) = number.split_at(digits_start);
    let value: u64 = digits.parse().ok()?;
    Some((prefix, value, digits.len()))
}

/// Rebuild a seal number from its parts, zero-padding to `width`.  Values
/// that outgrow the width simply take more digits.
fn format_seal_number(prefix: &str, value: u64, width: usize) -> String {
    format!("{prefix}{value:0width$}")
}

fn join_details(context: Option<String>, remark: Option<&str>) -> Option<String> {
    match (context, remark) {
        (Some(c), Some(r)) => Some(format!("{c}; {r}")),
        (Some(c), None) => Some(c),
        (None, Some(r)) => Some(r.to_string()),
        (None, None) => None,
    }
}
