// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Assignment batcher — bulk issue of seals to one technician.
//
// `check_seals` is the read-only probe the client uses to colour staged
// rows; `assign_by_technician` commits the batch best-effort, reporting
// per-seal failures instead of failing the whole request.

use tracing::{info, instrument};

use sealtrack_core::error::Result;
use sealtrack_core::{
    ActorId, AssignFailure, AssignOutcome, CheckOutcome, SealStatus, SealtrackError, Transition,
};

use crate::engine::LifecycleEngine;

impl LifecycleEngine {
    /// Availability probe: which of these numbers are currently `ready`?
    ///
    /// Read-only; missing, soft-deleted, and non-ready seals all land in
    /// `unavailable`.
    #[instrument(skip(self, numbers), fields(count = numbers.len()))]
    pub fn check_seals(&self, numbers: &[String]) -> Result<CheckOutcome> {
        self.with_store(|store| {
            let mut outcome = CheckOutcome::default();
            for number in numbers {
                match store.try_get_seal(number)? {
                    Some(seal) if seal.status == SealStatus::Ready => {
                        outcome.found.push(number.clone());
                    }
                    _ => outcome.unavailable.push(number.clone()),
                }
            }
            Ok(outcome)
        })
    }

    /// Issue every listed seal to the technician, best-effort.
    ///
    /// The technician code is resolved once up front; an unknown code
    /// fails the whole request.  Per-seal transition failures (already
    /// issued, missing, lost race) are collected into the outcome while
    /// the remaining seals proceed.  Storage-level failures abort.
    #[instrument(skip(self, numbers, remark), fields(%actor, technician_code, count = numbers.len()))]
    pub fn assign_by_technician(
        &self,
        actor: &ActorId,
        technician_code: &str,
        numbers: &[String],
        remark: Option<&str>,
    ) -> Result<AssignOutcome> {
        if numbers.is_empty() {
            return Err(SealtrackError::Validation(
                "no seal numbers to assign".into(),
            ));
        }
        let technician = self
            .technicians()
            .find_by_code(technician_code)?
            .ok_or_else(|| SealtrackError::NotFound(format!("technician {technician_code}")))?;

        let mut outcome = AssignOutcome::default();
        for number in numbers {
            let transition = Transition::Assign {
                technician_code: technician.technician_code.clone(),
            };
            match self.apply(actor, number, transition, remark) {
                Ok(_) => outcome.succeeded.push(number.clone()),
                Err(
                    e @ (SealtrackError::NotFound(_)
                    | SealtrackError::InvalidTransition { .. }
                    | SealtrackError::Conflict { .. }),
                ) => outcome.failed.push(AssignFailure {
                    seal_number: number.clone(),
                    code: e.code().to_string(),
                    message: e.to_string(),
                }),
                Err(e) => return Err(e),
            }
        }

        info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "bulk assignment committed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::test_engine;

    fn staff() -> ActorId {
        ActorId::new("staff:admin")
    }

    fn numbers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn check_reports_ready_and_unavailable() {
        let engine = test_engine();
        engine.create_batch(&staff(), "F0001", 2, None).unwrap();

        let before = engine.check_seals(&numbers(&["F0001", "F0002"])).unwrap();
        assert_eq!(before.found, vec!["F0001", "F0002"]);
        assert!(before.unavailable.is_empty());

        engine
            .assign_by_technician(&staff(), "T-100", &numbers(&["F0001"]), None)
            .unwrap();

        let after = engine.check_seals(&numbers(&["F0001", "F0002"])).unwrap();
        assert_eq!(after.found, vec!["F0002"]);
        assert_eq!(after.unavailable, vec!["F0001"]);
    }

    #[test]
    fn check_counts_missing_numbers_as_unavailable() {
        let engine = test_engine();
        engine.create_batch(&staff(), "F0001", 1, None).unwrap();

        let outcome = engine.check_seals(&numbers(&["F0001", "F9999"])).unwrap();
        assert_eq!(outcome.found, vec!["F0001"]);
        assert_eq!(outcome.unavailable, vec!["F9999"]);
    }

    #[test]
    fn assign_is_best_effort_per_seal() {
        let engine = test_engine();
        engine.create_batch(&staff(), "F0001", 2, None).unwrap();

        // F0001 goes to another technician first.
        engine
            .assign_by_technician(&staff(), "T-200", &numbers(&["F0001"]), None)
            .unwrap();

        let outcome = engine
            .assign_by_technician(&staff(), "T-100", &numbers(&["F0001", "F0002"]), None)
            .unwrap();
        assert_eq!(outcome.succeeded, vec!["F0002"]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].seal_number, "F0001");
        assert_eq!(outcome.failed[0].code, "invalid_transition");
    }

    #[test]
    fn assign_to_unknown_technician_fails_wholly() {
        let engine = test_engine();
        engine.create_batch(&staff(), "F0001", 1, None).unwrap();

        let err = engine
            .assign_by_technician(&staff(), "T-999", &numbers(&["F0001"]), None)
            .unwrap_err();
        assert!(matches!(err, SealtrackError::NotFound(_)));

        // Nothing was issued.
        let check = engine.check_seals(&numbers(&["F0001"])).unwrap();
        assert_eq!(check.found, vec!["F0001"]);
    }

    #[test]
    fn empty_batch_is_validation_error() {
        let engine = test_engine();
        let err = engine
            .assign_by_technician(&staff(), "T-100", &[], None)
            .unwrap_err();
        assert!(matches!(err, SealtrackError::Validation(_)));
    }

    #[test]
    fn missing_seal_is_reported_per_element() {
        let engine = test_engine();
        engine.create_batch(&staff(), "F0001", 1, None).unwrap();

        let outcome = engine
            .assign_by_technician(&staff(), "T-100", &numbers(&["F0001", "F9999"]), None)
            .unwrap();
        assert_eq!(outcome.succeeded, vec!["F0001"]);
        assert_eq!(outcome.failed[0].seal_number, "F9999");
        assert_eq!(outcome.failed[0].code, "not_found");
    }
}
