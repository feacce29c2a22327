use chrono::NaiveDateTime;

use super::status::{Decision, RequestStatus};

/// Exact supervisor-step fields of a request before the override synthesized
/// anything, captured so a failed finalize can put them back verbatim,
/// including "absent" values.
#[derive(Debug, Clone, PartialEq)]
pub struct SupervisorSnapshot {
    pub status: RequestStatus,
    pub approver_id: Option<u64>,
    pub approved_at: Option<NaiveDateTime>,
    pub remarks: Option<String>,
}

/// Phase of the administrative override. The flow spans two transactions
/// (synthesize supervisor approval, then HR finalize) bridged in the
/// application, so the phase is tracked explicitly instead of being
/// inferred from request fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverridePhase {
    NotStarted,
    SupervisorSynthesized,
    Finalized,
    RolledBack,
}

#[derive(Debug)]
pub struct OverrideSaga {
    phase: OverridePhase,
    snapshot: Option<SupervisorSnapshot>,
}

impl OverrideSaga {
    pub fn new() -> Self {
        Self {
            phase: OverridePhase::NotStarted,
            snapshot: None,
        }
    }

    pub fn phase(&self) -> OverridePhase {
        self.phase
    }

    /// Record that step 1 wrote a synthesized supervisor approval, together
    /// with the pre-write field values.
    pub fn supervisor_synthesized(&mut self, snapshot: SupervisorSnapshot) {
        self.phase = OverridePhase::SupervisorSynthesized;
        self.snapshot = Some(snapshot);
    }

    pub fn finalized(&mut self) {
        self.phase = OverridePhase::Finalized;
    }

    /// Only a synthesized-but-not-finalized override needs compensation.
    /// A request that was already supervisor-approved skipped step 1 and
    /// has nothing to roll back.
    pub fn needs_rollback(&self) -> bool {
        self.phase == OverridePhase::SupervisorSynthesized
    }

    pub fn rollback_snapshot(&self) -> Option<&SupervisorSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn rolled_back(&mut self) {
        self.phase = OverridePhase::RolledBack;
    }
}

impl Default for OverrideSaga {
    fn default() -> Self {
        Self::new()
    }
}

/// Remarks written onto the synthesized supervisor step. Approve- and
/// reject-bound overrides must stay distinguishable in the record.
pub fn synthesized_supervisor_remarks(decision: Decision) -> String {
    match decision {
        Decision::Approve => {
            "Supervisor step completed by administrative override (for approval)".to_string()
        }
        Decision::Reject => {
            "Supervisor step completed by administrative override (for rejection)".to_string()
        }
    }
}

/// Remarks recorded on the HR finalize performed by the override actor.
pub fn override_final_remarks(decision: Decision, supplied: Option<&str>) -> String {
    let base = match decision {
        Decision::Approve => "Approved via administrative override",
        Decision::Reject => "Rejected via administrative override",
    };
    match supplied {
        Some(extra) if !extra.trim().is_empty() => format!("{base}: {extra}"),
        _ => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot() -> SupervisorSnapshot {
        SupervisorSnapshot {
            status: RequestStatus::Pending,
            approver_id: None,
            approved_at: None,
            remarks: None,
        }
    }

    #[test]
    fn fresh_saga_needs_no_rollback() {
        let saga = OverrideSaga::new();
        assert_eq!(saga.phase(), OverridePhase::NotStarted);
        assert!(!saga.needs_rollback());
        assert!(saga.rollback_snapshot().is_none());
    }

    #[test]
    fn synthesized_saga_exposes_the_snapshot_until_finalized() {
        let mut saga = OverrideSaga::new();
        saga.supervisor_synthesized(snapshot());
        assert_eq!(saga.phase(), OverridePhase::SupervisorSynthesized);
        assert!(saga.needs_rollback());
        assert_eq!(saga.rollback_snapshot(), Some(&snapshot()));

        saga.finalized();
        assert_eq!(saga.phase(), OverridePhase::Finalized);
        assert!(!saga.needs_rollback());
    }

    #[test]
    fn rolled_back_saga_stops_demanding_compensation() {
        let mut saga = OverrideSaga::new();
        saga.supervisor_synthesized(snapshot());
        saga.rolled_back();
        assert_eq!(saga.phase(), OverridePhase::RolledBack);
        assert!(!saga.needs_rollback());
    }

    #[test]
    fn snapshot_preserves_existing_supervisor_fields() {
        let approved_at = NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let snap = SupervisorSnapshot {
            status: RequestStatus::Pending,
            approver_id: Some(77),
            approved_at: Some(approved_at),
            remarks: Some("queued for review".to_string()),
        };
        let mut saga = OverrideSaga::new();
        saga.supervisor_synthesized(snap.clone());
        assert_eq!(saga.rollback_snapshot(), Some(&snap));
    }

    #[test]
    fn override_remarks_distinguish_the_decision() {
        let approve = synthesized_supervisor_remarks(Decision::Approve);
        let reject = synthesized_supervisor_remarks(Decision::Reject);
        assert_ne!(approve, reject);
        assert!(approve.contains("override"));

        assert_eq!(
            override_final_remarks(Decision::Reject, Some("policy lapse")),
            "Rejected via administrative override: policy lapse"
        );
        assert_eq!(
            override_final_remarks(Decision::Approve, None),
            "Approved via administrative override"
        );
    }
}
