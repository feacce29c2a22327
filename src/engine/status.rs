use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Shared lifecycle of leave and overtime requests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    SupervisorApproved,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Approved | RequestStatus::Rejected | RequestStatus::Cancelled
        )
    }

    /// True while the request still holds a ledger reservation (paid leave
    /// only). Releases are gated on this, never on ledger state.
    pub fn holds_reservation(self) -> bool {
        matches!(
            self,
            RequestStatus::Pending | RequestStatus::SupervisorApproved
        )
    }

    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (
                RequestStatus::Pending,
                RequestStatus::SupervisorApproved
                    | RequestStatus::Rejected
                    | RequestStatus::Cancelled,
            ) | (
                RequestStatus::SupervisorApproved,
                RequestStatus::Approved | RequestStatus::Rejected,
            )
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestKind {
    Leave,
    Overtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Terminal status an HR finalize lands on.
    pub fn final_status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

/// The attempted step was not legal from the request's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: RequestStatus,
}

/// Supervisor step: approve forwards the request to HR, reject ends it.
pub fn supervisor_decision(
    current: RequestStatus,
    decision: Decision,
) -> Result<RequestStatus, TransitionError> {
    if current != RequestStatus::Pending {
        return Err(TransitionError { from: current });
    }
    Ok(match decision {
        Decision::Approve => RequestStatus::SupervisorApproved,
        Decision::Reject => RequestStatus::Rejected,
    })
}

/// HR finalize: only a supervisor-approved request can be finalized.
pub fn hr_decision(
    current: RequestStatus,
    decision: Decision,
) -> Result<RequestStatus, TransitionError> {
    if current != RequestStatus::SupervisorApproved {
        return Err(TransitionError { from: current });
    }
    Ok(decision.final_status())
}

/// Employee-initiated cancellation. Deliberately narrow: once a supervisor
/// has acted, only HR can reverse the request.
pub fn cancel(current: RequestStatus) -> Result<RequestStatus, TransitionError> {
    if current != RequestStatus::Pending {
        return Err(TransitionError { from: current });
    }
    Ok(RequestStatus::Cancelled)
}

/// Queue triage band for the combined approval queue. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// HIGH after 72 hours sitting at supervisor approval, MEDIUM after 24;
/// an item missing its supervisor timestamp lands in the middle band.
pub fn classify_priority(
    supervisor_approved_at: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Priority {
    match supervisor_approved_at {
        None => Priority::Medium,
        Some(approved_at) => {
            let waited_hours = (now - approved_at).num_hours();
            if waited_hours >= 72 {
                Priority::High
            } else if waited_hours >= 24 {
                Priority::Medium
            } else {
                Priority::Low
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    const ALL: [RequestStatus; 5] = [
        RequestStatus::Pending,
        RequestStatus::SupervisorApproved,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Cancelled,
    ];

    #[test]
    fn pending_reaches_exactly_three_states() {
        for next in ALL {
            let legal = RequestStatus::Pending.can_transition_to(next);
            let expected = matches!(
                next,
                RequestStatus::SupervisorApproved
                    | RequestStatus::Rejected
                    | RequestStatus::Cancelled
            );
            assert_eq!(legal, expected, "pending -> {next}");
        }
    }

    #[test]
    fn supervisor_approved_reaches_exactly_two_states() {
        for next in ALL {
            let legal = RequestStatus::SupervisorApproved.can_transition_to(next);
            let expected = matches!(next, RequestStatus::Approved | RequestStatus::Rejected);
            assert_eq!(legal, expected, "supervisor_approved -> {next}");
        }
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for from in [
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
        ] {
            assert!(from.is_terminal());
            for next in ALL {
                assert!(!from.can_transition_to(next), "{from} -> {next}");
            }
        }
    }

    #[test]
    fn cancel_is_pending_only() {
        assert_eq!(cancel(RequestStatus::Pending), Ok(RequestStatus::Cancelled));
        assert!(cancel(RequestStatus::SupervisorApproved).is_err());
        assert!(cancel(RequestStatus::Approved).is_err());
    }

    #[test]
    fn supervisor_and_hr_steps_agree_with_the_table() {
        assert_eq!(
            supervisor_decision(RequestStatus::Pending, Decision::Approve),
            Ok(RequestStatus::SupervisorApproved)
        );
        assert_eq!(
            supervisor_decision(RequestStatus::Pending, Decision::Reject),
            Ok(RequestStatus::Rejected)
        );
        assert!(supervisor_decision(RequestStatus::Approved, Decision::Approve).is_err());

        assert_eq!(
            hr_decision(RequestStatus::SupervisorApproved, Decision::Approve),
            Ok(RequestStatus::Approved)
        );
        assert_eq!(
            hr_decision(RequestStatus::SupervisorApproved, Decision::Reject),
            Ok(RequestStatus::Rejected)
        );
        assert_eq!(
            hr_decision(RequestStatus::Pending, Decision::Approve),
            Err(TransitionError {
                from: RequestStatus::Pending
            })
        );
    }

    #[test]
    fn status_strings_round_trip() {
        assert_eq!(RequestStatus::SupervisorApproved.to_string(), "supervisor_approved");
        assert_eq!(
            "supervisor_approved".parse::<RequestStatus>().unwrap(),
            RequestStatus::SupervisorApproved
        );
        assert_eq!("cancelled".parse::<RequestStatus>().unwrap(), RequestStatus::Cancelled);
    }

    fn at(h: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            + Duration::hours(h)
    }

    #[test]
    fn priority_bands() {
        let now = at(100);
        assert_eq!(classify_priority(Some(at(100 - 73)), now), Priority::High);
        assert_eq!(classify_priority(Some(at(100 - 72)), now), Priority::High);
        assert_eq!(classify_priority(Some(at(100 - 71)), now), Priority::Medium);
        assert_eq!(classify_priority(Some(at(100 - 24)), now), Priority::Medium);
        assert_eq!(classify_priority(Some(at(100 - 23)), now), Priority::Low);
        assert_eq!(classify_priority(Some(at(100)), now), Priority::Low);
        assert_eq!(classify_priority(None, now), Priority::Medium);
    }

    #[test]
    fn priority_orders_high_first_when_sorted_descending() {
        let mut bands = [Priority::Medium, Priority::High, Priority::Low];
        bands.sort_by(|a, b| b.cmp(a));
        assert_eq!(bands, [Priority::High, Priority::Medium, Priority::Low]);
    }
}
