//! Evaluation approval state machine
//!
//! Both directions are plain data. `approve` walks [`FORWARD`], `reject` walks
//! [`REJECT`]; each row names the one role allowed to act at that stage.
//! Adding a stage or changing who signs it off is a table edit.

use perfeval_model::{ActorRole, EvaluationStatus};

use crate::error::{DenialReason, Operation};

/// One legal edge of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: EvaluationStatus,
    pub role: ActorRole,
    pub to: EvaluationStatus,
}

const fn rule(from: EvaluationStatus, role: ActorRole, to: EvaluationStatus) -> TransitionRule {
    TransitionRule { from, role, to }
}

/// Approval edges
pub const FORWARD: &[TransitionRule] = &[
    rule(EvaluationStatus::Submitted, ActorRole::Director, EvaluationStatus::DirectorApproved),
    rule(EvaluationStatus::DirectorApproved, ActorRole::SeniorApprover, EvaluationStatus::AdminApproved),
    rule(EvaluationStatus::AdminApproved, ActorRole::SeniorApprover, EvaluationStatus::Completed),
];

/// Rejection edges, all back to draft
pub const REJECT: &[TransitionRule] = &[
    rule(EvaluationStatus::Submitted, ActorRole::Director, EvaluationStatus::Draft),
    rule(EvaluationStatus::DirectorApproved, ActorRole::SeniorApprover, EvaluationStatus::Draft),
];

/// Why a table lookup failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionDenied {
    /// No edge leaves `from` for this operation
    NoEdge,
    /// An edge exists but belongs to another role
    Role(DenialReason),
}

fn table(operation: Operation) -> &'static [TransitionRule] {
    match operation {
        Operation::Approve => FORWARD,
        Operation::Reject => REJECT,
        _ => &[],
    }
}

/// Edge leaving `from` for `operation`, regardless of role
#[must_use]
pub fn rule_for(operation: Operation, from: EvaluationStatus) -> Option<TransitionRule> {
    table(operation).iter().copied().find(|r| r.from == from)
}

/// Resolve the target status for `operation` performed by `role` on a record
/// in status `from`.
///
/// The status check comes first: asking for an edge that does not exist is a
/// state error no matter who asks.
pub fn resolve(
    operation: Operation,
    from: EvaluationStatus,
    role: ActorRole,
) -> Result<TransitionRule, TransitionDenied> {
    let rule = rule_for(operation, from).ok_or(TransitionDenied::NoEdge)?;
    if rule.role != role {
        return Err(TransitionDenied::Role(DenialReason::WrongRole {
            required: rule.role,
            actual: role,
        }));
    }
    Ok(rule)
}

/// Every status reachable from `from` in one step, by any operation
#[must_use]
pub fn allowed_transitions(from: EvaluationStatus) -> Vec<EvaluationStatus> {
    match from {
        EvaluationStatus::Draft => vec![EvaluationStatus::Submitted],
        _ => FORWARD
            .iter()
            .chain(REJECT)
            .filter(|r| r.from == from)
            .map(|r| r.to)
            .collect(),
    }
}

/// Check a single observed status change against the machine
#[must_use]
pub fn is_legal_step(from: EvaluationStatus, to: EvaluationStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_chain_visits_every_stage_once() {
        let mut status = EvaluationStatus::Submitted;
        let mut visited = vec![status];
        while let Some(rule) = rule_for(Operation::Approve, status) {
            status = rule.to;
            visited.push(status);
        }
        assert_eq!(
            visited,
            vec![
                EvaluationStatus::Submitted,
                EvaluationStatus::DirectorApproved,
                EvaluationStatus::AdminApproved,
                EvaluationStatus::Completed,
            ]
        );
    }

    #[test]
    fn senior_approver_cannot_take_directors_stage() {
        let denied = resolve(
            Operation::Approve,
            EvaluationStatus::Submitted,
            ActorRole::SeniorApprover,
        )
        .unwrap_err();
        assert_eq!(
            denied,
            TransitionDenied::Role(DenialReason::WrongRole {
                required: ActorRole::Director,
                actual: ActorRole::SeniorApprover,
            })
        );
    }

    #[test]
    fn no_edges_leave_draft_or_completed_via_approval() {
        for role in ActorRole::ALL {
            assert_eq!(
                resolve(Operation::Approve, EvaluationStatus::Draft, role),
                Err(TransitionDenied::NoEdge)
            );
            assert_eq!(
                resolve(Operation::Approve, EvaluationStatus::Completed, role),
                Err(TransitionDenied::NoEdge)
            );
        }
    }

    #[test]
    fn admin_approved_cannot_be_rejected() {
        assert_eq!(
            resolve(
                Operation::Reject,
                EvaluationStatus::AdminApproved,
                ActorRole::SeniorApprover
            ),
            Err(TransitionDenied::NoEdge)
        );
    }

    #[test]
    fn completed_is_terminal() {
        assert!(allowed_transitions(EvaluationStatus::Completed).is_empty());
        assert!(!is_legal_step(EvaluationStatus::Submitted, EvaluationStatus::AdminApproved));
        assert!(is_legal_step(EvaluationStatus::DirectorApproved, EvaluationStatus::Draft));
    }
}
