//! Workflow status and actor role enums
//!
//! The serialized names are normative: every persistence or transport layer
//! must carry exactly these strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Approval status of an evaluation record
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// Being written by the department (initial, and after any rejection)
    #[default]
    Draft,
    /// Waiting for the department director
    Submitted,
    /// Waiting for the first senior approval
    DirectorApproved,
    /// Waiting for the final senior sign-off
    AdminApproved,
    /// Terminal
    Completed,
}

impl EvaluationStatus {
    /// Every status in pipeline order
    pub const ALL: [EvaluationStatus; 5] = [
        EvaluationStatus::Draft,
        EvaluationStatus::Submitted,
        EvaluationStatus::DirectorApproved,
        EvaluationStatus::AdminApproved,
        EvaluationStatus::Completed,
    ];

    /// Normative wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationStatus::Draft => "draft",
            EvaluationStatus::Submitted => "submitted",
            EvaluationStatus::DirectorApproved => "director_approved",
            EvaluationStatus::AdminApproved => "admin_approved",
            EvaluationStatus::Completed => "completed",
        }
    }

    /// Position in the pipeline, `draft` = 0
    #[must_use]
    pub fn stage(self) -> u8 {
        match self {
            EvaluationStatus::Draft => 0,
            EvaluationStatus::Submitted => 1,
            EvaluationStatus::DirectorApproved => 2,
            EvaluationStatus::AdminApproved => 3,
            EvaluationStatus::Completed => 4,
        }
    }

    /// Narrative fields and indicator answers are writable
    #[inline]
    #[must_use]
    pub fn is_editable(self) -> bool {
        self == EvaluationStatus::Draft
    }

    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == EvaluationStatus::Completed
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Unrecognized status or role string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for EvaluationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EvaluationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Role of an acting user, as reported by the role resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActorRole {
    /// Drafts and submits the department's evaluation
    Contributor,
    /// Approves or rejects submitted evaluations
    Director,
    /// Approves or rejects director-approved evaluations and signs off
    SeniorApprover,
}

impl ActorRole {
    pub const ALL: [ActorRole; 3] = [
        ActorRole::Contributor,
        ActorRole::Director,
        ActorRole::SeniorApprover,
    ];

    /// Normative wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActorRole::Contributor => "contributor",
            ActorRole::Director => "director",
            ActorRole::SeniorApprover => "senior-approver",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActorRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "role",
                value: s.to_string(),
            })
    }
}
