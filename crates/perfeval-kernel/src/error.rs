//! Error types for the evaluation workflow
//!
//! Every workflow failure is recoverable at the caller: the engine commits
//! nothing when it returns an error, so the record is exactly as it was.

use perfeval_model::{ActorRole, DepartmentId, EvaluationStatus, RecordId, RecordKey, UserId};

/// Workflow operation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// An evaluation already exists for this (organization, year, department)
    #[error("evaluation already exists for {key} (record {existing})")]
    DuplicateRecord { key: RecordKey, existing: RecordId },

    /// Operation is not legal in the record's current status
    #[error("cannot {operation} record {record_id} in status {status}")]
    InvalidState {
        record_id: RecordId,
        operation: Operation,
        status: EvaluationStatus,
    },

    /// Actor's role or department does not permit the operation
    #[error("{actor} is not allowed to {operation}: {reason}")]
    Unauthorized {
        actor: UserId,
        operation: Operation,
        reason: DenialReason,
    },

    /// Malformed input
    #[error("invalid argument `{field}`: {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },

    /// Unknown record, department, indicator or user
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl WorkflowError {
    /// Fieldless classification
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateRecord { .. } => ErrorKind::DuplicateRecord,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Workflow errors never poison the process
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }

    #[inline]
    pub fn record_not_found(id: RecordId) -> Self {
        Self::NotFound {
            entity: "record",
            id: id.to_string(),
        }
    }

    #[inline]
    pub fn invalid_argument(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            message: message.into(),
        }
    }
}

/// Error category without context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateRecord,
    InvalidState,
    Unauthorized,
    InvalidArgument,
    NotFound,
}

/// Workflow operation names, used in errors, logs and the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    SaveDraft,
    EditAnswer,
    Submit,
    Approve,
    Reject,
}

impl Operation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::SaveDraft => "save_draft",
            Operation::EditAnswer => "edit_answer",
            Operation::Submit => "submit",
            Operation::Approve => "approve",
            Operation::Reject => "reject",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an actor was turned away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// Actor is not a member of the record's department
    WrongDepartment { required: DepartmentId },
    /// Stage requires a different role
    WrongRole {
        required: ActorRole,
        actual: ActorRole,
    },
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::WrongDepartment { required } => {
                write!(f, "actor does not belong to department {required}")
            }
            DenialReason::WrongRole { required, actual } => {
                write!(f, "requires role {required}, actor is {actual}")
            }
        }
    }
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Audit log errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    #[error("audit log hash chain broken at entry {index}")]
    IntegrityViolation { index: usize },
}
