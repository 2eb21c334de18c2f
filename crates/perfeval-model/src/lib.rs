//! Perfeval Model - year-end performance evaluation data model
//!
//! Defines the types every layer around the workflow must agree on:
//! - Identifiers and the record uniqueness key
//! - The closed status and role enums with their normative wire names
//! - The fixed evaluation criteria catalog
//! - Evaluation records, indicator evaluations and transition history
//! - Read-only collaborator interfaces (departments, indicators, roles)

#![allow(missing_docs)]

pub mod criteria;
pub mod directory;
pub mod ids;
pub mod record;
pub mod status;

pub use criteria::{CriteriaAnswers, CriteriaCategory, CriterionQuestion};
pub use directory::{
    Actor, Department, DepartmentDirectory, InMemoryDirectory, Indicator, IndicatorCatalog,
    RoleResolver,
};
pub use ids::{DepartmentId, FiscalYear, IndicatorId, OrganizationId, RecordId, RecordKey, UserId};
pub use record::{
    EvaluationRecord, IndicatorAnswers, IndicatorEvaluation, NarrativeFields, Stamp,
    TransitionEntry,
};
pub use status::{ActorRole, EvaluationStatus, ParseEnumError};
