//! Year-end performance evaluation approval workflow
//!
//! A department drafts its annual self-assessment, submits it, and the
//! record climbs a fixed approval chain (director, then two senior sign-offs)
//! until it is completed. Any approver may send it back to draft with
//! comments. [`WorkflowEngine`] enforces the chain; [`ProgressAggregator`]
//! reports how far an organization has got.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod progress;
pub mod scenario;
pub mod state_machine;
pub mod store;
pub mod test_harness;
pub mod workflow;

pub use config::{CompletionWeights, EngineConfig};
pub use error::*;
pub use events::{MemorySink, RejectionEvent, RejectionSink};
pub use logging::{AuditEvent, AuditLog};
pub use progress::{DepartmentProgress, ProgressAggregator, ProgressReport, ProgressSnapshot, StatusCounts};
pub use store::{EvaluationAggregate, EvaluationRecordStore, InMemoryRecordStore};
pub use workflow::WorkflowEngine;

/// Re-export test harness for external use
pub use test_harness::{run_simulator, SimulatorConfig, TestHarness};

/// Common imports for callers driving the workflow
pub mod prelude {
    pub use crate::{
        EngineConfig, EvaluationRecordStore, InMemoryRecordStore, Operation, ProgressAggregator,
        RejectionSink, WorkflowEngine, WorkflowError,
    };
    pub use perfeval_model::{
        Actor, ActorRole, CriteriaAnswers, CriterionQuestion, Department, DepartmentId,
        EvaluationRecord, EvaluationStatus, FiscalYear, InMemoryDirectory, Indicator,
        IndicatorAnswers, NarrativeFields, OrganizationId, RecordId,
    };
}
