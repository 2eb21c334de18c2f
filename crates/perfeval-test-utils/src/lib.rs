//! Testing utilities for the perfeval workspace
//!
//! Shared fixtures built on the demo organization, plus answer helpers.

#![allow(missing_docs)]

use perfeval_kernel::scenario::{self, DEMO_ORGANIZATION, DEMO_YEAR};
use perfeval_kernel::{EngineConfig, InMemoryRecordStore, MemorySink, WorkflowEngine};
use perfeval_model::{
    Actor, CriteriaAnswers, CriterionQuestion, DepartmentId, EvaluationRecord, FiscalYear,
    InMemoryDirectory, IndicatorAnswers, IndicatorId, NarrativeFields, OrganizationId, RecordId,
};
use std::sync::Arc;

pub use scenario::{contributor, director, senior_approver, DEMO_DEPARTMENTS, DEMO_INDICATORS};

/// Engine over the demo directory with a collecting rejection sink
pub struct TestWorld {
    pub engine: Arc<WorkflowEngine>,
    pub store: Arc<InMemoryRecordStore>,
    pub directory: Arc<InMemoryDirectory>,
    pub sink: Arc<MemorySink>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let store = Arc::new(InMemoryRecordStore::new());
        let directory = Arc::new(scenario::demo_directory());
        let sink = Arc::new(MemorySink::new());
        let engine = WorkflowEngine::with_config(
            store.clone(),
            directory.clone(),
            directory.clone(),
            config,
        )
        .with_sink(sink.clone());

        Self {
            engine: Arc::new(engine),
            store,
            directory,
            sink,
        }
    }

    pub fn org(&self) -> OrganizationId {
        OrganizationId::new(DEMO_ORGANIZATION)
    }

    pub fn year(&self) -> FiscalYear {
        FiscalYear(DEMO_YEAR)
    }

    pub fn department_ids(&self) -> Vec<DepartmentId> {
        self.directory.department_ids(&self.org())
    }

    /// Fresh draft for `department`, created by its contributor
    pub fn start(&self, department: &str) -> EvaluationRecord {
        self.engine
            .create(&self.org(), self.year(), &department.into(), &contributor(department))
            .unwrap()
    }

    /// Draft with narrative and answers for every demo indicator
    pub fn filled_draft(&self, department: &str) -> EvaluationRecord {
        let record = self.start(department);
        self.engine
            .save_draft(record.id, sample_narrative(), &sample_answers(), &contributor(department))
            .unwrap()
    }

    pub fn submitted(&self, department: &str) -> EvaluationRecord {
        let record = self.filled_draft(department);
        self.engine.submit(record.id, &contributor(department)).unwrap()
    }

    pub fn director_approved(&self, department: &str) -> EvaluationRecord {
        let record = self.submitted(department);
        self.engine.approve(record.id, &director()).unwrap()
    }

    pub fn admin_approved(&self, department: &str) -> EvaluationRecord {
        let record = self.director_approved(department);
        self.engine.approve(record.id, &senior_approver()).unwrap()
    }

    pub fn completed(&self, department: &str) -> EvaluationRecord {
        let record = self.admin_approved(department);
        self.engine.approve(record.id, &senior_approver()).unwrap()
    }

    pub fn status_of(&self, id: RecordId) -> perfeval_model::EvaluationStatus {
        self.engine.record(id).unwrap().status
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Contributor of `department` acting from another department's seat
pub fn outsider(department: &str) -> Actor {
    let mut actor = contributor(department);
    actor.department_id = DepartmentId::new("elsewhere");
    actor
}

pub fn sample_narrative() -> NarrativeFields {
    NarrativeFields::new()
        .with_summary("steady year")
        .with_achievements("new permit portal")
        .with_challenges("two vacancies")
        .with_recommendations("automate reporting")
}

/// Two answered questions per demo indicator
pub fn sample_answers() -> Vec<IndicatorAnswers> {
    DEMO_INDICATORS
        .iter()
        .map(|(id, _, _)| {
            IndicatorAnswers::new(
                *id,
                CriteriaAnswers::new()
                    .with(CriterionQuestion::TargetAchieved, "achieved")
                    .with(CriterionQuestion::Risks, "budget freeze"),
            )
        })
        .collect()
}

pub fn first_indicator() -> IndicatorId {
    IndicatorId::new(DEMO_INDICATORS[0].0)
}
