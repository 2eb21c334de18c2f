//! Scripted demo round
//!
//! Five departments of one organization at different stages of the approval
//! chain. Used by the `perfeval scenario` command and as fixture data.

use perfeval_model::{
    Actor, ActorRole, CriteriaAnswers, CriterionQuestion, Department, FiscalYear,
    InMemoryDirectory, Indicator, IndicatorAnswers, NarrativeFields, OrganizationId, RecordId,
    RoleResolver, UserId,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::WorkflowError;
use crate::events::{MemorySink, RejectionEvent};
use crate::progress::ProgressReport;
use crate::store::InMemoryRecordStore;
use crate::workflow::WorkflowEngine;

pub const DEMO_ORGANIZATION: &str = "city-hall";
pub const DEMO_YEAR: i32 = 2024;
/// Department approvers sit in; not part of the evaluation round
pub const EXECUTIVE_OFFICE: &str = "executive-office";

pub const DEMO_DEPARTMENTS: [(&str, &str); 5] = [
    ("finance", "Finance"),
    ("roads", "Roads and Transport"),
    ("parks", "Parks"),
    ("health", "Public Health"),
    ("education", "Education"),
];

pub const DEMO_INDICATORS: [(&str, &str, &str); 3] = [
    ("ind-budget", "K1", "Budget execution rate"),
    ("ind-service", "K2", "Service requests closed on time"),
    ("ind-training", "K3", "Staff training hours"),
];

/// Contributor of a demo department, e.g. `finance-contributor`
pub fn contributor(department: &str) -> Actor {
    Actor::new(format!("{department}-contributor"), ActorRole::Contributor, department)
}

pub fn director() -> Actor {
    Actor::new("director", ActorRole::Director, EXECUTIVE_OFFICE)
}

pub fn senior_approver() -> Actor {
    Actor::new("senior-approver", ActorRole::SeniorApprover, EXECUTIVE_OFFICE)
}

/// Directory with the demo organization, its indicator catalog and one
/// actor per role
pub fn demo_directory() -> InMemoryDirectory {
    let directory = InMemoryDirectory::new();
    for (id, name) in DEMO_DEPARTMENTS {
        directory.add_department(Department::new(id, DEMO_ORGANIZATION, name));
        directory.add_actor(contributor(id));
    }
    for (id, code, name) in DEMO_INDICATORS {
        directory.add_indicator(DEMO_ORGANIZATION, Indicator::new(id, code, name));
    }
    directory.add_actor(director());
    directory.add_actor(senior_approver());
    directory
}

/// Look up who `user_id` is acting as
///
/// # Errors
/// `NotFound` when the resolver does not know the user.
pub fn sign_in(resolver: &dyn RoleResolver, user_id: &str) -> Result<Actor, WorkflowError> {
    let user_id = UserId::new(user_id);
    resolver.resolve(&user_id).ok_or_else(|| WorkflowError::NotFound {
        entity: "user",
        id: user_id.to_string(),
    })
}

/// What the scripted round left behind
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub report: ProgressReport,
    pub rejections: Vec<RejectionEvent>,
    pub audit_events: usize,
    pub audit_chain_intact: bool,
}

/// Run the demo round on a fresh in-memory engine
///
/// Finance and roads complete, parks waits on the director, health is sent
/// back by the senior approver and education never starts.
pub fn run_demo_scenario(config: EngineConfig) -> Result<ScenarioOutcome, WorkflowError> {
    let directory = Arc::new(demo_directory());
    let sink = Arc::new(MemorySink::new());
    let engine = WorkflowEngine::with_config(
        Arc::new(InMemoryRecordStore::new()),
        directory.clone(),
        directory.clone(),
        config,
    )
    .with_sink(sink.clone());

    let director = sign_in(&*directory, "director")?;
    let senior = sign_in(&*directory, "senior-approver")?;
    let org = OrganizationId::new(DEMO_ORGANIZATION);
    let year = FiscalYear(DEMO_YEAR);

    for department in ["finance", "roads"] {
        let id = draft_and_submit(&engine, &*directory, &org, year, department)?;
        engine.approve(id, &director)?;
        engine.approve(id, &senior)?;
        engine.approve(id, &senior)?;
    }

    draft_and_submit(&engine, &*directory, &org, year, "parks")?;

    let health = draft_and_submit(&engine, &*directory, &org, year, "health")?;
    engine.approve(health, &director)?;
    engine.reject(health, &senior, "missing Q3 data")?;

    let report = engine.report(&org, year);
    info!(
        completed = report.snapshot.counts.completed,
        percentage = report.snapshot.completion_percentage,
        "demo scenario finished"
    );

    Ok(ScenarioOutcome {
        report,
        rejections: sink.events(),
        audit_events: engine.audit_log().len(),
        audit_chain_intact: engine.audit_log().verify_integrity().is_ok(),
    })
}

fn draft_and_submit(
    engine: &WorkflowEngine,
    resolver: &dyn RoleResolver,
    org: &OrganizationId,
    year: FiscalYear,
    department: &str,
) -> Result<RecordId, WorkflowError> {
    let author = sign_in(resolver, &format!("{department}-contributor"))?;
    let record = engine.create(org, year, &department.into(), &author)?;

    let answers: Vec<IndicatorAnswers> = DEMO_INDICATORS
        .iter()
        .map(|(id, _, _)| {
            IndicatorAnswers::new(
                *id,
                CriteriaAnswers::new()
                    .with(CriterionQuestion::TargetAchieved, "target met")
                    .with(CriterionQuestion::ContinuationPlan, "continue next year"),
            )
        })
        .collect();
    engine.save_draft(
        record.id,
        NarrativeFields::new()
            .with_summary(format!("{department} year in review"))
            .with_achievements("all scheduled projects delivered"),
        &answers,
        &author,
    )?;

    engine.submit(record.id, &author)?;
    Ok(record.id)
}
