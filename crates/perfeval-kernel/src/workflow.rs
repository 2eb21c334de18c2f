//! Evaluation workflow engine
//!
//! The engine is the only component that changes a record's status. Every
//! state-changing call runs inside [`EvaluationRecordStore::modify`], so the
//! status check, the authorization check and the write happen under the same
//! per-record lock, and a failed call commits nothing.
//!
//! ```text
//! draft --submit--> submitted --approve(director)--> director_approved
//!   ^                   |                                  |
//!   +---reject(director)+        approve(senior-approver)  |
//!   +-------------------reject(senior-approver)------------+
//!                                                          v
//!        completed <--approve(senior-approver)-- admin_approved
//! ```

use perfeval_model::{
    Actor, CriterionQuestion, DepartmentDirectory, DepartmentId, EvaluationRecord,
    EvaluationStatus, FiscalYear, IndicatorAnswers, IndicatorCatalog, IndicatorEvaluation,
    IndicatorId, NarrativeFields, OrganizationId, RecordId, RecordKey, Stamp, TransitionEntry,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{DenialReason, Operation, WorkflowError};
use crate::events::{RejectionEvent, RejectionSink};
use crate::logging::{AuditEvent, AuditLog};
use crate::progress::{ProgressAggregator, ProgressReport, ProgressSnapshot};
use crate::state_machine::{self, TransitionDenied};
use crate::store::{EvaluationAggregate, EvaluationRecordStore};

/// Year-end evaluation approval workflow
pub struct WorkflowEngine {
    store: Arc<dyn EvaluationRecordStore>,
    directory: Arc<dyn DepartmentDirectory>,
    catalog: Arc<dyn IndicatorCatalog>,
    config: EngineConfig,
    audit: AuditLog,
    sinks: Vec<Arc<dyn RejectionSink>>,
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("records", &self.store.len())
            .field("config", &self.config)
            .field("audit_events", &self.audit.len())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl WorkflowEngine {
    /// Engine with default configuration
    pub fn new(
        store: Arc<dyn EvaluationRecordStore>,
        directory: Arc<dyn DepartmentDirectory>,
        catalog: Arc<dyn IndicatorCatalog>,
    ) -> Self {
        Self::with_config(store, directory, catalog, EngineConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn EvaluationRecordStore>,
        directory: Arc<dyn DepartmentDirectory>,
        catalog: Arc<dyn IndicatorCatalog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            directory,
            catalog,
            config,
            audit: AuditLog::default(),
            sinks: Vec::new(),
        }
    }

    /// Register a rejection notification sink
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn RejectionSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Start a department's evaluation for a fiscal year
    ///
    /// # Errors
    /// - `NotFound` if the directory does not know the department
    /// - `InvalidArgument` if the department belongs to another organization
    /// - `Unauthorized` if the actor is not a member of the department
    /// - `DuplicateRecord` if the evaluation already exists
    pub fn create(
        &self,
        organization_id: &OrganizationId,
        fiscal_year: FiscalYear,
        department_id: &DepartmentId,
        actor: &Actor,
    ) -> Result<EvaluationRecord, WorkflowError> {
        let department = self
            .directory
            .department(department_id)
            .ok_or_else(|| WorkflowError::NotFound {
                entity: "department",
                id: department_id.to_string(),
            })?;

        if &department.organization_id != organization_id {
            return Err(WorkflowError::invalid_argument(
                "department_id",
                format!(
                    "department {department_id} belongs to organization {}",
                    department.organization_id
                ),
            ));
        }

        if !actor.belongs_to(department_id) {
            return Err(self.deny(
                actor,
                Operation::Create,
                DenialReason::WrongDepartment {
                    required: department_id.clone(),
                },
            ));
        }

        let key = RecordKey {
            organization_id: organization_id.clone(),
            fiscal_year,
            department_id: department_id.clone(),
        };
        let record = EvaluationRecord::new(key, actor.id.clone());
        let mut aggregate = EvaluationAggregate::new(record);
        aggregate.history.push(entry(actor, None, EvaluationStatus::Draft, None));

        let record = self.store.insert(aggregate).map_err(|err| {
            warn!(department = %department_id, year = %fiscal_year, error = %err, "evaluation not created");
            err
        })?;

        self.audit(&record, actor, Operation::Create, None, None);
        info!(
            record_id = %record.id,
            department = %department_id,
            year = %fiscal_year,
            actor = %actor.id,
            "evaluation started"
        );
        Ok(record)
    }

    /// Save narrative and indicator answers of a draft
    ///
    /// Indicators whose answers are all blank are skipped. Status is left
    /// unchanged.
    ///
    /// # Errors
    /// - `NotFound` for an unknown record
    /// - `InvalidState` unless the record is `draft`
    /// - `Unauthorized` if the actor is not a member of the department
    /// - `InvalidArgument` for an indicator outside the organization's catalog
    pub fn save_draft(
        &self,
        record_id: RecordId,
        narrative: NarrativeFields,
        answers: &[IndicatorAnswers],
        actor: &Actor,
    ) -> Result<EvaluationRecord, WorkflowError> {
        let committed = self.store.modify(record_id, &mut |agg| {
            ensure_status(agg, Operation::SaveDraft, EvaluationStatus::Draft)?;
            self.ensure_member(agg, actor, Operation::SaveDraft)?;
            for submitted in answers {
                self.check_indicator(&agg.record.organization_id, &submitted.indicator_id)?;
            }
            agg.record.narrative = narrative.clone();
            agg.upsert_answers(answers)?;
            Ok(())
        })?;

        debug!(record_id = %record_id, indicators = committed.indicators.len(), "draft saved");
        Ok(committed.record)
    }

    /// Write a single criteria answer, creating the indicator evaluation on
    /// first edit
    ///
    /// # Errors
    /// Same as [`save_draft`](Self::save_draft).
    pub fn edit_answer(
        &self,
        record_id: RecordId,
        indicator_id: &IndicatorId,
        question: CriterionQuestion,
        text: &str,
        actor: &Actor,
    ) -> Result<IndicatorEvaluation, WorkflowError> {
        let mut written = None;
        self.store.modify(record_id, &mut |agg| {
            ensure_status(agg, Operation::EditAnswer, EvaluationStatus::Draft)?;
            self.ensure_member(agg, actor, Operation::EditAnswer)?;
            self.check_indicator(&agg.record.organization_id, indicator_id)?;
            written = Some(agg.set_answer(indicator_id, question, text)?);
            Ok(())
        })?;

        debug!(record_id = %record_id, indicator = %indicator_id, question = %question, "answer saved");
        written.ok_or_else(|| WorkflowError::record_not_found(record_id))
    }

    /// Hand a draft to the director
    ///
    /// # Errors
    /// - `NotFound` for an unknown record
    /// - `InvalidState` unless the record is `draft`
    /// - `Unauthorized` if the actor is not a member of the department
    pub fn submit(&self, record_id: RecordId, actor: &Actor) -> Result<EvaluationRecord, WorkflowError> {
        let committed = self
            .store
            .modify(record_id, &mut |agg| {
                ensure_status(agg, Operation::Submit, EvaluationStatus::Draft)?;
                self.ensure_member(agg, actor, Operation::Submit)?;

                agg.record.status = EvaluationStatus::Submitted;
                agg.record.submitted = Some(Stamp::now(actor.id.clone()));
                self.record_transition(agg, actor, Operation::Submit, EvaluationStatus::Draft, None);
                Ok(())
            })
            .map_err(|err| self.log_denied(record_id, actor, Operation::Submit, err))?;

        info!(record_id = %record_id, actor = %actor.id, "evaluation submitted");
        Ok(committed.record)
    }

    /// Move the record one stage forward
    ///
    /// | current | required role | next |
    /// |---|---|---|
    /// | submitted | director | director_approved |
    /// | director_approved | senior-approver | admin_approved |
    /// | admin_approved | senior-approver | completed |
    ///
    /// # Errors
    /// - `NotFound` for an unknown record
    /// - `InvalidState` when no approval leaves the current status
    /// - `Unauthorized` when the stage belongs to another role
    pub fn approve(&self, record_id: RecordId, actor: &Actor) -> Result<EvaluationRecord, WorkflowError> {
        let committed = self
            .store
            .modify(record_id, &mut |agg| {
                let from = agg.record.status;
                let rule = state_machine::resolve(Operation::Approve, from, actor.role)
                    .map_err(|denied| self.transition_error(agg, actor, Operation::Approve, denied))?;

                let stamp = Some(Stamp::now(actor.id.clone()));
                match rule.to {
                    EvaluationStatus::DirectorApproved => agg.record.director_approved = stamp,
                    EvaluationStatus::AdminApproved => agg.record.admin_approved = stamp,
                    EvaluationStatus::Completed => agg.record.completed = stamp,
                    EvaluationStatus::Draft | EvaluationStatus::Submitted => {}
                }
                agg.record.status = rule.to;
                self.record_transition(agg, actor, Operation::Approve, from, None);
                Ok(())
            })
            .map_err(|err| self.log_denied(record_id, actor, Operation::Approve, err))?;

        info!(
            record_id = %record_id,
            actor = %actor.id,
            role = %actor.role,
            status = %committed.record.status,
            "evaluation approved"
        );
        Ok(committed.record)
    }

    /// Send the record back to draft with comments
    ///
    /// Narrative and indicator answers are kept so the department can revise
    /// rather than re-enter. Only the status and the comments field of the
    /// rejecting stage change.
    ///
    /// # Errors
    /// - `NotFound` for an unknown record
    /// - `InvalidState` unless the record is `submitted` or `director_approved`
    /// - `Unauthorized` when the stage belongs to another role
    /// - `InvalidArgument` for blank or over-long comments
    pub fn reject(
        &self,
        record_id: RecordId,
        actor: &Actor,
        comments: &str,
    ) -> Result<EvaluationRecord, WorkflowError> {
        let committed = self
            .store
            .modify(record_id, &mut |agg| {
                let from = agg.record.status;
                let rule = state_machine::resolve(Operation::Reject, from, actor.role)
                    .map_err(|denied| self.transition_error(agg, actor, Operation::Reject, denied))?;
                self.check_comments(comments)?;

                match from {
                    EvaluationStatus::Submitted => {
                        agg.record.director_comments = Some(comments.to_string());
                    }
                    EvaluationStatus::DirectorApproved => {
                        agg.record.admin_comments = Some(comments.to_string());
                    }
                    _ => {}
                }
                agg.record.status = rule.to;
                self.record_transition(agg, actor, Operation::Reject, from, Some(comments));
                Ok(())
            })
            .map_err(|err| self.log_denied(record_id, actor, Operation::Reject, err))?;

        let event = RejectionEvent {
            record_id,
            department_id: committed.record.department_id.clone(),
            rejected_by: actor.id.clone(),
            rejected_by_role: actor.role,
            comments: comments.to_string(),
        };
        for sink in &self.sinks {
            sink.on_rejection(&event);
        }

        warn!(
            record_id = %record_id,
            actor = %actor.id,
            role = %actor.role,
            "evaluation rejected back to draft"
        );
        Ok(committed.record)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// # Errors
    /// - `NotFound` for an unknown record
    pub fn record(&self, record_id: RecordId) -> Result<EvaluationRecord, WorkflowError> {
        self.store.get_by_id(record_id)
    }

    pub fn find(
        &self,
        organization_id: &OrganizationId,
        fiscal_year: FiscalYear,
        department_id: &DepartmentId,
    ) -> Option<EvaluationRecord> {
        self.store.get(&RecordKey {
            organization_id: organization_id.clone(),
            fiscal_year,
            department_id: department_id.clone(),
        })
    }

    pub fn records_for_year(
        &self,
        organization_id: &OrganizationId,
        fiscal_year: FiscalYear,
    ) -> Vec<EvaluationRecord> {
        self.store.list_by_fiscal_year(organization_id, fiscal_year)
    }

    /// # Errors
    /// - `NotFound` for an unknown record
    pub fn indicator_evaluations(&self, record_id: RecordId) -> Result<Vec<IndicatorEvaluation>, WorkflowError> {
        self.store.indicator_evaluations(record_id)
    }

    /// # Errors
    /// - `NotFound` for an unknown record
    pub fn history(&self, record_id: RecordId) -> Result<Vec<TransitionEntry>, WorkflowError> {
        self.store.history(record_id)
    }

    /// Operations `actor` may perform on the record right now
    ///
    /// # Errors
    /// - `NotFound` for an unknown record
    pub fn allowed_actions(&self, record_id: RecordId, actor: &Actor) -> Result<Vec<Operation>, WorkflowError> {
        let record = self.store.get_by_id(record_id)?;
        let mut actions = Vec::new();

        if record.is_editable() && actor.belongs_to(&record.department_id) {
            actions.extend([Operation::SaveDraft, Operation::EditAnswer, Operation::Submit]);
        }
        for operation in [Operation::Approve, Operation::Reject] {
            if state_machine::resolve(operation, record.status, actor.role).is_ok() {
                actions.push(operation);
            }
        }
        Ok(actions)
    }

    /// Progress over an explicit department list
    pub fn summarize(
        &self,
        organization_id: &OrganizationId,
        fiscal_year: FiscalYear,
        department_ids: &[DepartmentId],
    ) -> ProgressSnapshot {
        let records = self.records_for_year(organization_id, fiscal_year);
        self.aggregator()
            .summarize(organization_id, fiscal_year, department_ids, &records)
    }

    /// Progress over every department the directory lists for the
    /// organization, with per-department rows
    pub fn report(&self, organization_id: &OrganizationId, fiscal_year: FiscalYear) -> ProgressReport {
        let department_ids: Vec<DepartmentId> = self
            .directory
            .departments(organization_id)
            .into_iter()
            .map(|d| d.id)
            .collect();
        let records = self.records_for_year(organization_id, fiscal_year);
        self.aggregator().report(
            organization_id,
            fiscal_year,
            &department_ids,
            &records,
            self.directory.as_ref(),
        )
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn aggregator(&self) -> ProgressAggregator {
        ProgressAggregator::new(self.config.completion_weights)
    }

    fn check_indicator(
        &self,
        organization_id: &OrganizationId,
        indicator_id: &IndicatorId,
    ) -> Result<(), WorkflowError> {
        if self.config.validate_indicators && !self.catalog.contains(organization_id, indicator_id) {
            return Err(WorkflowError::invalid_argument(
                "indicator_id",
                format!("indicator {indicator_id} is not in the catalog of {organization_id}"),
            ));
        }
        Ok(())
    }

    fn check_comments(&self, comments: &str) -> Result<(), WorkflowError> {
        if comments.trim().is_empty() {
            return Err(WorkflowError::invalid_argument(
                "comments",
                "rejection requires comments",
            ));
        }
        if comments.chars().count() > self.config.max_comment_len {
            return Err(WorkflowError::invalid_argument(
                "comments",
                format!("longer than {} characters", self.config.max_comment_len),
            ));
        }
        Ok(())
    }

    fn ensure_member(
        &self,
        agg: &EvaluationAggregate,
        actor: &Actor,
        operation: Operation,
    ) -> Result<(), WorkflowError> {
        if actor.belongs_to(&agg.record.department_id) {
            Ok(())
        } else {
            Err(self.deny(
                actor,
                operation,
                DenialReason::WrongDepartment {
                    required: agg.record.department_id.clone(),
                },
            ))
        }
    }

    fn deny(&self, actor: &Actor, operation: Operation, reason: DenialReason) -> WorkflowError {
        WorkflowError::Unauthorized {
            actor: actor.id.clone(),
            operation,
            reason,
        }
    }

    fn transition_error(
        &self,
        agg: &EvaluationAggregate,
        actor: &Actor,
        operation: Operation,
        denied: TransitionDenied,
    ) -> WorkflowError {
        match denied {
            TransitionDenied::NoEdge => WorkflowError::InvalidState {
                record_id: agg.record.id,
                operation,
                status: agg.record.status,
            },
            TransitionDenied::Role(reason) => self.deny(actor, operation, reason),
        }
    }

    /// Append history and audit entries for a status change that is about
    /// to be committed. Runs under the record lock, so both logs see a
    /// record's transitions in commit order.
    fn record_transition(
        &self,
        agg: &mut EvaluationAggregate,
        actor: &Actor,
        operation: Operation,
        from: EvaluationStatus,
        comments: Option<&str>,
    ) {
        let to = agg.record.status;
        agg.history
            .push(entry(actor, Some(from), to, comments.map(str::to_string)));
        self.audit(&agg.record, actor, operation, Some(from), comments);
    }

    fn audit(
        &self,
        record: &EvaluationRecord,
        actor: &Actor,
        operation: Operation,
        from: Option<EvaluationStatus>,
        comments: Option<&str>,
    ) {
        if !self.config.audit_log {
            return;
        }
        self.audit.append(AuditEvent::new(
            record.id,
            record.department_id.clone(),
            actor.id.clone(),
            actor.role,
            operation,
            from,
            record.status,
            comments.map(str::to_string),
        ));
    }

    fn log_denied(
        &self,
        record_id: RecordId,
        actor: &Actor,
        operation: Operation,
        err: WorkflowError,
    ) -> WorkflowError {
        warn!(
            record_id = %record_id,
            actor = %actor.id,
            role = %actor.role,
            operation = %operation,
            error = %err,
            "workflow operation refused"
        );
        err
    }
}

fn ensure_status(
    agg: &EvaluationAggregate,
    operation: Operation,
    required: EvaluationStatus,
) -> Result<(), WorkflowError> {
    if agg.record.status == required {
        Ok(())
    } else {
        Err(WorkflowError::InvalidState {
            record_id: agg.record.id,
            operation,
            status: agg.record.status,
        })
    }
}

fn entry(
    actor: &Actor,
    from: Option<EvaluationStatus>,
    to: EvaluationStatus,
    comments: Option<String>,
) -> TransitionEntry {
    TransitionEntry {
        from,
        to,
        actor: actor.id.clone(),
        role: actor.role,
        at: chrono::Utc::now(),
        comments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::events::MemorySink;
    use crate::store::InMemoryRecordStore;
    use perfeval_model::{ActorRole, CriteriaAnswers, Department, InMemoryDirectory, Indicator};

    struct Fixture {
        engine: WorkflowEngine,
        sink: Arc<MemorySink>,
        contributor: Actor,
        director: Actor,
        senior: Actor,
    }

    fn fixture() -> Fixture {
        let directory = Arc::new(
            InMemoryDirectory::new()
                .with_department(Department::new("finance", "org", "Finance"))
                .with_department(Department::new("roads", "org", "Roads"))
                .with_indicator("org", Indicator::new("ind-1", "K1", "Budget execution")),
        );
        let sink = Arc::new(MemorySink::new());
        let engine = WorkflowEngine::new(
            Arc::new(InMemoryRecordStore::new()),
            directory.clone(),
            directory,
        )
        .with_sink(sink.clone());

        Fixture {
            engine,
            sink,
            contributor: Actor::new("alice", ActorRole::Contributor, "finance"),
            director: Actor::new("dora", ActorRole::Director, "finance"),
            senior: Actor::new("sam", ActorRole::SeniorApprover, "mayor-office"),
        }
    }

    fn start(f: &Fixture) -> EvaluationRecord {
        f.engine
            .create(&"org".into(), FiscalYear(2024), &"finance".into(), &f.contributor)
            .unwrap()
    }

    #[test]
    fn create_records_history_and_audit() {
        let f = fixture();
        let record = start(&f);

        let history = f.engine.history(record.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].from, None);
        assert_eq!(history[0].to, EvaluationStatus::Draft);
        assert_eq!(f.engine.audit_log().len(), 1);
    }

    #[test]
    fn create_for_unknown_department_is_not_found() {
        let f = fixture();
        let err = f
            .engine
            .create(&"org".into(), FiscalYear(2024), &"zoo".into(), &f.contributor)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn create_for_foreign_department_is_unauthorized() {
        let f = fixture();
        let err = f
            .engine
            .create(&"org".into(), FiscalYear(2024), &"roads".into(), &f.contributor)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn approve_stamps_each_stage() {
        let f = fixture();
        let record = start(&f);
        f.engine.submit(record.id, &f.contributor).unwrap();
        f.engine.approve(record.id, &f.director).unwrap();
        f.engine.approve(record.id, &f.senior).unwrap();
        let done = f.engine.approve(record.id, &f.senior).unwrap();

        assert_eq!(done.status, EvaluationStatus::Completed);
        assert_eq!(done.submitted.unwrap().by.as_str(), "alice");
        assert_eq!(done.director_approved.unwrap().by.as_str(), "dora");
        assert_eq!(done.admin_approved.unwrap().by.as_str(), "sam");
        assert_eq!(done.completed.unwrap().by.as_str(), "sam");
        assert!(f.engine.audit_log().verify_integrity().is_ok());
    }

    #[test]
    fn completed_record_accepts_nothing() {
        let f = fixture();
        let record = start(&f);
        f.engine.submit(record.id, &f.contributor).unwrap();
        f.engine.approve(record.id, &f.director).unwrap();
        f.engine.approve(record.id, &f.senior).unwrap();
        f.engine.approve(record.id, &f.senior).unwrap();

        for actor in [&f.contributor, &f.director, &f.senior] {
            assert_eq!(
                f.engine.approve(record.id, actor).unwrap_err().kind(),
                ErrorKind::InvalidState
            );
            assert_eq!(
                f.engine.reject(record.id, actor, "late").unwrap_err().kind(),
                ErrorKind::InvalidState
            );
        }
        assert!(f.engine.allowed_actions(record.id, &f.senior).unwrap().is_empty());
    }

    #[test]
    fn reject_notifies_sinks_once() {
        let f = fixture();
        let record = start(&f);
        f.engine.submit(record.id, &f.contributor).unwrap();
        f.engine.reject(record.id, &f.director, "add budget table").unwrap();

        let events = f.sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].rejected_by_role, ActorRole::Director);
        assert_eq!(events[0].comments, "add budget table");
        assert_eq!(events[0].department_id.as_str(), "finance");
    }

    #[test]
    fn blank_rejection_comment_is_invalid_and_changes_nothing() {
        let f = fixture();
        let record = start(&f);
        let submitted = f.engine.submit(record.id, &f.contributor).unwrap();

        let err = f.engine.reject(record.id, &f.director, "   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(f.engine.record(record.id).unwrap(), submitted);
        assert!(f.sink.events().is_empty());
    }

    #[test]
    fn over_long_comment_is_invalid() {
        let f = fixture();
        let record = start(&f);
        f.engine.submit(record.id, &f.contributor).unwrap();

        let long = "x".repeat(f.engine.config().max_comment_len + 1);
        let err = f.engine.reject(record.id, &f.director, &long).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn unknown_indicator_is_refused_before_any_write() {
        let f = fixture();
        let record = start(&f);

        let err = f
            .engine
            .save_draft(
                record.id,
                NarrativeFields::new().with_summary("should not stick"),
                &[IndicatorAnswers::new(
                    "ind-999",
                    CriteriaAnswers::new().with(CriterionQuestion::Risks, "x"),
                )],
                &f.contributor,
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(f.engine.record(record.id).unwrap().narrative.general_summary.is_empty());
    }

    #[test]
    fn edit_answer_creates_row_lazily() {
        let f = fixture();
        let record = start(&f);
        assert!(f.engine.indicator_evaluations(record.id).unwrap().is_empty());

        let row = f
            .engine
            .edit_answer(
                record.id,
                &"ind-1".into(),
                CriterionQuestion::EnvironmentChanges,
                "new regulation",
                &f.contributor,
            )
            .unwrap();

        assert_eq!(row.answer(CriterionQuestion::EnvironmentChanges), "new regulation");
        assert_eq!(f.engine.indicator_evaluations(record.id).unwrap().len(), 1);
    }

    #[test]
    fn allowed_actions_follow_stage_and_role() {
        let f = fixture();
        let record = start(&f);
        assert_eq!(
            f.engine.allowed_actions(record.id, &f.contributor).unwrap(),
            vec![Operation::SaveDraft, Operation::EditAnswer, Operation::Submit]
        );
        assert!(f.engine.allowed_actions(record.id, &f.director).unwrap().contains(&Operation::SaveDraft));

        f.engine.submit(record.id, &f.contributor).unwrap();
        assert!(f.engine.allowed_actions(record.id, &f.contributor).unwrap().is_empty());
        assert_eq!(
            f.engine.allowed_actions(record.id, &f.director).unwrap(),
            vec![Operation::Approve, Operation::Reject]
        );
        assert!(f.engine.allowed_actions(record.id, &f.senior).unwrap().is_empty());
    }

    #[test]
    fn audit_can_be_disabled() {
        let directory = Arc::new(
            InMemoryDirectory::new().with_department(Department::new("finance", "org", "Finance")),
        );
        let engine = WorkflowEngine::with_config(
            Arc::new(InMemoryRecordStore::new()),
            directory.clone(),
            directory,
            EngineConfig::new().with_audit_log(false),
        );
        let alice = Actor::new("alice", ActorRole::Contributor, "finance");
        let record = engine
            .create(&"org".into(), FiscalYear(2024), &"finance".into(), &alice)
            .unwrap();
        engine.submit(record.id, &alice).unwrap();

        assert!(engine.audit_log().is_empty());
        assert_eq!(engine.history(record.id).unwrap().len(), 2);
    }
}
