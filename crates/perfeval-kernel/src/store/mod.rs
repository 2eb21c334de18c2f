//! Evaluation record store
//!
//! [`EvaluationRecordStore`] abstracts persistence of the record aggregate:
//! the record itself, its indicator evaluations and its transition history.
//! The aggregate is the unit of mutual exclusion; [`modify`] runs a closure on
//! a working copy under the record's exclusive lock and commits only when the
//! closure succeeds, so a failed operation leaves nothing behind.
//!
//! [`modify`]: EvaluationRecordStore::modify

mod memory;

pub use memory::InMemoryRecordStore;

use chrono::Utc;
use perfeval_model::{
    CriterionQuestion, EvaluationRecord, FiscalYear, IndicatorAnswers, IndicatorEvaluation,
    IndicatorId, OrganizationId, RecordId, RecordKey, TransitionEntry,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Operation, WorkflowError};

/// Record plus everything it exclusively owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationAggregate {
    pub record: EvaluationRecord,
    pub indicators: BTreeMap<IndicatorId, IndicatorEvaluation>,
    pub history: Vec<TransitionEntry>,
}

impl EvaluationAggregate {
    pub fn new(record: EvaluationRecord) -> Self {
        Self {
            record,
            indicators: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    fn ensure_editable(&self, operation: Operation) -> Result<(), WorkflowError> {
        if self.record.is_editable() {
            Ok(())
        } else {
            Err(WorkflowError::InvalidState {
                record_id: self.record.id,
                operation,
                status: self.record.status,
            })
        }
    }

    /// Replace the answers of every indicator that carries at least one
    /// non-blank answer, creating rows as needed. Blank submissions are
    /// skipped. Returns the rows that were written.
    pub fn upsert_answers(
        &mut self,
        answers: &[IndicatorAnswers],
    ) -> Result<Vec<IndicatorEvaluation>, WorkflowError> {
        self.ensure_editable(Operation::SaveDraft)?;

        let record_id = self.record.id;
        let mut written = Vec::new();
        for submitted in answers.iter().filter(|a| !a.answers.is_blank()) {
            let row = self
                .indicators
                .entry(submitted.indicator_id.clone())
                .or_insert_with(|| IndicatorEvaluation::new(record_id, submitted.indicator_id.clone()));
            row.answers = submitted.answers.clone();
            row.updated_at = Utc::now();
            written.push(row.clone());
        }
        Ok(written)
    }

    /// Write one answer, creating the indicator row on first edit
    pub fn set_answer(
        &mut self,
        indicator_id: &IndicatorId,
        question: CriterionQuestion,
        text: &str,
    ) -> Result<IndicatorEvaluation, WorkflowError> {
        self.ensure_editable(Operation::EditAnswer)?;

        let record_id = self.record.id;
        let row = self
            .indicators
            .entry(indicator_id.clone())
            .or_insert_with(|| IndicatorEvaluation::new(record_id, indicator_id.clone()));
        row.answers.set(question, text);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    #[must_use]
    pub fn indicator_list(&self) -> Vec<IndicatorEvaluation> {
        self.indicators.values().cloned().collect()
    }
}

/// Mutation applied under the record lock
pub type Mutation<'a> = dyn FnMut(&mut EvaluationAggregate) -> Result<(), WorkflowError> + 'a;

/// Persistence-agnostic repository of evaluation aggregates
///
/// Implementations must make [`insert`](Self::insert) atomic with respect to
/// the uniqueness key and must serialize [`modify`](Self::modify) calls per
/// record. Reads may be served from a slightly stale view.
pub trait EvaluationRecordStore: Send + Sync {
    /// Store a new aggregate
    ///
    /// # Errors
    /// - `DuplicateRecord` if the record's key is taken
    fn insert(&self, aggregate: EvaluationAggregate) -> Result<EvaluationRecord, WorkflowError>;

    /// Lookup by uniqueness key
    fn get(&self, key: &RecordKey) -> Option<EvaluationRecord>;

    /// Lookup by id
    ///
    /// # Errors
    /// - `NotFound` for an unknown id
    fn get_by_id(&self, id: RecordId) -> Result<EvaluationRecord, WorkflowError>;

    /// All records of one organization and fiscal year, ordered by department
    fn list_by_fiscal_year(
        &self,
        organization_id: &OrganizationId,
        fiscal_year: FiscalYear,
    ) -> Vec<EvaluationRecord>;

    /// Indicator evaluations of a record, ordered by indicator id
    ///
    /// # Errors
    /// - `NotFound` for an unknown id
    fn indicator_evaluations(&self, id: RecordId) -> Result<Vec<IndicatorEvaluation>, WorkflowError>;

    /// Transition history of a record, oldest first
    ///
    /// # Errors
    /// - `NotFound` for an unknown id
    fn history(&self, id: RecordId) -> Result<Vec<TransitionEntry>, WorkflowError>;

    /// Run `mutation` on a working copy under the record's exclusive lock.
    /// On success the copy is committed with a bumped version; on error the
    /// stored aggregate is untouched.
    ///
    /// # Errors
    /// - `NotFound` for an unknown id
    /// - whatever `mutation` returns
    fn modify(
        &self,
        id: RecordId,
        mutation: &mut Mutation<'_>,
    ) -> Result<EvaluationAggregate, WorkflowError>;

    /// Upsert indicator answers; refused unless the record is a draft
    ///
    /// # Errors
    /// - `NotFound` for an unknown id
    /// - `InvalidState` when the record is not `draft`
    fn upsert_indicator_answers(
        &self,
        id: RecordId,
        answers: &[IndicatorAnswers],
    ) -> Result<Vec<IndicatorEvaluation>, WorkflowError> {
        let mut written = Vec::new();
        self.modify(id, &mut |aggregate| {
            written = aggregate.upsert_answers(answers)?;
            Ok(())
        })?;
        Ok(written)
    }

    /// Number of stored records
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfeval_model::{CriteriaAnswers, EvaluationStatus};

    fn aggregate() -> EvaluationAggregate {
        EvaluationAggregate::new(EvaluationRecord::new(
            RecordKey::new("org", 2024, "finance"),
            "alice".into(),
        ))
    }

    #[test]
    fn blank_answer_sets_create_no_rows() {
        let mut agg = aggregate();
        let written = agg
            .upsert_answers(&[
                IndicatorAnswers::new("ind-1", CriteriaAnswers::new()),
                IndicatorAnswers::new(
                    "ind-2",
                    CriteriaAnswers::new().with(CriterionQuestion::Risks, "budget cuts"),
                ),
            ])
            .unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(agg.indicators.len(), 1);
        assert!(agg.indicators.contains_key(&IndicatorId::new("ind-2")));
    }

    #[test]
    fn upsert_replaces_existing_answers_wholesale() {
        let mut agg = aggregate();
        agg.set_answer(&"ind-1".into(), CriterionQuestion::NeedsChange, "yes")
            .unwrap();
        agg.upsert_answers(&[IndicatorAnswers::new(
            "ind-1",
            CriteriaAnswers::new().with(CriterionQuestion::Risks, "none"),
        )])
        .unwrap();

        let row = &agg.indicators[&IndicatorId::new("ind-1")];
        assert_eq!(row.answer(CriterionQuestion::NeedsChange), "");
        assert_eq!(row.answer(CriterionQuestion::Risks), "none");
    }

    #[test]
    fn answers_are_frozen_outside_draft() {
        let mut agg = aggregate();
        agg.record.status = EvaluationStatus::Submitted;

        let err = agg
            .set_answer(&"ind-1".into(), CriterionQuestion::Risks, "late edit")
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { operation: Operation::EditAnswer, .. }));
        assert!(agg.indicators.is_empty());
    }
}
