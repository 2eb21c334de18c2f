//! In-memory record store
//!
//! Records live behind one `Mutex` each, so writers to different departments
//! never contend. A second map enforces the (organization, year, department)
//! uniqueness key; its entry API makes check-and-insert atomic.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use perfeval_model::{
    EvaluationRecord, FiscalYear, IndicatorEvaluation, OrganizationId, RecordId, RecordKey,
    TransitionEntry,
};
use std::sync::Arc;
use tracing::debug;

use super::{EvaluationAggregate, EvaluationRecordStore, Mutation};
use crate::error::WorkflowError;

type Cell = Arc<Mutex<EvaluationAggregate>>;

/// Thread-safe in-memory [`EvaluationRecordStore`]
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: DashMap<RecordId, Cell>,
    by_key: DashMap<RecordKey, RecordId>,
}

impl InMemoryRecordStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone the cell handle out so no map shard stays locked while the
    /// record mutex is held.
    fn cell(&self, id: RecordId) -> Result<Cell, WorkflowError> {
        self.records
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| WorkflowError::record_not_found(id))
    }

    fn read<T>(&self, id: RecordId, f: impl FnOnce(&EvaluationAggregate) -> T) -> Result<T, WorkflowError> {
        let cell = self.cell(id)?;
        let guard = cell.lock();
        Ok(f(&guard))
    }
}

impl EvaluationRecordStore for InMemoryRecordStore {
    fn insert(&self, aggregate: EvaluationAggregate) -> Result<EvaluationRecord, WorkflowError> {
        let key = aggregate.record.key();
        let id = aggregate.record.id;

        match self.by_key.entry(key) {
            Entry::Occupied(occupied) => Err(WorkflowError::DuplicateRecord {
                key: occupied.key().clone(),
                existing: *occupied.get(),
            }),
            Entry::Vacant(vacant) => {
                let record = aggregate.record.clone();
                self.records.insert(id, Arc::new(Mutex::new(aggregate)));
                vacant.insert(id);
                debug!(record_id = %id, "record stored");
                Ok(record)
            }
        }
    }

    fn get(&self, key: &RecordKey) -> Option<EvaluationRecord> {
        let id = *self.by_key.get(key)?.value();
        self.get_by_id(id).ok()
    }

    fn get_by_id(&self, id: RecordId) -> Result<EvaluationRecord, WorkflowError> {
        self.read(id, |agg| agg.record.clone())
    }

    fn list_by_fiscal_year(
        &self,
        organization_id: &OrganizationId,
        fiscal_year: FiscalYear,
    ) -> Vec<EvaluationRecord> {
        let ids: Vec<RecordId> = self
            .by_key
            .iter()
            .filter(|entry| {
                entry.key().organization_id == *organization_id
                    && entry.key().fiscal_year == fiscal_year
            })
            .map(|entry| *entry.value())
            .collect();

        let mut records: Vec<EvaluationRecord> = ids
            .into_iter()
            .filter_map(|id| self.get_by_id(id).ok())
            .collect();
        records.sort_by(|a, b| a.department_id.cmp(&b.department_id));
        records
    }

    fn indicator_evaluations(&self, id: RecordId) -> Result<Vec<IndicatorEvaluation>, WorkflowError> {
        self.read(id, EvaluationAggregate::indicator_list)
    }

    fn history(&self, id: RecordId) -> Result<Vec<TransitionEntry>, WorkflowError> {
        self.read(id, |agg| agg.history.clone())
    }

    fn modify(
        &self,
        id: RecordId,
        mutation: &mut Mutation<'_>,
    ) -> Result<EvaluationAggregate, WorkflowError> {
        let cell = self.cell(id)?;
        let mut guard = cell.lock();

        let mut working = guard.clone();
        mutation(&mut working)?;

        working.record.version = guard.record.version + 1;
        working.record.updated_at = Utc::now();
        *guard = working;

        debug!(record_id = %id, version = guard.record.version, "record committed");
        Ok(guard.clone())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use perfeval_model::{
        CriteriaAnswers, CriterionQuestion, EvaluationStatus, IndicatorAnswers, NarrativeFields,
    };
    use std::thread;

    fn draft(department: &str) -> EvaluationAggregate {
        EvaluationAggregate::new(EvaluationRecord::new(
            RecordKey::new("org", 2024, department),
            "alice".into(),
        ))
    }

    #[test]
    fn duplicate_key_is_rejected_and_first_record_kept() {
        let store = InMemoryRecordStore::new();
        let first = store.insert(draft("finance")).unwrap();

        let err = store.insert(draft("finance")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateRecord);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&first.key()).unwrap().id, first.id);
    }

    #[test]
    fn failed_mutation_commits_nothing() {
        let store = InMemoryRecordStore::new();
        let record = store.insert(draft("finance")).unwrap();

        let result = store.modify(record.id, &mut |agg| {
            agg.record.narrative = NarrativeFields::new().with_summary("half-written");
            agg.record.status = EvaluationStatus::Submitted;
            Err(WorkflowError::invalid_argument("test", "abort"))
        });

        assert!(result.is_err());
        let stored = store.get_by_id(record.id).unwrap();
        assert_eq!(stored, record);
    }

    #[test]
    fn successful_mutation_bumps_version() {
        let store = InMemoryRecordStore::new();
        let record = store.insert(draft("finance")).unwrap();

        let committed = store
            .modify(record.id, &mut |agg| {
                agg.record.narrative.achievements = "new park".into();
                Ok(())
            })
            .unwrap();

        assert_eq!(committed.record.version, 1);
        assert_eq!(store.get_by_id(record.id).unwrap().narrative.achievements, "new park");
    }

    fn risk_answer(indicator: &str, text: &str) -> Vec<IndicatorAnswers> {
        vec![IndicatorAnswers::new(
            indicator,
            CriteriaAnswers::new().with(CriterionQuestion::Risks, text),
        )]
    }

    #[test]
    fn upsert_on_draft_writes_rows_and_bumps_version() {
        let store = InMemoryRecordStore::new();
        let record = store.insert(draft("finance")).unwrap();

        let written = store
            .upsert_indicator_answers(record.id, &risk_answer("ind-1", "staffing"))
            .unwrap();

        assert_eq!(written.len(), 1);
        let rows = store.indicator_evaluations(record.id).unwrap();
        assert_eq!(rows, written);
        assert_eq!(rows[0].answers.get(CriterionQuestion::Risks), "staffing");
        assert_eq!(store.get_by_id(record.id).unwrap().version, record.version + 1);
    }

    #[test]
    fn upsert_on_submitted_record_changes_nothing() {
        let store = InMemoryRecordStore::new();
        let record = store.insert(draft("finance")).unwrap();
        store
            .upsert_indicator_answers(record.id, &risk_answer("ind-1", "staffing"))
            .unwrap();
        store
            .modify(record.id, &mut |agg| {
                agg.record.status = EvaluationStatus::Submitted;
                Ok(())
            })
            .unwrap();
        let rows_before = store.indicator_evaluations(record.id).unwrap();
        let before = store.get_by_id(record.id).unwrap();

        let err = store
            .upsert_indicator_answers(record.id, &risk_answer("ind-1", "rewritten"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(store.indicator_evaluations(record.id).unwrap(), rows_before);
        assert_eq!(store.get_by_id(record.id).unwrap(), before);
    }

    #[test]
    fn listing_filters_by_organization_and_year() {
        let store = InMemoryRecordStore::new();
        store.insert(draft("roads")).unwrap();
        store.insert(draft("finance")).unwrap();
        store
            .insert(EvaluationAggregate::new(EvaluationRecord::new(
                RecordKey::new("org", 2023, "finance"),
                "alice".into(),
            )))
            .unwrap();

        let listed = store.list_by_fiscal_year(&"org".into(), FiscalYear(2024));
        let departments: Vec<&str> = listed.iter().map(|r| r.department_id.as_str()).collect();
        assert_eq!(departments, vec!["finance", "roads"]);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = InMemoryRecordStore::new();
        let err = store.history(RecordId::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn concurrent_inserts_of_same_key_admit_exactly_one() {
        let store = Arc::new(InMemoryRecordStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.insert(draft("finance")).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
        assert_eq!(store.len(), 1);
    }
}
