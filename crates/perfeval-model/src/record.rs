//! Evaluation record aggregate
//!
//! An [`EvaluationRecord`] is a department's annual self-assessment and the
//! carrier of the approval status. Its [`IndicatorEvaluation`]s are child
//! rows owned exclusively by the record; [`TransitionEntry`] is the
//! append-only history of status changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::criteria::{CriteriaAnswers, CriterionQuestion};
use crate::ids::{DepartmentId, FiscalYear, IndicatorId, OrganizationId, RecordId, RecordKey, UserId};
use crate::status::{ActorRole, EvaluationStatus};

/// Free-text narrative of an evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeFields {
    pub general_summary: String,
    pub achievements: String,
    pub challenges: String,
    pub recommendations: String,
}

impl NarrativeFields {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_summary(mut self, text: impl Into<String>) -> Self {
        self.general_summary = text.into();
        self
    }

    #[must_use]
    pub fn with_achievements(mut self, text: impl Into<String>) -> Self {
        self.achievements = text.into();
        self
    }

    #[must_use]
    pub fn with_challenges(mut self, text: impl Into<String>) -> Self {
        self.challenges = text.into();
        self
    }

    #[must_use]
    pub fn with_recommendations(mut self, text: impl Into<String>) -> Self {
        self.recommendations = text.into();
        self
    }
}

/// Who moved the record forward, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub at: DateTime<Utc>,
    pub by: UserId,
}

impl Stamp {
    pub fn now(by: UserId) -> Self {
        Self { at: Utc::now(), by }
    }
}

/// A department's evaluation for one fiscal year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: RecordId,
    pub organization_id: OrganizationId,
    pub fiscal_year: FiscalYear,
    pub department_id: DepartmentId,
    pub status: EvaluationStatus,

    pub narrative: NarrativeFields,

    pub submitted: Option<Stamp>,
    pub director_approved: Option<Stamp>,
    pub admin_approved: Option<Stamp>,
    pub completed: Option<Stamp>,
    pub director_comments: Option<String>,
    pub admin_comments: Option<String>,

    pub created: Stamp,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every committed mutation
    pub version: u64,
}

impl EvaluationRecord {
    /// Fresh draft for `key`, started by `created_by`
    pub fn new(key: RecordKey, created_by: UserId) -> Self {
        let created = Stamp::now(created_by);
        Self {
            id: RecordId::new(),
            organization_id: key.organization_id,
            fiscal_year: key.fiscal_year,
            department_id: key.department_id,
            status: EvaluationStatus::Draft,
            narrative: NarrativeFields::default(),
            submitted: None,
            director_approved: None,
            admin_approved: None,
            completed: None,
            director_comments: None,
            admin_comments: None,
            updated_at: created.at,
            created,
            version: 0,
        }
    }

    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey {
            organization_id: self.organization_id.clone(),
            fiscal_year: self.fiscal_year,
            department_id: self.department_id.clone(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }
}

/// Criteria answers submitted for one indicator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorAnswers {
    pub indicator_id: IndicatorId,
    pub answers: CriteriaAnswers,
}

impl IndicatorAnswers {
    pub fn new(indicator_id: impl Into<IndicatorId>, answers: CriteriaAnswers) -> Self {
        Self {
            indicator_id: indicator_id.into(),
            answers,
        }
    }
}

/// Stored criteria answers for one (record, indicator) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorEvaluation {
    pub record_id: RecordId,
    pub indicator_id: IndicatorId,
    pub answers: CriteriaAnswers,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IndicatorEvaluation {
    pub fn new(record_id: RecordId, indicator_id: IndicatorId) -> Self {
        let now = Utc::now();
        Self {
            record_id,
            indicator_id,
            answers: CriteriaAnswers::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn answer(&self, question: CriterionQuestion) -> &str {
        self.answers.get(question)
    }
}

/// One line of a record's status history
///
/// `from == None` marks creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub from: Option<EvaluationStatus>,
    pub to: EvaluationStatus,
    pub actor: UserId,
    pub role: ActorRole,
    pub at: DateTime<Utc>,
    pub comments: Option<String>,
}

impl TransitionEntry {
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        self.to == EvaluationStatus::Draft && self.from.is_some()
    }
}
