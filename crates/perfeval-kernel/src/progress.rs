//! Organization-wide evaluation progress
//!
//! Pure functions over a record set. Departments without a record count as
//! not started; records of departments outside the requested list are
//! ignored, so the buckets always add up to `total_departments`.

use perfeval_model::{
    DepartmentDirectory, DepartmentId, EvaluationRecord, EvaluationStatus, FiscalYear,
    OrganizationId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::config::CompletionWeights;

/// Department count per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub not_started: usize,
    pub draft: usize,
    pub submitted: usize,
    pub director_approved: usize,
    pub admin_approved: usize,
    pub completed: usize,
}

impl StatusCounts {
    fn bump(&mut self, status: Option<EvaluationStatus>) {
        let slot = match status {
            None => &mut self.not_started,
            Some(EvaluationStatus::Draft) => &mut self.draft,
            Some(EvaluationStatus::Submitted) => &mut self.submitted,
            Some(EvaluationStatus::DirectorApproved) => &mut self.director_approved,
            Some(EvaluationStatus::AdminApproved) => &mut self.admin_approved,
            Some(EvaluationStatus::Completed) => &mut self.completed,
        };
        *slot += 1;
    }

    #[must_use]
    pub fn get(&self, status: EvaluationStatus) -> usize {
        match status {
            EvaluationStatus::Draft => self.draft,
            EvaluationStatus::Submitted => self.submitted,
            EvaluationStatus::DirectorApproved => self.director_approved,
            EvaluationStatus::AdminApproved => self.admin_approved,
            EvaluationStatus::Completed => self.completed,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.not_started + EvaluationStatus::ALL.iter().map(|s| self.get(*s)).sum::<usize>()
    }
}

/// Derived progress summary for one organization and fiscal year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub organization_id: OrganizationId,
    pub fiscal_year: FiscalYear,
    pub total_departments: usize,
    pub counts: StatusCounts,
    /// Always within `0..=100`
    pub completion_percentage: u8,
}

/// One department's line in a progress report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentProgress {
    pub department_id: DepartmentId,
    pub name: Option<String>,
    /// `None` when the department has not started
    pub status: Option<EvaluationStatus>,
}

/// Snapshot plus per-department detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub snapshot: ProgressSnapshot,
    pub departments: Vec<DepartmentProgress>,
}

/// Computes [`ProgressSnapshot`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressAggregator {
    weights: CompletionWeights,
}

impl ProgressAggregator {
    #[inline]
    #[must_use]
    pub fn new(weights: CompletionWeights) -> Self {
        Self { weights }
    }

    /// Summarize `records` over `department_ids`
    ///
    /// Duplicate department ids count once. Records from another
    /// organization or fiscal year are ignored.
    #[must_use]
    pub fn summarize(
        &self,
        organization_id: &OrganizationId,
        fiscal_year: FiscalYear,
        department_ids: &[DepartmentId],
        records: &[EvaluationRecord],
    ) -> ProgressSnapshot {
        let statuses = index_statuses(organization_id, fiscal_year, records);
        let departments = dedup(department_ids);

        let mut counts = StatusCounts::default();
        let mut credit: u64 = 0;
        for department in &departments {
            let status = statuses.get(*department).copied();
            counts.bump(status);
            if let Some(status) = status {
                credit += u64::from(self.weights.weight(status));
            }
        }

        ProgressSnapshot {
            organization_id: organization_id.clone(),
            fiscal_year,
            total_departments: departments.len(),
            counts,
            completion_percentage: percentage(credit, departments.len()),
        }
    }

    /// [`summarize`](Self::summarize) plus one row per department, in input
    /// order, named from the directory when it knows the department
    #[must_use]
    pub fn report(
        &self,
        organization_id: &OrganizationId,
        fiscal_year: FiscalYear,
        department_ids: &[DepartmentId],
        records: &[EvaluationRecord],
        directory: &dyn DepartmentDirectory,
    ) -> ProgressReport {
        let snapshot = self.summarize(organization_id, fiscal_year, department_ids, records);
        let statuses = index_statuses(organization_id, fiscal_year, records);

        let departments = dedup(department_ids)
            .into_iter()
            .map(|id| DepartmentProgress {
                department_id: id.clone(),
                name: directory.department(id).map(|d| d.name),
                status: statuses.get(id).copied(),
            })
            .collect();

        ProgressReport {
            snapshot,
            departments,
        }
    }
}

fn index_statuses<'a>(
    organization_id: &OrganizationId,
    fiscal_year: FiscalYear,
    records: &'a [EvaluationRecord],
) -> HashMap<&'a DepartmentId, EvaluationStatus> {
    records
        .iter()
        .filter(|r| &r.organization_id == organization_id && r.fiscal_year == fiscal_year)
        .map(|r| (&r.department_id, r.status))
        .collect()
}

fn dedup(department_ids: &[DepartmentId]) -> Vec<&DepartmentId> {
    let mut seen = BTreeSet::new();
    department_ids
        .iter()
        .filter(|id| seen.insert(*id))
        .collect()
}

/// `round(credit / total)` with half-up integer rounding, clamped to 100.
/// `credit` is already scaled by 100 through the weights.
fn percentage(credit: u64, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let total = total as u64;
    let rounded = (2 * credit + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}
