//! Workflow simulator - seeded random operations checked against a shadow
//! model of the approval chain
//!
//! Every generated operation is classified up front by the shadow model
//! (success, or the [`ErrorKind`] it must fail with), executed against a real
//! [`WorkflowEngine`], and the outcome compared. Invariants are re-checked
//! after every operation.

use perfeval_model::{
    Actor, ActorRole, CriteriaAnswers, CriterionQuestion, Department, DepartmentId,
    EvaluationStatus, FiscalYear, InMemoryDirectory, Indicator, IndicatorAnswers,
    NarrativeFields, OrganizationId, RecordId,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ErrorKind, WorkflowError};
use crate::events::MemorySink;
use crate::state_machine;
use crate::store::InMemoryRecordStore;
use crate::workflow::WorkflowEngine;

const ORGANIZATION: &str = "sim-org";
const FISCAL_YEAR: i32 = 2024;
const EXECUTIVE: &str = "executive";
const INDICATORS: [&str; 3] = ["ind-budget", "ind-service", "ind-staff"];

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Total operations to execute
    pub total_operations: u64,
    /// Departments taking part in the evaluation round
    pub departments: usize,
    pub operation_distribution: OperationDistribution,
    /// Stop conditions
    pub stop_on_first_violation: bool,
    pub stop_on_error_count: Option<usize>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            total_operations: 10_000,
            departments: 8,
            operation_distribution: OperationDistribution::default(),
            stop_on_first_violation: true,
            stop_on_error_count: None,
        }
    }
}

/// Probability distribution for operation generation
#[derive(Debug, Clone)]
pub struct OperationDistribution {
    /// Next step of the happy path for a random department
    pub valid_ops: f64,
    /// Blank inputs, duplicate creates, unknown records
    pub edge_cases: f64,
    /// Any operation by any actor
    pub invalid_ops: f64,
}

impl Default for OperationDistribution {
    fn default() -> Self {
        Self {
            valid_ops: 0.60,
            edge_cases: 0.15,
            invalid_ops: 0.25,
        }
    }
}

/// Who performs a simulated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimActor {
    /// Contributor of the department with this index
    Contributor(usize),
    Director,
    SeniorApprover,
}

/// Every operation the simulator can generate. Departments are referenced
/// by index.
#[derive(Debug, Clone)]
pub enum SimulatedOperation {
    Create(usize, SimActor),
    SaveDraft { department: usize, actor: SimActor, blank: bool },
    EditAnswer(usize, SimActor),
    Submit(usize, SimActor),
    Approve(usize, SimActor),
    Reject { department: usize, actor: SimActor, comments: String },
    /// Operation on a record id nobody created
    SubmitUnknown(SimActor),
    Summarize,
    VerifyAudit,
}

impl SimulatedOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create(..) => "create",
            Self::SaveDraft { .. } => "save_draft",
            Self::EditAnswer(..) => "edit_answer",
            Self::Submit(..) => "submit",
            Self::Approve(..) => "approve",
            Self::Reject { .. } => "reject",
            Self::SubmitUnknown(..) => "submit_unknown",
            Self::Summarize => "summarize",
            Self::VerifyAudit => "verify_audit",
        }
    }
}

/// Expected result classification for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedResult {
    ShouldSucceed,
    ShouldFail(ErrorKind),
}

/// A violation detected during simulation
#[derive(Debug, Clone)]
pub enum Violation {
    /// Operation outcome didn't match the shadow model
    UnexpectedOutcome {
        operation_index: u64,
        operation: SimulatedOperation,
        expected: ExpectedResult,
        actual: Result<String, String>,
    },
    Invariant(InvariantViolation),
}

#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub check: InvariantCheck,
    pub details: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.check, self.details)
    }
}

/// Types of invariant checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantCheck {
    StatusMatchesModel,
    OneRecordPerDepartment,
    HistoryFollowsStateMachine,
    HashChainIsUnbroken,
    SummaryAddsUp,
    RejectionsWereNotified,
}

/// Statistics collected during simulation
#[derive(Debug, Clone, Default)]
pub struct OperationStats {
    pub total_operations: u64,
    pub successful_operations: u64,
    pub failed_operations: u64,
    pub invariant_violations: u64,
    pub operations_by_type: HashMap<&'static str, u64>,
}

impl OperationStats {
    pub fn record(&mut self, operation: &SimulatedOperation, result: &Result<String, String>) {
        self.total_operations += 1;
        *self.operations_by_type.entry(operation.name()).or_insert(0) += 1;

        match result {
            Ok(_) => self.successful_operations += 1,
            Err(_) => self.failed_operations += 1,
        }
    }
}

/// Final report from the simulator
#[derive(Debug, Clone)]
pub struct SimulatorReport {
    pub config: SimulatorConfig,
    pub stats: OperationStats,
    pub violations: Vec<Violation>,
    /// Departments per final status
    pub final_statuses: HashMap<EvaluationStatus, usize>,
    pub final_completion_percentage: u8,
    pub rejections: usize,
}

impl SimulatorReport {
    /// Check if simulation passed all criteria
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Generate a text report
    pub fn generate_text(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Workflow Simulator Report ===\n\n");
        report.push_str(&format!("Seed: {}\n", self.config.seed));
        report.push_str(&format!("Departments: {}\n", self.config.departments));
        report.push_str(&format!("Total Operations: {}\n", self.stats.total_operations));
        report.push_str(&format!("Successful: {}\n", self.stats.successful_operations));
        report.push_str(&format!("Refused: {}\n", self.stats.failed_operations));
        report.push_str(&format!("Rejections: {}\n", self.rejections));
        report.push_str(&format!("Violations: {}\n", self.violations.len()));

        report.push_str("\n=== Final Statuses ===\n");
        for status in EvaluationStatus::ALL {
            let count = self.final_statuses.get(&status).copied().unwrap_or(0);
            report.push_str(&format!("{status}: {count}\n"));
        }
        report.push_str(&format!("Completion: {}%\n", self.final_completion_percentage));

        if !self.violations.is_empty() {
            report.push_str("\n=== Violations ===\n");
            for (i, v) in self.violations.iter().enumerate() {
                report.push_str(&format!("{}. {:?}\n", i + 1, v));
            }
        }

        report.push_str(&format!(
            "\n=== Result: {} ===\n",
            if self.passed() { "PASS" } else { "FAIL" }
        ));

        report
    }
}

/// Engine under test plus the actors and department list it was seeded with
struct SimWorld {
    engine: WorkflowEngine,
    sink: Arc<MemorySink>,
    organization: OrganizationId,
    year: FiscalYear,
    departments: Vec<DepartmentId>,
}

impl SimWorld {
    fn new(department_count: usize) -> Self {
        let organization = OrganizationId::new(ORGANIZATION);
        let directory = InMemoryDirectory::new()
            .with_department(Department::new(EXECUTIVE, ORGANIZATION, "Executive office"));
        let departments: Vec<DepartmentId> = (0..department_count)
            .map(|i| DepartmentId::new(format!("dept-{i:02}")))
            .collect();
        for (i, id) in departments.iter().enumerate() {
            directory.add_department(Department::new(id.clone(), ORGANIZATION, format!("Department {i}")));
        }
        for (i, indicator) in INDICATORS.iter().enumerate() {
            directory.add_indicator(ORGANIZATION, Indicator::new(*indicator, format!("K{i}"), *indicator));
        }

        let directory = Arc::new(directory);
        let sink = Arc::new(MemorySink::new());
        let engine = WorkflowEngine::new(
            Arc::new(InMemoryRecordStore::new()),
            directory.clone(),
            directory,
        )
        .with_sink(sink.clone());

        Self {
            engine,
            sink,
            organization,
            year: FiscalYear(FISCAL_YEAR),
            departments,
        }
    }

    fn actor(&self, actor: SimActor) -> Actor {
        match actor {
            SimActor::Contributor(i) => Actor::new(
                format!("contributor-{i:02}"),
                ActorRole::Contributor,
                self.departments[i].clone(),
            ),
            SimActor::Director => Actor::new("director", ActorRole::Director, EXECUTIVE),
            SimActor::SeniorApprover => {
                Actor::new("senior-approver", ActorRole::SeniorApprover, EXECUTIVE)
            }
        }
    }
}

/// What the simulator believes the store holds
#[derive(Debug, Default)]
struct ShadowModel {
    records: HashMap<usize, (RecordId, EvaluationStatus)>,
    rejections: usize,
}

impl ShadowModel {
    fn status(&self, department: usize) -> Option<EvaluationStatus> {
        self.records.get(&department).map(|(_, status)| *status)
    }

    fn expect(&self, operation: &SimulatedOperation) -> ExpectedResult {
        use EvaluationStatus as S;
        use ExpectedResult::{ShouldFail, ShouldSucceed};

        let member = |actor: SimActor, department: usize| actor == SimActor::Contributor(department);

        match operation {
            SimulatedOperation::Create(d, actor) => {
                if !member(*actor, *d) {
                    ShouldFail(ErrorKind::Unauthorized)
                } else if self.records.contains_key(d) {
                    ShouldFail(ErrorKind::DuplicateRecord)
                } else {
                    ShouldSucceed
                }
            }
            SimulatedOperation::SaveDraft { department: d, actor, .. }
            | SimulatedOperation::EditAnswer(d, actor)
            | SimulatedOperation::Submit(d, actor) => match self.status(*d) {
                None => ShouldFail(ErrorKind::NotFound),
                Some(S::Draft) if member(*actor, *d) => ShouldSucceed,
                Some(S::Draft) => ShouldFail(ErrorKind::Unauthorized),
                Some(_) => ShouldFail(ErrorKind::InvalidState),
            },
            SimulatedOperation::Approve(d, actor) => match (self.status(*d), actor) {
                (None, _) => ShouldFail(ErrorKind::NotFound),
                (Some(S::Submitted), SimActor::Director)
                | (Some(S::DirectorApproved | S::AdminApproved), SimActor::SeniorApprover) => {
                    ShouldSucceed
                }
                (Some(S::Submitted | S::DirectorApproved | S::AdminApproved), _) => {
                    ShouldFail(ErrorKind::Unauthorized)
                }
                (Some(_), _) => ShouldFail(ErrorKind::InvalidState),
            },
            SimulatedOperation::Reject { department: d, actor, comments } => {
                match (self.status(*d), actor) {
                    (None, _) => ShouldFail(ErrorKind::NotFound),
                    (Some(S::Submitted), SimActor::Director)
                    | (Some(S::DirectorApproved), SimActor::SeniorApprover) => {
                        if comments.trim().is_empty() {
                            ShouldFail(ErrorKind::InvalidArgument)
                        } else {
                            ShouldSucceed
                        }
                    }
                    (Some(S::Submitted | S::DirectorApproved), _) => {
                        ShouldFail(ErrorKind::Unauthorized)
                    }
                    (Some(_), _) => ShouldFail(ErrorKind::InvalidState),
                }
            }
            SimulatedOperation::SubmitUnknown(_) => ShouldFail(ErrorKind::NotFound),
            SimulatedOperation::Summarize | SimulatedOperation::VerifyAudit => ShouldSucceed,
        }
    }

    /// Advance the model after an operation the engine accepted
    fn apply(&mut self, operation: &SimulatedOperation, created: Option<RecordId>) {
        use EvaluationStatus as S;
        let set = |records: &mut HashMap<usize, (RecordId, S)>, d: usize, status: S| {
            if let Some(entry) = records.get_mut(&d) {
                entry.1 = status;
            }
        };

        match operation {
            SimulatedOperation::Create(d, _) => {
                if let Some(id) = created {
                    self.records.insert(*d, (id, S::Draft));
                }
            }
            SimulatedOperation::Submit(d, _) => set(&mut self.records, *d, S::Submitted),
            SimulatedOperation::Approve(d, _) => {
                let next = match self.status(*d) {
                    Some(S::Submitted) => S::DirectorApproved,
                    Some(S::DirectorApproved) => S::AdminApproved,
                    _ => S::Completed,
                };
                set(&mut self.records, *d, next);
            }
            SimulatedOperation::Reject { department, .. } => {
                set(&mut self.records, *department, S::Draft);
                self.rejections += 1;
            }
            _ => {}
        }
    }

    fn record_id(&self, department: usize) -> RecordId {
        self.records
            .get(&department)
            .map_or_else(RecordId::new, |(id, _)| *id)
    }
}

/// Run the workflow simulator
pub fn run_simulator(config: SimulatorConfig) -> SimulatorReport {
    let department_count = config.departments.max(1);
    let world = SimWorld::new(department_count);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut model = ShadowModel::default();
    let mut stats = OperationStats::default();
    let mut violations = Vec::new();

    for i in 0..config.total_operations {
        let operation = generate_operation(&mut rng, &config.operation_distribution, &model, department_count);
        let expected = model.expect(&operation);
        let actual = execute_operation(&world, &model, &operation);

        let actual_str: Result<String, String> = match &actual {
            Ok(Outcome { message, .. }) => Ok(message.clone()),
            Err(e) => Err(e.to_string()),
        };

        let outcome_matches = match (expected, &actual) {
            (ExpectedResult::ShouldSucceed, Ok(_)) => true,
            (ExpectedResult::ShouldFail(kind), Err(e)) => e.kind() == kind,
            _ => false,
        };

        if let Ok(outcome) = &actual {
            model.apply(&operation, outcome.created);
        }

        if !outcome_matches {
            violations.push(Violation::UnexpectedOutcome {
                operation_index: i,
                operation: operation.clone(),
                expected,
                actual: actual_str.clone(),
            });

            if config.stop_on_first_violation {
                break;
            }
            if let Some(max_errors) = config.stop_on_error_count {
                if violations.len() >= max_errors {
                    break;
                }
            }
        }

        if let Err(inv_violations) = WorkflowInvariants::check_all(&world, &model) {
            stats.invariant_violations += inv_violations.len() as u64;
            violations.extend(inv_violations.into_iter().map(Violation::Invariant));
            if config.stop_on_first_violation {
                break;
            }
        }

        stats.record(&operation, &actual_str);
    }

    let mut final_statuses = HashMap::new();
    for (_, status) in model.records.values() {
        *final_statuses.entry(*status).or_insert(0) += 1;
    }
    let snapshot = world
        .engine
        .summarize(&world.organization, world.year, &world.departments);

    SimulatorReport {
        config,
        stats,
        violations,
        final_statuses,
        final_completion_percentage: snapshot.completion_percentage,
        rejections: model.rejections,
    }
}

/// Generate a random operation based on the distribution
fn generate_operation(
    rng: &mut StdRng,
    distribution: &OperationDistribution,
    model: &ShadowModel,
    departments: usize,
) -> SimulatedOperation {
    let r: f64 = rng.gen();

    if r < distribution.valid_ops {
        generate_valid_operation(rng, model, departments)
    } else if r < distribution.valid_ops + distribution.edge_cases {
        generate_edge_case_operation(rng, model, departments)
    } else {
        generate_invalid_operation(rng, departments)
    }
}

/// Next happy-path step for a random department
fn generate_valid_operation(
    rng: &mut StdRng,
    model: &ShadowModel,
    departments: usize,
) -> SimulatedOperation {
    let d = rng.gen_range(0..departments);
    let contributor = SimActor::Contributor(d);

    match model.status(d) {
        None => SimulatedOperation::Create(d, contributor),
        Some(EvaluationStatus::Draft) => match rng.gen_range(0..3) {
            0 => SimulatedOperation::SaveDraft { department: d, actor: contributor, blank: false },
            1 => SimulatedOperation::EditAnswer(d, contributor),
            _ => SimulatedOperation::Submit(d, contributor),
        },
        Some(EvaluationStatus::Submitted) => {
            if rng.gen_bool(0.8) {
                SimulatedOperation::Approve(d, SimActor::Director)
            } else {
                SimulatedOperation::Reject {
                    department: d,
                    actor: SimActor::Director,
                    comments: "indicator evidence missing".to_string(),
                }
            }
        }
        Some(EvaluationStatus::DirectorApproved) => {
            if rng.gen_bool(0.8) {
                SimulatedOperation::Approve(d, SimActor::SeniorApprover)
            } else {
                SimulatedOperation::Reject {
                    department: d,
                    actor: SimActor::SeniorApprover,
                    comments: "targets need revisiting".to_string(),
                }
            }
        }
        Some(EvaluationStatus::AdminApproved) => SimulatedOperation::Approve(d, SimActor::SeniorApprover),
        Some(EvaluationStatus::Completed) => SimulatedOperation::Summarize,
    }
}

/// Blank inputs, duplicates and unknown ids
fn generate_edge_case_operation(
    rng: &mut StdRng,
    model: &ShadowModel,
    departments: usize,
) -> SimulatedOperation {
    let d = rng.gen_range(0..departments);
    match rng.gen_range(0..6) {
        0 if model.status(d).is_some() => SimulatedOperation::Create(d, SimActor::Contributor(d)),
        1 => SimulatedOperation::SaveDraft {
            department: d,
            actor: SimActor::Contributor(d),
            blank: true,
        },
        2 => SimulatedOperation::Reject {
            department: d,
            actor: if rng.gen_bool(0.5) { SimActor::Director } else { SimActor::SeniorApprover },
            comments: "  ".to_string(),
        },
        3 => SimulatedOperation::SubmitUnknown(SimActor::Contributor(d)),
        4 => SimulatedOperation::VerifyAudit,
        _ => SimulatedOperation::Summarize,
    }
}

/// Any operation by any actor; the model decides whether it should pass
fn generate_invalid_operation(rng: &mut StdRng, departments: usize) -> SimulatedOperation {
    let d = rng.gen_range(0..departments);
    let actor = match rng.gen_range(0..3) {
        0 => SimActor::Contributor(rng.gen_range(0..departments)),
        1 => SimActor::Director,
        _ => SimActor::SeniorApprover,
    };

    match rng.gen_range(0..6) {
        0 => SimulatedOperation::Create(d, actor),
        1 => SimulatedOperation::SaveDraft { department: d, actor, blank: false },
        2 => SimulatedOperation::EditAnswer(d, actor),
        3 => SimulatedOperation::Submit(d, actor),
        4 => SimulatedOperation::Approve(d, actor),
        _ => SimulatedOperation::Reject {
            department: d,
            actor,
            comments: "out of turn".to_string(),
        },
    }
}

struct Outcome {
    message: String,
    created: Option<RecordId>,
}

impl Outcome {
    fn says(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            created: None,
        }
    }
}

fn answers(blank: bool) -> Vec<IndicatorAnswers> {
    INDICATORS
        .iter()
        .map(|indicator| {
            let answers = if blank {
                CriteriaAnswers::new()
            } else {
                CriteriaAnswers::new()
                    .with(CriterionQuestion::TargetAchieved, "yes")
                    .with(CriterionQuestion::ContinuationPlan, "carry over")
            };
            IndicatorAnswers::new(*indicator, answers)
        })
        .collect()
}

/// Execute an operation against the engine
fn execute_operation(
    world: &SimWorld,
    model: &ShadowModel,
    operation: &SimulatedOperation,
) -> Result<Outcome, WorkflowError> {
    let engine = &world.engine;
    match operation {
        SimulatedOperation::Create(d, actor) => {
            let record = engine.create(
                &world.organization,
                world.year,
                &world.departments[*d],
                &world.actor(*actor),
            )?;
            Ok(Outcome {
                message: format!("created {}", record.id),
                created: Some(record.id),
            })
        }
        SimulatedOperation::SaveDraft { department, actor, blank } => {
            let record = engine.save_draft(
                model.record_id(*department),
                NarrativeFields::new().with_summary("simulated summary"),
                &answers(*blank),
                &world.actor(*actor),
            )?;
            Ok(Outcome::says(format!("saved version {}", record.version)))
        }
        SimulatedOperation::EditAnswer(d, actor) => {
            engine.edit_answer(
                model.record_id(*d),
                &INDICATORS[0].into(),
                CriterionQuestion::Risks,
                "staff turnover",
                &world.actor(*actor),
            )?;
            Ok(Outcome::says("answer saved"))
        }
        SimulatedOperation::Submit(d, actor) => {
            engine.submit(model.record_id(*d), &world.actor(*actor))?;
            Ok(Outcome::says("submitted"))
        }
        SimulatedOperation::Approve(d, actor) => {
            let record = engine.approve(model.record_id(*d), &world.actor(*actor))?;
            Ok(Outcome::says(format!("approved to {}", record.status)))
        }
        SimulatedOperation::Reject { department, actor, comments } => {
            engine.reject(model.record_id(*department), &world.actor(*actor), comments)?;
            Ok(Outcome::says("rejected"))
        }
        SimulatedOperation::SubmitUnknown(actor) => {
            engine.submit(RecordId::new(), &world.actor(*actor))?;
            Ok(Outcome::says("submitted unknown record"))
        }
        SimulatedOperation::Summarize => {
            let snapshot = engine.summarize(&world.organization, world.year, &world.departments);
            Ok(Outcome::says(format!("{}% complete", snapshot.completion_percentage)))
        }
        SimulatedOperation::VerifyAudit => {
            engine
                .audit_log()
                .verify_integrity()
                .map_err(|e| WorkflowError::invalid_argument("audit_log", e.to_string()))?;
            Ok(Outcome::says("audit chain intact"))
        }
    }
}

/// Cross-checks between the engine, its logs and the shadow model
struct WorkflowInvariants;

impl WorkflowInvariants {
    fn check_all(world: &SimWorld, model: &ShadowModel) -> Result<(), Vec<InvariantViolation>> {
        let checks = [
            Self::check_records(world, model),
            Self::check_audit(world),
            Self::check_summary(world),
            Self::check_notifications(world, model),
        ];
        let violations: Vec<InvariantViolation> = checks.into_iter().filter_map(Result::err).collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn check_records(world: &SimWorld, model: &ShadowModel) -> Result<(), InvariantViolation> {
        let records = world.engine.records_for_year(&world.organization, world.year);
        if records.len() != model.records.len() {
            return Err(InvariantViolation {
                check: InvariantCheck::OneRecordPerDepartment,
                details: format!("store holds {} records, model {}", records.len(), model.records.len()),
            });
        }

        for (d, (id, status)) in &model.records {
            let record = world.engine.record(*id).map_err(|e| InvariantViolation {
                check: InvariantCheck::StatusMatchesModel,
                details: format!("dept {d}: {e}"),
            })?;
            if record.status != *status {
                return Err(InvariantViolation {
                    check: InvariantCheck::StatusMatchesModel,
                    details: format!("dept {d}: engine {} model {status}", record.status),
                });
            }

            let history = world.engine.history(*id).unwrap_or_default();
            let mut current: Option<EvaluationStatus> = None;
            for entry in &history {
                let legal = match (current, entry.from) {
                    (None, None) => entry.to == EvaluationStatus::Draft,
                    (Some(cur), Some(from)) => cur == from && state_machine::is_legal_step(from, entry.to),
                    _ => false,
                };
                if !legal {
                    return Err(InvariantViolation {
                        check: InvariantCheck::HistoryFollowsStateMachine,
                        details: format!("dept {d}: illegal step {:?} -> {}", entry.from, entry.to),
                    });
                }
                current = Some(entry.to);
            }
            if current != Some(record.status) {
                return Err(InvariantViolation {
                    check: InvariantCheck::HistoryFollowsStateMachine,
                    details: format!("dept {d}: history ends at {current:?}, record is {}", record.status),
                });
            }
        }
        Ok(())
    }

    fn check_audit(world: &SimWorld) -> Result<(), InvariantViolation> {
        world
            .engine
            .audit_log()
            .verify_integrity()
            .map_err(|e| InvariantViolation {
                check: InvariantCheck::HashChainIsUnbroken,
                details: e.to_string(),
            })
    }

    fn check_summary(world: &SimWorld) -> Result<(), InvariantViolation> {
        let snapshot = world
            .engine
            .summarize(&world.organization, world.year, &world.departments);
        if snapshot.counts.total() != snapshot.total_departments
            || snapshot.total_departments != world.departments.len()
            || snapshot.completion_percentage > 100
        {
            return Err(InvariantViolation {
                check: InvariantCheck::SummaryAddsUp,
                details: format!("{snapshot:?}"),
            });
        }
        Ok(())
    }

    fn check_notifications(world: &SimWorld, model: &ShadowModel) -> Result<(), InvariantViolation> {
        let delivered = world.sink.events().len();
        if delivered != model.rejections {
            return Err(InvariantViolation {
                check: InvariantCheck::RejectionsWereNotified,
                details: format!("{delivered} notifications for {} rejections", model.rejections),
            });
        }
        Ok(())
    }
}
