use perfeval_kernel::prelude::*;
use perfeval_kernel::state_machine::{is_legal_step, resolve};
use perfeval_kernel::{CompletionWeights, ErrorKind};
use perfeval_model::RecordKey;
use perfeval_test_utils::*;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Step {
    Edit,
    Submit,
    Approve,
    Reject,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Edit),
        Just(Step::Submit),
        Just(Step::Approve),
        Just(Step::Reject),
    ]
}

fn actor() -> impl Strategy<Value = Actor> {
    prop_oneof![
        Just(contributor("finance")),
        Just(contributor("roads")),
        Just(director()),
        Just(senior_approver()),
    ]
}

fn status() -> impl Strategy<Value = EvaluationStatus> {
    prop_oneof![
        Just(EvaluationStatus::Draft),
        Just(EvaluationStatus::Submitted),
        Just(EvaluationStatus::DirectorApproved),
        Just(EvaluationStatus::AdminApproved),
        Just(EvaluationStatus::Completed),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_status_only_moves_along_legal_edges(
        steps in proptest::collection::vec((step(), actor()), 1..40)
    ) {
        let world = TestWorld::new();
        let record = world.filled_draft("finance");

        for (step, actor) in steps {
            let before = world.engine.record(record.id).unwrap();
            let answers_before = world.engine.indicator_evaluations(record.id).unwrap();

            let result = match step {
                Step::Edit => world
                    .engine
                    .edit_answer(record.id, &first_indicator(), CriterionQuestion::Risks, "edited", &actor)
                    .map(|_| ()),
                Step::Submit => world.engine.submit(record.id, &actor).map(|_| ()),
                Step::Approve => world.engine.approve(record.id, &actor).map(|_| ()),
                Step::Reject => world.engine.reject(record.id, &actor, "revise").map(|_| ()),
            };

            let after = world.engine.record(record.id).unwrap();
            match result {
                Ok(()) => {
                    if after.status != before.status {
                        prop_assert!(is_legal_step(before.status, after.status));
                    }
                    prop_assert_eq!(after.version, before.version + 1);
                }
                Err(_) => {
                    prop_assert_eq!(&after, &before);
                    prop_assert_eq!(
                        world.engine.indicator_evaluations(record.id).unwrap(),
                        answers_before.clone()
                    );
                }
            }

            if !before.is_editable() {
                prop_assert_eq!(world.engine.indicator_evaluations(record.id).unwrap(), answers_before);
            }
        }

        let history = world.engine.history(record.id).unwrap();
        prop_assert_eq!(history.last().map(|e| e.to), Some(world.status_of(record.id)));
    }

    #[test]
    fn prop_approval_outcome_matches_transition_table(
        start in status(),
        who in actor(),
    ) {
        let world = TestWorld::new();
        let record = match start {
            EvaluationStatus::Draft => world.filled_draft("roads"),
            EvaluationStatus::Submitted => world.submitted("roads"),
            EvaluationStatus::DirectorApproved => world.director_approved("roads"),
            EvaluationStatus::AdminApproved => world.admin_approved("roads"),
            EvaluationStatus::Completed => world.completed("roads"),
        };

        let result = world.engine.approve(record.id, &who);
        match resolve(Operation::Approve, start, who.role) {
            Ok(rule) => prop_assert_eq!(result.unwrap().status, rule.to),
            Err(_) => {
                let kind = result.unwrap_err().kind();
                prop_assert!(kind == ErrorKind::InvalidState || kind == ErrorKind::Unauthorized);
                prop_assert_eq!(world.status_of(record.id), start);
            }
        }
    }

    #[test]
    fn prop_rejection_preserves_arbitrary_answers(
        text in "[a-zA-Z0-9 ]{1,60}",
        comments in "[a-z]{1,20}",
    ) {
        let world = TestWorld::new();
        let record = world.start("parks");
        let author = contributor("parks");
        world
            .engine
            .edit_answer(record.id, &first_indicator(), CriterionQuestion::NeedsChange, &text, &author)
            .unwrap();
        world.engine.submit(record.id, &author).unwrap();
        let before = world.engine.indicator_evaluations(record.id).unwrap();

        world.engine.reject(record.id, &director(), &comments).unwrap();

        prop_assert_eq!(world.engine.indicator_evaluations(record.id).unwrap(), before);
        prop_assert_eq!(
            world.engine.record(record.id).unwrap().director_comments,
            Some(comments)
        );
    }

    #[test]
    fn prop_percentage_stays_in_range(
        statuses in proptest::collection::vec(proptest::option::of(status()), 0..30),
        partial in 0u8..=100,
    ) {
        let org = OrganizationId::new("org");
        let year = FiscalYear(2024);
        let departments: Vec<DepartmentId> =
            (0..statuses.len()).map(|i| DepartmentId::new(format!("d{i}"))).collect();
        let records: Vec<EvaluationRecord> = statuses
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|s| (i, s)))
            .map(|(i, s)| {
                let mut r = EvaluationRecord::new(RecordKey::new("org", 2024, format!("d{i}")), "u".into());
                r.status = s;
                r
            })
            .collect();

        let weights = CompletionWeights { submitted: partial, ..CompletionWeights::COMPLETED_ONLY };
        for aggregator in [ProgressAggregator::default(), ProgressAggregator::new(weights)] {
            let snapshot = aggregator.summarize(&org, year, &departments, &records);
            prop_assert!(snapshot.completion_percentage <= 100);
            prop_assert_eq!(snapshot.counts.total(), snapshot.total_departments);
            prop_assert_eq!(snapshot.total_departments, departments.len());
        }

        let completed = statuses.iter().filter(|s| **s == Some(EvaluationStatus::Completed)).count();
        let snapshot = ProgressAggregator::default().summarize(&org, year, &departments, &records);
        prop_assert_eq!(snapshot.counts.completed, completed);
        if completed == statuses.len() && !statuses.is_empty() {
            prop_assert_eq!(snapshot.completion_percentage, 100);
        }
        if completed == 0 {
            prop_assert_eq!(snapshot.completion_percentage, 0);
        }
    }
}
