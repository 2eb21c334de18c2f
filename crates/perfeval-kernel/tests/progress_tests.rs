//! Organization-wide progress through the engine

use perfeval_kernel::prelude::*;
use perfeval_kernel::CompletionWeights;
use perfeval_test_utils::*;
use pretty_assertions::assert_eq;

#[test]
fn test_two_of_five_completed_is_forty_percent() {
    let world = TestWorld::new();
    world.completed("finance");
    world.completed("roads");
    world.submitted("parks");

    let snapshot = world.engine.summarize(&world.org(), world.year(), &world.department_ids());

    assert_eq!(snapshot.total_departments, 5);
    assert_eq!(snapshot.counts.completed, 2);
    assert_eq!(snapshot.counts.submitted, 1);
    assert_eq!(snapshot.counts.not_started, 2);
    assert_eq!(snapshot.completion_percentage, 40);
}

#[test]
fn test_summary_is_idempotent() {
    let world = TestWorld::new();
    world.completed("finance");
    world.director_approved("health");

    let ids = world.department_ids();
    let first = world.engine.summarize(&world.org(), world.year(), &ids);
    let second = world.engine.summarize(&world.org(), world.year(), &ids);
    assert_eq!(first, second);
}

#[test]
fn test_empty_department_list_is_zero_percent() {
    let world = TestWorld::new();
    world.completed("finance");

    let snapshot = world.engine.summarize(&world.org(), world.year(), &[]);
    assert_eq!(snapshot.total_departments, 0);
    assert_eq!(snapshot.completion_percentage, 0);
}

#[test]
fn test_all_completed_is_one_hundred_percent() {
    let world = TestWorld::new();
    for (id, _) in DEMO_DEPARTMENTS {
        world.completed(id);
    }

    let report = world.engine.report(&world.org(), world.year());
    assert_eq!(report.snapshot.completion_percentage, 100);
    assert!(report
        .departments
        .iter()
        .all(|d| d.status == Some(EvaluationStatus::Completed)));
}

#[test]
fn test_rejected_record_counts_as_draft() {
    let world = TestWorld::new();
    let record = world.submitted("finance");
    world.engine.reject(record.id, &director(), "try again").unwrap();

    let snapshot = world.engine.summarize(&world.org(), world.year(), &world.department_ids());
    assert_eq!(snapshot.counts.draft, 1);
    assert_eq!(snapshot.counts.submitted, 0);
}

#[test]
fn test_other_year_is_not_counted() {
    let world = TestWorld::new();
    world.completed("finance");

    let snapshot = world
        .engine
        .summarize(&world.org(), FiscalYear(2025), &world.department_ids());
    assert_eq!(snapshot.counts.not_started, 5);
    assert_eq!(snapshot.completion_percentage, 0);
}

#[test]
fn test_weighted_progress_from_config() {
    let weights = CompletionWeights {
        director_approved: 50,
        ..CompletionWeights::COMPLETED_ONLY
    };
    let world = TestWorld::with_config(EngineConfig::new().with_completion_weights(weights));
    world.completed("finance");
    world.director_approved("roads");

    // (100 + 50) / 5
    let snapshot = world.engine.summarize(&world.org(), world.year(), &world.department_ids());
    assert_eq!(snapshot.completion_percentage, 30);
}

#[test]
fn test_report_lists_departments_in_directory_order() {
    let world = TestWorld::new();
    world.submitted("health");

    let rows: Vec<(String, Option<EvaluationStatus>)> = world
        .engine
        .report(&world.org(), world.year())
        .departments
        .into_iter()
        .map(|d| (d.department_id.to_string(), d.status))
        .collect();

    assert_eq!(
        rows,
        vec![
            ("finance".to_string(), None),
            ("roads".to_string(), None),
            ("parks".to_string(), None),
            ("health".to_string(), Some(EvaluationStatus::Submitted)),
            ("education".to_string(), None),
        ]
    );
}
