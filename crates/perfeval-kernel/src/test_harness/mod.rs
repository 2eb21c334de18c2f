//! Seeded workflow simulation
//!
//! [`run_simulator`] drives one engine through a random operation stream and
//! checks it against a shadow model. [`TestHarness`] batches those runs: a
//! stress run over many departments, and a certification sweep across seeds
//! that also reports how far the organization got through the approval chain.

pub mod simulator;

pub use simulator::*;

use perfeval_model::EvaluationStatus;
use tracing::{info, warn};

/// Batch runner over [`run_simulator`]
pub struct TestHarness;

impl TestHarness {
    const STRESS_SEED: u64 = 12345;

    /// Run one long simulation over `departments` departments
    pub fn run_stress_test(departments: usize, iterations: usize) -> StressTestReport {
        info!(departments, iterations, "running workflow stress test");

        let report = run_simulator(SimulatorConfig {
            seed: Self::STRESS_SEED,
            total_operations: iterations as u64,
            departments,
            ..Default::default()
        });

        let stress = StressTestReport {
            departments,
            iterations,
            violations: report.violations.len(),
            rejections: report.rejections,
            completed_departments: status_count(&report, EvaluationStatus::Completed),
            completion_percentage: report.final_completion_percentage,
            success: report.passed(),
        };
        if !stress.success {
            warn!(violations = stress.violations, "stress run found violations");
        }
        stress
    }

    /// Run seeds `0..seeds`, each for `operations` steps, and fold the
    /// per-seed outcomes into one report
    pub fn run_certification(seeds: u64, operations: u64) -> CertificationReport {
        info!(seeds, operations, "running workflow certification");

        let mut certification = CertificationReport::default();
        for seed in 0..seeds {
            let report = run_simulator(SimulatorConfig {
                seed,
                total_operations: operations,
                stop_on_first_violation: false,
                ..Default::default()
            });
            certification.record(seed, &report);
        }

        info!(
            passed = certification.passed(),
            min = certification.min_completion,
            max = certification.max_completion,
            "certification finished"
        );
        certification
    }
}

fn status_count(report: &SimulatorReport, status: EvaluationStatus) -> usize {
    report.final_statuses.get(&status).copied().unwrap_or(0)
}

/// Outcome of a single stress run
#[derive(Debug, Clone)]
pub struct StressTestReport {
    pub departments: usize,
    pub iterations: usize,
    pub violations: usize,
    pub rejections: usize,
    /// Departments whose record reached `completed`
    pub completed_departments: usize,
    pub completion_percentage: u8,
    pub success: bool,
}

/// Outcome of a certification sweep
#[derive(Debug, Clone, Default)]
pub struct CertificationReport {
    pub seeds_tested: u64,
    pub total_violations: usize,
    /// Seeds that produced at least one violation
    pub failing_seeds: Vec<u64>,
    pub total_rejections: usize,
    /// Final completion percentage per seed, in seed order
    pub completion_by_seed: Vec<u8>,
    pub min_completion: u8,
    pub max_completion: u8,
}

impl CertificationReport {
    fn record(&mut self, seed: u64, report: &SimulatorReport) {
        let completion = report.final_completion_percentage;
        if self.completion_by_seed.is_empty() {
            self.min_completion = completion;
            self.max_completion = completion;
        } else {
            self.min_completion = self.min_completion.min(completion);
            self.max_completion = self.max_completion.max(completion);
        }
        self.completion_by_seed.push(completion);

        self.seeds_tested += 1;
        self.total_rejections += report.rejections;
        self.total_violations += report.violations.len();
        if !report.passed() {
            self.failing_seeds.push(seed);
        }
    }

    /// Every seed ran clean
    pub fn passed(&self) -> bool {
        self.failing_seeds.is_empty() && self.total_violations == 0
    }

    /// Mean completion across seeds, rounded half up
    pub fn mean_completion(&self) -> u8 {
        let n = self.completion_by_seed.len() as u64;
        if n == 0 {
            return 0;
        }
        let sum: u64 = self.completion_by_seed.iter().map(|c| u64::from(*c)).sum();
        u8::try_from((2 * sum + n) / (2 * n)).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certification_folds_every_seed() {
        let report = TestHarness::run_certification(3, 400);

        assert_eq!(report.seeds_tested, 3);
        assert_eq!(report.completion_by_seed.len(), 3);
        assert!(report.passed(), "failing seeds: {:?}", report.failing_seeds);
        assert!(report.min_completion <= report.mean_completion());
        assert!(report.mean_completion() <= report.max_completion);
        assert!(report.max_completion <= 100);
    }

    #[test]
    fn empty_sweep_has_zero_mean() {
        let report = CertificationReport::default();
        assert_eq!(report.mean_completion(), 0);
        assert!(report.passed());
    }

    #[test]
    fn stress_report_counts_completed_departments() {
        let report = TestHarness::run_stress_test(4, 1_500);

        assert!(report.success);
        assert!(report.completed_departments <= report.departments);
        assert_eq!(
            report.completion_percentage == 0,
            report.completed_departments == 0
        );
    }
}
