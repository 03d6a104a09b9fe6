//! Integration tests for the fixed-access-time interleaving estimate.

use memctrl_sim::common::Operation;
use memctrl_sim::sim::interleave::{Arbitration, InterleaveEstimator, DEFAULT_ACCESS_TIME_NS};
use memctrl_sim::sim::trace::{Trace, TraceEntry};
use memctrl_sim::Error;

/// Builds a trace of reads with the given gaps.
fn gaps(gaps: &[u64]) -> Trace {
    Trace::new(
        "t",
        gaps.iter()
            .map(|&gap| TraceEntry {
                address: 0,
                op: Operation::Read,
                gap,
            })
            .collect(),
    )
}

fn both() -> [InterleaveEstimator; 2] {
    [
        InterleaveEstimator::new(Arbitration::Fcfs, DEFAULT_ACCESS_TIME_NS),
        InterleaveEstimator::new(Arbitration::RoundRobin, DEFAULT_ACCESS_TIME_NS),
    ]
}

/// Tests a single task with no interference.
#[test]
fn test_single_task() {
    let report = InterleaveEstimator::default().run(&[gaps(&[0, 10, 0])]).unwrap();
    assert_eq!(report.total_ns, 49.5 * 3.0 + 10.0);
    assert_eq!(report.accesses, vec![3]);
}

/// Tests alternating service of two ready tasks.
#[test]
fn test_two_tasks() {
    for estimator in both() {
        let report = estimator.run(&[gaps(&[0, 0]), gaps(&[0])]).unwrap();
        assert_eq!(report.total_ns, 148.5, "{:?}", estimator.arbitration());
        assert_eq!(report.accesses, vec![2, 1]);
    }
}

/// Tests that a late task yields to a ready interferer.
#[test]
fn test_late_task_yields() {
    for estimator in both() {
        let report = estimator.run(&[gaps(&[100]), gaps(&[0])]).unwrap();
        assert_eq!(report.total_ns, 198.0, "{:?}", estimator.arbitration());
        assert_eq!(report.accesses, vec![1, 3]);
    }
}

/// Tests that rewound interferers do not starve the analyzed task.
#[test]
fn test_rewound_interferer_yields() {
    for estimator in both() {
        let report = estimator.run(&[gaps(&[0, 500]), gaps(&[0])]).unwrap();
        assert_eq!(report.total_ns, 643.5, "{:?}", estimator.arbitration());
        assert_eq!(report.accesses, vec![2, 11]);
    }
}

/// Tests three tasks.
#[test]
fn test_three_tasks() {
    for estimator in both() {
        let report = estimator
            .run(&[gaps(&[0, 0, 0]), gaps(&[0]), gaps(&[0])])
            .unwrap();
        assert_eq!(report.total_ns, 346.5);
        assert_eq!(report.accesses, vec![3, 2, 2]);
    }
}

/// Tests rejected inputs.
#[test]
fn test_invalid_inputs() {
    let estimator = InterleaveEstimator::default();
    assert_eq!(estimator.arbitration(), Arbitration::RoundRobin);
    assert!(matches!(estimator.run(&[]), Err(Error::InvalidConfig(_))));
    assert!(matches!(
        estimator.run(&[gaps(&[0]), Trace::default()]),
        Err(Error::InvalidConfig(_))
    ));
}
