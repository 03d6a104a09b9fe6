//! Interleaving Estimator.
//!
//! A coarse model of several tasks sharing one memory: every access occupies
//! the memory for a fixed access time, and each task becomes ready again a
//! trace gap after its previous access was served. Trace 0 is the task under
//! analysis and the estimate ends when its trace is exhausted; the other
//! traces rewind and keep interfering.

use serde::Serialize;

use crate::common::error::{Error, Result};
use crate::sim::trace::Trace;

/// Row cycle time of a DDR3-1333H device, in nanoseconds.
pub const DEFAULT_ACCESS_TIME_NS: f64 = 49.5;

/// Which ready task is served next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Arbitration {
    /// Earliest ready time first; lowest index on ties.
    Fcfs,
    /// Rotate over the tasks; when the task in turn is not ready, serve the
    /// earliest ready task in rotation order.
    #[default]
    RoundRobin,
}

/// Outcome of an estimate.
#[derive(Clone, Debug, Serialize)]
pub struct InterleaveReport {
    /// Time at which the last access of trace 0 was served, in nanoseconds.
    pub total_ns: f64,
    /// Accesses served per trace.
    pub accesses: Vec<u64>,
}

pub struct InterleaveEstimator {
    arbitration: Arbitration,
    access_time: f64,
}

struct Arbiter {
    ready: Vec<f64>,
    now: f64,
    rr_index: usize,
}

impl Arbiter {
    fn smallest(&self) -> usize {
        let mut best = 0;
        for (idx, &t) in self.ready.iter().enumerate() {
            if t < self.ready[best] {
                best = idx;
            }
        }
        best
    }

    fn next_in_rotation(&mut self) -> usize {
        let n = self.ready.len();
        let current = self.rr_index;

        if self.ready[current] <= self.now {
            self.rr_index = (current + 1) % n;
            return current;
        }

        // Strictly smaller only, so ties keep rotation order.
        let mut chosen = current;
        let mut idx = (current + 1) % n;
        while idx != current {
            if self.ready[idx] < self.ready[chosen] {
                chosen = idx;
            }
            idx = (idx + 1) % n;
        }
        self.rr_index = (chosen + 1) % n;
        chosen
    }
}

impl InterleaveEstimator {
    pub fn new(arbitration: Arbitration, access_time_ns: f64) -> Self {
        Self {
            arbitration,
            access_time: access_time_ns,
        }
    }

    pub fn arbitration(&self) -> Arbitration {
        self.arbitration
    }

    /// Runs the estimate over `traces`.
    ///
    /// # Returns
    ///
    /// [`Error::InvalidConfig`] if no trace is given or any trace is empty.
    pub fn run(&self, traces: &[Trace]) -> Result<InterleaveReport> {
        if traces.is_empty() {
            return Err(Error::InvalidConfig(
                "interleaving needs at least one trace".into(),
            ));
        }
        if let Some(empty) = traces.iter().find(|t| t.is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "trace {} is empty",
                empty.path().display()
            )));
        }

        let mut cursors = vec![1usize; traces.len()];
        let mut accesses = vec![0u64; traces.len()];
        let mut arbiter = Arbiter {
            ready: traces.iter().map(|t| t.entries()[0].gap as f64).collect(),
            now: 0.0,
            rr_index: 0,
        };

        loop {
            let s = match self.arbitration {
                Arbitration::Fcfs => arbiter.smallest(),
                Arbitration::RoundRobin => arbiter.next_in_rotation(),
            };

            arbiter.now = if arbiter.now < arbiter.ready[s] {
                arbiter.ready[s] + self.access_time
            } else {
                arbiter.now + self.access_time
            };
            accesses[s] += 1;

            match traces[s].get(cursors[s]) {
                Some(entry) => {
                    arbiter.ready[s] = entry.gap as f64 + arbiter.now;
                    cursors[s] += 1;
                }
                None if s == 0 => break,
                // A rewound interferer is ready again at once; its first gap
                // was already consumed.
                None => {
                    arbiter.ready[s] = arbiter.now;
                    cursors[s] = 1;
                }
            }
        }

        log::info!(
            "interleaving ({:?}) finished at {} ns after {} accesses of trace 0",
            self.arbitration,
            arbiter.now,
            accesses[0]
        );

        Ok(InterleaveReport {
            total_ns: arbiter.now,
            accesses,
        })
    }
}

impl Default for InterleaveEstimator {
    fn default() -> Self {
        Self::new(Arbitration::default(), DEFAULT_ACCESS_TIME_NS)
    }
}
