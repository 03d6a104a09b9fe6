//! Trace-Driven Execution Time Bound.
//!
//! Walks one task's trace and charges every request the worst-case latency a
//! [`WcetModel`] assigns to it, given whether its row is still open and what
//! the previous request was. Execution gaps between requests are added as-is.
//! Refresh is accounted twice: a row open before a refresh boundary counts
//! as closed after it, and the total is charged one refresh duration per
//! refresh interval it spans.

use serde::Serialize;

use crate::analysis::{Access, Constraints, WcetModel};
use crate::dram::mapping::AddressMapping;
use crate::sim::trace::Trace;

/// Outcome of a bound computation, in nanoseconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BoundReport {
    /// Execution plus memory plus refresh time.
    pub total: f64,
    /// Sum of the trace's execution gaps.
    pub execution: f64,
    pub accesses: u64,
    pub hits: u64,
    /// Refresh durations charged.
    pub refreshes: u64,
}

pub struct TraceBound {
    constraints: Constraints,
    mapping: AddressMapping,
}

impl TraceBound {
    pub fn new(constraints: Constraints, mapping: AddressMapping) -> Self {
        Self {
            constraints,
            mapping,
        }
    }

    fn refresh_reached(&self, clock: f64, refreshes: u64) -> bool {
        (clock / self.constraints.t_ref).floor() > refreshes as f64
    }

    /// Computes the bound of `trace` under `model`.
    pub fn run(&self, model: &dyn WcetModel, trace: &Trace) -> BoundReport {
        let banks = self.mapping.bank_count();
        let mut open_rows: Vec<Option<u64>> = vec![None; self.mapping.rank_count() * banks];

        let mut report = BoundReport::default();
        let mut clock = 0.0;
        let mut refreshes = 0u64;
        let mut previous = Access::worst_case();

        for entry in trace.entries() {
            let loc = self.mapping.decode(entry.address);
            let idx = loc.rank * banks + loc.bank;
            report.accesses += 1;

            let gap = entry.gap as f64;
            report.execution += gap;
            clock += gap;

            let crossed = self.refresh_reached(clock, refreshes);
            let hit = open_rows[idx] == Some(loc.row) && !crossed;
            if hit {
                report.hits += 1;
            } else {
                open_rows[idx] = Some(loc.row);
            }
            if crossed {
                refreshes += 1;
            }

            let current = Access::new(entry.op, hit);
            clock += model.request_latency(current, previous);
            previous = current;
        }

        let intervals = (clock / self.constraints.t_ref).ceil();
        report.refreshes = intervals as u64;
        report.total = clock + self.constraints.t_rfc * intervals;

        log::info!(
            "{} bound: {} ns over {} accesses ({} hits, {} refreshes)",
            model.name(),
            report.total,
            report.accesses,
            report.hits,
            report.refreshes
        );
        report
    }
}
