//! Analytical WCET Models.
//!
//! Closed-form worst-case latency bounds for a single memory request under
//! contention from the other requesters. Every model works on the device
//! constraints in nanoseconds ([`Constraints`]) and answers two questions:
//!
//! * **Per request**: the bound for one request given the request before it
//!   ([`WcetModel::request_latency`]). The trace-driven bound in [`bound`]
//!   sums these along a trace.
//! * **Synthetic**: the average per-request bound for a task with a given
//!   write ratio and row-hit ratio ([`WcetModel::synthetic_wcet`]).
//!
//! The RTSS-family models split a request into an access part (precharge and
//! activate, only paid on a row miss) and a column part (paid once per column
//! access). [`LatencyTerms`] holds those parts; the models differ only in how
//! they compute them.

/// Trace-driven execution time bound.
pub mod bound;

/// The four latency models.
pub mod models;

use std::fmt;
use std::str::FromStr;

use crate::common::data::Operation;
use crate::common::error::{Error, Result};
use crate::common::time;
use crate::dram::timing::{TimingModel, REFRESH_DURATION_NS};

pub use bound::{BoundReport, TraceBound};
pub use models::{Amc, Rtas, Rtss, Thesis};

/// Device constraints in nanoseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraints {
    pub t_rcd: f64,
    pub t_rp: f64,
    pub t_rc: f64,
    pub t_ras: f64,
    pub t_rtp: f64,
    pub t_wr: f64,
    pub t_wtr: f64,
    pub t_rrd: f64,
    pub t_faw: f64,
    pub t_ck: f64,
    pub t_rtw: f64,
    pub t_rl: f64,
    pub t_wl: f64,
    pub t_bus: f64,
    pub t_ref: f64,
    /// Refresh duration.
    pub t_rfc: f64,
    pub t_rtr: f64,
}

impl From<&TimingModel> for Constraints {
    fn from(t: &TimingModel) -> Self {
        let ns = time::to_ns;
        Self {
            t_rcd: ns(t.t_rcd),
            t_rp: ns(t.t_rp),
            t_rc: ns(t.t_rc),
            t_ras: ns(t.t_ras),
            t_rtp: ns(t.t_rtp),
            t_wr: ns(t.t_wr),
            t_wtr: ns(t.t_wtr),
            t_rrd: ns(t.t_rrd),
            t_faw: ns(t.t_faw),
            t_ck: ns(t.t_ck),
            t_rtw: ns(t.t_rtw),
            t_rl: ns(t.t_rl),
            t_wl: ns(t.t_wl),
            t_bus: ns(t.t_bus),
            t_ref: ns(t.t_ref),
            t_rfc: REFRESH_DURATION_NS,
            t_rtr: ns(t.t_rtr),
        }
    }
}

/// Read/write and row-hit composition of a synthetic task.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccessMix {
    /// Fraction of requests that are writes.
    pub write_ratio: f64,
    /// Fraction of requests that hit an open row.
    pub row_hit_ratio: f64,
}

impl Default for AccessMix {
    fn default() -> Self {
        Self {
            write_ratio: 0.0,
            row_hit_ratio: 1.0,
        }
    }
}

impl AccessMix {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("write ratio", self.write_ratio),
            ("row hit ratio", self.row_hit_ratio),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }
}

/// A request as seen by the per-request analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Access {
    pub op: Operation,
    /// The request's row was already open.
    pub hit: bool,
}

impl Access {
    pub fn new(op: Operation, hit: bool) -> Self {
        Self { op, hit }
    }

    /// Assumed predecessor of the first request: a write that missed.
    pub fn worst_case() -> Self {
        Self::new(Operation::Write, false)
    }
}

/// A worst-case latency model.
pub trait WcetModel {
    /// Short lowercase name.
    fn name(&self) -> &'static str;

    /// Worst-case latency of `current` when it follows `previous`, in ns.
    ///
    /// # Arguments
    ///
    /// * `current` - The request being bounded.
    /// * `previous` - The request issued before it by the same task.
    fn request_latency(&self, current: Access, previous: Access) -> f64;

    /// Average worst-case latency per request of a task with `mix`, in ns.
    fn synthetic_wcet(&self, mix: &AccessMix) -> f64;
}

/// Access and column parts of the RTSS-family bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatencyTerms {
    /// Access part of a miss following a write.
    pub ac_write: f64,
    /// Access part of a miss following a read that missed.
    pub ac_closed_read: f64,
    /// Access part of a miss following a read that hit.
    pub ac_open_read: f64,
    /// Column part of one read column access.
    pub cd_read: f64,
    /// Column part of one write column access.
    pub cd_write: f64,
    /// Write-to-read turnaround.
    pub t_wtr: f64,
    /// Column accesses per request.
    pub interleave: f64,
}

impl LatencyTerms {
    /// Case analysis over the previous request.
    pub fn request_latency(&self, current: Access, previous: Access) -> f64 {
        let access = match (previous.op, previous.hit, current.hit) {
            (Operation::Write, _, false) => self.ac_write,
            (Operation::Read, false, false) => self.ac_closed_read,
            (Operation::Read, true, false) => self.ac_open_read,
            (Operation::Write, _, true) if current.op == Operation::Read => self.t_wtr,
            _ => 0.0,
        };

        let column = match current.op {
            Operation::Read => self.cd_read,
            Operation::Write => self.cd_write,
        };

        access + column * self.interleave
    }

    /// Greedy worst cumulative pattern over a task's read/write and hit mix.
    pub fn synthetic(&self, mix: &AccessMix) -> f64 {
        let wr = mix.write_ratio;
        let rd = 1.0 - wr;
        let hit = mix.row_hit_ratio;
        let miss = 1.0 - hit;

        let column = rd * self.cd_read + wr * self.cd_write;
        let write_penalty = self.ac_write - self.ac_closed_read;
        let mut access = miss * self.ac_closed_read;

        if write_penalty >= self.t_wtr {
            if wr > miss {
                access += write_penalty * miss;
                access += self.t_wtr * (wr - miss);
            } else {
                access += write_penalty * wr;
            }
        } else if wr > hit * rd {
            access += self.t_wtr * (hit * rd);
            access += write_penalty * (wr - hit * rd);
        } else {
            access += self.t_wtr * wr;
        }

        access + column * self.interleave
    }
}

/// Selects one of the four models by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Amc,
    Rtss,
    Rtas,
    Thesis,
}

impl ModelKind {
    /// Builds the model for `cores` requesters over `ranks` ranks.
    pub fn build(
        self,
        constraints: &Constraints,
        cores: usize,
        ranks: usize,
        interleave: usize,
    ) -> Result<Box<dyn WcetModel>> {
        Ok(match self {
            ModelKind::Amc => Box::new(Amc::new(constraints, cores, interleave)?),
            ModelKind::Rtss => Box::new(Rtss::new(constraints, cores, interleave)?),
            ModelKind::Rtas => Box::new(Rtas::new(constraints, cores, ranks, interleave)?),
            ModelKind::Thesis => Box::new(Thesis::new(constraints, cores, ranks, interleave)?),
        })
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "amc" => Ok(ModelKind::Amc),
            "rtss" => Ok(ModelKind::Rtss),
            "rtas" => Ok(ModelKind::Rtas),
            "thesis" => Ok(ModelKind::Thesis),
            other => Err(Error::InvalidConfig(format!(
                "unknown model {:?} (expected amc, rtss, rtas or thesis)",
                other
            ))),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Amc => "amc",
            ModelKind::Rtss => "rtss",
            ModelKind::Rtas => "rtas",
            ModelKind::Thesis => "thesis",
        };
        f.write_str(name)
    }
}
