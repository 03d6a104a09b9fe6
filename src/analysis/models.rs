//! WCET Model Implementations.
//!
//! * [`Amc`]: every request pays a full row cycle per interfering requester.
//! * [`Rtss`]: single-rank open/close-page analysis with separate access and
//!   column parts.
//! * [`Rtas`]: multi-rank analysis with requesters split evenly over ranks.
//! * [`Thesis`]: multi-rank refinement of [`Rtss`] that counts how many of
//!   the interfering column transitions can be rank switches.
//!
//! Requester counts are integers; a count divided by two or by the rank
//! count is rounded down.

use crate::analysis::{Access, AccessMix, Constraints, LatencyTerms, WcetModel};
use crate::common::data::Operation;
use crate::common::error::{Error, Result};

fn check_counts(cores: usize, ranks: usize, interleave: usize) -> Result<()> {
    if cores == 0 || ranks == 0 || interleave == 0 {
        return Err(Error::InvalidConfig(
            "cores, ranks and interleave must all be at least 1".into(),
        ));
    }
    if cores < ranks {
        return Err(Error::InvalidConfig(format!(
            "{} cores cannot be split over {} ranks",
            cores, ranks
        )));
    }
    Ok(())
}

/// Access parts shared by the RTSS family, given the interfering precharge
/// (`t_ip`) and activate (`t_ia`) delays.
///
/// # Returns
///
/// `(write, closed read, open read)` access parts.
fn access_parts(c: &Constraints, t_ip: f64, t_ia: f64) -> (f64, f64, f64) {
    let read_done = c.t_rl + c.t_bus;

    let dp_closed_read = (c.t_rtp - read_done)
        .max(c.t_ras - (read_done + c.t_rcd))
        .max(0.0);
    let dp_open_read = (c.t_rtp - read_done).max(0.0);
    let dp_write = c.t_wr.max(c.t_ras - (c.t_wl + c.t_bus + c.t_rcd));

    let da_closed_read = (dp_closed_read + t_ip + c.t_rp).max(c.t_rc - (read_done + c.t_rcd));
    let da_open_read = dp_open_read + t_ip + c.t_rp;
    let da_write = dp_write + t_ip + c.t_rp;

    (
        da_write + t_ia + c.t_rcd,
        da_closed_read + t_ia + c.t_rcd,
        da_open_read + t_ia + c.t_rcd,
    )
}

/// Interfering activates for `m` requesters sharing one four-activate window.
fn interfering_activates(c: &Constraints, m: i64) -> f64 {
    (c.t_faw - 4.0 * c.t_rrd) + ((m - 1) / 4) as f64 * c.t_faw + ((m - 1) % 4) as f64 * c.t_rrd
}

fn half_up(n: i64) -> i64 {
    (n + 1).div_euclid(2)
}

fn half_down(n: i64) -> i64 {
    n.div_euclid(2)
}

/// Analyzable memory controller: close-page, one row cycle per requester.
#[derive(Clone, Debug)]
pub struct Amc {
    t_read: f64,
    t_write: f64,
}

impl Amc {
    pub fn new(c: &Constraints, cores: usize, interleave: usize) -> Result<Self> {
        check_counts(cores, 1, interleave)?;
        let burst = c.t_bus * interleave as f64;
        let others = (cores - 1) as f64 * c.t_rc;
        Ok(Self {
            t_read: c.t_rcd + c.t_rl + burst + others,
            t_write: c.t_rcd + c.t_wl + burst + others,
        })
    }
}

impl WcetModel for Amc {
    fn name(&self) -> &'static str {
        "amc"
    }

    fn request_latency(&self, current: Access, _previous: Access) -> f64 {
        match current.op {
            Operation::Read => self.t_read,
            Operation::Write => self.t_write,
        }
    }

    fn synthetic_wcet(&self, mix: &AccessMix) -> f64 {
        (1.0 - mix.write_ratio) * self.t_read + mix.write_ratio * self.t_write
    }
}

/// Open-page single-rank analysis.
#[derive(Clone, Debug)]
pub struct Rtss {
    terms: LatencyTerms,
}

impl Rtss {
    pub fn new(c: &Constraints, cores: usize, interleave: usize) -> Result<Self> {
        check_counts(cores, 1, interleave)?;
        let m = cores as i64;

        let t_ip = (m - 1) as f64 * c.t_ck;
        let t_ia = interfering_activates(c, m);
        let (ac_write, ac_closed_read, ac_open_read) = access_parts(c, t_ip, t_ia);

        let write_to_read = c.t_wtr + c.t_rtw;
        let write_done = c.t_wl + c.t_bus;
        let cd_write = half_down(m) as f64 * write_to_read + half_down(m) as f64 * write_done;
        let cd_read = (c.t_wtr + c.t_rl + c.t_bus)
            + half_down(m - 1) as f64 * write_to_read
            + half_up(m - 1) as f64 * write_done;

        Ok(Self {
            terms: LatencyTerms {
                ac_write,
                ac_closed_read,
                ac_open_read,
                cd_read,
                cd_write,
                t_wtr: c.t_wtr,
                interleave: interleave as f64,
            },
        })
    }

    pub fn terms(&self) -> &LatencyTerms {
        &self.terms
    }
}

impl WcetModel for Rtss {
    fn name(&self) -> &'static str {
        "rtss"
    }

    fn request_latency(&self, current: Access, previous: Access) -> f64 {
        self.terms.request_latency(current, previous)
    }

    fn synthetic_wcet(&self, mix: &AccessMix) -> f64 {
        self.terms.synthetic(mix)
    }
}

/// Multi-rank analysis with per-rank requester count `M_r = M / R`.
#[derive(Clone, Debug)]
pub struct Rtas {
    terms: LatencyTerms,
}

impl Rtas {
    pub fn new(c: &Constraints, cores: usize, ranks: usize, interleave: usize) -> Result<Self> {
        check_counts(cores, ranks, interleave)?;
        let r = ranks as f64;
        let mr = (cores / ranks) as i64;
        let mr_f = mr as f64;

        // Command slots free inside one data burst.
        let slots = c.t_bus / c.t_ck - 1.0;

        let t_ip = ((r * mr_f / slots).ceil() + r * mr_f - 1.0) * c.t_ck;
        let delta_ia = ((r / slots).ceil() + r - 1.0) * c.t_ck;
        let t_ia = (c.t_faw - 4.0 * c.t_rrd) + (mr_f - 1.0) * c.t_rrd + mr_f * delta_ia;
        let (ac_write, ac_closed_read, ac_open_read) = access_parts(c, t_ip, t_ia);

        let rank_rotation = r * (c.t_bus + c.t_rtr);
        let read_write = rank_rotation.max(c.t_rtw + c.t_wl - c.t_rl + c.t_bus + c.t_rtr - 1.0);
        let write_read =
            rank_rotation.max(c.t_wtr + c.t_rl + 2.0 * c.t_bus + c.t_rtr - 1.0);
        let write_tail = c.t_rl + c.t_bus - 1.0 + rank_rotation;
        let read_tail = write_tail.max(c.t_wtr + c.t_rl + 2.0 * c.t_bus + c.t_rtr - 1.0);

        let odd = (mr % 2) as f64;
        let up = half_up(mr - 1) as f64;
        let down = half_down(mr - 1) as f64;
        let even = 1.0 - odd;
        let cd_write = up * read_write + down * write_read + odd * write_tail + even * read_tail;
        let cd_read = down * read_write + up * write_read + odd * read_tail + even * write_tail;

        Ok(Self {
            terms: LatencyTerms {
                ac_write,
                ac_closed_read,
                ac_open_read,
                cd_read,
                cd_write,
                t_wtr: c.t_wtr,
                interleave: interleave as f64,
            },
        })
    }

    pub fn terms(&self) -> &LatencyTerms {
        &self.terms
    }
}

impl WcetModel for Rtas {
    fn name(&self) -> &'static str {
        "rtas"
    }

    fn request_latency(&self, current: Access, previous: Access) -> f64 {
        self.terms.request_latency(current, previous)
    }

    fn synthetic_wcet(&self, mix: &AccessMix) -> f64 {
        self.terms.synthetic(mix)
    }
}

/// Multi-rank RTSS refinement.
///
/// The column part splits the `M - 1` interfering transitions into
/// write-to-read (`x`), read-to-write (`y`) and rank-switch (`z`) gaps and
/// takes the most expensive split the arbitration allows.
#[derive(Clone, Debug)]
pub struct Thesis {
    terms: LatencyTerms,
}

impl Thesis {
    pub fn new(c: &Constraints, cores: usize, ranks: usize, interleave: usize) -> Result<Self> {
        check_counts(cores, ranks, interleave)?;
        let r = ranks as i64;
        let m = cores as i64;
        let mr = m / r;

        let t_ip = (m - 1) as f64 * c.t_ck;
        let t_ia = interfering_activates(c, mr) + (m - mr) as f64 * c.t_ck;
        let (ac_write, ac_closed_read, ac_open_read) = access_parts(c, t_ip, t_ia);

        let first_read = c.t_wtr + c.t_rl + c.t_bus;
        let first_write = c.t_wl + c.t_bus;
        let d_wr = first_read;
        let d_rw = c.t_rtw + c.t_wl - c.t_rl;
        let d_rnk = c.t_rtr + c.t_bus;

        let pairs_other = half_down(mr);
        let pairs_own_write = half_down(mr - 1);

        // An odd M_r lets every other rank open with a read; with an even
        // M_r only the rank of a write under analysis can.
        let (first_rd, first_wr, mut z_rd, mut z_wr) = if mr % 2 == 1 {
            (first_read, first_read, r - 1, r - 1)
        } else {
            (first_write, first_read, r - 1, r)
        };

        let x_rd = r * pairs_other;
        let x_wr = (r - 1) * pairs_other + pairs_own_write;

        if d_rnk >= d_rw {
            z_rd = (m - 1) - x_rd;
            z_wr = (m - 1) - x_wr;
        }

        let y_rd = m - 1 - x_rd - z_rd;
        let y_wr = m - 1 - x_wr - z_wr;

        let cd_read = first_rd + x_rd as f64 * d_wr + y_rd as f64 * d_rw + z_rd as f64 * d_rnk;
        let cd_write = first_wr + x_wr as f64 * d_wr + y_wr as f64 * d_rw + z_wr as f64 * d_rnk;

        Ok(Self {
            terms: LatencyTerms {
                ac_write,
                ac_closed_read,
                ac_open_read,
                cd_read,
                cd_write,
                t_wtr: c.t_wtr,
                interleave: interleave as f64,
            },
        })
    }

    pub fn terms(&self) -> &LatencyTerms {
        &self.terms
    }
}

impl WcetModel for Thesis {
    fn name(&self) -> &'static str {
        "thesis"
    }

    fn request_latency(&self, current: Access, previous: Access) -> f64 {
        self.terms.request_latency(current, previous)
    }

    fn synthetic_wcet(&self, mix: &AccessMix) -> f64 {
        self.terms.synthetic(mix)
    }
}
