//! DRAM Device Timing.
//!
//! This module holds the timing constraints of the simulated device. The
//! twelve base constraints come from a device file (one per line, value in
//! nanoseconds as the third whitespace-separated token, in a fixed order);
//! everything else is derived from them and from the read/write latencies
//! given in bus cycles.

use serde::Serialize;

use crate::common::error::{Error, Result};
use crate::common::time::{self, Time};

/// Number of base constraints a device file must provide.
pub const TIMING_PARAMETER_COUNT: usize = 12;

/// Refresh interval (tREFI) in nanoseconds.
pub const REFRESH_PERIOD_NS: f64 = 7800.0;

/// Refresh duration, counted in bus ticks.
pub const REFRESH_DURATION_TICKS: u64 = 160;

/// Refresh duration (tRFC) charged by the analytical bounds, in nanoseconds.
pub const REFRESH_DURATION_NS: f64 = 160.0;

/// Bus cycles per data burst (BL8 on a DDR bus).
const BURST_CYCLES: u64 = 4;

/// Bus cycles of dead time when switching ranks.
const RANK_SWITCH_CYCLES: u64 = 2;

/// Bus cycles the read-to-write turnaround adds on top of RL - WL.
const READ_TO_WRITE_BASE_CYCLES: i64 = 6;

/// Immutable timing constraints of a DRAM device.
///
/// All values are [`Time`] (picoseconds) except `t_rfc`, which is a tick count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimingModel {
    /// Row to column delay (ACT to READ/WRITE).
    pub t_rcd: Time,
    /// Row precharge time (PRE to ACT).
    pub t_rp: Time,
    /// Row cycle time (ACT to ACT, same bank).
    pub t_rc: Time,
    /// Row active time (ACT to PRE).
    pub t_ras: Time,
    /// Read to precharge.
    pub t_rtp: Time,
    /// Write recovery.
    pub t_wr: Time,
    /// Write to read turnaround.
    pub t_wtr: Time,
    pub t_rrd1: Time,
    pub t_rrd2: Time,
    pub t_faw1: Time,
    pub t_faw2: Time,
    /// Bus clock period.
    pub t_ck: Time,

    /// Four activate window in effect.
    pub t_faw: Time,
    /// Activate to activate spacing (different banks) in effect.
    pub t_rrd: Time,
    /// Read to write turnaround.
    pub t_rtw: Time,
    /// Read latency.
    pub t_rl: Time,
    /// Write latency.
    pub t_wl: Time,
    /// Data burst duration on the bus.
    pub t_bus: Time,
    /// Column to column delay.
    pub t_ccd: Time,
    /// Refresh interval.
    pub t_ref: Time,
    /// Refresh duration in ticks.
    pub t_rfc: u64,
    /// Rank to rank switch.
    pub t_rtr: Time,
}

impl TimingModel {
    /// Builds the model from the twelve base constraints.
    ///
    /// # Arguments
    ///
    /// * `constants` - tRCD, tRP, tRC, tRAS, tRTP, tWR, tWTR, tRRD1, tRRD2,
    ///   tFAW1, tFAW2, tCK in nanoseconds, in exactly this order.
    /// * `read_latency` - Read latency in bus cycles.
    /// * `write_latency` - Write latency in bus cycles.
    ///
    /// # Returns
    ///
    /// The derived model, or [`Error::TimingConstraintCount`] when the slice
    /// does not hold exactly twelve values.
    pub fn from_constants(
        constants: &[f64],
        read_latency: u32,
        write_latency: u32,
    ) -> Result<Self> {
        if constants.len() != TIMING_PARAMETER_COUNT {
            return Err(Error::TimingConstraintCount {
                expected: TIMING_PARAMETER_COUNT,
                found: constants.len(),
            });
        }

        let ns: Vec<Time> = constants.iter().map(|&c| time::from_ns(c)).collect();
        let t_ck = ns[11];

        let rtw_cycles = READ_TO_WRITE_BASE_CYCLES + read_latency as i64 - write_latency as i64;
        if rtw_cycles < 0 {
            log::warn!(
                "read-to-write turnaround of {} cycles is negative (RL={}, WL={}), using 0",
                rtw_cycles,
                read_latency,
                write_latency
            );
        }

        Ok(Self {
            t_rcd: ns[0],
            t_rp: ns[1],
            t_rc: ns[2],
            t_ras: ns[3],
            t_rtp: ns[4],
            t_wr: ns[5],
            t_wtr: ns[6],
            t_rrd1: ns[7],
            t_rrd2: ns[8],
            t_faw1: ns[9],
            t_faw2: ns[10],
            t_ck,
            t_faw: ns[9],
            t_rrd: ns[7],
            t_rtw: rtw_cycles.max(0) as Time * t_ck,
            t_rl: read_latency as Time * t_ck,
            t_wl: write_latency as Time * t_ck,
            t_bus: BURST_CYCLES * t_ck,
            t_ccd: BURST_CYCLES * t_ck,
            t_ref: time::from_ns(REFRESH_PERIOD_NS),
            t_rfc: REFRESH_DURATION_TICKS,
            t_rtr: RANK_SWITCH_CYCLES * t_ck,
        })
    }

    /// Parses a device timing file.
    ///
    /// Each non-blank line carries one constraint; its value is the third
    /// whitespace-separated token (`tRCD = 13.5`).
    pub fn parse(input: &str, read_latency: u32, write_latency: u32) -> Result<Self> {
        let mut constants = Vec::with_capacity(TIMING_PARAMETER_COUNT);

        for (idx, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value = line
                .split_whitespace()
                .nth(2)
                .and_then(|tok| tok.parse::<f64>().ok())
                .ok_or_else(|| Error::MalformedTiming {
                    line: idx + 1,
                    text: line.to_string(),
                })?;
            constants.push(value);
        }

        Self::from_constants(&constants, read_latency, write_latency)
    }

    /// Completion delay of a READ: read latency plus the data burst.
    pub fn read_completion(&self) -> Time {
        self.t_rl + self.t_bus
    }

    /// Completion delay of a WRITE: write latency plus the data burst.
    pub fn write_completion(&self) -> Time {
        self.t_wl + self.t_bus
    }
}
