//! Simulation statistics collection and reporting.
//!
//! Tracks issued commands, row buffer behavior, refresh overhead, and
//! per-requester progress of a controller run.

use std::time::Instant;

use serde::Serialize;

use crate::common::time::{self, Time};
use crate::dram::command::{CommandKind, RowState};

/// Progress counters of one requester.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RequesterStats {
    pub requests: u64,
    pub completions: u64,
}

/// Simulation statistics structure tracking all controller metrics.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    pub ticks: u64,
    pub sim_time: Time,

    pub cmd_precharge: u64,
    pub cmd_activate: u64,
    pub cmd_read: u64,
    pub cmd_write: u64,
    pub idle_ticks: u64,

    pub row_hits: u64,
    pub row_empty: u64,
    pub row_conflicts: u64,

    pub refreshes: u64,
    pub drain_ticks: u64,
    pub refresh_ticks: u64,

    pub completions: u64,
    pub requesters: Vec<RequesterStats>,
}

impl SimStats {
    pub fn new(requesters: usize) -> Self {
        Self {
            start_time: Instant::now(),
            ticks: 0,
            sim_time: 0,
            cmd_precharge: 0,
            cmd_activate: 0,
            cmd_read: 0,
            cmd_write: 0,
            idle_ticks: 0,
            row_hits: 0,
            row_empty: 0,
            row_conflicts: 0,
            refreshes: 0,
            drain_ticks: 0,
            refresh_ticks: 0,
            completions: 0,
            requesters: vec![RequesterStats::default(); requesters],
        }
    }

    pub fn record_issue(&mut self, kind: CommandKind) {
        match kind {
            CommandKind::Precharge => self.cmd_precharge += 1,
            CommandKind::Activate => self.cmd_activate += 1,
            CommandKind::Read => self.cmd_read += 1,
            CommandKind::Write => self.cmd_write += 1,
        }
    }

    pub fn record_row_state(&mut self, state: RowState) {
        match state {
            RowState::Open => self.row_hits += 1,
            RowState::Empty => self.row_empty += 1,
            RowState::Closed => self.row_conflicts += 1,
        }
    }

    pub fn record_request(&mut self, requester: usize) {
        self.requesters[requester].requests += 1;
    }

    pub fn record_completion(&mut self, requester: usize) {
        self.completions += 1;
        self.requesters[requester].completions += 1;
    }

    /// Total commands issued.
    pub fn commands(&self) -> u64 {
        self.cmd_precharge + self.cmd_activate + self.cmd_read + self.cmd_write
    }

    /// Prints a formatted summary of all simulation statistics.
    ///
    /// Goes to stderr so that stdout carries only the run's result.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let ticks = self.ticks.max(1) as f64;
        let khz = if seconds > 0.0 {
            (self.ticks as f64 / seconds) / 1000.0
        } else {
            0.0
        };
        let classified = (self.row_hits + self.row_empty + self.row_conflicts).max(1) as f64;

        eprintln!("\n==========================================================");
        eprintln!("MEMORY CONTROLLER SIMULATION STATISTICS");
        eprintln!("==========================================================");
        eprintln!("host_seconds             {:.4} s", seconds);
        eprintln!("sim_ticks                {}", self.ticks);
        eprintln!("sim_time                 {} ns", time::to_ns(self.sim_time));
        eprintln!("sim_freq                 {:.2} kHz", khz);
        eprintln!("----------------------------------------------------------");
        eprintln!("COMMANDS");
        let share = |name: &str, n: u64| {
            eprintln!("  {:<23}{} ({:.2}%)", name, n, (n as f64 / ticks) * 100.0)
        };
        share("cmd.pre", self.cmd_precharge);
        share("cmd.act", self.cmd_activate);
        share("cmd.rd", self.cmd_read);
        share("cmd.wr", self.cmd_write);
        share("ticks.idle", self.idle_ticks);
        eprintln!("----------------------------------------------------------");
        eprintln!("ROW BUFFER");
        eprintln!(
            "  row.hit                {} ({:.2}%)",
            self.row_hits,
            (self.row_hits as f64 / classified) * 100.0
        );
        eprintln!(
            "  row.empty              {} ({:.2}%)",
            self.row_empty,
            (self.row_empty as f64 / classified) * 100.0
        );
        eprintln!(
            "  row.conflict           {} ({:.2}%)",
            self.row_conflicts,
            (self.row_conflicts as f64 / classified) * 100.0
        );
        eprintln!("----------------------------------------------------------");
        eprintln!("REFRESH");
        eprintln!("  ref.count              {}", self.refreshes);
        share("ref.drain_ticks", self.drain_ticks);
        share("ref.busy_ticks", self.refresh_ticks);
        eprintln!("----------------------------------------------------------");
        eprintln!("REQUESTERS");
        for (id, r) in self.requesters.iter().enumerate() {
            eprintln!(
                "  core{:<3} requests: {:<10} | completions: {:<10}",
                id, r.requests, r.completions
            );
        }
        eprintln!("==========================================================");
    }
}
