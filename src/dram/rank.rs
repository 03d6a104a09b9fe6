//! Rank State Tracking.
//!
//! Ranks share the command and data buses, so a column access on one rank
//! delays column accesses on every other rank by the bus turnaround.

use serde::Serialize;

use crate::common::time::Time;
use crate::dram::command::{Command, CommandKind};

/// Activations tracked per four-activate window.
pub const ACTIVATE_WINDOW: u8 = 4;

/// Per-rank timing deadlines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    /// Activations issued in the current four-activate window (0..=3).
    pub activate_count: u8,
    pub next_act: Time,
    pub next_rd: Time,
    pub next_wr: Time,
}

/// Rank deadline that can be pushed out by another rank's activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankField {
    Activate,
    Read,
    Write,
}

impl RankEntry {
    fn field_mut(&mut self, field: RankField) -> &mut Time {
        match field {
            RankField::Activate => &mut self.next_act,
            RankField::Read => &mut self.next_rd,
            RankField::Write => &mut self.next_wr,
        }
    }

    /// Earliest time a command of `kind` may be issued to this rank.
    ///
    /// PRECHARGE has no rank-level constraint.
    pub fn deadline(&self, kind: CommandKind) -> Time {
        match kind {
            CommandKind::Precharge => 0,
            CommandKind::Activate => self.next_act,
            CommandKind::Read => self.next_rd,
            CommandKind::Write => self.next_wr,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RankTable {
    entries: Vec<RankEntry>,
}

impl RankTable {
    pub fn new(ranks: usize) -> Self {
        Self {
            entries: vec![RankEntry::default(); ranks],
        }
    }

    pub fn get(&self, rank: usize) -> &RankEntry {
        &self.entries[rank]
    }

    pub fn get_mut(&mut self, rank: usize) -> &mut RankEntry {
        &mut self.entries[rank]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pushes `field` of every rank except `rank` out to at least `time`.
    pub fn propagate_other(&mut self, rank: usize, field: RankField, time: Time) {
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            if idx != rank {
                let slot = entry.field_mut(field);
                *slot = (*slot).max(time);
            }
        }
    }

    /// Rank-level constraint for `cmd` holds at `now`.
    pub fn is_issuable(&self, cmd: &Command, now: Time) -> bool {
        now >= self.get(cmd.location.rank).deadline(cmd.kind)
    }

    /// Clears every deadline and activation window.
    pub fn reset_timing(&mut self) {
        self.entries
            .iter_mut()
            .for_each(|entry| *entry = RankEntry::default());
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankEntry> {
        self.entries.iter()
    }
}
