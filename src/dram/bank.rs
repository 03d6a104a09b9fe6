//! Bank State Tracking.
//!
//! One [`BankEntry`] per (rank, bank) pair, stored in a flat table. Each entry
//! holds the earliest time every command type may next target the bank and
//! the row the front end last decided to open there.

use serde::Serialize;

use crate::common::time::Time;
use crate::dram::command::{Command, CommandKind, Location, Request, RowState};

/// Per-bank timing deadlines and open row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BankEntry {
    pub next_act: Time,
    pub next_rd: Time,
    pub next_wr: Time,
    pub next_pre: Time,
    /// `None` until the bank is accessed for the first time.
    pub open_row: Option<u64>,
}

impl BankEntry {
    /// Earliest time a command of `kind` may target this bank.
    pub fn deadline(&self, kind: CommandKind) -> Time {
        match kind {
            CommandKind::Activate => self.next_act,
            CommandKind::Precharge => self.next_pre,
            CommandKind::Read => self.next_rd,
            CommandKind::Write => self.next_wr,
        }
    }

    fn reset_timing(&mut self) {
        self.next_act = 0;
        self.next_rd = 0;
        self.next_wr = 0;
        self.next_pre = 0;
    }
}

/// All banks of all ranks.
#[derive(Clone, Debug)]
pub struct BankTable {
    banks_per_rank: usize,
    entries: Vec<BankEntry>,
}

impl BankTable {
    /// Creates a table with every bank idle and no row open.
    pub fn new(ranks: usize, banks_per_rank: usize) -> Self {
        Self {
            banks_per_rank,
            entries: vec![BankEntry::default(); ranks * banks_per_rank],
        }
    }

    fn index(&self, loc: &Location) -> usize {
        loc.rank * self.banks_per_rank + loc.bank
    }

    pub fn get(&self, loc: &Location) -> &BankEntry {
        &self.entries[self.index(loc)]
    }

    pub fn get_mut(&mut self, loc: &Location) -> &mut BankEntry {
        let idx = self.index(loc);
        &mut self.entries[idx]
    }

    /// Classifies `req` against the row currently recorded for its bank.
    ///
    /// Read-only; pair with [`BankTable::commit_row_open`].
    pub fn classify(&self, req: &Request) -> RowState {
        match self.get(&req.location).open_row {
            Some(row) if row == req.location.row => RowState::Open,
            Some(_) => RowState::Closed,
            None => RowState::Empty,
        }
    }

    /// Records `req`'s row as the row its bank will hold open.
    pub fn commit_row_open(&mut self, req: &Request) {
        self.get_mut(&req.location).open_row = Some(req.location.row);
    }

    /// Bank-level constraint for `cmd` holds at `now`.
    pub fn is_issuable(&self, cmd: &Command, now: Time) -> bool {
        now >= self.get(&cmd.location).deadline(cmd.kind)
    }

    /// Clears all timing deadlines. Open rows are kept.
    pub fn reset_timing(&mut self) {
        self.entries.iter_mut().for_each(BankEntry::reset_timing);
    }

    pub fn banks_per_rank(&self) -> usize {
        self.banks_per_rank
    }

    pub fn iter(&self) -> impl Iterator<Item = &BankEntry> {
        self.entries.iter()
    }
}
