//! DRAM Memory Controller.
//!
//! The controller owns the clock, the device state, and every queue. One call
//! to [`Controller::simulate`] is one bus tick:
//!
//! 1. **Refresh check**: if a refresh interval has elapsed, drain the FIFO and
//!    count down the refresh instead of doing normal work.
//! 2. **Normal path**: generate command bursts for the head request of every
//!    requester, queue them, admit ready heads into the FIFO, and issue at
//!    most one command.
//! 3. **Clock**: advance by exactly one bus cycle.

/// Per-requester command queues, issue FIFO, and issue-time timing updates.
pub mod backend;

/// Time-ordered completion queue.
pub mod completion;

/// Request queues and command burst generation.
pub mod frontend;

/// Refresh state machine.
pub mod refresh;

use std::collections::VecDeque;

use crate::common::error::Result;
use crate::common::time::{Clock, Time};
use crate::config::ControllerConfig;
use crate::dram::bank::BankTable;
use crate::dram::command::{Command, Completion, Request};
use crate::dram::mapping::AddressMapper;
use crate::dram::rank::RankTable;
use crate::dram::timing::TimingModel;
use crate::stats::SimStats;

use backend::{BackEnd, Drain, Issued};
use completion::CompletionQueue;
use frontend::FrontEnd;
use refresh::{Refresh, RefreshPhase, RefreshStep};

pub struct Controller {
    clock: Clock,
    timing: TimingModel,
    banks: BankTable,
    ranks: RankTable,
    front: FrontEnd,
    back: BackEnd,
    refresh: Refresh,
    completions: CompletionQueue,
    last_issued: Option<Command>,
    stats: SimStats,
}

impl Controller {
    /// Creates a controller for the topology in `config`.
    ///
    /// # Returns
    ///
    /// [`crate::Error::TooManyRequesters`] if the requesters cannot each own a bank,
    /// or [`crate::Error::InvalidConfig`] for empty topologies.
    pub fn new(config: &ControllerConfig, timing: TimingModel) -> Result<Self> {
        config.validate()?;

        let mapper = AddressMapper::new(config.address_mapping, config.banks_per_rank);
        Ok(Self {
            clock: Clock::new(timing.t_ck),
            timing,
            banks: BankTable::new(config.ranks, config.banks_per_rank),
            ranks: RankTable::new(config.ranks),
            front: FrontEnd::new(config.requesters, mapper, config.interleave),
            back: BackEnd::new(config.requesters),
            refresh: Refresh::new(timing.t_ref, timing.t_rfc),
            completions: CompletionQueue::new(),
            last_issued: None,
            stats: SimStats::new(config.requesters),
        })
    }

    /// Queues a request for its requester.
    pub fn add_request(&mut self, req: Request) -> Result<()> {
        let requester = req.requester;
        self.front.add_request(req)?;
        self.stats.record_request(requester);
        Ok(())
    }

    /// Returns the earliest completion if it finishes at the current time.
    pub fn get_data(&mut self) -> Option<Completion> {
        let completion = self.completions.pop_ready(self.clock.now())?;
        self.stats.record_completion(completion.requester);
        Some(completion)
    }

    /// Simulates one bus tick.
    pub fn simulate(&mut self) {
        let now = self.clock.now();
        self.last_issued = None;

        if self.refresh.due(now) {
            self.refresh_tick(now);
        } else {
            let bursts = self.front.generate(&mut self.banks, &mut self.stats);
            self.back.enqueue_commands(bursts);
            self.back.admit(now, &self.banks);
            let issued = self
                .back
                .issue(now, &self.timing, &mut self.banks, &mut self.ranks);
            self.record(issued);
        }

        self.clock.advance();
        self.stats.ticks = self.clock.ticks();
        self.stats.sim_time = self.clock.now();
    }

    fn refresh_tick(&mut self, now: Time) {
        let drained = match self.refresh.phase() {
            RefreshPhase::Refreshing { .. } => true,
            RefreshPhase::Normal | RefreshPhase::Draining => {
                match self
                    .back
                    .drain(now, &self.timing, &mut self.banks, &mut self.ranks)
                {
                    Drain::Pending(issued) => {
                        self.record(issued);
                        false
                    }
                    Drain::Empty => {
                        self.back.clear_fifo();
                        true
                    }
                }
            }
        };

        match self.refresh.step(drained) {
            RefreshStep::Drain => self.stats.drain_ticks += 1,
            RefreshStep::Busy => self.stats.refresh_ticks += 1,
            RefreshStep::Done => {
                self.stats.refresh_ticks += 1;
                self.stats.refreshes += 1;
                self.back.repair_after_refresh();
                self.banks.reset_timing();
                self.ranks.reset_timing();
            }
        }
    }

    fn record(&mut self, issued: Option<Issued>) {
        match issued {
            Some(Issued {
                command,
                completion,
            }) => {
                self.stats.record_issue(command.kind);
                if let Some(completion) = completion {
                    self.completions.push(completion);
                }
                self.last_issued = Some(command);
            }
            None => self.stats.idle_ticks += 1,
        }
    }

    /// Current simulation time.
    pub fn now(&self) -> Time {
        self.clock.now()
    }

    pub fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    pub fn timing(&self) -> &TimingModel {
        &self.timing
    }

    pub fn banks(&self) -> &BankTable {
        &self.banks
    }

    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    /// Commands admitted but not yet issued, oldest first.
    pub fn fifo(&self) -> &VecDeque<Command> {
        self.back.fifo()
    }

    pub fn command_queue(&self, requester: usize) -> &VecDeque<Command> {
        self.back.command_queue(requester)
    }

    /// Command issued by the most recent tick, if any.
    pub fn last_issued(&self) -> Option<Command> {
        self.last_issued
    }

    pub fn refresh_phase(&self) -> RefreshPhase {
        self.refresh.phase()
    }

    pub fn refreshes_completed(&self) -> u64 {
        self.refresh.completed()
    }

    /// No request, command, or completion is left anywhere in the controller.
    pub fn is_idle(&self) -> bool {
        self.front.pending() == 0 && self.back.pending() == 0 && self.completions.is_empty()
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }
}
