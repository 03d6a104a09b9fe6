//! Back End: Issue Arbitration.
//!
//! Generated commands wait in per-requester command queues. The head of a
//! queue moves into the shared issue FIFO once its bank is ready and the
//! requester has nothing else in the FIFO. Each tick the first FIFO entry
//! whose rank is ready is issued and the bank/rank deadlines are advanced.

use std::collections::VecDeque;

use crate::common::time::{self, Time};
use crate::dram::bank::BankTable;
use crate::dram::command::{Command, CommandKind, Completion};
use crate::dram::rank::{RankField, RankTable, ACTIVATE_WINDOW};
use crate::dram::timing::TimingModel;

/// A command that left the FIFO this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Issued {
    pub command: Command,
    /// Set for column commands.
    pub completion: Option<Completion>,
}

/// Outcome of one refresh drain attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drain {
    /// Column commands were still queued; at most one was issued.
    Pending(Option<Issued>),
    /// No column command is left in the FIFO.
    Empty,
}

pub struct BackEnd {
    command_queues: Vec<VecDeque<Command>>,
    fifo: VecDeque<Command>,
}

impl BackEnd {
    pub fn new(requesters: usize) -> Self {
        Self {
            command_queues: (0..requesters).map(|_| VecDeque::new()).collect(),
            fifo: VecDeque::new(),
        }
    }

    /// Appends generated bursts to their requesters' command queues.
    pub fn enqueue_commands(&mut self, bursts: Vec<Vec<Command>>) {
        for cmd in bursts.into_iter().flatten() {
            self.command_queues[cmd.requester].push_back(cmd);
        }
    }

    /// Moves ready queue heads into the FIFO, in requester order.
    pub fn admit(&mut self, now: Time, banks: &BankTable) {
        for queue in self.command_queues.iter_mut() {
            let Some(head) = queue.front() else {
                continue;
            };
            let in_flight = self.fifo.iter().any(|c| c.requester == head.requester);
            if !in_flight && banks.is_issuable(head, now) {
                log::trace!("@{}: enqueue {}", now, head);
                self.fifo.extend(queue.pop_front());
            }
        }
    }

    /// Issues the first FIFO entry whose rank is ready.
    ///
    /// Once a column command is found blocked, later column commands are not
    /// considered this tick; row commands still are.
    pub fn issue(
        &mut self,
        now: Time,
        timing: &TimingModel,
        banks: &mut BankTable,
        ranks: &mut RankTable,
    ) -> Option<Issued> {
        let mut cas_blocked = false;
        let mut selected = None;

        for (pos, cmd) in self.fifo.iter().enumerate() {
            if cmd.kind.is_cas() && cas_blocked {
                continue;
            }
            if ranks.is_issuable(cmd, now) {
                selected = Some(pos);
                break;
            }
            if cmd.kind.is_cas() {
                cas_blocked = true;
            }
        }

        let cmd = self.fifo.remove(selected?)?;
        Some(issue_command(cmd, now, timing, banks, ranks))
    }

    /// Issues one remaining column command ahead of a refresh.
    ///
    /// Row commands are skipped but left in place.
    pub fn drain(
        &mut self,
        now: Time,
        timing: &TimingModel,
        banks: &mut BankTable,
        ranks: &mut RankTable,
    ) -> Drain {
        if !self.fifo.iter().any(|c| c.kind.is_cas()) {
            return Drain::Empty;
        }

        let ready = self
            .fifo
            .iter()
            .position(|c| c.kind.is_cas() && ranks.is_issuable(c, now));
        let issued = ready
            .and_then(|pos| self.fifo.remove(pos))
            .map(|cmd| issue_command(cmd, now, timing, banks, ranks));
        Drain::Pending(issued)
    }

    /// Drops everything in the FIFO.
    pub fn clear_fifo(&mut self) {
        if !self.fifo.is_empty() {
            log::debug!("discarding {} row command(s) from the FIFO", self.fifo.len());
        }
        self.fifo.clear();
    }

    /// Fixes the command queue heads after a refresh closed every row.
    ///
    /// Every non-empty queue ends up headed by an ACTIVATE: a column command
    /// at the head gets one in front of it, and a PRECHARGE at the head is
    /// replaced by the ACTIVATE of its burst.
    pub fn repair_after_refresh(&mut self) {
        for queue in self.command_queues.iter_mut() {
            let Some(head) = queue.front().copied() else {
                continue;
            };
            match head.kind {
                CommandKind::Read | CommandKind::Write => {
                    queue.push_front(head.with_kind(CommandKind::Activate));
                }
                CommandKind::Precharge => {
                    queue.pop_front();
                    if queue.front().map(|c| c.kind) != Some(CommandKind::Activate) {
                        queue.push_front(head.with_kind(CommandKind::Activate));
                    }
                }
                CommandKind::Activate => {}
            }
        }
    }

    pub fn fifo(&self) -> &VecDeque<Command> {
        &self.fifo
    }

    pub fn command_queue(&self, requester: usize) -> &VecDeque<Command> {
        &self.command_queues[requester]
    }

    /// Commands not yet issued, queued or in the FIFO.
    pub fn pending(&self) -> usize {
        self.fifo.len() + self.command_queues.iter().map(VecDeque::len).sum::<usize>()
    }
}

/// Applies the timing consequences of issuing `cmd` at `now`.
fn issue_command(
    cmd: Command,
    now: Time,
    t: &TimingModel,
    banks: &mut BankTable,
    ranks: &mut RankTable,
) -> Issued {
    log::trace!("@{}: issue {}", now, cmd);

    let rank_id = cmd.location.rank;
    let bank = banks.get_mut(&cmd.location);
    let mut completion = None;

    match cmd.kind {
        CommandKind::Activate => {
            bank.next_act = now + t.t_rc;
            bank.next_rd = now + t.t_rcd;
            bank.next_wr = now + t.t_rcd;
            bank.next_pre = now + t.t_ras;

            let rank = ranks.get_mut(rank_id);
            if rank.activate_count + 1 < ACTIVATE_WINDOW {
                rank.next_act = now + t.t_rrd;
                rank.activate_count += 1;
            } else {
                rank.next_act = time::offset(now + t.t_faw, -3 * t.t_rrd as i64);
                rank.activate_count = 0;
            }
        }
        CommandKind::Precharge => {
            bank.next_act = bank.next_act.max(now + t.t_rp);
        }
        CommandKind::Read => {
            let done = now + t.read_completion();
            bank.next_rd = done;
            bank.next_wr = now + t.t_rtw.max(t.read_completion());
            bank.next_pre = bank.next_pre.max(now + t.t_rtp);

            let rank = ranks.get_mut(rank_id);
            let read_to_write = (t.read_completion() as i64 - t.t_wl as i64).max(t.t_rtw as i64);
            rank.next_rd = now + t.t_bus;
            rank.next_wr = time::offset(now, read_to_write);

            ranks.propagate_other(rank_id, RankField::Read, now + t.t_bus + t.t_rtr);
            ranks.propagate_other(
                rank_id,
                RankField::Write,
                time::offset(done + t.t_rtr, -(t.t_wl as i64)),
            );

            completion = Some(Completion {
                requester: cmd.requester,
                time: done,
            });
        }
        CommandKind::Write => {
            let done = now + t.write_completion();
            bank.next_rd = done + t.t_wtr;
            bank.next_wr = done;
            bank.next_pre = bank.next_pre.max(done + t.t_wr);

            let rank = ranks.get_mut(rank_id);
            rank.next_rd = done + t.t_wtr;
            rank.next_wr = now + t.t_bus;

            ranks.propagate_other(
                rank_id,
                RankField::Read,
                time::offset(done + t.t_rtr, -(t.t_rl as i64)),
            );
            ranks.propagate_other(rank_id, RankField::Write, now + t.t_bus + t.t_rtr);

            completion = Some(Completion {
                requester: cmd.requester,
                time: done,
            });
        }
    }

    Issued {
        command: cmd,
        completion,
    }
}
