//! Front End: Command Generation.
//!
//! Holds one request queue per requester. Every tick the head request of each
//! non-empty queue is mapped, classified against the bank state, and exploded
//! into the DDR command burst that services it.

use std::collections::VecDeque;

use crate::common::error::{Error, Result};
use crate::dram::bank::BankTable;
use crate::dram::command::{Command, CommandKind, Request, RowState};
use crate::dram::mapping::AddressMapper;
use crate::stats::SimStats;

pub struct FrontEnd {
    mapper: AddressMapper,
    interleave: usize,
    request_queues: Vec<VecDeque<Request>>,
}

impl FrontEnd {
    /// # Arguments
    ///
    /// * `requesters` - Number of request queues.
    /// * `mapper` - Address mapper shared by all requesters.
    /// * `interleave` - Column accesses emitted per request.
    pub fn new(requesters: usize, mapper: AddressMapper, interleave: usize) -> Self {
        Self {
            mapper,
            interleave,
            request_queues: (0..requesters).map(|_| VecDeque::new()).collect(),
        }
    }

    /// Appends `req` to its requester's queue.
    pub fn add_request(&mut self, req: Request) -> Result<()> {
        let count = self.request_queues.len();
        let queue = self
            .request_queues
            .get_mut(req.requester)
            .ok_or(Error::UnknownRequester {
                id: req.requester,
                count,
            })?;
        queue.push_back(req);
        Ok(())
    }

    /// Requests waiting for generation, across all requesters.
    pub fn pending(&self) -> usize {
        self.request_queues.iter().map(VecDeque::len).sum()
    }

    pub fn interleave(&self) -> usize {
        self.interleave
    }

    /// Builds the command burst for the head request of every non-empty queue.
    ///
    /// Returns one list per requester that had a pending request, in requester
    /// order. Each request's row is committed to the bank table as soon as it
    /// is classified.
    pub fn generate(&mut self, banks: &mut BankTable, stats: &mut SimStats) -> Vec<Vec<Command>> {
        let mut bursts = Vec::new();

        for queue in self.request_queues.iter_mut() {
            let Some(mut req) = queue.pop_front() else {
                continue;
            };

            self.mapper.map(&mut req);
            let state = banks.classify(&req);
            banks.commit_row_open(&req);
            stats.record_row_state(state);

            let mut burst = Vec::with_capacity(self.interleave + 2);
            match state {
                RowState::Closed => {
                    burst.push(Command::new(CommandKind::Precharge, &req));
                    burst.push(Command::new(CommandKind::Activate, &req));
                }
                RowState::Empty => burst.push(Command::new(CommandKind::Activate, &req)),
                RowState::Open => {}
            }
            let cas = CommandKind::cas_for(req.op);
            burst.extend((0..self.interleave).map(|_| Command::new(cas, &req)));

            log::trace!("{} -> {:?}, {} command(s)", req, state, burst.len());
            bursts.push(burst);
        }

        bursts
    }
}
