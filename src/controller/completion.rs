//! Completion queue.

use std::collections::VecDeque;

use crate::common::time::Time;
use crate::dram::command::Completion;

/// Completions ordered by time; equal times keep issue order.
///
/// READ and WRITE latencies differ, so a later WRITE can finish before an
/// earlier READ. Inserting in order keeps the head the earliest completion.
#[derive(Clone, Debug, Default)]
pub struct CompletionQueue {
    queue: VecDeque<Completion>,
}

impl CompletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, completion: Completion) {
        let pos = self.queue.partition_point(|c| c.time <= completion.time);
        self.queue.insert(pos, completion);
    }

    /// Pops the head if it completes exactly at `now`.
    ///
    /// Completion times fall on tick boundaries, so a caller polling once per
    /// tick sees every completion. A head whose time has passed stays queued.
    pub fn pop_ready(&mut self, now: Time) -> Option<Completion> {
        match self.queue.front() {
            Some(head) if head.time == now => self.queue.pop_front(),
            _ => None,
        }
    }

    pub fn peek(&self) -> Option<&Completion> {
        self.queue.front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
