//! Refresh Interruption.
//!
//! Once per refresh interval the controller stops generating and issuing new
//! work. Column commands already in the FIFO are drained first, then the
//! device is unavailable for the refresh duration. Afterwards every row is
//! closed and every timing deadline is cleared.

use serde::Serialize;

use crate::common::time::Time;

/// Where the controller is in the refresh cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RefreshPhase {
    /// Normal command generation and issue.
    Normal,
    /// Refresh is due; issuing the column commands left in the FIFO.
    Draining,
    /// Refresh in progress for `elapsed` ticks so far.
    Refreshing { elapsed: u64 },
}

/// What the controller has to do after a refresh tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshStep {
    /// Keep draining the FIFO.
    Drain,
    /// Device busy.
    Busy,
    /// Refresh finished this tick.
    Done,
}

#[derive(Clone, Debug)]
pub struct Refresh {
    period: Time,
    duration: u64,
    completed: u64,
    phase: RefreshPhase,
}

impl Refresh {
    /// # Arguments
    ///
    /// * `period` - Refresh interval (tREF).
    /// * `duration` - Ticks the device stays busy per refresh (tRFC).
    pub fn new(period: Time, duration: u64) -> Self {
        Self {
            period,
            duration,
            completed: 0,
            phase: RefreshPhase::Normal,
        }
    }

    /// A refresh interval has elapsed that has not been serviced yet.
    pub fn due(&self, now: Time) -> bool {
        self.period > 0 && now / self.period > self.completed
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Advances the state machine by one tick of the refresh path.
    ///
    /// `fifo_drained` reports whether the FIFO held no column command at the
    /// start of this tick. The tick on which draining ends already counts
    /// towards the refresh duration.
    pub fn step(&mut self, fifo_drained: bool) -> RefreshStep {
        let elapsed = match self.phase {
            RefreshPhase::Normal | RefreshPhase::Draining if !fifo_drained => {
                if self.phase == RefreshPhase::Normal {
                    log::debug!("refresh {} due, draining FIFO", self.completed + 1);
                }
                self.phase = RefreshPhase::Draining;
                return RefreshStep::Drain;
            }
            RefreshPhase::Normal | RefreshPhase::Draining => 1,
            RefreshPhase::Refreshing { elapsed } => elapsed + 1,
        };

        if elapsed >= self.duration {
            self.completed += 1;
            self.phase = RefreshPhase::Normal;
            log::debug!("refresh {} complete", self.completed);
            RefreshStep::Done
        } else {
            self.phase = RefreshPhase::Refreshing { elapsed };
            RefreshStep::Busy
        }
    }
}
