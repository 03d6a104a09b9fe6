//! Trace-Driven Requesters.
//!
//! Each core replays its trace against the controller. The core under
//! analysis runs in order: it waits for every column access of its previous
//! request and then for the trace's execution gap before it issues the next
//! one. The other cores are interfering memory hogs: they issue out of order
//! up to a fixed window of outstanding accesses and rewind their traces
//! forever. The run ends when the analysis core has replayed its whole trace
//! and every one of its accesses has completed.

use serde::Serialize;

use crate::common::error::{Error, Result};
use crate::common::time::{self, Time};
use crate::config::Config;
use crate::controller::Controller;
use crate::dram::command::{Completion, Request};
use crate::dram::timing::TimingModel;
use crate::sim::trace::{Trace, TraceEntry};
use crate::stats::SimStats;

/// How a requester paces its requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueDiscipline {
    /// One request outstanding; honors the trace's execution gaps.
    InOrder,
    /// Issues while at most `window` accesses are outstanding.
    OutOfOrder { window: u64 },
}

/// A core replaying one trace.
pub struct Requester {
    id: usize,
    discipline: IssueDiscipline,
    trace: Trace,
    cursor: usize,
    pending: Option<TraceEntry>,
    /// Column accesses requested so far.
    sent: u64,
    /// Column accesses acknowledged so far.
    done: u64,
    last_completion: Time,
    end_of_trace: bool,
    core_period: Time,
    interleave: u64,
}

impl Requester {
    /// # Arguments
    ///
    /// * `id` - Requester index; selects the controller queue and bank.
    /// * `trace` - Accesses to replay.
    /// * `discipline` - In-order or out-of-order issue.
    /// * `core_period` - Core clock period used to scale trace gaps.
    /// * `interleave` - Column accesses the controller performs per request.
    pub fn new(
        id: usize,
        trace: Trace,
        discipline: IssueDiscipline,
        core_period: Time,
        interleave: usize,
    ) -> Self {
        Self {
            id,
            discipline,
            trace,
            cursor: 0,
            pending: None,
            sent: 0,
            done: 0,
            last_completion: 0,
            end_of_trace: false,
            core_period,
            interleave: interleave as u64,
        }
    }

    fn next_line(&mut self) {
        match self.trace.get(self.cursor) {
            Some(entry) => {
                self.pending = Some(*entry);
                self.cursor += 1;
            }
            None => {
                self.cursor = 0;
                self.end_of_trace = true;
            }
        }
    }

    /// Earliest time an in-order request `gap` core cycles after the last
    /// completion may be sent. Saturates for gaps beyond the time range.
    fn release_time(&self, gap: u64) -> Time {
        self.last_completion.saturating_add(gap.saturating_mul(self.core_period))
    }

    /// Offers the next trace access to the controller if the discipline allows.
    pub fn send(&mut self, ctrl: &mut Controller) -> Result<()> {
        if self.pending.is_none() {
            self.next_line();
        }
        let Some(entry) = self.pending else {
            return Ok(());
        };

        let ready = match self.discipline {
            IssueDiscipline::InOrder => {
                !self.end_of_trace
                    && self.sent == self.done
                    && ctrl.now() >= self.release_time(entry.gap)
            }
            IssueDiscipline::OutOfOrder { window } => self.outstanding() <= window,
        };

        if ready {
            ctrl.add_request(Request::new(entry.address, entry.op, self.id))?;
            self.sent += self.interleave;
            self.pending = None;
        }
        Ok(())
    }

    /// Records an acknowledged column access.
    pub fn receive(&mut self, completion: &Completion) {
        self.last_completion = completion.time;
        self.done += 1;
    }

    /// Whole trace replayed and nothing outstanding.
    pub fn finished(&self) -> bool {
        self.end_of_trace && self.done == self.sent
    }

    pub fn outstanding(&self) -> u64 {
        self.sent.saturating_sub(self.done)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn discipline(&self) -> IssueDiscipline {
        self.discipline
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn done(&self) -> u64 {
        self.done
    }
}

/// Result of a complete run.
#[derive(Clone, Debug, Serialize)]
pub struct SimReport {
    /// Simulated time at which the analysis core finished.
    pub total_time: Time,
    pub ticks: u64,
    pub stats: SimStats,
}

impl SimReport {
    pub fn total_ns(&self) -> f64 {
        time::to_ns(self.total_time)
    }
}

/// A controller together with the cores driving it.
pub struct Simulation {
    controller: Controller,
    requesters: Vec<Requester>,
    analysis: usize,
    max_ticks: Option<u64>,
}

impl Simulation {
    /// Builds the controller and one requester per trace.
    ///
    /// The analysis requester issues in order; all others out of order.
    pub fn new(config: &Config, timing: TimingModel, traces: Vec<Trace>) -> Result<Self> {
        config.validate()?;
        let expected = config.controller.requesters;
        if traces.len() != expected {
            return Err(Error::TraceCountMismatch {
                expected,
                found: traces.len(),
            });
        }

        let controller = Controller::new(&config.controller, timing)?;
        let analysis = config.analysis_requester();
        let core_period = time::from_ns(config.driver.core_period_ns);
        let window = config.driver.outstanding_window;

        let requesters = traces
            .into_iter()
            .enumerate()
            .map(|(id, trace)| {
                let discipline = if id == analysis {
                    IssueDiscipline::InOrder
                } else {
                    IssueDiscipline::OutOfOrder { window }
                };
                Requester::new(id, trace, discipline, core_period, config.controller.interleave)
            })
            .collect();

        Ok(Self {
            controller,
            requesters,
            analysis,
            max_ticks: config.driver.max_ticks,
        })
    }

    /// Runs one tick: requests in, controller tick, completions out.
    ///
    /// # Returns
    ///
    /// `true` once the analysis requester has finished.
    pub fn step(&mut self) -> Result<bool> {
        for requester in self.requesters.iter_mut() {
            requester.send(&mut self.controller)?;
        }

        self.controller.simulate();

        while let Some(completion) = self.controller.get_data() {
            self.requesters[completion.requester].receive(&completion);
        }

        Ok(self.requesters[self.analysis].finished())
    }

    /// Runs until the analysis requester finishes.
    pub fn run(mut self) -> Result<SimReport> {
        loop {
            if self.step()? {
                break;
            }
            if let Some(limit) = self.max_ticks {
                if self.controller.ticks() >= limit {
                    return Err(Error::TickLimit(limit));
                }
            }
        }

        log::info!(
            "analysis core {} finished after {} ticks ({} ns)",
            self.analysis,
            self.controller.ticks(),
            time::to_ns(self.controller.now())
        );

        Ok(SimReport {
            total_time: self.controller.now(),
            ticks: self.controller.ticks(),
            stats: self.controller.stats().clone(),
        })
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn requester(&self, id: usize) -> &Requester {
        &self.requesters[id]
    }

    pub fn analysis_requester(&self) -> usize {
        self.analysis
    }
}
