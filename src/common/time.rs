//! Simulation Time.
//!
//! All controller timing is done in absolute time rather than in cycles.
//! Device datasheets quote constraints in fractional nanoseconds (13.5 ns,
//! 1.5 ns, ...), so time is stored as an integer number of picoseconds. This
//! keeps every deadline comparison and completion-time match exact no matter
//! how many bus cycles have elapsed.

/// Absolute simulation time in picoseconds.
pub type Time = u64;

/// Picoseconds per nanosecond.
pub const PS_PER_NS: u64 = 1_000;

/// Converts a nanosecond quantity into [`Time`], rounded to the nearest picosecond.
///
/// Negative inputs saturate to zero.
pub fn from_ns(ns: f64) -> Time {
    if ns <= 0.0 {
        return 0;
    }
    (ns * PS_PER_NS as f64).round() as Time
}

/// Converts a [`Time`] back into nanoseconds.
pub fn to_ns(t: Time) -> f64 {
    t as f64 / PS_PER_NS as f64
}

/// Adds a signed offset to `base`, saturating at zero.
///
/// A handful of cross-rank deadlines subtract one latency from another; on
/// exotic devices the result can dip below the current time.
pub fn offset(base: Time, delta: i64) -> Time {
    base.saturating_add_signed(delta)
}

/// Controller clock.
///
/// Advances by exactly one bus-cycle period per simulated tick.
#[derive(Debug, Clone)]
pub struct Clock {
    now: Time,
    period: Time,
    ticks: u64,
}

impl Clock {
    /// Creates a clock at time zero.
    ///
    /// # Arguments
    ///
    /// * `period` - Duration of one bus cycle (tCK).
    pub fn new(period: Time) -> Self {
        Self {
            now: 0,
            period,
            ticks: 0,
        }
    }

    /// Current time.
    pub fn now(&self) -> Time {
        self.now
    }

    /// Duration of one tick.
    pub fn period(&self) -> Time {
        self.period
    }

    /// Number of ticks elapsed since time zero.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances the clock by one bus cycle.
    pub fn advance(&mut self) {
        self.now += self.period;
        self.ticks += 1;
    }
}
