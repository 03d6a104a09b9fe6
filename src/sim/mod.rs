//! Simulation harness.
//!
//! Loads device files and traces, replays the traces against the controller,
//! and provides the coarse interleaving estimate used for comparison.

/// Trace-replaying requesters and the top-level simulation loop.
pub mod driver;

/// Fixed-access-time interleaving estimate.
pub mod interleave;

/// Timing file, trace, and trace list loaders.
pub mod loader;

/// Trace format and parser.
pub mod trace;

pub use driver::{IssueDiscipline, Requester, SimReport, Simulation};
pub use interleave::{Arbitration, InterleaveEstimator, InterleaveReport};
pub use trace::{Trace, TraceEntry};
