//! DRAM Memory Controller Simulator Library.
//!
//! This crate implements a tick-accurate simulator of a real-time DRAM memory
//! controller shared by several cores, together with the analytical
//! worst-case latency models it is compared against.
//!
//! # Architecture
//!
//! * **Controller**: per-requester request queues, command burst generation,
//!   a single issue FIFO arbitrated against bank and rank deadlines, and
//!   periodic refresh.
//! * **Device**: timing constraints, address mapping, and per-bank/per-rank
//!   state.
//! * **Driver**: trace-replaying cores, one in-order core under analysis and
//!   out-of-order interferers.
//! * **Analysis**: closed-form WCET models and a trace-driven bound.
//!
//! # Modules
//!
//! * `analysis`: Analytical WCET models.
//! * `common`: Shared types, time, and error handling.
//! * `config`: Configuration loading and parsing.
//! * `controller`: The memory controller.
//! * `dram`: Device timing, mapping, and state tables.
//! * `sim`: Simulation harness, traces, and loaders.
//! * `stats`: Statistics collection.

/// Analytical worst-case latency models and the trace-driven bound.
///
/// Implements the AMC, RTSS, RTAS, and multi-rank thesis bounds over the
/// device constraints in nanoseconds.
pub mod analysis;

/// Shared types, time representation, and error handling.
pub mod common;

/// Configuration for the controller topology and the request driver.
///
/// Loads and parses TOML configuration files; every field has a default.
pub mod config;

/// The tick-accurate memory controller.
///
/// Implements request queueing, command generation, issue arbitration,
/// completion delivery, and the refresh protocol.
pub mod controller;

/// DRAM device model: timing, address mapping, bank and rank state.
pub mod dram;

/// Simulation harness, trace loading, and the interleaving estimate.
pub mod sim;

/// Statistics collection and reporting.
pub mod stats;

pub use common::error::{Error, Result};
