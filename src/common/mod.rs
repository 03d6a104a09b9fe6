//! Common utilities and types used throughout the memory controller simulator.
//!
//! This module provides the fundamental time representation, the memory
//! operation type, and the crate-wide error type shared by the controller,
//! the trace driver, and the analytical models.

/// Memory operation type definitions.
pub mod data;

/// Error types for configuration and input failures.
pub mod error;

/// Simulation time and the controller clock.
pub mod time;

pub use data::Operation;
pub use error::{Error, Result};
pub use time::{Clock, Time};
