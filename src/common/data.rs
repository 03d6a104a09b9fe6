//! Memory Operation Types.
//!
//! This module defines the classification of memory requests submitted to the
//! controller. The operation decides which column command (READ or WRITE) the
//! front end emits for a request and which latency terms the analytical models
//! charge.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::error::Error;

/// Type of memory operation.
///
/// Traces spell these as `READ` and `WRITE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Data read access.
    ///
    /// Serviced by READ column commands; completes once the data burst has
    /// been transferred.
    Read,

    /// Data write access.
    ///
    /// Serviced by WRITE column commands; completes once the write burst has
    /// been accepted by the device.
    Write,
}

impl Operation {
    /// Returns `true` for [`Operation::Read`].
    pub fn is_read(self) -> bool {
        matches!(self, Operation::Read)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "READ"),
            Operation::Write => write!(f, "WRITE"),
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READ" => Ok(Operation::Read),
            "WRITE" => Ok(Operation::Write),
            other => Err(Error::UnknownOperation(other.to_string())),
        }
    }
}
