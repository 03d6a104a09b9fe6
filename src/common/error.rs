//! Error Definitions.
//!
//! Every failure the simulator can report is a configuration or input error:
//! a malformed device file, a trace that cannot be parsed, or a topology the
//! controller cannot host. Protocol-level invariants are enforced by the type
//! system and never surface here.

use std::path::PathBuf;

/// Crate-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("expected {expected} timing constraints in device file, found {found}")]
    TimingConstraintCount { expected: usize, found: usize },

    #[error("device file line {line}: cannot read a timing constraint from {text:?}")]
    MalformedTiming { line: usize, text: String },

    #[error("unknown address mapping mode {0} (expected 0 or 1)")]
    UnknownAddressMapping(u32),

    #[error("unknown memory operation {0:?} (expected READ or WRITE)")]
    UnknownOperation(String),

    #[error(
        "{requesters} requesters exceed the {ranks} rank(s) x {banks_per_rank} bank(s) available; \
         increase banks or decrease requesters"
    )]
    TooManyRequesters {
        requesters: usize,
        ranks: usize,
        banks_per_rank: usize,
    },

    #[error("requester {id} out of range (controller has {count} request queues)")]
    UnknownRequester { id: usize, count: usize },

    #[error("{path}: line {line}: {reason}")]
    MalformedTrace {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("trace list names {found} trace(s) but {expected} requester(s) are configured")]
    TraceCountMismatch { expected: usize, found: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("simulation did not terminate within {0} ticks")]
    TickLimit(u64),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
