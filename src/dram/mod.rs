//! DRAM Device Model.
//!
//! Everything the controller knows about the device: its timing constraints,
//! how addresses map onto ranks/banks/rows, and the per-bank and per-rank
//! state that the issue logic reads and updates.

/// Per-bank deadlines and open rows.
pub mod bank;

/// Requests, commands, and completions.
pub mod command;

/// Physical address layouts and the requester-partitioned mapper.
pub mod mapping;

/// Per-rank deadlines and cross-rank propagation.
pub mod rank;

/// Device timing constraints.
pub mod timing;

pub use bank::{BankEntry, BankTable};
pub use command::{Command, CommandKind, Completion, Location, Request, RowState};
pub use mapping::{AddressMapper, AddressMapping};
pub use rank::{RankEntry, RankField, RankTable};
pub use timing::TimingModel;
