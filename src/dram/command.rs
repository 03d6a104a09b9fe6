//! Requests, DDR Commands, and Completions.
//!
//! A [`Request`] is what a requester submits: an address and an operation. The
//! front end maps it onto a [`Location`] and explodes it into a burst of
//! [`Command`]s. Every issued column command produces a [`Completion`].

use std::fmt;

use serde::Serialize;

use crate::common::data::Operation;
use crate::common::time::Time;

/// Target of a request inside the device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub rank: usize,
    pub bank: usize,
    pub row: u64,
}

/// A memory request from one requester.
///
/// `location` stays zeroed until the address mapper has run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub address: u64,
    pub op: Operation,
    pub requester: usize,
    pub location: Location,
}

impl Request {
    pub fn new(address: u64, op: Operation, requester: usize) -> Self {
        Self {
            address,
            op,
            requester,
            location: Location::default(),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "core{}: {} {:#x}", self.requester, self.op, self.address)
    }
}

/// DDR command types the controller issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CommandKind {
    /// Close the open row of a bank.
    Precharge,
    /// Open a row of a bank.
    Activate,
    /// Column read.
    Read,
    /// Column write.
    Write,
}

impl CommandKind {
    /// Column access strobe: a READ or WRITE.
    pub fn is_cas(self) -> bool {
        matches!(self, CommandKind::Read | CommandKind::Write)
    }

    /// Column command that services `op`.
    pub fn cas_for(op: Operation) -> Self {
        match op {
            Operation::Read => CommandKind::Read,
            Operation::Write => CommandKind::Write,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            CommandKind::Precharge => "PRE",
            CommandKind::Activate => "ACT",
            CommandKind::Read => "RD",
            CommandKind::Write => "WR",
        }
    }
}

/// A DDR command derived from a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Command {
    pub requester: usize,
    pub kind: CommandKind,
    pub location: Location,
}

impl Command {
    pub fn new(kind: CommandKind, req: &Request) -> Self {
        Self {
            requester: req.requester,
            kind,
            location: req.location,
        }
    }

    /// Same requester and target, different command type.
    pub fn with_kind(&self, kind: CommandKind) -> Self {
        Self { kind, ..*self }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "core{}: {} r{}/b{}/row{:#x}",
            self.requester,
            self.kind.mnemonic(),
            self.location.rank,
            self.location.bank,
            self.location.row
        )
    }
}

/// Row buffer state a request finds when it is classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RowState {
    /// Requested row is already open (row hit).
    Open,
    /// Bank has never been accessed; no row to close.
    Empty,
    /// Another row is open and must be precharged first.
    Closed,
}

/// Acknowledgement of a finished column access. No data is carried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub requester: usize,
    pub time: Time,
}
