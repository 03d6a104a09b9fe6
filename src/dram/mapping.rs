//! Address Mapping.
//!
//! Two physical address layouts are supported. Both keep the rank in the top
//! two bits and differ in where the bank and row fields sit:
//!
//! ```text
//! mode 0  SSBB BRRR RRRR RRRR RRRC CCCC CCCC COOO
//! mode 1  SSRR RRRR RRRR RRRR BBBC CCCC CCCC COOO
//! ```
//!
//! The controller statically partitions banks among requesters, so only the
//! row comes from the address there. The full decode (rank and bank as well)
//! is used by the trace-driven bound analysis.

use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::error::Error;
use crate::dram::command::{Location, Request};

const RANK_MASK: u64 = 0xc000_0000;
const RANK_SHIFT: u32 = 30;

/// Physical address bit layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum AddressMapping {
    /// Mode 0: bank bits above the row bits.
    BankRowColumn,
    /// Mode 1: row bits above the bank bits.
    RowBankColumn,
}

impl AddressMapping {
    fn row_field(self) -> (u64, u32) {
        match self {
            AddressMapping::BankRowColumn => (0x07ff_e000, 13),
            AddressMapping::RowBankColumn => (0x3fff_0000, 16),
        }
    }

    fn bank_field(self) -> (u64, u32) {
        match self {
            AddressMapping::BankRowColumn => (0x3800_0000, 27),
            AddressMapping::RowBankColumn => (0x0000_e000, 13),
        }
    }

    /// Row index encoded in `address`.
    pub fn row(self, address: u64) -> u64 {
        let (mask, shift) = self.row_field();
        (address & mask) >> shift
    }

    /// Rank, bank and row encoded in `address`.
    pub fn decode(self, address: u64) -> Location {
        let (bank_mask, bank_shift) = self.bank_field();
        Location {
            rank: ((address & RANK_MASK) >> RANK_SHIFT) as usize,
            bank: ((address & bank_mask) >> bank_shift) as usize,
            row: self.row(address),
        }
    }

    /// Number of distinct ranks the layout can address.
    pub fn rank_count(self) -> usize {
        (RANK_MASK >> RANK_SHIFT) as usize + 1
    }

    /// Number of distinct banks per rank the layout can address.
    pub fn bank_count(self) -> usize {
        let (mask, shift) = self.bank_field();
        (mask >> shift) as usize + 1
    }
}

impl Default for AddressMapping {
    fn default() -> Self {
        AddressMapping::BankRowColumn
    }
}

impl TryFrom<u32> for AddressMapping {
    type Error = Error;

    fn try_from(mode: u32) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(AddressMapping::BankRowColumn),
            1 => Ok(AddressMapping::RowBankColumn),
            other => Err(Error::UnknownAddressMapping(other)),
        }
    }
}

impl From<AddressMapping> for u32 {
    fn from(mapping: AddressMapping) -> Self {
        match mapping {
            AddressMapping::BankRowColumn => 0,
            AddressMapping::RowBankColumn => 1,
        }
    }
}

impl fmt::Display for AddressMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode {}", u32::from(*self))
    }
}

/// Maps requests onto the controller's statically partitioned banks.
///
/// Requester `n` owns bank `n % banks_per_rank` of rank `n / banks_per_rank`.
#[derive(Clone, Debug)]
pub struct AddressMapper {
    mapping: AddressMapping,
    banks_per_rank: usize,
}

impl AddressMapper {
    pub fn new(mapping: AddressMapping, banks_per_rank: usize) -> Self {
        Self {
            mapping,
            banks_per_rank,
        }
    }

    pub fn mapping(&self) -> AddressMapping {
        self.mapping
    }

    /// Fills in `req.location`.
    pub fn map(&self, req: &mut Request) {
        req.location = Location {
            rank: req.requester / self.banks_per_rank,
            bank: req.requester % self.banks_per_rank,
            row: self.mapping.row(req.address),
        };
    }
}
