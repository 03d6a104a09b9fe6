//! Integration tests for address mapping.

use std::convert::TryFrom;

use memctrl_sim::common::Operation;
use memctrl_sim::dram::command::{Location, Request};
use memctrl_sim::dram::mapping::{AddressMapper, AddressMapping};
use memctrl_sim::Error;

/// Builds an address from rank, bank and row fields for mode 0.
fn mode0_address(rank: u64, bank: u64, row: u64) -> u64 {
    (rank << 30) | (bank << 27) | (row << 13)
}

/// Builds an address from rank, bank and row fields for mode 1.
fn mode1_address(rank: u64, bank: u64, row: u64) -> u64 {
    (rank << 30) | (row << 16) | (bank << 13)
}

/// Tests decoding of the bank-row-column layout.
#[test]
fn test_decode_mode0() {
    let addr = mode0_address(2, 5, 0x1234) | 0x1ff8;
    assert_eq!(
        AddressMapping::BankRowColumn.decode(addr),
        Location {
            rank: 2,
            bank: 5,
            row: 0x1234
        }
    );
}

/// Tests decoding of the row-bank-column layout.
#[test]
fn test_decode_mode1() {
    let addr = mode1_address(1, 7, 0x3abc) | 0x1ff8;
    assert_eq!(
        AddressMapping::RowBankColumn.decode(addr),
        Location {
            rank: 1,
            bank: 7,
            row: 0x3abc
        }
    );
}

/// Tests that column and offset bits never reach the row.
#[test]
fn test_column_bits_ignored() {
    assert_eq!(AddressMapping::BankRowColumn.row(0x1fff), 0);
    assert_eq!(AddressMapping::RowBankColumn.row(0x1fff), 0);
}

/// Tests the geometry each layout can address.
#[test]
fn test_layout_geometry() {
    for mapping in [AddressMapping::BankRowColumn, AddressMapping::RowBankColumn] {
        assert_eq!(mapping.rank_count(), 4);
        assert_eq!(mapping.bank_count(), 8);
    }
}

/// Tests mode number conversion and rejection of unknown modes.
#[test]
fn test_mode_conversion() {
    assert_eq!(AddressMapping::try_from(0).unwrap(), AddressMapping::BankRowColumn);
    assert_eq!(AddressMapping::try_from(1).unwrap(), AddressMapping::RowBankColumn);
    assert!(matches!(
        AddressMapping::try_from(2),
        Err(Error::UnknownAddressMapping(2))
    ));
    assert_eq!(u32::from(AddressMapping::RowBankColumn), 1);
    assert_eq!(AddressMapping::default(), AddressMapping::BankRowColumn);
}

/// Tests that the mapper partitions banks by requester and keeps the row.
#[test]
fn test_mapper_partitions_banks() {
    let mapper = AddressMapper::new(AddressMapping::BankRowColumn, 8);
    let mut req = Request::new(mode0_address(3, 6, 42), Operation::Read, 9);
    mapper.map(&mut req);

    assert_eq!(req.location.rank, 1);
    assert_eq!(req.location.bank, 1);
    assert_eq!(req.location.row, 42);
}

/// Tests that requesters below the bank count stay on rank 0.
#[test]
fn test_mapper_first_rank() {
    let mapper = AddressMapper::new(AddressMapping::RowBankColumn, 4);
    for id in 0..4 {
        let mut req = Request::new(mode1_address(0, 0, 7), Operation::Write, id);
        mapper.map(&mut req);
        assert_eq!(req.location.rank, 0);
        assert_eq!(req.location.bank, id);
        assert_eq!(req.location.row, 7);
    }
}
