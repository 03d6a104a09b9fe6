//! Integration tests for the memory controller.

use std::collections::HashSet;
use std::sync::Once;

use memctrl_sim::common::{Operation, Time};
use memctrl_sim::config::ControllerConfig;
use memctrl_sim::controller::frontend::FrontEnd;
use memctrl_sim::controller::Controller;
use memctrl_sim::dram::bank::{BankEntry, BankTable};
use memctrl_sim::dram::command::{CommandKind, Request};
use memctrl_sim::dram::mapping::{AddressMapper, AddressMapping};
use memctrl_sim::dram::rank::RankEntry;
use memctrl_sim::dram::timing::TimingModel;
use memctrl_sim::stats::SimStats;
use memctrl_sim::Error;

const DDR3: [f64; 12] = [13.5, 13.5, 49.5, 36.0, 7.5, 15.0, 7.5, 6.0, 7.5, 30.0, 45.0, 1.5];

static LOGGER: Once = Once::new();

fn init_logging() {
    LOGGER.call_once(|| {
        env_logger::builder().is_test(true).init();
    });
}

fn ddr3() -> TimingModel {
    TimingModel::from_constants(&DDR3, 9, 7).unwrap()
}

/// Creates a controller configuration with the given topology.
fn topology(
    requesters: usize,
    banks_per_rank: usize,
    ranks: usize,
    interleave: usize,
) -> ControllerConfig {
    ControllerConfig {
        requesters,
        banks_per_rank,
        ranks,
        interleave,
        ..ControllerConfig::default()
    }
}

/// Address of `row` in mode 0.
fn row_address(row: u64) -> u64 {
    row << 13
}

/// Queues `count` requests per requester, alternating operation and row.
fn preload(ctrl: &mut Controller, requesters: usize, count: usize) {
    for id in 0..requesters {
        for n in 0..count {
            let op = if (n + id) % 3 == 0 {
                Operation::Write
            } else {
                Operation::Read
            };
            let row = (n / 2) as u64;
            ctrl.add_request(Request::new(row_address(row), op, id)).unwrap();
        }
    }
}

/// Tests that a request for an unknown requester is rejected.
#[test]
fn test_unknown_requester() {
    let mut ctrl = Controller::new(&topology(2, 8, 1, 2), ddr3()).unwrap();
    let err = ctrl
        .add_request(Request::new(0, Operation::Read, 2))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownRequester { id: 2, count: 2 }));
}

/// Tests that more requesters than banks are rejected.
#[test]
fn test_too_many_requesters() {
    let result = Controller::new(&topology(9, 8, 1, 2), ddr3());
    assert!(matches!(result, Err(Error::TooManyRequesters { .. })));
    assert!(Controller::new(&topology(9, 8, 2, 2), ddr3()).is_ok());
}

/// Tests the clock advances by exactly one tCK per tick.
#[test]
fn test_clock_advances_one_period() {
    let mut ctrl = Controller::new(&topology(1, 8, 1, 1), ddr3()).unwrap();
    for n in 1..=10u64 {
        ctrl.simulate();
        assert_eq!(ctrl.now(), n * 1_500);
        assert_eq!(ctrl.ticks(), n);
    }
    assert_eq!(ctrl.stats().idle_ticks, 10);
}

/// Tests command bursts for empty, open and conflicting rows.
#[test]
fn test_burst_generation() {
    let mapper = AddressMapper::new(AddressMapping::BankRowColumn, 8);
    let mut front = FrontEnd::new(1, mapper, 2);
    let mut banks = BankTable::new(1, 8);
    let mut stats = SimStats::new(1);

    let mut kinds = |address: u64, op: Operation| {
        front.add_request(Request::new(address, op, 0)).unwrap();
        let bursts = front.generate(&mut banks, &mut stats);
        assert_eq!(bursts.len(), 1);
        bursts[0].iter().map(|c| c.kind).collect::<Vec<_>>()
    };

    use CommandKind::*;
    let first = kinds(row_address(3), Operation::Read);
    assert_eq!(first, vec![Activate, Read, Read]);

    let hit = kinds(row_address(3), Operation::Write);
    assert_eq!(hit, vec![Write, Write]);

    let conflict = kinds(row_address(4), Operation::Read);
    assert_eq!(conflict, vec![Precharge, Activate, Read, Read]);

    assert_eq!((stats.row_empty, stats.row_hits, stats.row_conflicts), (1, 1, 1));
    assert!(front.generate(&mut banks, &mut stats).is_empty());
}

/// Tests that only the head request of each queue is generated per tick.
#[test]
fn test_one_request_per_requester_per_tick() {
    let mapper = AddressMapper::new(AddressMapping::BankRowColumn, 8);
    let mut front = FrontEnd::new(2, mapper, 1);
    let mut banks = BankTable::new(1, 8);
    let mut stats = SimStats::new(2);

    for _ in 0..3 {
        front.add_request(Request::new(0, Operation::Read, 0)).unwrap();
    }
    front.add_request(Request::new(0, Operation::Read, 1)).unwrap();

    let bursts = front.generate(&mut banks, &mut stats);
    assert_eq!(bursts.len(), 2);
    assert_eq!(bursts[0][0].requester, 0);
    assert_eq!(bursts[1][0].requester, 1);
    assert_eq!(front.pending(), 2);
}

/// Tests a single READ from request to completion.
#[test]
fn test_single_read_completion() {
    init_logging();
    let t = ddr3();
    let mut ctrl = Controller::new(&topology(1, 8, 1, 1), t).unwrap();
    ctrl.add_request(Request::new(row_address(5), Operation::Read, 0)).unwrap();

    let mut issued = Vec::new();
    let completion = loop {
        let now = ctrl.now();
        ctrl.simulate();
        if let Some(cmd) = ctrl.last_issued() {
            issued.push((now, cmd.kind));
        }
        if let Some(c) = ctrl.get_data() {
            break c;
        }
        assert!(ctrl.ticks() < 1_000);
    };

    assert_eq!(
        issued,
        vec![(0, CommandKind::Activate), (t.t_rcd, CommandKind::Read)]
    );
    assert_eq!(completion.requester, 0);
    assert_eq!(completion.time, t.t_rcd + t.t_rl + t.t_bus);
    assert_eq!(ctrl.now(), completion.time);
    assert!(ctrl.is_idle());
}

/// Tests that completions are not delivered before their time.
#[test]
fn test_completion_not_early() {
    let mut ctrl = Controller::new(&topology(1, 8, 1, 1), ddr3()).unwrap();
    ctrl.add_request(Request::new(0, Operation::Write, 0)).unwrap();

    let mut delivered = None;
    while delivered.is_none() {
        ctrl.simulate();
        delivered = ctrl.get_data();
        if let Some(c) = delivered {
            assert!(c.time <= ctrl.now());
            assert!(c.time > ctrl.now() - 1_500);
        }
    }
}

/// Tests that a completion is only handed out on the tick it finishes.
#[test]
fn test_completion_missed_when_polled_late() {
    let mut ctrl = Controller::new(&topology(1, 8, 1, 1), ddr3()).unwrap();
    ctrl.add_request(Request::new(0, Operation::Read, 0)).unwrap();

    // The read completes at tick 22.
    for _ in 0..200 {
        ctrl.simulate();
    }
    assert_eq!(ctrl.now(), 300_000);
    assert!(ctrl.get_data().is_none());
    assert!(!ctrl.is_idle());
}

/// Tests the FIFO never holds two commands of the same requester.
#[test]
fn test_at_most_one_in_flight() {
    let mut ctrl = Controller::new(&topology(4, 2, 2, 2), ddr3()).unwrap();
    preload(&mut ctrl, 4, 12);

    for _ in 0..3_000 {
        ctrl.simulate();
        let mut seen = HashSet::new();
        for cmd in ctrl.fifo() {
            assert!(seen.insert(cmd.requester), "requester {} twice in FIFO", cmd.requester);
        }
        while ctrl.get_data().is_some() {}
    }
}

/// Tests completions come out in non-decreasing time order.
#[test]
fn test_completions_monotonic() {
    let mut ctrl = Controller::new(&topology(4, 2, 2, 2), ddr3()).unwrap();
    preload(&mut ctrl, 4, 12);

    let mut last: Time = 0;
    let mut received = 0;
    for _ in 0..4_000 {
        ctrl.simulate();
        while let Some(c) = ctrl.get_data() {
            assert!(c.time >= last, "completion at {} after {}", c.time, last);
            assert!(c.time <= ctrl.now());
            last = c.time;
            received += 1;
        }
    }

    assert_eq!(received, 4 * 12 * 2);
    assert!(ctrl.is_idle());
    assert_eq!(ctrl.stats().completions, received);
    assert_eq!(ctrl.stats().cmd_read + ctrl.stats().cmd_write, received);
}

/// Tests bank and rank deadlines never move backwards between refreshes.
#[test]
fn test_timing_monotonic() {
    let mut ctrl = Controller::new(&topology(4, 8, 1, 2), ddr3()).unwrap();
    preload(&mut ctrl, 4, 16);

    let bank_fields = |b: &BankEntry| [b.next_act, b.next_rd, b.next_wr, b.next_pre];
    let rank_fields = |r: &RankEntry| [r.next_rd, r.next_wr];

    let mut banks: Vec<[Time; 4]> = ctrl.banks().iter().map(bank_fields).collect();
    let mut ranks: Vec<[Time; 2]> = ctrl.ranks().iter().map(rank_fields).collect();

    // Stay clear of the first refresh, which resets everything.
    for _ in 0..5_000 {
        ctrl.simulate();
        while ctrl.get_data().is_some() {}

        for (old, entry) in banks.iter_mut().zip(ctrl.banks().iter()) {
            let new = bank_fields(entry);
            for (o, n) in old.iter().zip(new.iter()) {
                assert!(n >= o, "bank deadline moved back: {:?} -> {:?}", old, new);
            }
            *old = new;
        }
        for (old, entry) in ranks.iter_mut().zip(ctrl.ranks().iter()) {
            let new = rank_fields(entry);
            for (o, n) in old.iter().zip(new.iter()) {
                assert!(n >= o, "rank deadline moved back: {:?} -> {:?}", old, new);
            }
            *old = new;
        }
    }
    assert_eq!(ctrl.refreshes_completed(), 0);
}

/// Tests statistics bookkeeping of requests and commands.
#[test]
fn test_stats_counts() {
    let mut ctrl = Controller::new(&topology(2, 8, 1, 2), ddr3()).unwrap();
    preload(&mut ctrl, 2, 4);
    for _ in 0..2_000 {
        ctrl.simulate();
        while ctrl.get_data().is_some() {}
    }

    let stats = ctrl.stats();
    assert_eq!(stats.requesters[0].requests, 4);
    assert_eq!(stats.requesters[1].requests, 4);
    assert_eq!(stats.requesters[0].completions, 8);
    assert_eq!(stats.row_hits + stats.row_empty + stats.row_conflicts, 8);
    assert_eq!(stats.cmd_activate, stats.row_empty + stats.row_conflicts);
    assert_eq!(stats.cmd_precharge, stats.row_conflicts);
    assert_eq!(stats.ticks, 2_000);
    assert_eq!(stats.commands() + stats.idle_ticks, stats.ticks);
}
