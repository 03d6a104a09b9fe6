//! Integration tests for device timing parsing and derivation.

use memctrl_sim::common::time;
use memctrl_sim::dram::timing::{TimingModel, REFRESH_DURATION_TICKS};
use memctrl_sim::Error;

/// DDR3-1333H constraints in device file layout.
const DEVICE: &str = "\
tRCD = 13.5
tRP = 13.5
tRC = 49.5
tRAS = 36
tRTP = 7.5
tWR = 15
tWTR = 7.5
tRRD1 = 6
tRRD2 = 7.5
tFAW1 = 30
tFAW2 = 45
tCK = 1.5
";

fn ddr3() -> TimingModel {
    TimingModel::parse(DEVICE, 9, 7).unwrap()
}

/// Tests that base constraints are read in file order.
#[test]
fn test_parse_base_constraints() {
    let t = ddr3();
    assert_eq!(t.t_rcd, 13_500);
    assert_eq!(t.t_rp, 13_500);
    assert_eq!(t.t_rc, 49_500);
    assert_eq!(t.t_ras, 36_000);
    assert_eq!(t.t_rtp, 7_500);
    assert_eq!(t.t_wr, 15_000);
    assert_eq!(t.t_wtr, 7_500);
    assert_eq!(t.t_rrd1, 6_000);
    assert_eq!(t.t_rrd2, 7_500);
    assert_eq!(t.t_faw1, 30_000);
    assert_eq!(t.t_faw2, 45_000);
    assert_eq!(t.t_ck, 1_500);
}

/// Tests the constraints derived from tCK and the latencies.
#[test]
fn test_derived_constraints() {
    let t = ddr3();
    assert_eq!(t.t_faw, t.t_faw1);
    assert_eq!(t.t_rrd, t.t_rrd1);
    assert_eq!(t.t_rl, 9 * 1_500);
    assert_eq!(t.t_wl, 7 * 1_500);
    assert_eq!(t.t_bus, 4 * 1_500);
    assert_eq!(t.t_ccd, 4 * 1_500);
    assert_eq!(t.t_rtr, 2 * 1_500);
    // (6 + RL - WL) cycles
    assert_eq!(t.t_rtw, 8 * 1_500);
    assert_eq!(t.t_ref, time::from_ns(7800.0));
    assert_eq!(t.t_rfc, REFRESH_DURATION_TICKS);
}

/// Tests completion delays of column commands.
#[test]
fn test_completion_delays() {
    let t = ddr3();
    assert_eq!(t.read_completion(), 13_500 + 6_000);
    assert_eq!(t.write_completion(), 10_500 + 6_000);
}

/// Tests that blank lines between constraints are ignored.
#[test]
fn test_blank_lines_skipped() {
    let spaced = DEVICE.replace('\n', "\n\n");
    assert_eq!(TimingModel::parse(&spaced, 9, 7).unwrap(), ddr3());
}

/// Tests rejection of a device file with a missing constraint.
#[test]
fn test_missing_constraint() {
    let short: String = DEVICE.lines().take(11).map(|l| format!("{}\n", l)).collect();
    match TimingModel::parse(&short, 9, 7) {
        Err(Error::TimingConstraintCount { expected, found }) => {
            assert_eq!(expected, 12);
            assert_eq!(found, 11);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

/// Tests rejection of an unparseable value with its line number.
#[test]
fn test_malformed_value() {
    let bad = DEVICE.replace("tRAS = 36", "tRAS = fast");
    match TimingModel::parse(&bad, 9, 7) {
        Err(Error::MalformedTiming { line, .. }) => assert_eq!(line, 4),
        other => panic!("unexpected result: {:?}", other),
    }
}

/// Tests that a line without a third token is rejected.
#[test]
fn test_missing_value_token() {
    let bad = DEVICE.replace("tCK = 1.5", "tCK");
    assert!(matches!(
        TimingModel::parse(&bad, 9, 7),
        Err(Error::MalformedTiming { line: 12, .. })
    ));
}

/// Tests that a negative read-to-write turnaround is clamped to zero.
#[test]
fn test_negative_rtw_clamped() {
    let t = TimingModel::parse(DEVICE, 1, 9).unwrap();
    assert_eq!(t.t_rtw, 0);
}

/// Tests construction straight from a constraint slice.
#[test]
fn test_from_constants() {
    let c = [13.5, 13.5, 49.5, 36.0, 7.5, 15.0, 7.5, 6.0, 7.5, 30.0, 45.0, 1.5];
    assert_eq!(TimingModel::from_constants(&c, 9, 7).unwrap(), ddr3());
    assert!(TimingModel::from_constants(&c[..3], 9, 7).is_err());
}
