//! Tests for report rendering and validator input.

use std::collections::BTreeMap;
use std::fs;

use vwm_cli::input::collect_validators;
use vwm_cli::render::{failures_table, report_summary, unavailable_message};
use vwm_model::{
    AggregateReport, Amount, EntityId, EpochRange, ErrorClass, ErrorTally, FailedPair,
    UnavailableReport, Valuation,
};

fn dash(value: f64) -> Amount {
    Amount::new(value).unwrap()
}

fn tally(connection: usize, timeout: usize) -> ErrorTally {
    ErrorTally {
        connection,
        timeout,
    }
}

fn partial_report() -> AggregateReport {
    let a = EntityId::new("A");
    let b = EntityId::new("B");
    let mut withdrawals = BTreeMap::new();
    withdrawals.insert(a.clone(), BTreeMap::from([(6, dash(3.0)), (7, dash(2.0))]));
    withdrawals.insert(b.clone(), BTreeMap::from([(7, dash(1.0))]));

    AggregateReport {
        validator_totals: BTreeMap::from([(a, dash(5.0)), (b.clone(), dash(1.0))]),
        grand_total: dash(6.0),
        withdrawals,
        failures: vec![FailedPair {
            entity: b,
            epoch: 6,
            error: ErrorClass::ConnectionError,
        }],
        errors: tally(1, 0),
        epoch_range: EpochRange::new(6, 7),
        populated: Some(EpochRange::new(6, 7)),
        current_epoch: 7,
        identities: BTreeMap::new(),
        valuation: Some(Valuation::new("USD", 25.0, dash(6.0))),
    }
}

#[test]
fn connection_guidance() {
    let unavailable = UnavailableReport {
        errors: tally(2, 1),
        epoch_range: EpochRange::single(21),
        attempted: 3,
    };
    insta::assert_snapshot!(unavailable_message(&unavailable), @r"
    Withdrawal data unavailable for epoch 21 (2 connection errors, 1 timeout).
    Could not connect to the data service. Please check your internet connection and try again later.
    ");
}

#[test]
fn timeout_guidance() {
    let unavailable = UnavailableReport {
        errors: tally(0, 4),
        epoch_range: EpochRange::single(6),
        attempted: 4,
    };
    insta::assert_snapshot!(unavailable_message(&unavailable), @r"
    Withdrawal data unavailable for epoch 6 (4 timeouts).
    Could not reach the data service: the request timed out. Please try again later.
    ");
}

#[test]
fn partial_report_summary() {
    insta::assert_snapshot!(report_summary(&partial_report()), @r"
    Epochs: 6-7 (current 7)
    Data found for epochs 6-7
    Grand total: 6.00000000 DASH
    Value: 150.00 USD at 25.00 USD/DASH
    Partial result: 1 pair could not be fetched and is excluded from the totals. Run again to retry.
    ");
}

#[test]
fn empty_range_summary() {
    let mut report = partial_report();
    report.validator_totals = BTreeMap::from([(EntityId::new("A"), Amount::ZERO)]);
    report.grand_total = Amount::ZERO;
    report.withdrawals.clear();
    report.failures.clear();
    report.errors = ErrorTally::default();
    report.epoch_range = EpochRange::new(12, 10);
    report.populated = None;
    report.current_epoch = 10;
    report.valuation = None;

    insta::assert_snapshot!(report_summary(&report), @r"
    Epochs: none (start 12 is past current epoch 10)
    Grand total: 0.00000000 DASH
    ");
    assert!(failures_table(&report).is_none());
}

#[test]
fn failures_are_listed() {
    let table = failures_table(&partial_report()).unwrap().to_string();
    assert!(table.contains("connection error"));
}

#[test]
fn validators_file_is_read_line_by_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("validators.txt");
    fs::write(&path, "A\n\n  B  \nA\nC\n").unwrap();

    let validators = collect_validators(&["C".to_string()], Some(&path)).unwrap();
    assert_eq!(
        validators,
        vec![EntityId::new("C"), EntityId::new("A"), EntityId::new("B")]
    );
}

#[test]
fn missing_validators_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = collect_validators(&[], Some(&dir.path().join("absent.txt"))).unwrap_err();
    assert!(format!("{err:#}").contains("read validators file"));
}
