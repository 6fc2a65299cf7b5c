use std::fs;

use janus::codec::{decode_all, Body, EventKind, ExecTransType};
use janus::testing::{random_log, ConfirmationLogBuilder};
use janus::{roll_file, RollOutcome, RolloverConfig};
use tempfile::tempdir;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

fn now() -> OffsetDateTime {
    datetime!(2024-03-01 17:00 UTC)
}

fn session_log() -> Vec<u8> {
    let mut log = ConfirmationLogBuilder::new(now() - Duration::hours(8));
    log.unconfirmed_new("A1", 500.0)
        .new_ack("A1", "B-A1")
        .fill("A1", 200.0, ExecTransType::New, "X1")
        .unconfirmed_new("A2", 100.0)
        .new_ack("A2", "B-A2")
        .terminal(EventKind::Canceled, "A2");
    log.build().unwrap()
}

#[test]
fn test_that_rollover_writes_outstanding_orders() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("confirmations");
    let destination = dir.path().join("confirmations.next");
    fs::write(&source, session_log()).unwrap();

    let outcome = roll_file(&source, &destination, now(), RolloverConfig::default()).unwrap();
    match outcome {
        RollOutcome::Rolled(report) => {
            assert_eq!(report.orders_rolled, 1);
            assert_eq!(report.records_written, 3);
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let records = decode_all(&fs::read(&destination).unwrap()).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.order_id() == "A1"));
    match &records[0].body {
        Body::UnconfirmedNew(order) => assert_eq!(order.qty, 300.0),
        other => panic!("unexpected body {other:?}"),
    }
    assert_eq!(records[1].kind, EventKind::Executed);
    assert_eq!(records[2].kind, EventKind::New);
}

#[test]
fn test_that_second_rollover_leaves_destination_untouched() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("confirmations");
    let destination = dir.path().join("confirmations.next");
    fs::write(&source, session_log()).unwrap();

    roll_file(&source, &destination, now(), RolloverConfig::default()).unwrap();
    let first = fs::read(&destination).unwrap();

    //Different source contents so a second write would be visible
    let mut log = ConfirmationLogBuilder::new(now());
    log.unconfirmed_new("Z1", 1.0);
    fs::write(&source, log.build().unwrap()).unwrap();

    let outcome = roll_file(&source, &destination, now(), RolloverConfig::default()).unwrap();
    assert_eq!(outcome, RollOutcome::DestinationExists);
    assert_eq!(fs::read(&destination).unwrap(), first);
}

#[test]
fn test_that_missing_source_is_skipped() {
    let dir = tempdir().unwrap();
    let destination = dir.path().join("confirmations.next");

    let outcome = roll_file(
        &dir.path().join("confirmations"),
        &destination,
        now(),
        RolloverConfig::default(),
    )
    .unwrap();
    assert_eq!(outcome, RollOutcome::MissingSource);
    assert!(!destination.exists());
}

#[test]
fn test_that_fully_resolved_session_creates_empty_destination() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("confirmations");
    let destination = dir.path().join("confirmations.next");

    let mut log = ConfirmationLogBuilder::new(now());
    log.unconfirmed_new("A1", 100.0)
        .fill("A1", 100.0, ExecTransType::New, "X1")
        .unconfirmed_new("A2", 100.0)
        .terminal(EventKind::Rejected, "A2");
    fs::write(&source, log.build().unwrap()).unwrap();

    let outcome = roll_file(&source, &destination, now(), RolloverConfig::default()).unwrap();
    assert!(matches!(outcome, RollOutcome::Rolled(_)));
    assert!(destination.exists());
    assert!(fs::read(&destination).unwrap().is_empty());
}

#[test]
fn test_that_corrupt_source_writes_nothing() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("confirmations");
    let destination = dir.path().join("confirmations.next");
    let log = session_log();
    fs::write(&source, &log[..log.len() - 1]).unwrap();

    let err = roll_file(&source, &destination, now(), RolloverConfig::default()).unwrap_err();
    assert!(err.is_malformed());
    assert!(!destination.exists());
}

#[test]
fn test_that_staleness_window_is_configurable() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("confirmations");
    let destination = dir.path().join("confirmations.next");
    fs::write(&source, session_log()).unwrap();

    let config = RolloverConfig::default().with_staleness(Duration::hours(1));
    let outcome = roll_file(&source, &destination, now(), config).unwrap();
    match outcome {
        RollOutcome::Rolled(report) => {
            assert_eq!(report.stale_orders, 2);
            assert_eq!(report.orders_rolled, 0);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_that_no_resolved_order_survives_a_random_session() {
    let source = random_log(200, now()).unwrap();
    let records = decode_all(&source).unwrap();

    let rollover = janus::Compactor::default().compact(&source, now()).unwrap();
    let rolled = decode_all(&rollover.bytes).unwrap();

    for record in records.iter().filter(|r| r.kind.is_terminal()) {
        assert!(rolled.iter().all(|r| r.order_id() != record.order_id()));
    }
    for (i, record) in rolled.iter().enumerate() {
        assert_eq!(record.sequence as usize, i + 1);
    }
}
