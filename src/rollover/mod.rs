//! End of session rollover.
//!
//! A rollover replays the session's confirmation log through an [OrderLedger] and writes a new
//! log, for the next session, that contains only the orders still working. Carried orders keep
//! their original records, byte for byte and in their original relative order, except that
//! sequence numbers are reassigned from one and the UnconfirmedNew qty token is replaced by the
//! outstanding quantity. Every fill already
//! seen for the order is written as an Executed marker straight after its UnconfirmedNew so that
//! the engine does not apply it twice.
//!
//! [Compactor] is pure, bytes in and bytes out. [roll_file] wraps it with the filesystem checks:
//! nothing runs if the destination is already there or the source is missing, and the destination
//! is only created once the whole source has been decoded and replayed.
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::codec::{records, EventKind, Record};
use crate::config::RolloverConfig;
use crate::error::Result;
use crate::ledger::{OrderLedger, ReplayStats};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RolloverReport {
    pub records_read: usize,
    pub orders_rolled: usize,
    pub records_written: usize,
    pub markers_written: usize,
    pub stale_orders: usize,
    pub unknown_references: usize,
}

impl RolloverReport {
    fn new(stats: &ReplayStats, orders_rolled: usize) -> Self {
        Self {
            records_read: stats.records,
            orders_rolled,
            records_written: 0,
            markers_written: 0,
            stale_orders: stats.stale_orders,
            unknown_references: stats.unknown_references,
        }
    }
}

#[derive(Debug)]
pub struct Rollover {
    pub bytes: Vec<u8>,
    pub report: RolloverReport,
}

#[derive(Clone, Debug, Default)]
pub struct Compactor {
    config: RolloverConfig,
}

impl Compactor {
    pub fn new(config: RolloverConfig) -> Self {
        Self { config }
    }

    pub fn compact(&self, source: &[u8], now: OffsetDateTime) -> Result<Rollover> {
        let mut ledger = OrderLedger::new(self.config.clone());
        let mut candidates: Vec<Record> = Vec::new();

        for record in records(source) {
            let record = record?;
            if ledger.apply(&record, now).is_candidate() {
                candidates.push(record);
            }
        }

        let mut report = RolloverReport::new(ledger.stats(), ledger.len());
        let mut bytes = Vec::new();
        let mut sequence: u32 = 0;

        for mut record in candidates {
            let Some(outstanding) = ledger.outstanding(record.order_id()) else {
                continue;
            };

            sequence += 1;
            record.sequence = sequence;

            let is_submission = record.kind == EventKind::UnconfirmedNew;
            record.set_qty(outstanding);
            record.encode_into(&mut bytes)?;
            report.records_written += 1;

            if !is_submission {
                continue;
            }

            for exec_id in ledger.exec_ids(record.order_id()) {
                sequence += 1;
                Record::executed(sequence, record.account_id, record.order_id(), exec_id)
                    .encode_into(&mut bytes)?;
                report.records_written += 1;
                report.markers_written += 1;
            }
        }

        Ok(Rollover { bytes, report })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RollOutcome {
    Rolled(RolloverReport),
    MissingSource,
    DestinationExists,
}

/// Rolls `source` into `destination`. Only a corrupt source or an io failure is an error, the
/// skip conditions come back as [RollOutcome] variants.
pub fn roll_file(
    source: &Path,
    destination: &Path,
    now: OffsetDateTime,
    config: RolloverConfig,
) -> Result<RollOutcome> {
    if destination.exists() {
        info!(
            "{} already exists, skip rolling {}",
            destination.display(),
            source.display()
        );
        return Ok(RollOutcome::DestinationExists);
    }

    if !source.exists() {
        info!("{} does not exist, skip rolling", source.display());
        return Ok(RollOutcome::MissingSource);
    }

    let contents = fs::read(source)?;
    let rollover = Compactor::new(config).compact(&contents, now)?;

    //create_new so that a concurrent roll into the same destination loses rather than clobbers
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            info!(
                "{} appeared while rolling, leaving it untouched",
                destination.display()
            );
            return Ok(RollOutcome::DestinationExists);
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(&rollover.bytes)?;
    file.sync_all()?;

    info!(
        "{} orders rolled from {} into {} ({} records, {} stale dropped)",
        rollover.report.orders_rolled,
        source.display(),
        destination.display(),
        rollover.report.records_written,
        rollover.report.stale_orders
    );
    Ok(RollOutcome::Rolled(rollover.report))
}
