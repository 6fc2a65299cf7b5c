//! Replays a confirmation log to find out which orders are still working at the end of the
//! session.
//!
//! The ledger trusts the physical order of the log: records are applied one at a time, in file
//! order, and timestamps are only used to drop stale submissions. An order moves from absent to
//! live on an UnconfirmedNew, has its quantity moved by fills, and goes back to absent on any
//! terminal kind or when a fill leaves nothing outstanding.
use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::codec::{Body, EventKind, ExecTransType, Record};
use crate::config::RolloverConfig;

/// What a single record did to the ledger.
#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    /// UnconfirmedNew accepted, entry created or overwritten.
    Opened,
    /// UnconfirmedNew older than the staleness window, dropped.
    Stale,
    /// Broker acknowledgement, nothing changes but the record is worth keeping.
    Acknowledged,
    Filled { remaining: f64 },
    Busted { remaining: f64 },
    /// Fill took the order to zero.
    Closed,
    /// Terminal kind removed the entry.
    Resolved,
    /// Record referred to an order the ledger does not know about.
    Ignored,
    Unchanged,
}

impl Applied {
    /// Records that may be carried into the next session if their order is still live once the
    /// whole log has been replayed.
    pub fn is_candidate(&self) -> bool {
        matches!(self, Applied::Opened | Applied::Acknowledged)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReplayStats {
    pub records: usize,
    pub stale_orders: usize,
    pub unknown_references: usize,
    pub resolved: usize,
}

/// What the ledger knows about one live order.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct LedgerEntry {
    pub outstanding: f64,
    /// Fill identifiers seen for the order, in log order without duplicates.
    pub exec_ids: Vec<String>,
}

fn push_exec_id(ids: &mut Vec<String>, exec_id: &str) {
    if !ids.iter().any(|id| id == exec_id) {
        ids.push(exec_id.to_string());
    }
}

#[derive(Debug)]
pub struct OrderLedger {
    config: RolloverConfig,
    entries: HashMap<String, LedgerEntry>,
    //Fills of orders that are not live, an entry opened later for the same id takes them over
    detached: HashMap<String, Vec<String>>,
    stats: ReplayStats,
}

impl OrderLedger {
    pub fn new(config: RolloverConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            detached: HashMap::new(),
            stats: ReplayStats::default(),
        }
    }

    pub fn entry(&self, order_id: &str) -> Option<&LedgerEntry> {
        self.entries.get(order_id)
    }

    pub fn outstanding(&self, order_id: &str) -> Option<f64> {
        self.entries.get(order_id).map(|entry| entry.outstanding)
    }

    pub fn is_live(&self, order_id: &str) -> bool {
        self.entries.contains_key(order_id)
    }

    /// Fill identifiers seen for `order_id`, whether or not the order is live.
    pub fn exec_ids(&self, order_id: &str) -> &[String] {
        match self.entries.get(order_id) {
            Some(entry) => &entry.exec_ids,
            None => self
                .detached
                .get(order_id)
                .map(|ids| ids.as_slice())
                .unwrap_or_default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &ReplayStats {
        &self.stats
    }

    fn is_stale(&self, timestamp: i64, now: OffsetDateTime) -> bool {
        let now_micros = i64::try_from(now.unix_timestamp_nanos() / 1_000).unwrap_or(i64::MAX);
        Duration::microseconds(now_micros.saturating_sub(timestamp)) > self.config.staleness
    }

    fn record_exec_id(&mut self, order_id: &str, exec_id: &str) {
        let ids = match self.entries.get_mut(order_id) {
            Some(entry) => &mut entry.exec_ids,
            None => self.detached.entry(order_id.to_string()).or_default(),
        };
        push_exec_id(ids, exec_id);
    }

    fn open(&mut self, order_id: &str, qty: f64) {
        if let Some(entry) = self.entries.get_mut(order_id) {
            entry.outstanding = qty;
            return;
        }
        let entry = LedgerEntry {
            outstanding: qty,
            exec_ids: self.detached.remove(order_id).unwrap_or_default(),
        };
        self.entries.insert(order_id.to_string(), entry);
    }

    fn remove(&mut self, order_id: &str) -> bool {
        let Some(entry) = self.entries.remove(order_id) else {
            return false;
        };
        if !entry.exec_ids.is_empty() {
            self.detached.insert(order_id.to_string(), entry.exec_ids);
        }
        true
    }

    fn apply_fill(&mut self, order_id: &str, last_qty: f64, trans_type: ExecTransType) -> Applied {
        let Some(entry) = self.entries.get_mut(order_id) else {
            debug!("Fill for unknown order {}, ignoring", order_id);
            self.stats.unknown_references += 1;
            return Applied::Ignored;
        };

        match trans_type {
            ExecTransType::Cancel => {
                entry.outstanding += last_qty;
                Applied::Busted {
                    remaining: entry.outstanding,
                }
            }
            ExecTransType::New => {
                entry.outstanding -= last_qty;
                let remaining = entry.outstanding;
                if remaining <= self.config.fill_epsilon {
                    self.remove(order_id);
                    debug!("Order {} fully filled", order_id);
                    Applied::Closed
                } else {
                    Applied::Filled { remaining }
                }
            }
            ExecTransType::Correct | ExecTransType::Status => Applied::Unchanged,
        }
    }

    pub fn apply(&mut self, record: &Record, now: OffsetDateTime) -> Applied {
        self.stats.records += 1;

        match (&record.kind, &record.body) {
            (EventKind::UnconfirmedNew, Body::UnconfirmedNew(order)) => {
                if self.is_stale(order.timestamp, now) {
                    info!(
                        "Dropping stale order {} submitted at {}",
                        order.order_id, order.timestamp
                    );
                    self.stats.stale_orders += 1;
                    return Applied::Stale;
                }
                self.open(&order.order_id, order.qty);
                Applied::Opened
            }
            (EventKind::New, _) => Applied::Acknowledged,
            (
                EventKind::PartiallyFilled | EventKind::Filled,
                Body::Fill {
                    order_id,
                    last_qty,
                    trans_type,
                    exec_id,
                    ..
                },
            ) => {
                self.record_exec_id(order_id, exec_id);
                self.apply_fill(order_id, *last_qty, *trans_type)
            }
            (kind, body) if kind.is_terminal() => {
                if self.remove(body.order_id()) {
                    self.stats.resolved += 1;
                    Applied::Resolved
                } else {
                    self.stats.unknown_references += 1;
                    Applied::Ignored
                }
            }
            //UnconfirmedCancel, PendingCancel and CancelRejected neither open nor resolve an order
            _ => Applied::Unchanged,
        }
    }
}
