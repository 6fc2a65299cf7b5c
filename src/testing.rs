//! Builders for confirmation logs, used by tests and benchmarks in place of a live engine.
use rand::thread_rng;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use time::{Duration, OffsetDateTime};

use crate::codec::{
    Body, EventKind, ExecTransType, NewOrder, OrderType, Record, Side, TimeInForce,
};
use crate::error::Result;

fn micros(at: OffsetDateTime) -> i64 {
    i64::try_from(at.unix_timestamp_nanos() / 1_000).unwrap_or(i64::MAX)
}

/// Appends records with increasing sequence numbers. Every record is stamped with the builder's
/// current time, which can be moved with [ConfirmationLogBuilder::at].
pub struct ConfirmationLogBuilder {
    records: Vec<Record>,
    now: OffsetDateTime,
    account_id: u16,
}

impl ConfirmationLogBuilder {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            records: Vec::new(),
            now,
            account_id: 1,
        }
    }

    pub fn at(&mut self, now: OffsetDateTime) -> &mut Self {
        self.now = now;
        self
    }

    pub fn with_account(&mut self, account_id: u16) -> &mut Self {
        self.account_id = account_id;
        self
    }

    pub fn push(&mut self, kind: EventKind, body: Body) -> &mut Self {
        let sequence = self.records.len() as u32 + 1;
        self.records.push(Record::new(sequence, kind, self.account_id, body));
        self
    }

    pub fn unconfirmed_new(&mut self, order_id: &str, qty: f64) -> &mut Self {
        let order = NewOrder {
            order_id: order_id.to_string(),
            timestamp: micros(self.now),
            algo_id: 0,
            qty,
            price: 100.0,
            stop_price: 0.0,
            side: Side::Buy,
            order_type: OrderType::Limit,
            tif: TimeInForce::Day,
            security_id: 1,
            user_id: 1,
            broker_account_id: 1,
            destination: None,
            extra: Vec::new(),
        };
        self.push(EventKind::UnconfirmedNew, Body::UnconfirmedNew(order))
    }

    pub fn new_ack(&mut self, order_id: &str, broker_order_id: &str) -> &mut Self {
        let body = Body::New {
            order_id: order_id.to_string(),
            timestamp: micros(self.now),
            broker_order_id: broker_order_id.to_string(),
        };
        self.push(EventKind::New, body)
    }

    pub fn fill(
        &mut self,
        order_id: &str,
        last_qty: f64,
        trans_type: ExecTransType,
        exec_id: &str,
    ) -> &mut Self {
        let body = Body::Fill {
            order_id: order_id.to_string(),
            timestamp: micros(self.now),
            last_qty,
            last_price: 100.0,
            trans_type,
            exec_id: exec_id.to_string(),
        };
        self.push(EventKind::PartiallyFilled, body)
    }

    pub fn terminal(&mut self, kind: EventKind, order_id: &str) -> &mut Self {
        let body = Body::Text {
            order_id: order_id.to_string(),
            timestamp: micros(self.now),
            text: String::new(),
        };
        self.push(kind, body)
    }

    pub fn risk_rejected(&mut self, order_id: &str, reason: &str) -> &mut Self {
        let body = Body::RiskRejected {
            order_id: order_id.to_string(),
            reason: reason.to_string(),
        };
        self.push(EventKind::RiskRejected, body)
    }

    pub fn comment(&mut self, text: &str) -> &mut Self {
        let mut tokens = text.split_ascii_whitespace();
        let body = Body::Generic {
            order_id: tokens.next().unwrap_or_default().to_string(),
            timestamp: tokens.next().unwrap_or_default().to_string(),
            text: tokens.collect::<Vec<_>>().join(" "),
        };
        self.push(EventKind::Comment, body)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn build(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for record in &self.records {
            record.encode_into(&mut out)?;
        }
        Ok(out)
    }
}

/// Session log for `orders` orders submitted over the day before `now`. Each order gets an
/// acknowledgement, some fills, and about half of them reach a terminal state.
pub fn random_log(orders: usize, now: OffsetDateTime) -> Result<Vec<u8>> {
    let qty_dist = Uniform::new(100.0, 1000.0);
    let age_dist = Uniform::new(0, 20 * 3600);
    let mut rng = thread_rng();

    let mut log = ConfirmationLogBuilder::new(now);
    for i in 0..orders {
        let order_id = i.to_string();
        let qty: f64 = qty_dist.sample(&mut rng);
        let qty = qty.round();

        log.at(now - Duration::seconds(age_dist.sample(&mut rng)))
            .unconfirmed_new(&order_id, qty)
            .new_ack(&order_id, &format!("B{i}"));

        let fills = rng.gen_range(0..4);
        for fill in 0..fills {
            log.fill(
                &order_id,
                (qty / 8.0).round(),
                ExecTransType::New,
                &format!("{i}-{fill}"),
            );
        }

        if rng.gen_bool(0.5) {
            log.terminal(EventKind::Canceled, &order_id);
        }
    }
    log.build()
}
