use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::kind::{EventKind, ExecTransType, OrderType, Side, TimeInForce};
use crate::error::{JanusError, Result};

/// sequence (u32) + body_length (u16) + event_kind (u8) + account_id (u16)
pub const RECORD_HEADER_SIZE: usize = 9;
/// Terminator and line-feed after the body, not counted in body_length.
pub const RECORD_TRAILER_SIZE: usize = 2;

const TERMINATOR: u8 = 0;
const LINE_FEED: u8 = b'\n';
//Position of qty in an UnconfirmedNew body
const QTY_TOKEN: usize = 3;

/// Payload of an UnconfirmedNew: everything the engine needs to resubmit the order.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NewOrder {
    pub order_id: String,
    pub timestamp: i64,
    pub algo_id: u32,
    pub qty: f64,
    pub price: f64,
    pub stop_price: f64,
    pub side: Side,
    pub order_type: OrderType,
    pub tif: TimeInForce,
    pub security_id: u32,
    pub user_id: u32,
    pub broker_account_id: u32,
    pub destination: Option<String>,
    /// Trailing tokens after the destination, carried through untouched.
    pub extra: Vec<String>,
}

/// One shape per family of event kinds. The kind itself lives on [Record] because several kinds
/// share a shape (both fill kinds, all the terminal/ack kinds).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub enum Body {
    New {
        order_id: String,
        timestamp: i64,
        broker_order_id: String,
    },
    Fill {
        order_id: String,
        timestamp: i64,
        last_qty: f64,
        last_price: f64,
        trans_type: ExecTransType,
        exec_id: String,
    },
    UnconfirmedNew(NewOrder),
    UnconfirmedCancel {
        order_id: String,
        timestamp: i64,
        original_order_id: String,
    },
    RiskRejected {
        order_id: String,
        reason: String,
    },
    Executed {
        order_id: String,
        exec_id: String,
    },
    Text {
        order_id: String,
        timestamp: i64,
        text: String,
    },
    //Free text kinds and unrecognised kinds, nothing is parsed so nothing can fail
    Generic {
        order_id: String,
        timestamp: String,
        text: String,
    },
}

struct Tokens<'a> {
    inner: Vec<&'a str>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_ascii_whitespace().collect(),
        }
    }

    fn expect_len(&self, min: usize, max: usize) -> std::result::Result<(), String> {
        let len = self.inner.len();
        if len < min || len > max {
            if min == max {
                return Err(format!("expected {min} body tokens, found {len}"));
            }
            return Err(format!("expected {min} to {max} body tokens, found {len}"));
        }
        Ok(())
    }

    fn text(&self, pos: usize) -> String {
        self.inner.get(pos).map(|v| v.to_string()).unwrap_or_default()
    }

    fn number<T: FromStr>(&self, pos: usize, field: &str) -> std::result::Result<T, String> {
        let token = self.inner.get(pos).copied().unwrap_or_default();
        token
            .parse()
            .map_err(|_| format!("{field} is not a number: {token:?}"))
    }

    fn code<T>(
        &self,
        pos: usize,
        field: &str,
        parse: fn(&str) -> Option<T>,
    ) -> std::result::Result<T, String> {
        let token = self.inner.get(pos).copied().unwrap_or_default();
        parse(token).ok_or_else(|| format!("unknown {field} code: {token:?}"))
    }

    fn rest(&self, from: usize) -> String {
        self.inner.get(from..).map(|v| v.join(" ")).unwrap_or_default()
    }
}

impl Body {
    /// Parses the whitespace separated body text for the given kind. Returns the reason on
    /// failure, the caller knows the offset.
    pub fn parse(kind: EventKind, text: &str) -> std::result::Result<Self, String> {
        let tokens = Tokens::new(text);
        let body = match kind {
            EventKind::New => {
                tokens.expect_len(3, 3)?;
                Body::New {
                    order_id: tokens.text(0),
                    timestamp: tokens.number(1, "timestamp")?,
                    broker_order_id: tokens.text(2),
                }
            }
            EventKind::PartiallyFilled | EventKind::Filled => {
                tokens.expect_len(6, 6)?;
                Body::Fill {
                    order_id: tokens.text(0),
                    timestamp: tokens.number(1, "timestamp")?,
                    last_qty: tokens.number(2, "last_qty")?,
                    last_price: tokens.number(3, "last_price")?,
                    trans_type: tokens.code(4, "exec_trans_type", ExecTransType::from_token)?,
                    exec_id: tokens.text(5),
                }
            }
            EventKind::UnconfirmedNew => {
                tokens.expect_len(12, usize::MAX)?;
                Body::UnconfirmedNew(NewOrder {
                    order_id: tokens.text(0),
                    timestamp: tokens.number(1, "timestamp")?,
                    algo_id: tokens.number(2, "algo_id")?,
                    qty: tokens.number(3, "qty")?,
                    price: tokens.number(4, "price")?,
                    stop_price: tokens.number(5, "stop_price")?,
                    side: tokens.code(6, "side", Side::from_token)?,
                    order_type: tokens.code(7, "order_type", OrderType::from_token)?,
                    tif: tokens.code(8, "tif", TimeInForce::from_token)?,
                    security_id: tokens.number(9, "security_id")?,
                    user_id: tokens.number(10, "user_id")?,
                    broker_account_id: tokens.number(11, "broker_account_id")?,
                    destination: tokens.inner.get(12).map(|v| v.to_string()),
                    extra: tokens
                        .inner
                        .get(13..)
                        .unwrap_or_default()
                        .iter()
                        .map(|v| v.to_string())
                        .collect(),
                })
            }
            EventKind::UnconfirmedCancel => {
                tokens.expect_len(3, 3)?;
                Body::UnconfirmedCancel {
                    order_id: tokens.text(0),
                    timestamp: tokens.number(1, "timestamp")?,
                    original_order_id: tokens.text(2),
                }
            }
            EventKind::RiskRejected => {
                tokens.expect_len(1, usize::MAX)?;
                Body::RiskRejected {
                    order_id: tokens.text(0),
                    reason: tokens.rest(1),
                }
            }
            EventKind::Executed => {
                tokens.expect_len(2, 2)?;
                Body::Executed {
                    order_id: tokens.text(0),
                    exec_id: tokens.text(1),
                }
            }
            EventKind::Comment | EventKind::Stopped | EventKind::Unknown(_) => Body::Generic {
                order_id: tokens.text(0),
                timestamp: tokens.text(1),
                text: tokens.rest(2),
            },
            _ => {
                tokens.expect_len(2, usize::MAX)?;
                Body::Text {
                    order_id: tokens.text(0),
                    timestamp: tokens.number(1, "timestamp")?,
                    text: tokens.rest(2),
                }
            }
        };
        Ok(body)
    }

    pub fn order_id(&self) -> &str {
        match self {
            Body::New { order_id, .. }
            | Body::Fill { order_id, .. }
            | Body::UnconfirmedCancel { order_id, .. }
            | Body::RiskRejected { order_id, .. }
            | Body::Executed { order_id, .. }
            | Body::Text { order_id, .. }
            | Body::Generic { order_id, .. } => order_id,
            Body::UnconfirmedNew(order) => &order.order_id,
        }
    }

    /// Microseconds since the epoch, for the shapes that carry one.
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            Body::New { timestamp, .. }
            | Body::Fill { timestamp, .. }
            | Body::UnconfirmedCancel { timestamp, .. }
            | Body::Text { timestamp, .. } => Some(*timestamp),
            Body::UnconfirmedNew(order) => Some(order.timestamp),
            Body::Generic { timestamp, .. } => timestamp.parse().ok(),
            Body::RiskRejected { .. } | Body::Executed { .. } => None,
        }
    }
}

// Writes tokens separated by single spaces, skipping empty ones so free text that was empty on
// the way in stays absent on the way out.
fn write_tokens(f: &mut fmt::Formatter<'_>, tokens: &[&dyn fmt::Display]) -> fmt::Result {
    let mut first = true;
    for token in tokens {
        let rendered = token.to_string();
        if rendered.is_empty() {
            continue;
        }
        if !first {
            f.write_str(" ")?;
        }
        f.write_str(&rendered)?;
        first = false;
    }
    Ok(())
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::New {
                order_id,
                timestamp,
                broker_order_id,
            } => write_tokens(f, &[order_id, timestamp, broker_order_id]),
            Body::Fill {
                order_id,
                timestamp,
                last_qty,
                last_price,
                trans_type,
                exec_id,
            } => write_tokens(
                f,
                &[
                    order_id,
                    timestamp,
                    last_qty,
                    last_price,
                    &trans_type.code(),
                    exec_id,
                ],
            ),
            Body::UnconfirmedNew(order) => {
                let destination = order.destination.clone().unwrap_or_default();
                let extra = order.extra.join(" ");
                write_tokens(
                    f,
                    &[
                        &order.order_id,
                        &order.timestamp,
                        &order.algo_id,
                        &order.qty,
                        &order.price,
                        &order.stop_price,
                        &order.side.code(),
                        &order.order_type.code(),
                        &order.tif.code(),
                        &order.security_id,
                        &order.user_id,
                        &order.broker_account_id,
                        &destination,
                        &extra,
                    ],
                )
            }
            Body::UnconfirmedCancel {
                order_id,
                timestamp,
                original_order_id,
            } => write_tokens(f, &[order_id, timestamp, original_order_id]),
            Body::RiskRejected { order_id, reason } => write_tokens(f, &[order_id, reason]),
            Body::Executed { order_id, exec_id } => write_tokens(f, &[order_id, exec_id]),
            Body::Text {
                order_id,
                timestamp,
                text,
            } => write_tokens(f, &[order_id, timestamp, text]),
            Body::Generic {
                order_id,
                timestamp,
                text,
            } => write_tokens(f, &[order_id, timestamp, text]),
        }
    }
}

// Body bytes as they were read, with the body they parsed to. Encoding reuses the bytes for as
// long as the body still equals `parsed`.
#[derive(Clone, Debug)]
struct Verbatim {
    bytes: Vec<u8>,
    parsed: Body,
}

// Byte range of the token at `index`, counting runs of whitespace as one separator.
fn token_span(text: &str, index: usize) -> Option<Range<usize>> {
    text.split_ascii_whitespace()
        .map(|token| {
            let start = token.as_ptr() as usize - text.as_ptr() as usize;
            start..start + token.len()
        })
        .nth(index)
}

/// One entry of the confirmation log.
///
/// A decoded record remembers its body bytes so that re-encoding it copies them unchanged,
/// only a body that has been changed since decoding is rendered again from its fields.
/// Equality looks at the fields only.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Record {
    pub sequence: u32,
    pub kind: EventKind,
    pub account_id: u16,
    pub body: Body,
    #[serde(skip)]
    source: Option<Verbatim>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
            && self.kind == other.kind
            && self.account_id == other.account_id
            && self.body == other.body
    }
}

impl Record {
    pub fn new(sequence: u32, kind: EventKind, account_id: u16, body: Body) -> Self {
        Self {
            sequence,
            kind,
            account_id,
            body,
            source: None,
        }
    }

    /// Marker telling the engine that `exec_id` has already been applied to `order_id`.
    pub fn executed(
        sequence: u32,
        account_id: u16,
        order_id: impl Into<String>,
        exec_id: impl Into<String>,
    ) -> Self {
        let body = Body::Executed {
            order_id: order_id.into(),
            exec_id: exec_id.into(),
        };
        Self::new(sequence, EventKind::Executed, account_id, body)
    }

    /// Replaces the quantity of an UnconfirmedNew, other kinds are left alone. A decoded record
    /// only has its qty token rewritten, every other byte of the body is kept.
    pub fn set_qty(&mut self, qty: f64) {
        let Body::UnconfirmedNew(order) = &mut self.body else {
            return;
        };
        if order.qty == qty {
            return;
        }
        order.qty = qty;

        let Some(source) = &mut self.source else {
            return;
        };
        let span = std::str::from_utf8(&source.bytes)
            .ok()
            .and_then(|text| token_span(text, QTY_TOKEN));
        if let (Body::UnconfirmedNew(parsed), Some(span)) = (&mut source.parsed, span) {
            parsed.qty = qty;
            source.bytes.splice(span, qty.to_string().into_bytes());
        }
    }

    pub fn order_id(&self) -> &str {
        self.body.order_id()
    }

    /// Appends the wire form of this record, body_length is taken from the body actually written
    /// so a patched field never leaves a stale length behind.
    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        let rendered;
        let body: &[u8] = match &self.source {
            Some(source) if source.parsed == self.body => &source.bytes,
            _ => {
                rendered = self.body.to_string();
                rendered.as_bytes()
            }
        };
        let body_length =
            u16::try_from(body.len()).map_err(|_| JanusError::BodyTooLong { len: body.len() })?;

        out.reserve(RECORD_HEADER_SIZE + body.len() + RECORD_TRAILER_SIZE);
        out.extend_from_slice(&self.sequence.to_le_bytes());
        out.extend_from_slice(&body_length.to_le_bytes());
        out.push(u8::from(self.kind));
        out.extend_from_slice(&self.account_id.to_le_bytes());
        out.extend_from_slice(body);
        out.push(TERMINATOR);
        out.push(LINE_FEED);
        Ok(())
    }
}

pub fn encode(record: &Record) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    record.encode_into(&mut out)?;
    Ok(out)
}

fn read_u16_at(buffer: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}

fn read_u32_at(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}

/// Decodes the record starting at `offset`, returning it with the number of bytes it occupied.
pub fn decode(buffer: &[u8], offset: usize) -> Result<(Record, usize)> {
    let malformed = |reason: String| JanusError::MalformedRecord { offset, reason };

    let remaining = buffer.len().saturating_sub(offset);
    if remaining < RECORD_HEADER_SIZE {
        return Err(malformed(format!(
            "header needs {RECORD_HEADER_SIZE} bytes, {remaining} left"
        )));
    }

    let sequence = read_u32_at(buffer, offset);
    let body_length = usize::from(read_u16_at(buffer, offset + 4));
    let kind = EventKind::from(buffer[offset + 6]);
    let account_id = read_u16_at(buffer, offset + 7);

    let size = RECORD_HEADER_SIZE + body_length + RECORD_TRAILER_SIZE;
    if remaining < size {
        return Err(malformed(format!(
            "record of {size} bytes (body {body_length}) overruns the {remaining} bytes left"
        )));
    }

    let body_start = offset + RECORD_HEADER_SIZE;
    let raw = &buffer[body_start..body_start + body_length];
    let text = match std::str::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) if matches!(kind, EventKind::Unknown(_)) => String::from_utf8_lossy(raw),
        Err(e) => return Err(malformed(format!("body is not valid utf-8: {e}"))),
    };
    let body = Body::parse(kind, &text).map_err(malformed)?;

    let record = Record {
        sequence,
        kind,
        account_id,
        body: body.clone(),
        source: Some(Verbatim {
            bytes: raw.to_vec(),
            parsed: body,
        }),
    };
    Ok((record, size))
}

/// Walks a whole log front to back. Iteration stops after the first error, a log is either
/// entirely readable or it is corrupt.
pub struct Records<'a> {
    buffer: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Records<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            failed: false,
        }
    }

    pub fn consumed(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset == self.buffer.len() {
            return None;
        }

        match decode(self.buffer, self.offset) {
            Ok((record, consumed)) => {
                self.offset += consumed;
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

pub fn records(buffer: &[u8]) -> Records<'_> {
    Records::new(buffer)
}

/// Decodes every record. Succeeds only if the records account for every byte of `buffer`.
pub fn decode_all(buffer: &[u8]) -> Result<Vec<Record>> {
    records(buffer).collect()
}

#[cfg(test)]
mod tests {
    use super::{decode, decode_all, encode, Body, NewOrder, Record, RECORD_HEADER_SIZE};
    use crate::codec::{EventKind, ExecTransType, OrderType, Side, TimeInForce};

    fn raw(sequence: u32, kind: u8, account_id: u16, body: &str) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&sequence.to_le_bytes());
        out.extend_from_slice(&(body.len() as u16).to_le_bytes());
        out.push(kind);
        out.extend_from_slice(&account_id.to_le_bytes());
        out.extend_from_slice(body.as_bytes());
        out.push(0);
        out.push(b'\n');
        out
    }

    fn order() -> NewOrder {
        NewOrder {
            order_id: "17".to_string(),
            timestamp: 1_700_000_000_000_000,
            algo_id: 0,
            qty: 1000.0,
            price: 10.5,
            stop_price: 0.0,
            side: Side::Buy,
            order_type: OrderType::Limit,
            tif: TimeInForce::Day,
            security_id: 42,
            user_id: 3,
            broker_account_id: 9,
            destination: None,
            extra: Vec::new(),
        }
    }

    #[test]
    fn test_that_header_fields_are_little_endian() {
        let bytes = raw(0x01020304, b'0', 0x0506, "1 100 B1");
        let (record, consumed) = decode(&bytes, 0).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(record.sequence, 0x01020304);
        assert_eq!(record.account_id, 0x0506);
        assert_eq!(record.kind, EventKind::New);
        assert_eq!(
            record.body,
            Body::New {
                order_id: "1".to_string(),
                timestamp: 100,
                broker_order_id: "B1".to_string(),
            }
        );
    }

    #[test]
    fn test_that_encode_reproduces_canonical_bytes() {
        let body = "17 1700000000000000 0 1000 10.5 0 1 2 0 42 3 9 XNYS";
        let bytes = raw(5, b'b', 2, body);
        let (record, _) = decode(&bytes, 0).unwrap();
        assert_eq!(encode(&record).unwrap(), bytes);
    }

    #[test]
    fn test_that_patched_body_recomputes_length() {
        let body = Body::UnconfirmedNew(order());
        let mut record = Record::new(1, EventKind::UnconfirmedNew, 1, body);
        let before = encode(&record).unwrap();

        if let Body::UnconfirmedNew(order) = &mut record.body {
            order.qty = 1234.5;
        }
        let after = encode(&record).unwrap();

        assert_eq!(after.len(), before.len() + 2);
        let body_length = u16::from_le_bytes([after[4], after[5]]) as usize;
        assert_eq!(body_length + RECORD_HEADER_SIZE + 2, after.len());
        let (decoded, _) = decode(&after, 0).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_that_fill_body_is_parsed() {
        let bytes = raw(2, b'1', 1, "17 1700000000000001 300 10.5 0 E-1");
        let (record, _) = decode(&bytes, 0).unwrap();
        assert_eq!(
            record.body,
            Body::Fill {
                order_id: "17".to_string(),
                timestamp: 1_700_000_000_000_001,
                last_qty: 300.0,
                last_price: 10.5,
                trans_type: ExecTransType::New,
                exec_id: "E-1".to_string(),
            }
        );
    }

    #[test]
    fn test_that_risk_rejected_joins_reason() {
        let bytes = raw(3, b'a', 1, "17 not enough   buying power");
        let (record, _) = decode(&bytes, 0).unwrap();
        assert_eq!(
            record.body,
            Body::RiskRejected {
                order_id: "17".to_string(),
                reason: "not enough buying power".to_string(),
            }
        );
        assert_eq!(record.body.timestamp(), None);
    }

    #[test]
    fn test_that_unknown_kind_falls_back_to_generic_body() {
        let mut bytes = raw(1, b'Q', 1, "17 abc whatever comes next");
        bytes.extend(raw(2, b'4', 1, "17 100"));
        let records = decode_all(&bytes).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, EventKind::Unknown(b'Q'));
        assert_eq!(
            records[0].body,
            Body::Generic {
                order_id: "17".to_string(),
                timestamp: "abc".to_string(),
                text: "whatever comes next".to_string(),
            }
        );
        assert_eq!(records[1].kind, EventKind::Canceled);
    }

    #[test]
    fn test_that_unknown_kind_with_binary_body_does_not_fail() {
        let mut bytes = raw(1, b'Q', 1, "xx");
        bytes[RECORD_HEADER_SIZE] = 0xff;
        let (record, _) = decode(&bytes, 0).unwrap();
        assert_eq!(encode(&record).unwrap(), bytes);
    }

    #[test]
    fn test_that_short_header_is_malformed() {
        let bytes = raw(1, b'0', 1, "1 100 B1");
        let err = decode(&bytes[..5], 0).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_that_body_overrun_is_malformed() {
        let bytes = raw(1, b'0', 1, "1 100 B1");
        let err = decode(&bytes[..bytes.len() - 1], 0).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_that_wrong_token_count_is_malformed() {
        let bytes = raw(1, b'0', 1, "1 100");
        assert!(decode(&bytes, 0).unwrap_err().is_malformed());
    }

    #[test]
    fn test_that_bad_side_code_is_malformed() {
        let bytes = raw(1, b'b', 1, "17 100 0 1000 10.5 0 9 2 0 42 3 9");
        assert!(decode(&bytes, 0).unwrap_err().is_malformed());
    }

    #[test]
    fn test_that_decode_reports_offset_of_bad_record() {
        let mut bytes = raw(1, b'0', 1, "1 100 B1");
        let first = bytes.len();
        bytes.extend(raw(2, b'0', 1, "1 100"));
        match decode_all(&bytes).unwrap_err() {
            crate::error::JanusError::MalformedRecord { offset, .. } => assert_eq!(offset, first),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_that_executed_marker_has_two_tokens() {
        let marker = Record::executed(4, 7, "17", "E-1");
        let bytes = encode(&marker).unwrap();
        assert_eq!(bytes[6], b'f');
        assert_eq!(&bytes[RECORD_HEADER_SIZE..bytes.len() - 2], b"17 E-1");
        let (decoded, _) = decode(&bytes, 0).unwrap();
        assert_eq!(decoded, marker);
    }

    #[test]
    fn test_that_decoded_record_encodes_its_original_bytes() {
        let bytes = raw(3, b'0', 1, "A1  0001709312400000000   B-7");
        let (record, _) = decode(&bytes, 0).unwrap();
        assert_eq!(record.body.timestamp(), Some(1_709_312_400_000_000));
        assert_eq!(encode(&record).unwrap(), bytes);
    }

    #[test]
    fn test_that_set_qty_rewrites_only_the_qty_token() {
        let bytes = raw(1, b'b', 1, "A1 1709312400000000 0 100 10.50 0 1 2 0 42 3 9");
        let (mut record, _) = decode(&bytes, 0).unwrap();

        record.set_qty(100.0);
        assert_eq!(encode(&record).unwrap(), bytes);

        record.set_qty(75.0);
        let after = encode(&record).unwrap();
        assert_eq!(
            &after[RECORD_HEADER_SIZE..after.len() - 2],
            b"A1 1709312400000000 0 75 10.50 0 1 2 0 42 3 9"
        );
        let (decoded, _) = decode(&after, 0).unwrap();
        match &decoded.body {
            Body::UnconfirmedNew(order) => {
                assert_eq!(order.qty, 75.0);
                assert_eq!(order.price, 10.5);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_that_edited_body_is_rendered_again() {
        let bytes = raw(1, b'0', 1, "A1 0100 B-7");
        let (mut record, _) = decode(&bytes, 0).unwrap();
        if let Body::New {
            broker_order_id, ..
        } = &mut record.body
        {
            *broker_order_id = "B-8".to_string();
        }
        let after = encode(&record).unwrap();
        assert_eq!(&after[RECORD_HEADER_SIZE..after.len() - 2], b"A1 100 B-8");
    }

    #[test]
    fn test_that_comment_body_is_free_text() {
        let bytes = raw(4, b'#', 1, "ops note: manual check");
        let (record, _) = decode(&bytes, 0).unwrap();
        assert_eq!(record.kind, EventKind::Comment);
        assert_eq!(
            record.body,
            Body::Generic {
                order_id: "ops".to_string(),
                timestamp: "note:".to_string(),
                text: "manual check".to_string(),
            }
        );
        assert_eq!(record.body.timestamp(), None);

        let stopped = raw(5, b'7', 1, "17");
        assert!(decode(&stopped, 0).is_ok());
    }

    #[test]
    fn test_that_submission_keeps_destination_and_trailing_tokens() {
        let bytes = raw(1, b'b', 1, "17 100 0 1000 10.5 0 1 2 0 42 3 9 XNYS");
        let (record, _) = decode(&bytes, 0).unwrap();
        match &record.body {
            Body::UnconfirmedNew(order) => {
                assert_eq!(order.destination.as_deref(), Some("XNYS"));
                assert!(order.extra.is_empty());
            }
            other => panic!("unexpected body {other:?}"),
        }

        let bytes = raw(1, b'b', 1, "17 100 0 1000 10.5 0 1 2 0 42 3 9 XNYS algo=twap 5");
        let (record, _) = decode(&bytes, 0).unwrap();
        match &record.body {
            Body::UnconfirmedNew(order) => {
                assert_eq!(order.destination.as_deref(), Some("XNYS"));
                assert_eq!(order.extra, ["algo=twap", "5"]);
            }
            other => panic!("unexpected body {other:?}"),
        }
        let rendered = record.body.to_string();
        assert_eq!(rendered, "17 100 0 1000 10.5 0 1 2 0 42 3 9 XNYS algo=twap 5");
    }
}
