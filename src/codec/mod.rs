//! Confirmation logs are a plain concatenation of records, each one a fixed 9 byte header followed
//! by a whitespace separated text body:
//!
//! ``
//! [sequence: u32][body_length: u16][event_kind: u8][account_id: u16][body][0x00][0x0A]
//! ``
//!
//! Integers are little-endian. The layout of the body depends on the event kind, see [Body].
//! Decoding goes to typed fields and encoding renders them back, so a record can be changed (for
//! example, quantity on a rolled order) without touching serialized bytes.
mod kind;
mod record;

pub use kind::{EventKind, ExecTransType, OrderType, Side, TimeInForce};
pub use record::{
    decode, decode_all, encode, records, Body, NewOrder, Record, Records, RECORD_HEADER_SIZE,
    RECORD_TRAILER_SIZE,
};
