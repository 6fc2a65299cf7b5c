//! # What is Janus?
//!
//! Janus carries working orders from one trading session into the next. During a session the
//! order-management engine appends every order lifecycle event to a binary confirmation log. At
//! the end of the session most of those orders are done: filled, cancelled, rejected, expired. The
//! few that are not have to be handed to the next session, and the engine does that by replaying
//! a fresh log at startup. Janus produces that log.
//!
//! # Implementation
//!
//! A rollover is composed of:
//! - The [codec](crate::codec), which reads and writes single records of the confirmation log.
//! Bodies are decoded into a typed [Body](crate::codec::Body) per family of event kinds.
//! - The [ledger](crate::ledger), a replay state machine tracking outstanding quantity and fills
//! seen for every order.
//! - The [compactor](crate::rollover::Compactor), which drives the codec and ledger over a whole
//! log and writes the surviving records, resequenced, with quantities patched and markers for
//! fills that have already happened.
//!
//! Nothing is shared between rollovers: one invocation owns its ledger and candidate records and
//! drops them when it returns, so distinct logs can be rolled concurrently. Rolling the same
//! destination twice is safe only because the second run finds the destination and does nothing.
//!
//! ``
//! cargo run --bin roll_confirmation [source] [destination]
//! cargo run --bin parse_confirmation [source]
//! ``
//!
//! Logging goes through `log`, binaries initialise `env_logger` so `RUST_LOG=info` shows skipped
//! rolls, dropped stale orders and the number of orders rolled.
pub mod codec;
pub mod config;
pub mod error;
pub mod ledger;
pub mod rollover;
pub mod testing;

pub use config::RolloverConfig;
pub use error::{JanusError, Result};
pub use rollover::{roll_file, Compactor, RollOutcome, Rollover, RolloverReport};
