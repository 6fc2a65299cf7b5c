use std::env;
use std::fs;
use std::io::{self, BufWriter, Write};

use anyhow::{bail, Result};
use janus::codec::{records, Body, Record};
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Serialize)]
struct RecordView<'a> {
    sequence: u32,
    kind: String,
    account_id: u16,
    order_id: &'a str,
    time: Option<String>,
    body: &'a Body,
}

impl<'a> From<&'a Record> for RecordView<'a> {
    fn from(value: &'a Record) -> Self {
        let time = value
            .body
            .timestamp()
            .and_then(|micros| {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000).ok()
            })
            .map(|at| at.to_string());

        Self {
            sequence: value.sequence,
            kind: value.kind.to_string(),
            account_id: value.account_id,
            order_id: value.order_id(),
            time,
            body: &value.body,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        bail!("usage: parse_confirmation <source>");
    }

    let contents = fs::read(&args[1])?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for record in records(&contents) {
        let record = record?;
        serde_json::to_writer(&mut out, &RecordView::from(&record))?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
