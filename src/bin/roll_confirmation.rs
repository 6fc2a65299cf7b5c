use std::env;
use std::path::Path;

use anyhow::{bail, Result};
use env_logger::Env;
use janus::{roll_file, RollOutcome, RolloverConfig};
use log::info;
use time::OffsetDateTime;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        bail!("usage: roll_confirmation <source> <destination>");
    }
    let source = Path::new(&args[1]);
    let destination = Path::new(&args[2]);

    let outcome = roll_file(
        source,
        destination,
        OffsetDateTime::now_utc(),
        RolloverConfig::default(),
    )?;

    if let RollOutcome::Rolled(report) = outcome {
        info!(
            "read {} records, wrote {} ({} executed markers), {} unknown references",
            report.records_read,
            report.records_written,
            report.markers_written,
            report.unknown_references
        );
    }
    Ok(())
}
