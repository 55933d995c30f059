//! netmelt: flatten vendor CM/PM XML exports into per-object CSV tables
//!
//! Usage:
//!   # One Nokia configuration snapshot into ./out
//!   netmelt --vendor nokia --type cm --path_to_file export.xml --path_to_directory ./out
//!
//!   # Gzipped Ericsson measurements, more logging
//!   netmelt --vendor ericsson --type pm --path_to_file A20230620.xml.gz --path_to_directory ./out -v

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use netmelt::{convert_file, ExportKind, Vendor};

#[derive(Parser, Debug)]
#[command(name = "netmelt")]
#[command(about = "Flatten vendor CM/PM XML exports into per-object CSV tables", long_about = None)]
struct Args {
    /// Equipment vendor that produced the export
    #[arg(long, value_enum)]
    vendor: Vendor,

    /// Export type: configuration (cm) or performance measurements (pm)
    #[arg(long = "type", value_enum)]
    kind: ExportKind,

    /// Input XML file, decompressed on the fly when the name ends in .gz
    #[arg(long = "path_to_file")]
    path_to_file: PathBuf,

    /// Output directory, one CSV per discovered object type
    #[arg(long = "path_to_directory")]
    path_to_directory: PathBuf,

    /// Verbose logging (repeat for debug output)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let summary = convert_file(
        args.vendor,
        args.kind,
        &args.path_to_file,
        &args.path_to_directory,
    )
    .with_context(|| format!("converting {}", args.path_to_file.display()))?;

    info!(
        "{} rows across {} tables",
        summary.total_rows(),
        summary.rows_written.len()
    );
    if summary.stats.unroutable > 0 {
        warn!(
            "{} records had no routable object type and were skipped",
            summary.stats.unroutable
        );
    }
    if summary.stats.depth_dropped > 0 {
        warn!(
            "{} values nested beyond the flattening limit were dropped",
            summary.stats.depth_dropped
        );
    }

    Ok(())
}
