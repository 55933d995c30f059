//! # netmelt - vendor CM/PM export flattening
//!
//! Converts vendor-specific telecom network exports (configuration
//! snapshots and performance measurements, as XML, optionally gzipped)
//! into flat per-object-type CSV tables ready for analytics ingestion.
//!
//! ## Modules
//!
//! - **source**: gzip-transparent XML loading into [`source::RawNode`] trees
//! - **flatten**: the CM tree walkers and the PM measurement expander
//! - **table**: field-set resolution and append-only CSV sinks
//! - **vendor**: one adapter per supported vendor/export-kind pair
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use netmelt::{convert_file, ExportKind, Vendor};
//!
//! # fn main() -> Result<(), netmelt::ConvertError> {
//! let summary = convert_file(
//!     Vendor::Nokia,
//!     ExportKind::Cm,
//!     Path::new("export.xml.gz"),
//!     Path::new("out"),
//! )?;
//!
//! for (table, rows) in &summary.rows_written {
//!     println!("{table}.csv: {rows} rows");
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod flatten;
pub mod source;
pub mod table;
pub mod vendor;

// Re-export commonly used types for convenience
pub use error::ConvertError;
pub use flatten::{FlatRow, FlattenStats, RunSummary};
pub use table::{CsvTableSink, FieldOrder, FieldSetResolver, RecordSink};
pub use vendor::{convert_file, ExportKind, Vendor};
