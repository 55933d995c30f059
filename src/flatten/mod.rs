//! Record flattening - turn vendor XML trees into flat key/value rows
//!
//! Two strategies cover the three vendors: [`cm`] walks configuration
//! object trees into per-class [`ConfigRecord`] batches, and [`pm`] reduces
//! periodic measurement documents to [`MeasurementBlock`]s and expands them
//! into one row per (counter, index) combination. Everything stays a string
//! end to end; downstream consumers own typed parsing.

pub mod cm;
pub mod pm;
pub mod types;

pub use cm::{flatten_bulk_vs_data, flatten_class_tree};
pub use pm::{expand, MeasurementSource};
pub use types::{
    ConfigRecord, FlatRow, FlattenStats, MeasuredObject, MeasurementBlock, RunSummary,
};
