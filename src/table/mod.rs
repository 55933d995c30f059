//! Table output - field-set resolution and append-only CSV sinks
//!
//! Column sets vary row to row within one table, so the header is computed
//! from a whole batch before anything is written: [`FieldSetResolver`]
//! produces the ordered column set, [`RecordSink`] routes rows to their
//! tables and owns the header-once / append-only file discipline.

pub mod fieldset;
pub mod sink;

pub use fieldset::{FieldOrder, FieldSetResolver};
pub use sink::{CsvTableSink, RecordSink};
