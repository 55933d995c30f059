use std::collections::BTreeMap;

/// One configuration object instance, keyed by its managed-object class
///
/// Field names are not guaranteed unique here; the sink deduplicates by key
/// (last occurrence wins) immediately before serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRecord {
    pub object_class: String,
    pub fields: Vec<(String, String)>,
}

impl ConfigRecord {
    pub fn new(object_class: impl Into<String>) -> Self {
        ConfigRecord {
            object_class: object_class.into(),
            fields: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }
}

/// One granularity period's worth of measurements for one file section
///
/// Timing metadata is shared by every row derived from the block. Absent
/// values stay `None` and simply never become columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementBlock {
    pub begin_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub rep_period: Option<String>,

    /// Short type code -> human-readable counter name, scoped to this block
    pub meas_types: Vec<(String, String)>,

    pub objects: Vec<MeasuredObject>,
}

/// One measured object inside a block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasuredObject {
    /// Output table this object's rows are routed to
    pub table: String,

    /// Identifying columns (decomposed distinguished name, or a single
    /// joined column for vendors that report the DN opaquely)
    pub keys: Vec<(String, String)>,

    /// (type code, raw value) pairs; a raw value may be a comma-separated
    /// list that expands into multiple indexed rows
    pub results: Vec<(String, String)>,
}

/// The unit the record sink consumes: a target table plus key/value fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
    pub table: String,
    pub fields: Vec<(String, String)>,
}

impl FlatRow {
    pub fn new(table: impl Into<String>) -> Self {
        FlatRow {
            table: table.into(),
            fields: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }
}

/// Counters for records and values the flatteners had to drop
///
/// The original converters discarded these silently; here they are carried
/// up to the caller and reported after every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenStats {
    /// Records with no discoverable object class or routing table
    pub unroutable: u64,

    /// Values nested beyond the flattening depth limit
    pub depth_dropped: u64,
}

impl FlattenStats {
    pub fn merge(&mut self, other: FlattenStats) {
        self.unroutable += other.unroutable;
        self.depth_dropped += other.depth_dropped;
    }
}

/// What one conversion run produced
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Rows appended per output table
    pub rows_written: BTreeMap<String, u64>,
    pub stats: FlattenStats,
}

impl RunSummary {
    pub fn total_rows(&self) -> u64 {
        self.rows_written.values().sum()
    }
}
