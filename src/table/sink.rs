use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{ConvertError, Result};
use crate::flatten::FlatRow;

/// Where resolved rows go: one table per object/measurement type
///
/// `ensure_table` is idempotent and must be called with the resolved field
/// set before rows are appended; it returns the field set actually in
/// effect, which differs from the requested one when the table already
/// existed on disk. `append` serializes one row in effective field order,
/// leaving declared-but-absent fields blank and silently omitting fields
/// the table does not declare.
pub trait RecordSink {
    fn ensure_table(&mut self, table: &str, fieldset: &[String]) -> Result<Vec<String>>;
    fn append(&mut self, table: &str, row: &FlatRow, fieldset: &[String]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

/// Append-only CSV files, one `<dir>/<table>.csv` per table id
///
/// A table that already exists keeps its historical header: no new header
/// is written and columns unknown to that header are dropped from this
/// run's rows. Existing tables are never truncated.
pub struct CsvTableSink {
    dir: PathBuf,
    writers: HashMap<String, csv::Writer<File>>,
    fieldsets: HashMap<String, Vec<String>>,
}

impl CsvTableSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|err| write_failure(&dir, csv::Error::from(err)))?;
        Ok(CsvTableSink {
            dir,
            writers: HashMap::new(),
            fieldsets: HashMap::new(),
        })
    }
}

impl RecordSink for CsvTableSink {
    fn ensure_table(&mut self, table: &str, fieldset: &[String]) -> Result<Vec<String>> {
        if let Some(effective) = self.fieldsets.get(table) {
            return Ok(effective.clone());
        }

        let path = table_path(&self.dir, table);
        let existing_header = if path.exists() {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .from_path(&path)
                .map_err(|err| write_failure(&path, err))?;
            let header = reader
                .headers()
                .map_err(|err| write_failure(&path, err))?
                .iter()
                .map(str::to_owned)
                .collect::<Vec<_>>();
            Some(header)
        } else {
            None
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| write_failure(&path, csv::Error::from(err)))?;
        let mut writer = csv::Writer::from_writer(file);

        let effective = match existing_header {
            Some(header) => {
                debug!("{} exists, keeping its header", path.display());
                header
            }
            None => {
                writer
                    .write_record(fieldset)
                    .map_err(|err| write_failure(&path, err))?;
                fieldset.to_vec()
            }
        };

        self.writers.insert(table.to_owned(), writer);
        self.fieldsets.insert(table.to_owned(), effective.clone());
        Ok(effective)
    }

    fn append(&mut self, table: &str, row: &FlatRow, fieldset: &[String]) -> Result<()> {
        let effective = self.ensure_table(table, fieldset)?;

        // Deduplicate by key; the last occurrence wins.
        let mut values: HashMap<&str, &str> = HashMap::new();
        for (key, value) in &row.fields {
            values.insert(key.as_str(), value.as_str());
        }

        let record: Vec<String> = effective
            .iter()
            .map(|column| {
                values
                    .get(column.as_str())
                    .map(|value| normalize(value))
                    .unwrap_or_default()
            })
            .collect();

        let path = table_path(&self.dir, table);
        if let Some(writer) = self.writers.get_mut(table) {
            writer
                .write_record(&record)
                .map_err(|err| write_failure(&path, err))?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for (table, writer) in &mut self.writers {
            let path = table_path(&self.dir, table);
            writer
                .flush()
                .map_err(|err| write_failure(&path, csv::Error::from(err)))?;
        }
        Ok(())
    }
}

fn table_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}.csv"))
}

fn write_failure(path: &Path, source: csv::Error) -> ConvertError {
    ConvertError::OutputWriteFailure {
        path: path.to_path_buf(),
        source,
    }
}

/// The one place whitespace is normalized: embedded line breaks removed,
/// then leading/trailing whitespace trimmed, just before the value is
/// written.
fn normalize(value: &str) -> String {
    let flat: String = value
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();
    flat.trim().to_owned()
}
