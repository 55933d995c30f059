use std::collections::BTreeSet;

use crate::flatten::FlatRow;

/// Column ordering for the non-leading part of a header
///
/// Which direction a vendor's tables sort in is historical accident; only
/// reproducibility matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrder {
    Ascending,
    Descending,
}

/// Computes the ordered column set for one table's batch of rows
#[derive(Debug, Clone)]
pub struct FieldSetResolver {
    leading: Vec<String>,
    order: FieldOrder,
    exclude: Option<String>,
}

impl FieldSetResolver {
    pub fn new(order: FieldOrder) -> Self {
        FieldSetResolver {
            leading: Vec::new(),
            order,
            exclude: None,
        }
    }

    /// Columns pinned to the front of every header, e.g. provenance
    pub fn with_leading(mut self, columns: &[&str]) -> Self {
        self.leading = columns.iter().map(|column| column.to_string()).collect();
        self
    }

    /// Drop a discriminator column that merely duplicates the table name
    pub fn with_excluded(mut self, column: &str) -> Self {
        self.exclude = Some(column.to_string());
        self
    }

    /// Union of all column keys in the batch, ordered per policy
    pub fn resolve(&self, rows: &[FlatRow]) -> Vec<String> {
        let mut observed = BTreeSet::new();
        for row in rows {
            for (key, _) in &row.fields {
                if self.leading.iter().any(|leading| leading == key) {
                    continue;
                }
                if self.exclude.as_deref() == Some(key.as_str()) {
                    continue;
                }
                observed.insert(key.clone());
            }
        }

        let mut tail: Vec<String> = observed.into_iter().collect();
        if self.order == FieldOrder::Descending {
            tail.reverse();
        }

        let mut fieldset = self.leading.clone();
        fieldset.extend(tail);
        fieldset
    }
}
