pub mod columns;
pub mod loader;
pub mod record;

pub use columns::{normalize_header, resolve, ColumnMap, Field, ResolvedColumn, FINAL_SCORE_HEADER};
pub use loader::{load_table, read_table, LoadOptions};
pub use record::{Metric, VehicleRecord};

/// An immutable, column-resolved vehicle table.
///
/// Filtering produces a new `Table` that shares the schema of its parent,
/// so column resolution never has to be repeated on a working set.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    columns: ColumnMap,
    rows: Vec<VehicleRecord>,
}

impl Table {
    pub fn new(headers: Vec<String>, columns: ColumnMap, rows: Vec<VehicleRecord>) -> Self {
        Self {
            headers,
            columns,
            rows,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn rows(&self) -> &[VehicleRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Same schema, different rows
    pub fn with_rows(&self, rows: Vec<VehicleRecord>) -> Table {
        Table {
            headers: self.headers.clone(),
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Keep rows matching `keep`, preserving order
    pub fn retain<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&VehicleRecord) -> bool,
    {
        self.with_rows(self.rows.iter().filter(|r| keep(r)).cloned().collect())
    }
}
