//! Rows and their normalization against the current columns

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::columns::Column;

/// One value in a row, keyed by column id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: String,
    #[serde(default)]
    pub element: String,
    #[serde(default)]
    pub value: String,
}

/// Cells in column order
pub type Row = Vec<Cell>;

/// Stored test data for one testcase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestData {
    pub testcase_id: String,
    #[serde(default)]
    pub rows: Vec<Row>,
    /// 1-based index of the row used when the testcase runs
    #[serde(alias = "row_used", default = "default_active_row")]
    pub active_row: usize,
}

fn default_active_row() -> usize {
    1
}

impl TestData {
    pub fn new(testcase_id: impl Into<String>) -> Self {
        Self {
            testcase_id: testcase_id.into(),
            rows: Vec::new(),
            active_row: default_active_row(),
        }
    }
}

/// A row with an empty cell for every column
pub fn empty_row(columns: &[Column]) -> Row {
    columns
        .iter()
        .map(|col| Cell {
            id: col.id.clone(),
            element: col.element.clone(),
            value: String::new(),
        })
        .collect()
}

/// Reconcile one stored row with the current columns
///
/// Values are carried over by column id; cells for columns that no longer
/// exist are dropped and new columns start empty.
pub fn normalize_row(stored: &[Cell], columns: &[Column]) -> Row {
    // first cell wins when a stored row repeats an id
    let mut values: HashMap<&str, &str> = HashMap::with_capacity(stored.len());
    for c in stored {
        values.entry(c.id.as_str()).or_insert(c.value.as_str());
    }

    let dropped = stored
        .iter()
        .filter(|c| !columns.iter().any(|col| col.id == c.id))
        .count();
    if dropped > 0 {
        debug!(dropped, "dropping cells for columns no longer derived");
    }

    columns
        .iter()
        .map(|col| Cell {
            id: col.id.clone(),
            element: col.element.clone(),
            value: values
                .get(col.id.as_str())
                .map(|v| v.to_string())
                .unwrap_or_default(),
        })
        .collect()
}

/// Reconcile every stored row with the current columns
pub fn normalize_rows(stored: &[Row], columns: &[Column]) -> Vec<Row> {
    stored.iter().map(|row| normalize_row(row, columns)).collect()
}
