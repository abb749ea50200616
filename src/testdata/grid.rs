//! Data grid session for one testcase
//!
//! Combines the derived columns with the stored rows, and keeps the active
//! row inside `[1, rows]` through every edit.

use tracing::{debug, info};

use super::columns::{derive_columns, Column};
use super::navigate::{navigate, Direction, GridPos};
use super::rows::{empty_row, normalize_rows, Row, TestData};
use crate::common::{Error, Result};
use crate::model::{ScenarioCatalog, Testcase};
use crate::store::TestDataStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataGrid {
    testcase_id: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    active_row: usize,
}

impl DataGrid {
    /// Build the grid from the current columns and whatever was stored
    ///
    /// With nothing stored the grid starts with one empty row. A stored
    /// active row beyond the row count is clamped to the last row.
    pub fn open(testcase: &Testcase, catalog: &ScenarioCatalog, stored: Option<TestData>) -> Self {
        let columns = derive_columns(testcase, catalog);

        let (rows, active_row) = match stored {
            Some(data) if !data.rows.is_empty() => {
                let rows = normalize_rows(&data.rows, &columns);
                let active = data.active_row.clamp(1, rows.len());
                if active != data.active_row {
                    debug!(
                        testcase = %testcase.testcase_id,
                        stored = data.active_row,
                        active,
                        "stored active row out of range, clamped"
                    );
                }
                (rows, active)
            }
            _ => (vec![empty_row(&columns)], 1),
        };

        Self {
            testcase_id: testcase.testcase_id.clone(),
            columns,
            rows,
            active_row,
        }
    }

    /// Load stored data for `testcase` and open the grid
    pub async fn load(
        testcase: &Testcase,
        catalog: &ScenarioCatalog,
        store: &dyn TestDataStore,
    ) -> Result<Self> {
        let stored = store.load_test_data(&testcase.testcase_id).await?;
        Ok(Self::open(testcase, catalog, stored))
    }

    pub fn testcase_id(&self) -> &str {
        &self.testcase_id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// 1-based index of the row used when the testcase runs
    pub fn active_row(&self) -> usize {
        self.active_row
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by id
    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    /// Append an empty row, returning its 0-based index
    pub fn add_row(&mut self) -> usize {
        self.rows.push(empty_row(&self.columns));
        self.rows.len() - 1
    }

    /// Replace one cell's value
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        let row_count = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or_else(|| Error::invalid_index(row, row_count))?;
        let col_count = cells.len();
        let cell = cells
            .get_mut(col)
            .ok_or_else(|| Error::invalid_index(col, col_count))?;
        cell.value = value.into();
        Ok(())
    }

    /// Remove a row, keeping the active row on the same data where possible
    ///
    /// The last remaining row cannot be removed.
    pub fn remove_row(&mut self, row: usize) -> Result<Row> {
        if row >= self.rows.len() {
            return Err(Error::invalid_index(row, self.rows.len()));
        }
        if self.rows.len() == 1 {
            return Err(Error::InvalidState(
                "a testcase keeps at least one data row".to_string(),
            ));
        }
        let removed = self.rows.remove(row);

        let active_index = self.active_row - 1;
        if row < active_index {
            self.active_row -= 1;
        } else if row == active_index {
            self.active_row = self.active_row.min(self.rows.len());
        }
        Ok(removed)
    }

    /// Choose the row used when the testcase runs (1-based)
    pub fn set_active_row(&mut self, row: usize) -> Result<()> {
        if row == 0 || row > self.rows.len() {
            return Err(Error::InvalidActiveRow {
                row,
                rows: self.rows.len(),
            });
        }
        self.active_row = row;
        Ok(())
    }

    /// Cells of the active row
    pub fn active_cells(&self) -> &[super::rows::Cell] {
        self.rows
            .get(self.active_row - 1)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Where focus moves from `pos` in `direction`
    pub fn navigate(&self, pos: GridPos, direction: Direction) -> GridPos {
        navigate(pos, direction, self.rows.len(), self.columns.len())
    }

    pub fn to_test_data(&self) -> TestData {
        TestData {
            testcase_id: self.testcase_id.clone(),
            rows: self.rows.clone(),
            active_row: self.active_row,
        }
    }

    /// Persist the rows; the grid is unchanged whether or not this succeeds
    pub async fn save(&self, store: &dyn TestDataStore) -> Result<()> {
        store.save_rows(&self.testcase_id, &self.rows).await?;
        info!(testcase = %self.testcase_id, rows = self.rows.len(), "test data saved");
        Ok(())
    }

    /// Persist the active row choice
    pub async fn save_active_row(&self, store: &dyn TestDataStore) -> Result<()> {
        store
            .set_active_row(&self.testcase_id, self.active_row)
            .await?;
        info!(testcase = %self.testcase_id, row = self.active_row, "active row saved");
        Ok(())
    }

    /// Persist rows and active row in one write
    ///
    /// Used after removing a row, where the two must change together.
    pub async fn save_all(&self, store: &dyn TestDataStore) -> Result<()> {
        store.save_test_data(&self.to_test_data()).await?;
        info!(
            testcase = %self.testcase_id,
            rows = self.rows.len(),
            row = self.active_row,
            "test data saved"
        );
        Ok(())
    }
}
