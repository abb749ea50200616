//! Test data binding
//!
//! Derives the data columns of a testcase from its scenarios and reconciles
//! stored rows against them.

mod columns;
mod grid;
mod navigate;
mod rows;

pub use columns::{column_id, derive_columns, Column};
pub use grid::DataGrid;
pub use navigate::{navigate, Direction, GridPos};
pub use rows::{empty_row, normalize_row, normalize_rows, Cell, Row, TestData};
