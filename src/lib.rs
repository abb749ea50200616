//! Autotest - scenario authoring and test data binding for UI test automation
//!
//! Scenarios are ordered flows of steps against named page elements.
//! Testcases compose scenarios, and every step that takes data becomes a
//! column of the testcase's data grid.

pub mod cli;
pub mod commands;
pub mod common;
pub mod editor;
pub mod model;
pub mod pages;
pub mod run;
pub mod step;
pub mod store;
pub mod testdata;

// Re-export commonly used types for tests
pub use common::{Error, Result, ValidationError};
pub use model::{Scenario, Testcase};
pub use step::Step;
