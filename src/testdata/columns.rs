//! Column derivation
//!
//! Columns are never stored. They are recomputed from the testcase's
//! scenario references and each scenario's flow, and every step that needs
//! a value yields one column keyed by `{scenario_id}_{step_index}`.

use serde::Serialize;
use tracing::debug;

use crate::model::{ScenarioCatalog, Testcase};

/// A data-bearing slot in the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Stable key: `{scenario_id}_{step_index}`
    pub id: String,
    /// Element the step targets, used as the column header
    pub element: String,
    pub scenario_id: String,
    pub step_index: usize,
}

/// Build the column id for a step occurrence
pub fn column_id(scenario_id: &str, step_index: usize) -> String {
    format!("{}_{}", scenario_id, step_index)
}

/// Derive the ordered columns for a testcase
///
/// Order is scenario order, then flow order. Scenario references that do
/// not resolve contribute nothing.
pub fn derive_columns(testcase: &Testcase, catalog: &ScenarioCatalog) -> Vec<Column> {
    let mut columns = Vec::new();

    for scenario_id in &testcase.scenarios {
        let Some(scenario) = catalog.resolve(scenario_id) else {
            debug!(
                testcase = %testcase.testcase_id,
                scenario = %scenario_id,
                "skipping unresolved scenario reference"
            );
            continue;
        };

        for (index, step) in scenario.flow.iter().enumerate() {
            if !step.needs_value() {
                continue;
            }
            let Some(element) = step.element() else {
                continue;
            };
            columns.push(Column {
                id: column_id(scenario_id, index),
                element: element.as_str().to_string(),
                scenario_id: scenario_id.clone(),
                step_index: index,
            });
        }
    }

    columns
}
