//! Persistence collaborators
//!
//! The engine never talks to a database directly. It goes through these
//! traits, which any key-value or row store can implement. Two
//! implementations ship with the crate: [`MemoryStore`] for embedding and
//! tests, and [`FileStore`], which keeps JSON documents in a workspace
//! directory.

mod file;
mod memory;
mod records;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::common::Result;
use crate::model::{Group, RecordId, ScenarioCatalog, ScenarioRecord, Scenario, Testcase};
use crate::pages::{Page, PageRecord};
use crate::testdata::{Row, TestData};

/// Read access to page definitions, plus page authoring
#[async_trait]
pub trait PageCatalog: Send + Sync {
    /// Look up a page by name
    async fn get_page(&self, name: &str) -> Result<Option<Page>>;

    async fn list_pages(&self) -> Result<Vec<PageRecord>>;

    /// Fails with `Conflict` if a page with the same name exists
    async fn create_page(&self, page: &Page) -> Result<RecordId>;

    async fn update_page(&self, id: RecordId, page: &Page) -> Result<()>;
}

#[async_trait]
pub trait ScenarioStore: Send + Sync {
    /// Fails with `Conflict` if `scenario_id` already exists
    async fn create_scenario(&self, scenario: &Scenario) -> Result<RecordId>;

    /// Replace the scenario stored under `id`, flow included
    async fn update_scenario(&self, id: RecordId, scenario: &Scenario) -> Result<()>;

    async fn list_scenarios(&self) -> Result<Vec<ScenarioRecord>>;
}

#[async_trait]
pub trait TestcaseStore: Send + Sync {
    /// Fails with `Conflict` if `testcase_id` already exists
    async fn create_testcase(&self, testcase: &Testcase) -> Result<()>;

    async fn list_testcases(&self) -> Result<Vec<Testcase>>;
}

#[async_trait]
pub trait TestDataStore: Send + Sync {
    async fn load_test_data(&self, testcase_id: &str) -> Result<Option<TestData>>;

    /// Replace the stored rows, keeping the stored active row
    async fn save_rows(&self, testcase_id: &str, rows: &[Row]) -> Result<()>;

    async fn set_active_row(&self, testcase_id: &str, row: usize) -> Result<()>;

    /// Replace rows and active row together in a single write
    async fn save_test_data(&self, data: &TestData) -> Result<()>;
}

/// Named collections of testcases, selectable as a run target
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Fails with `Conflict` if a group with the same name exists
    async fn create_group(&self, name: &str, description: &str) -> Result<RecordId>;

    /// Append testcases not already in the group; returns how many were added
    async fn add_testcases(&self, group_id: RecordId, testcase_ids: &[String]) -> Result<usize>;

    /// Returns false if the testcase was not in the group
    async fn remove_testcase(&self, group_id: RecordId, testcase_id: &str) -> Result<bool>;

    async fn list_groups(&self) -> Result<Vec<Group>>;
}

/// Load every scenario into an id-indexed catalog
pub async fn load_catalog(store: &dyn ScenarioStore) -> Result<ScenarioCatalog> {
    Ok(store.list_scenarios().await?.into_iter().collect())
}

/// Find a scenario record by its `scenario_id`
pub async fn find_scenario(store: &dyn ScenarioStore, scenario_id: &str) -> Result<ScenarioRecord> {
    store
        .list_scenarios()
        .await?
        .into_iter()
        .find(|r| r.scenario.scenario_id == scenario_id)
        .ok_or_else(|| crate::common::Error::not_found("Scenario", scenario_id))
}

/// Find a testcase by its `testcase_id`
pub async fn find_testcase(store: &dyn TestcaseStore, testcase_id: &str) -> Result<Testcase> {
    store
        .list_testcases()
        .await?
        .into_iter()
        .find(|t| t.testcase_id == testcase_id)
        .ok_or_else(|| crate::common::Error::not_found("Testcase", testcase_id))
}

/// Find a group by its id
pub async fn find_group(store: &dyn GroupStore, group_id: RecordId) -> Result<Group> {
    store
        .list_groups()
        .await?
        .into_iter()
        .find(|g| g.group_id == group_id)
        .ok_or_else(|| crate::common::Error::not_found("Group", &group_id.to_string()))
}
