//! In-process store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::records;
use super::{GroupStore, PageCatalog, ScenarioStore, TestDataStore, TestcaseStore};
use crate::common::Result;
use crate::model::{Group, RecordId, Scenario, ScenarioRecord, Testcase};
use crate::pages::{Page, PageRecord};
use crate::testdata::{Row, TestData};

#[derive(Debug, Default)]
struct State {
    pages: Vec<PageRecord>,
    scenarios: Vec<ScenarioRecord>,
    testcases: Vec<Testcase>,
    groups: Vec<Group>,
    test_data: HashMap<String, TestData>,
}

/// Store that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageCatalog for MemoryStore {
    async fn get_page(&self, name: &str) -> Result<Option<Page>> {
        let state = self.state.lock().await;
        Ok(state
            .pages
            .iter()
            .find(|r| r.page.page == name)
            .map(|r| r.page.clone()))
    }

    async fn list_pages(&self) -> Result<Vec<PageRecord>> {
        Ok(self.state.lock().await.pages.clone())
    }

    async fn create_page(&self, page: &Page) -> Result<RecordId> {
        records::insert_page(&mut self.state.lock().await.pages, page)
    }

    async fn update_page(&self, id: RecordId, page: &Page) -> Result<()> {
        records::replace_page(&mut self.state.lock().await.pages, id, page)
    }
}

#[async_trait]
impl ScenarioStore for MemoryStore {
    async fn create_scenario(&self, scenario: &Scenario) -> Result<RecordId> {
        records::insert_scenario(&mut self.state.lock().await.scenarios, scenario)
    }

    async fn update_scenario(&self, id: RecordId, scenario: &Scenario) -> Result<()> {
        records::replace_scenario(&mut self.state.lock().await.scenarios, id, scenario)
    }

    async fn list_scenarios(&self) -> Result<Vec<ScenarioRecord>> {
        Ok(self.state.lock().await.scenarios.clone())
    }
}

#[async_trait]
impl TestcaseStore for MemoryStore {
    async fn create_testcase(&self, testcase: &Testcase) -> Result<()> {
        records::insert_testcase(&mut self.state.lock().await.testcases, testcase)
    }

    async fn list_testcases(&self) -> Result<Vec<Testcase>> {
        Ok(self.state.lock().await.testcases.clone())
    }
}

#[async_trait]
impl TestDataStore for MemoryStore {
    async fn load_test_data(&self, testcase_id: &str) -> Result<Option<TestData>> {
        Ok(self.state.lock().await.test_data.get(testcase_id).cloned())
    }

    async fn save_rows(&self, testcase_id: &str, rows: &[Row]) -> Result<()> {
        let mut state = self.state.lock().await;
        let existing = state.test_data.remove(testcase_id);
        let data = records::with_rows(existing, testcase_id, rows);
        state.test_data.insert(testcase_id.to_string(), data);
        Ok(())
    }

    async fn set_active_row(&self, testcase_id: &str, row: usize) -> Result<()> {
        let mut state = self.state.lock().await;
        let existing = state.test_data.remove(testcase_id);
        let data = records::with_active_row(existing, testcase_id, row);
        state.test_data.insert(testcase_id.to_string(), data);
        Ok(())
    }

    async fn save_test_data(&self, data: &TestData) -> Result<()> {
        self.state
            .lock()
            .await
            .test_data
            .insert(data.testcase_id.clone(), data.clone());
        Ok(())
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn create_group(&self, name: &str, description: &str) -> Result<RecordId> {
        records::insert_group(&mut self.state.lock().await.groups, name, description)
    }

    async fn add_testcases(&self, group_id: RecordId, testcase_ids: &[String]) -> Result<usize> {
        records::add_group_testcases(&mut self.state.lock().await.groups, group_id, testcase_ids)
    }

    async fn remove_testcase(&self, group_id: RecordId, testcase_id: &str) -> Result<bool> {
        records::remove_group_testcase(&mut self.state.lock().await.groups, group_id, testcase_id)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.state.lock().await.groups.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::step::ActionKey;
    use crate::pages::Element;

    #[tokio::test]
    async fn test_scenario_create_update_list() {
        let store = MemoryStore::new();
        let id = store
            .create_scenario(&Scenario::new("S1", "Login", vec![]))
            .await
            .unwrap();
        store
            .update_scenario(id, &Scenario::new("S1", "Login v2", vec![]))
            .await
            .unwrap();

        let list = store.list_scenarios().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].scenario.name, "Login v2");
    }

    #[tokio::test]
    async fn test_duplicate_page_conflicts() {
        let store = MemoryStore::new();
        let page = Page {
            page: "Login".into(),
            elements: vec![Element::new("submit", ActionKey::Click)],
        };
        store.create_page(&page).await.unwrap();
        let err = store.create_page(&page).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { kind: "Page", .. }));
        assert!(store.get_page("Login").await.unwrap().is_some());
        assert!(store.get_page("Signup").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rows_and_active_row_are_independent() {
        let store = MemoryStore::new();
        store.set_active_row("T1", 2).await.unwrap();
        store.save_rows("T1", &[vec![], vec![]]).await.unwrap();

        let data = store.load_test_data("T1").await.unwrap().unwrap();
        assert_eq!(data.active_row, 2);
        assert_eq!(data.rows.len(), 2);
        assert!(store.load_test_data("T2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_test_data_replaces_both_fields() {
        let store = MemoryStore::new();
        store.save_rows("T1", &[vec![], vec![], vec![]]).await.unwrap();
        store.set_active_row("T1", 3).await.unwrap();

        let mut data = TestData::new("T1");
        data.rows = vec![vec![]];
        data.active_row = 1;
        store.save_test_data(&data).await.unwrap();
        assert_eq!(store.load_test_data("T1").await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn test_groups_create_add_remove() {
        let store = MemoryStore::new();
        let id = store.create_group("Smoke", "fast").await.unwrap();
        let err = store.create_group("Smoke", "other").await.unwrap_err();
        assert!(matches!(err, Error::Conflict { kind: "Group", .. }));

        let added = store
            .add_testcases(id, &["T1".to_string(), "T2".to_string()])
            .await
            .unwrap();
        assert_eq!(added, 2);
        assert!(store.remove_testcase(id, "T2").await.unwrap());

        let groups = store.list_groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].testcase_ids, vec!["T1"]);
    }
}
