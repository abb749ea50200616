//! JSON file store
//!
//! Layout under the workspace directory:
//! - `pages.json`: array of page records
//! - `scenarios.json`: array of scenario records
//! - `testcases.json`: array of testcases
//! - `groups.json`: array of testcase groups
//! - `testdata/<stem>.json`: stored rows and active row, with the stem
//!   escaped from the testcase id by [`file_stem_for`]
//!
//! Every update is a read-modify-write of one document, serialized by an
//! async mutex. Documents are written to a temporary file and renamed into
//! place, so a failed write leaves the previous document intact.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::records;
use super::{GroupStore, PageCatalog, ScenarioStore, TestDataStore, TestcaseStore};
use crate::common::paths::file_stem_for;
use crate::common::{Error, Result};
use crate::model::{Group, RecordId, Scenario, ScenarioRecord, Testcase};
use crate::pages::{Page, PageRecord};
use crate::testdata::{Row, TestData};

const PAGES_FILE: &str = "pages.json";
const SCENARIOS_FILE: &str = "scenarios.json";
const TESTCASES_FILE: &str = "testcases.json";
const GROUPS_FILE: &str = "groups.json";
const TEST_DATA_DIR: &str = "testdata";

/// Store backed by JSON documents in a directory
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open a workspace, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(dir.join(TEST_DATA_DIR)).await?;
        debug!(dir = %dir.display(), "opened workspace");
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn test_data_path(&self, testcase_id: &str) -> PathBuf {
        self.dir
            .join(TEST_DATA_DIR)
            .join(format!("{}.json", file_stem_for(testcase_id)))
    }

    async fn read_json<T: DeserializeOwned + Send>(&self, path: &Path) -> Result<Option<T>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::FileRead {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::FileRead {
                path: path.display().to_string(),
                error: e.to_string(),
            })
    }

    async fn read_list<T: DeserializeOwned + Send>(&self, name: &str) -> Result<Vec<T>> {
        Ok(self.read_json(&self.dir.join(name)).await?.unwrap_or_default())
    }

    async fn write_json<T: Serialize + Sync + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Read a list document, apply `update`, and write it back on success
    async fn update_list<T, R, F>(&self, name: &str, update: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        R: Send,
        F: FnOnce(&mut Vec<T>) -> Result<R> + Send,
    {
        let _guard = self.lock.lock().await;
        let mut items: Vec<T> = self.read_list(name).await?;
        let result = update(&mut items)?;
        self.write_json(&self.dir.join(name), &items).await?;
        Ok(result)
    }

    /// Stored test data of `testcase_id`, ignoring a document written for another id
    async fn read_test_data(&self, testcase_id: &str) -> Result<Option<TestData>> {
        let data: Option<TestData> = self.read_json(&self.test_data_path(testcase_id)).await?;
        Ok(data.filter(|d| d.testcase_id == testcase_id))
    }

    async fn update_test_data<F>(&self, testcase_id: &str, update: F) -> Result<()>
    where
        F: FnOnce(Option<TestData>) -> TestData + Send,
    {
        let _guard = self.lock.lock().await;
        let existing = self.read_test_data(testcase_id).await?;
        self.write_json(&self.test_data_path(testcase_id), &update(existing))
            .await
    }
}

#[async_trait]
impl PageCatalog for FileStore {
    async fn get_page(&self, name: &str) -> Result<Option<Page>> {
        let pages: Vec<PageRecord> = self.read_list(PAGES_FILE).await?;
        Ok(pages.into_iter().find(|r| r.page.page == name).map(|r| r.page))
    }

    async fn list_pages(&self) -> Result<Vec<PageRecord>> {
        self.read_list(PAGES_FILE).await
    }

    async fn create_page(&self, page: &Page) -> Result<RecordId> {
        let id = self
            .update_list(PAGES_FILE, |pages: &mut Vec<PageRecord>| records::insert_page(pages, page))
            .await?;
        info!(page = %page.page, %id, "page created");
        Ok(id)
    }

    async fn update_page(&self, id: RecordId, page: &Page) -> Result<()> {
        self.update_list(PAGES_FILE, |pages: &mut Vec<PageRecord>| {
            records::replace_page(pages, id, page)
        })
        .await
    }
}

#[async_trait]
impl ScenarioStore for FileStore {
    async fn create_scenario(&self, scenario: &Scenario) -> Result<RecordId> {
        let id = self
            .update_list(SCENARIOS_FILE, |list: &mut Vec<ScenarioRecord>| {
                records::insert_scenario(list, scenario)
            })
            .await?;
        info!(scenario = %scenario.scenario_id, %id, "scenario created");
        Ok(id)
    }

    async fn update_scenario(&self, id: RecordId, scenario: &Scenario) -> Result<()> {
        self.update_list(SCENARIOS_FILE, |list: &mut Vec<ScenarioRecord>| {
            records::replace_scenario(list, id, scenario)
        })
        .await?;
        info!(scenario = %scenario.scenario_id, %id, "scenario updated");
        Ok(())
    }

    async fn list_scenarios(&self) -> Result<Vec<ScenarioRecord>> {
        self.read_list(SCENARIOS_FILE).await
    }
}

#[async_trait]
impl TestcaseStore for FileStore {
    async fn create_testcase(&self, testcase: &Testcase) -> Result<()> {
        self.update_list(TESTCASES_FILE, |list: &mut Vec<Testcase>| {
            records::insert_testcase(list, testcase)
        })
        .await?;
        info!(testcase = %testcase.testcase_id, "testcase created");
        Ok(())
    }

    async fn list_testcases(&self) -> Result<Vec<Testcase>> {
        self.read_list(TESTCASES_FILE).await
    }
}

#[async_trait]
impl TestDataStore for FileStore {
    async fn load_test_data(&self, testcase_id: &str) -> Result<Option<TestData>> {
        self.read_test_data(testcase_id).await
    }

    async fn save_rows(&self, testcase_id: &str, rows: &[Row]) -> Result<()> {
        self.update_test_data(testcase_id, |existing| {
            records::with_rows(existing, testcase_id, rows)
        })
        .await
    }

    async fn set_active_row(&self, testcase_id: &str, row: usize) -> Result<()> {
        self.update_test_data(testcase_id, |existing| {
            records::with_active_row(existing, testcase_id, row)
        })
        .await
    }

    async fn save_test_data(&self, data: &TestData) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write_json(&self.test_data_path(&data.testcase_id), data)
            .await
    }
}

#[async_trait]
impl GroupStore for FileStore {
    async fn create_group(&self, name: &str, description: &str) -> Result<RecordId> {
        let id = self
            .update_list(GROUPS_FILE, |groups: &mut Vec<Group>| {
                records::insert_group(groups, name, description)
            })
            .await?;
        info!(group = %name.trim(), %id, "group created");
        Ok(id)
    }

    async fn add_testcases(&self, group_id: RecordId, testcase_ids: &[String]) -> Result<usize> {
        let added = self
            .update_list(GROUPS_FILE, |groups: &mut Vec<Group>| {
                records::add_group_testcases(groups, group_id, testcase_ids)
            })
            .await?;
        info!(group = %group_id, added, "testcases added to group");
        Ok(added)
    }

    async fn remove_testcase(&self, group_id: RecordId, testcase_id: &str) -> Result<bool> {
        self.update_list(GROUPS_FILE, |groups: &mut Vec<Group>| {
            records::remove_group_testcase(groups, group_id, testcase_id)
        })
        .await
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.read_list(GROUPS_FILE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Action, Step};
    use crate::testdata::Cell;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_scenarios_persist_across_instances() {
        let dir = tempdir().unwrap();
        let flow = vec![Step::action("Login", "email", Action::Input("x".into())).unwrap()];

        let store = FileStore::open(dir.path()).await.unwrap();
        let id = store
            .create_scenario(&Scenario::new("S1", "Login", flow.clone()))
            .await
            .unwrap();

        let reopened = FileStore::open(dir.path()).await.unwrap();
        let list = reopened.list_scenarios().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);
        assert_eq!(list[0].scenario.flow, flow);
    }

    #[tokio::test]
    async fn test_conflict_leaves_document_unchanged() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store
            .create_testcase(&Testcase::new("T1", "first"))
            .await
            .unwrap();

        let err = store
            .create_testcase(&Testcase::new("T1", "second"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));

        let list = store.list_testcases().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "first");
    }

    #[tokio::test]
    async fn test_missing_documents_are_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        assert!(store.list_pages().await.unwrap().is_empty());
        assert!(store.load_test_data("T1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_reported() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join(SCENARIOS_FILE), "{not json").unwrap();
        let err = store.list_scenarios().await.unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[tokio::test]
    async fn test_test_data_file_name_is_escaped() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store.set_active_row("../T 1", 1).await.unwrap();
        assert!(dir.path().join("testdata").join("_2E_2E_2FT_201.json").exists());
        assert!(store.load_test_data("../T 1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_similar_testcase_ids_do_not_share_data() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let secret = vec![vec![Cell {
            id: "S1_1".into(),
            element: "E".into(),
            value: "secret".into(),
        }]];
        store.save_rows("T 1", &secret).await.unwrap();

        assert!(store.load_test_data("T_1").await.unwrap().is_none());
        assert!(store.load_test_data("T/1").await.unwrap().is_none());

        store.save_rows("T_1", &[vec![]]).await.unwrap();
        let kept = store.load_test_data("T 1").await.unwrap().unwrap();
        assert_eq!(kept.rows, secret);
    }

    #[tokio::test]
    async fn test_document_for_another_id_is_ignored() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let foreign = TestData::new("OTHER");
        let json = serde_json::to_string(&foreign).unwrap();
        std::fs::write(store.test_data_path("T1"), json).unwrap();

        assert!(store.load_test_data("T1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_test_data_writes_rows_and_active_row() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store.save_rows("T1", &[vec![], vec![], vec![]]).await.unwrap();
        store.set_active_row("T1", 3).await.unwrap();

        let mut data = TestData::new("T1");
        data.rows = vec![vec![], vec![]];
        data.active_row = 2;
        store.save_test_data(&data).await.unwrap();

        let reopened = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.load_test_data("T1").await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn test_groups_persist() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let id = store.create_group("Smoke", "fast checks").await.unwrap();
        store
            .add_testcases(id, &["T1".to_string(), "T2".to_string()])
            .await
            .unwrap();

        let err = store.create_group("Smoke", "").await.unwrap_err();
        assert!(matches!(err, Error::Conflict { kind: "Group", .. }));

        let reopened = FileStore::open(dir.path()).await.unwrap();
        let groups = reopened.list_groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].description, "fast checks");
        assert_eq!(groups[0].testcase_ids, vec!["T1", "T2"]);
    }
}
