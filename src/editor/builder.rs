//! Scenario builder session
//!
//! Pairs a flow editor with the scenario id and name, and remembers the
//! record id once the scenario has been persisted.

use tracing::info;

use super::flow::FlowEditor;
use crate::common::Result;
use crate::model::{RecordId, Scenario, ScenarioRecord};
use crate::store::ScenarioStore;

#[derive(Debug, Clone, Default)]
pub struct ScenarioBuilder {
    pub scenario_id: String,
    pub name: String,
    pub editor: FlowEditor,
    record_id: Option<RecordId>,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reopen a persisted scenario
    pub fn edit(record: ScenarioRecord) -> Self {
        let ScenarioRecord { id, scenario } = record;
        Self {
            scenario_id: scenario.scenario_id,
            name: scenario.name,
            editor: FlowEditor::with_flow(scenario.flow),
            record_id: Some(id),
        }
    }

    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn is_new(&self) -> bool {
        self.record_id.is_none()
    }

    /// Snapshot of the scenario as it would be saved
    pub fn scenario(&self) -> Scenario {
        Scenario::new(
            self.scenario_id.trim(),
            self.name.trim(),
            self.editor.flow().to_vec(),
        )
    }

    /// Create or update the scenario
    ///
    /// On failure nothing in the builder changes, so the caller can fix the
    /// problem and save again.
    pub async fn save(&mut self, store: &dyn ScenarioStore) -> Result<RecordId> {
        let scenario = self.scenario();
        scenario.validate()?;

        let id = match self.record_id {
            Some(id) => {
                store.update_scenario(id, &scenario).await?;
                id
            }
            None => store.create_scenario(&scenario).await?,
        };
        info!(scenario = %scenario.scenario_id, %id, steps = scenario.flow.len(), "scenario saved");
        self.record_id = Some(id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Error, ValidationError};
    use crate::step::{ActionKey, Category};
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl ScenarioStore for Unreachable {
        async fn create_scenario(&self, _scenario: &Scenario) -> Result<RecordId> {
            Err(Error::Transport("connection refused".into()))
        }

        async fn update_scenario(&self, _id: RecordId, _scenario: &Scenario) -> Result<()> {
            Err(Error::Transport("connection refused".into()))
        }

        async fn list_scenarios(&self) -> Result<Vec<ScenarioRecord>> {
            Err(Error::Transport("connection refused".into()))
        }
    }

    fn builder_with_step() -> ScenarioBuilder {
        let mut builder = ScenarioBuilder::new();
        builder.scenario_id = "S1".into();
        builder.name = "Login".into();
        let draft = builder.editor.draft_mut();
        draft.set_page("Login");
        draft.set_category(Category::Step);
        draft.set_action(ActionKey::Click);
        draft.element = "submit".into();
        builder.editor.commit().unwrap();
        builder
    }

    #[tokio::test]
    async fn test_save_creates_then_updates() {
        let store = MemoryStore::new();
        let mut builder = builder_with_step();

        let id = builder.save(&store).await.unwrap();
        assert_eq!(builder.record_id(), Some(id));

        builder.name = "Login v2".into();
        assert_eq!(builder.save(&store).await.unwrap(), id);

        let list = store.list_scenarios().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].scenario.name, "Login v2");
        assert_eq!(list[0].scenario.flow.len(), 1);
    }

    #[tokio::test]
    async fn test_save_requires_id_and_name() {
        let store = MemoryStore::new();
        let mut builder = builder_with_step();
        builder.name = "  ".into();

        let err = builder.save(&store).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::EmptyField("Scenario name"))
        ));
        assert!(builder.is_new());
        assert!(store.list_scenarios().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_builder_untouched() {
        let mut builder = builder_with_step();
        let err = builder.save(&Unreachable).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(builder.is_new());
        assert_eq!(builder.editor.len(), 1);
        assert_eq!(builder.scenario_id, "S1");
    }

    #[tokio::test]
    async fn test_edit_reopens_record() {
        let store = MemoryStore::new();
        let mut first = builder_with_step();
        let id = first.save(&store).await.unwrap();

        let record = store.list_scenarios().await.unwrap().remove(0);
        let builder = ScenarioBuilder::edit(record);
        assert_eq!(builder.record_id(), Some(id));
        assert_eq!(builder.editor.len(), 1);
        assert_eq!(builder.name, "Login");
    }
}
