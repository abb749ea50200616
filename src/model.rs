//! Scenario and testcase records

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::common::{parse_comma_separated, Error, Result, ValidationError};
use crate::step::Step;

/// Opaque id a store assigns to a persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, ordered sequence of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario_id: String,
    pub name: String,
    #[serde(default)]
    pub flow: Vec<Step>,
}

impl Scenario {
    pub fn new(scenario_id: impl Into<String>, name: impl Into<String>, flow: Vec<Step>) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            name: name.into(),
            flow,
        }
    }

    /// Scenario id and name are required before saving
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.scenario_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("Scenario ID"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("Scenario name"));
        }
        Ok(())
    }
}

/// A scenario as returned by a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub scenario: Scenario,
}

/// A named grouping of scenario references plus tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testcase {
    pub testcase_id: String,
    pub name: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Scenario ids, in execution order; may reference deleted scenarios
    #[serde(default)]
    pub scenarios: Vec<String>,
}

impl Testcase {
    pub fn new(testcase_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            testcase_id: testcase_id.into(),
            name: name.into(),
            tags: BTreeSet::new(),
            scenarios: Vec::new(),
        }
    }

    /// Replace tags from comma-separated input
    pub fn set_tags(&mut self, input: &str) {
        self.tags = parse_comma_separated(input).into_iter().collect();
    }

    /// Append a scenario reference; returns false if it is already present
    pub fn add_scenario(&mut self, scenario_id: impl Into<String>) -> bool {
        let scenario_id = scenario_id.into();
        if self.scenarios.contains(&scenario_id) {
            return false;
        }
        self.scenarios.push(scenario_id);
        true
    }

    /// Remove a scenario reference; returns false if it was not present
    pub fn remove_scenario(&mut self, scenario_id: &str) -> bool {
        let before = self.scenarios.len();
        self.scenarios.retain(|id| id != scenario_id);
        self.scenarios.len() != before
    }

    /// Move a scenario reference to a new position
    pub fn move_scenario(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.scenarios.len();
        if from >= len {
            return Err(Error::invalid_index(from, len));
        }
        if to >= len {
            return Err(Error::invalid_index(to, len));
        }
        let id = self.scenarios.remove(from);
        self.scenarios.insert(to, id);
        Ok(())
    }

    /// Testcase id and name are required before saving
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.testcase_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("Testcase ID"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("Testcase name"));
        }
        Ok(())
    }
}

/// A named collection of testcases that can be run together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub group_id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Testcase ids in the order they were added
    #[serde(default)]
    pub testcase_ids: Vec<String>,
}

impl Group {
    pub fn new(group_id: RecordId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            group_id,
            name: name.into(),
            description: description.into(),
            testcase_ids: Vec::new(),
        }
    }

    /// Append testcases that are not members yet; returns how many were added
    pub fn add_testcases<'a>(&mut self, testcase_ids: impl IntoIterator<Item = &'a String>) -> usize {
        let mut added = 0;
        for id in testcase_ids {
            if !self.testcase_ids.contains(id) {
                self.testcase_ids.push(id.clone());
                added += 1;
            }
        }
        added
    }

    pub fn remove_testcase(&mut self, testcase_id: &str) -> bool {
        let before = self.testcase_ids.len();
        self.testcase_ids.retain(|id| id != testcase_id);
        self.testcase_ids.len() != before
    }

    /// A group needs a name
    pub fn validate_name(name: &str) -> std::result::Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField("Group name"));
        }
        Ok(())
    }
}

/// Scenarios indexed by `scenario_id`
///
/// References into the catalog are weak: [`ScenarioCatalog::resolve`]
/// returns `None` for a scenario that no longer exists.
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    by_id: HashMap<String, Scenario>,
}

impl ScenarioCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scenario: Scenario) {
        self.by_id.insert(scenario.scenario_id.clone(), scenario);
    }

    pub fn resolve(&self, scenario_id: &str) -> Option<&Scenario> {
        self.by_id.get(scenario_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<Scenario> for ScenarioCatalog {
    fn from_iter<I: IntoIterator<Item = Scenario>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for scenario in iter {
            catalog.insert(scenario);
        }
        catalog
    }
}

impl FromIterator<ScenarioRecord> for ScenarioCatalog {
    fn from_iter<I: IntoIterator<Item = ScenarioRecord>>(iter: I) -> Self {
        iter.into_iter().map(|r| r.scenario).collect()
    }
}
