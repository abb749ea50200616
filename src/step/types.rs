//! Step types
//!
//! A [`Step`] is a closed sum: one variant per category, and within the
//! action category one [`Action`] variant per action carrying only the
//! payload that action needs. Element references and capture keys are
//! non-empty by construction.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::meta::{ActionKey, Category, ValueShape};
use crate::common::{parse_comma_separated, ValidationError};

/// Non-empty reference to an element in a page's catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::MissingElement);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty name an output step stores its captured value under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CaptureKey(String);

impl CaptureKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ValidationError::MissingKey);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Payload of an action step as persisted: one string or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepData {
    Single(String),
    Multi(Vec<String>),
}

impl StepData {
    fn into_single(self) -> String {
        match self {
            StepData::Single(s) => s,
            StepData::Multi(values) => values.join(", "),
        }
    }

    fn into_multi(self) -> Vec<String> {
        match self {
            StepData::Single(s) => parse_comma_separated(&s),
            StepData::Multi(values) => values,
        }
    }
}

/// A UI action with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Click,
    Input(String),
    Upload(Vec<String>),
    Autocomplete(String),
    ToggleState(String),
    Checkbox(String),
    Date(String),
    Editor(String),
    MultiSelectCreate(Vec<String>),
    ClickByTitle(String),
}

impl Action {
    pub fn key(&self) -> ActionKey {
        match self {
            Action::Click => ActionKey::Click,
            Action::Input(_) => ActionKey::Input,
            Action::Upload(_) => ActionKey::Upload,
            Action::Autocomplete(_) => ActionKey::Autocomplete,
            Action::ToggleState(_) => ActionKey::ToggleState,
            Action::Checkbox(_) => ActionKey::Checkbox,
            Action::Date(_) => ActionKey::Date,
            Action::Editor(_) => ActionKey::Editor,
            Action::MultiSelectCreate(_) => ActionKey::MultiSelectCreate,
            Action::ClickByTitle(_) => ActionKey::ClickByTitle,
        }
    }

    /// Build an action from its key and persisted payload
    ///
    /// A scalar payload for a multi-valued action is split on commas, and a
    /// list payload for a single-valued action is joined back together.
    /// Returns `None` when `key` is not a step action.
    pub fn from_parts(key: ActionKey, data: Option<StepData>) -> Option<Self> {
        let data = data.unwrap_or_else(|| StepData::Single(String::new()));
        let action = match key {
            ActionKey::Click => Action::Click,
            ActionKey::Input => Action::Input(data.into_single()),
            ActionKey::Upload => Action::Upload(data.into_multi()),
            ActionKey::Autocomplete => Action::Autocomplete(data.into_single()),
            ActionKey::ToggleState => Action::ToggleState(data.into_single()),
            ActionKey::Checkbox => Action::Checkbox(data.into_single()),
            ActionKey::Date => Action::Date(data.into_single()),
            ActionKey::Editor => Action::Editor(data.into_single()),
            ActionKey::MultiSelectCreate => Action::MultiSelectCreate(data.into_multi()),
            ActionKey::ClickByTitle => Action::ClickByTitle(data.into_single()),
            ActionKey::Text | ActionKey::Contains | ActionKey::ArrayContains => return None,
            ActionKey::SaveJobId => return None,
        };
        Some(action)
    }

    /// Payload in its persisted shape
    pub fn data(&self) -> StepData {
        match self {
            Action::Click => StepData::Single(String::new()),
            Action::Upload(values) | Action::MultiSelectCreate(values) => {
                StepData::Multi(values.clone())
            }
            Action::Input(s)
            | Action::Autocomplete(s)
            | Action::ToggleState(s)
            | Action::Checkbox(s)
            | Action::Date(s)
            | Action::Editor(s)
            | Action::ClickByTitle(s) => StepData::Single(s.clone()),
        }
    }

    /// Payload as it is edited: multi values comma-joined
    pub fn edit_text(&self) -> String {
        match self.key().value_shape() {
            ValueShape::None => String::new(),
            _ => self.data().into_single(),
        }
    }
}

/// Assertion kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertKind {
    /// Element text equals the expected value
    Text,
    /// Element text contains the expected value
    Contains,
    /// Element list contains the expected value
    ArrayContains,
}

impl AssertKind {
    pub fn key(self) -> ActionKey {
        match self {
            AssertKind::Text => ActionKey::Text,
            AssertKind::Contains => ActionKey::Contains,
            AssertKind::ArrayContains => ActionKey::ArrayContains,
        }
    }

    pub fn from_key(key: ActionKey) -> Option<Self> {
        match key {
            ActionKey::Text => Some(AssertKind::Text),
            ActionKey::Contains => Some(AssertKind::Contains),
            ActionKey::ArrayContains => Some(AssertKind::ArrayContains),
            _ => None,
        }
    }
}

/// Output capture actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputAction {
    /// Save the job id from the current URL
    SaveJobId,
}

impl OutputAction {
    pub fn key(self) -> ActionKey {
        match self {
            OutputAction::SaveJobId => ActionKey::SaveJobId,
        }
    }

    pub fn from_key(key: ActionKey) -> Option<Self> {
        match key {
            ActionKey::SaveJobId => Some(OutputAction::SaveJobId),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionStep {
    pub page: String,
    pub element: ElementRef,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertStep {
    pub page: String,
    pub element: ElementRef,
    pub kind: AssertKind,
    pub expected: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputStep {
    pub page: String,
    pub action: OutputAction,
    pub key: CaptureKey,
}

/// One authored unit in a scenario's flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StepRecord", into = "StepRecord")]
pub enum Step {
    Action(ActionStep),
    Assert(AssertStep),
    Output(OutputStep),
}

impl Step {
    /// Create an action step
    pub fn action(
        page: impl Into<String>,
        element: impl Into<String>,
        action: Action,
    ) -> Result<Self, ValidationError> {
        Ok(Step::Action(ActionStep {
            page: page.into(),
            element: ElementRef::new(element)?,
            action,
        }))
    }

    /// Create an assertion step
    pub fn assert(
        page: impl Into<String>,
        element: impl Into<String>,
        kind: AssertKind,
        expected: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Step::Assert(AssertStep {
            page: page.into(),
            element: ElementRef::new(element)?,
            kind,
            expected: expected.into(),
        }))
    }

    /// Create an output step
    pub fn output(
        page: impl Into<String>,
        action: OutputAction,
        key: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Step::Output(OutputStep {
            page: page.into(),
            action,
            key: CaptureKey::new(key)?,
        }))
    }

    pub fn page(&self) -> &str {
        match self {
            Step::Action(s) => &s.page,
            Step::Assert(s) => &s.page,
            Step::Output(s) => &s.page,
        }
    }

    /// Element the step targets; output steps have none
    pub fn element(&self) -> Option<&ElementRef> {
        match self {
            Step::Action(s) => Some(&s.element),
            Step::Assert(s) => Some(&s.element),
            Step::Output(_) => None,
        }
    }

    pub fn key(&self) -> ActionKey {
        match self {
            Step::Action(s) => s.action.key(),
            Step::Assert(s) => s.kind.key(),
            Step::Output(s) => s.action.key(),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Step::Action(_) => Category::Step,
            Step::Assert(_) => Category::Assert,
            Step::Output(_) => Category::Output,
        }
    }

    /// Whether this step consumes a per-testcase data value
    pub fn needs_value(&self) -> bool {
        self.key().needs_value()
    }
}

// === Persisted representation ===

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StepRecord {
    Step {
        #[serde(default)]
        page: String,
        action: ActionKey,
        #[serde(default)]
        element: String,
        #[serde(default)]
        data: Option<StepData>,
    },
    Assert {
        #[serde(default)]
        page: String,
        #[serde(rename = "assert")]
        kind: ActionKey,
        #[serde(default)]
        element: String,
        #[serde(default)]
        expected: String,
    },
    Output {
        #[serde(default)]
        page: String,
        action: ActionKey,
        #[serde(default)]
        key: String,
    },
}

fn wrong_category(key: ActionKey, category: Category) -> String {
    format!("'{}' is not a {} key", key, category)
}

impl TryFrom<StepRecord> for Step {
    type Error = String;

    fn try_from(record: StepRecord) -> Result<Self, Self::Error> {
        match record {
            StepRecord::Step {
                page,
                action,
                element,
                data,
            } => {
                let action = Action::from_parts(action, data)
                    .ok_or_else(|| wrong_category(action, Category::Step))?;
                Step::action(page, element, action).map_err(|e| e.to_string())
            }
            StepRecord::Assert {
                page,
                kind,
                element,
                expected,
            } => {
                let kind = AssertKind::from_key(kind)
                    .ok_or_else(|| wrong_category(kind, Category::Assert))?;
                Step::assert(page, element, kind, expected).map_err(|e| e.to_string())
            }
            StepRecord::Output { page, action, key } => {
                let action = OutputAction::from_key(action)
                    .ok_or_else(|| wrong_category(action, Category::Output))?;
                Step::output(page, action, key).map_err(|e| e.to_string())
            }
        }
    }
}

impl From<Step> for StepRecord {
    fn from(step: Step) -> Self {
        match step {
            Step::Action(s) => StepRecord::Step {
                page: s.page,
                action: s.action.key(),
                element: s.element.0,
                data: Some(s.action.data()),
            },
            Step::Assert(s) => StepRecord::Assert {
                page: s.page,
                kind: s.kind.key(),
                element: s.element.0,
                expected: s.expected,
            },
            Step::Output(s) => StepRecord::Output {
                page: s.page,
                action: s.action.key(),
                key: s.key.0,
            },
        }
    }
}
