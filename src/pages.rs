//! Page and element catalog
//!
//! A page names a UI surface and lists the elements on it. Each element has
//! a type (the action or assertion it is meant for) and a set of
//! type-specific locator fields. Steps reference elements by name.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::common::ValidationError;
use crate::model::RecordId;
use crate::step::ActionKey;

/// An element definition on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ActionKey,
    /// Type-specific fields such as `locator` or `dropdownLocator`
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Element {
    pub fn new(name: impl Into<String>, kind: ActionKey) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: BTreeMap::new(),
        }
    }

    /// Set a type-specific field
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Declared fields for this element's type that are absent or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        fields_for(self.kind)
            .iter()
            .copied()
            .filter(|f| match self.fields.get(*f) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .collect()
    }
}

/// Fields an element of the given type is defined by
pub fn fields_for(kind: ActionKey) -> &'static [&'static str] {
    match kind {
        ActionKey::ToggleState => &["locator", "onLocator", "offLocator", "defaultData"],
        ActionKey::Autocomplete => &["locator", "dropdownLocator", "defaultData"],
        ActionKey::Input => &["locator", "defaultData"],
        ActionKey::Date => &["locator", "comment"],
        ActionKey::MultiSelectCreate => &["locator", "dropdownLocator"],
        ActionKey::ClickByTitle => &["requiredJobTitleLocator", "nextPage", "numberOfPages"],
        ActionKey::Click
        | ActionKey::Upload
        | ActionKey::Checkbox
        | ActionKey::Editor
        | ActionKey::Text
        | ActionKey::Contains
        | ActionKey::ArrayContains => &["locator"],
        ActionKey::SaveJobId => &[],
    }
}

/// A UI surface and its elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub page: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Page {
    /// Page name, at least one element, and a name for every element
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page.trim().is_empty() {
            return Err(ValidationError::EmptyField("Page name"));
        }
        if self.elements.is_empty() {
            return Err(ValidationError::NoElements);
        }
        if self.elements.iter().any(|e| e.name.trim().is_empty()) {
            return Err(ValidationError::EmptyField("Element name"));
        }
        Ok(())
    }

    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Elements offered for an action; all elements when no action is chosen
    pub fn elements_for(&self, action: Option<ActionKey>) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .filter(move |e| action.map_or(true, |a| e.kind == a))
    }
}

/// A page as returned by a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub page: Page,
}
