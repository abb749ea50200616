//! Draft step under construction
//!
//! The draft is the flat, form-shaped counterpart of a [`Step`]: every
//! field is a plain string so it can be edited freely, and it only becomes
//! a typed step once it validates.

use serde::{Deserialize, Serialize};

use crate::common::{parse_comma_separated, ValidationError};
use crate::step::{Action, ActionKey, AssertKind, Category, OutputAction, Step, StepData, ValueShape};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub page: String,
    pub category: Category,
    pub action: Option<ActionKey>,
    pub element: String,
    /// Single value, or comma-separated values for multi-valued actions
    pub value: String,
    /// Capture key for output steps
    pub key: String,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a page; the element belongs to the previous page so it is cleared
    pub fn set_page(&mut self, page: impl Into<String>) {
        self.page = page.into();
        self.element.clear();
    }

    /// Switch category, clearing everything chosen for the previous one
    pub fn set_category(&mut self, category: Category) {
        self.category = category;
        self.action = None;
        self.element.clear();
        self.value.clear();
        self.key.clear();
    }

    /// Select an action; element and value depend on it so they are cleared
    pub fn set_action(&mut self, action: ActionKey) {
        self.action = Some(action);
        self.element.clear();
        self.value.clear();
    }

    /// Parsed values for multi-valued actions
    pub fn values(&self) -> Vec<String> {
        parse_comma_separated(&self.value)
    }

    /// Value text as it will be stored: multi values normalized and re-joined
    pub fn values_text(&self) -> String {
        match self.action.map(ActionKey::value_shape) {
            Some(ValueShape::Multi) => self.values().join(", "),
            _ => self.value.clone(),
        }
    }

    /// Clear value and key, keeping page, category, action and element
    pub fn clear_values(&mut self) {
        self.value.clear();
        self.key.clear();
    }

    /// Clear everything but the page and category selection
    pub fn clear_entry(&mut self) {
        self.action = None;
        self.element.clear();
        self.clear_values();
    }

    /// Rehydrate a draft from an existing step
    pub fn from_step(step: &Step) -> Self {
        match step {
            Step::Action(s) => Self {
                page: s.page.clone(),
                category: Category::Step,
                action: Some(s.action.key()),
                element: s.element.as_str().to_string(),
                value: s.action.edit_text(),
                key: String::new(),
            },
            Step::Assert(s) => Self {
                page: s.page.clone(),
                category: Category::Assert,
                action: Some(s.kind.key()),
                element: s.element.as_str().to_string(),
                value: s.expected.clone(),
                key: String::new(),
            },
            Step::Output(s) => Self {
                page: s.page.clone(),
                category: Category::Output,
                action: Some(s.action.key()),
                element: String::new(),
                value: String::new(),
                key: s.key.as_str().to_string(),
            },
        }
    }

    /// Check required fields, returning the selected action on success
    ///
    /// Fields are checked in the order a user fills them in for the chosen
    /// action: action, element or key, value, then page.
    pub fn validate(&self) -> Result<ActionKey, ValidationError> {
        let action = self.action.ok_or(ValidationError::MissingAction)?;
        if action.category() != self.category {
            return Err(ValidationError::ActionNotInCategory {
                action: action.to_string(),
                category: self.category.to_string(),
            });
        }

        if self.category == Category::Output {
            if self.key.trim().is_empty() {
                return Err(ValidationError::MissingKey);
            }
        } else if self.element.trim().is_empty() {
            return Err(ValidationError::MissingElement);
        }

        match action.value_shape() {
            ValueShape::None => {}
            ValueShape::Single if self.value.trim().is_empty() => {
                return Err(ValidationError::MissingValue)
            }
            ValueShape::Single => {}
            ValueShape::Multi if self.values().is_empty() => {
                return Err(ValidationError::MissingValues)
            }
            ValueShape::Multi => {}
        }

        if self.page.trim().is_empty() {
            return Err(ValidationError::MissingPage);
        }

        Ok(action)
    }

    /// Validate and build the typed step
    pub fn build(&self) -> Result<Step, ValidationError> {
        let key = self.validate()?;
        match self.category {
            Category::Step => {
                let data = match key.value_shape() {
                    ValueShape::Multi => StepData::Multi(self.values()),
                    _ => StepData::Single(self.value.clone()),
                };
                let action = Action::from_parts(key, Some(data)).ok_or_else(|| {
                    ValidationError::ActionNotInCategory {
                        action: key.to_string(),
                        category: self.category.to_string(),
                    }
                })?;
                Step::action(self.page.clone(), self.element.clone(), action)
            }
            Category::Assert => {
                let kind = AssertKind::from_key(key).ok_or(ValidationError::MissingAction)?;
                Step::assert(self.page.clone(), self.element.clone(), kind, self.value.clone())
            }
            Category::Output => {
                let action = OutputAction::from_key(key).ok_or(ValidationError::MissingAction)?;
                Step::output(self.page.clone(), action, self.key.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(category: Category, action: ActionKey) -> Draft {
        Draft {
            page: "Login".into(),
            category,
            action: Some(action),
            ..Draft::default()
        }
    }

    #[test]
    fn test_missing_element() {
        let d = Draft {
            page: String::new(),
            category: Category::Step,
            action: Some(ActionKey::Input),
            element: String::new(),
            value: "hello".into(),
            key: String::new(),
        };
        assert_eq!(d.build().unwrap_err(), ValidationError::MissingElement);
    }

    #[test]
    fn test_missing_key() {
        let d = Draft {
            category: Category::Output,
            action: Some(ActionKey::SaveJobId),
            ..Draft::default()
        };
        assert_eq!(d.build().unwrap_err(), ValidationError::MissingKey);
    }

    #[test]
    fn test_missing_action() {
        assert_eq!(
            Draft::new().build().unwrap_err(),
            ValidationError::MissingAction
        );
    }

    #[test]
    fn test_missing_value_for_data_action() {
        let mut d = draft(Category::Step, ActionKey::Input);
        d.element = "email".into();
        assert_eq!(d.build().unwrap_err(), ValidationError::MissingValue);

        let mut d = draft(Category::Step, ActionKey::Upload);
        d.element = "cv".into();
        d.value = " , ".into();
        assert_eq!(d.build().unwrap_err(), ValidationError::MissingValues);
    }

    #[test]
    fn test_click_needs_no_value() {
        let mut d = draft(Category::Step, ActionKey::Click);
        d.element = "submit".into();
        let step = d.build().unwrap();
        assert_eq!(step, Step::action("Login", "submit", Action::Click).unwrap());
    }

    #[test]
    fn test_missing_page_checked_last() {
        let mut d = draft(Category::Step, ActionKey::Click);
        d.page.clear();
        d.element = "submit".into();
        assert_eq!(d.build().unwrap_err(), ValidationError::MissingPage);
    }

    #[test]
    fn test_action_must_match_category() {
        let mut d = draft(Category::Assert, ActionKey::Input);
        d.element = "email".into();
        d.value = "x".into();
        assert!(matches!(
            d.build().unwrap_err(),
            ValidationError::ActionNotInCategory { .. }
        ));
    }

    #[test]
    fn test_multi_value_parsed() {
        let mut d = draft(Category::Step, ActionKey::MultiSelectCreate);
        d.element = "skills".into();
        d.value = "rust, go,".into();
        let step = d.build().unwrap();
        assert_eq!(
            step,
            Step::action(
                "Login",
                "skills",
                Action::MultiSelectCreate(vec!["rust".into(), "go".into()])
            )
            .unwrap()
        );
    }

    #[test]
    fn test_from_step_round_trips_through_build() {
        let step = Step::action("Jobs", "cv", Action::Upload(vec!["a.pdf".into(), "b.pdf".into()]))
            .unwrap();
        let d = Draft::from_step(&step);
        assert_eq!(d.value, "a.pdf, b.pdf");
        assert_eq!(d.build().unwrap(), step);

        let step = Step::output("Jobs", OutputAction::SaveJobId, "jobId").unwrap();
        let d = Draft::from_step(&step);
        assert_eq!(d.category, Category::Output);
        assert_eq!(d.key, "jobId");
        assert_eq!(d.build().unwrap(), step);
    }

    #[test]
    fn test_setters_cascade() {
        let mut d = draft(Category::Step, ActionKey::Input);
        d.element = "email".into();
        d.value = "x".into();

        d.set_page("Signup");
        assert!(d.element.is_empty());
        assert_eq!(d.value, "x");

        d.set_category(Category::Assert);
        assert_eq!(d.action, None);
        assert!(d.value.is_empty());
        assert_eq!(d.page, "Signup");
    }
}
