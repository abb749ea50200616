//! Human-readable step descriptions
//!
//! Rendering is pure: the same step always yields the same sentence, so
//! front ends can recompute previews on every keystroke.

use super::meta::{ActionKey, Category};
use super::types::Step;
use crate::editor::Draft;

/// Decorates the element and value fragments of a sentence
pub trait Style {
    fn element(&self, name: &str) -> String;
    fn value(&self, value: &str) -> String;
}

/// Emits fragments unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Style for Plain {
    fn element(&self, name: &str) -> String {
        name.to_string()
    }

    fn value(&self, value: &str) -> String {
        value.to_string()
    }
}

/// Flattened view of whatever is being rendered
struct Parts<'a> {
    key: ActionKey,
    element: &'a str,
    value: String,
}

fn render(parts: &Parts<'_>, style: &dyn Style) -> String {
    let el = style.element(parts.element);
    let val = style.value(&parts.value);
    match parts.key {
        ActionKey::Click => format!("Click on the element {}", el),
        ActionKey::Input => format!("Enter {} into the input field {}", val, el),
        ActionKey::Upload => format!("Upload the file {} into {}", val, el),
        ActionKey::Autocomplete => format!("Select {} from the dropdown {}", val, el),
        ActionKey::ToggleState => format!("Set the toggle {} to {}", el, val),
        ActionKey::Checkbox => format!("Set the checkbox {} to {}", el, val),
        ActionKey::Date => format!("Select the date {} for {}", val, el),
        ActionKey::Editor => format!("Enter {} into the text editor {}", val, el),
        ActionKey::MultiSelectCreate => format!("Select or create {} in {}", val, el),
        ActionKey::ClickByTitle => format!("Click on the job title with ID {}", val),
        ActionKey::Text => format!("Verify that the text of {} is exactly {}", el, val),
        ActionKey::Contains => format!("Verify that {} contains the text {}", el, val),
        ActionKey::ArrayContains => format!("Verify that the list {} contains {}", el, val),
        ActionKey::SaveJobId => format!("Store the Job ID into the variable {}", val),
    }
}

fn step_parts(step: &Step) -> Parts<'_> {
    match step {
        Step::Action(s) => Parts {
            key: s.action.key(),
            element: s.element.as_str(),
            value: s.action.edit_text(),
        },
        Step::Assert(s) => Parts {
            key: s.kind.key(),
            element: s.element.as_str(),
            value: s.expected.clone(),
        },
        Step::Output(s) => Parts {
            key: s.action.key(),
            element: "",
            value: s.key.as_str().to_string(),
        },
    }
}

/// Describe a step in plain text
pub fn describe(step: &Step) -> String {
    describe_with(step, &Plain)
}

/// Describe a step, decorating element names and values with `style`
pub fn describe_with(step: &Step, style: &dyn Style) -> String {
    render(&step_parts(step), style)
}

/// Describe the step a draft would produce
///
/// Returns `None` when there is nothing to display yet: no action selected,
/// or an action that does not belong to the draft's category.
pub fn preview(draft: &Draft) -> Option<String> {
    preview_with(draft, &Plain)
}

pub fn preview_with(draft: &Draft, style: &dyn Style) -> Option<String> {
    let key = draft.action?;
    if key.category() != draft.category {
        return None;
    }
    let value = match draft.category {
        Category::Output => draft.key.clone(),
        _ if key.needs_value() => draft.values_text(),
        _ => String::new(),
    };
    Some(render(
        &Parts {
            key,
            element: &draft.element,
            value,
        },
        style,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Action, AssertKind, OutputAction};

    struct Brackets;

    impl Style for Brackets {
        fn element(&self, name: &str) -> String {
            format!("[{}]", name)
        }
        fn value(&self, value: &str) -> String {
            format!("\"{}\"", value)
        }
    }

    #[test]
    fn test_describe_each_category() {
        let click = Step::action("Login", "submit", Action::Click).unwrap();
        assert_eq!(describe(&click), "Click on the element submit");

        let input = Step::action("Login", "email", Action::Input("a@b.c".into())).unwrap();
        assert_eq!(describe(&input), "Enter a@b.c into the input field email");

        let multi = Step::action(
            "Jobs",
            "skills",
            Action::MultiSelectCreate(vec!["rust".into(), "go".into()]),
        )
        .unwrap();
        assert_eq!(describe(&multi), "Select or create rust, go in skills");

        let toggle = Step::action("Jobs", "remote", Action::ToggleState("on".into())).unwrap();
        assert_eq!(describe(&toggle), "Set the toggle remote to on");

        let by_title = Step::action("Jobs", "list", Action::ClickByTitle("42".into())).unwrap();
        assert_eq!(describe(&by_title), "Click on the job title with ID 42");

        let check = Step::assert("Home", "title", AssertKind::Text, "Dashboard").unwrap();
        assert_eq!(
            describe(&check),
            "Verify that the text of title is exactly Dashboard"
        );

        let list = Step::assert("Home", "tags", AssertKind::ArrayContains, "new").unwrap();
        assert_eq!(describe(&list), "Verify that the list tags contains new");

        let out = Step::output("Jobs", OutputAction::SaveJobId, "jobId").unwrap();
        assert_eq!(describe(&out), "Store the Job ID into the variable jobId");
    }

    #[test]
    fn test_describe_is_repeatable() {
        let step = Step::action("Jobs", "cv", Action::Upload(vec!["a.pdf".into()])).unwrap();
        let first = describe(&step);
        let second = describe(&step);
        assert_eq!(first, second);
        assert_eq!(first, "Upload the file a.pdf into cv");
    }

    #[test]
    fn test_describe_with_style() {
        let step = Step::action("Login", "email", Action::Input("x".into())).unwrap();
        assert_eq!(
            describe_with(&step, &Brackets),
            "Enter \"x\" into the input field [email]"
        );
    }

    #[test]
    fn test_preview_without_action_is_none() {
        let draft = Draft::default();
        assert_eq!(preview(&draft), None);
    }

    #[test]
    fn test_preview_with_action_from_other_category_is_none() {
        let mut draft = Draft::default();
        draft.category = Category::Assert;
        draft.action = Some(ActionKey::Input);
        assert_eq!(preview(&draft), None);
    }

    #[test]
    fn test_preview_mid_authoring() {
        let mut draft = Draft::default();
        draft.set_action(ActionKey::Input);
        assert_eq!(
            preview(&draft).as_deref(),
            Some("Enter  into the input field ")
        );

        draft.element = "email".into();
        draft.value = "hello".into();
        assert_eq!(
            preview(&draft).as_deref(),
            Some("Enter hello into the input field email")
        );
    }

    #[test]
    fn test_preview_multi_values_are_normalized() {
        let mut draft = Draft::default();
        draft.set_action(ActionKey::MultiSelectCreate);
        draft.element = "skills".into();
        draft.value = "rust,, go ".into();
        assert_eq!(
            preview(&draft).as_deref(),
            Some("Select or create rust, go in skills")
        );
    }
}
