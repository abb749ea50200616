//! Flow editor state machine
//!
//! Holds an ordered flow of steps, a draft, and the current editing mode.
//! The mode carries its own target index so an append can never have a
//! dangling target, and every mutation of the flow keeps the target
//! attached to the same logical position.

use tracing::debug;

use super::draft::Draft;
use crate::common::{Error, Result, ValidationError};
use crate::step::{self, Step};

/// What the next commit does with the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Push to the end of the flow
    #[default]
    Append,
    /// Splice in before the step currently at this index
    InsertAt(usize),
    /// Replace the step at this index
    EditAt(usize),
}

impl Mode {
    /// Target index, if any
    pub fn target(self) -> Option<usize> {
        match self {
            Mode::Append => None,
            Mode::InsertAt(i) | Mode::EditAt(i) => Some(i),
        }
    }

    /// Label for the commit button
    pub fn verb(self) -> &'static str {
        match self {
            Mode::Append => "Add",
            Mode::InsertAt(_) => "Insert",
            Mode::EditAt(_) => "Save",
        }
    }
}

/// Editor for one scenario flow
#[derive(Debug, Clone, Default)]
pub struct FlowEditor {
    flow: Vec<Step>,
    draft: Draft,
    mode: Mode,
}

impl FlowEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing an existing flow
    pub fn with_flow(flow: Vec<Step>) -> Self {
        Self {
            flow,
            ..Self::default()
        }
    }

    pub fn flow(&self) -> &[Step] {
        &self.flow
    }

    pub fn into_flow(self) -> Vec<Step> {
        self.flow
    }

    pub fn len(&self) -> usize {
        self.flow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flow.is_empty()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Sentence for the current draft, if there is anything to show
    pub fn preview(&self) -> Option<String> {
        step::preview(&self.draft)
    }

    /// Prepare to insert a new step before index `at`
    ///
    /// `at == len` is allowed and inserts at the end.
    pub fn start_insert(&mut self, at: usize) -> Result<()> {
        if at > self.flow.len() {
            return Err(Error::invalid_index(at, self.flow.len()));
        }
        self.mode = Mode::InsertAt(at);
        self.draft.clear_entry();
        debug!(at, "insert mode");
        Ok(())
    }

    /// Load the step at `at` into the draft for editing
    pub fn start_edit(&mut self, at: usize) -> Result<()> {
        let step = self
            .flow
            .get(at)
            .ok_or_else(|| Error::invalid_index(at, self.flow.len()))?;
        self.draft = Draft::from_step(step);
        self.mode = Mode::EditAt(at);
        debug!(at, "edit mode");
        Ok(())
    }

    /// Validate the draft and apply it according to the current mode
    ///
    /// Returns the index the new step occupies. On validation failure the
    /// flow, draft and mode are left exactly as they were.
    pub fn commit(&mut self) -> std::result::Result<usize, ValidationError> {
        let step = self.draft.build()?;

        let index = match self.mode {
            Mode::Append => {
                self.flow.push(step);
                self.flow.len() - 1
            }
            Mode::InsertAt(at) => {
                let at = at.min(self.flow.len());
                self.flow.insert(at, step);
                at
            }
            Mode::EditAt(at) => match self.flow.get_mut(at) {
                Some(slot) => {
                    *slot = step;
                    at
                }
                None => {
                    self.flow.push(step);
                    self.flow.len() - 1
                }
            },
        };

        debug!(index, mode = ?self.mode, "committed step");
        self.draft.clear_values();
        self.mode = Mode::Append;
        Ok(index)
    }

    /// Abandon the current draft and return to append mode
    pub fn cancel(&mut self) {
        self.draft.clear_entry();
        self.mode = Mode::Append;
    }

    /// Delete the step at `at`
    ///
    /// An insert or edit targeting the removed step is abandoned; a target
    /// after it shifts left so it stays on the same step or gap.
    pub fn remove(&mut self, at: usize) -> Result<Step> {
        if at >= self.flow.len() {
            return Err(Error::invalid_index(at, self.flow.len()));
        }
        let removed = self.flow.remove(at);

        match self.mode {
            Mode::InsertAt(t) | Mode::EditAt(t) if t == at => {
                debug!(at, "target removed, back to append");
                self.cancel();
            }
            Mode::InsertAt(t) if t > at => self.mode = Mode::InsertAt(t - 1),
            Mode::EditAt(t) if t > at => self.mode = Mode::EditAt(t - 1),
            _ => {}
        }

        Ok(removed)
    }

    /// Move a step to a new position
    ///
    /// Only allowed while appending, since an insert or edit target would
    /// otherwise silently point somewhere else.
    pub fn move_step(&mut self, from: usize, to: usize) -> Result<()> {
        if self.mode != Mode::Append {
            return Err(Error::InvalidState(
                "finish or cancel the current insert/edit before reordering".to_string(),
            ));
        }
        let len = self.flow.len();
        if from >= len {
            return Err(Error::invalid_index(from, len));
        }
        if to >= len {
            return Err(Error::invalid_index(to, len));
        }
        let step = self.flow.remove(from);
        self.flow.insert(to, step);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Action, ActionKey, Category};

    fn click(element: &str) -> Step {
        Step::action("Page", element, Action::Click).unwrap()
    }

    fn editor_with(n: usize) -> FlowEditor {
        FlowEditor::with_flow((0..n).map(|i| click(&format!("e{}", i))).collect())
    }

    fn fill_click(editor: &mut FlowEditor, element: &str) {
        let draft = editor.draft_mut();
        draft.page = "Page".into();
        draft.category = Category::Step;
        draft.action = Some(ActionKey::Click);
        draft.element = element.into();
    }

    #[test]
    fn test_append() {
        let mut editor = FlowEditor::new();
        fill_click(&mut editor, "a");
        assert_eq!(editor.commit().unwrap(), 0);
        fill_click(&mut editor, "b");
        assert_eq!(editor.commit().unwrap(), 1);
        assert_eq!(editor.flow(), &[click("a"), click("b")]);
    }

    #[test]
    fn test_insert_shifts_right_at_every_position() {
        for at in 0..=3 {
            let original = editor_with(3);
            let mut editor = original.clone();
            editor.start_insert(at).unwrap();
            fill_click(&mut editor, "new");
            assert_eq!(editor.commit().unwrap(), at);

            let flow = editor.flow();
            assert_eq!(flow.len(), 4);
            assert_eq!(flow[at], click("new"));
            assert_eq!(&flow[..at], &original.flow()[..at]);
            assert_eq!(&flow[at + 1..], &original.flow()[at..]);
            assert_eq!(editor.mode(), Mode::Append);
        }
    }

    #[test]
    fn test_edit_replaces_in_place() {
        for at in 0..3 {
            let original = editor_with(3);
            let mut editor = original.clone();
            editor.start_edit(at).unwrap();
            assert_eq!(editor.draft().element, format!("e{}", at));
            editor.draft_mut().element = "changed".into();
            assert_eq!(editor.commit().unwrap(), at);

            let flow = editor.flow();
            assert_eq!(flow.len(), 3);
            for (i, step) in flow.iter().enumerate() {
                if i == at {
                    assert_eq!(step, &click("changed"));
                } else {
                    assert_eq!(step, &original.flow()[i]);
                }
            }
        }
    }

    #[test]
    fn test_start_insert_out_of_range() {
        let mut editor = editor_with(2);
        assert!(matches!(
            editor.start_insert(3),
            Err(Error::InvalidIndex { index: 3, len: 2 })
        ));
        assert_eq!(editor.mode(), Mode::Append);
    }

    #[test]
    fn test_start_edit_out_of_range() {
        let mut editor = editor_with(2);
        assert!(editor.start_edit(2).is_err());
        assert_eq!(editor.mode(), Mode::Append);
    }

    #[test]
    fn test_start_insert_keeps_page_and_category() {
        let mut editor = editor_with(1);
        fill_click(&mut editor, "x");
        editor.start_insert(0).unwrap();
        assert_eq!(editor.draft().page, "Page");
        assert_eq!(editor.draft().category, Category::Step);
        assert_eq!(editor.draft().action, None);
        assert!(editor.draft().element.is_empty());
    }

    #[test]
    fn test_failed_commit_changes_nothing() {
        let mut editor = editor_with(2);
        editor.start_insert(1).unwrap();
        let draft = editor.draft().clone();

        assert_eq!(editor.commit().unwrap_err(), ValidationError::MissingAction);
        assert_eq!(editor.mode(), Mode::InsertAt(1));
        assert_eq!(editor.draft(), &draft);
        assert_eq!(editor.len(), 2);
    }

    #[test]
    fn test_cancel_leaves_flow_untouched() {
        let mut editor = editor_with(2);
        editor.start_edit(1).unwrap();
        editor.draft_mut().element = "changed".into();
        editor.cancel();
        assert_eq!(editor.mode(), Mode::Append);
        assert_eq!(editor.flow()[1], click("e1"));
    }

    #[test]
    fn test_remove_before_insert_target_shifts_left() {
        let mut editor = editor_with(4);
        editor.start_insert(3).unwrap();
        editor.remove(1).unwrap();
        assert_eq!(editor.mode(), Mode::InsertAt(2));

        fill_click(&mut editor, "new");
        editor.commit().unwrap();
        assert_eq!(
            editor.flow(),
            &[click("e0"), click("e2"), click("new"), click("e3")]
        );
    }

    #[test]
    fn test_remove_before_edit_target_stays_on_same_step() {
        let mut editor = editor_with(3);
        editor.start_edit(2).unwrap();
        editor.remove(0).unwrap();
        assert_eq!(editor.mode(), Mode::EditAt(1));
        assert_eq!(editor.flow()[1], click("e2"));
    }

    #[test]
    fn test_remove_target_abandons_operation() {
        let mut editor = editor_with(3);
        editor.start_edit(1).unwrap();
        editor.remove(1).unwrap();
        assert_eq!(editor.mode(), Mode::Append);
        assert!(editor.draft().element.is_empty());

        editor.start_insert(2).unwrap();
        editor.remove(1).unwrap();
        assert_eq!(editor.mode(), Mode::InsertAt(1));
    }

    #[test]
    fn test_remove_after_target_keeps_it() {
        let mut editor = editor_with(3);
        editor.start_insert(1).unwrap();
        editor.remove(2).unwrap();
        assert_eq!(editor.mode(), Mode::InsertAt(1));
    }

    #[test]
    fn test_target_stays_in_range_after_removals() {
        let mut editor = editor_with(3);
        editor.start_insert(3).unwrap();
        while !editor.is_empty() {
            editor.remove(0).unwrap();
            if let Mode::InsertAt(t) = editor.mode() {
                assert!(t <= editor.len());
            }
        }
        assert_eq!(editor.mode(), Mode::InsertAt(0));
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut editor = editor_with(1);
        assert!(editor.remove(1).is_err());
        assert_eq!(editor.len(), 1);
    }

    #[test]
    fn test_move_step() {
        let mut editor = editor_with(3);
        editor.move_step(0, 2).unwrap();
        assert_eq!(editor.flow(), &[click("e1"), click("e2"), click("e0")]);

        editor.start_edit(0).unwrap();
        assert!(matches!(editor.move_step(0, 1), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_preview_follows_draft() {
        let mut editor = FlowEditor::new();
        assert_eq!(editor.preview(), None);
        fill_click(&mut editor, "submit");
        assert_eq!(
            editor.preview().as_deref(),
            Some("Click on the element submit")
        );
    }
}
