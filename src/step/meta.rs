//! Action metadata table
//!
//! Every action, assertion and output key is listed once here together with
//! its category, label and the shape of the value it needs. The editor
//! validates drafts against this table and the column deriver uses it to
//! decide which steps carry per-testcase data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which kind of step a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Perform an action on an element
    #[default]
    Step,
    /// Verify something about an element
    Assert,
    /// Capture a value into a named key
    Output,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Step => "step",
            Category::Assert => "assert",
            Category::Output => "output",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "step" | "action" => Ok(Category::Step),
            "assert" | "verify" => Ok(Category::Assert),
            "output" | "save" => Ok(Category::Output),
            other => Err(format!(
                "Unknown category '{}'. Expected one of: step, assert, output",
                other
            )),
        }
    }
}

/// Shape of the free-form value a key requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// No value
    None,
    /// A single string
    Single,
    /// An ordered list of strings, edited as comma-separated text
    Multi,
}

/// Every action, assertion and output key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKey {
    // === Step actions ===
    Click,
    Input,
    Upload,
    Autocomplete,
    ToggleState,
    Checkbox,
    Date,
    Editor,
    MultiSelectCreate,
    #[serde(alias = "clickPerticularJobTitle")]
    ClickByTitle,

    // === Assertions ===
    Text,
    Contains,
    ArrayContains,

    // === Outputs ===
    #[serde(alias = "saveJobID")]
    SaveJobId,
}

/// Metadata for one key
#[derive(Debug, Clone)]
pub struct ActionMeta {
    pub key: ActionKey,
    /// Key as it appears in persisted JSON
    pub wire: &'static str,
    /// Human readable label for pickers
    pub label: &'static str,
    pub category: Category,
    pub shape: ValueShape,
}

impl ActionMeta {
    /// Whether a step with this key needs a free-form value
    pub fn needs_value(&self) -> bool {
        self.shape != ValueShape::None
    }
}

/// The table, in `ActionKey` declaration order
static ACTIONS: [ActionMeta; 14] = [
    ActionMeta {
        key: ActionKey::Click,
        wire: "click",
        label: "Click",
        category: Category::Step,
        shape: ValueShape::None,
    },
    ActionMeta {
        key: ActionKey::Input,
        wire: "input",
        label: "Enter text",
        category: Category::Step,
        shape: ValueShape::Single,
    },
    ActionMeta {
        key: ActionKey::Upload,
        wire: "upload",
        label: "Upload file",
        category: Category::Step,
        shape: ValueShape::Multi,
    },
    ActionMeta {
        key: ActionKey::Autocomplete,
        wire: "autocomplete",
        label: "Select from dropdown",
        category: Category::Step,
        shape: ValueShape::Single,
    },
    ActionMeta {
        key: ActionKey::ToggleState,
        wire: "toggleState",
        label: "Set toggle",
        category: Category::Step,
        shape: ValueShape::Single,
    },
    ActionMeta {
        key: ActionKey::Checkbox,
        wire: "checkbox",
        label: "Set checkbox",
        category: Category::Step,
        shape: ValueShape::Single,
    },
    ActionMeta {
        key: ActionKey::Date,
        wire: "date",
        label: "Select date",
        category: Category::Step,
        shape: ValueShape::Single,
    },
    ActionMeta {
        key: ActionKey::Editor,
        wire: "editor",
        label: "Fill editor",
        category: Category::Step,
        shape: ValueShape::Single,
    },
    ActionMeta {
        key: ActionKey::MultiSelectCreate,
        wire: "multiSelectCreate",
        label: "Select or create values",
        category: Category::Step,
        shape: ValueShape::Multi,
    },
    ActionMeta {
        key: ActionKey::ClickByTitle,
        wire: "clickByTitle",
        label: "Click job by ID",
        category: Category::Step,
        shape: ValueShape::Single,
    },
    ActionMeta {
        key: ActionKey::Text,
        wire: "text",
        label: "Verify exact text",
        category: Category::Assert,
        shape: ValueShape::Single,
    },
    ActionMeta {
        key: ActionKey::Contains,
        wire: "contains",
        label: "Verify contains text",
        category: Category::Assert,
        shape: ValueShape::Single,
    },
    ActionMeta {
        key: ActionKey::ArrayContains,
        wire: "arrayContains",
        label: "Verify list contains value",
        category: Category::Assert,
        shape: ValueShape::Single,
    },
    ActionMeta {
        key: ActionKey::SaveJobId,
        wire: "saveJobId",
        label: "Save Job ID from URL",
        category: Category::Output,
        shape: ValueShape::None,
    },
];

impl ActionKey {
    /// All keys in table order
    pub const ALL: [ActionKey; 14] = [
        ActionKey::Click,
        ActionKey::Input,
        ActionKey::Upload,
        ActionKey::Autocomplete,
        ActionKey::ToggleState,
        ActionKey::Checkbox,
        ActionKey::Date,
        ActionKey::Editor,
        ActionKey::MultiSelectCreate,
        ActionKey::ClickByTitle,
        ActionKey::Text,
        ActionKey::Contains,
        ActionKey::ArrayContains,
        ActionKey::SaveJobId,
    ];

    /// Look up the metadata entry for this key
    pub fn meta(self) -> &'static ActionMeta {
        &ACTIONS[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        self.meta().wire
    }

    pub fn label(self) -> &'static str {
        self.meta().label
    }

    pub fn category(self) -> Category {
        self.meta().category
    }

    pub fn value_shape(self) -> ValueShape {
        self.meta().shape
    }

    /// Whether steps with this key carry per-testcase data
    pub fn needs_value(self) -> bool {
        self.meta().needs_value()
    }

    /// Keys offered for a category, in table order
    pub fn for_category(category: Category) -> impl Iterator<Item = ActionKey> {
        ACTIONS
            .iter()
            .filter(move |m| m.category == category)
            .map(|m| m.key)
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = match s {
            "clickPerticularJobTitle" => "clickByTitle",
            "saveJobID" => "saveJobId",
            other => other,
        };
        ACTIONS
            .iter()
            .find(|m| m.wire == s)
            .map(|m| m.key)
            .ok_or_else(|| format!("Unknown action '{}'", s))
    }
}
