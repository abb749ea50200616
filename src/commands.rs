//! CLI command definitions
//!
//! Defines the clap commands for the autotest CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::run::{Browser, RunMode, ViewMode};
use crate::step::{ActionKey, Category};

#[derive(Subcommand)]
pub enum Commands {
    /// Page and element catalog
    #[command(subcommand)]
    Page(PageCommands),

    /// Scenario management
    #[command(subcommand, alias = "sc")]
    Scenario(ScenarioCommands),

    /// Edit the flow of a saved scenario
    #[command(subcommand)]
    Step(StepCommands),

    /// Testcase management
    #[command(subcommand, alias = "tc")]
    Testcase(TestcaseCommands),

    /// Test data rows of a testcase
    #[command(subcommand)]
    Data(DataCommands),

    /// Testcase groups that can be run together
    #[command(subcommand)]
    Group(GroupCommands),

    /// List the available step, assertion and output keys
    Actions {
        /// Only keys of this category (step, assert, output)
        #[arg(long)]
        category: Option<Category>,
    },

    /// Build a run request and print its JSON body
    Run(RunArgs),
}

#[derive(Subcommand)]
pub enum PageCommands {
    /// List pages
    List,

    /// Show the elements of a page
    Show {
        /// Page name
        name: String,

        /// Only elements usable with this action
        #[arg(long)]
        action: Option<ActionKey>,
    },

    /// Create or replace a page from a YAML or JSON file
    Import {
        /// File holding one page
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ScenarioCommands {
    /// List scenarios
    List,

    /// Show the steps of a scenario as sentences
    Show {
        /// Scenario ID
        id: String,
    },

    /// Create an empty scenario
    New {
        /// Scenario ID
        id: String,

        /// Scenario name
        name: String,
    },

    /// Rename a scenario
    Rename {
        /// Scenario ID
        id: String,

        /// New name
        name: String,
    },

    /// Create or replace a scenario from a YAML or JSON file
    Import {
        /// File holding one scenario
        file: PathBuf,
    },

    /// Print a scenario as YAML
    Export {
        /// Scenario ID
        id: String,
    },
}

/// Fields of the step being added or edited
#[derive(Args, Debug, Default)]
pub struct StepFields {
    /// Page the element belongs to
    #[arg(long)]
    pub page: Option<String>,

    /// Step category (step, assert, output)
    #[arg(long)]
    pub category: Option<Category>,

    /// Action, assertion or output key
    #[arg(long, short)]
    pub action: Option<ActionKey>,

    /// Element name
    #[arg(long, short)]
    pub element: Option<String>,

    /// Data or expected value; comma separated for multi-value actions
    #[arg(long)]
    pub value: Option<String>,

    /// Variable name for output steps
    #[arg(long, short)]
    pub key: Option<String>,
}

#[derive(Subcommand)]
pub enum StepCommands {
    /// Append a step, or insert it before an index with --at
    Add {
        /// Scenario ID
        scenario: String,

        /// Insert before this step (0-based)
        #[arg(long)]
        at: Option<usize>,

        #[command(flatten)]
        fields: StepFields,
    },

    /// Change fields of an existing step
    Edit {
        /// Scenario ID
        scenario: String,

        /// Step index (0-based)
        index: usize,

        #[command(flatten)]
        fields: StepFields,
    },

    /// Remove a step
    #[command(alias = "rm")]
    Remove {
        /// Scenario ID
        scenario: String,

        /// Step index (0-based)
        index: usize,
    },

    /// Move a step to another position
    #[command(alias = "mv")]
    Move {
        /// Scenario ID
        scenario: String,

        /// Current index (0-based)
        from: usize,

        /// New index (0-based)
        to: usize,
    },
}

#[derive(Subcommand)]
pub enum TestcaseCommands {
    /// List testcases
    List,

    /// Show a testcase with its scenarios and data columns
    Show {
        /// Testcase ID
        id: String,
    },

    /// Create a testcase
    Create {
        /// Testcase ID
        id: String,

        /// Testcase name
        name: String,

        /// Comma separated tags
        #[arg(long, default_value = "")]
        tags: String,

        /// Scenario to include; can be given multiple times
        #[arg(long = "scenario", short = 's')]
        scenarios: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum DataCommands {
    /// Show the data grid
    Show {
        /// Testcase ID
        testcase: String,
    },

    /// Append an empty row
    AddRow {
        /// Testcase ID
        testcase: String,
    },

    /// Remove a row (1-based)
    RemoveRow {
        /// Testcase ID
        testcase: String,

        /// Row number
        row: usize,
    },

    /// Set one cell
    Set {
        /// Testcase ID
        testcase: String,

        /// Row number (1-based)
        row: usize,

        /// Column ID, e.g. S1_2
        column: String,

        /// New value
        value: String,
    },

    /// Choose the row used when the testcase runs (1-based)
    Use {
        /// Testcase ID
        testcase: String,

        /// Row number
        row: usize,
    },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// List groups
    List,

    /// Show the testcases of a group
    Show {
        /// Group ID
        id: u64,
    },

    /// Create a group
    Create {
        /// Group name
        name: String,

        /// What the group is for
        #[arg(long, short, default_value = "")]
        description: String,
    },

    /// Add testcases to a group
    Add {
        /// Group ID
        id: u64,

        /// Testcase IDs
        #[arg(required = true)]
        testcases: Vec<String>,
    },

    /// Remove a testcase from a group
    #[command(alias = "rm")]
    Remove {
        /// Group ID
        id: u64,

        /// Testcase ID
        testcase: String,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Comma separated testcase IDs
    #[arg(long, conflicts_with_all = ["group", "tag", "all"])]
    pub ids: Option<String>,

    /// Group ID, as shown by `group list`
    #[arg(long, conflicts_with_all = ["tag", "all"])]
    pub group: Option<String>,

    /// Tag
    #[arg(long, conflicts_with = "all")]
    pub tag: Option<String>,

    /// Every testcase
    #[arg(long)]
    pub all: bool,

    /// Browser; can be given multiple times (defaults from config)
    #[arg(long = "browser", short = 'b', value_enum)]
    pub browsers: Vec<Browser>,

    /// Run mode (defaults from config)
    #[arg(long, value_enum)]
    pub run_mode: Option<RunMode>,

    /// View mode (defaults from config)
    #[arg(long, value_enum)]
    pub view_mode: Option<ViewMode>,
}
