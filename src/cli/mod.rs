//! CLI command handling
//!
//! Dispatches CLI commands against the workspace file store and formats
//! output.

mod import;

use colored::Colorize;
use std::path::Path;
use tracing::warn;

use crate::commands::{
    Commands, DataCommands, GroupCommands, PageCommands, RunArgs, ScenarioCommands, StepCommands,
    StepFields, TestcaseCommands,
};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::editor::{Draft, FlowEditor, ScenarioBuilder};
use crate::model::{Group, RecordId, Scenario, ScenarioCatalog, Testcase};
use crate::pages::Page;
use crate::run::{RunRequest, RunSelector};
use crate::step::{describe_with, preview_with, ActionKey, Style};
use crate::store::{
    find_group, find_scenario, find_testcase, load_catalog, FileStore, GroupStore, PageCatalog,
    ScenarioStore, TestcaseStore,
};
use crate::testdata::{derive_columns, DataGrid};

pub use import::{parse_document, read_document};

/// Highlights element names and values in step sentences
struct Highlight;

impl Style for Highlight {
    fn element(&self, name: &str) -> String {
        name.cyan().bold().to_string()
    }

    fn value(&self, value: &str) -> String {
        value.yellow().to_string()
    }
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, workspace: &Path, config: &Config) -> Result<()> {
    match command {
        Commands::Actions { category } => {
            print_actions(category);
            Ok(())
        }
        Commands::Run(args) => {
            let request = build_run_request(args, config)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
            Ok(())
        }
        Commands::Page(cmd) => page_command(cmd, &FileStore::open(workspace).await?).await,
        Commands::Scenario(cmd) => {
            scenario_command(cmd, &FileStore::open(workspace).await?).await
        }
        Commands::Step(cmd) => step_command(cmd, &FileStore::open(workspace).await?).await,
        Commands::Testcase(cmd) => {
            testcase_command(cmd, &FileStore::open(workspace).await?).await
        }
        Commands::Data(cmd) => data_command(cmd, &FileStore::open(workspace).await?).await,
        Commands::Group(cmd) => group_command(cmd, &FileStore::open(workspace).await?).await,
    }
}

async fn page_command(cmd: PageCommands, store: &FileStore) -> Result<()> {
    match cmd {
        PageCommands::List => {
            let pages = store.list_pages().await?;
            if pages.is_empty() {
                println!("No pages");
            }
            for record in &pages {
                println!(
                    "  {} {}",
                    record.page.page.bold(),
                    format!("({} elements)", record.page.elements.len()).dimmed()
                );
            }
            Ok(())
        }

        PageCommands::Show { name, action } => {
            let page = store
                .get_page(&name)
                .await?
                .ok_or_else(|| Error::not_found("Page", &name))?;
            println!("{}", page.page.bold());
            for element in page.elements_for(action) {
                println!("  {:<24} {}", element.name, element.kind.to_string().dimmed());
                let missing = element.missing_fields();
                if !missing.is_empty() {
                    println!("    {} missing {}", "!".yellow(), missing.join(", "));
                }
            }
            Ok(())
        }

        PageCommands::Import { file } => {
            let page: Page = read_document(&file).await?;
            page.validate()?;
            let existing = store
                .list_pages()
                .await?
                .into_iter()
                .find(|r| r.page.page == page.page);
            match existing {
                Some(record) => {
                    store.update_page(record.id, &page).await?;
                    println!("{} Page {} updated", "✓".green(), page.page.bold());
                }
                None => {
                    store.create_page(&page).await?;
                    println!("{} Page {} created", "✓".green(), page.page.bold());
                }
            }
            Ok(())
        }
    }
}

async fn scenario_command(cmd: ScenarioCommands, store: &FileStore) -> Result<()> {
    match cmd {
        ScenarioCommands::List => {
            let scenarios = store.list_scenarios().await?;
            if scenarios.is_empty() {
                println!("No scenarios");
            }
            for record in &scenarios {
                let s = &record.scenario;
                println!(
                    "  {:<12} {} {}",
                    s.scenario_id.bold(),
                    s.name,
                    format!("({} steps)", s.flow.len()).dimmed()
                );
            }
            Ok(())
        }

        ScenarioCommands::Show { id } => {
            let record = find_scenario(store, &id).await?;
            print_scenario(&record.scenario);
            Ok(())
        }

        ScenarioCommands::New { id, name } => {
            let mut builder = ScenarioBuilder::new();
            builder.scenario_id = id;
            builder.name = name;
            builder.save(store).await?;
            println!(
                "{} Scenario {} created",
                "✓".green(),
                builder.scenario_id.bold()
            );
            Ok(())
        }

        ScenarioCommands::Rename { id, name } => {
            let mut builder = ScenarioBuilder::edit(find_scenario(store, &id).await?);
            builder.name = name;
            builder.save(store).await?;
            println!("{} Scenario {} renamed", "✓".green(), id.bold());
            Ok(())
        }

        ScenarioCommands::Import { file } => {
            let scenario: Scenario = read_document(&file).await?;
            let existing = store
                .list_scenarios()
                .await?
                .into_iter()
                .find(|r| r.scenario.scenario_id == scenario.scenario_id);

            let mut builder = match existing {
                Some(record) => ScenarioBuilder::edit(record),
                None => ScenarioBuilder::new(),
            };
            let verb = if builder.is_new() { "created" } else { "updated" };
            builder.scenario_id = scenario.scenario_id;
            builder.name = scenario.name;
            builder.editor = FlowEditor::with_flow(scenario.flow);
            builder.save(store).await?;
            println!(
                "{} Scenario {} {} ({} steps)",
                "✓".green(),
                builder.scenario_id.bold(),
                verb,
                builder.editor.len()
            );
            Ok(())
        }

        ScenarioCommands::Export { id } => {
            let record = find_scenario(store, &id).await?;
            print!("{}", serde_yaml::to_string(&record.scenario)?);
            Ok(())
        }
    }
}

async fn step_command(cmd: StepCommands, store: &FileStore) -> Result<()> {
    match cmd {
        StepCommands::Add {
            scenario,
            at,
            fields,
        } => {
            let mut builder = ScenarioBuilder::edit(find_scenario(store, &scenario).await?);
            if let Some(at) = at {
                builder.editor.start_insert(at)?;
            }
            apply_fields(builder.editor.draft_mut(), fields);
            warn_unknown_element(store, builder.editor.draft()).await?;

            let index = builder.editor.commit()?;
            builder.save(store).await?;
            println!(
                "{} {}. {}",
                "✓".green(),
                index,
                describe_with(&builder.editor.flow()[index], &Highlight)
            );
            Ok(())
        }

        StepCommands::Edit {
            scenario,
            index,
            fields,
        } => {
            let mut builder = ScenarioBuilder::edit(find_scenario(store, &scenario).await?);
            builder.editor.start_edit(index)?;
            apply_fields(builder.editor.draft_mut(), fields);
            if let Some(preview) = preview_with(builder.editor.draft(), &Highlight) {
                tracing::debug!(%preview, "edited step");
            }
            warn_unknown_element(store, builder.editor.draft()).await?;

            let index = builder.editor.commit()?;
            builder.save(store).await?;
            println!(
                "{} {}. {}",
                "✓".green(),
                index,
                describe_with(&builder.editor.flow()[index], &Highlight)
            );
            Ok(())
        }

        StepCommands::Remove { scenario, index } => {
            let mut builder = ScenarioBuilder::edit(find_scenario(store, &scenario).await?);
            let removed = builder.editor.remove(index)?;
            builder.save(store).await?;
            println!(
                "{} Removed: {}",
                "✓".green(),
                describe_with(&removed, &Highlight)
            );
            Ok(())
        }

        StepCommands::Move {
            scenario,
            from,
            to,
        } => {
            let mut builder = ScenarioBuilder::edit(find_scenario(store, &scenario).await?);
            builder.editor.move_step(from, to)?;
            builder.save(store).await?;
            print_scenario(&builder.scenario());
            Ok(())
        }
    }
}

/// Copy the given fields onto the draft
///
/// The category follows the action when only the action is given.
fn apply_fields(draft: &mut Draft, fields: StepFields) {
    if let Some(page) = fields.page {
        draft.page = page;
    }
    if let Some(category) = fields.category.or(fields.action.map(ActionKey::category)) {
        draft.category = category;
    }
    if let Some(action) = fields.action {
        draft.action = Some(action);
    }
    if let Some(element) = fields.element {
        draft.element = element;
    }
    if let Some(value) = fields.value {
        draft.value = value;
    }
    if let Some(key) = fields.key {
        draft.key = key;
    }
}

async fn warn_unknown_element(store: &dyn PageCatalog, draft: &Draft) -> Result<()> {
    if draft.element.is_empty() {
        return Ok(());
    }
    if let Some(page) = store.get_page(&draft.page).await? {
        if page.element(&draft.element).is_none() {
            warn!(page = %draft.page, element = %draft.element, "element is not declared on the page");
        }
    }
    Ok(())
}

async fn testcase_command(cmd: TestcaseCommands, store: &FileStore) -> Result<()> {
    match cmd {
        TestcaseCommands::List => {
            let testcases = store.list_testcases().await?;
            if testcases.is_empty() {
                println!("No testcases");
            }
            for tc in &testcases {
                let tags: Vec<&str> = tc.tags.iter().map(String::as_str).collect();
                println!(
                    "  {:<12} {} {}",
                    tc.testcase_id.bold(),
                    tc.name,
                    format!("[{}]", tags.join(", ")).dimmed()
                );
            }
            Ok(())
        }

        TestcaseCommands::Show { id } => {
            let testcase = find_testcase(store, &id).await?;
            let catalog = load_catalog(store).await?;
            print_testcase(&testcase, &catalog);
            Ok(())
        }

        TestcaseCommands::Create {
            id,
            name,
            tags,
            scenarios,
        } => {
            let catalog = load_catalog(store).await?;
            let mut testcase = Testcase::new(id.trim(), name.trim());
            testcase.set_tags(&tags);
            for scenario_id in scenarios {
                if catalog.resolve(&scenario_id).is_none() {
                    warn!(scenario = %scenario_id, "scenario does not exist yet");
                }
                testcase.add_scenario(scenario_id);
            }
            testcase.validate()?;
            store.create_testcase(&testcase).await?;
            println!(
                "{} Testcase {} created",
                "✓".green(),
                testcase.testcase_id.bold()
            );
            Ok(())
        }
    }
}

async fn open_grid(store: &FileStore, testcase_id: &str) -> Result<DataGrid> {
    let testcase = find_testcase(store, testcase_id).await?;
    let catalog = load_catalog(store).await?;
    DataGrid::load(&testcase, &catalog, store).await
}

/// Convert a 1-based row number from the command line
fn row_index(grid: &DataGrid, row: usize) -> Result<usize> {
    row.checked_sub(1)
        .filter(|&i| i < grid.row_count())
        .ok_or_else(|| Error::invalid_index(row, grid.row_count()))
}

async fn data_command(cmd: DataCommands, store: &FileStore) -> Result<()> {
    match cmd {
        DataCommands::Show { testcase } => {
            let grid = open_grid(store, &testcase).await?;
            print_grid(&grid);
            Ok(())
        }

        DataCommands::AddRow { testcase } => {
            let mut grid = open_grid(store, &testcase).await?;
            let index = grid.add_row();
            grid.save(store).await?;
            println!("{} Row {} added", "✓".green(), index + 1);
            Ok(())
        }

        DataCommands::RemoveRow { testcase, row } => {
            let mut grid = open_grid(store, &testcase).await?;
            let index = row_index(&grid, row)?;
            grid.remove_row(index)?;
            grid.save_all(store).await?;
            println!(
                "{} Row {} removed, active row is {}",
                "✓".green(),
                row,
                grid.active_row()
            );
            Ok(())
        }

        DataCommands::Set {
            testcase,
            row,
            column,
            value,
        } => {
            let mut grid = open_grid(store, &testcase).await?;
            let index = row_index(&grid, row)?;
            let col = grid
                .column_index(&column)
                .ok_or_else(|| Error::not_found("Column", &column))?;
            grid.set_cell(index, col, value)?;
            grid.save(store).await?;
            println!("{} {} updated in row {}", "✓".green(), column.bold(), row);
            Ok(())
        }

        DataCommands::Use { testcase, row } => {
            let mut grid = open_grid(store, &testcase).await?;
            grid.set_active_row(row)?;
            grid.save_active_row(store).await?;
            println!("{} Row {} will be used when {} runs", "✓".green(), row, testcase.bold());
            Ok(())
        }
    }
}

async fn group_command(cmd: GroupCommands, store: &FileStore) -> Result<()> {
    match cmd {
        GroupCommands::List => {
            let groups = store.list_groups().await?;
            if groups.is_empty() {
                println!("No groups");
            }
            for group in &groups {
                println!(
                    "  {:>3} {} {}",
                    group.group_id,
                    group.name.bold(),
                    format!("({} testcases)", group.testcase_ids.len()).dimmed()
                );
            }
            Ok(())
        }

        GroupCommands::Show { id } => {
            let group = find_group(store, RecordId(id)).await?;
            let testcases = store.list_testcases().await?;
            print_group(&group, &testcases);
            Ok(())
        }

        GroupCommands::Create { name, description } => {
            let id = store.create_group(&name, &description).await?;
            println!("{} Group {} created with ID {}", "✓".green(), name.trim().bold(), id);
            Ok(())
        }

        GroupCommands::Add { id, testcases } => {
            let group = find_group(store, RecordId(id)).await?;
            let known = store.list_testcases().await?;
            if let Some(missing) = testcases
                .iter()
                .find(|t| !known.iter().any(|k| &k.testcase_id == *t))
            {
                return Err(Error::not_found("Testcase", missing));
            }
            let added = store.add_testcases(group.group_id, &testcases).await?;
            println!(
                "{} {} testcases added to {}",
                "✓".green(),
                added,
                group.name.bold()
            );
            Ok(())
        }

        GroupCommands::Remove { id, testcase } => {
            let group = find_group(store, RecordId(id)).await?;
            if !store.remove_testcase(group.group_id, &testcase).await? {
                return Err(Error::not_found("Group member", &testcase));
            }
            println!(
                "{} {} removed from {}",
                "✓".green(),
                testcase.bold(),
                group.name.bold()
            );
            Ok(())
        }
    }
}

fn build_run_request(args: RunArgs, config: &Config) -> Result<RunRequest> {
    let selector = if let Some(ids) = args.ids {
        RunSelector::by_ids(&ids)
    } else if let Some(group_id) = args.group {
        RunSelector::ByGroup { group_id }
    } else if let Some(tag) = args.tag {
        RunSelector::ByTag { tag }
    } else if args.all {
        RunSelector::All
    } else {
        return Err(Error::InvalidState(
            "choose one of --ids, --group, --tag or --all".to_string(),
        ));
    };

    let browsers = if args.browsers.is_empty() {
        config.run.browsers.clone()
    } else {
        args.browsers
    };
    let request = RunRequest::new(
        selector,
        browsers,
        args.run_mode.unwrap_or(config.run.run_mode),
        args.view_mode.unwrap_or(config.run.view_mode),
    );
    request.validate()?;
    Ok(request)
}

fn print_actions(category: Option<crate::step::Category>) {
    let keys: Vec<ActionKey> = match category {
        Some(category) => ActionKey::for_category(category).collect(),
        None => ActionKey::ALL.to_vec(),
    };
    for key in keys {
        let value = if key.needs_value() { "value" } else { "" };
        println!(
            "  {:<20} {:<7} {:<28} {}",
            key.to_string().bold(),
            key.category(),
            key.label(),
            value.dimmed()
        );
    }
}

fn print_scenario(scenario: &Scenario) {
    println!("{} {}", scenario.scenario_id.bold(), scenario.name);
    if scenario.flow.is_empty() {
        println!("  {}", "No steps".dimmed());
    }
    for (i, step) in scenario.flow.iter().enumerate() {
        println!(
            "  {:>3}. {} {}",
            i,
            format!("[{}]", step.page()).dimmed(),
            describe_with(step, &Highlight)
        );
    }
}

fn print_group(group: &Group, testcases: &[Testcase]) {
    println!("{} {}", group.group_id, group.name.bold());
    if !group.description.is_empty() {
        println!("  {}", group.description);
    }
    if group.testcase_ids.is_empty() {
        println!("  {}", "No testcases in this group".dimmed());
    }
    for id in &group.testcase_ids {
        match testcases.iter().find(|t| &t.testcase_id == id) {
            Some(t) => println!("  {:<12} {}", id, t.name),
            None => println!("  {:<12} {}", id, "(missing)".red()),
        }
    }
}

fn print_testcase(testcase: &Testcase, catalog: &ScenarioCatalog) {
    println!("{} {}", testcase.testcase_id.bold(), testcase.name);
    if !testcase.tags.is_empty() {
        let tags: Vec<&str> = testcase.tags.iter().map(String::as_str).collect();
        println!("  Tags: {}", tags.join(", "));
    }

    println!("\n{}", "Scenarios:".cyan());
    for scenario_id in &testcase.scenarios {
        match catalog.resolve(scenario_id) {
            Some(s) => println!("  {:<12} {}", scenario_id, s.name),
            None => println!("  {:<12} {}", scenario_id, "(missing)".red()),
        }
    }

    let columns = derive_columns(testcase, catalog);
    println!("\n{}", "Data columns:".cyan());
    if columns.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for column in &columns {
        println!("  {:<12} {}", column.id.bold(), column.element);
    }
}

fn print_grid(grid: &DataGrid) {
    if grid.columns().is_empty() {
        println!("{}", "No steps of this testcase take data".dimmed());
        return;
    }
    let header: Vec<String> = grid
        .columns()
        .iter()
        .map(|c| format!("{} ({})", c.id, c.element))
        .collect();
    println!("     {}", header.join(" | ").bold());
    for (i, row) in grid.rows().iter().enumerate() {
        let marker = if i + 1 == grid.active_row() { "*" } else { " " };
        let values: Vec<&str> = row.iter().map(|c| c.value.as_str()).collect();
        println!("{}{:>3} {}", marker.green(), i + 1, values.join(" | "));
    }
}
