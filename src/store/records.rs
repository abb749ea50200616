//! Collection updates shared by the store implementations
//!
//! Each function checks for conflicts before touching the collection, so a
//! rejected update leaves it unchanged.

use crate::common::{Error, Result};
use crate::model::{Group, RecordId, Scenario, ScenarioRecord, Testcase};
use crate::pages::{Page, PageRecord};
use crate::testdata::{Row, TestData};

fn next_id(ids: impl Iterator<Item = RecordId>) -> RecordId {
    RecordId(ids.map(|id| id.0).max().unwrap_or(0) + 1)
}

pub(crate) fn insert_scenario(
    records: &mut Vec<ScenarioRecord>,
    scenario: &Scenario,
) -> Result<RecordId> {
    if records
        .iter()
        .any(|r| r.scenario.scenario_id == scenario.scenario_id)
    {
        return Err(Error::conflict("Scenario", &scenario.scenario_id));
    }
    let id = next_id(records.iter().map(|r| r.id));
    records.push(ScenarioRecord {
        id,
        scenario: scenario.clone(),
    });
    Ok(id)
}

pub(crate) fn replace_scenario(
    records: &mut [ScenarioRecord],
    id: RecordId,
    scenario: &Scenario,
) -> Result<()> {
    if records
        .iter()
        .any(|r| r.id != id && r.scenario.scenario_id == scenario.scenario_id)
    {
        return Err(Error::conflict("Scenario", &scenario.scenario_id));
    }
    let record = records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| Error::not_found("Scenario record", &id.to_string()))?;
    record.scenario = scenario.clone();
    Ok(())
}

pub(crate) fn insert_page(records: &mut Vec<PageRecord>, page: &Page) -> Result<RecordId> {
    if records.iter().any(|r| r.page.page == page.page) {
        return Err(Error::conflict("Page", &page.page));
    }
    let id = next_id(records.iter().map(|r| r.id));
    records.push(PageRecord {
        id,
        page: page.clone(),
    });
    Ok(id)
}

pub(crate) fn replace_page(records: &mut [PageRecord], id: RecordId, page: &Page) -> Result<()> {
    if records.iter().any(|r| r.id != id && r.page.page == page.page) {
        return Err(Error::conflict("Page", &page.page));
    }
    let record = records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| Error::not_found("Page record", &id.to_string()))?;
    record.page = page.clone();
    Ok(())
}

pub(crate) fn insert_testcase(records: &mut Vec<Testcase>, testcase: &Testcase) -> Result<()> {
    if records
        .iter()
        .any(|t| t.testcase_id == testcase.testcase_id)
    {
        return Err(Error::conflict("Testcase", &testcase.testcase_id));
    }
    records.push(testcase.clone());
    Ok(())
}

pub(crate) fn insert_group(
    records: &mut Vec<Group>,
    name: &str,
    description: &str,
) -> Result<RecordId> {
    Group::validate_name(name)?;
    let name = name.trim();
    if records.iter().any(|g| g.name == name) {
        return Err(Error::conflict("Group", name));
    }
    let id = next_id(records.iter().map(|g| g.group_id));
    records.push(Group::new(id, name, description.trim()));
    Ok(id)
}

fn group_mut(records: &mut [Group], id: RecordId) -> Result<&mut Group> {
    records
        .iter_mut()
        .find(|g| g.group_id == id)
        .ok_or_else(|| Error::not_found("Group", &id.to_string()))
}

pub(crate) fn add_group_testcases(
    records: &mut [Group],
    id: RecordId,
    testcase_ids: &[String],
) -> Result<usize> {
    Ok(group_mut(records, id)?.add_testcases(testcase_ids))
}

pub(crate) fn remove_group_testcase(
    records: &mut [Group],
    id: RecordId,
    testcase_id: &str,
) -> Result<bool> {
    Ok(group_mut(records, id)?.remove_testcase(testcase_id))
}

pub(crate) fn with_rows(existing: Option<TestData>, testcase_id: &str, rows: &[Row]) -> TestData {
    let mut data = existing.unwrap_or_else(|| TestData::new(testcase_id));
    data.rows = rows.to_vec();
    data
}

pub(crate) fn with_active_row(existing: Option<TestData>, testcase_id: &str, row: usize) -> TestData {
    let mut data = existing.unwrap_or_else(|| TestData::new(testcase_id));
    data.active_row = row;
    data
}
