//! Run requests and run status tracking
//!
//! Only the request and status types live here. Executing testcases is the
//! job of whatever service implements [`RunDispatcher`].

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

use crate::common::{Error, Result, ValidationError};

/// Browser engine a run executes in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub const ALL: [Browser; 3] = [Browser::Chromium, Browser::Firefox, Browser::Webkit];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether testcases run one after another or concurrently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Serial,
    Parallel,
}

/// Whether browser windows are shown during the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Headed,
    Hidden,
}

/// Which testcases a run covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum RunSelector {
    ByIds { testcase_ids: Vec<String> },
    ByGroup { group_id: String },
    ByTag { tag: String },
    All,
}

impl RunSelector {
    /// Build an id selector from comma separated input
    pub fn by_ids(input: &str) -> Self {
        Self::ByIds {
            testcase_ids: crate::common::parse_comma_separated(input),
        }
    }

    fn validate(&self) -> std::result::Result<(), ValidationError> {
        match self {
            Self::ByIds { testcase_ids } if testcase_ids.is_empty() => {
                Err(ValidationError::EmptyField("Testcase IDs"))
            }
            Self::ByGroup { group_id } if group_id.trim().is_empty() => {
                Err(ValidationError::EmptyField("Group"))
            }
            Self::ByTag { tag } if tag.trim().is_empty() => Err(ValidationError::EmptyField("Tag")),
            _ => Ok(()),
        }
    }
}

/// Request body sent to start a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(flatten)]
    pub selector: RunSelector,
    #[serde(rename = "selectedBrowsers")]
    pub browsers: BTreeSet<Browser>,
    #[serde(rename = "runMode")]
    pub run_mode: RunMode,
    #[serde(rename = "viewMode")]
    pub view_mode: ViewMode,
    /// Start time in `DD-MM-YYYY_hh-mm-ss_AM` form
    pub time: String,
}

impl RunRequest {
    /// New request stamped with the current local time
    pub fn new(
        selector: RunSelector,
        browsers: impl IntoIterator<Item = Browser>,
        run_mode: RunMode,
        view_mode: ViewMode,
    ) -> Self {
        Self {
            selector,
            browsers: browsers.into_iter().collect(),
            run_mode,
            view_mode,
            time: run_timestamp(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.browsers.is_empty() {
            return Err(ValidationError::EmptyField("Browsers"));
        }
        self.selector.validate()
    }
}

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y_%I-%M-%S_%p";

/// Current local time as a run timestamp
pub fn run_timestamp() -> String {
    format_timestamp(Local::now().naive_local())
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Display form of a run timestamp: `DD-MM-YYYY hh:mm:ss AM`
///
/// Anything that is not three `_`-separated parts is returned as is.
pub fn format_run_time(time: &str) -> String {
    let parts: Vec<&str> = time.split('_').collect();
    match parts.as_slice() {
        [date, clock, period] => format!("{} {} {}", date, clock.replace('-', ":"), period),
        _ => time.to_string(),
    }
}

/// Status reported by the run service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Other(String),
}

impl RunState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Other(s) => s,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl From<String> for RunState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "" | "idle" => Self::Idle,
            "running" => Self::Running,
            _ => Self::Other(s),
        }
    }
}

impl From<RunState> for String {
    fn from(state: RunState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStatus {
    #[serde(default, with = "state_string")]
    pub status: RunState,
}

mod state_string {
    use super::RunState;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(state: &RunState, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(state.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<RunState, D::Error> {
        Option::<String>::deserialize(d).map(|s| s.map(RunState::from).unwrap_or_default())
    }
}

/// Testcase ids of a past run, either a list or a single string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RanTestcases {
    List(Vec<String>),
    Text(String),
}

impl RanTestcases {
    pub fn ids(&self) -> Vec<String> {
        match self {
            Self::List(ids) => ids.clone(),
            Self::Text(text) => vec![text.clone()],
        }
    }
}

/// One entry of the run history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRun {
    pub id: u64,
    #[serde(rename = "testcaserunmode", default)]
    pub selection: String,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(rename = "rantestcaseids", default)]
    pub testcases: Option<RanTestcases>,
    /// Comma separated browser list
    #[serde(rename = "selectedbrowsers", default)]
    pub browsers: String,
    #[serde(rename = "runmode", default)]
    pub run_mode: String,
    #[serde(rename = "reportname", default)]
    pub report_name: String,
}

impl TestRun {
    pub fn browser_list(&self) -> Vec<String> {
        crate::common::parse_comma_separated(&self.browsers)
    }

    /// Start time derived from the report name
    pub fn started(&self) -> String {
        format_run_time(&self.report_name)
    }
}

/// Service that executes runs and keeps their history
#[async_trait]
pub trait RunDispatcher: Send + Sync {
    async fn dispatch(&self, request: &RunRequest) -> Result<()>;

    async fn status(&self) -> Result<RunStatus>;

    async fn history(&self) -> Result<Vec<TestRun>>;

    async fn open_report(&self, report_name: &str) -> Result<()>;
}

/// Result of feeding one polled status to a [`RunWatcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Status differs from the previous poll
    pub changed: bool,
    /// A running run has just stopped
    pub finished: bool,
}

/// Tracks the last polled run status
#[derive(Debug, Clone, Default)]
pub struct RunWatcher {
    last: RunState,
}

impl RunWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RunState {
        &self.last
    }

    /// Refuse to start a run while one is in progress
    pub fn guard(&self) -> Result<()> {
        if self.last.is_running() {
            return Err(Error::InvalidState(
                "Please wait for the current run to finish".to_string(),
            ));
        }
        Ok(())
    }

    pub fn observe(&mut self, status: RunState) -> Observation {
        let observation = Observation {
            changed: status != self.last,
            finished: self.last.is_running() && !status.is_running(),
        };
        if observation.changed {
            debug!(from = %self.last, to = %status, "run status changed");
        }
        self.last = status;
        observation
    }

    /// Poll the dispatcher; the history is fetched only when a run finishes
    pub async fn poll(&mut self, dispatcher: &dyn RunDispatcher) -> Result<Option<Vec<TestRun>>> {
        let status = dispatcher.status().await?;
        if self.observe(status.status).finished {
            return dispatcher.history().await.map(Some);
        }
        Ok(None)
    }

    /// Validate and dispatch a request unless a run is in progress
    pub async fn submit(&self, dispatcher: &dyn RunDispatcher, request: &RunRequest) -> Result<()> {
        self.guard()?;
        request.validate()?;
        dispatcher.dispatch(request).await?;
        info!(time = %request.time, browsers = request.browsers.len(), "run dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeDispatcher {
        statuses: Mutex<Vec<&'static str>>,
        dispatched: Mutex<Vec<RunRequest>>,
        history_calls: Mutex<usize>,
    }

    #[async_trait]
    impl RunDispatcher for FakeDispatcher {
        async fn dispatch(&self, request: &RunRequest) -> Result<()> {
            self.dispatched.lock().unwrap().push(request.clone());
            Ok(())
        }

        async fn status(&self) -> Result<RunStatus> {
            let status = self.statuses.lock().unwrap().remove(0);
            Ok(RunStatus {
                status: RunState::from(status.to_string()),
            })
        }

        async fn history(&self) -> Result<Vec<TestRun>> {
            *self.history_calls.lock().unwrap() += 1;
            Ok(vec![])
        }

        async fn open_report(&self, _report_name: &str) -> Result<()> {
            Ok(())
        }
    }

    fn request(selector: RunSelector) -> RunRequest {
        RunRequest {
            selector,
            browsers: [Browser::Chromium].into_iter().collect(),
            run_mode: RunMode::Serial,
            view_mode: ViewMode::Headed,
            time: "05-03-2025_02-07-09_PM".into(),
        }
    }

    #[test]
    fn test_request_wire_shape() {
        let json = serde_json::to_value(request(RunSelector::by_ids("T1, T2,"))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "mode": "byIds",
                "testcase_ids": ["T1", "T2"],
                "selectedBrowsers": ["chromium"],
                "runMode": "serial",
                "viewMode": "headed",
                "time": "05-03-2025_02-07-09_PM",
            })
        );

        let all = serde_json::to_value(request(RunSelector::All)).unwrap();
        assert_eq!(all["mode"], "all");
        assert!(all.get("tag").is_none());
    }

    #[test]
    fn test_request_parses_group_mode() {
        let parsed: RunRequest = serde_json::from_str(
            r#"{"mode":"byGroup","group_id":"G1","selectedBrowsers":["firefox","webkit"],
                "runMode":"parallel","viewMode":"hidden","time":"x"}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.selector,
            RunSelector::ByGroup {
                group_id: "G1".into()
            }
        );
        assert_eq!(parsed.run_mode, RunMode::Parallel);
        assert_eq!(parsed.browsers.len(), 2);
    }

    #[test]
    fn test_validate_requires_browser_and_selection() {
        let mut req = request(RunSelector::ByTag { tag: " ".into() });
        assert_eq!(req.validate(), Err(ValidationError::EmptyField("Tag")));

        req.selector = RunSelector::by_ids(" , ");
        assert_eq!(req.validate(), Err(ValidationError::EmptyField("Testcase IDs")));

        req.selector = RunSelector::All;
        assert!(req.validate().is_ok());

        req.browsers.clear();
        assert_eq!(req.validate(), Err(ValidationError::EmptyField("Browsers")));
    }

    #[test]
    fn test_timestamp_format() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap();
        assert_eq!(format_timestamp(at), "05-03-2025_02-07-09_PM");
        assert_eq!(format_run_time("05-03-2025_02-07-09_PM"), "05-03-2025 02:07:09 PM");
        assert_eq!(format_run_time("report-7"), "report-7");
    }

    #[test]
    fn test_status_parses_unknown_and_missing() {
        let status: RunStatus = serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
        assert_eq!(status.status, RunState::Other("queued".into()));
        let status: RunStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(status.status, RunState::Idle);
    }

    #[test]
    fn test_watcher_reports_finish_once() {
        let mut watcher = RunWatcher::new();
        assert!(!watcher.observe(RunState::Idle).changed);

        let started = watcher.observe(RunState::Running);
        assert!(started.changed && !started.finished);
        assert!(watcher.guard().is_err());

        assert!(!watcher.observe(RunState::Running).changed);

        let done = watcher.observe(RunState::Idle);
        assert!(done.changed && done.finished);
        assert!(watcher.guard().is_ok());
        assert!(!watcher.observe(RunState::Idle).finished);
    }

    #[tokio::test]
    async fn test_poll_loads_history_on_finish_only() {
        let dispatcher = FakeDispatcher::default();
        *dispatcher.statuses.lock().unwrap() = vec!["idle", "running", "running", "idle"];
        let mut watcher = RunWatcher::new();

        let mut loaded = Vec::new();
        for _ in 0..4 {
            loaded.push(watcher.poll(&dispatcher).await.unwrap().is_some());
        }
        assert_eq!(loaded, vec![false, false, false, true]);
        assert_eq!(*dispatcher.history_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_submit_blocked_while_running() {
        let dispatcher = FakeDispatcher::default();
        let mut watcher = RunWatcher::new();
        watcher.observe(RunState::Running);

        let err = watcher
            .submit(&dispatcher, &request(RunSelector::All))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));

        watcher.observe(RunState::Idle);
        watcher
            .submit(&dispatcher, &request(RunSelector::All))
            .await
            .unwrap();
        assert_eq!(dispatcher.dispatched.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_history_entry_parses() {
        let run: TestRun = serde_json::from_str(
            r#"{"id":3,"testcaserunmode":"byTag","tag":"smoke","rantestcaseids":["T1","T2"],
                "selectedbrowsers":"chromium, firefox","runmode":"serial",
                "reportname":"05-03-2025_02-07-09_PM"}"#,
        )
        .unwrap();
        assert_eq!(run.browser_list(), vec!["chromium", "firefox"]);
        assert_eq!(run.testcases.unwrap().ids(), vec!["T1", "T2"]);
        assert_eq!(run.group_name, None);
    }
}
