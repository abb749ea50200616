//! Configuration file handling

use serde::Deserialize;
use std::path::PathBuf;

use super::paths::{config_path, default_workspace_dir};
use super::Result;
use crate::run::{Browser, RunMode, ViewMode};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Where the file store keeps its documents
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Defaults applied to run requests
    #[serde(default)]
    pub run: RunDefaults,
}

/// Workspace settings
#[derive(Debug, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory holding pages, scenarios, testcases and test data
    #[serde(default = "default_workspace_dir")]
    pub dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: default_workspace_dir(),
        }
    }
}

/// Default run request settings
#[derive(Debug, Deserialize)]
pub struct RunDefaults {
    /// Browsers used when none are given on the command line
    #[serde(default = "default_browsers")]
    pub browsers: Vec<Browser>,

    #[serde(default)]
    pub run_mode: RunMode,

    #[serde(default)]
    pub view_mode: ViewMode,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            browsers: default_browsers(),
            run_mode: RunMode::default(),
            view_mode: ViewMode::default(),
        }
    }
}

fn default_browsers() -> Vec<Browser> {
    vec![Browser::Chromium]
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    super::Error::FileRead {
                        path: path.display().to_string(),
                        error: e.to_string(),
                    }
                })?;
                return Self::parse(&content);
            }
        }
        Ok(Self::default())
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}
