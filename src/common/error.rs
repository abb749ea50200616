//! Error types for the scenario authoring engine
//!
//! Validation problems are kept in their own enum so the editor can report
//! exactly which draft field is missing without going through the
//! crate-wide [`Error`].

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// A required field is missing from a draft, scenario, testcase or page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Select an action before adding the step")]
    MissingAction,

    #[error("Select an element for the step")]
    MissingElement,

    #[error("Enter a value for the step")]
    MissingValue,

    #[error("Please enter at least one value separated by commas")]
    MissingValues,

    #[error("Enter an output key")]
    MissingKey,

    #[error("Select a page for the step")]
    MissingPage,

    #[error("Action '{action}' is not available for category '{category}'")]
    ActionNotInCategory { action: String, category: String },

    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("Add at least one element")]
    NoElements,
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // === Authoring Errors ===
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Index {index} is out of range for {len} entries")]
    InvalidIndex { index: usize, len: usize },

    #[error("Row {row} does not exist; choose a row between 1 and {rows}")]
    InvalidActiveRow { row: usize, rows: usize },

    #[error("Invalid editor state: {0}")]
    InvalidState(String),

    // === Collaborator Errors ===
    #[error("{kind} '{id}' already exists")]
    Conflict { kind: &'static str, id: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Store request failed: {0}")]
    Transport(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a conflict error for a duplicate identifier
    pub fn conflict(kind: &'static str, id: &str) -> Self {
        Self::Conflict {
            kind,
            id: id.to_string(),
        }
    }

    /// Create a not-found error for an unknown identifier
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create an index error
    pub fn invalid_index(index: usize, len: usize) -> Self {
        Self::InvalidIndex { index, len }
    }

    /// Whether this error is a validation failure that never reached a store
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message() {
        let err = Error::conflict("Scenario", "login");
        assert_eq!(err.to_string(), "Scenario 'login' already exists");
    }

    #[test]
    fn test_validation_is_transparent() {
        let err: Error = ValidationError::MissingKey.into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Enter an output key");
    }
}
