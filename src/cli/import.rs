//! Reading scenario and page documents from disk
//!
//! Files ending in `.yaml` or `.yml` are parsed as YAML, everything else as
//! JSON.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::common::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Format {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            Format::Yaml
        }
        _ => Format::Json,
    }
}

/// Parse `content` in the format implied by `path`
pub fn parse_document<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    match format_of(path) {
        Format::Yaml => Ok(serde_yaml::from_str(content)?),
        Format::Json => Ok(serde_json::from_str(content)?),
    }
}

/// Read and parse a document
pub async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
    parse_document(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Scenario;
    use crate::step::{describe, Step};

    #[test]
    fn test_yaml_scenario_with_legacy_keys() {
        let yaml = r#"
scenario_id: S1
name: Apply
flow:
  - type: step
    page: Jobs
    action: clickPerticularJobTitle
    element: title
    data: "42"
  - type: output
    page: Jobs
    action: saveJobID
    key: jobId
"#;
        let scenario: Scenario = parse_document(Path::new("apply.yml"), yaml).unwrap();
        assert_eq!(scenario.flow.len(), 2);
        assert_eq!(
            describe(&scenario.flow[1]),
            "Store the Job ID into the variable jobId"
        );
        assert!(matches!(scenario.flow[0], Step::Action(_)));
    }

    #[test]
    fn test_json_is_the_default() {
        let json = r#"{"scenario_id":"S1","name":"Empty","flow":[]}"#;
        let scenario: Scenario = parse_document(Path::new("s1.txt"), json).unwrap();
        assert!(scenario.flow.is_empty());

        let err = parse_document::<Scenario>(Path::new("s1.json"), "scenario_id: S1").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_invalid_step_is_rejected() {
        let yaml = r#"
scenario_id: S1
name: Broken
flow:
  - type: step
    page: Login
    action: input
    element: ""
    data: x
"#;
        let err = parse_document::<Scenario>(Path::new("s.yaml"), yaml).unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }
}
