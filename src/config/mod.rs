//! Loading workflow definitions from YAML or JSON documents.
//!
//! The document shape:
//!
//! ```yaml
//! initialState: start
//! states:
//!   start:
//!     name: start
//!     onLeave: [logStart]
//!     transitions:
//!       - event: validate
//!         target: processing
//!         conditions: [isUserValid]
//!         actions: [chargePayment]
//!         autoEvent: process
//!   processing:
//!     name: processing
//!     isSideQuest: false
//! ```
//!
//! Every loader validates the definition before returning it.

mod error;

pub use error::ConfigError;

use crate::core::WorkflowDefinition;
use std::path::Path;
use tracing::debug;

/// Parse and validate a YAML workflow document.
pub fn from_yaml_str(document: &str) -> Result<WorkflowDefinition, ConfigError> {
    let definition: WorkflowDefinition = serde_yaml::from_str(document)?;
    definition.validate()?;
    Ok(definition)
}

/// Parse and validate a JSON workflow document.
pub fn from_json_str(document: &str) -> Result<WorkflowDefinition, ConfigError> {
    let definition: WorkflowDefinition = serde_json::from_str(document)?;
    definition.validate()?;
    Ok(definition)
}

/// Load a workflow file, choosing the format from its extension
/// (`.yaml`/`.yml` or `.json`).
pub fn load_workflow(path: impl AsRef<Path>) -> Result<WorkflowDefinition, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let parse = match extension.as_deref() {
        Some("yaml" | "yml") => from_yaml_str,
        Some("json") => from_json_str,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let definition = parse(&document)?;
    debug!(path = %path.display(), states = definition.states.len(), "Loaded workflow definition");
    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DefinitionError;
    use std::io::Write;

    const WORKFLOW_YAML: &str = r#"
initialState: start
states:
  start:
    name: start
    onLeave: [logStart]
    transitions:
      - event: validate
        target: processing
        conditions: [isUserValid]
        actions: [chargePayment, sendReceipt]
        autoEvent: process
  processing:
    name: processing
    onEnter: [logProcessing]
    transitions:
      - event: process
        target: complete
  complete:
    name: complete
"#;

    #[test]
    fn parses_yaml_document() {
        let definition = from_yaml_str(WORKFLOW_YAML).unwrap();

        assert_eq!(definition.initial_state.as_deref(), Some("start"));
        let start = definition.state("start").unwrap();
        assert_eq!(start.on_leave, vec!["logStart"]);

        let transition = &start.transitions[0];
        assert_eq!(transition.event, "validate");
        assert_eq!(transition.target, "processing");
        assert_eq!(transition.conditions, vec!["isUserValid"]);
        assert_eq!(transition.actions, vec!["chargePayment", "sendReceipt"]);
        assert_eq!(transition.auto_event.as_deref(), Some("process"));
    }

    #[test]
    fn parses_side_quest_flag() {
        let definition = from_yaml_str(
            r#"
states:
  C:
    name: C
    transitions:
      - event: sideQuestB
        target: "B#"
        actions: [recordPreviousState]
  "B#":
    name: "B#"
    isSideQuest: true
    transitions:
      - event: return
        target: ""
        actions: [__RETURN_TO_PREVIOUS_STATE__]
"#,
        )
        .unwrap();

        assert!(definition.state("B#").unwrap().is_side_quest);
        assert!(!definition.state("C").unwrap().is_side_quest);
    }

    #[test]
    fn invalid_yaml_is_reported() {
        let result = from_yaml_str("states: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn loaded_definitions_are_validated() {
        let result = from_yaml_str(
            r#"
states:
  start:
    name: begin
"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Definition(DefinitionError::NameMismatch { .. }))
        ));
    }

    #[test]
    fn parses_json_document() {
        let definition = from_json_str(
            r#"{"states": {"a": {"name": "a", "transitions": [{"event": "go", "target": "a"}]}}}"#,
        )
        .unwrap();
        assert_eq!(definition.state("a").unwrap().transitions.len(), 1);
    }

    #[test]
    fn loads_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(WORKFLOW_YAML.as_bytes()).unwrap();

        let definition = load_workflow(file.path()).unwrap();
        assert_eq!(definition.states.len(), 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_workflow("/nonexistent/workflow.yaml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let result = load_workflow("workflow.toml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
