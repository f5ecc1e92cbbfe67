//! Structural errors in workflow definitions.

use thiserror::Error;

/// Errors found while validating a [`WorkflowDefinition`](super::WorkflowDefinition).
///
/// These are fatal: a definition that fails validation never produces a
/// usable state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Workflow must have at least one state")]
    Empty,

    #[error("State key '{key}' does not match state name '{name}'")]
    NameMismatch { key: String, name: String },

    #[error("State must have a name")]
    UnnamedState,

    #[error("Initial state '{0}' not found in states")]
    MissingInitialState(String),

    #[error("Transition in state '{state}' must have an event")]
    MissingEvent { state: String },

    #[error("Transition for event '{event}' in state '{state}' must have a target state")]
    MissingTarget { state: String, event: String },

    #[error("State '{0}' is defined more than once")]
    DuplicateState(String),
}
