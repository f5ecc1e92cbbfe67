//! The workflow definition: every state of one machine.

use super::error::DefinitionError;
use super::state::State;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All states of a workflow, keyed by name, with an optional initial state.
///
/// A definition is plain data until [`validate`](Self::validate) succeeds;
/// after that it is treated as read-only and shared across all executions.
///
/// # Example
///
/// ```rust
/// use machina::core::{State, Transition, WorkflowDefinition};
///
/// let definition = WorkflowDefinition::new()
///     .with_state(State::new("start").transition(Transition::new("go", "end")))
///     .with_state(State::new("end"))
///     .with_initial_state("start");
///
/// assert!(definition.validate().is_ok());
/// assert_eq!(definition.initial_state.as_deref(), Some("start"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// States keyed by their name.
    #[serde(default)]
    pub states: BTreeMap<String, State>,

    /// Optional entry point of the workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<String>,
}

impl WorkflowDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a state under its own name, replacing any previous state of
    /// that name.
    pub fn with_state(mut self, state: State) -> Self {
        self.states.insert(state.name.clone(), state);
        self
    }

    pub fn with_initial_state(mut self, name: impl Into<String>) -> Self {
        self.initial_state = Some(name.into());
        self
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }

    /// Check the structural invariants of the definition.
    ///
    /// Succeeds iff the definition has at least one state, the initial state
    /// (when set) exists, every state is stored under its own name, and every
    /// state and transition is well formed.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.states.is_empty() {
            return Err(DefinitionError::Empty);
        }

        if let Some(initial) = self.initial_state.as_deref().filter(|s| !s.is_empty()) {
            if !self.states.contains_key(initial) {
                return Err(DefinitionError::MissingInitialState(initial.to_string()));
            }
        }

        for (key, state) in &self.states {
            if *key != state.name {
                return Err(DefinitionError::NameMismatch {
                    key: key.clone(),
                    name: state.name.clone(),
                });
            }
            state.validate()?;
        }

        Ok(())
    }
}
