//! Builder for constructing workflow definitions.

use crate::builder::error::BuildError;
use crate::core::{DefinitionError, State, WorkflowDefinition};
use std::collections::BTreeMap;

/// Fluent construction of a validated [`WorkflowDefinition`].
///
/// Unlike [`WorkflowDefinition::with_state`], adding two states with the same
/// name is an error rather than a silent replacement.
#[derive(Debug, Default)]
pub struct WorkflowBuilder {
    states: Vec<State>,
    initial: Option<String>,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial state (optional).
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Add a state.
    pub fn state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Add multiple states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = State>) -> Self {
        self.states.extend(states);
        self
    }

    /// Build and validate the definition.
    pub fn build(self) -> Result<WorkflowDefinition, BuildError> {
        let mut states = BTreeMap::new();
        for state in self.states {
            if states.contains_key(&state.name) {
                return Err(DefinitionError::DuplicateState(state.name).into());
            }
            states.insert(state.name.clone(), state);
        }

        let definition = WorkflowDefinition {
            states,
            initial_state: self.initial,
        };
        definition.validate()?;
        Ok(definition)
    }
}
