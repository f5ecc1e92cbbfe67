//! State definitions for workflow graphs.
//!
//! A state is a named node carrying ordered entry and exit callback names
//! and its outgoing transitions. States are plain data: behavior lives in
//! the [`Registry`](crate::registry::Registry) under the names listed here.

use super::error::DefinitionError;
use super::transition::Transition;
use serde::{Deserialize, Serialize};

/// A named node in a workflow definition.
///
/// # Example
///
/// ```rust
/// use machina::core::{State, Transition};
///
/// let state = State::new("review")
///     .on_enter("notifyReviewer")
///     .on_leave("recordReviewTime")
///     .transition(Transition::new("approve", "published"))
///     .transition(Transition::new("reject", "draft"));
///
/// assert_eq!(state.name, "review");
/// assert_eq!(state.transitions_for("approve").count(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// Unique state name. Must equal the key it is stored under.
    pub name: String,

    /// Callbacks executed, in order, when the state is entered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_enter: Vec<String>,

    /// Callbacks executed, in order, when the state is left.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_leave: Vec<String>,

    /// Outgoing transitions in declaration (priority) order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,

    /// Marks a diversion ("side quest") state. Informational only.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_side_quest: bool,
}

impl State {
    /// Create an empty state with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append an entry callback.
    pub fn on_enter(mut self, action: impl Into<String>) -> Self {
        self.on_enter.push(action.into());
        self
    }

    /// Append an exit callback.
    pub fn on_leave(mut self, action: impl Into<String>) -> Self {
        self.on_leave.push(action.into());
        self
    }

    /// Append an outgoing transition.
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Mark this state as a side-quest state.
    pub fn side_quest(mut self) -> Self {
        self.is_side_quest = true;
        self
    }

    /// Transitions triggered by `event`, in declaration order.
    pub fn transitions_for<'a>(&'a self, event: &'a str) -> impl Iterator<Item = &'a Transition> {
        self.transitions.iter().filter(move |t| t.event == event)
    }

    /// Check the state's own invariants and those of its transitions.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::UnnamedState);
        }

        self.transitions
            .iter()
            .try_for_each(|transition| transition.validate(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_preserve_declaration_order() {
        let state = State::new("a")
            .on_enter("first")
            .on_enter("second")
            .on_leave("bye")
            .transition(Transition::new("go", "b"))
            .transition(Transition::new("go", "c"));

        assert_eq!(state.on_enter, vec!["first", "second"]);
        assert_eq!(state.on_leave, vec!["bye"]);

        let targets: Vec<_> = state.transitions_for("go").map(|t| t.target.as_str()).collect();
        assert_eq!(targets, vec!["b", "c"]);
    }

    #[test]
    fn transitions_for_skips_other_events() {
        let state = State::new("a")
            .transition(Transition::new("go", "b"))
            .transition(Transition::new("stop", "c"));

        assert_eq!(state.transitions_for("stop").count(), 1);
        assert_eq!(state.transitions_for("missing").count(), 0);
    }

    #[test]
    fn unnamed_state_is_rejected() {
        let state = State::new("");
        assert!(matches!(state.validate(), Err(DefinitionError::UnnamedState)));
    }

    #[test]
    fn invalid_transition_fails_state_validation() {
        let state = State::new("a").transition(Transition::new("", "b"));

        assert!(matches!(
            state.validate(),
            Err(DefinitionError::MissingEvent { state }) if state == "a"
        ));
    }

    #[test]
    fn side_quest_flag_defaults_to_false() {
        let state: State = serde_json::from_str(r#"{"name": "a"}"#).unwrap();
        assert!(!state.is_side_quest);
        assert!(state.transitions.is_empty());

        let state: State = serde_json::from_str(r#"{"name": "b", "isSideQuest": true}"#).unwrap();
        assert!(state.is_side_quest);
    }
}
