//! Transition edges between states.

use super::error::DefinitionError;
use crate::side_quest::RETURN_TO_PREVIOUS_STATE;
use serde::{Deserialize, Serialize};

/// An edge keyed by event name.
///
/// Several transitions of one state may share an event; they are then tried
/// in declaration order and the first whose guards all pass wins.
///
/// # Example
///
/// ```rust
/// use machina::core::Transition;
///
/// let transition = Transition::new("pay", "paid")
///     .guard("hasFunds")
///     .action("chargeCard")
///     .auto_event("ship");
///
/// assert_eq!(transition.conditions, vec!["hasFunds"]);
/// assert_eq!(transition.auto_event.as_deref(), Some("ship"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// Triggering event name.
    pub event: String,

    /// Statically configured target. May be overridden at runtime through
    /// the `__next_state_override` data-bag key.
    #[serde(default)]
    pub target: String,

    /// Guard names, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,

    /// Action names, executed in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,

    /// Event the caller should fire after this transition succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_event: Option<String>,
}

impl Transition {
    pub fn new(event: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// A transition with no static target that returns to the state on top
    /// of the workflow stack.
    pub fn return_to_previous(event: impl Into<String>) -> Self {
        Self::new(event, "").action(RETURN_TO_PREVIOUS_STATE)
    }

    pub fn guard(mut self, name: impl Into<String>) -> Self {
        self.conditions.push(name.into());
        self
    }

    pub fn action(mut self, name: impl Into<String>) -> Self {
        self.actions.push(name.into());
        self
    }

    pub fn auto_event(mut self, event: impl Into<String>) -> Self {
        self.auto_event = Some(event.into());
        self
    }

    /// The auto-chained event, if one is configured. An empty name counts as
    /// none.
    pub fn chained_event(&self) -> Option<&str> {
        self.auto_event.as_deref().filter(|event| !event.is_empty())
    }

    /// Whether one of the actions always supplies a target override.
    pub fn has_dynamic_target(&self) -> bool {
        self.actions.iter().any(|a| a == RETURN_TO_PREVIOUS_STATE)
    }

    pub(crate) fn validate(&self, state: &str) -> Result<(), DefinitionError> {
        if self.event.is_empty() {
            return Err(DefinitionError::MissingEvent {
                state: state.to_string(),
            });
        }

        if self.target.is_empty() && !self.has_dynamic_target() {
            return Err(DefinitionError::MissingTarget {
                state: state.to_string(),
                event: self.event.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_target_requires_return_action() {
        let plain = Transition::new("back", "");
        assert!(matches!(
            plain.validate("s"),
            Err(DefinitionError::MissingTarget { event, .. }) if event == "back"
        ));

        let returning = Transition::return_to_previous("back");
        assert!(returning.has_dynamic_target());
        assert!(returning.validate("s").is_ok());
    }

    #[test]
    fn missing_event_is_rejected() {
        let transition = Transition::new("", "b");
        assert!(matches!(
            transition.validate("a"),
            Err(DefinitionError::MissingEvent { .. })
        ));
    }

    #[test]
    fn deserializes_document_field_names() {
        let transition: Transition = serde_json::from_str(
            r#"{
                "event": "go",
                "target": "end",
                "conditions": ["ready"],
                "actions": ["log", "charge"],
                "autoEvent": "next"
            }"#,
        )
        .unwrap();

        assert_eq!(transition.event, "go");
        assert_eq!(transition.target, "end");
        assert_eq!(transition.conditions, vec!["ready"]);
        assert_eq!(transition.actions, vec!["log", "charge"]);
        assert_eq!(transition.auto_event.as_deref(), Some("next"));
    }

    #[test]
    fn empty_auto_event_is_not_chained() {
        let transition: Transition =
            serde_json::from_str(r#"{"event": "go", "target": "end", "autoEvent": ""}"#).unwrap();
        assert_eq!(transition.chained_event(), None);

        let transition = Transition::new("go", "end").auto_event("next");
        assert_eq!(transition.chained_event(), Some("next"));
    }

    #[test]
    fn optional_lists_default_to_empty() {
        let transition: Transition =
            serde_json::from_str(r#"{"event": "go", "target": "end"}"#).unwrap();

        assert!(transition.conditions.is_empty());
        assert!(transition.actions.is_empty());
        assert!(transition.auto_event.is_none());
    }
}
