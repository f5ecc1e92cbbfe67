//! Workflow definition model.
//!
//! This module contains the static shape of a workflow:
//! - `WorkflowDefinition`: every state, keyed by name
//! - `State`: entry/exit callback names and outgoing transitions
//! - `Transition`: event, target, guards, actions and auto-chained event
//! - `DataBag`: the dynamically typed payload carried through a transition
//!
//! Everything here is plain data plus structural validation. Nothing in this
//! module executes callbacks.

mod definition;
mod error;
mod state;
mod transition;

pub use definition::WorkflowDefinition;
pub use error::DefinitionError;
pub use state::State;
pub use transition::Transition;

/// String-keyed, dynamically typed payload passed through a transition.
///
/// Callbacks read fields with explicit checked downcasts
/// (`as_str`, `as_array`, `as_f64`, ...).
pub type DataBag = serde_json::Map<String, serde_json::Value>;
