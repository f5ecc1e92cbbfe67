//! Side quests: temporary diversions with a stack of return addresses.
//!
//! The data bag may carry a [`WORKFLOW_STACK`] entry: an array of state
//! names used last-in-first-out. Before diverting, a user action pushes the
//! current state (see [`push_return_state`]). The diversion's way back is a
//! transition with an empty target and the built-in
//! [`RETURN_TO_PREVIOUS_STATE`] action, which pops the stack and sets
//! [`NEXT_STATE_OVERRIDE`] so the engine jumps back to the popped state.
//!
//! ```rust
//! use machina::core::{State, Transition};
//!
//! let detour = State::new("inspect")
//!     .side_quest()
//!     .transition(Transition::return_to_previous("done"));
//!
//! assert!(detour.transitions[0].target.is_empty());
//! ```

use crate::context::ExecutionContext;
use crate::core::DataBag;
use crate::registry::CallbackError;
use serde_json::Value;
use std::sync::Arc;

/// Registry name of the built-in return action.
pub const RETURN_TO_PREVIOUS_STATE: &str = "__RETURN_TO_PREVIOUS_STATE__";

/// Data-bag key that replaces a transition's static target when it holds a
/// non-empty string.
pub const NEXT_STATE_OVERRIDE: &str = "__next_state_override";

/// Data-bag key holding the stack of return state names.
pub const WORKFLOW_STACK: &str = "WorkflowStack";

/// Read the workflow stack, bottom first.
///
/// Returns `None` when the key is absent or does not hold an array of
/// strings.
pub fn workflow_stack(data: &DataBag) -> Option<Vec<&str>> {
    data.get(WORKFLOW_STACK)?
        .as_array()?
        .iter()
        .map(Value::as_str)
        .collect()
}

/// Build the update that pushes `state` onto the workflow stack.
///
/// A missing or malformed stack is replaced by a fresh one.
pub fn push_return_state(data: &DataBag, state: &str) -> DataBag {
    let mut stack: Vec<Value> = workflow_stack(data)
        .unwrap_or_default()
        .into_iter()
        .map(Value::from)
        .collect();
    stack.push(Value::from(state));

    let mut update = DataBag::new();
    update.insert(WORKFLOW_STACK.to_string(), Value::Array(stack));
    update
}

/// Pop the top of the workflow stack into a target override.
///
/// The returned update holds the popped name under [`NEXT_STATE_OVERRIDE`]
/// and the shortened stack under [`WORKFLOW_STACK`].
pub fn pop_return_state(data: &DataBag) -> Result<DataBag, CallbackError> {
    let mut stack = workflow_stack(data).ok_or(CallbackError::EmptyWorkflowStack)?;
    let return_state = stack.pop().ok_or(CallbackError::EmptyWorkflowStack)?;

    let mut update = DataBag::new();
    update.insert(NEXT_STATE_OVERRIDE.to_string(), Value::from(return_state));
    update.insert(
        WORKFLOW_STACK.to_string(),
        Value::Array(stack.into_iter().map(Value::from).collect()),
    );
    Ok(update)
}

/// The built-in return action, in callback form.
pub async fn return_to_previous_state(
    _ctx: ExecutionContext,
    data: Arc<DataBag>,
) -> Result<Option<DataBag>, CallbackError> {
    pop_return_state(&data).map(Some)
}
