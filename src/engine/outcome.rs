//! Result of one successful transition.

use crate::core::DataBag;
use serde::{Deserialize, Serialize};

/// What a successful [`trigger`](super::StateMachine::trigger) produced.
///
/// The outcome is read-only; [`into_data`](Self::into_data) hands the final
/// data bag to the caller for the next invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    new_state: String,
    auto_event: Option<String>,
    data: DataBag,
}

impl TransitionOutcome {
    pub(crate) fn new(new_state: String, auto_event: Option<String>, data: DataBag) -> Self {
        Self {
            new_state,
            auto_event,
            data,
        }
    }

    /// State the machine is in after the transition.
    pub fn new_state(&self) -> &str {
        &self.new_state
    }

    /// Event the caller should fire next, as configured on the transition.
    pub fn auto_event(&self) -> Option<&str> {
        self.auto_event.as_deref()
    }

    /// The caller's data bag with every callback update merged in.
    pub fn data(&self) -> &DataBag {
        &self.data
    }

    pub fn into_data(self) -> DataBag {
        self.data
    }

    pub fn into_parts(self) -> (String, Option<String>, DataBag) {
        (self.new_state, self.auto_event, self.data)
    }
}
