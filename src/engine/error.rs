//! Errors raised while resolving and executing a transition.

use crate::context::Interrupted;
use crate::registry::{CallbackError, RegistryError};
use std::fmt;
use thiserror::Error;

/// Pipeline step that runs named callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Guard,
    TransitionAction,
    ExitCallback,
    EntryCallback,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guard => f.write_str("condition"),
            Self::TransitionAction => f.write_str("transition action"),
            Self::ExitCallback => f.write_str("OnLeave action"),
            Self::EntryCallback => f.write_str("OnEnter action"),
        }
    }
}

/// Failure to pick a transition for a state and event.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No transition found for event '{event}'")]
    TransitionNotFound { event: String },

    #[error("No transition found for event '{event}' with matching conditions")]
    NoMatchingTransition { event: String },

    #[error("Failed to get condition '{guard}': {source}")]
    GuardNotFound {
        guard: String,
        source: RegistryError,
    },

    #[error("Condition '{guard}' interrupted: {source}")]
    Interrupted {
        guard: String,
        source: Interrupted,
    },
}

/// Errors returned by [`StateMachine::trigger`](super::StateMachine::trigger).
///
/// Every variant aborts the remaining pipeline steps; no outcome is produced.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("State '{state}' not found")]
    StateNotFound { state: String },

    #[error("No valid transition found for event '{event}' in state '{from}': {source}")]
    Resolution {
        from: String,
        event: String,
        source: ResolveError,
    },

    #[error("Failed to get condition '{guard}': {source}")]
    GuardNotFound {
        guard: String,
        source: RegistryError,
    },

    #[error("Condition '{guard}' evaluated to false")]
    GuardRejected { guard: String },

    #[error("Condition '{guard}' failed: {source}")]
    GuardFailed {
        guard: String,
        source: CallbackError,
    },

    #[error("Failed to get transition action '{action}': {source}")]
    ActionNotFound {
        action: String,
        source: RegistryError,
    },

    #[error("Failed to get OnLeave action '{action}': {source}")]
    ExitCallbackNotFound {
        action: String,
        source: RegistryError,
    },

    #[error("Failed to get OnEnter action '{action}': {source}")]
    EntryCallbackNotFound {
        action: String,
        source: RegistryError,
    },

    #[error("Transition action '{action}' failed: {source}")]
    ActionFailed {
        action: String,
        source: CallbackError,
    },

    #[error("OnLeave action '{action}' failed: {source}")]
    ExitCallbackFailed {
        action: String,
        source: CallbackError,
    },

    #[error("OnEnter action '{action}' failed: {source}")]
    EntryCallbackFailed {
        action: String,
        source: CallbackError,
    },

    #[error("Target state '{target}' not found")]
    TargetStateNotFound { target: String },

    #[error("{phase} '{callback}' interrupted: {source}")]
    Interrupted {
        phase: Phase,
        callback: String,
        source: Interrupted,
    },
}

impl TransitionError {
    /// A named callback was missing from the registry when `phase` needed it.
    pub(crate) fn not_found(phase: Phase, name: &str, source: RegistryError) -> Self {
        let name = name.to_string();
        match phase {
            Phase::Guard => Self::GuardNotFound { guard: name, source },
            Phase::TransitionAction => Self::ActionNotFound { action: name, source },
            Phase::ExitCallback => Self::ExitCallbackNotFound { action: name, source },
            Phase::EntryCallback => Self::EntryCallbackNotFound { action: name, source },
        }
    }

    /// Wrap a callback's own error for the phase it ran in.
    pub(crate) fn callback(phase: Phase, name: &str, source: CallbackError) -> Self {
        if let Some(reason) = source.interruption() {
            return Self::Interrupted {
                phase,
                callback: name.to_string(),
                source: reason,
            };
        }

        let name = name.to_string();
        match phase {
            Phase::Guard => Self::GuardFailed { guard: name, source },
            Phase::TransitionAction => Self::ActionFailed { action: name, source },
            Phase::ExitCallback => Self::ExitCallbackFailed { action: name, source },
            Phase::EntryCallback => Self::EntryCallbackFailed { action: name, source },
        }
    }

    /// The cancellation or deadline behind this error, if any.
    pub fn interruption(&self) -> Option<Interrupted> {
        match self {
            Self::Interrupted { source, .. } => Some(*source),
            Self::Resolution {
                source: ResolveError::Interrupted { source, .. },
                ..
            } => Some(*source),
            _ => None,
        }
    }

    /// Stable label used for the transition error counter.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Interrupted { source, .. }
            | Self::Resolution {
                source: ResolveError::Interrupted { source, .. },
                ..
            } => match source {
                Interrupted::Cancelled => "cancelled",
                Interrupted::DeadlineExceeded => "deadline_exceeded",
            },
            Self::StateNotFound { .. } => "state_not_found",
            Self::Resolution {
                source: ResolveError::GuardNotFound { .. },
                ..
            } => "condition_not_found",
            Self::Resolution { .. } => "transition_not_found",
            Self::GuardNotFound { .. } => "condition_not_found",
            Self::GuardRejected { .. } => "condition_failed",
            Self::GuardFailed { .. } => "condition_error",
            Self::ActionNotFound { .. } => "transition_action_not_found",
            Self::ExitCallbackNotFound { .. } => "onleave_action_not_found",
            Self::EntryCallbackNotFound { .. } => "onenter_action_not_found",
            Self::ActionFailed { .. } => "transition_action_error",
            Self::ExitCallbackFailed { .. } => "onleave_action_error",
            Self::EntryCallbackFailed { .. } => "onenter_action_error",
            Self::TargetStateNotFound { .. } => "target_state_not_found",
        }
    }
}
