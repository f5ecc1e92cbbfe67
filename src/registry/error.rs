//! Registry and callback error types.

use super::CallbackKind;
use crate::context::Interrupted;
use thiserror::Error;

/// Errors from registering or looking up callbacks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{kind} '{name}' already registered")]
    DuplicateRegistration { kind: CallbackKind, name: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: CallbackKind, name: String },

    /// The name belongs to a built-in callback installed by the engine.
    #[error("'{name}' is reserved for a built-in action")]
    Reserved { name: String },
}

/// Error type returned by guard and action implementations.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The callback observed cancellation or its deadline.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    /// The workflow stack was absent, not a sequence of state names, or empty.
    #[error("Workflow stack not found or empty")]
    EmptyWorkflowStack,

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl CallbackError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(error))
    }

    /// The interruption behind this error, if any.
    pub fn interruption(&self) -> Option<Interrupted> {
        match self {
            Self::Interrupted(reason) => Some(*reason),
            _ => None,
        }
    }
}
