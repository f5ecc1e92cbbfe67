//! Build errors for workflow definitions and state machines.

use crate::core::DefinitionError;
use thiserror::Error;

/// Errors that can occur when building definitions and state machines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Invalid workflow definition: {0}")]
    Definition(#[from] DefinitionError),
}
