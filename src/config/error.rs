//! Workflow document loading errors.

use crate::core::DefinitionError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a workflow document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported workflow file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Invalid workflow definition: {0}")]
    Definition(#[from] DefinitionError),
}
