//! Error types for workspace operations

use std::path::PathBuf;

use thiserror::Error;

/// Workspace error types
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Feature already exists: {0}")]
    FeatureExists(String),

    #[error("Template not found: {name} ({path})")]
    TemplateNotFound { name: String, path: PathBuf },

    #[error(transparent)]
    InvalidName(#[from] mosaic_types::MosaicError),

    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl WorkspaceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
