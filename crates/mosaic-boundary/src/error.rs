//! Error types for boundary analysis

use std::path::PathBuf;

use thiserror::Error;

/// Boundary analysis error types
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Workspace(#[from] mosaic_core::WorkspaceError),
}

pub type BoundaryResult<T> = Result<T, BoundaryError>;
