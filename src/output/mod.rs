//! Flat-file artifacts

pub mod metadata;
pub mod writer;

pub use metadata::{utc_timestamp, write_json, write_metadata, RunMetadata, Scope, METADATA_FILE};
pub use writer::{read_lines, write_set, OutputLayout, ResourceKind};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Error writing an artifact
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Filesystem operation failed
    #[error("Failed to write {path}: {source}")]
    Io {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed
    #[error("Failed to serialize JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What to do with an artifact whose set is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPolicy {
    /// Leave the file out; absence means "no data"
    #[default]
    Skip,
    /// Write an empty file
    Write,
}
