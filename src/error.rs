//! Errors that end a run

use crate::config::ConfigError;
use crate::output::OutputError;
use crate::region::MappingError;
use crate::source::FetchError;
use thiserror::Error;

/// Fatal errors of a pipeline run
///
/// Per-country fetch failures are not part of this type: they are contained
/// by the aggregator and reported in the run summary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration was rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Mapping document unavailable or unparsable; nothing was written
    #[error("Country mapping unavailable: {0}")]
    Mapping(#[from] MappingError),

    /// A source or request that the run cannot do without failed
    #[error("Registry request failed: {0}")]
    Fetch(#[from] FetchError),

    /// An artifact could not be written
    #[error(transparent)]
    Output(#[from] OutputError),
}
