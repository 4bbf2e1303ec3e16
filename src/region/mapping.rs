//! Loading of the country/region mapping document

use super::index::CountryRecord;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// ISO-3166 records with UN M49 regions
pub const DEFAULT_MAPPING_URL: &str =
    "https://raw.githubusercontent.com/lukes/ISO-3166-Countries-with-Regional-Codes/master/all/all.json";

/// Errors that prevent the mapping from being loaded
///
/// Any of these is fatal for a run: without the mapping no continent
/// membership can be established.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// HTTP request failed
    #[error("Failed to fetch mapping from {url}: {reason}")]
    Http {
        /// Mapping URL
        url: String,
        /// Transport error description
        reason: String,
    },

    /// Server answered with a non-success status
    #[error("Mapping request to {url} returned HTTP {status}")]
    Status {
        /// Mapping URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Local mapping file could not be read
    #[error("Failed to read mapping file {path}: {source}")]
    Io {
        /// Mapping file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Document is not a JSON list of country records
    #[error("Mapping document is not a list of country records: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the mapping document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSource {
    /// Remote document fetched over HTTP(S)
    Url(String),
    /// Local JSON file
    File(PathBuf),
}

impl MappingSource {
    /// Interpret a CLI/config value: `http://` and `https://` values are URLs,
    /// everything else is a path
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            MappingSource::Url(value.to_string())
        } else {
            MappingSource::File(PathBuf::from(value))
        }
    }

    /// Human readable location
    pub fn location(&self) -> String {
        match self {
            MappingSource::Url(url) => url.clone(),
            MappingSource::File(path) => path.display().to_string(),
        }
    }
}

impl Default for MappingSource {
    fn default() -> Self {
        MappingSource::Url(DEFAULT_MAPPING_URL.to_string())
    }
}

/// Parse a mapping document
pub fn parse_mapping(document: &str) -> Result<Vec<CountryRecord>, MappingError> {
    Ok(serde_json::from_str(document)?)
}

/// Fetch or read the mapping document and parse it
pub async fn load_mapping(
    source: &MappingSource,
    user_agent: &str,
    timeout: Duration,
) -> Result<Vec<CountryRecord>, MappingError> {
    let document = match source {
        MappingSource::Url(url) => fetch_document(url, user_agent, timeout).await?,
        MappingSource::File(path) => {
            std::fs::read_to_string(path).map_err(|source| MappingError::Io {
                path: path.clone(),
                source,
            })?
        }
    };

    let records = parse_mapping(&document)?;
    info!(
        source = %source.location(),
        records = records.len(),
        "loaded country mapping"
    );
    Ok(records)
}

async fn fetch_document(
    url: &str,
    user_agent: &str,
    timeout: Duration,
) -> Result<String, MappingError> {
    let http_error = |e: reqwest::Error| MappingError::Http {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(http_error)?;

    let response = client.get(url).send().await.map_err(http_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(MappingError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(http_error)
}
