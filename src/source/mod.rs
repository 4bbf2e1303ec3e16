//! Per-country resource sources
//!
//! A [`ResourceSource`] hands out the announced IPv4 prefixes, IPv6
//! prefixes and ASNs of one country. The aggregation code only sees this
//! trait, so a remote registry and pre-existing local files are
//! interchangeable.

pub mod local;
pub mod memory;
pub mod ripestat;

pub use local::LocalFileSource;
pub use memory::MemorySource;
pub use ripestat::RipeStatSource;

use async_trait::async_trait;
use std::path::PathBuf;

/// Resources registered to a single country, as delivered by a source
///
/// Entries are raw: prefixes are not validated and ASNs may or may not
/// carry the `AS` tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryResources {
    /// IPv4 prefixes in CIDR notation
    pub ipv4: Vec<String>,
    /// IPv6 prefixes in CIDR notation
    pub ipv6: Vec<String>,
    /// AS numbers, either `3320` or `AS3320`
    pub asn: Vec<String>,
}

impl CountryResources {
    /// Whether all three lists are empty
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty() && self.asn.is_empty()
    }
}

/// Error fetching the resources of one country
///
/// These are recovered by the aggregator: the country is skipped and the
/// failure is reported at the end of the run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Registry answered with a non-success status
    #[error("Registry returned HTTP {0}")]
    Status(u16),

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Source has no data for this country
    #[error("No data for country {0}")]
    NotFound(String),

    /// Local file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Supplier of per-country resources
#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// Fetch the resources of a country
    ///
    /// `country_code` is an uppercase ISO-3166 alpha-2 code.
    async fn fetch(&self, country_code: &str) -> Result<CountryResources, FetchError>;

    /// Whether calls go to a remote service and should be paced
    fn is_remote(&self) -> bool {
        false
    }

    /// Short name used in log output
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_resources_is_empty() {
        assert!(CountryResources::default().is_empty());

        let resources = CountryResources {
            asn: vec!["3320".to_string()],
            ..Default::default()
        };
        assert!(!resources.is_empty());
    }

    #[test]
    fn test_fetch_error_display() {
        let errors = vec![
            FetchError::Http("connection reset".to_string()),
            FetchError::Status(503),
            FetchError::Malformed("missing data.resources".to_string()),
            FetchError::NotFound("XX".to_string()),
        ];

        for error in errors {
            let error_str = error.to_string();
            match error {
                FetchError::Http(msg) => assert!(error_str.contains(&msg)),
                FetchError::Status(code) => assert!(error_str.contains(&code.to_string())),
                FetchError::Malformed(msg) => assert!(error_str.contains(&msg)),
                FetchError::NotFound(cc) => assert!(error_str.contains(&cc)),
                FetchError::Io { .. } => unreachable!(),
            }
        }
    }
}
