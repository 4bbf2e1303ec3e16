//! In-memory source

use super::{CountryResources, FetchError, ResourceSource};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source serving fixed resources from memory
///
/// Countries registered with [`MemorySource::fail`] return an error, and
/// unknown countries return [`FetchError::NotFound`]. Useful for driving
/// the aggregator without a registry.
#[derive(Debug, Default)]
pub struct MemorySource {
    countries: HashMap<String, CountryResources>,
    failing: HashSet<String>,
    remote: bool,
    calls: AtomicUsize,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register resources for a country
    pub fn with_country<S: Into<String>>(
        mut self,
        country_code: &str,
        ipv4: impl IntoIterator<Item = S>,
        ipv6: impl IntoIterator<Item = S>,
        asn: impl IntoIterator<Item = S>,
    ) -> Self {
        self.countries.insert(
            country_code.to_uppercase(),
            CountryResources {
                ipv4: ipv4.into_iter().map(Into::into).collect(),
                ipv6: ipv6.into_iter().map(Into::into).collect(),
                asn: asn.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Make fetches for a country fail
    pub fn fail(mut self, country_code: &str) -> Self {
        self.failing.insert(country_code.to_uppercase());
        self
    }

    /// Report the source as remote so the aggregator paces it
    pub fn remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }

    /// Number of fetches served so far, failed ones included
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ResourceSource for MemorySource {
    async fn fetch(&self, country_code: &str) -> Result<CountryResources, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let code = country_code.to_uppercase();
        if self.failing.contains(&code) {
            return Err(FetchError::Http(format!("simulated failure for {code}")));
        }
        self.countries
            .get(&code)
            .cloned()
            .ok_or(FetchError::NotFound(code))
    }

    fn is_remote(&self) -> bool {
        self.remote
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::new()
            .with_country("de", ["1.2.3.0/24"], [], ["3320"])
            .fail("XX");

        let de = source.fetch("DE").await.unwrap();
        assert_eq!(de.ipv4, vec!["1.2.3.0/24"]);
        assert_eq!(de.asn, vec!["3320"]);

        assert!(matches!(source.fetch("XX").await, Err(FetchError::Http(_))));
        assert!(matches!(source.fetch("FR").await, Err(FetchError::NotFound(_))));
        assert_eq!(source.calls(), 3);
    }
}
