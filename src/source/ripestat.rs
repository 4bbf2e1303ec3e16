//! RIPEstat Data API client
//!
//! Uses three endpoints of <https://stat.ripe.net/data>:
//! `country-resource-list` for the per-country lists, and `country-asns`
//! plus `announced-prefixes` for the announced-prefix report.

use super::{CountryResources, FetchError, ResourceSource};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Base URL of the RIPEstat Data API
pub const DEFAULT_RIPESTAT_URL: &str = "https://stat.ripe.net/data";

/// `User-Agent` sent with every request
pub const DEFAULT_USER_AGENT: &str = "country-prefix-exporter/1.0";

/// Per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ResourceListData {
    resources: ResourceLists,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceLists {
    #[serde(default)]
    ipv4: Vec<String>,
    #[serde(default)]
    ipv6: Vec<String>,
    #[serde(default)]
    asn: Vec<AsnValue>,
}

#[derive(Debug, Deserialize)]
struct CountryAsnsData {
    #[serde(default)]
    asns: Vec<AsnValue>,
}

#[derive(Debug, Deserialize)]
struct AnnouncedPrefixesData {
    #[serde(default)]
    prefixes: Vec<AnnouncedPrefix>,
}

#[derive(Debug, Deserialize)]
struct AnnouncedPrefix {
    prefix: String,
}

/// ASN as the API returns it: a number, a string, or an object with an
/// `asn` field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum AsnValue {
    Number(u64),
    Text(String),
    Object { asn: u64 },
}

impl AsnValue {
    fn into_string(self) -> String {
        match self {
            AsnValue::Number(n) | AsnValue::Object { asn: n } => n.to_string(),
            AsnValue::Text(s) => s,
        }
    }
}

/// RIPEstat-backed [`ResourceSource`]
#[derive(Debug, Clone)]
pub struct RipeStatSource {
    client: reqwest::Client,
    base_url: String,
}

impl RipeStatSource {
    /// Create a client with default URL, user agent and timeout
    pub fn new() -> Result<Self, FetchError> {
        Self::with_options(DEFAULT_RIPESTAT_URL, DEFAULT_USER_AGENT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with explicit options
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://stat.ripe.net/data`
    /// * `user_agent` - value of the `User-Agent` header
    /// * `timeout` - per-request timeout
    pub fn with_options(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of an endpoint for a resource
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}/data.json", self.base_url)
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = self.endpoint_url(endpoint);
        debug!(%url, ?query, "RIPEstat request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Http(format!("request to {url} timed out"))
                } else {
                    FetchError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;
        parse_envelope(&body)
    }

    /// ASNs registered to a country, sorted and deduplicated
    pub async fn country_asns(&self, country_code: &str) -> Result<Vec<u64>, FetchError> {
        let data: CountryAsnsData = self
            .get_data("country-asns", &[("resource", country_code)])
            .await?;

        let mut asns = Vec::with_capacity(data.asns.len());
        for value in data.asns {
            let raw = value.into_string();
            let trimmed = raw.trim();
            let digits = trimmed
                .strip_prefix("AS")
                .or_else(|| trimmed.strip_prefix("as"))
                .unwrap_or(trimmed);
            let number = digits
                .parse::<u64>()
                .map_err(|_| FetchError::Malformed(format!("invalid ASN {raw:?}")))?;
            asns.push(number);
        }
        asns.sort_unstable();
        asns.dedup();
        Ok(asns)
    }

    /// Prefixes currently announced by an AS
    pub async fn announced_prefixes(&self, asn: u64) -> Result<Vec<String>, FetchError> {
        let resource = format!("AS{asn}");
        let data: AnnouncedPrefixesData = self
            .get_data("announced-prefixes", &[("resource", resource.as_str())])
            .await?;

        Ok(data.prefixes.into_iter().map(|p| p.prefix).collect())
    }
}

fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| FetchError::Malformed(e.to_string()))
}

fn into_resources(data: ResourceListData) -> CountryResources {
    let lists = data.resources;
    CountryResources {
        ipv4: lists.ipv4,
        ipv6: lists.ipv6,
        asn: lists.asn.into_iter().map(AsnValue::into_string).collect(),
    }
}

#[async_trait]
impl ResourceSource for RipeStatSource {
    async fn fetch(&self, country_code: &str) -> Result<CountryResources, FetchError> {
        let data: ResourceListData = self
            .get_data(
                "country-resource-list",
                &[("resource", country_code), ("v4_format", "prefix")],
            )
            .await?;

        Ok(into_resources(data))
    }

    fn is_remote(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "ripestat"
    }
}
