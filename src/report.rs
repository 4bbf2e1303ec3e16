//! Announced-prefix report for a single country
//!
//! Lists every ASN registered to a country together with the IPv4 and IPv6
//! prefixes it currently announces, written as one JSON document.

use crate::aggregate::Pacer;
use crate::output::utc_timestamp;
use crate::source::{FetchError, RipeStatSource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Registry queries needed by the report
#[async_trait]
pub trait PrefixRegistry: Send + Sync {
    /// ASNs registered to a country
    async fn country_asns(&self, country_code: &str) -> Result<Vec<u64>, FetchError>;

    /// Prefixes announced by an AS
    async fn announced_prefixes(&self, asn: u64) -> Result<Vec<String>, FetchError>;
}

#[async_trait]
impl PrefixRegistry for RipeStatSource {
    async fn country_asns(&self, country_code: &str) -> Result<Vec<u64>, FetchError> {
        RipeStatSource::country_asns(self, country_code).await
    }

    async fn announced_prefixes(&self, asn: u64) -> Result<Vec<String>, FetchError> {
        RipeStatSource::announced_prefixes(self, asn).await
    }
}

/// Prefixes announced by one AS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsnPrefixes {
    /// `AS<n>`
    pub asn: String,
    /// Sorted IPv4 prefixes
    pub ipv4: Vec<String>,
    /// Sorted IPv6 prefixes
    pub ipv6: Vec<String>,
}

/// The report document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncedReport {
    /// Uppercase country code
    pub country: String,
    /// Generation time, `YYYY-MM-DDTHH:MM:SSZ`
    pub generated_at_utc: String,
    /// Number of ASNs registered to the country
    pub count_asns: usize,
    /// Per-ASN prefixes, ordered by AS number
    pub data: Vec<AsnPrefixes>,
}

/// An AS whose prefixes could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsnFailure {
    /// AS number
    pub asn: u64,
    /// Error description
    pub reason: String,
}

/// Split prefixes into sorted, deduplicated IPv4 and IPv6 lists
///
/// Anything containing `:` is IPv6.
pub fn split_prefixes<I: IntoIterator<Item = String>>(prefixes: I) -> (Vec<String>, Vec<String>) {
    let mut ipv4 = BTreeSet::new();
    let mut ipv6 = BTreeSet::new();
    for prefix in prefixes {
        if prefix.contains(':') {
            ipv6.insert(prefix);
        } else {
            ipv4.insert(prefix);
        }
    }
    (ipv4.into_iter().collect(), ipv6.into_iter().collect())
}

/// Path of the report for a country: `<root>/<cc>_ip_prefixes.json`
pub fn report_path(root: &Path, country_code: &str) -> PathBuf {
    root.join(format!("{}_ip_prefixes.json", country_code.to_lowercase()))
}

/// Build the report for a country
///
/// A failure listing the country's ASNs is returned as an error. A failure
/// for a single AS is logged and the AS is left out of `data`.
pub async fn build_report<R: PrefixRegistry + ?Sized>(
    registry: &R,
    country_code: &str,
    pacer: &mut Pacer,
) -> Result<(AnnouncedReport, Vec<AsnFailure>), FetchError> {
    let country = country_code.trim().to_uppercase();
    let mut asns = registry.country_asns(&country).await?;
    asns.sort_unstable();
    asns.dedup();
    pacer.tick().await;
    info!(country = %country, asns = asns.len(), "building announced-prefix report");

    let mut data = Vec::with_capacity(asns.len());
    let mut failures = Vec::new();

    for &asn in &asns {
        match registry.announced_prefixes(asn).await {
            Ok(prefixes) => {
                let (ipv4, ipv6) = split_prefixes(prefixes);
                data.push(AsnPrefixes {
                    asn: format!("AS{asn}"),
                    ipv4,
                    ipv6,
                });
            }
            Err(e) => {
                warn!(country = %country, asn, error = %e, "skipping AS");
                failures.push(AsnFailure {
                    asn,
                    reason: e.to_string(),
                });
            }
        }
        pacer.tick().await;
    }

    let report = AnnouncedReport {
        country,
        generated_at_utc: utc_timestamp(),
        count_asns: asns.len(),
        data,
    };
    Ok((report, failures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeRegistry {
        asns: Vec<u64>,
        prefixes: HashMap<u64, Vec<String>>,
    }

    #[async_trait]
    impl PrefixRegistry for FakeRegistry {
        async fn country_asns(&self, country_code: &str) -> Result<Vec<u64>, FetchError> {
            if country_code == "DE" {
                Ok(self.asns.clone())
            } else {
                Err(FetchError::NotFound(country_code.to_string()))
            }
        }

        async fn announced_prefixes(&self, asn: u64) -> Result<Vec<String>, FetchError> {
            self.prefixes
                .get(&asn)
                .cloned()
                .ok_or(FetchError::Status(500))
        }
    }

    fn registry() -> FakeRegistry {
        let mut prefixes = HashMap::new();
        prefixes.insert(
            3320,
            vec![
                "2003::/19".to_string(),
                "80.128.0.0/11".to_string(),
                "2.160.0.0/12".to_string(),
                "80.128.0.0/11".to_string(),
            ],
        );
        prefixes.insert(680, vec!["141.0.0.0/10".to_string()]);
        FakeRegistry {
            asns: vec![680, 3320, 64512],
            prefixes,
        }
    }

    #[test]
    fn test_split_prefixes() {
        let (ipv4, ipv6) = split_prefixes(vec![
            "5.6.7.0/24".to_string(),
            "2001:db8::/32".to_string(),
            "1.2.3.0/24".to_string(),
            "1.2.3.0/24".to_string(),
        ]);
        assert_eq!(ipv4, vec!["1.2.3.0/24", "5.6.7.0/24"]);
        assert_eq!(ipv6, vec!["2001:db8::/32"]);
    }

    #[test]
    fn test_report_path() {
        assert_eq!(
            report_path(Path::new("out"), "DE"),
            PathBuf::from("out/de_ip_prefixes.json")
        );
    }

    #[tokio::test]
    async fn test_build_report_skips_failed_asn() {
        let mut pacer = Pacer::disabled();
        let (report, failures) = build_report(&registry(), "de", &mut pacer).await.unwrap();

        assert_eq!(report.country, "DE");
        assert_eq!(report.count_asns, 3);
        assert_eq!(report.data.len(), 2);
        assert_eq!(report.data[0].asn, "AS680");
        assert_eq!(report.data[1].ipv4, vec!["2.160.0.0/12", "80.128.0.0/11"]);
        assert_eq!(report.data[1].ipv6, vec!["2003::/19"]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].asn, 64512);
        assert_eq!(pacer.calls(), 4);
    }

    #[tokio::test]
    async fn test_build_report_asn_list_failure_is_error() {
        let mut pacer = Pacer::disabled();
        let result = build_report(&registry(), "FR", &mut pacer).await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }
}
