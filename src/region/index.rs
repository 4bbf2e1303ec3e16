//! Country to continent membership index

use super::normalize::normalize;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A continent key produced by [`normalize`]
pub type ContinentKey = String;

/// An uppercase two-letter country code
pub type CountryCode = String;

/// Region as it appears in a mapping record
///
/// Mapping documents disagree on shape: some carry the region as a plain
/// string, others as an object with a `name` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RegionField {
    /// `"region": "Europe"`
    Plain(String),
    /// `"region": {"name": "Europe"}`
    Structured {
        /// Region name, if present
        #[serde(default)]
        name: Option<String>,
    },
    /// Any other JSON value; never resolves to a region
    Other(serde_json::Value),
}

impl RegionField {
    /// Resolve the trimmed region name, if the record carries a usable one
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            RegionField::Plain(name) => name.as_str(),
            RegionField::Structured { name: Some(name) } => name.as_str(),
            RegionField::Structured { name: None } | RegionField::Other(_) => return None,
        };
        let name = name.trim();
        (!name.is_empty()).then_some(name)
    }
}

/// One record of the country/region mapping document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CountryRecord {
    /// ISO-3166 alpha-2 code
    #[serde(rename = "alpha-2", alias = "alpha2", alias = "country_code", default)]
    pub country_code: Option<String>,
    /// UN M49 region
    #[serde(default)]
    pub region: Option<RegionField>,
}

impl CountryRecord {
    /// Create a record with a plain string region
    pub fn new(country_code: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            country_code: Some(country_code.into()),
            region: Some(RegionField::Plain(region.into())),
        }
    }

    /// Trimmed, uppercased country code, if non-empty
    pub fn code(&self) -> Option<CountryCode> {
        let code = self.country_code.as_deref()?.trim();
        (!code.is_empty()).then(|| code.to_uppercase())
    }

    /// Trimmed region name, if non-empty
    pub fn region_name(&self) -> Option<&str> {
        self.region.as_ref().and_then(RegionField::name)
    }
}

/// Mapping from continent key to the set of member country codes
///
/// Built once per run and read-only afterwards. Keys iterate in sorted
/// order so that everything derived from the index is emitted
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinentMembership {
    continents: BTreeMap<ContinentKey, BTreeSet<CountryCode>>,
}

impl ContinentMembership {
    /// Build the index from mapping records
    ///
    /// Records without a country code or without a region (including a
    /// region that normalizes to an empty key) are skipped.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CountryRecord>,
    {
        let mut continents: BTreeMap<ContinentKey, BTreeSet<CountryCode>> = BTreeMap::new();

        for record in records {
            let Some(code) = record.code() else {
                debug!(?record, "skipping mapping record without country code");
                continue;
            };
            let Some(region) = record.region_name() else {
                debug!(country = %code, "skipping mapping record without region");
                continue;
            };
            let key = normalize(region);
            if key.is_empty() {
                debug!(country = %code, region, "region normalizes to an empty key");
                continue;
            }
            continents.entry(key).or_default().insert(code);
        }

        Self { continents }
    }

    /// Iterate continents and their members in key order
    pub fn continents(&self) -> impl Iterator<Item = (&str, &BTreeSet<CountryCode>)> {
        self.continents.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Continent keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.continents.keys().map(String::as_str)
    }

    /// Members of a continent
    pub fn countries(&self, key: &str) -> Option<&BTreeSet<CountryCode>> {
        self.continents.get(key)
    }

    /// Continent a country code belongs to
    pub fn continent_of(&self, code: &str) -> Option<&str> {
        let code = code.trim().to_uppercase();
        self.continents
            .iter()
            .find(|(_, members)| members.contains(&code))
            .map(|(key, _)| key.as_str())
    }

    /// Number of continents
    pub fn len(&self) -> usize {
        self.continents.len()
    }

    /// Whether no continent was found
    pub fn is_empty(&self) -> bool {
        self.continents.is_empty()
    }

    /// Total number of country memberships across all continents
    pub fn country_count(&self) -> usize {
        self.continents.values().map(BTreeSet::len).sum()
    }
}
