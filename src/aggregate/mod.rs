//! Merging of per-country resources into continent sets
//!
//! The [`Aggregator`] walks a [`ContinentMembership`] in key order, fetches
//! every member country from a [`ResourceSource`] and unions the results
//! into one [`ResourceSet`] per continent. A country whose fetch fails is
//! logged, recorded in [`Aggregation::failures`] and skipped; it never
//! aborts the run.

pub mod pacing;
pub mod resource_set;

pub use pacing::{Pacer, DEFAULT_PACE_EVERY, DEFAULT_PACE_PAUSE};
pub use resource_set::{asn_label, ResourceSet};

use crate::region::ContinentMembership;
use crate::source::ResourceSource;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{info, warn};

/// A country whose resources could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryFailure {
    /// Country code
    pub country: String,
    /// Continent being built, if any
    pub continent: Option<String>,
    /// Error description
    pub reason: String,
}

/// Result of an aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// Resource set per key (continent key or lowercase country code)
    pub sets: BTreeMap<String, ResourceSet>,
    /// Countries that failed and contributed nothing
    pub failures: Vec<CountryFailure>,
    /// Countries fetched, failures included
    pub attempted: usize,
    /// Countries successfully merged
    pub merged: usize,
}

impl Aggregation {
    /// Failed country codes in the order they failed
    pub fn failed_countries(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.country.clone()).collect()
    }
}

/// Aggregates per-country resources
///
/// Remote sources are paced: after every `pace_every` fetches the
/// aggregator sleeps for `pace_pause`.
#[derive(Debug, Clone)]
pub struct Aggregator {
    pace_every: usize,
    pace_pause: Duration,
}

impl Aggregator {
    /// Create an aggregator with the default pacing
    pub fn new() -> Self {
        Self::with_pacing(DEFAULT_PACE_EVERY, DEFAULT_PACE_PAUSE)
    }

    /// Create an aggregator with explicit pacing; `every == 0` disables it
    pub fn with_pacing(every: usize, pause: Duration) -> Self {
        Self {
            pace_every: every,
            pace_pause: pause,
        }
    }

    fn pacer_for<S: ResourceSource + ?Sized>(&self, source: &S) -> Pacer {
        if source.is_remote() {
            Pacer::new(self.pace_every, self.pace_pause)
        } else {
            Pacer::disabled()
        }
    }

    /// Build one resource set per continent
    ///
    /// Every continent of `membership` is present in the result, including
    /// continents where every member failed.
    pub async fn aggregate<S: ResourceSource + ?Sized>(
        &self,
        membership: &ContinentMembership,
        source: &S,
    ) -> Aggregation {
        let mut pacer = self.pacer_for(source);
        let mut result = Aggregation::default();

        for (continent, countries) in membership.continents() {
            info!(continent, countries = countries.len(), "building continent");

            let mut set = ResourceSet::new();
            for country in countries {
                result.attempted += 1;
                match source.fetch(country).await {
                    Ok(resources) => {
                        set.merge(resources);
                        result.merged += 1;
                    }
                    Err(e) => {
                        warn!(country = %country, continent, source = source.name(), error = %e, "skipping country");
                        result.failures.push(CountryFailure {
                            country: country.clone(),
                            continent: Some(continent.to_string()),
                            reason: e.to_string(),
                        });
                    }
                }
                pacer.tick().await;
            }

            if set.is_empty() {
                warn!(continent, "continent has no resources");
            }
            result.sets.insert(continent.to_string(), set);
        }

        result
    }

    /// Build one resource set per country
    ///
    /// Codes are trimmed, uppercased and deduplicated. Sets are keyed by the
    /// lowercase code; countries that fail have no entry.
    pub async fn aggregate_countries<S, I, C>(&self, codes: I, source: &S) -> Aggregation
    where
        S: ResourceSource + ?Sized,
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let codes: BTreeSet<String> = codes
            .into_iter()
            .map(|code| code.as_ref().trim().to_uppercase())
            .filter(|code| !code.is_empty())
            .collect();

        let mut pacer = self.pacer_for(source);
        let mut result = Aggregation::default();

        for country in &codes {
            result.attempted += 1;
            match source.fetch(country).await {
                Ok(resources) => {
                    info!(country = %country, "fetched country");
                    result
                        .sets
                        .insert(country.to_lowercase(), ResourceSet::from(resources));
                    result.merged += 1;
                }
                Err(e) => {
                    warn!(country = %country, source = source.name(), error = %e, "skipping country");
                    result.failures.push(CountryFailure {
                        country: country.clone(),
                        continent: None,
                        reason: e.to_string(),
                    });
                }
            }
            pacer.tick().await;
        }

        result
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
