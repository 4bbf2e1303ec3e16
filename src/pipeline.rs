//! End-to-end export runs
//!
//! Each run loads its inputs, aggregates, and writes its artifacts below
//! [`ExportConfig::output_dir`]. Country failures do not make a run fail;
//! they are listed in the returned [`RunSummary`].

use crate::aggregate::{Aggregation, Aggregator, CountryFailure, Pacer};
use crate::config::ExportConfig;
use crate::error::PipelineError;
use crate::output::{
    utc_timestamp, write_json, write_metadata, write_set, EmptyPolicy, OutputError, OutputLayout,
    ResourceKind, RunMetadata, Scope,
};
use crate::region::{load_mapping, ContinentMembership, MappingSource};
use crate::report::{build_report, report_path, AnnouncedReport, AsnFailure};
use crate::source::{LocalFileSource, ResourceSource, RipeStatSource};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Which [`ResourceSource`] a continent run reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// RIPEstat `country-resource-list`
    #[default]
    RipeStat,
    /// Per-country files below [`ExportConfig::input_dir`]
    Local,
}

/// Create the configured source
pub fn open_source(
    kind: SourceKind,
    config: &ExportConfig,
) -> Result<Box<dyn ResourceSource>, PipelineError> {
    Ok(match kind {
        SourceKind::RipeStat => Box::new(ripestat(config)?),
        SourceKind::Local => Box::new(LocalFileSource::new(config.input_dir.clone())),
    })
}

fn ripestat(config: &ExportConfig) -> Result<RipeStatSource, PipelineError> {
    Ok(RipeStatSource::with_options(
        &config.ripestat_url,
        &config.user_agent,
        config.request_timeout,
    )?)
}

/// Outcome of a continent or country run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// What was exported
    pub scope: Scope,
    /// Sets built (continents or countries)
    pub sets: usize,
    /// Countries fetched, failures included
    pub countries_attempted: usize,
    /// Countries merged successfully
    pub countries_merged: usize,
    /// Countries that contributed nothing
    pub failures: Vec<CountryFailure>,
    /// Artifact files written
    pub files_written: usize,
    /// Artifacts left out because they were empty, stale copies removed
    pub files_skipped: usize,
    /// Path of `metadata.json`, if written
    pub metadata: Option<PathBuf>,
}

impl RunSummary {
    /// Whether any country failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Failed country codes
    pub fn failed_countries(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.country.clone()).collect()
    }
}

fn aggregator(config: &ExportConfig) -> Aggregator {
    Aggregator::with_pacing(config.pace_every, config.pace_pause)
}

/// Build the four continent artifacts for every continent of the mapping
///
/// A mapping that cannot be loaded ends the run before anything is
/// written.
pub async fn run_continents<S: ResourceSource + ?Sized>(
    config: &ExportConfig,
    source: &S,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;

    let mapping = MappingSource::parse(&config.mapping);
    let records = load_mapping(&mapping, &config.user_agent, config.request_timeout).await?;
    let membership = ContinentMembership::build(&records);
    if membership.is_empty() {
        warn!(source = %mapping.location(), "mapping yielded no continents");
    }
    info!(
        continents = membership.len(),
        countries = membership.country_count(),
        source = source.name(),
        "aggregating continents"
    );

    let aggregation = aggregator(config).aggregate(&membership, source).await;
    finish(config, Scope::Continents, aggregation)
}

/// Build the four per-country artifacts for each code
pub async fn run_countries<S, I, C>(
    config: &ExportConfig,
    codes: I,
    source: &S,
) -> Result<RunSummary, PipelineError>
where
    S: ResourceSource + ?Sized,
    I: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    config.validate()?;

    let aggregation = aggregator(config).aggregate_countries(codes, source).await;
    finish(config, Scope::Countries, aggregation)
}

fn finish(
    config: &ExportConfig,
    scope: Scope,
    aggregation: Aggregation,
) -> Result<RunSummary, PipelineError> {
    let layout = OutputLayout::new(config.output_dir.clone());
    let written = write_sets(&layout, &aggregation, config.empty_policy)?;

    let metadata = if config.write_metadata {
        let continents = match scope {
            Scope::Continents => written.keys,
            Scope::Countries => 0,
        };
        let metadata = RunMetadata {
            generated_at_utc: utc_timestamp(),
            scope,
            continents,
            countries: aggregation.merged,
            failed_countries: aggregation.failed_countries(),
        };
        Some(write_metadata(layout.root(), &metadata)?)
    } else {
        None
    };

    let summary = RunSummary {
        scope,
        sets: aggregation.sets.len(),
        countries_attempted: aggregation.attempted,
        countries_merged: aggregation.merged,
        failures: aggregation.failures,
        files_written: written.files,
        files_skipped: written.skipped,
        metadata,
    };
    log_summary(&summary);
    Ok(summary)
}

#[derive(Debug, Default)]
struct WriteCounts {
    /// Keys with at least one file written
    keys: usize,
    files: usize,
    skipped: usize,
}

fn write_sets(
    layout: &OutputLayout,
    aggregation: &Aggregation,
    policy: EmptyPolicy,
) -> Result<WriteCounts, PipelineError> {
    let mut counts = WriteCounts::default();

    for (key, set) in &aggregation.sets {
        let before = counts.files;
        for &kind in ResourceKind::all() {
            let entries = set.entries(kind);
            let path = layout.path(kind, key);
            if entries.is_empty() && policy == EmptyPolicy::Skip {
                info!(key = %key, kind = kind.dir_name(), "skipping empty list");
                remove_stale(&path)?;
                counts.skipped += 1;
                continue;
            }
            let lines = write_set(&path, &entries)?;
            info!(path = %path.display(), lines, "wrote list");
            counts.files += 1;
        }
        if counts.files > before {
            counts.keys += 1;
        }
    }

    // A failed country in a country run has no set; lists from an earlier
    // run must not outlive it.
    for failure in aggregation.failures.iter().filter(|f| f.continent.is_none()) {
        let key = failure.country.to_lowercase();
        for &kind in ResourceKind::all() {
            remove_stale(&layout.path(kind, &key))?;
            counts.skipped += 1;
        }
    }

    Ok(counts)
}

/// Remove a list left over from an earlier run
fn remove_stale(path: &Path) -> Result<(), OutputError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "removed stale list");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(OutputError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn log_summary(summary: &RunSummary) {
    info!(
        sets = summary.sets,
        countries = summary.countries_merged,
        files_written = summary.files_written,
        files_skipped = summary.files_skipped,
        "export finished"
    );
    if summary.has_failures() {
        warn!(
            failed = summary.failures.len(),
            countries = %summary.failed_countries().join(","),
            "some countries could not be fetched"
        );
    }
}

/// Outcome of an announced-prefix report run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    /// Path of the written report
    pub path: PathBuf,
    /// The report as written
    pub report: AnnouncedReport,
    /// ASNs left out of the report
    pub failures: Vec<AsnFailure>,
}

/// Build and write the announced-prefix report for a country
pub async fn run_announced(
    config: &ExportConfig,
    country_code: &str,
) -> Result<ReportSummary, PipelineError> {
    config.validate()?;

    let registry = ripestat(config)?;
    let mut pacer = Pacer::new(config.pace_every, config.pace_pause);
    let (report, failures) = build_report(&registry, country_code, &mut pacer).await?;

    let path = report_path(&config.output_dir, &report.country);
    write_json(&path, &report)?;
    info!(path = %path.display(), asns = report.count_asns, "wrote announced-prefix report");
    if !failures.is_empty() {
        warn!(failed = failures.len(), "some ASNs could not be fetched");
    }

    Ok(ReportSummary {
        path,
        report,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use std::fs;

    fn config_for(dir: &std::path::Path, mapping: &str) -> ExportConfig {
        let mapping_path = dir.join("mapping.json");
        fs::write(&mapping_path, mapping).unwrap();
        ExportConfig::builder()
            .mapping(mapping_path.to_string_lossy())
            .output_dir(dir.join("out"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_lists_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(
            dir.path(),
            r#"[{"alpha-2": "DE", "region": "Europe"}, {"alpha-2": "AQ", "region": "Antarctica"}]"#,
        );
        let source = MemorySource::new().with_country("DE", ["1.2.3.0/24"], [], ["3320"]);

        let summary = run_continents(&config, &source).await.unwrap();

        let out = dir.path().join("out");
        assert!(out.join("ipv4/europe.txt").exists());
        assert!(out.join("combined/europe.txt").exists());
        assert!(out.join("asn/europe.txt").exists());
        assert!(!out.join("ipv6/europe.txt").exists());
        assert!(!out.join("ipv4/antarctica.txt").exists());
        assert_eq!(summary.sets, 2);
        assert_eq!(summary.files_written, 3);
        assert_eq!(summary.files_skipped, 5);
        assert_eq!(summary.failed_countries(), vec!["AQ"]);

        let metadata: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("metadata.json")).unwrap()).unwrap();
        assert_eq!(metadata["continents"], 1);
    }

    #[tokio::test]
    async fn test_rerun_removes_lists_that_became_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), r#"[{"alpha-2": "DE", "region": "Europe"}]"#);
        let out = dir.path().join("out");

        let before = MemorySource::new().with_country("DE", ["1.2.3.0/24"], ["2003::/19"], ["3320"]);
        run_continents(&config, &before).await.unwrap();
        assert!(out.join("ipv6/europe.txt").exists());

        let after = MemorySource::new().with_country("DE", ["1.2.3.0/24"], [], ["3320"]);
        let summary = run_continents(&config, &after).await.unwrap();

        assert!(!out.join("ipv6/europe.txt").exists());
        assert_eq!(
            fs::read_to_string(out.join("combined/europe.txt")).unwrap(),
            "1.2.3.0/24\n"
        );
        assert_eq!(summary.files_written, 3);
        assert_eq!(summary.files_skipped, 1);
    }

    #[tokio::test]
    async fn test_rerun_removes_lists_of_failed_country() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::builder()
            .output_dir(dir.path())
            .build()
            .unwrap();

        let before = MemorySource::new().with_country("DE", ["1.2.3.0/24"], ["2003::/19"], ["3320"]);
        run_countries(&config, ["DE"], &before).await.unwrap();
        assert!(dir.path().join("ipv4/de.txt").exists());

        let summary = run_countries(&config, ["DE"], &MemorySource::new().fail("DE"))
            .await
            .unwrap();

        for kind in ["ipv4", "ipv6", "combined", "asn"] {
            assert!(!dir.path().join(kind).join("de.txt").exists(), "{kind}");
        }
        assert_eq!(summary.files_written, 0);
        assert_eq!(summary.files_skipped, 4);
    }

    #[tokio::test]
    async fn test_write_empty_policy() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path(), r#"[{"alpha-2": "AQ", "region": "Antarctica"}]"#);
        config.empty_policy = EmptyPolicy::Write;

        let summary = run_continents(&config, &MemorySource::new()).await.unwrap();

        let path = dir.path().join("out/ipv6/antarctica.txt");
        assert_eq!(fs::read_to_string(path).unwrap(), "");
        assert_eq!(summary.files_written, 4);
        assert_eq!(summary.files_skipped, 0);
    }

    #[tokio::test]
    async fn test_unavailable_mapping_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::builder()
            .mapping(dir.path().join("missing.json").to_string_lossy())
            .output_dir(dir.path().join("out"))
            .build()
            .unwrap();

        let result = run_continents(&config, &MemorySource::new()).await;

        assert!(matches!(result, Err(PipelineError::Mapping(_))));
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_run_countries_writes_per_country_lists() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::builder()
            .output_dir(dir.path())
            .build()
            .unwrap();
        let source = MemorySource::new()
            .with_country("DE", ["1.2.3.0/24"], ["2003::/19"], ["3320"])
            .fail("XX");

        let summary = run_countries(&config, ["DE", "XX"], &source).await.unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("combined/de.txt")).unwrap(),
            "1.2.3.0/24\n2003::/19\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("asn/de.txt")).unwrap(),
            "AS3320\n"
        );
        assert_eq!(summary.scope, Scope::Countries);
        assert_eq!(summary.countries_merged, 1);
        assert!(summary.has_failures());

        let metadata: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(summary.metadata.unwrap()).unwrap()).unwrap();
        assert_eq!(metadata["scope"], "countries");
        assert_eq!(metadata["failed_countries"][0], "XX");
    }

    #[test]
    fn test_open_source() {
        let config = ExportConfig::default();
        assert_eq!(
            open_source(SourceKind::Local, &config).unwrap().name(),
            "local"
        );
        assert!(open_source(SourceKind::RipeStat, &config).unwrap().is_remote());
    }
}
