//! prefix-export - per-country and per-continent IP prefix and ASN lists
//!
//! This library maps countries to continents, fetches the IPv4 prefixes,
//! IPv6 prefixes and AS numbers registered to each country, and writes
//! sorted, deduplicated line-delimited lists per country and per continent.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod region;
pub mod report;
pub mod source;

// Re-export core types for library users
pub use aggregate::{asn_label, Aggregation, Aggregator, CountryFailure, Pacer, ResourceSet};
pub use config::{ConfigError, ExportConfig, ExportConfigBuilder};
pub use error::PipelineError;
pub use output::{EmptyPolicy, OutputError, OutputLayout, ResourceKind};
pub use pipeline::{
    open_source, run_announced, run_continents, run_countries, ReportSummary, RunSummary,
    SourceKind,
};
pub use region::{normalize, ContinentMembership, CountryRecord, MappingError, RegionField};
pub use source::{
    CountryResources, FetchError, LocalFileSource, MemorySource, ResourceSource, RipeStatSource,
};
