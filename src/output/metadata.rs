//! Run metadata artifact

use super::OutputError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the metadata artifact inside the output root
pub const METADATA_FILE: &str = "metadata.json";

/// Format a UTC timestamp as `YYYY-MM-DDTHH:MM:SSZ`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`
pub fn utc_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// What a run exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Continent lists built from the mapping
    Continents,
    /// Per-country lists
    Countries,
}

/// Contents of `metadata.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunMetadata {
    /// Generation time
    pub generated_at_utc: String,
    /// What was exported
    pub scope: Scope,
    /// Number of continents with at least one list written
    pub continents: usize,
    /// Number of countries whose resources were merged
    pub countries: usize,
    /// Country codes whose fetch failed
    pub failed_countries: Vec<String>,
}

/// Write a value as pretty JSON followed by a newline
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let io_error = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, json).map_err(io_error)
}

/// Write `metadata.json` below `root`, returning its path
pub fn write_metadata(root: &Path, metadata: &RunMetadata) -> Result<PathBuf, OutputError> {
    let path = root.join(METADATA_FILE);
    write_json(&path, metadata)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 5, 4, 9).unwrap();
        assert_eq!(format_timestamp(at), "2024-03-07T05:04:09Z");
    }

    #[test]
    fn test_utc_timestamp_shape() {
        let ts = utc_timestamp();
        assert_eq!(ts.len(), 20);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
    }

    #[test]
    fn test_write_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = RunMetadata {
            generated_at_utc: "2024-03-07T05:04:09Z".to_string(),
            scope: Scope::Continents,
            continents: 5,
            countries: 249,
            failed_countries: vec!["XX".to_string()],
        };

        let path = write_metadata(dir.path(), &metadata).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("}\n"));

        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["scope"], "continents");
        assert_eq!(value["continents"], 5);
        assert_eq!(value["failed_countries"][0], "XX");
    }
}
