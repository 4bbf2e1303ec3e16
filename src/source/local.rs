//! Source backed by previously exported per-country files

use super::{CountryResources, FetchError, ResourceSource};
use crate::output::{read_lines, OutputLayout, ResourceKind};
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads `ipv4/<cc>.txt`, `ipv6/<cc>.txt` and `asn/<cc>.txt` below a root
///
/// This is the layout written by a per-country export, so a continent run
/// can be built from an earlier country run without touching the network.
/// A missing file counts as an empty list; a country with none of the three
/// files is reported as [`FetchError::NotFound`].
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    layout: OutputLayout,
}

impl LocalFileSource {
    /// Create a source reading below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: OutputLayout::new(root),
        }
    }

    fn read(&self, kind: ResourceKind, key: &str) -> Result<Option<Vec<String>>, FetchError> {
        let path = self.layout.path(kind, key);
        read_lines(&path).map_err(|source| FetchError::Io { path, source })
    }
}

#[async_trait]
impl ResourceSource for LocalFileSource {
    async fn fetch(&self, country_code: &str) -> Result<CountryResources, FetchError> {
        let key = country_code.to_lowercase();

        let ipv4 = self.read(ResourceKind::Ipv4, &key)?;
        let ipv6 = self.read(ResourceKind::Ipv6, &key)?;
        let asn = self.read(ResourceKind::Asn, &key)?;

        if ipv4.is_none() && ipv6.is_none() && asn.is_none() {
            return Err(FetchError::NotFound(country_code.to_string()));
        }

        Ok(CountryResources {
            ipv4: ipv4.unwrap_or_default(),
            ipv6: ipv6.unwrap_or_default(),
            asn: asn.unwrap_or_default(),
        })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_fetch_reads_lowercase_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ipv4")).unwrap();
        fs::create_dir_all(dir.path().join("asn")).unwrap();
        fs::write(dir.path().join("ipv4/de.txt"), "1.2.3.0/24\n").unwrap();
        fs::write(dir.path().join("asn/de.txt"), "AS3320\n").unwrap();

        let source = LocalFileSource::new(dir.path());
        let resources = source.fetch("DE").await.unwrap();

        assert_eq!(resources.ipv4, vec!["1.2.3.0/24"]);
        assert!(resources.ipv6.is_empty());
        assert_eq!(resources.asn, vec!["AS3320"]);
        assert!(!source.is_remote());
    }

    #[tokio::test]
    async fn test_fetch_unknown_country() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalFileSource::new(dir.path());

        match source.fetch("XX").await {
            Err(FetchError::NotFound(cc)) => assert_eq!(cc, "XX"),
            other => panic!("Expected NotFound, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where a file is expected cannot be read as text
        fs::create_dir_all(dir.path().join("ipv6/fr.txt")).unwrap();

        let source = LocalFileSource::new(dir.path());
        assert!(matches!(
            source.fetch("FR").await,
            Err(FetchError::Io { .. })
        ));
    }
}
