//! Line-delimited set files

use super::OutputError;
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// The four artifacts produced per country or continent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// IPv4 prefixes
    Ipv4,
    /// IPv6 prefixes
    Ipv6,
    /// AS numbers
    Asn,
    /// IPv4 and IPv6 prefixes together
    Combined,
}

impl ResourceKind {
    /// Directory the artifact lives in
    pub fn dir_name(&self) -> &'static str {
        match self {
            ResourceKind::Ipv4 => "ipv4",
            ResourceKind::Ipv6 => "ipv6",
            ResourceKind::Asn => "asn",
            ResourceKind::Combined => "combined",
        }
    }

    /// All kinds in output order
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Ipv4,
            ResourceKind::Ipv6,
            ResourceKind::Combined,
            ResourceKind::Asn,
        ]
    }
}

/// Maps artifacts to paths below an output root
///
/// `<root>/<kind>/<key>.txt`, e.g. `out/ipv4/europe.txt` or `out/asn/de.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Create a layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of an artifact
    pub fn path(&self, kind: ResourceKind, key: &str) -> PathBuf {
        self.root.join(kind.dir_name()).join(format!("{key}.txt"))
    }
}

/// Write `items` deduplicated and sorted, one per line
///
/// Parent directories are created as needed. Each line, including the last,
/// ends with `\n`. Returns the number of lines written.
pub fn write_set<I, S>(path: &Path, items: I) -> Result<usize, OutputError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lines: BTreeSet<String> = items
        .into_iter()
        .map(|item| item.as_ref().to_string())
        .collect();

    let io_error = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let file = fs::File::create(path).map_err(io_error)?;
    let mut out = BufWriter::new(file);
    for line in &lines {
        out.write_all(line.as_bytes()).map_err(io_error)?;
        out.write_all(b"\n").map_err(io_error)?;
    }
    out.flush().map_err(io_error)?;

    Ok(lines.len())
}

/// Read a set file written by [`write_set`]
///
/// Lines are trimmed and blank lines dropped. A missing file yields
/// `Ok(None)`.
pub fn read_lines(path: &Path) -> std::io::Result<Option<Vec<String>>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    Ok(Some(
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    ))
}
