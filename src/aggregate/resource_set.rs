//! Deduplicated per-scope resource sets

use crate::output::ResourceKind;
use crate::source::CountryResources;
use std::collections::BTreeSet;

/// Render an AS number with exactly one `AS` tag
///
/// `42` and `AS42` both become `AS42`; a lowercase tag is normalized.
/// Returns `None` for a blank entry.
pub fn asn_label(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let number = match raw.get(..2) {
        Some(tag) if tag.eq_ignore_ascii_case("as") => &raw[2..],
        _ => raw,
    }
    .trim();
    (!number.is_empty()).then(|| format!("AS{number}"))
}

/// IPv4 prefixes, IPv6 prefixes and ASNs of a country or continent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet {
    /// IPv4 prefixes
    pub ipv4: BTreeSet<String>,
    /// IPv6 prefixes
    pub ipv6: BTreeSet<String>,
    /// AS numbers, tagged `AS<n>`
    pub asn: BTreeSet<String>,
}

impl ResourceSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Union one country's resources into this set
    pub fn merge(&mut self, resources: CountryResources) {
        insert_trimmed(&mut self.ipv4, resources.ipv4);
        insert_trimmed(&mut self.ipv6, resources.ipv6);
        self.asn
            .extend(resources.asn.iter().filter_map(|raw| asn_label(raw)));
    }

    /// IPv4 and IPv6 prefixes together; ASNs are never included
    pub fn combined(&self) -> BTreeSet<String> {
        self.ipv4.union(&self.ipv6).cloned().collect()
    }

    /// Entries of one artifact kind
    pub fn entries(&self, kind: ResourceKind) -> BTreeSet<String> {
        match kind {
            ResourceKind::Ipv4 => self.ipv4.clone(),
            ResourceKind::Ipv6 => self.ipv6.clone(),
            ResourceKind::Asn => self.asn.clone(),
            ResourceKind::Combined => self.combined(),
        }
    }

    /// Whether the set holds no resources at all
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty() && self.asn.is_empty()
    }
}

impl From<CountryResources> for ResourceSet {
    fn from(resources: CountryResources) -> Self {
        let mut set = ResourceSet::new();
        set.merge(resources);
        set
    }
}

fn insert_trimmed(set: &mut BTreeSet<String>, entries: Vec<String>) {
    for entry in entries {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.len() == entry.len() {
            set.insert(entry);
        } else {
            set.insert(trimmed.to_string());
        }
    }
}
