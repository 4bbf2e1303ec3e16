//! Country to continent mapping

pub mod index;
pub mod mapping;
pub mod normalize;

pub use index::{ContinentKey, ContinentMembership, CountryCode, CountryRecord, RegionField};
pub use mapping::{load_mapping, parse_mapping, MappingError, MappingSource, DEFAULT_MAPPING_URL};
pub use normalize::normalize;
