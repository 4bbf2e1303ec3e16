//! Region name normalization
//!
//! Turns free-text region names ("Latin America and the Caribbean",
//! "Sub-Saharan Africa") into keys that are safe to use as file names.

/// Separator placed between alphanumeric runs of a continent key
pub const KEY_SEPARATOR: char = '_';

/// Normalize a region name into a canonical continent key
///
/// The result is lowercase. Every maximal run of characters outside
/// `[a-z0-9]` collapses into a single [`KEY_SEPARATOR`], and separators at
/// either end are dropped. An empty or whitespace-only name yields an empty
/// string, which callers treat as "no region".
///
/// # Examples
///
/// ```
/// use prefix_export::region::normalize;
///
/// assert_eq!(normalize("Latin America and the Caribbean"), "latin_america_and_the_caribbean");
/// assert_eq!(normalize("  Europe  "), "europe");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !key.is_empty() {
                key.push(KEY_SEPARATOR);
            }
            pending_separator = false;
            key.push(ch);
        } else {
            pending_separator = true;
        }
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_examples() {
        assert_eq!(
            normalize("Latin America and the Caribbean"),
            "latin_america_and_the_caribbean"
        );
        assert_eq!(normalize("  Europe  "), "europe");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t "), "");
    }

    #[test]
    fn test_normalize_collapses_punctuation_runs() {
        assert_eq!(normalize("Sub-Saharan Africa"), "sub_saharan_africa");
        assert_eq!(normalize("sub saharan africa"), "sub_saharan_africa");
        assert_eq!(normalize("--Asia & Pacific!!"), "asia_pacific");
        assert_eq!(normalize("Region 150"), "region_150");
    }

    #[test]
    fn test_normalize_non_ascii_is_separator() {
        // Accented letters fall outside [a-z0-9]
        assert_eq!(normalize("Réunion"), "r_union");
        assert_eq!(normalize("ÅLAND"), "land");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "Latin America and the Caribbean",
            "  Europe  ",
            "Sub-Saharan Africa",
            "__already_normal__",
            "Réunion / Mayotte",
            "UPPER lower 123",
            "!!!",
        ];

        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_normalize_only_separators() {
        assert_eq!(normalize("!!!"), "");
        assert_eq!(normalize("_"), "");
    }
}
