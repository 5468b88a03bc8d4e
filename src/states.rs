// 🗺️ State Abbreviation Registry
// Fixed table of US states, DC and Canadian provinces/territories that appear
// in the dispensary data. Compiled in, never loaded or extended at runtime.

use crate::error::{LookupError, LookupResult};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Separator between abbreviation and full name in display labels
pub const LABEL_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateEntry {
    pub abbreviation: &'static str,
    pub full_name: &'static str,
}

impl StateEntry {
    const fn new(abbreviation: &'static str, full_name: &'static str) -> Self {
        StateEntry {
            abbreviation,
            full_name,
        }
    }

    /// "OH - Ohio"
    pub fn display_label(&self) -> String {
        format!("{}{}{}", self.abbreviation, LABEL_SEPARATOR, self.full_name)
    }
}

// ============================================================================
// STATE TABLE (sorted by abbreviation)
// ============================================================================

pub const STATE_ENTRIES: &[StateEntry] = &[
    StateEntry::new("AB", "Alberta"),
    StateEntry::new("AK", "Alaska"),
    StateEntry::new("AR", "Arkansas"),
    StateEntry::new("AZ", "Arizona"),
    StateEntry::new("BC", "British Columbia"),
    StateEntry::new("CA", "California"),
    StateEntry::new("CO", "Colorado"),
    StateEntry::new("CT", "Connecticut"),
    StateEntry::new("DC", "District of Columbia"),
    StateEntry::new("DE", "Delaware"),
    StateEntry::new("FL", "Florida"),
    StateEntry::new("HI", "Hawaii"),
    StateEntry::new("IA", "Iowa"),
    StateEntry::new("IL", "Illinois"),
    StateEntry::new("LA", "Louisiana"),
    StateEntry::new("MA", "Massachusetts"),
    StateEntry::new("MB", "Manitoba"),
    StateEntry::new("MD", "Maryland"),
    StateEntry::new("ME", "Maine"),
    StateEntry::new("MI", "Michigan"),
    StateEntry::new("MN", "Minnesota"),
    StateEntry::new("MO", "Missouri"),
    StateEntry::new("MS", "Mississippi"),
    StateEntry::new("MT", "Montana"),
    StateEntry::new("NC", "North Carolina"),
    StateEntry::new("ND", "North Dakota"),
    StateEntry::new("NH", "New Hampshire"),
    StateEntry::new("NJ", "New Jersey"),
    StateEntry::new("NL", "Newfoundland and Labrador"),
    StateEntry::new("NM", "New Mexico"),
    StateEntry::new("NV", "Nevada"),
    StateEntry::new("NY", "New York"),
    StateEntry::new("OH", "Ohio"),
    StateEntry::new("OK", "Oklahoma"),
    StateEntry::new("ON", "Ontario"),
    StateEntry::new("OR", "Oregon"),
    StateEntry::new("PA", "Pennsylvania"),
    StateEntry::new("RI", "Rhode Island"),
    StateEntry::new("SC", "South Carolina"),
    StateEntry::new("SD", "South Dakota"),
    StateEntry::new("SK", "Saskatchewan"),
    StateEntry::new("UT", "Utah"),
    StateEntry::new("VT", "Vermont"),
    StateEntry::new("WA", "Washington"),
    StateEntry::new("WV", "West Virginia"),
    StateEntry::new("YT", "Yukon Territory"),
];

static BY_ABBREVIATION: LazyLock<HashMap<&'static str, &'static StateEntry>> =
    LazyLock::new(|| {
        STATE_ENTRIES
            .iter()
            .map(|entry| (entry.abbreviation, entry))
            .collect()
    });

// ============================================================================
// LOOKUPS
// ============================================================================

/// Every registry entry, sorted by abbreviation
pub fn all_entries() -> &'static [StateEntry] {
    STATE_ENTRIES
}

/// Resolve an abbreviation ("oh", " OH ") to its registry entry
pub fn lookup(abbreviation: &str) -> LookupResult<&'static StateEntry> {
    let normalized = abbreviation.trim().to_ascii_uppercase();

    BY_ABBREVIATION
        .get(normalized.as_str())
        .copied()
        .ok_or_else(|| LookupError::AbbreviationNotFound {
            abbreviation: abbreviation.trim().to_string(),
        })
}

pub fn full_name_of(abbreviation: &str) -> LookupResult<&'static str> {
    lookup(abbreviation).map(|entry| entry.full_name)
}

/// Display labels for every entry, in abbreviation order
pub fn display_labels() -> Vec<String> {
    STATE_ENTRIES.iter().map(StateEntry::display_label).collect()
}

/// Parse "OH - Ohio" (or a bare "OH") back to its registry entry.
/// Only the abbreviation part is authoritative.
pub fn parse_display_label(label: &str) -> LookupResult<&'static StateEntry> {
    let abbreviation = label
        .split(LABEL_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim();

    lookup(abbreviation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_full_name_of_known_abbreviation() {
        assert_eq!(full_name_of("OH").unwrap(), "Ohio");
        assert_eq!(full_name_of("NL").unwrap(), "Newfoundland and Labrador");
        assert_eq!(full_name_of("dc").unwrap(), "District of Columbia");
        assert_eq!(full_name_of(" on ").unwrap(), "Ontario");
    }

    #[test]
    fn test_full_name_of_unknown_abbreviation() {
        let err = full_name_of("ZZ").unwrap_err();
        assert_eq!(
            err,
            LookupError::AbbreviationNotFound {
                abbreviation: "ZZ".to_string()
            }
        );

        // Real states missing from the source mapping are unknown too
        assert!(full_name_of("TX").is_err());
        assert!(full_name_of("").is_err());
    }

    #[test]
    fn test_entries_sorted_and_unique() {
        let entries = all_entries();
        assert_eq!(entries.len(), 46);

        let abbreviations: HashSet<&str> = entries.iter().map(|e| e.abbreviation).collect();
        assert_eq!(abbreviations.len(), entries.len());

        let names: HashSet<&str> = entries.iter().map(|e| e.full_name).collect();
        assert_eq!(names.len(), entries.len());

        assert!(entries
            .windows(2)
            .all(|pair| pair[0].abbreviation < pair[1].abbreviation));
        assert!(entries.iter().all(|e| e.abbreviation.len() == 2));
    }

    #[test]
    fn test_display_label_format() {
        let ohio = lookup("OH").unwrap();
        assert_eq!(ohio.display_label(), "OH - Ohio");

        let labels = display_labels();
        assert_eq!(labels.first().map(String::as_str), Some("AB - Alberta"));
        assert_eq!(labels.last().map(String::as_str), Some("YT - Yukon Territory"));
    }

    #[test]
    fn test_display_label_round_trip() {
        for entry in all_entries() {
            let label = entry.display_label();
            let abbreviation = label.split(" - ").next().unwrap().trim();
            assert_eq!(abbreviation, entry.abbreviation);

            let parsed = parse_display_label(&label).unwrap();
            assert_eq!(parsed, entry);
        }
    }

    #[test]
    fn test_parse_display_label_rejects_unknown() {
        assert!(parse_display_label("ZZ - Nowhere").is_err());
        assert_eq!(parse_display_label("WA").unwrap().full_name, "Washington");
    }
}
