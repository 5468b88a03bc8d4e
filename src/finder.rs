// 🧭 Finder - the lookup flows behind every front end
//
// Dispensary flow: selection (city or state) → filter → sorted choices →
// resolve chosen name → detail + map link.
// Company flow: state + name fragment → filter → sorted table.
//
// Front ends (TUI, CLI, web) only render what comes back from here.

use crate::error::{LookupError, LookupResult};
use crate::filter::{filter, FilterCriteria};
use crate::loader::ReferenceData;
use crate::maps::{embed_url, map_link};
use crate::records::{CompanyRecord, LocationRecord};
use crate::resolver::{choices, resolve, sorted};
use crate::states::{self, StateEntry};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// SELECTION
// ============================================================================

/// What the user picked in the dispensary filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSelection {
    City(String),
    /// A state display label ("OH - Ohio") or a bare abbreviation
    State(String),
}

impl LocationSelection {
    /// Translate to filter criteria; state labels go through the registry
    pub fn criteria(&self) -> LookupResult<FilterCriteria> {
        match self {
            LocationSelection::City(city) => Ok(FilterCriteria::city(city)),
            LocationSelection::State(label) => {
                let entry = states::parse_display_label(label)?;
                Ok(FilterCriteria::state(entry.abbreviation))
            }
        }
    }

    /// Human-readable form used in messages
    pub fn describe(&self) -> String {
        match self {
            LocationSelection::City(city) => city.clone(),
            LocationSelection::State(label) => states::parse_display_label(label)
                .map(StateEntry::display_label)
                .unwrap_or_else(|_| label.clone()),
        }
    }
}

impl fmt::Display for LocationSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

// ============================================================================
// DETAIL
// ============================================================================

/// A resolved dispensary, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispensaryDetail {
    pub name: String,
    pub address: String,
    pub phone_number: String,
    /// Address passed through verbatim
    pub map_link: String,
    /// Address percent-encoded (iframe src)
    pub embed_url: String,
}

impl From<LocationRecord> for DispensaryDetail {
    fn from(record: LocationRecord) -> Self {
        DispensaryDetail {
            map_link: map_link(&record.address),
            embed_url: embed_url(&record.address),
            name: record.name,
            address: record.address,
            phone_number: record.phone_number,
        }
    }
}

// ============================================================================
// FINDER
// ============================================================================

/// Shared, read-only view over the reference data
#[derive(Debug, Clone)]
pub struct Finder {
    data: Arc<ReferenceData>,
}

impl Finder {
    pub fn new(data: Arc<ReferenceData>) -> Self {
        Finder { data }
    }

    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    pub fn cities(&self) -> Vec<String> {
        self.data.cities()
    }

    pub fn state_labels(&self) -> Vec<String> {
        states::display_labels()
    }

    /// Matching dispensaries sorted by name. Zero matches is `EmptyResult`.
    pub fn find_dispensaries(
        &self,
        selection: &LocationSelection,
    ) -> LookupResult<Vec<LocationRecord>> {
        let criteria = selection.criteria().inspect_err(|e| {
            warn!(selection = %selection.describe(), error = %e, "selection rejected");
        })?;

        let matched = sorted(&filter(&self.data.dispensaries, &criteria)?);
        debug!(selection = %selection, matched = matched.len(), "dispensaries found");

        if matched.is_empty() {
            return Err(LookupError::EmptyResult);
        }

        Ok(matched)
    }

    /// Distinct dispensary names for the selection, sorted
    pub fn dispensary_choices(&self, selection: &LocationSelection) -> LookupResult<Vec<String>> {
        Ok(choices(&self.find_dispensaries(selection)?))
    }

    /// Resolve one dispensary by name within the selection
    pub fn dispensary_detail(
        &self,
        selection: &LocationSelection,
        name: &str,
    ) -> LookupResult<DispensaryDetail> {
        let matched = self.find_dispensaries(selection)?;
        let record = resolve(&matched, name)?;
        Ok(record.into())
    }

    /// Companies in a state whose legal name contains `name_part`.
    /// `state` may be a display label or an abbreviation.
    pub fn find_companies(
        &self,
        state: Option<&str>,
        name_part: &str,
    ) -> LookupResult<Vec<CompanyRecord>> {
        let mut criteria = FilterCriteria::company_name_part(name_part);

        if let Some(label) = state {
            let entry = states::parse_display_label(label)?;
            criteria = criteria.with_state(entry.abbreviation);
        }

        let matched = sorted(&filter(&self.data.companies, &criteria)?);
        debug!(?state, name_part, matched = matched.len(), "companies found");

        if matched.is_empty() {
            return Err(LookupError::EmptyResult);
        }

        Ok(matched)
    }
}

// ============================================================================
// USER-FACING MESSAGES
// ============================================================================

/// Message for a failed dispensary lookup
pub fn dispensary_message(selection: &LocationSelection, error: &LookupError) -> String {
    match (selection, error) {
        (LocationSelection::City(city), LookupError::EmptyResult) => {
            format!("No dispensaries found in {}.", city)
        }
        (LocationSelection::State(_), LookupError::EmptyResult) => {
            format!("No dispensaries found in {}", selection.describe())
        }
        (_, LookupError::AbbreviationNotFound { .. }) => {
            format!("No data available for {}", selection.describe())
        }
        (_, LookupError::UnsupportedSchema { .. }) => "No valid filter criteria found.".to_string(),
        (_, other) => other.to_string(),
    }
}

/// Message for a failed company lookup
pub fn company_message(state: Option<&str>, name_part: &str, error: &LookupError) -> String {
    let place = state
        .map(|label| {
            states::parse_display_label(label)
                .map(StateEntry::display_label)
                .unwrap_or_else(|_| label.to_string())
        })
        .unwrap_or_else(|| "any state".to_string());

    match error {
        LookupError::EmptyResult => {
            format!("No companies found in {} matching '{}'.", place, name_part)
        }
        LookupError::AbbreviationNotFound { .. } => format!("No data available for {}", place),
        LookupError::UnsupportedSchema { .. } => {
            "No valid filter criteria found for company information.".to_string()
        }
        other => other.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::LocationReference;

    fn finder() -> Finder {
        let dispensaries = vec![
            LocationRecord::new("Green Leaf", "1554 N High St, Columbus, OH 43201", "555-0142"),
            LocationRecord::new("Buckeye Relief", "400 Main St, Man, OH 44444", "555-0117"),
            LocationRecord::new("Empire Cannabis", "1 Broadway, Manhattan, NY 10004", "555-0109"),
            LocationRecord::new("Green Leaf", "77 Court St, Cleveland, OH 44113", "555-0102"),
            LocationRecord::new("Abbey Road", "5 Abbey Rd, Cleveland, OH 44113", "555-0103"),
        ];
        let companies = vec![
            CompanyRecord::new("Acme Cultivation Corp", "", "", "55 E Long St, Columbus, OH"),
            CompanyRecord::new("ACME INC", "", "", "2 Pike St, Seattle, WA"),
            CompanyRecord::new("Buckeye Holdings", "", "", "100 Public Sq, Cleveland, OH"),
        ];

        Finder::new(Arc::new(ReferenceData::new(
            dispensaries,
            companies,
            LocationReference::default(),
        )))
    }

    #[test]
    fn test_find_by_state_label_sorted() {
        let finder = finder();
        let selection = LocationSelection::State("OH - Ohio".to_string());

        let found = finder.find_dispensaries(&selection).unwrap();
        let names: Vec<&str> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Abbey Road", "Buckeye Relief", "Green Leaf", "Green Leaf"]
        );

        assert_eq!(
            finder.dispensary_choices(&selection).unwrap(),
            vec!["Abbey Road", "Buckeye Relief", "Green Leaf"]
        );
    }

    #[test]
    fn test_find_by_city() {
        let finder = finder();
        let found = finder
            .find_dispensaries(&LocationSelection::City("Man".to_string()))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Buckeye Relief");
    }

    #[test]
    fn test_detail_uses_first_duplicate_and_map_link() {
        let finder = finder();
        let selection = LocationSelection::State("OH".to_string());

        let detail = finder.dispensary_detail(&selection, "Green Leaf").unwrap();
        assert_eq!(detail.address, "1554 N High St, Columbus, OH 43201");
        assert_eq!(
            detail.map_link,
            "https://www.google.com/maps?q=1554 N High St, Columbus, OH 43201&output=embed"
        );
        assert!(detail.embed_url.contains("1554%20N%20High%20St"));

        let err = finder.dispensary_detail(&selection, "Empire Cannabis").unwrap_err();
        assert_eq!(err, LookupError::not_found("Empire Cannabis"));
    }

    #[test]
    fn test_empty_result_and_message() {
        let finder = finder();

        let selection = LocationSelection::City("Springfield".to_string());
        let err = finder.find_dispensaries(&selection).unwrap_err();
        assert_eq!(err, LookupError::EmptyResult);
        assert_eq!(
            dispensary_message(&selection, &err),
            "No dispensaries found in Springfield."
        );

        let selection = LocationSelection::State("WA".to_string());
        let err = finder.find_dispensaries(&selection).unwrap_err();
        assert_eq!(
            dispensary_message(&selection, &err),
            "No dispensaries found in WA - Washington"
        );
    }

    #[test]
    fn test_unknown_state_is_reported() {
        let finder = finder();
        let selection = LocationSelection::State("ZZ - Nowhere".to_string());

        let err = finder.find_dispensaries(&selection).unwrap_err();
        assert!(matches!(err, LookupError::AbbreviationNotFound { .. }));
        assert_eq!(
            dispensary_message(&selection, &err),
            "No data available for ZZ - Nowhere"
        );
    }

    #[test]
    fn test_find_companies_state_and_name() {
        let finder = finder();

        let found = finder.find_companies(Some("OH - Ohio"), "acme").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].legal_name.as_deref(), Some("Acme Cultivation Corp"));

        let found = finder.find_companies(Some("OH"), "").unwrap();
        assert_eq!(found.len(), 2);

        let found = finder.find_companies(None, "acme").unwrap();
        let names: Vec<_> = found.iter().filter_map(|c| c.legal_name.as_deref()).collect();
        assert_eq!(names, vec!["ACME INC", "Acme Cultivation Corp"]);
    }

    #[test]
    fn test_company_empty_message() {
        let finder = finder();
        let err = finder.find_companies(Some("WA"), "buckeye").unwrap_err();
        assert_eq!(err, LookupError::EmptyResult);
        assert_eq!(
            company_message(Some("WA"), "buckeye", &err),
            "No companies found in WA - Washington matching 'buckeye'."
        );
    }
}
