// 🧹 Filter Engine
// Applies city / state / company-name criteria to a record table.
//
// Criteria are compiled once against the record schema (FilterEngine), then
// applied to any number of rows. All criteria AND together.

use crate::error::{LookupError, LookupResult};
use crate::matching::{contains_ignore_case, WordMatcher};
use crate::records::{Criterion, FilterField, Filterable, Schema};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ============================================================================
// CRITERIA
// ============================================================================

/// User-supplied filter values. `None` means the criterion was not given;
/// an empty string means it was given but imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, alias = "name")]
    pub company_name_part: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city(city: &str) -> Self {
        Self::new().with_city(city)
    }

    pub fn state(state: &str) -> Self {
        Self::new().with_state(state)
    }

    pub fn company_name_part(part: &str) -> Self {
        Self::new().with_company_name_part(part)
    }

    /// Builder pattern: add city
    pub fn with_city(mut self, city: &str) -> Self {
        self.city = Some(city.to_string());
        self
    }

    /// Builder pattern: add state abbreviation
    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    /// Builder pattern: add company name fragment
    pub fn with_company_name_part(mut self, part: &str) -> Self {
        self.company_name_part = Some(part.to_string());
        self
    }

    /// Criteria that were supplied, with their values
    pub fn supplied(&self) -> Vec<(Criterion, &str)> {
        [
            (Criterion::City, self.city.as_deref()),
            (Criterion::State, self.state.as_deref()),
            (Criterion::CompanyNamePart, self.company_name_part.as_deref()),
        ]
        .into_iter()
        .filter_map(|(criterion, value)| value.map(|v| (criterion, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.supplied().is_empty()
    }
}

// ============================================================================
// PREDICATES
// ============================================================================

#[derive(Debug, Clone)]
enum Predicate {
    /// Field contains the term as a separate word
    WholeWord { field: FilterField, matcher: WordMatcher },
    /// Field contains the term anywhere
    Substring { field: FilterField, needle: String },
}

impl Predicate {
    fn compile(criterion: Criterion, value: &str) -> LookupResult<Self> {
        let field = criterion.field();
        let value = value.trim();

        if criterion.is_whole_word() {
            Ok(Predicate::WholeWord {
                field,
                matcher: WordMatcher::new(value)?,
            })
        } else {
            Ok(Predicate::Substring {
                field,
                needle: value.to_lowercase(),
            })
        }
    }

    /// Missing fields never match
    fn matches<R: Filterable>(&self, record: &R) -> bool {
        match self {
            Predicate::WholeWord { field, matcher } => {
                record.field(*field).is_some_and(|text| matcher.is_match(text))
            }
            Predicate::Substring { field, needle } => record
                .field(*field)
                .is_some_and(|text| contains_ignore_case(text, needle)),
        }
    }
}

// ============================================================================
// FILTER ENGINE
// ============================================================================

#[derive(Debug, Clone)]
pub struct FilterEngine {
    schema: Schema,
    predicates: Vec<Predicate>,
}

impl FilterEngine {
    /// Compile criteria for a schema.
    ///
    /// Fails with `UnsupportedSchema` when nothing was supplied or when a
    /// supplied criterion does not apply to the schema's field set.
    pub fn compile(schema: Schema, criteria: &FilterCriteria) -> LookupResult<Self> {
        let supplied = criteria.supplied();

        if supplied.is_empty() {
            warn!(schema = schema.name(), "filter called without criteria");
            return Err(LookupError::unsupported(
                schema.name(),
                "no filter criteria supplied",
            ));
        }

        let mut predicates = Vec::new();

        for (criterion, value) in supplied {
            if !schema.supports(criterion) {
                warn!(
                    schema = schema.name(),
                    criterion = criterion.name(),
                    "criterion not applicable to schema"
                );
                return Err(LookupError::unsupported(
                    schema.name(),
                    format!("cannot filter by {}", criterion.name()),
                ));
            }

            // Empty value: criterion given, but no constraint
            if value.trim().is_empty() {
                continue;
            }

            predicates.push(Predicate::compile(criterion, value)?);
        }

        Ok(FilterEngine { schema, predicates })
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Number of active (constraining) predicates
    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    pub fn matches<R: Filterable>(&self, record: &R) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    /// Matching rows, cloned, in input order
    pub fn apply<R: Filterable + Clone>(&self, records: &[R]) -> Vec<R> {
        records
            .iter()
            .filter(|record| self.matches(*record))
            .cloned()
            .collect()
    }
}

/// Filter a table in one call
pub fn filter<R: Filterable + Clone>(
    records: &[R],
    criteria: &FilterCriteria,
) -> LookupResult<Vec<R>> {
    let engine = FilterEngine::compile(R::SCHEMA, criteria)?;
    let matched = engine.apply(records);

    debug!(
        schema = R::SCHEMA.name(),
        ?criteria,
        total = records.len(),
        matched = matched.len(),
        "filter applied"
    );

    Ok(matched)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CompanyRecord, LocationRecord};

    fn dispensaries() -> Vec<LocationRecord> {
        vec![
            LocationRecord::new("Green Leaf", "12 High St, Columbus, OH 43215", "555-0101"),
            LocationRecord::new("Buckeye Relief", "400 Main St, Man, OH 44444", "555-0102"),
            LocationRecord::new("Empire Cannabis", "1 Broadway, Manhattan, NY 10004", "555-0103"),
            LocationRecord::new("Rose City", "22 Burnside, Portland, OR 97209", "555-0104"),
            LocationRecord::new("Pine Tree", "9 Congress St, Portland, ME 04101", "555-0105"),
            LocationRecord::new("Ohio Valley", "8 River Rd, Marietta, oh 45750", "555-0106"),
        ]
    }

    fn companies() -> Vec<CompanyRecord> {
        vec![
            CompanyRecord::new("Acme Corp", "info@acme.com", "555-0201", "1 Main St, Columbus, OH"),
            CompanyRecord::new("ACME INC", "sales@acme.io", "555-0202", "2 Pike St, Seattle, WA"),
            CompanyRecord::new("Academic LLC", "", "555-0203", "3 Elm St, Toledo, OH"),
            CompanyRecord::new("", "nobody@example.com", "555-0204", "4 Oak St, Akron, OH"),
            CompanyRecord::new("Acme North", "", "555-0205", ""),
        ]
    }

    fn names<R: Filterable>(records: &[R]) -> Vec<&str> {
        records.iter().filter_map(|r| r.display_name()).collect()
    }

    #[test]
    fn test_filter_by_city_whole_word() {
        let records = dispensaries();

        let result = filter(&records, &FilterCriteria::city("Columbus")).unwrap();
        assert_eq!(names(&result), vec!["Green Leaf"]);

        // "Man" matches "Man, OH" but not "Manhattan"
        let result = filter(&records, &FilterCriteria::city("man")).unwrap();
        assert_eq!(names(&result), vec!["Buckeye Relief"]);

        let result = filter(&records, &FilterCriteria::city("Portland")).unwrap();
        assert_eq!(names(&result), vec!["Rose City", "Pine Tree"]);
    }

    #[test]
    fn test_filter_by_state_whole_word_case_insensitive() {
        let records = dispensaries();

        let result = filter(&records, &FilterCriteria::state("OH")).unwrap();
        assert_eq!(names(&result), vec!["Green Leaf", "Buckeye Relief", "Ohio Valley"]);

        let result = filter(&records, &FilterCriteria::state("ny")).unwrap();
        assert_eq!(names(&result), vec!["Empire Cannabis"]);
    }

    #[test]
    fn test_filter_combines_with_and_in_any_order() {
        let records = dispensaries();

        let a = filter(&records, &FilterCriteria::city("Portland").with_state("OR")).unwrap();
        let b = filter(&records, &FilterCriteria::state("OR").with_city("Portland")).unwrap();

        assert_eq!(names(&a), vec!["Rose City"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_filter_no_match_is_empty_not_error() {
        let records = dispensaries();
        let result = filter(&records, &FilterCriteria::city("Springfield")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let records = dispensaries();
        let before = records.clone();
        let _ = filter(&records, &FilterCriteria::state("OH")).unwrap();
        assert_eq!(records, before);
    }

    #[test]
    fn test_empty_value_imposes_no_constraint() {
        let records = dispensaries();
        let result = filter(&records, &FilterCriteria::city("")).unwrap();
        assert_eq!(result, records);

        let companies = companies();
        let result = filter(&companies, &FilterCriteria::company_name_part("")).unwrap();
        assert_eq!(result, companies);
    }

    #[test]
    fn test_company_name_is_substring_match() {
        let records = companies();

        let result = filter(&records, &FilterCriteria::company_name_part("acme")).unwrap();
        assert_eq!(names(&result), vec!["Acme Corp", "ACME INC", "Acme North"]);

        let result = filter(&records, &FilterCriteria::company_name_part("Ac")).unwrap();
        assert_eq!(
            names(&result),
            vec!["Acme Corp", "ACME INC", "Academic LLC", "Acme North"]
        );
    }

    #[test]
    fn test_missing_company_fields_never_match() {
        let records = companies();

        // The nameless record is only reachable without a name constraint
        let result = filter(&records, &FilterCriteria::company_name_part("a")).unwrap();
        assert!(result.iter().all(|c| c.legal_name.is_some()));

        // "Acme North" has no address, so a state filter drops it
        let result = filter(
            &records,
            &FilterCriteria::state("OH").with_company_name_part("acme"),
        )
        .unwrap();
        assert_eq!(names(&result), vec!["Acme Corp"]);
    }

    #[test]
    fn test_company_state_filter() {
        let records = companies();
        let result = filter(&records, &FilterCriteria::state("OH")).unwrap();
        assert_eq!(result.len(), 3);

        let result = filter(&records, &FilterCriteria::state("WA").with_company_name_part("")).unwrap();
        assert_eq!(names(&result), vec!["ACME INC"]);
    }

    #[test]
    fn test_no_criteria_is_unsupported() {
        let records = dispensaries();
        let err = filter(&records, &FilterCriteria::new()).unwrap_err();
        assert!(matches!(err, LookupError::UnsupportedSchema { .. }));
    }

    #[test]
    fn test_criterion_outside_schema_is_unsupported() {
        let err = filter(&dispensaries(), &FilterCriteria::company_name_part("acme")).unwrap_err();
        assert!(matches!(err, LookupError::UnsupportedSchema { .. }));

        let err = filter(&companies(), &FilterCriteria::city("Columbus")).unwrap_err();
        assert_eq!(
            err,
            LookupError::unsupported("Company", "cannot filter by city")
        );
    }

    #[test]
    fn test_engine_compiles_once() {
        let engine = FilterEngine::compile(
            Schema::Location,
            &FilterCriteria::state("OH").with_city(" "),
        )
        .unwrap();

        assert_eq!(engine.schema(), Schema::Location);
        assert_eq!(engine.predicate_count(), 1);
        assert_eq!(engine.apply(&dispensaries()).len(), 3);
    }

    #[test]
    fn test_criteria_deserialize_from_query_shape() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"state":"OH","name":"acme"}"#).unwrap();
        assert_eq!(criteria, FilterCriteria::state("OH").with_company_name_part("acme"));
        assert!(!criteria.is_empty());
    }
}
