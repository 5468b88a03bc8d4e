// 📇 Record Types
// Dispensary locations, companies and the city/state reference list.
// Column names are the CSV headers of the reference data files.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// SCHEMA
// ============================================================================

/// Which field set a record table carries. Decided once, when the table is
/// loaded, instead of probing columns on every filter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Schema {
    /// name / address / phone_number
    Location,
    /// Company Legal Name / emails / phone / address
    Company,
}

/// Text fields the filter engine can look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterField {
    Address,
    LegalName,
}

/// Filter criteria kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Criterion {
    City,
    State,
    CompanyNamePart,
}

impl Criterion {
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::City => "city",
            Criterion::State => "state",
            Criterion::CompanyNamePart => "company name",
        }
    }

    /// Field the criterion is tested against
    pub fn field(&self) -> FilterField {
        match self {
            Criterion::City | Criterion::State => FilterField::Address,
            Criterion::CompanyNamePart => FilterField::LegalName,
        }
    }

    /// City and state are whole-word tokens; company names are plain substrings
    pub fn is_whole_word(&self) -> bool {
        matches!(self, Criterion::City | Criterion::State)
    }
}

impl Schema {
    pub fn name(&self) -> &'static str {
        match self {
            Schema::Location => "Location",
            Schema::Company => "Company",
        }
    }

    pub fn fields(&self) -> &'static [FilterField] {
        match self {
            Schema::Location => &[FilterField::Address],
            Schema::Company => &[FilterField::LegalName, FilterField::Address],
        }
    }

    /// Criteria this schema accepts
    pub fn criteria(&self) -> &'static [Criterion] {
        match self {
            Schema::Location => &[Criterion::City, Criterion::State],
            Schema::Company => &[Criterion::State, Criterion::CompanyNamePart],
        }
    }

    pub fn supports(&self, criterion: Criterion) -> bool {
        self.criteria().contains(&criterion)
    }

    /// Detect the schema from a CSV header row. A `Company Legal Name` column
    /// marks a company table even when it also carries an `address` column.
    pub fn detect<'a, I>(headers: I) -> Option<Schema>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();

        if headers.contains(&COMPANY_NAME_COLUMN) {
            Some(Schema::Company)
        } else if headers.contains(&LOCATION_ADDRESS_COLUMN) {
            Some(Schema::Location)
        } else {
            None
        }
    }
}

pub const LOCATION_ADDRESS_COLUMN: &str = "address";
pub const COMPANY_NAME_COLUMN: &str = "Company Legal Name";

// ============================================================================
// FILTERABLE RECORDS
// ============================================================================

/// A record the filter engine and resolver can work on
pub trait Filterable {
    const SCHEMA: Schema;

    /// Value of a filterable field (None = missing)
    fn field(&self, field: FilterField) -> Option<&str>;

    /// Name shown in choice lists and used as the resolve key
    fn display_name(&self) -> Option<&str>;
}

/// Dispensary location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
}

impl LocationRecord {
    pub fn new(name: &str, address: &str, phone_number: &str) -> Self {
        LocationRecord {
            name: name.to_string(),
            address: address.to_string(),
            phone_number: phone_number.to_string(),
        }
    }
}

impl Filterable for LocationRecord {
    const SCHEMA: Schema = Schema::Location;

    fn field(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Address => Some(&self.address),
            FilterField::LegalName => None,
        }
    }

    fn display_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Company record. Legal name and address cells may be blank in the source
/// file; blank cells become `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(rename = "Company Legal Name", default, deserialize_with = "blank_as_none")]
    pub legal_name: Option<String>,

    #[serde(rename = "Company emails", default)]
    pub emails: String,

    #[serde(rename = "Company Phone", default)]
    pub phone: String,

    #[serde(
        rename = "Company Address",
        alias = "address",
        default,
        deserialize_with = "blank_as_none"
    )]
    pub address: Option<String>,
}

impl CompanyRecord {
    pub fn new(legal_name: &str, emails: &str, phone: &str, address: &str) -> Self {
        let non_blank = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());

        CompanyRecord {
            legal_name: non_blank(legal_name),
            emails: emails.to_string(),
            phone: phone.to_string(),
            address: non_blank(address),
        }
    }
}

impl Filterable for CompanyRecord {
    const SCHEMA: Schema = Schema::Company;

    fn field(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Address => self.address.as_deref(),
            FilterField::LegalName => self.legal_name.as_deref(),
        }
    }

    fn display_name(&self) -> Option<&str> {
        self.legal_name.as_deref()
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

// ============================================================================
// LOCATION REFERENCE
// ============================================================================

/// One row of the city/state reference list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityState {
    pub city: String,
    #[serde(default)]
    pub state: String,
}

/// Distinct (city, state) pairs used to populate selection lists
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocationReference {
    pairs: Vec<CityState>,
}

impl LocationReference {
    /// Build from raw rows; blank cities are dropped and duplicates removed
    pub fn from_rows(rows: Vec<CityState>) -> Self {
        let mut pairs: Vec<CityState> = rows
            .into_iter()
            .map(|row| CityState {
                city: row.city.trim().to_string(),
                state: row.state.trim().to_string(),
            })
            .filter(|row| !row.city.is_empty())
            .collect();

        pairs.sort_by(|a, b| (&a.city, &a.state).cmp(&(&b.city, &b.state)));
        pairs.dedup();

        LocationReference { pairs }
    }

    pub fn pairs(&self) -> &[CityState] {
        &self.pairs
    }

    /// Distinct cities, sorted
    pub fn cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = self.pairs.iter().map(|p| p.city.clone()).collect();
        cities.sort();
        cities.dedup();
        cities
    }

    /// Distinct non-blank states, sorted
    pub fn states(&self) -> Vec<String> {
        let mut states: Vec<String> = self
            .pairs
            .iter()
            .filter(|p| !p.state.is_empty())
            .map(|p| p.state.clone())
            .collect();
        states.sort();
        states.dedup();
        states
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_detection() {
        assert_eq!(
            Schema::detect(["name", "address", "phone_number"]),
            Some(Schema::Location)
        );
        assert_eq!(
            Schema::detect(["Company Legal Name", "Company emails", "Company Phone"]),
            Some(Schema::Company)
        );
        assert_eq!(Schema::detect(["city", "state"]), None);
        assert_eq!(Schema::detect([" address "]), Some(Schema::Location));
        assert_eq!(
            Schema::detect(["Company Legal Name", "address"]),
            Some(Schema::Company)
        );
    }

    #[test]
    fn test_schema_criteria() {
        assert!(Schema::Location.supports(Criterion::City));
        assert!(Schema::Location.supports(Criterion::State));
        assert!(!Schema::Location.supports(Criterion::CompanyNamePart));

        assert!(Schema::Company.supports(Criterion::State));
        assert!(Schema::Company.supports(Criterion::CompanyNamePart));
        assert!(!Schema::Company.supports(Criterion::City));

        for schema in [Schema::Location, Schema::Company] {
            for criterion in schema.criteria() {
                assert!(schema.fields().contains(&criterion.field()));
            }
        }
    }

    #[test]
    fn test_company_blank_fields_are_missing() {
        let company = CompanyRecord::new("  ", "a@b.com", "555", "");
        assert_eq!(company.display_name(), None);
        assert_eq!(company.field(FilterField::Address), None);

        let company = CompanyRecord::new("Acme Corp", "", "", "1 Main St, Columbus, OH");
        assert_eq!(company.display_name(), Some("Acme Corp"));
        assert_eq!(
            company.field(FilterField::Address),
            Some("1 Main St, Columbus, OH")
        );
    }

    #[test]
    fn test_location_fields() {
        let record = LocationRecord::new("Green Leaf", "12 Oak Ave, Akron, OH", "555-0100");
        assert_eq!(record.display_name(), Some("Green Leaf"));
        assert_eq!(record.field(FilterField::Address), Some("12 Oak Ave, Akron, OH"));
        assert_eq!(record.field(FilterField::LegalName), None);
    }

    #[test]
    fn test_location_reference_distinct_sorted() {
        let rows = vec![
            CityState { city: "Toledo".to_string(), state: "OH".to_string() },
            CityState { city: "Akron".to_string(), state: "OH".to_string() },
            CityState { city: "Toledo".to_string(), state: "OH".to_string() },
            CityState { city: "Portland".to_string(), state: "OR".to_string() },
            CityState { city: "Portland".to_string(), state: "ME".to_string() },
            CityState { city: " ".to_string(), state: "WA".to_string() },
        ];

        let reference = LocationReference::from_rows(rows);

        assert_eq!(reference.len(), 4);
        assert_eq!(reference.cities(), vec!["Akron", "Portland", "Toledo"]);
        assert_eq!(reference.states(), vec!["ME", "OH", "OR"]);
    }
}
