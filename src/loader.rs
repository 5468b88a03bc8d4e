// 📂 Reference Data Loader
// CSV → typed records. Loaded once at startup, read-only afterwards.

use crate::config::DataConfig;
use crate::error::LookupError;
use crate::records::{CityState, CompanyRecord, LocationRecord, LocationReference, Schema};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

// ============================================================================
// CSV HELPERS
// ============================================================================

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader)
}

fn detect_schema<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Option<Schema>> {
    let headers = rdr.headers().context("Failed to read CSV header row")?;
    Ok(Schema::detect(headers.iter()))
}

fn deserialize_rows<T, R>(rdr: &mut csv::Reader<R>, what: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rows = Vec::new();

    for (index, result) in rdr.deserialize().enumerate() {
        // +2: header row, 1-based lines
        let row: T = result.with_context(|| {
            format!("Failed to deserialize {} on line {}", what, index + 2)
        })?;
        rows.push(row);
    }

    Ok(rows)
}

/// Read rows of a table that must carry `expected` schema
fn load_table<T, R>(reader: R, expected: Schema, what: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv_reader(reader);

    match detect_schema(&mut rdr)? {
        Some(schema) if schema == expected => deserialize_rows(&mut rdr, what),
        _ => Err(LookupError::unsupported(
            expected.name(),
            format!("{} table is missing its key column", what),
        )
        .into()),
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))
}

// ============================================================================
// TABLE LOADERS
// ============================================================================

pub fn load_locations_from_reader<R: Read>(reader: R) -> Result<Vec<LocationRecord>> {
    load_table(reader, Schema::Location, "dispensary")
}

pub fn load_companies_from_reader<R: Read>(reader: R) -> Result<Vec<CompanyRecord>> {
    load_table(reader, Schema::Company, "company")
}

pub fn load_location_reference_from_reader<R: Read>(reader: R) -> Result<LocationReference> {
    let mut rdr = csv_reader(reader);
    let rows: Vec<CityState> = deserialize_rows(&mut rdr, "city/state")?;
    Ok(LocationReference::from_rows(rows))
}

pub fn load_locations(path: &Path) -> Result<Vec<LocationRecord>> {
    load_locations_from_reader(open(path)?)
        .with_context(|| format!("Failed to load dispensaries from {:?}", path))
}

pub fn load_companies(path: &Path) -> Result<Vec<CompanyRecord>> {
    load_companies_from_reader(open(path)?)
        .with_context(|| format!("Failed to load companies from {:?}", path))
}

pub fn load_location_reference(path: &Path) -> Result<LocationReference> {
    load_location_reference_from_reader(open(path)?)
        .with_context(|| format!("Failed to load locations from {:?}", path))
}

// ============================================================================
// SCHEMA-DETECTED TABLE
// ============================================================================

/// A record table whose kind is decided by its header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordTable {
    Locations(Vec<LocationRecord>),
    Companies(Vec<CompanyRecord>),
}

impl RecordTable {
    /// Load any record table. Headers with neither `address` nor
    /// `Company Legal Name` fail with `LookupError::UnsupportedSchema`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv_reader(reader);

        match detect_schema(&mut rdr)? {
            Some(Schema::Location) => Ok(RecordTable::Locations(deserialize_rows(
                &mut rdr,
                "dispensary",
            )?)),
            Some(Schema::Company) => Ok(RecordTable::Companies(deserialize_rows(
                &mut rdr, "company",
            )?)),
            None => Err(LookupError::unsupported(
                "unknown",
                "table has neither an address nor a company name column",
            )
            .into()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_reader(open(path)?).with_context(|| format!("Failed to load {:?}", path))
    }

    pub fn schema(&self) -> Schema {
        match self {
            RecordTable::Locations(_) => Schema::Location,
            RecordTable::Companies(_) => Schema::Company,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordTable::Locations(rows) => rows.len(),
            RecordTable::Companies(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// REFERENCE DATA
// ============================================================================

/// Everything the finder needs, loaded once
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub dispensaries: Vec<LocationRecord>,
    pub companies: Vec<CompanyRecord>,
    pub locations: LocationReference,
    pub loaded_at: DateTime<Utc>,
}

/// Row counts for status displays
#[derive(Debug, Clone, Serialize)]
pub struct DataSummary {
    pub dispensaries: usize,
    pub companies: usize,
    pub cities: usize,
    pub states: usize,
    pub loaded_at: DateTime<Utc>,
}

impl ReferenceData {
    pub fn new(
        dispensaries: Vec<LocationRecord>,
        companies: Vec<CompanyRecord>,
        locations: LocationReference,
    ) -> Self {
        ReferenceData {
            dispensaries,
            companies,
            locations,
            loaded_at: Utc::now(),
        }
    }

    pub fn load(config: &DataConfig) -> Result<Self> {
        let dispensaries = load_locations(&config.dispensary_file)?;
        let companies = load_companies(&config.company_file)?;
        let locations = load_location_reference(&config.locations_file)?;

        info!(
            dispensaries = dispensaries.len(),
            companies = companies.len(),
            locations = locations.len(),
            dispensary_file = %config.dispensary_file.display(),
            company_file = %config.company_file.display(),
            locations_file = %config.locations_file.display(),
            "reference data loaded"
        );

        Ok(ReferenceData::new(dispensaries, companies, locations))
    }

    /// Distinct sorted cities for the city selector
    pub fn cities(&self) -> Vec<String> {
        self.locations.cities()
    }

    /// Distinct sorted states from the reference list
    pub fn states(&self) -> Vec<String> {
        self.locations.states()
    }

    pub fn summary(&self) -> DataSummary {
        DataSummary {
            dispensaries: self.dispensaries.len(),
            companies: self.companies.len(),
            cities: self.locations.cities().len(),
            states: self.locations.states().len(),
            loaded_at: self.loaded_at,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
