// ⚠️ Lookup Conditions
// Every way a filter / resolve / registry lookup can fail to produce a record.
// All of them are recoverable by the caller: the front ends turn them into
// warnings or "nothing found" messages, never into a crash.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum LookupError {
    /// The table has no field set that the requested criteria can be applied to
    #[error("No valid filter criteria found for {schema} records: {reason}")]
    UnsupportedSchema { schema: String, reason: String },

    /// The chosen key matches no record in the (filtered) table
    #[error("No record named '{key}'")]
    NotFound { key: String },

    /// The filter produced zero records, so there was nothing to choose from
    #[error("No matching records")]
    EmptyResult,

    /// State code outside the fixed registry
    #[error("Unknown state abbreviation '{abbreviation}'")]
    AbbreviationNotFound { abbreviation: String },

    /// Whole-word matcher could not be compiled
    #[error("Invalid match pattern for '{term}': {message}")]
    InvalidPattern { term: String, message: String },
}

impl LookupError {
    pub fn unsupported(schema: &str, reason: impl Into<String>) -> Self {
        LookupError::UnsupportedSchema {
            schema: schema.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(key: &str) -> Self {
        LookupError::NotFound {
            key: key.to_string(),
        }
    }

    /// Short machine-readable name (used by the JSON API and logs)
    pub fn code(&self) -> &'static str {
        match self {
            LookupError::UnsupportedSchema { .. } => "unsupported_schema",
            LookupError::NotFound { .. } => "not_found",
            LookupError::EmptyResult => "empty_result",
            LookupError::AbbreviationNotFound { .. } => "abbreviation_not_found",
            LookupError::InvalidPattern { .. } => "invalid_pattern",
        }
    }
}

pub type LookupResult<T> = std::result::Result<T, LookupError>;
