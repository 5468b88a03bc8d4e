// Dispensary Finder - Core Library
// Exposes the lookup engine for the CLI/TUI, the API server, and tests

pub mod config;
pub mod error;
pub mod filter;
pub mod finder;
pub mod loader;
pub mod logging;
pub mod maps;
pub mod matching;
pub mod records;
pub mod resolver;
pub mod states;

// Re-export commonly used types
pub use config::{DataArgs, DataConfig};
pub use error::{LookupError, LookupResult};
pub use filter::{filter, FilterCriteria, FilterEngine};
pub use finder::{
    company_message, dispensary_message, DispensaryDetail, Finder, LocationSelection,
};
pub use loader::{
    load_companies, load_location_reference, load_locations, DataSummary, RecordTable,
    ReferenceData,
};
pub use maps::{embed_url, map_link};
pub use matching::{contains_ignore_case, contains_word, WordMatcher};
pub use records::{
    CityState, CompanyRecord, Criterion, FilterField, Filterable, LocationRecord,
    LocationReference, Schema,
};
pub use resolver::{choices, resolve, sort_by_display_name, sorted};
pub use states::{all_entries, display_labels, full_name_of, parse_display_label, StateEntry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
