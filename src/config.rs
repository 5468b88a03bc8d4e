// ⚙️ Configuration
// Where the reference data lives. Defaults follow the data/ layout shipped
// with the app; every path can be overridden on the command line.

use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DISPENSARY_FILE: &str = "data/data_set.csv";
pub const DEFAULT_COMPANY_FILE: &str = "data/second_data_set.csv";
pub const DEFAULT_LOCATIONS_FILE: &str = "data/unique_locations.csv";

/// Resolved paths of the three reference tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataConfig {
    pub dispensary_file: PathBuf,
    pub company_file: PathBuf,
    pub locations_file: PathBuf,
}

impl DataConfig {
    /// Default file names under `data_dir`
    pub fn in_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        let dir = data_dir.as_ref();

        DataConfig {
            dispensary_file: dir.join(DEFAULT_DISPENSARY_FILE),
            company_file: dir.join(DEFAULT_COMPANY_FILE),
            locations_file: dir.join(DEFAULT_LOCATIONS_FILE),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig::in_dir(".")
    }
}

/// Command-line flags shared by the CLI and the server
#[derive(Debug, Clone, Default, Args)]
pub struct DataArgs {
    /// Base directory containing data/
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Dispensary table (name, address, phone_number)
    #[arg(long, value_name = "PATH", global = true)]
    pub dispensaries: Option<PathBuf>,

    /// Company table (Company Legal Name, Company emails, Company Phone, ...)
    #[arg(long, value_name = "PATH", global = true)]
    pub companies: Option<PathBuf>,

    /// City/state reference table (city, state)
    #[arg(long, value_name = "PATH", global = true)]
    pub locations: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl DataArgs {
    /// Explicit file flags win over the data directory
    pub fn to_config(&self) -> DataConfig {
        let base = match &self.data_dir {
            Some(dir) => DataConfig::in_dir(dir),
            None => DataConfig::default(),
        };

        DataConfig {
            dispensary_file: self.dispensaries.clone().unwrap_or(base.dispensary_file),
            company_file: self.companies.clone().unwrap_or(base.company_file),
            locations_file: self.locations.clone().unwrap_or(base.locations_file),
        }
    }
}
