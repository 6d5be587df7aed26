//! Legal reference tables: UMA values, contribution rates, pension brackets
//! and age factors

mod uma;
mod contribution;
mod brackets;
mod age_factor;
pub mod loader;

pub use uma::UmaTable;
pub use contribution::ContributionRateTable;
pub use brackets::{PensionBracket, PensionBracketTable};
pub use age_factor::AgeFactorTable;
pub use loader::LoadedTables;

use std::path::Path;

/// Version tag of the built-in tables
pub const OFFICIAL_TABLES_VERSION: &str = "2026.1";

/// Container for every table the pipeline reads.
///
/// Built once and shared read-only across all scenario evaluations.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    pub version: String,
    pub uma: UmaTable,
    pub contribution: ContributionRateTable,
    pub brackets: PensionBracketTable,
    pub age_factors: AgeFactorTable,
}

impl ReferenceTables {
    /// Built-in tables (published values plus projected UMA)
    pub fn official() -> Self {
        Self {
            version: OFFICIAL_TABLES_VERSION.to_string(),
            uma: UmaTable::official(),
            contribution: ContributionRateTable::official(),
            brackets: PensionBracketTable::official(),
            age_factors: AgeFactorTable::official(),
        }
    }

    /// Load tables from CSV files in the default location (data/tables/)
    pub fn from_csv() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_csv_path(Path::new(loader::DEFAULT_TABLES_PATH))
    }

    /// Load tables from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let loaded = LoadedTables::load_from(path)?;

        Ok(Self {
            version: format!("csv:{}", path.display()),
            uma: UmaTable::from_loaded(&loaded.uma),
            contribution: ContributionRateTable::from_loaded(&loaded.contribution_rates),
            brackets: PensionBracketTable::from_loaded(&loaded.pension_brackets),
            age_factors: AgeFactorTable::from_loaded(&loaded.age_factors),
        })
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::official()
    }
}
