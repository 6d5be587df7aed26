//! CSV-based reference table loader
//!
//! Loads the legal reference tables from CSV files in data/tables/

use std::error::Error;
use std::fs::File;
use std::path::Path;

use super::brackets::PensionBracket;

/// Default path to the tables directory
pub const DEFAULT_TABLES_PATH: &str = "data/tables";

/// Load UMA daily values from CSV
/// Returns Vec<(year, value)>
pub fn load_uma(path: &Path) -> Result<Vec<(i32, f64)>, Box<dyn Error>> {
    let file = File::open(path.join("uma.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut values = Vec::new();

    for result in reader.records() {
        let record = result?;
        let year: i32 = record[0].trim().parse()?;
        let value: f64 = record[1].trim().parse()?;
        values.push((year, value));
    }

    Ok(values)
}

/// Load contribution rates (percent) from CSV
/// Returns Vec<(year, rate_pct)>
pub fn load_contribution_rates(path: &Path) -> Result<Vec<(i32, f64)>, Box<dyn Error>> {
    let file = File::open(path.join("contribution_rates.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rates = Vec::new();

    for result in reader.records() {
        let record = result?;
        let year: i32 = record[0].trim().parse()?;
        let rate: f64 = record[1].trim().parse()?;
        rates.push((year, rate));
    }

    Ok(rates)
}

/// Load Ley 73 pension brackets from CSV
/// The open-ended top bracket uses `inf` as its threshold
pub fn load_pension_brackets(path: &Path) -> Result<Vec<PensionBracket>, Box<dyn Error>> {
    let file = File::open(path.join("pension_brackets.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut brackets = Vec::new();

    for result in reader.records() {
        let record = result?;
        brackets.push(PensionBracket {
            up_to_veces_uma: record[0].trim().parse()?,
            base_pct: record[1].trim().parse()?,
            increment_pct: record[2].trim().parse()?,
        });
    }

    if brackets.is_empty() {
        return Err("pension_brackets.csv has no rows".into());
    }

    Ok(brackets)
}

/// Load age reduction factors from CSV
/// Returns Vec<(age, factor)>
pub fn load_age_factors(path: &Path) -> Result<Vec<(u32, f64)>, Box<dyn Error>> {
    let file = File::open(path.join("age_factors.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut factors = Vec::new();

    for result in reader.records() {
        let record = result?;
        let age: u32 = record[0].trim().parse()?;
        let factor: f64 = record[1].trim().parse()?;
        factors.push((age, factor));
    }

    Ok(factors)
}

/// All tables as read from disk
pub struct LoadedTables {
    pub uma: Vec<(i32, f64)>,
    pub contribution_rates: Vec<(i32, f64)>,
    pub pension_brackets: Vec<PensionBracket>,
    pub age_factors: Vec<(u32, f64)>,
}

impl LoadedTables {
    /// Load all tables from the default path
    pub fn load_default() -> Result<Self, Box<dyn Error>> {
        Self::load_from(Path::new(DEFAULT_TABLES_PATH))
    }

    /// Load all tables from a specific path
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn Error>> {
        log::debug!("loading reference tables from {}", path.display());
        Ok(Self {
            uma: load_uma(path)?,
            contribution_rates: load_contribution_rates(path)?,
            pension_brackets: load_pension_brackets(path)?,
            age_factors: load_age_factors(path)?,
        })
    }
}
