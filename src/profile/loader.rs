//! Load profiles (JSON) and contribution history (CSV)

use super::{ContributionMonth, MonthStatus, Profile};
use crate::calendar::YearMonth;
use csv::Reader;
use std::error::Error;
use std::fs::File;
use std::path::Path;

/// Raw CSV row of a contribution history export
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Index")]
    index: u32,
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "SalaryBase")]
    salary_base: f64,
    #[serde(rename = "UmaMultiple")]
    uma_multiple: f64,
    #[serde(rename = "Status", default)]
    status: Option<String>,
    #[serde(rename = "Retroactive", default)]
    retroactive: Option<bool>,
}

impl CsvRow {
    fn to_month(self) -> Result<ContributionMonth, Box<dyn Error>> {
        let month: YearMonth = self.month.parse()?;

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("paid") | Some("Paid") => MonthStatus::Paid,
            Some("planned") | Some("Planned") => MonthStatus::Planned,
            Some(other) => return Err(format!("Unknown Status: {}", other).into()),
        };

        Ok(ContributionMonth {
            index: self.index,
            month,
            salary_base: self.salary_base,
            uma_multiple: self.uma_multiple,
            status,
            retroactive: self.retroactive.unwrap_or(false),
        })
    }
}

/// Load a contribution history from a CSV file
pub fn load_history<P: AsRef<Path>>(path: P) -> Result<Vec<ContributionMonth>, Box<dyn Error>> {
    let file = File::open(path)?;
    load_history_from_reader(file)
}

/// Load a contribution history from any reader
pub fn load_history_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<ContributionMonth>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut months = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        months.push(row.to_month()?);
    }

    Ok(months)
}

/// Load a profile from a JSON file
pub fn load_profile<P: AsRef<Path>>(path: P) -> Result<Profile, Box<dyn Error>> {
    let file = File::open(path)?;
    let profile: Profile = serde_json::from_reader(file)?;
    profile.validate()?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_history_from_reader() {
        let data = "\
Index,Month,SalaryBase,UmaMultiple,Status,Retroactive
1,2024-02,1628.55,15,paid,false
2,2024-03,1628.55,15,,
3,2024-04,1628.55,15,planned,
";
        let months = load_history_from_reader(data.as_bytes()).unwrap();
        assert_eq!(months.len(), 3);
        assert_eq!(months[0].month, YearMonth::new(2024, 2).unwrap());
        assert!(months[1].is_paid());
        assert_eq!(months[2].status, MonthStatus::Planned);
        assert!(!months[2].retroactive);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let data = "Index,Month,SalaryBase,UmaMultiple,Status\n1,2024-02,100.0,1,pending\n";
        assert!(load_history_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_bad_month_rejected() {
        let data = "Index,Month,SalaryBase,UmaMultiple\n1,02/2024,100.0,1\n";
        assert!(load_history_from_reader(data.as_bytes()).is_err());
    }
}
