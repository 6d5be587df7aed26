//! Modalidad 40 contribution rates by calendar year
//!
//! The 2020 pension reform raises the employer "cesantía y vejez" share every
//! January from 2023 until 2030; a voluntary contributor pays the whole
//! obligation, so the rate climbs from 10.075% to 18.8%.

use std::collections::BTreeMap;

use crate::error::{SimResult, SimulationError};

/// Contribution rate (percent of the monthly salary base) by calendar year
#[derive(Debug, Clone)]
pub struct ContributionRateTable {
    rates: BTreeMap<i32, f64>,
}

impl ContributionRateTable {
    pub fn official() -> Self {
        let mut rates = vec![];
        for year in 2016..=2022 {
            rates.push((year, 10.075));
        }
        rates.extend([
            (2023, 11.166),
            (2024, 12.256),
            (2025, 13.347),
            (2026, 14.438),
            (2027, 15.528),
            (2028, 16.619),
            (2029, 17.709),
        ]);
        for year in 2030..=2035 {
            rates.push((year, 18.800));
        }
        Self::from_loaded(&rates)
    }

    pub fn from_loaded(rates: &[(i32, f64)]) -> Self {
        Self {
            rates: rates.iter().copied().collect(),
        }
    }

    /// Rate in percent for a calendar year
    pub fn rate_pct(&self, year: i32) -> SimResult<f64> {
        self.rates
            .get(&year)
            .copied()
            .ok_or(SimulationError::YearNotCovered {
                table: "contribution rate",
                year,
            })
    }
}
