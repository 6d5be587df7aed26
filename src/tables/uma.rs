//! UMA (Unidad de Medida y Actualización) daily values by year
//!
//! Published values through 2026; later years are projected at 4% annual
//! growth and must be refreshed whenever INEGI publishes a new value.

use std::collections::BTreeMap;

use crate::error::{SimResult, SimulationError};

/// Daily UMA value keyed by the year it takes effect (February 1st)
#[derive(Debug, Clone)]
pub struct UmaTable {
    values: BTreeMap<i32, f64>,
}

impl UmaTable {
    pub fn official() -> Self {
        Self::from_loaded(&[
            (2016, 73.04),
            (2017, 75.49),
            (2018, 80.60),
            (2019, 84.49),
            (2020, 86.88),
            (2021, 89.62),
            (2022, 96.22),
            (2023, 103.74),
            (2024, 108.57),
            (2025, 113.14),
            (2026, 117.31),
            // Projected
            (2027, 122.00),
            (2028, 126.88),
            (2029, 131.96),
            (2030, 137.23),
            (2031, 142.72),
            (2032, 148.43),
            (2033, 154.37),
            (2034, 160.54),
            (2035, 166.96),
        ])
    }

    pub fn from_loaded(values: &[(i32, f64)]) -> Self {
        Self {
            values: values.iter().copied().collect(),
        }
    }

    /// UMA for a calendar year; years outside coverage are an input error
    pub fn value(&self, year: i32) -> SimResult<f64> {
        self.values
            .get(&year)
            .copied()
            .ok_or(SimulationError::YearNotCovered { table: "UMA", year })
    }

    /// Inclusive range of covered years
    pub fn coverage(&self) -> Option<(i32, i32)> {
        let first = self.values.keys().next()?;
        let last = self.values.keys().next_back()?;
        Some((*first, *last))
    }
}
