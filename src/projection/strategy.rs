//! Strategy parameters chosen by the worker

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::error::{SimResult, SimulationError};
use crate::profile::MAX_PROGRAM_MONTHS;

/// Highest salary base allowed, in UMA multiples
pub const MAX_UMA_LEVEL: u32 = 25;

/// How the registered salary base evolves over the strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Salary base frozen at the start month's value
    Fixed,
    /// Salary base follows each year's UMA update
    Progressive,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::Fixed, StrategyKind::Progressive];

    /// Single-letter tag used in strategy codes and CSV output
    pub fn tag(&self) -> char {
        match self {
            StrategyKind::Fixed => 'F',
            StrategyKind::Progressive => 'P',
        }
    }

    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'F' => Some(StrategyKind::Fixed),
            'P' => Some(StrategyKind::Progressive),
            _ => None,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Fixed => write!(f, "fixed"),
            StrategyKind::Progressive => write!(f, "progressive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyParameters {
    pub kind: StrategyKind,
    /// Salary base in UMA multiples (1-25)
    pub uma_level: u32,
    /// Number of contribution months (1-58)
    pub duration_months: u32,
    /// First contribution month
    pub start: YearMonth,
}

impl StrategyParameters {
    pub fn new(kind: StrategyKind, uma_level: u32, duration_months: u32, start: YearMonth) -> Self {
        Self {
            kind,
            uma_level,
            duration_months,
            start,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(1..=MAX_UMA_LEVEL).contains(&self.uma_level) {
            return Err(SimulationError::out_of_range("uma_level", self.uma_level, 1, MAX_UMA_LEVEL));
        }
        if !(1..=MAX_PROGRAM_MONTHS).contains(&self.duration_months) {
            return Err(SimulationError::out_of_range(
                "duration_months",
                self.duration_months,
                1,
                MAX_PROGRAM_MONTHS,
            ));
        }
        Ok(())
    }

    /// Last contribution month
    pub fn end(&self) -> YearMonth {
        self.start.plus_months(self.duration_months as i64 - 1)
    }
}
