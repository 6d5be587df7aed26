//! Month-by-month contribution ledger

use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;

/// A single row of the contribution ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyContribution {
    pub index: u32,
    pub month: YearMonth,
    pub salary_base: f64,
    pub uma_multiple: f64,
    /// Contribution rate applied (percent)
    pub rate_pct: f64,
    pub premium: f64,
    /// Running total including this month
    pub cumulative: f64,
    pub paid: bool,
    pub retroactive: bool,
}

/// Ordered contribution ledger for one strategy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionSchedule {
    pub months: Vec<MonthlyContribution>,
}

impl ContributionSchedule {
    pub fn new() -> Self {
        Self { months: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn total_investment(&self) -> f64 {
        self.months.last().map(|m| m.cumulative).unwrap_or(0.0)
    }

    /// Investment still to be paid (planned months only)
    pub fn pending_investment(&self) -> f64 {
        self.months.iter().filter(|m| !m.paid).map(|m| m.premium).sum()
    }

    pub fn first_month(&self) -> Option<YearMonth> {
        self.months.first().map(|m| m.month)
    }

    pub fn last_month(&self) -> Option<YearMonth> {
        self.months.last().map(|m| m.month)
    }

    pub fn salary_bases(&self) -> impl Iterator<Item = f64> + '_ {
        self.months.iter().map(|m| m.salary_base)
    }

    /// Contribution rate of the first month, or 0 for an empty ledger
    pub fn initial_rate_pct(&self) -> f64 {
        self.months.first().map(|m| m.rate_pct).unwrap_or(0.0)
    }
}
