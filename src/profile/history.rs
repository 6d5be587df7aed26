//! Contribution months, either already paid or planned

use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::error::{SimResult, SimulationError};

/// Maximum number of months a strategy can span (250 weeks)
pub const MAX_PROGRAM_MONTHS: u32 = 58;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthStatus {
    Paid,
    Planned,
}

/// One month of a Modalidad 40 strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionMonth {
    /// Position within the strategy (1-58)
    pub index: u32,
    pub month: YearMonth,
    /// Daily salary base registered for the month
    pub salary_base: f64,
    /// Salary base expressed in UMA multiples
    pub uma_multiple: f64,
    pub status: MonthStatus,
    /// Owed for a gap in the payment history
    #[serde(default)]
    pub retroactive: bool,
}

impl ContributionMonth {
    pub fn paid(index: u32, month: YearMonth, salary_base: f64, uma_multiple: f64) -> Self {
        Self {
            index,
            month,
            salary_base,
            uma_multiple,
            status: MonthStatus::Paid,
            retroactive: false,
        }
    }

    pub fn planned(index: u32, month: YearMonth, salary_base: f64, uma_multiple: f64) -> Self {
        Self {
            index,
            month,
            salary_base,
            uma_multiple,
            status: MonthStatus::Planned,
            retroactive: false,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == MonthStatus::Paid
    }
}

/// Check the ledger invariants: indices 1..=n without gaps, n <= 58, and
/// strictly increasing calendar months.
pub fn check_contiguous(months: &[ContributionMonth]) -> SimResult<()> {
    if months.len() > MAX_PROGRAM_MONTHS as usize {
        return Err(SimulationError::InvalidHistory(format!(
            "{} months exceed the {} month program limit",
            months.len(),
            MAX_PROGRAM_MONTHS
        )));
    }
    for (pos, month) in months.iter().enumerate() {
        let expected = pos as u32 + 1;
        if month.index != expected {
            return Err(SimulationError::InvalidHistory(format!(
                "month index {} found where {} was expected",
                month.index, expected
            )));
        }
    }
    for pair in months.windows(2) {
        if pair[1].month <= pair[0].month {
            return Err(SimulationError::InvalidHistory(format!(
                "{} does not follow {}",
                pair[1].month, pair[0].month
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paid_run(count: u32) -> Vec<ContributionMonth> {
        let start = YearMonth::new(2024, 2).unwrap();
        start
            .iter_months(count)
            .enumerate()
            .map(|(i, m)| ContributionMonth::paid(i as u32 + 1, m, 1628.55, 15.0))
            .collect()
    }

    #[test]
    fn test_contiguous_history_passes() {
        assert!(check_contiguous(&paid_run(10)).is_ok());
        assert!(check_contiguous(&[]).is_ok());
    }

    #[test]
    fn test_index_gap_rejected() {
        let mut months = paid_run(5);
        months.remove(2);
        assert!(matches!(
            check_contiguous(&months),
            Err(SimulationError::InvalidHistory(_))
        ));
    }

    #[test]
    fn test_unordered_calendar_rejected() {
        let mut months = paid_run(3);
        months.swap(1, 2);
        months[1].index = 2;
        months[2].index = 3;
        assert!(check_contiguous(&months).is_err());
    }

    #[test]
    fn test_too_many_months_rejected() {
        assert!(check_contiguous(&paid_run(59)).is_err());
    }
}
