//! Salary base (SDI) projection for each month of a strategy

use crate::calendar::YearMonth;
use crate::error::{SimResult, SimulationError};
use crate::tables::UmaTable;

use super::strategy::StrategyKind;

/// Projects the daily salary base for any month of a strategy window.
///
/// Each variant knows how to answer `salary_base(month_index)`, so callers
/// never branch on the strategy kind themselves.
#[derive(Debug, Clone)]
pub enum SalaryBaseProjector<'t> {
    /// Value computed once at the start month
    Fixed { salary_base: f64 },
    /// Value recomputed every month from that month's UMA
    Progressive {
        uma_multiple: f64,
        start: YearMonth,
        uma: &'t UmaTable,
    },
}

impl<'t> SalaryBaseProjector<'t> {
    pub fn new(kind: StrategyKind, uma_multiple: f64, start: YearMonth, uma: &'t UmaTable) -> SimResult<Self> {
        if !uma_multiple.is_finite() || uma_multiple <= 0.0 {
            return Err(SimulationError::OutOfRange {
                field: "uma_multiple",
                value: uma_multiple,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }
        Ok(match kind {
            StrategyKind::Fixed => SalaryBaseProjector::Fixed {
                salary_base: uma_multiple * uma.value(start.effective_uma_year())?,
            },
            StrategyKind::Progressive => SalaryBaseProjector::Progressive {
                uma_multiple,
                start,
                uma,
            },
        })
    }

    /// Salary base for a 1-based month index of the strategy
    pub fn salary_base(&self, month_index: u32) -> SimResult<f64> {
        match self {
            SalaryBaseProjector::Fixed { salary_base } => Ok(*salary_base),
            SalaryBaseProjector::Progressive { uma_multiple, start, uma } => {
                let month = start.plus_months(month_index.saturating_sub(1) as i64);
                Ok(uma_multiple * uma.value(month.effective_uma_year())?)
            }
        }
    }

    /// Salary base for every month of a window of `duration` months
    pub fn project(&self, duration: u32) -> SimResult<Vec<f64>> {
        (1..=duration).map(|index| self.salary_base(index)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn start() -> YearMonth {
        YearMonth::new(2024, 2).unwrap()
    }

    #[test]
    fn test_fixed_is_constant() {
        let uma = UmaTable::official();
        let projector = SalaryBaseProjector::new(StrategyKind::Fixed, 15.0, start(), &uma).unwrap();
        let values = projector.project(58).unwrap();

        assert_eq!(values.len(), 58);
        assert_relative_eq!(values[0], 15.0 * 108.57, epsilon = 1e-9);
        assert!(values.iter().all(|v| *v == values[0]));
    }

    #[test]
    fn test_progressive_follows_uma_updates() {
        let uma = UmaTable::official();
        let projector = SalaryBaseProjector::new(StrategyKind::Progressive, 10.0, start(), &uma).unwrap();
        let values = projector.project(58).unwrap();

        // Feb 2024 .. Dec 2024 at 2024 UMA
        assert_relative_eq!(values[0], 1085.7, epsilon = 1e-9);
        assert_relative_eq!(values[10], 1085.7, epsilon = 1e-9);
        // January 2025 still uses the 2024 value
        assert_relative_eq!(values[11], 1085.7, epsilon = 1e-9);
        // February 2025 steps up
        assert_relative_eq!(values[12], 1131.4, epsilon = 1e-9);

        for pair in values.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_january_start_uses_prior_year() {
        let uma = UmaTable::official();
        let jan = YearMonth::new(2025, 1).unwrap();
        let projector = SalaryBaseProjector::new(StrategyKind::Fixed, 1.0, jan, &uma).unwrap();
        assert_eq!(projector.salary_base(1).unwrap(), 108.57);
    }

    #[test]
    fn test_uncovered_year_is_error() {
        let uma = UmaTable::official();
        let late = YearMonth::new(2035, 6).unwrap();
        let projector = SalaryBaseProjector::new(StrategyKind::Progressive, 5.0, late, &uma).unwrap();
        // Jun 2035 .. Jan 2036 still priced with the 2035 UMA
        assert!(projector.project(8).is_ok());
        assert!(matches!(
            projector.project(9),
            Err(SimulationError::YearNotCovered { year: 2036, .. })
        ));

        let beyond = YearMonth::new(2040, 3).unwrap();
        assert!(SalaryBaseProjector::new(StrategyKind::Fixed, 5.0, beyond, &uma).is_err());
    }
}
