//! Contribution cost of each month and the running investment total

use crate::error::{ensure_amount, SimResult};
use crate::profile::ContributionMonth;
use crate::tables::ContributionRateTable;

use super::ledger::{ContributionSchedule, MonthlyContribution};
use super::projector::SalaryBaseProjector;
use super::strategy::StrategyParameters;

/// Average days per month used by IMSS for monthly figures
pub const DAYS_PER_MONTH: f64 = 30.4;

/// Prices contribution months: `salary_base × days × rate(year)`
#[derive(Debug, Clone, Copy)]
pub struct ContributionCostCalculator<'t> {
    rates: &'t ContributionRateTable,
    days_per_month: f64,
}

impl<'t> ContributionCostCalculator<'t> {
    pub fn new(rates: &'t ContributionRateTable, days_per_month: f64) -> Self {
        Self { rates, days_per_month }
    }

    /// Monthly premium for a salary base paid in calendar year `year`.
    /// Returns `(rate_pct, premium)`.
    pub fn monthly_premium(&self, salary_base: f64, year: i32) -> SimResult<(f64, f64)> {
        let rate_pct = self.rates.rate_pct(year)?;
        let premium = ensure_amount("premium", salary_base * self.days_per_month * rate_pct / 100.0)?;
        Ok((rate_pct, premium))
    }

    /// Price one month and append it to `schedule`
    pub fn append(&self, schedule: &mut ContributionSchedule, month: &ContributionMonth) -> SimResult<()> {
        let (rate_pct, premium) = self.monthly_premium(month.salary_base, month.month.year)?;
        let cumulative = schedule.total_investment() + premium;
        schedule.months.push(MonthlyContribution {
            index: month.index,
            month: month.month,
            salary_base: month.salary_base,
            uma_multiple: month.uma_multiple,
            rate_pct,
            premium,
            cumulative,
            paid: month.is_paid(),
            retroactive: month.retroactive,
        });
        Ok(())
    }

    /// Price an explicit list of months in order
    pub fn price_months<'m>(&self, months: impl IntoIterator<Item = &'m ContributionMonth>) -> SimResult<ContributionSchedule> {
        let mut schedule = ContributionSchedule::new();
        for month in months {
            self.append(&mut schedule, month)?;
        }
        Ok(schedule)
    }

    /// Project and price a whole strategy from scratch (all months planned)
    pub fn schedule_for(&self, params: &StrategyParameters, projector: &SalaryBaseProjector<'_>) -> SimResult<ContributionSchedule> {
        let mut schedule = ContributionSchedule::new();
        for (offset, month) in params.start.iter_months(params.duration_months).enumerate() {
            let index = offset as u32 + 1;
            let salary_base = projector.salary_base(index)?;
            let planned = ContributionMonth::planned(index, month, salary_base, params.uma_level as f64);
            self.append(&mut schedule, &planned)?;
        }
        Ok(schedule)
    }
}
