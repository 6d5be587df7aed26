//! Re-entry eligibility and retroactive months owed
//!
//! A worker who stopped paying may resume the program only within twelve
//! months of the last paid month. When resuming after a gap, every missing
//! month of the gap is owed retroactively.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{reentry_deadline, YearMonth};
use crate::error::{Ineligibility, SimResult, SimulationError};
use crate::profile::{check_contiguous, ContributionMonth, MAX_PROGRAM_MONTHS};
use crate::tables::UmaTable;

/// Where a worker stands before planning the rest of the strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Continuation {
    pub last_paid: Option<YearMonth>,
    /// Last day on which the program can be resumed
    pub deadline: Option<NaiveDate>,
    pub paid_months: u32,
    /// Months owed for the gap before resumption
    pub retroactive: Vec<ContributionMonth>,
    /// Months still available after paid and retroactive ones
    pub remaining_capacity: u32,
    /// First month a newly planned schedule should start on
    pub next_month: Option<YearMonth>,
}

impl Continuation {
    /// Index the first planned month should take
    pub fn next_index(&self) -> u32 {
        self.paid_months + self.retroactive.len() as u32 + 1
    }
}

/// Applies the 12-month re-entry rule to a paid history
#[derive(Debug, Clone, Copy)]
pub struct ContinuityValidator<'t> {
    uma: &'t UmaTable,
}

impl<'t> ContinuityValidator<'t> {
    pub fn new(uma: &'t UmaTable) -> Self {
        Self { uma }
    }

    /// Check whether the program can continue on `today`, and which months
    /// are owed when it resumes on `resumption`.
    ///
    /// A resumption month at or before the month right after the last paid
    /// one leaves no gap; planning then starts right after the last paid month.
    /// Resuming in a month that begins after the deadline is rejected like a
    /// late `today`. Without any history, planning starts on `resumption` or
    /// on the month of `today`.
    pub fn check(
        &self,
        paid: &[ContributionMonth],
        today: NaiveDate,
        resumption: Option<YearMonth>,
    ) -> SimResult<Continuation> {
        check_contiguous(paid)?;
        if let Some(month) = paid.iter().find(|m| !m.is_paid()) {
            return Err(SimulationError::InvalidHistory(format!(
                "month {} ({}) is not marked as paid",
                month.index, month.month
            )));
        }

        let last = match paid.last() {
            Some(last) => last,
            None => {
                return Ok(Continuation {
                    last_paid: None,
                    deadline: None,
                    paid_months: 0,
                    retroactive: Vec::new(),
                    remaining_capacity: MAX_PROGRAM_MONTHS,
                    next_month: Some(resumption.unwrap_or_else(|| YearMonth::from_date(today))),
                });
            }
        };

        let deadline = reentry_deadline(last.month);
        if today > deadline {
            log::info!("re-entry deadline {} passed on {} (last paid {})", deadline, today, last.month);
            return Err(Ineligibility::ReentryDeadlinePassed {
                last_paid: last.month,
                deadline,
            }
            .into());
        }

        let paid_months = paid.len() as u32;
        let capacity = MAX_PROGRAM_MONTHS - paid_months;
        let after_last = last.month.next();

        let resume_on = match resumption {
            Some(month) if month > after_last => month,
            Some(month) => {
                if month < after_last {
                    log::debug!("resumption {} precedes {}, starting right after the last paid month", month, after_last);
                }
                after_last
            }
            None => after_last,
        };
        if resume_on.first_day() > deadline {
            log::info!("planned resumption {} falls after the re-entry deadline {}", resume_on, deadline);
            return Err(Ineligibility::ReentryDeadlinePassed {
                last_paid: last.month,
                deadline,
            }
            .into());
        }

        let gap = after_last.months_until(resume_on).max(0) as u32;
        let owed = gap.min(capacity);
        let retroactive = after_last
            .iter_months(owed)
            .enumerate()
            .map(|(offset, month)| self.retroactive_month(last, paid_months + offset as u32 + 1, month))
            .collect::<SimResult<Vec<_>>>()?;
        if owed < gap {
            log::debug!("gap of {} months capped at {} by the program limit", gap, owed);
        }

        let remaining_capacity = capacity - owed;
        let next_month = (remaining_capacity > 0).then_some(resume_on);

        Ok(Continuation {
            last_paid: Some(last.month),
            deadline: Some(deadline),
            paid_months,
            retroactive,
            remaining_capacity,
            next_month,
        })
    }

    /// Retroactive months keep the last paid UMA multiple
    fn retroactive_month(&self, last: &ContributionMonth, index: u32, month: YearMonth) -> SimResult<ContributionMonth> {
        let salary_base = if last.uma_multiple > 0.0 {
            last.uma_multiple * self.uma.value(month.effective_uma_year())?
        } else {
            last.salary_base
        };
        let mut owed = ContributionMonth::planned(index, month, salary_base, last.uma_multiple);
        owed.retroactive = true;
        Ok(owed)
    }
}
