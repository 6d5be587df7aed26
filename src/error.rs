//! Error types shared by every stage of the simulation pipeline

use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar::YearMonth;

pub type SimResult<T> = Result<T, SimulationError>;

/// Reasons a worker cannot obtain (or continue towards) a pension
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Ineligibility {
    #[error("only {total_weeks:.1} weeks contributed, at least {required} are required for a Ley 73 pension")]
    InsufficientWeeks { total_weeks: f64, required: u32 },

    #[error("re-entry deadline {deadline} has passed (last paid month {last_paid}); the program can no longer be resumed")]
    ReentryDeadlinePassed {
        last_paid: YearMonth,
        deadline: NaiveDate,
    },

    #[error("retirement at age {age} is below the minimum claim age of {minimum}")]
    BelowMinimumAge { age: u32, minimum: u32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("{field} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{table} table has no entry for year {year}")]
    YearNotCovered { table: &'static str, year: i32 },

    #[error("not eligible: {0}")]
    Ineligible(#[from] Ineligibility),

    #[error("computed {field} is not a finite non-negative number")]
    NonFinite { field: &'static str },

    #[error("invalid contribution history: {0}")]
    InvalidHistory(String),

    #[error("invalid strategy code: {0}")]
    InvalidCode(#[from] CodeError),

    #[error("no scenarios left to rank")]
    EmptyResultSet,
}

impl SimulationError {
    /// Shorthand for range checks on integer-like inputs
    pub(crate) fn out_of_range(field: &'static str, value: impl Into<f64>, min: impl Into<f64>, max: impl Into<f64>) -> Self {
        SimulationError::OutOfRange {
            field,
            value: value.into(),
            min: min.into(),
            max: max.into(),
        }
    }

    /// Short stable label used to group skipped scenarios in batch reports
    pub fn kind(&self) -> &'static str {
        match self {
            SimulationError::OutOfRange { .. } => "out_of_range",
            SimulationError::YearNotCovered { .. } => "year_not_covered",
            SimulationError::Ineligible(Ineligibility::InsufficientWeeks { .. }) => "insufficient_weeks",
            SimulationError::Ineligible(Ineligibility::ReentryDeadlinePassed { .. }) => "reentry_deadline",
            SimulationError::Ineligible(Ineligibility::BelowMinimumAge { .. }) => "below_minimum_age",
            SimulationError::NonFinite { .. } => "non_finite",
            SimulationError::InvalidHistory(_) => "invalid_history",
            SimulationError::InvalidCode(_) => "invalid_code",
            SimulationError::EmptyResultSet => "empty_result_set",
        }
    }
}

/// Failures while decoding a strategy reference code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("missing `M40` prefix")]
    MissingPrefix,

    #[error("unsupported code version {0}")]
    UnsupportedVersion(String),

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("malformed field `{field}`: {value}")]
    MalformedField { field: &'static str, value: String },

    #[error("checksum mismatch (expected {expected:02}, found {found})")]
    Checksum { expected: u32, found: String },
}

/// Guard a computed amount: finite and non-negative, or an explicit error
pub(crate) fn ensure_amount(field: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::NonFinite { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_amount() {
        assert_eq!(ensure_amount("pension", 10.5), Ok(10.5));
        assert!(ensure_amount("pension", f64::NAN).is_err());
        assert!(ensure_amount("pension", f64::INFINITY).is_err());
        assert!(ensure_amount("pension", -0.01).is_err());
    }

    #[test]
    fn test_ineligibility_is_readable() {
        let err = SimulationError::from(Ineligibility::InsufficientWeeks {
            total_weeks: 251.14,
            required: 500,
        });
        assert_eq!(err.kind(), "insufficient_weeks");
        assert!(err.to_string().contains("251.1 weeks"));
    }
}
