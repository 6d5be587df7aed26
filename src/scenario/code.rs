//! Strategy reference codes
//!
//! A code carries everything needed to replay a scenario: the strategy
//! parameters and the profile fields that enter the formula. Version 1 text
//! form, ten dash-separated fields:
//!
//! ```text
//! M40-1-F1536-202402-19660115-60-1000-S-15000-68
//!  |  |   |     |       |     |   |   |   |    checksum (mod 97)
//!  |  |   |     |       |     |   |   |   historical salary base, cents
//!  |  |   |     |       |     |   |   S = spouse, N = none
//!  |  |   |     |       |     |   prior weeks
//!  |  |   |     |       |     retirement age
//!  |  |   |     |       birth date
//!  |  |   |     start month
//!  |  |   kind tag, UMA level (2 digits), duration (2 digits)
//!  |  version
//!  prefix
//! ```
//!
//! Published codes must keep decoding: new layouts get a new version number.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::error::{CodeError, SimResult, SimulationError};
use crate::pension::{PensionEngine, ScenarioResult};
use crate::profile::{CivilStatus, Profile};
use crate::projection::{StrategyKind, StrategyParameters};

pub const CODE_PREFIX: &str = "M40";
pub const CODE_VERSION: u32 = 1;

const FIELD_COUNT: usize = 10;
const CHECKSUM_MODULUS: u32 = 97;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyCode {
    pub params: StrategyParameters,
    pub birth_date: NaiveDate,
    pub retirement_age: u32,
    pub prior_weeks: u32,
    pub civil_status: CivilStatus,
    /// Historical salary base in cents
    pub historical_cents: u64,
}

impl StrategyCode {
    pub fn new(profile: &Profile, params: &StrategyParameters) -> Self {
        Self {
            params: *params,
            birth_date: profile.birth_date,
            retirement_age: profile.retirement_age,
            prior_weeks: profile.prior_weeks,
            civil_status: profile.civil_status,
            historical_cents: (profile.historical_salary_base.max(0.0) * 100.0).round() as u64,
        }
    }

    pub fn encode(&self) -> String {
        let body = format!(
            "{}-{}-{}{:02}{:02}-{:04}{:02}-{}-{}-{}-{}-{}",
            CODE_PREFIX,
            CODE_VERSION,
            self.params.kind.tag(),
            self.params.uma_level,
            self.params.duration_months,
            self.params.start.year,
            self.params.start.month,
            self.birth_date.format("%Y%m%d"),
            self.retirement_age,
            self.prior_weeks,
            if self.civil_status.has_spouse() { 'S' } else { 'N' },
            self.historical_cents,
        );
        let checksum = checksum(&body);
        format!("{}-{:02}", body, checksum)
    }

    /// Parse and validate a code.
    ///
    /// Prefix and version are checked before anything else so that codes
    /// from a future layout fail with `UnsupportedVersion` rather than a
    /// field error.
    pub fn decode(code: &str) -> SimResult<Self> {
        let code = code.trim();
        let fields: Vec<&str> = code.split('-').collect();

        if fields[0] != CODE_PREFIX {
            return Err(CodeError::MissingPrefix.into());
        }
        match fields.get(1) {
            Some(version) if version.parse::<u32>().ok() == Some(CODE_VERSION) => {}
            Some(version) => return Err(CodeError::UnsupportedVersion(version.to_string()).into()),
            None => {
                return Err(CodeError::FieldCount {
                    expected: FIELD_COUNT,
                    found: fields.len(),
                }
                .into())
            }
        }
        if fields.len() != FIELD_COUNT {
            return Err(CodeError::FieldCount {
                expected: FIELD_COUNT,
                found: fields.len(),
            }
            .into());
        }

        let (body, found) = code.rsplit_once('-').ok_or(CodeError::MissingPrefix)?;
        let expected = checksum(body);
        if found.len() != 2 || found.parse::<u32>().ok() != Some(expected) {
            return Err(CodeError::Checksum {
                expected,
                found: found.to_string(),
            }
            .into());
        }

        let strategy = fields[2];
        let mut chars = strategy.chars();
        let kind = chars
            .next()
            .and_then(StrategyKind::from_tag)
            .ok_or_else(|| malformed("strategy", strategy))?;
        let digits = chars.as_str();
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("strategy", strategy).into());
        }
        let uma_level = parse_number::<u32>("uma_level", &digits[..2])?;
        let duration_months = parse_number::<u32>("duration_months", &digits[2..])?;

        let start = parse_start(fields[3])?;
        let birth_date =
            NaiveDate::parse_from_str(fields[4], "%Y%m%d").map_err(|_| malformed("birth_date", fields[4]))?;
        let retirement_age = parse_number::<u32>("retirement_age", fields[5])?;
        let prior_weeks = parse_number::<u32>("prior_weeks", fields[6])?;
        let civil_status = match fields[7] {
            "S" => CivilStatus::Spouse,
            "N" => CivilStatus::None,
            other => return Err(malformed("civil_status", other).into()),
        };
        let historical_cents = parse_number::<u64>("historical_salary_base", fields[8])?;

        let decoded = Self {
            params: StrategyParameters::new(kind, uma_level, duration_months, start),
            birth_date,
            retirement_age,
            prior_weeks,
            civil_status,
            historical_cents,
        };
        decoded.params.validate()?;
        decoded.to_profile().validate()?;
        Ok(decoded)
    }

    pub fn params(&self) -> StrategyParameters {
        self.params
    }

    pub fn to_profile(&self) -> Profile {
        Profile::new(
            self.birth_date,
            self.retirement_age,
            self.prior_weeks,
            self.civil_status,
            self.historical_cents as f64 / 100.0,
        )
    }

    /// Re-run the encoded scenario
    pub fn replay(&self, engine: &PensionEngine) -> SimResult<ScenarioResult> {
        engine.simulate(&self.to_profile(), &self.params)
    }
}

impl fmt::Display for StrategyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for StrategyCode {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// Position-weighted byte sum, so swapped characters change the result
fn checksum(body: &str) -> u32 {
    body.bytes()
        .enumerate()
        .fold(0u32, |acc, (i, b)| (acc + (i as u32 + 1) * b as u32) % CHECKSUM_MODULUS)
}

fn malformed(field: &'static str, value: &str) -> CodeError {
    CodeError::MalformedField {
        field,
        value: value.to_string(),
    }
}

fn parse_number<T: FromStr>(field: &'static str, value: &str) -> Result<T, CodeError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(field, value));
    }
    value.parse().map_err(|_| malformed(field, value))
}

fn parse_start(value: &str) -> SimResult<YearMonth> {
    if value.len() != 6 || !value.is_ascii() {
        return Err(malformed("start", value).into());
    }
    let year = parse_number::<i32>("start", &value[..4])?;
    let month = parse_number::<u32>("start", &value[4..])?;
    YearMonth::new(year, month).map_err(|_| malformed("start", value).into())
}
