//! Ranks generated scenarios against a worker's preference

use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{SimResult, SimulationError};
use crate::pension::ScenarioResult;
use crate::profile::{Profile, MAX_PROGRAM_MONTHS};
use crate::projection::{StrategyKind, StrategyParameters, MAX_UMA_LEVEL};

use super::code::StrategyCode;

/// Appetite for contribution cost, as a UMA sub-range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    Balanced,
    Maximum,
}

impl RiskProfile {
    /// Adjacent bands share their boundary level
    pub fn uma_range(&self) -> RangeInclusive<u32> {
        match self {
            RiskProfile::Conservative => 1..=10,
            RiskProfile::Balanced => 10..=18,
            RiskProfile::Maximum => 18..=MAX_UMA_LEVEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    pub target_monthly_pension: f64,
    pub risk: RiskProfile,
}

impl Preference {
    pub fn new(target_monthly_pension: f64, risk: RiskProfile) -> Self {
        Self {
            target_monthly_pension,
            risk,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Scenarios paying less than this are dropped
    pub min_pension: f64,
    pub min_roi_pct: f64,
    /// Added when the investment is recovered at some point
    pub recovery_bonus: f64,
    /// Subtracted when the pension falls short of `shortfall_ratio × target`
    pub shortfall_penalty: f64,
    pub shortfall_ratio: f64,
    pub top_n: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_pension: 1000.0,
            min_roi_pct: -75.0,
            recovery_bonus: 100.0,
            shortfall_penalty: 200.0,
            shortfall_ratio: 0.7,
            top_n: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationBucket {
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UmaBucket {
    Low,
    Medium,
    High,
}

/// Scenarios in the same bucket are near-duplicates for ranking purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bucket {
    pub kind: StrategyKind,
    pub duration: DurationBucket,
    pub uma: UmaBucket,
}

impl Bucket {
    pub fn of(params: &StrategyParameters) -> Self {
        let duration = match params.duration_months {
            0..=24 => DurationBucket::Short,
            25..=48 => DurationBucket::Medium,
            _ => DurationBucket::Long,
        };
        let uma = match params.uma_level {
            0..=10 => UmaBucket::Low,
            11..=18 => UmaBucket::Medium,
            _ => UmaBucket::High,
        };
        Self {
            kind: params.kind,
            duration,
            uma,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedStrategy {
    /// 1-based position in the ranked list
    pub rank: usize,
    pub score: f64,
    pub bucket: Bucket,
    /// Highest-UMA scenario surfaced regardless of preference
    pub ceiling: bool,
    pub code: String,
    pub result: ScenarioResult,
}

#[derive(Debug, Clone, Default)]
pub struct StrategyScorer {
    config: ScoringConfig,
}

impl StrategyScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, result: &ScenarioResult, preference: &Preference) -> f64 {
        let target = preference.target_monthly_pension;
        let pension = result.monthly_pension;
        let proximity = (1.0 - (pension - target).abs() / target).max(0.0);

        let mut score = proximity * 1000.0 + result.roi_pct * 50.0;
        if result.payback_months.is_some_and(|months| months > 0) {
            score += self.config.recovery_bonus;
        }
        if pension < self.config.shortfall_ratio * target {
            score -= self.config.shortfall_penalty;
        }
        score
    }

    fn is_clean(&self, result: &ScenarioResult) -> bool {
        result.monthly_pension >= self.config.min_pension
            && result.roi_pct >= self.config.min_roi_pct
            && (1..=MAX_PROGRAM_MONTHS).contains(&result.params.duration_months)
    }

    /// Produce the short ranked list for `profile`.
    ///
    /// The best UMA 25 scenario, when present, always comes first. The rest
    /// are the best of distinct buckets among clean, in-band scenarios,
    /// backfilled from the whole set when there are too few.
    pub fn rank(
        &self,
        profile: &Profile,
        results: &[ScenarioResult],
        preference: &Preference,
    ) -> SimResult<Vec<RankedStrategy>> {
        if results.is_empty() {
            return Err(SimulationError::EmptyResultSet);
        }
        let target = preference.target_monthly_pension;
        if !target.is_finite() || target <= 0.0 {
            return Err(SimulationError::OutOfRange {
                field: "target_monthly_pension",
                value: target,
                min: 0.0,
                max: f64::MAX,
            });
        }

        // (index into results, score), best first; ties keep enumeration order
        let mut scored: Vec<(usize, f64)> = results
            .iter()
            .enumerate()
            .map(|(i, r)| (i, self.score(r, preference)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let band = preference.risk.uma_range();
        let mut filtered: Vec<(usize, f64)> = scored
            .iter()
            .copied()
            .filter(|&(i, _)| self.is_clean(&results[i]) && band.contains(&results[i].params.uma_level))
            .collect();
        if filtered.is_empty() {
            log::warn!(
                "no scenario passes the filters for {:?} (target {:.2}), ranking unfiltered",
                preference.risk,
                target
            );
            filtered = scored.clone();
        }

        let mut seen = HashSet::new();
        let distinct: Vec<(usize, f64)> = filtered
            .into_iter()
            .filter(|&(i, _)| seen.insert(Bucket::of(&results[i].params)))
            .collect();
        log::debug!("{} scored, {} distinct buckets after filtering", scored.len(), distinct.len());

        let top_n = self.config.top_n.max(1);
        let ceiling = scored
            .iter()
            .copied()
            .find(|&(i, _)| results[i].params.uma_level == MAX_UMA_LEVEL);

        let mut picked: Vec<(usize, f64)> = Vec::with_capacity(top_n);
        picked.extend(ceiling);
        for candidate in distinct.into_iter().chain(scored.iter().copied()) {
            if picked.len() >= top_n {
                break;
            }
            if !picked.iter().any(|&(i, _)| i == candidate.0) {
                picked.push(candidate);
            }
        }

        Ok(picked
            .into_iter()
            .enumerate()
            .map(|(position, (i, score))| {
                let result = &results[i];
                RankedStrategy {
                    rank: position + 1,
                    score,
                    bucket: Bucket::of(&result.params),
                    ceiling: ceiling.is_some_and(|(c, _)| c == i),
                    code: StrategyCode::new(profile, &result.params).encode(),
                    result: result.clone(),
                }
            })
            .collect())
    }
}
