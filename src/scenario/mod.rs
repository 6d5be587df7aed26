//! Batch generation, ranking and reproducible codes for strategies

mod runner;
mod generator;
mod scorer;
mod code;

pub use runner::Simulator;
pub use generator::{GenerationReport, ScenarioGenerator, SearchSpace, SkippedScenario};
pub use scorer::{
    Bucket, DurationBucket, Preference, RankedStrategy, RiskProfile, ScoringConfig, StrategyScorer, UmaBucket,
};
pub use code::{StrategyCode, CODE_PREFIX, CODE_VERSION};
