//! Pension formula engine and scenario results

mod engine;
mod result;

pub use engine::{PensionEngine, SimulationConfig};
pub use result::{ScenarioResult, ScenarioSummary};
