//! Worker profile, contribution history and their loaders

mod data;
mod history;
pub mod loader;

pub use data::{CivilStatus, Profile, MAX_RETIREMENT_AGE, MIN_RETIREMENT_AGE};
pub use history::{check_contiguous, ContributionMonth, MonthStatus, MAX_PROGRAM_MONTHS};
pub use loader::{load_history, load_history_from_reader, load_profile};
