pub mod cli;
pub mod config;
pub mod llm;
pub mod logging;
pub mod outlet;
pub mod planner;
pub mod search;

// Re-export commonly used types
pub use config::Config;
pub use planner::{PreferenceRecord, launch, run_meal_planner};
