pub mod context;
pub mod prompts;
pub mod report;
pub mod stages;
pub mod state;
pub mod workflow;

pub use context::PlannerContext;
pub use state::{Ingredient, PipelineState, PreferenceRecord, StateUpdate, StoreRecommendation};
pub use workflow::{launch, run_meal_planner, run_pipeline};
