use async_trait::async_trait;
use minijinja::context;
use serde::Deserialize;

use super::{Stage, StageError, ask_json, require_keys};
use crate::planner::context::PlannerContext;
use crate::planner::prompts::{RECIPE_EXTRACTION, RECIPE_EXTRACTION_TASK, render};
use crate::planner::state::{
    Ingredient, PipelineState, StateUpdate, lenient_ingredients, lenient_list, lenient_string,
};

pub const FALLBACK_RECIPE_NAME: &str = "Basic Recipe (Error in parsing)";
pub const FALLBACK_INSTRUCTION: &str = "Recipe instructions could not be parsed";

const REQUIRED_KEYS: &[&str] = &["recipe_name", "ingredients", "instructions"];

#[derive(Debug, Deserialize)]
struct ExtractedRecipe {
    #[serde(deserialize_with = "lenient_string")]
    recipe_name: String,
    #[serde(deserialize_with = "lenient_ingredients")]
    ingredients: Vec<Ingredient>,
    #[serde(deserialize_with = "lenient_list")]
    instructions: Vec<String>,
}

/// 阶段2：从最近一批搜索结果中提取菜谱
#[derive(Debug, Default)]
pub struct RecipeExtractionStage;

impl RecipeExtractionStage {
    pub fn build_prompt(state: &PipelineState) -> Result<String, StageError> {
        let search_results = state
            .web_research_results
            .last()
            .map(|batch| batch.to_prompt_block())
            .unwrap_or_default();
        let prompt = render(RECIPE_EXTRACTION, context! { search_results => search_results })?;
        Ok(prompt)
    }

    async fn extract(
        &self,
        context: &PlannerContext,
        state: &PipelineState,
    ) -> Result<ExtractedRecipe, StageError> {
        let prompt = Self::build_prompt(state)?;
        let reply = ask_json(context, &prompt, RECIPE_EXTRACTION_TASK).await?;
        require_keys(&reply, REQUIRED_KEYS)?;

        serde_json::from_value(reply).map_err(|e| StageError::MalformedOutput(e.to_string()))
    }

    pub fn fallback() -> StateUpdate {
        StateUpdate {
            recipe_name: Some(FALLBACK_RECIPE_NAME.to_string()),
            ingredients: Some(vec![Ingredient::new(
                "1",
                "serving",
                "ingredients not found",
            )]),
            instructions: Some(vec![FALLBACK_INSTRUCTION.to_string()]),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Stage for RecipeExtractionStage {
    fn name(&self) -> &'static str {
        "recipe_extraction"
    }

    async fn run(
        &self,
        context: &PlannerContext,
        state: &PipelineState,
    ) -> Result<StateUpdate, StageError> {
        match self.extract(context, state).await {
            Ok(recipe) => {
                tracing::info!(
                    recipe = %recipe.recipe_name,
                    ingredients = recipe.ingredients.len(),
                    steps = recipe.instructions.len(),
                    "recipe extracted"
                );
                Ok(StateUpdate {
                    recipe_name: Some(recipe.recipe_name),
                    ingredients: Some(recipe.ingredients),
                    instructions: Some(recipe.instructions),
                    ..Default::default()
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "recipe could not be parsed, using placeholder recipe");
                Ok(Self::fallback())
            }
        }
    }
}
