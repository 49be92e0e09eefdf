use async_trait::async_trait;
use minijinja::context;

use super::{Stage, StageError, ask_json, require_str};
use crate::planner::context::PlannerContext;
use crate::planner::prompts::{RECIPE_QUERY_TASK, RECIPE_SEARCH, render};
use crate::planner::state::{PipelineState, PreferenceRecord, StateUpdate};
use crate::search::{SearchBatch, SearchResult, format_sources};

pub const SEARCH_FAILED_SOURCE: &str = "Search failed";

/// 阶段1：让模型生成菜谱搜索查询并执行搜索
///
/// 本阶段内的任何失败都会被吸收，替换为一条记录失败原因的合成结果。
#[derive(Debug, Default)]
pub struct RecipeQueryStage;

impl RecipeQueryStage {
    pub fn build_prompt(preferences: &PreferenceRecord) -> Result<String, StageError> {
        let restrictions = preferences.dietary_restrictions().join(", ");
        let prompt = render(
            RECIPE_SEARCH,
            context! {
                location => preferences.location(),
                cuisine => preferences.cuisine_preference().unwrap_or("any"),
                restrictions => if restrictions.is_empty() { "none" } else { restrictions.as_str() },
                flavor => preferences.flavor_preference().unwrap_or("any"),
            },
        )?;
        Ok(prompt)
    }

    async fn search_recipes(
        &self,
        context: &PlannerContext,
        state: &PipelineState,
    ) -> Result<SearchBatch, StageError> {
        let prompt = Self::build_prompt(&state.preferences)?;
        let reply = ask_json(context, &prompt, RECIPE_QUERY_TASK).await?;
        let query = require_str(&reply, "query")?;
        tracing::info!(query, "recipe search query generated");

        let batch = context.search.search(query).await?;
        if batch.is_empty() {
            return Err(StageError::EmptySearch);
        }
        Ok(batch)
    }

    /// 失败时的合成结果
    pub fn fallback(error: &StageError) -> StateUpdate {
        let batch = SearchBatch::from_results(vec![SearchResult {
            title: "Error in search".to_string(),
            content: format!("Failed to search for recipes: {}", error),
            url: String::new(),
        }]);
        StateUpdate {
            web_research_results: Some(vec![batch]),
            sources_gathered: Some(vec![SEARCH_FAILED_SOURCE.to_string()]),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Stage for RecipeQueryStage {
    fn name(&self) -> &'static str {
        "recipe_query"
    }

    async fn run(
        &self,
        context: &PlannerContext,
        state: &PipelineState,
    ) -> Result<StateUpdate, StageError> {
        match self.search_recipes(context, state).await {
            Ok(batch) => {
                let sources = format_sources(&batch);
                Ok(StateUpdate {
                    web_research_results: Some(vec![batch]),
                    sources_gathered: Some(vec![sources]),
                    ..Default::default()
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "recipe search failed, using placeholder results");
                Ok(Self::fallback(&e))
            }
        }
    }
}
