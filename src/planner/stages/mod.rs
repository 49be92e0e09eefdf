//! 流水线阶段
//!
//! 每个阶段读取当前状态并返回一份局部更新，共同的形态是：
//! 渲染提示词 → 调用模型 → 解析JSON → 校验 → 出错时降级为占位值。

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::llm::parse_json_reply;
use crate::planner::context::PlannerContext;
use crate::planner::state::{PipelineState, StateUpdate};
use crate::search::SearchError;

pub mod recipe_extraction;
pub mod recipe_query;
pub mod report_render;
pub mod store_search;

pub use recipe_extraction::RecipeExtractionStage;
pub use recipe_query::RecipeQueryStage;
pub use report_render::ReportStage;
pub use store_search::StoreSearchStage;

/// 阶段内部错误
#[derive(Debug, Error)]
pub enum StageError {
    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    #[error("model output is missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("no search results found")]
    EmptySearch,

    #[error("model call failed: {0:#}")]
    Model(anyhow::Error),

    #[error("prompt rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Search(#[from] SearchError),
}

#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(
        &self,
        context: &PlannerContext,
        state: &PipelineState,
    ) -> Result<StateUpdate, StageError>;
}

/// 调用模型并把回复解析为JSON
pub(crate) async fn ask_json(
    context: &PlannerContext,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<Value, StageError> {
    let reply = context
        .model
        .complete(system_prompt, user_prompt)
        .await
        .map_err(StageError::Model)?;
    tracing::debug!(model = context.model.model_name(), reply = %reply, "model replied");

    parse_json_reply(&reply).map_err(|e| StageError::MalformedOutput(e.to_string()))
}

/// 读取JSON对象中的字符串字段
pub(crate) fn require_str<'a>(value: &'a Value, key: &'static str) -> Result<&'a str, StageError> {
    let object = value
        .as_object()
        .ok_or_else(|| StageError::MalformedOutput("expected a JSON object".to_string()))?;
    object
        .get(key)
        .and_then(Value::as_str)
        .ok_or(StageError::MissingKey(key))
}

/// 确认JSON对象包含全部所需字段
pub(crate) fn require_keys(value: &Value, keys: &[&'static str]) -> Result<(), StageError> {
    let object = value
        .as_object()
        .ok_or_else(|| StageError::MalformedOutput("expected a JSON object".to_string()))?;
    match keys.iter().find(|key| !object.contains_key(**key)) {
        Some(missing) => Err(StageError::MissingKey(*missing)),
        None => Ok(()),
    }
}
