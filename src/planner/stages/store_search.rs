use async_trait::async_trait;
use minijinja::context;
use serde_json::Value;

use super::{Stage, StageError, ask_json, require_keys, require_str};
use crate::planner::context::PlannerContext;
use crate::planner::prompts::{
    STORE_EXTRACTION, STORE_EXTRACTION_TASK, STORE_QUERY_TASK, STORE_SEARCH, render,
};
use crate::planner::state::{PipelineState, StateUpdate, StoreRecommendation};

pub const FALLBACK_STORE_NAME: &str = "Local Grocery Store";
pub const FALLBACK_STORE_NOTE: &str = "Unable to parse store data";

const STORE_KEYS: &[&str] = &["name", "address", "specialty_items"];

/// 阶段3：搜索附近商店并提取推荐列表
///
/// 查询生成和搜索调用的失败会向上传播并终止本次运行；
/// 只有提取步骤的失败会降级为占位商店。
#[derive(Debug, Default)]
pub struct StoreSearchStage;

impl StoreSearchStage {
    pub fn build_prompt(state: &PipelineState) -> Result<String, StageError> {
        let ingredients = state
            .ingredients
            .iter()
            .map(|item| format!("- {}", item.name))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = render(
            STORE_SEARCH,
            context! {
                location => state.location(),
                ingredients => ingredients,
            },
        )?;
        Ok(prompt)
    }

    async fn extract_stores(
        &self,
        context: &PlannerContext,
        search_content: &str,
    ) -> Result<Vec<StoreRecommendation>, StageError> {
        let prompt = render(STORE_EXTRACTION, context! { search_content => search_content })?;
        let reply = ask_json(context, &prompt, STORE_EXTRACTION_TASK).await?;
        let stores = validate_stores(reply)?;

        let mut stores: Vec<StoreRecommendation> = serde_json::from_value(stores)
            .map_err(|e| StageError::MalformedOutput(e.to_string()))?;
        stores.truncate(context.config.max_store_recommendations);
        Ok(stores)
    }

    pub fn fallback(location: &str) -> StateUpdate {
        StateUpdate {
            store_recommendations: Some(vec![StoreRecommendation {
                name: FALLBACK_STORE_NAME.to_string(),
                address: format!("Search for grocery stores near {}", location),
                specialty_items: vec![FALLBACK_STORE_NOTE.to_string()],
            }]),
            ..Default::default()
        }
    }
}

/// 取出 `stores` 列表，任何一项缺少字段都视为整体失败
fn validate_stores(reply: Value) -> Result<Value, StageError> {
    require_keys(&reply, &["stores"])?;
    let stores = match reply {
        Value::Object(mut map) => map.remove("stores").unwrap_or(Value::Null),
        _ => Value::Null,
    };

    let entries = stores
        .as_array()
        .ok_or_else(|| StageError::MalformedOutput("stores must be a list".to_string()))?;
    for entry in entries {
        require_keys(entry, STORE_KEYS)?;
    }
    Ok(stores)
}

#[async_trait]
impl Stage for StoreSearchStage {
    fn name(&self) -> &'static str {
        "store_search"
    }

    async fn run(
        &self,
        context: &PlannerContext,
        state: &PipelineState,
    ) -> Result<StateUpdate, StageError> {
        let prompt = Self::build_prompt(state)?;
        let reply = ask_json(context, &prompt, STORE_QUERY_TASK).await?;
        let query = require_str(&reply, "query")?;
        tracing::info!(query, "store search query generated");

        let batch = context.search.search(query).await?;

        match self.extract_stores(context, &batch.to_prompt_block()).await {
            Ok(stores) => {
                tracing::info!(stores = stores.len(), "store recommendations extracted");
                Ok(StateUpdate {
                    store_recommendations: Some(stores),
                    ..Default::default()
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "store data could not be parsed, using placeholder store");
                Ok(Self::fallback(state.location()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::state::{Ingredient, PreferenceRecord};
    use serde_json::json;

    #[test]
    fn test_prompt_lists_ingredient_names() {
        let mut state = PipelineState::new(PreferenceRecord::for_location("Portland").unwrap());
        state.ingredients = vec![
            Ingredient::new("2", "cups", "basmati rice"),
            Ingredient::new("1", "", "lemongrass"),
        ];

        let prompt = StoreSearchStage::build_prompt(&state).unwrap();

        assert!(prompt.contains("<LOCATION>\nPortland\n</LOCATION>"));
        assert!(prompt.contains("- basmati rice\n- lemongrass"));
    }

    #[test]
    fn test_validate_accepts_complete_stores() {
        let stores = validate_stores(json!({
            "stores": [{"name": "A", "address": "1 St", "specialty_items": []}]
        }))
        .unwrap();

        assert_eq!(stores.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_validate_rejects_incomplete_entry() {
        let result = validate_stores(json!({
            "stores": [
                {"name": "A", "address": "1 St", "specialty_items": []},
                {"name": "B", "address": "2 St"}
            ]
        }));

        assert!(matches!(result, Err(StageError::MissingKey("specialty_items"))));
    }

    #[test]
    fn test_validate_rejects_non_list() {
        assert!(matches!(
            validate_stores(json!({"stores": "none"})),
            Err(StageError::MalformedOutput(_))
        ));
        assert!(matches!(
            validate_stores(json!({"shops": []})),
            Err(StageError::MissingKey("stores"))
        ));
    }

    #[test]
    fn test_fallback_mentions_location() {
        let update = StoreSearchStage::fallback("San Diego");
        let stores = update.store_recommendations.unwrap();

        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].name, "Local Grocery Store");
        assert_eq!(stores[0].address, "Search for grocery stores near San Diego");
        assert_eq!(stores[0].specialty_items, vec!["Unable to parse store data"]);
    }
}
