//! 流水线的输入记录与运行状态

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::search::SearchBatch;

#[derive(Debug, Error, PartialEq)]
pub enum PreferenceError {
    #[error("location must not be empty")]
    EmptyLocation,
}

/// 用户偏好，构造后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    location: String,
    cuisine_preference: Option<String>,
    dietary_restrictions: Vec<String>,
    flavor_preference: Option<String>,
}

impl PreferenceRecord {
    pub fn new(
        location: impl Into<String>,
        cuisine_preference: Option<String>,
        dietary_restrictions: Vec<String>,
        flavor_preference: Option<String>,
    ) -> Result<Self, PreferenceError> {
        let location = location.into().trim().to_string();
        if location.is_empty() {
            return Err(PreferenceError::EmptyLocation);
        }

        Ok(Self {
            location,
            cuisine_preference: non_blank(cuisine_preference),
            dietary_restrictions: dietary_restrictions
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
            flavor_preference: non_blank(flavor_preference),
        })
    }

    /// 仅有位置信息的偏好
    pub fn for_location(location: impl Into<String>) -> Result<Self, PreferenceError> {
        Self::new(location, None, Vec::new(), None)
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn cuisine_preference(&self) -> Option<&str> {
        self.cuisine_preference.as_deref()
    }

    pub fn dietary_restrictions(&self) -> &[String] {
        &self.dietary_restrictions
    }

    pub fn flavor_preference(&self) -> Option<&str> {
        self.flavor_preference.as_deref()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 食材条目
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default, deserialize_with = "lenient_string")]
    pub quantity: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

impl Ingredient {
    pub fn new(quantity: &str, unit: &str, name: &str) -> Self {
        Self {
            quantity: quantity.to_string(),
            unit: unit.to_string(),
            name: name.to_string(),
        }
    }
}

/// 推荐商店
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecommendation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub specialty_items: Vec<String>,
}

// 模型输出只校验字段是否存在，取值一律宽松收下
fn text_of(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 模型常把数量写成数字，这里统一收为字符串
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(Value::deserialize(deserializer)?))
}

/// null为空列表，单个标量视为只有一项，空白项丢弃
pub(crate) fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    };
    Ok(items
        .into_iter()
        .map(text_of)
        .filter(|item| !item.trim().is_empty())
        .collect())
}

/// 食材列表：对象按字段读取，其余取值整体当作食材名
pub(crate) fn lenient_ingredients<'de, D>(deserializer: D) -> Result<Vec<Ingredient>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    };
    items
        .into_iter()
        .filter(|item| !item.is_null())
        .map(|item| match item {
            Value::Object(_) => serde_json::from_value(item).map_err(serde::de::Error::custom),
            other => Ok(Ingredient {
                name: text_of(other),
                ..Default::default()
            }),
        })
        .collect()
}

/// 状态字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateField {
    RecipeName,
    Ingredients,
    Instructions,
    StoreRecommendations,
    WebResearchResults,
    SourcesGathered,
    FinalReport,
}

/// 合并阶段输出时的字段策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    Replace,
    Append,
}

/// 各字段的合并策略，未列出的字段为 Replace
pub const MERGE_POLICY: &[(StateField, MergePolicy)] = &[
    (StateField::WebResearchResults, MergePolicy::Append),
    (StateField::SourcesGathered, MergePolicy::Append),
];

pub fn merge_policy(field: StateField) -> MergePolicy {
    MERGE_POLICY
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, policy)| *policy)
        .unwrap_or(MergePolicy::Replace)
}

/// 单个阶段产出的局部更新，只携带该阶段写入的字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub recipe_name: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<Vec<String>>,
    pub store_recommendations: Option<Vec<StoreRecommendation>>,
    pub web_research_results: Option<Vec<SearchBatch>>,
    pub sources_gathered: Option<Vec<String>>,
    pub final_report: Option<String>,
}

/// 一次运行的全部状态
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineState {
    #[serde(flatten)]
    pub preferences: PreferenceRecord,
    pub recipe_name: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub store_recommendations: Vec<StoreRecommendation>,
    pub web_research_results: Vec<SearchBatch>,
    pub sources_gathered: Vec<String>,
    pub final_report: Option<String>,
}

impl PipelineState {
    pub fn new(preferences: PreferenceRecord) -> Self {
        Self {
            preferences,
            recipe_name: None,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            store_recommendations: Vec::new(),
            web_research_results: Vec::new(),
            sources_gathered: Vec::new(),
            final_report: None,
        }
    }

    pub fn location(&self) -> &str {
        self.preferences.location()
    }

    /// 按字段策略把局部更新合并进当前状态
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(v) = update.recipe_name {
            merge_scalar(&mut self.recipe_name, v);
        }
        if let Some(v) = update.ingredients {
            merge_list(&mut self.ingredients, v, merge_policy(StateField::Ingredients));
        }
        if let Some(v) = update.instructions {
            merge_list(&mut self.instructions, v, merge_policy(StateField::Instructions));
        }
        if let Some(v) = update.store_recommendations {
            merge_list(
                &mut self.store_recommendations,
                v,
                merge_policy(StateField::StoreRecommendations),
            );
        }
        if let Some(v) = update.web_research_results {
            merge_list(
                &mut self.web_research_results,
                v,
                merge_policy(StateField::WebResearchResults),
            );
        }
        if let Some(v) = update.sources_gathered {
            merge_list(
                &mut self.sources_gathered,
                v,
                merge_policy(StateField::SourcesGathered),
            );
        }
        if let Some(v) = update.final_report {
            merge_scalar(&mut self.final_report, v);
        }
    }
}

fn merge_list<T>(target: &mut Vec<T>, incoming: Vec<T>, policy: MergePolicy) {
    match policy {
        MergePolicy::Replace => *target = incoming,
        MergePolicy::Append => target.extend(incoming),
    }
}

// 标量字段只能替换
fn merge_scalar<T>(target: &mut Option<T>, incoming: T) {
    *target = Some(incoming);
}
