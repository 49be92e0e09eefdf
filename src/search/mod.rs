//! 网页搜索网关：两个可互换的搜索后端共享同一结果结构

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{Config, SearchApi};

pub mod perplexity;
pub mod scripted;
pub mod tavily;

pub use perplexity::PerplexitySearch;
pub use scripted::ScriptedSearch;
pub use tavily::TavilySearch;

/// 搜索调用错误
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0} is not set")]
    MissingApiKey(&'static str),

    #[error("{backend} request failed: {message}")]
    Request {
        backend: &'static str,
        message: String,
    },

    #[error("{backend} returned status {status}: {body}")]
    Status {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("{backend} response could not be parsed: {message}")]
    Parse {
        backend: &'static str,
        message: String,
    },
}

/// 搜索能力
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchBatch, SearchError>;

    fn name(&self) -> &'static str;
}

/// 单条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub content: String,
    pub url: String,
}

/// 一次搜索返回的原始结果
///
/// 预期形状为 `{"results": [{title, content, url}, ...]}`，但不做强制，
/// 形状未知时整体按文本使用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchBatch(Value);

impl SearchBatch {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn from_results(results: Vec<SearchResult>) -> Self {
        Self(json!({ "results": results }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// 结果条目；不存在 `results` 列表时返回None
    pub fn results(&self) -> Option<Vec<SearchResult>> {
        let entries = self.0.get("results")?.as_array()?;
        Some(
            entries
                .iter()
                .map(|entry| SearchResult {
                    title: text_field(entry, "title"),
                    content: text_field(entry, "content"),
                    url: text_field(entry, "url"),
                })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => {
                map.is_empty()
                    || map
                        .get("results")
                        .and_then(Value::as_array)
                        .is_some_and(|results| results.is_empty())
            }
            _ => false,
        }
    }

    /// 拼接为提供给模型的文本块
    pub fn to_prompt_block(&self) -> String {
        match self.results() {
            Some(results) => results
                .iter()
                .map(|r| format!("Title: {}\nContent: {}\nURL: {}", r.title, r.content, r.url))
                .collect::<Vec<_>>()
                .join("\n\n"),
            None => match &self.0 {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }
}

fn text_field(entry: &Value, key: &str) -> String {
    match entry.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// 来源列表，每条结果一行 `* <title> : <url>`
pub fn format_sources(batch: &SearchBatch) -> String {
    batch
        .results()
        .unwrap_or_default()
        .iter()
        .map(|r| format!("* {} : {}", r.title, r.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 按配置选择搜索后端，整个运行期间不再切换
pub fn create_backend(config: &Config) -> Result<Arc<dyn SearchBackend>> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.search.timeout_seconds))
        .build()?;

    let backend: Arc<dyn SearchBackend> = match config.search_api {
        SearchApi::Tavily => Arc::new(TavilySearch::new(
            http,
            config.search.tavily_api_key.clone(),
            config.search.max_results,
        )),
        SearchApi::Perplexity => Arc::new(PerplexitySearch::new(
            http,
            config.search.perplexity_api_key.clone(),
            0,
        )),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batch() -> SearchBatch {
        SearchBatch::from_value(json!({
            "query": "thai curry",
            "results": [
                {"title": "Green Curry", "content": "Coconut milk and basil", "url": "https://a.example"},
                {"title": "Red Curry", "content": "Chili paste", "url": "https://b.example", "score": 0.7}
            ]
        }))
    }

    #[test]
    fn test_results_reads_expected_shape() {
        let results = sample_batch().results().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "Red Curry");
        assert_eq!(results[1].url, "https://b.example");
    }

    #[test]
    fn test_results_tolerates_missing_fields() {
        let batch = SearchBatch::from_value(json!({"results": [{"title": "Only title"}]}));
        let results = batch.results().unwrap();
        assert_eq!(results[0].content, "");
        assert_eq!(results[0].url, "");
    }

    #[test]
    fn test_prompt_block_flattens_entries() {
        let block = sample_batch().to_prompt_block();
        assert_eq!(
            block,
            "Title: Green Curry\nContent: Coconut milk and basil\nURL: https://a.example\n\n\
             Title: Red Curry\nContent: Chili paste\nURL: https://b.example"
        );
    }

    #[test]
    fn test_prompt_block_stringifies_unknown_shape() {
        let batch = SearchBatch::from_value(json!("raw answer text"));
        assert_eq!(batch.to_prompt_block(), "raw answer text");

        let batch = SearchBatch::from_value(json!({"answer": 42}));
        assert_eq!(batch.to_prompt_block(), r#"{"answer":42}"#);
    }

    #[test]
    fn test_is_empty() {
        assert!(SearchBatch::from_value(Value::Null).is_empty());
        assert!(SearchBatch::from_value(json!({})).is_empty());
        assert!(SearchBatch::from_value(json!({"results": []})).is_empty());
        assert!(!sample_batch().is_empty());
        assert!(!SearchBatch::from_value(json!({"answer": "x"})).is_empty());
    }

    #[test]
    fn test_format_sources() {
        assert_eq!(
            format_sources(&sample_batch()),
            "* Green Curry : https://a.example\n* Red Curry : https://b.example"
        );
        assert_eq!(format_sources(&SearchBatch::from_value(json!("text"))), "");
    }

    #[test]
    fn test_create_backend_follows_config() {
        let mut config = Config::default();
        assert_eq!(create_backend(&config).unwrap().name(), "tavily");

        config.search_api = SearchApi::Perplexity;
        assert_eq!(create_backend(&config).unwrap().name(), "perplexity");
    }
}
