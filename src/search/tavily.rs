//! 通用网页搜索后端（Tavily）

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{SearchBackend, SearchBatch, SearchError};

const ENDPOINT: &str = "https://api.tavily.com/search";
const BACKEND: &str = "tavily";

#[derive(Debug, Clone)]
pub struct TavilySearch {
    http: reqwest::Client,
    api_key: String,
    max_results: u32,
}

impl TavilySearch {
    pub fn new(http: reqwest::Client, api_key: String, max_results: u32) -> Self {
        Self {
            http,
            api_key,
            max_results,
        }
    }

    fn request_body(&self, query: &str) -> Value {
        json!({
            "query": query,
            "search_depth": "basic",
            "max_results": self.max_results,
            "include_raw_content": true
        })
    }
}

#[async_trait]
impl SearchBackend for TavilySearch {
    async fn search(&self, query: &str) -> Result<SearchBatch, SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::MissingApiKey("TAVILY_API_KEY"));
        }

        let response = self
            .http
            .post(ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(query))
            .send()
            .await
            .map_err(|e| SearchError::Request {
                backend: BACKEND,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                backend: BACKEND,
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await.map_err(|e| SearchError::Parse {
            backend: BACKEND,
            message: e.to_string(),
        })?;
        tracing::debug!(query, "tavily search completed");

        Ok(SearchBatch::from_value(payload))
    }

    fn name(&self) -> &'static str {
        BACKEND
    }
}
