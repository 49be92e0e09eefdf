//! 问答引擎式搜索后端（Perplexity）
//!
//! 返回的是一段带引用的回答，这里把它整理成与通用搜索相同的结果结构：
//! 第一条结果携带完整回答，其余引用各占一条。

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{SearchBackend, SearchBatch, SearchError};

const ENDPOINT: &str = "https://api.perplexity.ai/chat/completions";
const BACKEND: &str = "perplexity";
const MODEL: &str = "sonar-pro";
const FALLBACK_CITATION: &str = "https://perplexity.ai";

#[derive(Debug, Clone)]
pub struct PerplexitySearch {
    http: reqwest::Client,
    api_key: String,
    /// 检索轮次，仅用于结果标题编号
    loop_count: u32,
}

impl PerplexitySearch {
    pub fn new(http: reqwest::Client, api_key: String, loop_count: u32) -> Self {
        Self {
            http,
            api_key,
            loop_count,
        }
    }

    fn request_body(query: &str) -> Value {
        json!({
            "model": MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": "Search the web and provide factual information with sources."
                },
                {
                    "role": "user",
                    "content": query
                }
            ]
        })
    }

    /// 把回答和引用整理为统一结果
    pub fn shape_batch(&self, payload: &Value) -> Result<SearchBatch, SearchError> {
        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| SearchError::Parse {
                backend: BACKEND,
                message: "missing choices[0].message.content".to_string(),
            })?;

        let mut citations: Vec<String> = payload
            .get("citations")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if citations.is_empty() {
            citations.push(FALLBACK_CITATION.to_string());
        }

        let round = self.loop_count + 1;
        let results: Vec<Value> = citations
            .into_iter()
            .enumerate()
            .map(|(i, url)| {
                let title = format!("Perplexity Search {}, Source {}", round, i + 1);
                if i == 0 {
                    json!({
                        "title": title,
                        "url": url,
                        "content": content,
                        "raw_content": content,
                    })
                } else {
                    json!({
                        "title": title,
                        "url": url,
                        "content": "See above for full content",
                    })
                }
            })
            .collect();

        Ok(SearchBatch::from_value(json!({ "results": results })))
    }
}

#[async_trait]
impl SearchBackend for PerplexitySearch {
    async fn search(&self, query: &str) -> Result<SearchBatch, SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::MissingApiKey("PERPLEXITY_API_KEY"));
        }

        let response = self
            .http
            .post(ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&Self::request_body(query))
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
        tracing::debug!(query, "perplexity search completed");

        self.shape_batch(&payload)
    }

    fn name(&self) -> &'static str {
        BACKEND
    }
}
