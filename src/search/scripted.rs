//! 可编排结果的搜索后端，用于测试

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{SearchBackend, SearchBatch, SearchError};

#[derive(Debug, Default)]
pub struct ScriptedSearch {
    batches: Mutex<VecDeque<Result<SearchBatch, String>>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch(self, batch: SearchBatch) -> Self {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(Ok(batch));
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(Err(message.into()));
        self
    }

    /// 收到的查询，按调用顺序
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl SearchBackend for ScriptedSearch {
    async fn search(&self, query: &str) -> Result<SearchBatch, SearchError> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(query.to_string());

        let next = self
            .batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        match next {
            Some(Ok(batch)) => Ok(batch),
            Some(Err(message)) => Err(SearchError::Request {
                backend: "scripted",
                message,
            }),
            None => Err(SearchError::Request {
                backend: "scripted",
                message: "no batch left".to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
