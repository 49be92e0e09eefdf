//! 可编排回复的模型实现，用于测试和离线演示
//!
//! 按入队顺序依次返回预设回复，并记录收到的每一组提示词。

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::ChatModel;

/// 一次预设的模型回复
#[derive(Debug, Clone)]
enum ScriptedReply {
    Text(String),
    Failure(String),
}

/// 收到的一组提示词
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPrompt {
    pub system_prompt: String,
    pub user_prompt: String,
}

#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    prompts: Mutex<Vec<RecordedPrompt>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条文本回复
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(ScriptedReply::Text(reply.into()));
        self
    }

    /// 追加一次调用失败
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(ScriptedReply::Failure(message.into()));
        self
    }

    fn push(&self, reply: ScriptedReply) {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(reply);
    }

    /// 已收到的提示词，按调用顺序
    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 尚未消费的回复数量
    pub fn remaining(&self) -> usize {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedPrompt {
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
            });

        let next = self
            .replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        match next {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted model has no reply left")),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
