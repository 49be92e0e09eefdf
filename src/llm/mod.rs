//! 语言模型接入：统一的对话能力接口、rig实现以及回复解析

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub mod client;
pub mod scripted;

pub use client::LLMClient;
pub use scripted::ScriptedModel;

/// 单轮对话能力：一条指令消息加一条任务消息，返回模型的原始文本
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// 模型标识，用于日志
    fn model_name(&self) -> &str;
}

/// 把模型回复解析为JSON
///
/// 去掉首尾空白以及包裹整段回复的markdown代码块后严格解析，
/// 其余任何不合法的内容都视为格式错误。
pub fn parse_json_reply(reply: &str) -> serde_json::Result<Value> {
    serde_json::from_str(strip_code_fence(reply))
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // 去掉语言标记，如 ```json
    match body.find('\n') {
        Some(newline) if !body[..newline].trim_start().starts_with(['{', '[']) => {
            body[newline + 1..].trim()
        }
        _ => {
            // 单行写法也可能带语言标记，如 ```json{...}```
            let untagged = body.trim_start_matches(|c: char| c.is_ascii_alphabetic());
            if untagged.trim_start().starts_with(['{', '[']) {
                untagged.trim()
            } else {
                body.trim()
            }
        }
    }
}
