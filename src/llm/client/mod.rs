//! LLM客户端 - 基于rig的生产实现

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::Config;
use crate::llm::ChatModel;

mod providers;

use providers::ProviderClient;

/// LLM客户端 - 每次调用构建一次性Agent，不保留对话历史
#[derive(Clone)]
pub struct LLMClient {
    config: Config,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: Config) -> Result<Self> {
        let client = ProviderClient::new(&config.llm)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ChatModel for LLMClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let llm_config = &self.config.llm;
        let agent =
            self.client
                .create_agent(&self.config.model_name, system_prompt, llm_config);

        let timeout = Duration::from_secs(llm_config.timeout_seconds);
        match tokio::time::timeout(timeout, agent.prompt(user_prompt)).await {
            Ok(reply) => reply,
            Err(_) => Err(anyhow!(
                "model {} did not answer within {}s",
                self.config.model_name,
                llm_config.timeout_seconds
            )),
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
