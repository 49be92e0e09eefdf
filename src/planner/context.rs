use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::llm::{ChatModel, LLMClient};
use crate::search::{SearchBackend, create_backend};

/// 一次运行中各阶段共享的协作者
#[derive(Clone)]
pub struct PlannerContext {
    /// 配置，运行期间只读
    pub config: Config,
    /// 语言模型
    pub model: Arc<dyn ChatModel>,
    /// 搜索后端
    pub search: Arc<dyn SearchBackend>,
}

impl PlannerContext {
    /// 按配置创建真实的模型客户端与搜索后端
    pub fn new(config: Config) -> Result<Self> {
        let model: Arc<dyn ChatModel> = Arc::new(LLMClient::new(config.clone())?);
        let search = create_backend(&config)?;

        Ok(Self {
            config,
            model,
            search,
        })
    }

    /// 使用外部提供的协作者，测试中替换为脚本化实现
    pub fn with_collaborators(
        config: Config,
        model: Arc<dyn ChatModel>,
        search: Arc<dyn SearchBackend>,
    ) -> Self {
        Self {
            config,
            model,
            search,
        }
    }
}
