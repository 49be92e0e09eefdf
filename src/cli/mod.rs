use crate::config::{Config, LLMProvider, SearchApi};
use crate::planner::PreferenceRecord;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// mealplan-rs - 根据所在城市与口味偏好生成菜谱、购物清单和附近商店推荐
#[derive(Parser, Debug)]
#[command(name = "mealplan-rs")]
#[command(
    about = "Generate a meal plan for your location: a recipe matching your preferences, a shopping list, and nearby grocery stores."
)]
#[command(version)]
pub struct Args {
    /// 所在城市或地区
    pub location: String,

    /// 菜系偏好
    #[arg(long)]
    pub cuisine: Option<String>,

    /// 饮食限制，可传入多个
    #[arg(long, num_args = 1..)]
    pub restrictions: Vec<String>,

    /// 口味偏好
    #[arg(long)]
    pub flavor: Option<String>,

    /// 模型标识（默认 gpt-4-0125-preview）
    #[arg(long)]
    pub model: Option<String>,

    /// 搜索后端 (tavily, perplexity)
    #[arg(long)]
    pub search_api: Option<SearchApi>,

    /// 最多推荐的商店数量
    #[arg(long)]
    pub max_stores: Option<usize>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 报告输出目录
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// LLM Provider (openai, anthropic, ollama)
    #[arg(long)]
    pub llm_provider: Option<LLMProvider>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// 只打印报告，不写入文件
    #[arg(long)]
    pub no_save: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 解析最终配置：命令行 > 环境变量 > 配置文件 > 默认值
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        config.apply_env();
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// 用命令行参数覆盖配置
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.model_name = model.clone();
        }
        if let Some(search_api) = self.search_api {
            config.search_api = search_api;
        }
        if let Some(max_stores) = self.max_stores {
            config.max_store_recommendations = max_stores;
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }

        // 覆盖LLM配置
        if let Some(provider) = &self.llm_provider {
            config.llm.provider = provider.clone();
        }
        if let Some(api_key) = &self.llm_api_key {
            config.llm.api_key = api_key.clone();
        }
        if let Some(base_url) = &self.llm_api_base_url {
            config.llm.api_base_url = base_url.clone();
        }

        if self.verbose {
            config.verbose = true;
        }
    }

    /// 本次运行的用户偏好
    pub fn preferences(&self) -> Result<PreferenceRecord> {
        Ok(PreferenceRecord::new(
            self.location.as_str(),
            self.cuisine.clone(),
            self.restrictions.clone(),
            self.flavor.clone(),
        )?)
    }
}
