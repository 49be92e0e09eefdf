use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "mealplan.toml";

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 搜索后端类型，运行期间不会切换
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchApi {
    #[serde(rename = "tavily")]
    #[default]
    Tavily,
    #[serde(rename = "perplexity")]
    Perplexity,
}

impl std::fmt::Display for SearchApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchApi::Tavily => write!(f, "tavily"),
            SearchApi::Perplexity => write!(f, "perplexity"),
        }
    }
}

impl std::str::FromStr for SearchApi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tavily" => Ok(SearchApi::Tavily),
            "perplexity" => Ok(SearchApi::Perplexity),
            _ => Err(format!("Unknown search api: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 模型标识
    pub model_name: String,

    /// 搜索后端
    pub search_api: SearchApi,

    /// 最多推荐的商店数量
    pub max_store_recommendations: usize,

    /// 是否包含价格估算（目前下游未使用）
    pub include_price_estimates: bool,

    /// 备选菜谱数量（目前下游未使用）
    pub max_recipe_alternatives: usize,

    /// 最大检索轮数（目前下游未使用）
    pub max_web_research_loops: usize,

    /// 报告输出目录
    pub output_dir: PathBuf,

    /// LLM配置
    pub llm: LLMConfig,

    /// 搜索配置
    pub search: SearchConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 温度固定为0，配置文件中的值被忽略
    #[serde(skip)]
    pub temperature: f64,

    /// 最大tokens
    pub max_tokens: u32,

    /// 单次调用超时时间（秒）
    pub timeout_seconds: u64,
}

/// 搜索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub tavily_api_key: String,

    pub perplexity_api_key: String,

    /// 每次搜索返回的最大结果数
    pub max_results: u32,

    /// 请求超时时间（秒）
    pub timeout_seconds: u64,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 加载基础配置：显式指定的文件 > 当前目录下的默认文件 > 内置默认值
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let default_path = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_file(&default_path);
        }

        Ok(Config::default())
    }

    /// 使用进程环境变量覆盖配置
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// 使用给定的查找函数覆盖配置，变量名为字段名的大写形式
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("MODEL_NAME") {
            self.model_name = v;
        }
        if let Some(v) = get("SEARCH_API") {
            override_parsed(&mut self.search_api, "SEARCH_API", &v);
        }
        if let Some(v) = get("MAX_STORE_RECOMMENDATIONS") {
            override_parsed(&mut self.max_store_recommendations, "MAX_STORE_RECOMMENDATIONS", &v);
        }
        if let Some(v) = get("INCLUDE_PRICE_ESTIMATES") {
            override_parsed(&mut self.include_price_estimates, "INCLUDE_PRICE_ESTIMATES", &v);
        }
        if let Some(v) = get("MAX_RECIPE_ALTERNATIVES") {
            override_parsed(&mut self.max_recipe_alternatives, "MAX_RECIPE_ALTERNATIVES", &v);
        }
        if let Some(v) = get("MAX_WEB_RESEARCH_LOOPS") {
            override_parsed(&mut self.max_web_research_loops, "MAX_WEB_RESEARCH_LOOPS", &v);
        }

        if let Some(v) = get("LLM_PROVIDER") {
            override_parsed(&mut self.llm.provider, "LLM_PROVIDER", &v);
        }
        // 未单独配置时沿用各provider的惯用变量
        let provider_key = match self.llm.provider {
            LLMProvider::OpenAI => get("OPENAI_API_KEY"),
            LLMProvider::Anthropic => get("ANTHROPIC_API_KEY"),
            LLMProvider::Ollama => None,
        };
        if let Some(v) = get("LLM_API_KEY") {
            self.llm.api_key = v;
        } else if self.llm.api_key.is_empty()
            && let Some(v) = provider_key
        {
            self.llm.api_key = v;
        }
        if let Some(v) = get("LLM_API_BASE_URL") {
            self.llm.api_base_url = v;
        }

        if let Some(v) = get("TAVILY_API_KEY") {
            self.search.tavily_api_key = v;
        }
        if let Some(v) = get("PERPLEXITY_API_KEY") {
            self.search.perplexity_api_key = v;
        }
    }
}

/// 解析失败时保留原值并告警
fn override_parsed<T>(target: &mut T, key: &str, raw: &str)
where
    T: std::str::FromStr,
{
    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(key, value = raw, "无法解析环境变量，沿用原配置"),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_name: String::from("gpt-4-0125-preview"),
            search_api: SearchApi::default(),
            max_store_recommendations: 3,
            include_price_estimates: true,
            max_recipe_alternatives: 2,
            max_web_research_loops: 3,
            output_dir: PathBuf::from("."),
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: String::new(),
            api_base_url: String::from("https://api.openai.com/v1"),
            temperature: 0.0,
            max_tokens: 4096,
            timeout_seconds: 120,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: String::new(),
            perplexity_api_key: String::new(),
            max_results: 3,
            timeout_seconds: 60,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
