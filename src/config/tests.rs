#[cfg(test)]
mod tests {
    use crate::config::{Config, LLMConfig, LLMProvider, SearchApi, SearchConfig};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.model_name, "gpt-4-0125-preview");
        assert_eq!(config.search_api, SearchApi::Tavily);
        assert_eq!(config.max_store_recommendations, 3);
        assert!(config.include_price_estimates);
        assert_eq!(config.max_recipe_alternatives, 2);
        assert_eq!(config.max_web_research_loops, 3);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(!config.verbose);
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.provider, LLMProvider::OpenAI);
        assert_eq!(config.api_base_url, "https://api.openai.com/v1");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_search_config_default() {
        let config = SearchConfig::default();

        assert!(config.tavily_api_key.is_empty());
        assert!(config.perplexity_api_key.is_empty());
        assert_eq!(config.max_results, 3);
        assert_eq!(config.timeout_seconds, 60);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!(
            "openai".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "Anthropic".parse::<LLMProvider>().unwrap(),
            LLMProvider::Anthropic
        );
        assert_eq!(
            "ollama".parse::<LLMProvider>().unwrap(),
            LLMProvider::Ollama
        );

        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_search_api_round_trip_names() {
        assert_eq!("tavily".parse::<SearchApi>().unwrap(), SearchApi::Tavily);
        assert_eq!(
            "PERPLEXITY".parse::<SearchApi>().unwrap(),
            SearchApi::Perplexity
        );
        assert!("bing".parse::<SearchApi>().is_err());

        assert_eq!(SearchApi::Tavily.to_string(), "tavily");
        assert_eq!(SearchApi::Perplexity.to_string(), "perplexity");
    }

    #[test]
    fn test_env_overrides_defaults() {
        let mut config = Config::default();
        config.apply_env_with(env_of(&[
            ("MODEL_NAME", "gpt-4o-mini"),
            ("SEARCH_API", "perplexity"),
            ("MAX_STORE_RECOMMENDATIONS", "5"),
            ("INCLUDE_PRICE_ESTIMATES", "false"),
            ("TAVILY_API_KEY", "tvly-123"),
        ]));

        assert_eq!(config.model_name, "gpt-4o-mini");
        assert_eq!(config.search_api, SearchApi::Perplexity);
        assert_eq!(config.max_store_recommendations, 5);
        assert!(!config.include_price_estimates);
        assert_eq!(config.search.tavily_api_key, "tvly-123");
    }

    #[test]
    fn test_env_unparsable_value_keeps_previous() {
        let mut config = Config::default();
        config.apply_env_with(env_of(&[
            ("MAX_STORE_RECOMMENDATIONS", "plenty"),
            ("SEARCH_API", "bing"),
        ]));

        assert_eq!(config.max_store_recommendations, 3);
        assert_eq!(config.search_api, SearchApi::Tavily);
    }

    #[test]
    fn test_env_blank_value_is_ignored() {
        let mut config = Config::default();
        config.apply_env_with(env_of(&[("MODEL_NAME", "   ")]));

        assert_eq!(config.model_name, "gpt-4-0125-preview");
    }

    #[test]
    fn test_env_api_key_falls_back_to_provider_variable() {
        let mut config = Config::default();
        config.apply_env_with(env_of(&[("OPENAI_API_KEY", "sk-openai")]));
        assert_eq!(config.llm.api_key, "sk-openai");

        let mut config = Config::default();
        config.apply_env_with(env_of(&[
            ("OPENAI_API_KEY", "sk-openai"),
            ("LLM_API_KEY", "sk-explicit"),
        ]));
        assert_eq!(config.llm.api_key, "sk-explicit");
    }

    #[test]
    fn test_env_provider_key_does_not_clobber_file_key() {
        let mut config = Config::default();
        config.llm.api_key = "from-file".to_string();
        config.apply_env_with(env_of(&[("OPENAI_API_KEY", "sk-openai")]));

        assert_eq!(config.llm.api_key, "from-file");
    }

    #[test]
    fn test_from_file_partial_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mealplan.toml");
        std::fs::write(
            &path,
            r#"model_name = "gpt-4o"
search_api = "perplexity"

[llm]
timeout_seconds = 30
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.model_name, "gpt-4o");
        assert_eq!(config.search_api, SearchApi::Perplexity);
        assert_eq!(config.llm.timeout_seconds, 30);
        // 未出现的字段使用默认值
        assert_eq!(config.max_store_recommendations, 3);
        assert_eq!(config.llm.temperature, 0.0);
    }

    #[test]
    fn test_from_file_ignores_temperature() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mealplan.toml");
        std::fs::write(&path, "[llm]\ntemperature = 0.9\nmax_tokens = 512\n").unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.llm.max_tokens, 512);
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file(&PathBuf::from("/nonexistent/mealplan.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(&path, "max_store_recommendations = 7\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.max_store_recommendations, 7);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mealplan.toml");
        std::fs::write(&path, "model_name = \"from-file\"\n").unwrap();

        let mut config = Config::from_file(&path).unwrap();
        config.apply_env_with(env_of(&[("MODEL_NAME", "from-env")]));

        assert_eq!(config.model_name, "from-env");
    }
}
