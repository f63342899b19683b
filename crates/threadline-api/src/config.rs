use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use threadline_chat::PipelineConfig;
use threadline_context::DEFAULT_CONTEXT_BUDGET;
use threadline_llm::{GenerationOptions, ModelConfig};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub context: ContextConfig,
    pub pipeline: PipelineSettings,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    pub mongodb_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Mongodb,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Mongodb => f.write_str("mongodb"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database: "threadline".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub seed: Option<i64>,
    /// Unset means no deadline on model calls
    pub request_timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let base = ModelConfig::default();
        Self {
            base_url: base.base_url,
            model: base.model,
            max_tokens: base.options.max_tokens,
            temperature: base.options.temperature,
            top_p: base.options.top_p,
            seed: base.options.seed,
            request_timeout_secs: None,
        }
    }
}

impl From<&LlmConfig> for ModelConfig {
    fn from(config: &LlmConfig) -> Self {
        let mut options = GenerationOptions::new()
            .max_tokens(config.max_tokens)
            .temperature(config.temperature)
            .top_p(config.top_p);
        if let Some(seed) = config.seed {
            options = options.seed(seed);
        }

        let model = ModelConfig::new(config.base_url.clone(), config.model.clone()).with_options(options);
        match config.request_timeout_secs {
            Some(secs) => model.with_request_timeout(Duration::from_secs(secs)),
            None => model,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    #[default]
    Chars,
    Tiktoken,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub token_budget: usize,
    pub system_prompt: Option<String>,
    pub estimator: EstimatorKind,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            token_budget: DEFAULT_CONTEXT_BUDGET,
            system_prompt: None,
            estimator: EstimatorKind::Chars,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub summary_cadence: usize,
    pub title_temperature: f32,
    pub summary_temperature: f32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let base = PipelineConfig::default();
        Self {
            summary_cadence: base.summary_cadence,
            title_temperature: base.title_temperature,
            summary_temperature: base.summary_temperature,
        }
    }
}

impl From<&PipelineSettings> for PipelineConfig {
    fn from(settings: &PipelineSettings) -> Self {
        PipelineConfig::new()
            .summary_cadence(settings.summary_cadence)
            .title_temperature(settings.title_temperature)
            .summary_temperature(settings.summary_temperature)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. built-in defaults
    /// 2. config/default.toml
    /// 3. config/{ENV}.toml (if ENV is set)
    /// 4. THREADLINE_* variables, `__` between section and key (THREADLINE_LLM__MODEL)
    /// 5. SYSTEM_PROMPT and CONTEXT_TOKEN_BUDGET
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("THREADLINE")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.origins")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        if let Ok(prompt) = std::env::var("SYSTEM_PROMPT") {
            cfg.context.system_prompt = Some(prompt);
        }
        if let Ok(budget) = std::env::var("CONTEXT_TOKEN_BUDGET") {
            cfg.context.token_budget = budget.trim().parse().map_err(|_| {
                ConfigError::Message(format!("CONTEXT_TOKEN_BUDGET must be an integer, got {:?}", budget))
            })?;
        }

        // Load secrets from ENV (not in TOML)
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            cfg.mongodb_uri = uri;
        }
        if cfg.storage.backend == StorageBackend::Mongodb && cfg.mongodb_uri.is_empty() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required for the mongodb backend".to_string(),
            ));
        }

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::from(&self.llm)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::from(&self.pipeline)
    }

    /// The configured system prompt, with blank values treated as unset
    pub fn system_prompt(&self) -> Option<String> {
        self.context
            .system_prompt
            .as_ref()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [cors]
            enabled = true
            origins = ["http://localhost:3000"]

            [storage]
            backend = "mongodb"
            database = "test"

            [llm]
            model = "llama3"
            temperature = 0.5
            seed = 42

            [context]
            token_budget = 1500
            system_prompt = "You are terse."

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.backend, StorageBackend::Mongodb);
        assert_eq!(config.context.token_budget, 1500);
        // Unlisted keys keep their defaults
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.pipeline.summary_cadence, 10);
    }

    #[test]
    fn test_model_config_conversion() {
        let llm = LlmConfig {
            seed: Some(7),
            request_timeout_secs: Some(30),
            ..LlmConfig::default()
        };

        let model = ModelConfig::from(&llm);
        assert_eq!(model.options.seed, Some(7));
        assert_eq!(model.options.max_tokens, llm.max_tokens);
        assert_eq!(model.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_blank_system_prompt_is_unset() {
        let mut config = Config::default();
        config.context.system_prompt = Some("   ".to_string());
        assert!(config.system_prompt().is_none());
    }
}
