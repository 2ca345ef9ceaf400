//! TOML-based configuration for the research studio
//!
//! This module provides declarative configuration for the server, the LLM
//! provider, web search and the research pipeline via a TOML file
//! (`studio.toml`).
//!
//! # Hot Reloading
//!
//! Configuration changes can be detected and applied at runtime.
//! Use `ConfigManager` for thread-safe access to the current configuration;
//! every research run reads the pipeline settings that are current when it starts.

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::llm::Provider;

/// Root configuration structure loaded from studio.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: ProviderConfig,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound for a single generation request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        /// Environment variable containing API key
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        #[serde(default = "default_openai_model")]
        model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        model: String,
    },
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::OpenAI {
            api_key_env: default_openai_key_env(),
            api_base: default_openai_base(),
            model: default_openai_model(),
        }
    }
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of results rendered into one search answer
    #[serde(default = "default_num_results")]
    pub num_results: usize,
}

fn default_num_results() -> usize {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_results: default_num_results(),
        }
    }
}

// ============= Pipeline Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Timeout applied to every search call
    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,

    /// Character cap on the aggregated findings handed to the synthesizer
    #[serde(default = "default_max_synthesis_chars")]
    pub max_synthesis_chars: usize,

    /// Questions processed at once by a domain agent (1 = sequential)
    #[serde(default = "default_question_concurrency")]
    pub question_concurrency: usize,
}

fn default_search_timeout() -> u64 {
    15
}

fn default_max_synthesis_chars() -> usize {
    50_000
}

fn default_question_concurrency() -> usize {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search_timeout_secs: default_search_timeout(),
            max_synthesis_chars: default_max_synthesis_chars(),
            question_concurrency: default_question_concurrency(),
        }
    }
}

impl PipelineConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl From<ConfigError> for crate::types::AppError {
    fn from(err: ConfigError) -> Self {
        crate::types::AppError::Configuration(err.to_string())
    }
}

impl StudioConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: StudioConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate value ranges and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.search_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.search_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.pipeline.max_synthesis_chars == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_synthesis_chars must be greater than zero".to_string(),
            ));
        }
        if self.pipeline.question_concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.question_concurrency must be at least 1".to_string(),
            ));
        }
        if self.search.num_results == 0 {
            return Err(ConfigError::ValidationError(
                "search.num_results must be greater than zero".to_string(),
            ));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "llm.request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        match &self.llm.provider {
            ProviderConfig::OpenAI { api_key_env, .. } => {
                self.validate_env_var(api_key_env)?;
            }
            ProviderConfig::Ollama { model, .. } => {
                if model.trim().is_empty() {
                    return Err(ConfigError::ValidationError(
                        "llm.provider.model must not be empty".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Resolve the configured provider into a runtime [`Provider`]
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        let request_timeout = Duration::from_secs(self.llm.request_timeout_secs);
        let temperature = self.llm.temperature;

        match &self.llm.provider {
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            } => {
                let api_key = self
                    .resolve_env(api_key_env)
                    .ok_or_else(|| ConfigError::MissingEnvVar(api_key_env.clone()))?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.clone(),
                    temperature,
                    request_timeout,
                })
            }
            ProviderConfig::Ollama { base_url, model } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
                temperature,
                request_timeout,
            }),
        }
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct ConfigManager {
    config: Arc<ArcSwap<StudioConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl ConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Convert to absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = StudioConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config (useful for testing).
    /// This won't have file watching capabilities.
    pub fn from_config(config: StudioConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("studio.toml"),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<StudioConfig> {
        self.config.load_full()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = StudioConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let file_name = self.config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        // Debounced in the receiver
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the config file's parent directory
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let mut last_reload: Option<std::time::Instant> = None;
            let debounce_duration = Duration::from_millis(500);

            while rx.recv().await.is_some() {
                if last_reload.is_some_and(|t| t.elapsed() < debounce_duration) {
                    continue;
                }

                // Wait a bit for file write to complete
                tokio::time::sleep(Duration::from_millis(100)).await;

                match StudioConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = Some(std::time::Instant::now());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn ollama_config() -> String {
        r#"
[server]
host = "0.0.0.0"
port = 8080
log_level = "debug"

[llm]
temperature = 0.2

[llm.provider]
type = "ollama"
base_url = "http://localhost:11434"
model = "llama3.2"

[search]
num_results = 5

[pipeline]
search_timeout_secs = 20
max_synthesis_chars = 1000
question_concurrency = 3
"#
        .to_string()
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(&ollama_config());
        let config = StudioConfig::load(file.path()).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.search.num_results, 5);
        assert_eq!(config.pipeline.search_timeout(), Duration::from_secs(20));
        assert_eq!(config.pipeline.max_synthesis_chars, 1000);
        assert_eq!(config.pipeline.question_concurrency, 3);
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        assert!(matches!(
            config.llm.provider,
            ProviderConfig::Ollama { ref model, .. } if model == "llama3.2"
        ));
    }

    #[test]
    fn test_pipeline_defaults() {
        let pipeline = PipelineConfig::default();
        assert_eq!(pipeline.search_timeout_secs, 15);
        assert_eq!(pipeline.max_synthesis_chars, 50_000);
        assert_eq!(pipeline.question_concurrency, 1);
    }

    #[test]
    fn test_missing_file() {
        let result = StudioConfig::load("/definitely/not/here/studio.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("[server\nport = ");
        assert!(matches!(
            StudioConfig::load(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let content = ollama_config().replace("question_concurrency = 3", "question_concurrency = 0");
        let file = write_config(&content);
        assert!(matches!(
            StudioConfig::load(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_openai_requires_key_env() {
        let content = r#"
[llm.provider]
type = "openai"
api_key_env = "STUDIO_TEST_KEY_THAT_IS_NEVER_SET"
model = "gpt-4o-mini"
"#;
        let file = write_config(content);
        match StudioConfig::load(file.path()) {
            Err(ConfigError::MissingEnvVar(name)) => {
                assert_eq!(name, "STUDIO_TEST_KEY_THAT_IS_NEVER_SET")
            }
            other => panic!("expected MissingEnvVar, got {:?}", other),
        }
    }

    #[test]
    fn test_provider_resolution_for_ollama() {
        let file = write_config(&ollama_config());
        let config = StudioConfig::load(file.path()).unwrap();
        let provider = config.provider().unwrap();
        assert_eq!(provider.name(), "Ollama");
    }

    #[test]
    fn test_manager_reload_picks_up_changes() {
        let mut file = write_config(&ollama_config());
        let manager = ConfigManager::new(file.path()).unwrap();
        assert_eq!(manager.config().server.port, 8080);

        let updated = ollama_config().replace("port = 8080", "port = 9090");
        file.as_file_mut().set_len(0).unwrap();
        std::io::Seek::rewind(file.as_file_mut()).unwrap();
        file.write_all(updated.as_bytes()).unwrap();
        file.flush().unwrap();

        manager.reload().unwrap();
        assert_eq!(manager.config().server.port, 9090);
    }

    #[test]
    fn test_manager_from_config() {
        let manager = ConfigManager::from_config(StudioConfig::default());
        assert_eq!(manager.config().pipeline, PipelineConfig::default());
    }

    #[tokio::test]
    async fn test_watcher_start_and_stop() {
        let file = write_config(&ollama_config());
        let manager = ConfigManager::new(file.path()).unwrap();

        manager.start_watching().unwrap();
        assert!(manager.watcher.read().is_some());

        manager.stop_watching();
        assert!(manager.watcher.read().is_none());
        assert_eq!(manager.config().server.port, 8080);
    }
}
