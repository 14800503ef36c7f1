//! Configuration management for kbchat.
//!
//! Configuration is layered from lowest to highest precedence:
//! - Built-in defaults
//! - Config file (`.kbchat/config.yaml` in the workspace, or `KBCHAT_CONFIG`)
//! - Environment variables (`KBCHAT_*`)
//! - Command-line flags
//!
//! Nothing here is a process-wide singleton: the loaded `AppConfig` is
//! handed to whoever builds clients, gates and backends.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Known LLM provider names.
pub const KNOWN_PROVIDERS: [&str; 2] = ["ollama", "openai"];

/// Known gate strategy names.
pub const KNOWN_STRATEGIES: [&str; 2] = ["keyword", "classifier"];

/// Canonical strategy name for `name`; accepts `keywords` and `llm` as aliases.
pub fn canonical_strategy(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "keyword" | "keywords" => Some("keyword"),
        "classifier" | "llm" => Some("classifier"),
        _ => None,
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .kbchat/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("ollama", "openai")
    pub provider: String,

    /// Default generation model identifier
    pub model: String,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Prompt gate settings
    pub gate: GateConfig,

    /// Retrieval/generation backend settings
    pub knowledge: KnowledgeConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::OpenAI { model, .. } | ProviderConfig::Ollama { model, .. } => model,
        }
    }

    /// Custom endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenAI { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }

    /// Request timeout in seconds, if any.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            ProviderConfig::OpenAI { timeout, .. } | ProviderConfig::Ollama { timeout, .. } => {
                *timeout
            }
        }
    }
}

/// Prompt gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// "keyword" or "classifier"
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Domain vocabulary for the keyword strategy
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Domain description used in the classifier rubric
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Model used for classification (falls back to the active model)
    #[serde(rename = "classifierModel", default)]
    pub classifier_model: Option<String>,

    /// Prompt definition rendered for classification
    #[serde(rename = "promptId", default = "default_prompt_id")]
    pub prompt_id: String,

    /// Classifier call timeout; expiry counts as a rejection
    #[serde(rename = "timeoutSecs", default = "default_gate_timeout")]
    pub timeout_secs: u64,
}

fn default_strategy() -> String {
    "classifier".to_string()
}

fn default_domain() -> String {
    "heavy machinery".to_string()
}

fn default_prompt_id() -> String {
    "gate.classify.default".to_string()
}

fn default_gate_timeout() -> u64 {
    3
}

/// Sample vocabulary for the heavy machinery product catalogue.
pub fn default_keywords() -> Vec<String> {
    [
        "heavy machinery",
        "excavator",
        "bulldozer",
        "forklift",
        "dump truck",
        "mobile crane",
        "x950",
        "bd850",
        "fl250",
        "dt1000",
        "mc750",
        "capacity",
        "engine",
        "horsepower",
        "weight",
        "dimensions",
        "spec sheet",
        "specifications",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            keywords: default_keywords(),
            domain: default_domain(),
            classifier_model: None,
            prompt_id: default_prompt_id(),
            timeout_secs: default_gate_timeout(),
        }
    }
}

/// Retrieval/generation backend configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Retrieve-and-generate endpoint URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Knowledge base identifier
    #[serde(rename = "knowledgeBaseId", default)]
    pub knowledge_base_id: Option<String>,

    /// Generation model used by the backend
    #[serde(rename = "modelArn", default)]
    pub model_arn: Option<String>,

    /// Environment variable holding the backend bearer token
    #[serde(rename = "apiKeyEnv", default)]
    pub api_key_env: Option<String>,

    /// Backend request timeout in seconds
    #[serde(rename = "timeoutSecs", default)]
    pub timeout_secs: Option<u64>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    gate: Option<GateConfig>,
    knowledge: Option<KnowledgeConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            gate: GateConfig::default(),
            knowledge: KnowledgeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and the environment.
    ///
    /// Environment variables:
    /// - `KBCHAT_WORKSPACE`: Override workspace path
    /// - `KBCHAT_CONFIG`: Path to config file
    /// - `KBCHAT_PROVIDER`: LLM provider
    /// - `KBCHAT_MODEL`: Model identifier
    /// - `KBCHAT_API_KEY`: API key
    /// - `KBCHAT_GATE_STRATEGY`: Gate strategy
    /// - `KBCHAT_KNOWLEDGE_BASE_ID`: Knowledge base identifier
    /// - `KBCHAT_KNOWLEDGE_ENDPOINT`: Backend endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use kbchat_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(
            std::env::var("KBCHAT_WORKSPACE").ok().map(PathBuf::from),
            std::env::var("KBCHAT_CONFIG").ok().map(PathBuf::from),
        )
    }

    /// Load configuration for an explicit workspace and config file.
    ///
    /// `None` falls back to the current directory and
    /// `<workspace>/.kbchat/config.yaml`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }
        config.config_file = config_file;

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config.config_path();
        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.apply_env();

        Ok(config)
    }

    /// Path of the config file this configuration reads.
    pub fn config_path(&self) -> PathBuf {
        match self.config_file {
            Some(ref cf) => cf.clone(),
            None => self.kbchat_dir().join("config.yaml"),
        }
    }

    /// Environment variables override YAML config.
    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("KBCHAT_PROVIDER") {
            self.provider = provider;
        }

        if let Ok(model) = std::env::var("KBCHAT_MODEL") {
            self.model = model;
        }

        if let Ok(strategy) = std::env::var("KBCHAT_GATE_STRATEGY") {
            self.gate.strategy = strategy;
        }

        if let Ok(kb) = std::env::var("KBCHAT_KNOWLEDGE_BASE_ID") {
            self.knowledge.knowledge_base_id = Some(kb);
        }

        if let Ok(endpoint) = std::env::var("KBCHAT_KNOWLEDGE_ENDPOINT") {
            self.knowledge.endpoint = Some(endpoint);
        }

        self.api_key = std::env::var("KBCHAT_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        if let Some(gate) = config_file.gate {
            result.gate = gate;
        }

        if let Some(knowledge) = config_file.knowledge {
            result.knowledge = knowledge;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .kbchat directory.
    pub fn kbchat_dir(&self) -> PathBuf {
        self.workspace.join(".kbchat")
    }

    /// Get the configuration for a provider, if the file declares one.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider))
    }

    /// Resolve the LLM API key: `KBCHAT_API_KEY` first, then the provider's `apiKeyEnv`.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => std::env::var(api_key_env).ok(),
            _ => None,
        }
    }

    /// Resolve the backend bearer token from `knowledge.apiKeyEnv`.
    pub fn resolve_knowledge_token(&self) -> Option<String> {
        self.knowledge
            .api_key_env
            .as_ref()
            .and_then(|env| std::env::var(env).ok())
    }

    /// Model the classifier gate should call.
    pub fn classifier_model(&self) -> &str {
        self.gate.classifier_model.as_deref().unwrap_or(&self.model)
    }

    /// Validate configuration for the active provider and gate.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.get_provider_config(provider)
        {
            if self.api_key.is_none() && std::env::var(api_key_env).is_err() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    api_key_env
                )));
            }
        }

        let strategy = canonical_strategy(&self.gate.strategy).ok_or_else(|| {
            AppError::Config(format!(
                "Unknown gate strategy: {}. Supported: {}",
                self.gate.strategy,
                KNOWN_STRATEGIES.join(", ")
            ))
        })?;

        if strategy == "keyword" && self.gate.keywords.iter().all(|k| k.trim().is_empty())
        {
            return Err(AppError::Config(
                "Keyword gate requires at least one keyword".to_string(),
            ));
        }

        if self.gate.timeout_secs == 0 {
            return Err(AppError::Config(
                "gate.timeoutSecs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
