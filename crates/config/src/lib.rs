//! Configuration loading, validation, and management for Wayfarer.
//!
//! Loads configuration from `~/.wayfarer/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.wayfarer/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language-model transport settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Tool-use loop settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Itinerary search and disambiguation settings
    #[serde(default)]
    pub search: SearchConfig,

    /// The agent graph: router plus its sub-task agents
    #[serde(default)]
    pub agents: AgentsConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Explicit API key (normally read from `api_key_env` instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_model_key_env")]
    pub api_key_env: String,

    /// Override the Messages API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_model_key_env() -> String {
    "ANTHROPIC_API_KEY".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_model_key_env(),
            base_url: None,
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_key_env", &self.api_key_env)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum model calls per `process` call
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

fn default_max_turns() -> u32 {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Explicit app key (normally read from `app_key_env` instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_key: Option<String>,

    /// Environment variable holding the app key
    #[serde(default = "default_search_key_env")]
    pub app_key_env: String,

    /// Minimum match quality (0-1000) for a disambiguation candidate
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,

    /// How many times an ambiguous search may be re-queried
    #[serde(default = "default_max_passes")]
    pub max_disambiguation_passes: u32,

    /// Default journey parameters, keyed like the journey tools' arguments
    #[serde(default = "default_journey_params")]
    pub default_params: serde_json::Value,
}

fn default_search_base_url() -> String {
    "https://api.tfl.gov.uk/".into()
}
fn default_search_key_env() -> String {
    "TFL_API_KEY".into()
}
fn default_match_threshold() -> f64 {
    990.0
}
fn default_max_passes() -> u32 {
    1
}
fn default_journey_params() -> serde_json::Value {
    serde_json::json!({
        "walking_speed": "fast",
        "time_is": "arriving",
    })
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            app_key: None,
            app_key_env: default_search_key_env(),
            match_threshold: default_match_threshold(),
            max_disambiguation_passes: default_max_passes(),
            default_params: default_journey_params(),
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("base_url", &self.base_url)
            .field("app_key", &redact(&self.app_key))
            .field("app_key_env", &self.app_key_env)
            .field("match_threshold", &self.match_threshold)
            .field("max_disambiguation_passes", &self.max_disambiguation_passes)
            .field("default_params", &self.default_params)
            .finish()
    }
}

/// Profiles for every agent in the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default = "AgentProfile::router")]
    pub router: AgentProfile,

    #[serde(default = "AgentProfile::preferences")]
    pub preferences: AgentProfile,

    #[serde(default = "AgentProfile::journey")]
    pub journey: AgentProfile,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            router: AgentProfile::router(),
            preferences: AgentProfile::preferences(),
            journey: AgentProfile::journey(),
        }
    }
}

/// One agent: its model parameters, instructions and tool allow-list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Name used in logs and events
    pub name: String,

    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Inline system prompt (used when no file is given)
    #[serde(default)]
    pub system_prompt: String,

    /// Load the system prompt from this file instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_file: Option<String>,

    /// Values substituted for `{{ name }}` placeholders in the prompt
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub prompt_vars: HashMap<String, String>,

    /// Tools this agent may use
    #[serde(default)]
    pub tools: Vec<String>,
}

fn default_max_tokens() -> u32 {
    1000
}
fn default_temperature() -> f32 {
    0.1
}

impl AgentProfile {
    pub fn router() -> Self {
        Self {
            name: "router".into(),
            model: "claude-3-5-sonnet-20241022".into(),
            max_tokens: default_max_tokens(),
            temperature: 0.5,
            system_prompt: concat!(
                "You route requests about travel in London to the right specialist and speak with the principal. ",
                "Today is {{ date_today }}. ",
                "Use preferences_and_settings for standing preferences and journey_planner for concrete journeys.",
            )
            .into(),
            system_prompt_file: None,
            prompt_vars: HashMap::new(),
            tools: vec!["preferences_and_settings".into(), "journey_planner".into()],
        }
    }

    pub fn preferences() -> Self {
        Self {
            name: "preferences".into(),
            model: "claude-3-haiku-20240307".into(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: "You turn travel preferences into default journey parameters.".into(),
            system_prompt_file: None,
            prompt_vars: HashMap::new(),
            tools: vec!["set_default_journey_parameters".into()],
        }
    }

    pub fn journey() -> Self {
        Self {
            name: "journey".into(),
            model: "claude-3-haiku-20240307".into(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: "You compute and look up journey plans between locations in London.".into(),
            system_prompt_file: None,
            prompt_vars: HashMap::new(),
            tools: vec![
                "compute_journey_plans".into(),
                "get_computed_journey".into(),
                "get_computed_journey_plan".into(),
                "get_plan_field_description".into(),
            ],
        }
    }

    /// Produce the final system prompt.
    ///
    /// `extra_vars` take precedence over the profile's own `prompt_vars`.
    /// Placeholders without a value are left untouched.
    pub fn render_system_prompt(
        &self,
        extra_vars: &HashMap<String, String>,
    ) -> Result<String, ConfigError> {
        let template = match &self.system_prompt_file {
            Some(file) => {
                let path = PathBuf::from(file);
                std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
                    path,
                    reason: e.to_string(),
                })?
            }
            None => self.system_prompt.clone(),
        };

        let mut vars = self.prompt_vars.clone();
        vars.extend(extra_vars.iter().map(|(k, v)| (k.clone(), v.clone())));

        Ok(vars.iter().fold(template, |rendered, (key, value)| {
            replace_placeholder(&rendered, key, value)
        }))
    }
}

/// Replace `{{key}}` and `{{ key }}` with `value`.
fn replace_placeholder(text: &str, key: &str, value: &str) -> String {
    text.replace(&format!("{{{{ {key} }}}}"), value)
        .replace(&format!("{{{{{key}}}}}"), value)
}

impl AppConfig {
    /// Load configuration from the default path (~/.wayfarer/config.toml).
    ///
    /// Credentials come from the environment variables named in the
    /// config unless set explicitly; `WAYFARER_MODEL` overrides the
    /// router's model.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if self.model.api_key.is_none() {
            self.model.api_key = std::env::var(&self.model.api_key_env).ok();
        }
        if self.search.app_key.is_none() {
            self.search.app_key = std::env::var(&self.search.app_key_env).ok();
        }
        if let Ok(model) = std::env::var("WAYFARER_MODEL") {
            self.agents.router.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".wayfarer")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for agent in [&self.agents.router, &self.agents.preferences, &self.agents.journey] {
            if agent.temperature < 0.0 || agent.temperature > 1.0 {
                return Err(ConfigError::ValidationError(format!(
                    "agent '{}': temperature must be between 0.0 and 1.0",
                    agent.name
                )));
            }
            if agent.max_tokens == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "agent '{}': max_tokens must be > 0",
                    agent.name
                )));
            }
        }

        if !(0.0..=1000.0).contains(&self.search.match_threshold) {
            return Err(ConfigError::ValidationError(
                "search.match_threshold must be between 0 and 1000".into(),
            ));
        }
        if self.search.match_threshold < 900.0 {
            tracing::warn!(
                threshold = self.search.match_threshold,
                "Match thresholds below 900 accept weak location candidates"
            );
        }

        if self.search.max_disambiguation_passes == 0 {
            return Err(ConfigError::ValidationError(
                "search.max_disambiguation_passes must be >= 1".into(),
            ));
        }

        if self.engine.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "engine.max_turns must be >= 1".into(),
            ));
        }

        if !self.search.default_params.is_object() {
            return Err(ConfigError::ValidationError(
                "search.default_params must be a table".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `config` command).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
