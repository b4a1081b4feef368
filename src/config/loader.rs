//! Layered configuration for a documentation run.
//!
//! Sources, strongest first:
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.repo-onboarder.toml` in the project root
//! 4. `~/.config/repo-onboarder/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants;
use crate::env::Env;

/// Failures while reading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(
        "no API key configured; set {} (or {}) or provider.api_key in {}",
        constants::ENV_GEMINI_API_KEY,
        constants::ENV_API_KEY,
        constants::CONFIG_FILENAME
    )]
    MissingApiKey,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub analysis: AnalysisConfig,
    pub cache: CacheConfig,
    pub debug: DebugConfig,
    pub prompts: PromptsConfig,
}

/// Model provider configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: constants::DEFAULT_MODEL.to_string(),
            base_url: None,
            api_key: None,
        }
    }
}

impl ProviderConfig {
    /// Configured endpoint, or the public Gemini API.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(constants::DEFAULT_BASE_URL)
    }
}

/// What gets collected from the project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub commit_limit: usize,
    pub include_tests: bool,
    /// Fixed branch name; detected from git/CI when unset.
    pub branch: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            commit_limit: constants::DEFAULT_COMMIT_LIMIT,
            include_tests: false,
            branch: None,
        }
    }
}

/// Remote context cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: constants::DEFAULT_CACHE_TTL_SECS,
        }
    }
}

/// Debug artefact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from(constants::DEFAULT_DEBUG_DIR),
        }
    }
}

/// Prompt template overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory searched before the built-in templates.
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Build the effective configuration for `repo_root`.
    ///
    /// CLI flags are applied afterwards by the caller.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let global = Self::global_config_path();
        let local = repo_root.map(|root| root.join(constants::CONFIG_FILENAME));

        let mut config = Self::from_files(global.iter().chain(local.iter()))?;
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Overlay the existing files in order.
    ///
    /// Layering is per key: any key a later file sets wins, even when it
    /// restates the built-in default or switches a flag back off.
    fn from_files<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> Result<Self, ConfigError> {
        let mut merged = toml::Table::new();
        let mut last = None;

        for path in paths {
            if path.exists() {
                merge_tables(&mut merged, Self::load_file(path)?);
                last = Some(path);
            }
        }

        let Some(last) = last else {
            return Ok(Config::default());
        };
        toml::Value::Table(merged)
            .try_into()
            .map_err(|e| ConfigError::ParseFile {
                path: last.clone(),
                source: e,
            })
    }

    /// Fail fast when the configuration cannot reach the model.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.provider.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// Parse one TOML file, checking it against the schema on its own.
    fn load_file(path: &Path) -> Result<toml::Table, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let parse_error = |e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        };
        toml::from_str::<Config>(&content).map_err(parse_error)?;
        toml::from_str(&content).map_err(parse_error)
    }

    /// `~/.config/repo-onboarder/config.toml`, when a config dir exists.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Overlay `ONBOARDER_*` / `GEMINI_*` variables.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(model) = env.first_of(&[constants::ENV_MODEL, constants::ENV_GEMINI_MODEL]) {
            self.provider.model = model;
        }
        if let Some(url) = env.first_of(&[constants::ENV_BASE_URL]) {
            self.provider.base_url = Some(url);
        }
        if let Some(key) = env.first_of(&[constants::ENV_API_KEY, constants::ENV_GEMINI_API_KEY]) {
            self.provider.api_key = Some(key);
        }
        if let Some(enabled) = env.flag(constants::ENV_DEBUG) {
            self.debug.enabled = enabled;
        }
    }
}

/// Deep-merge `overlay` into `base`; nested tables merge, other values replace.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}
