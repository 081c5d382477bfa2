use crate::backends::ollama::{
    DEFAULT_LOCAL_TIMEOUT, DEFAULT_NUM_CTX, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL,
};
use crate::backends::openai_compatible::{
    DEFAULT_CHEAP_BASE_URL, DEFAULT_CHEAP_MODEL, DEFAULT_CHEAP_TEMPERATURE, DEFAULT_CHEAP_TIMEOUT,
};
use crate::backends::{OllamaConfig, OpenAICompatibleConfig, PROBE_TIMEOUT};
use crate::cascades::config::{DEFAULT_LEGACY_MAX_LOCAL_PROMPT_LENGTH, DEFAULT_MAX_LOCAL_PROMPT_LENGTH};
use crate::cascades::{RouterConfig, RoutingPolicy};
use crate::console::VerbosityLevel;
use crate::costs::{RateTable, TierRate};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use std::{env, fs};

pub mod error;

pub use error::{ConfigError, ConfigResult};

/// Environment fallback for `[cheap] api_key`.
pub const CHEAP_API_KEY_ENV: &str = "TRIAGE_CHEAP_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LocalTierConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub num_ctx: u32,
    pub timeout_secs: u64,
}

impl Default for LocalTierConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            temperature: None,
            num_ctx: DEFAULT_NUM_CTX,
            timeout_secs: DEFAULT_LOCAL_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CheapTierConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

impl Default for CheapTierConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CHEAP_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_CHEAP_MODEL.to_string(),
            temperature: DEFAULT_CHEAP_TEMPERATURE,
            max_tokens: None,
            timeout_secs: DEFAULT_CHEAP_TIMEOUT.as_secs(),
        }
    }
}

/// Overrides for the built-in per-million-token prices.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct RatesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cheap: Option<TierRate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<TierRate>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub verbosity: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub routing_policy: RoutingPolicy,
    #[serde(default = "default_max_local_prompt_length")]
    pub max_local_prompt_length: usize,
    #[serde(default = "default_legacy_max_local_prompt_length")]
    pub legacy_max_local_prompt_length: usize,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub local: LocalTierConfig,
    #[serde(default)]
    pub cheap: CheapTierConfig,
    #[serde(default)]
    pub rates: RatesConfig,
}

fn default_enabled() -> bool {
    true
}

fn default_max_local_prompt_length() -> usize {
    DEFAULT_MAX_LOCAL_PROMPT_LENGTH
}

fn default_legacy_max_local_prompt_length() -> usize {
    DEFAULT_LEGACY_MAX_LOCAL_PROMPT_LENGTH
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verbosity: None,
            enabled: default_enabled(),
            debug: false,
            routing_policy: RoutingPolicy::default(),
            max_local_prompt_length: default_max_local_prompt_length(),
            legacy_max_local_prompt_length: default_legacy_max_local_prompt_length(),
            system_prompt: None,
            local: LocalTierConfig::default(),
            cheap: CheapTierConfig::default(),
            rates: RatesConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the user config, writing the defaults on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
                .with_context(|| format!("Failed to load {}", config_path.display()))
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Sets one flat `key = value` pair, as used by `triage config set`.
    pub fn update_setting(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        match key {
            "verbosity" => {
                let verbosity = parse_verbosity(value).ok_or_else(|| invalid(key, value))?;
                self.set_verbosity(verbosity);
            }
            "enabled" => self.enabled = parse(key, value)?,
            "debug" => self.debug = parse(key, value)?,
            "routing_policy" => {
                self.routing_policy =
                    RoutingPolicy::from_str(value).map_err(|_| invalid(key, value))?
            }
            "max_local_prompt_length" => self.max_local_prompt_length = parse_positive(key, value)?,
            "legacy_max_local_prompt_length" => {
                self.legacy_max_local_prompt_length = parse_positive(key, value)?
            }
            "system_prompt" => self.system_prompt = non_empty(value),
            "local_base_url" => self.local.base_url = value.to_string(),
            "local_model" => self.local.model = value.to_string(),
            "local_temperature" => self.local.temperature = Some(parse(key, value)?),
            "local_num_ctx" => self.local.num_ctx = parse(key, value)?,
            "local_timeout_secs" => self.local.timeout_secs = parse_positive(key, value)?,
            "cheap_base_url" => self.cheap.base_url = value.to_string(),
            "cheap_api_key" => self.cheap.api_key = non_empty(value),
            "cheap_model" => self.cheap.model = value.to_string(),
            "cheap_temperature" => self.cheap.temperature = parse(key, value)?,
            "cheap_max_tokens" => self.cheap.max_tokens = Some(parse(key, value)?),
            "cheap_timeout_secs" => self.cheap.timeout_secs = parse_positive(key, value)?,
            _ => {
                return Err(ConfigError::UnknownConfigKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get the configured verbosity level, falling back to Normal if not set
    pub fn get_verbosity(&self) -> VerbosityLevel {
        self.verbosity
            .as_deref()
            .and_then(parse_verbosity)
            .unwrap_or(VerbosityLevel::Normal)
    }

    /// Console verbosity implied by the file. `debug = true` raises it to
    /// Debug so router traces show without `-vv`.
    pub fn console_verbosity(&self) -> VerbosityLevel {
        if self.debug {
            VerbosityLevel::Debug
        } else {
            self.get_verbosity()
        }
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = Some(verbosity.to_string());
    }

    /// The cheap-tier key, from the file or else the environment.
    pub fn cheap_api_key(&self) -> String {
        resolve_api_key(self.cheap.api_key.as_deref(), env::var(CHEAP_API_KEY_ENV).ok())
    }

    pub fn rate_table(&self) -> RateTable {
        let defaults = RateTable::default();
        RateTable {
            cheap: self.rates.cheap.unwrap_or(defaults.cheap),
            quality: self.rates.quality.unwrap_or(defaults.quality),
        }
    }

    /// Snapshot of this file as the immutable router configuration.
    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            enabled: self.enabled,
            debug: self.debug,
            routing_policy: self.routing_policy,
            max_local_prompt_length: self.max_local_prompt_length,
            legacy_max_local_prompt_length: self.legacy_max_local_prompt_length,
            system_prompt: self.system_prompt.clone(),
            local: OllamaConfig {
                name: "ollama".to_string(),
                model: self.local.model.clone(),
                base_url: self.local.base_url.clone(),
                temperature: self.local.temperature,
                num_ctx: self.local.num_ctx,
                timeout: Duration::from_secs(self.local.timeout_secs),
                probe_timeout: PROBE_TIMEOUT,
            },
            cheap: OpenAICompatibleConfig {
                name: "cheap".to_string(),
                api_key: self.cheap_api_key(),
                model: self.cheap.model.clone(),
                base_url: self.cheap.base_url.clone(),
                temperature: self.cheap.temperature,
                max_tokens: self.cheap.max_tokens,
                timeout: Duration::from_secs(self.cheap.timeout_secs),
                probe_timeout: PROBE_TIMEOUT,
            },
            rates: self.rate_table(),
        }
    }

    pub fn config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(".config").join("triage").join("config.toml"))
    }
}

fn parse_verbosity(value: &str) -> Option<VerbosityLevel> {
    match value {
        "quiet" => Some(VerbosityLevel::Quiet),
        "normal" => Some(VerbosityLevel::Normal),
        "verbose" => Some(VerbosityLevel::Verbose),
        "debug" => Some(VerbosityLevel::Debug),
        _ => None,
    }
}

fn resolve_api_key(configured: Option<&str>, from_env: Option<String>) -> String {
    configured
        .filter(|key| !key.trim().is_empty())
        .map(str::to_string)
        .or(from_env)
        .unwrap_or_default()
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: key.to_string(),
        value: value.to_string(),
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn parse_positive<T: FromStr + Default + PartialEq>(key: &str, value: &str) -> ConfigResult<T> {
    let parsed: T = parse(key, value)?;
    if parsed == T::default() {
        return Err(invalid(key, value));
    }
    Ok(parsed)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
