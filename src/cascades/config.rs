use serde::{Deserialize, Serialize};

use crate::backends::{OllamaConfig, OpenAICompatibleConfig};
use crate::cascades::CascadeError;
use crate::costs::RateTable;

pub const DEFAULT_MAX_LOCAL_PROMPT_LENGTH: usize = 2000;
pub const DEFAULT_LEGACY_MAX_LOCAL_PROMPT_LENGTH: usize = 500;

/// What the classifier does when no tool signal or transform matched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoutingPolicy {
    /// Ambiguity goes to the quality tier.
    #[default]
    Conservative,
    /// Ambiguity is settled by prompt length.
    Aggressive,
}

impl std::fmt::Display for RoutingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingPolicy::Conservative => write!(f, "conservative"),
            RoutingPolicy::Aggressive => write!(f, "aggressive"),
        }
    }
}

impl std::str::FromStr for RoutingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(RoutingPolicy::Conservative),
            "aggressive" => Ok(RoutingPolicy::Aggressive),
            _ => Err(format!("Unknown routing policy: {}", s)),
        }
    }
}

/// Immutable router configuration. Built once and handed to `TierRouter`.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub enabled: bool,
    pub debug: bool,
    pub routing_policy: RoutingPolicy,
    /// Three-tier limit for the local tier, in characters.
    pub max_local_prompt_length: usize,
    /// Two-tier (`route`) limit for the local tier, in characters.
    pub legacy_max_local_prompt_length: usize,
    /// Injected into every backend call for persona consistency.
    pub system_prompt: Option<String>,
    pub local: OllamaConfig,
    pub cheap: OpenAICompatibleConfig,
    pub rates: RateTable,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debug: false,
            routing_policy: RoutingPolicy::Conservative,
            max_local_prompt_length: DEFAULT_MAX_LOCAL_PROMPT_LENGTH,
            legacy_max_local_prompt_length: DEFAULT_LEGACY_MAX_LOCAL_PROMPT_LENGTH,
            system_prompt: None,
            local: OllamaConfig::default(),
            cheap: OpenAICompatibleConfig::default(),
            rates: RateTable::default(),
        }
    }
}

impl RouterConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CascadeError> {
        if self.max_local_prompt_length == 0 || self.legacy_max_local_prompt_length == 0 {
            return Err(CascadeError::InvalidConfig(
                "Max local prompt length must be greater than zero".to_string(),
            ));
        }

        if self.local.base_url.trim().is_empty() {
            return Err(CascadeError::InvalidConfig(
                "Local backend base_url is empty".to_string(),
            ));
        }

        if self.cheap.base_url.trim().is_empty() {
            return Err(CascadeError::InvalidConfig(
                "Cheap backend base_url is empty".to_string(),
            ));
        }

        if !self.rates.is_valid() {
            return Err(CascadeError::InvalidConfig(
                "Rates must be finite and non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::TierRate;

    #[test]
    fn test_default_config_is_valid() {
        let config = RouterConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_local_prompt_length, 2000);
        assert_eq!(config.legacy_max_local_prompt_length, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_disabled_config_is_valid() {
        let config = RouterConfig::disabled();
        assert!(!config.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_prompt_length_fails() {
        let config = RouterConfig {
            max_local_prompt_length: 0,
            ..RouterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_backend_url_fails() {
        let mut config = RouterConfig::default();
        config.cheap.base_url = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Cheap backend"));
    }

    #[test]
    fn test_negative_rate_fails() {
        let mut config = RouterConfig::default();
        config.rates.cheap = TierRate {
            input_per_million: -1.0,
            output_per_million: 1.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policy_parses_case_insensitively() {
        assert_eq!("Aggressive".parse::<RoutingPolicy>(), Ok(RoutingPolicy::Aggressive));
        assert!("yolo".parse::<RoutingPolicy>().is_err());
    }
}
