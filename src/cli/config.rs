use crate::cli::ConfigAction;
use crate::{AppConfig, console};

const CONFIG_KEYS: &str = "verbosity, enabled, debug, routing_policy, max_local_prompt_length, \
legacy_max_local_prompt_length, system_prompt, local_base_url, local_model, local_temperature, \
local_num_ctx, local_timeout_secs, cheap_base_url, cheap_api_key, cheap_model, cheap_temperature, \
cheap_max_tokens, cheap_timeout_secs";

pub fn handle_config(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let mut config = AppConfig::load()?;
            if let Some(ref api_key) = config.cheap.api_key {
                config.cheap.api_key = Some(mask_key(api_key));
            }
            console().plain(&toml::to_string_pretty(&config)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = AppConfig::load()?;
            match config.update_setting(&key, &value) {
                Ok(()) => {
                    config.save()?;
                    console().success("Configuration updated successfully");
                }
                Err(e) => {
                    console().error(&e.to_string());
                    console().plain(&format!("Available keys: {}", CONFIG_KEYS));
                }
            }
        }
    }
    Ok(())
}

// Char-based so multi-byte keys cannot split mid-character
fn mask_key(api_key: &str) -> String {
    if api_key.chars().count() > 8 {
        let chars: Vec<char> = api_key.chars().collect();
        let prefix: String = chars.iter().take(4).collect();
        let suffix: String = chars.iter().rev().take(4).rev().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "***".to_string()
    }
}
