use crate::backends::{OllamaBackend, OpenAICompatibleBackend, TierBackend};
use crate::cascades::RouterConfig;
use anyhow::{Context, Result};
use std::sync::Arc;

pub fn build_local_backend(config: &RouterConfig) -> Result<Arc<dyn TierBackend>> {
    let backend = OllamaBackend::new(config.local.clone())
        .with_context(|| format!("Failed to create local backend '{}'", config.local.name))?;
    Ok(Arc::new(backend))
}

pub fn build_cheap_backend(config: &RouterConfig) -> Result<Arc<dyn TierBackend>> {
    let backend = OpenAICompatibleBackend::new(config.cheap.clone())
        .with_context(|| format!("Failed to create cheap backend '{}'", config.cheap.name))?;
    Ok(Arc::new(backend))
}

/// Builds the (local, cheap) pair the router dispatches to. Quality is never
/// built here: the host handles that tier.
pub fn build_backends(
    config: &RouterConfig,
) -> Result<(Arc<dyn TierBackend>, Arc<dyn TierBackend>)> {
    Ok((build_local_backend(config)?, build_cheap_backend(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_backends_uses_configured_models() {
        let mut config = RouterConfig::default();
        config.local.model = "qwen2.5:3b".to_string();
        config.cheap.model = "cheap-model".to_string();

        let (local, cheap) = build_backends(&config).unwrap();

        assert_eq!(local.backend_name(), "ollama");
        assert_eq!(local.model_name(), "qwen2.5:3b");
        assert_eq!(cheap.backend_name(), "cheap");
        assert_eq!(cheap.model_name(), "cheap-model");
    }
}
