use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

pub mod backend_factory;
pub mod llm_error;
pub mod mock;
pub mod ollama;
pub mod openai_compatible;
pub mod probe;

pub use backend_factory::{build_backends, build_cheap_backend, build_local_backend};
pub use llm_error::LlmError;
pub use mock::{MockBackend, MockBehavior};
pub use ollama::{OllamaBackend, OllamaConfig};
pub use openai_compatible::{OpenAICompatibleBackend, OpenAICompatibleConfig, clamp_temperature};
pub use probe::{PROBE_TIMEOUT, is_available};

/// A single generation call, borrowed from the router for the duration of the
/// request.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub system_prompt: Option<&'a str>,
    /// Overrides the backend's configured model.
    pub model: Option<&'a str>,
}

impl<'a> GenerationRequest<'a> {
    pub fn new(prompt: &'a str) -> Self {
        Self {
            prompt,
            system_prompt: None,
            model: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: Option<&'a str>) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    pub fn with_model(mut self, model: &'a str) -> Self {
        self.model = Some(model);
        self
    }
}

/// Backend-independent shape every adapter normalizes its response into.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub response: String,
    pub duration_ms: u64,
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

#[async_trait]
pub trait TierBackend: Send + Sync {
    /// Lightweight health check. Never errors: any failure is `false`.
    async fn is_available(&self) -> bool;

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<GenerationResult, LlmError>;

    fn backend_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

pub(crate) fn build_http_client() -> Result<reqwest::Client> {
    let mut client_builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(10));

    // Configure HTTP proxy if environment variables are set
    if let Ok(http_proxy) = std::env::var("HTTP_PROXY")
        && let Ok(proxy) = reqwest::Proxy::http(&http_proxy)
    {
        client_builder = client_builder.proxy(proxy.no_proxy(reqwest::NoProxy::from_env()));
    }

    // Configure HTTPS proxy if environment variables are set
    if let Ok(https_proxy) = std::env::var("HTTPS_PROXY")
        && let Ok(proxy) = reqwest::Proxy::https(&https_proxy)
    {
        client_builder = client_builder.proxy(proxy.no_proxy(reqwest::NoProxy::from_env()));
    }

    client_builder
        .build()
        .context("Failed to build HTTP client")
}

/// Runs `operation` under a deadline. The in-flight request is dropped (and
/// so aborted) when the deadline passes.
pub(crate) async fn with_timeout<T, F>(
    operation: &str,
    timeout: Duration,
    future: F,
) -> Result<T, LlmError>
where
    F: Future<Output = Result<T, LlmError>>,
{
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| LlmError::timeout(operation, timeout))?
}

pub(crate) fn elapsed_ms(started: std::time::Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
