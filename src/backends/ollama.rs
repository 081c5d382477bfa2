use super::{
    GenerationRequest, GenerationResult, LlmError, PROBE_TIMEOUT, TierBackend, build_http_client,
    elapsed_ms, is_available, with_timeout,
};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
pub const DEFAULT_NUM_CTX: u32 = 4096;
pub const DEFAULT_LOCAL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub name: String,
    pub model: String,
    pub base_url: String,
    pub temperature: Option<f32>,
    pub num_ctx: u32,
    pub timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            name: "ollama".to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            temperature: None,
            num_ctx: DEFAULT_NUM_CTX,
            timeout: DEFAULT_LOCAL_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
        }
    }
}

pub struct OllamaBackend {
    client: reqwest::Client,
    config: OllamaConfig,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    options: ModelOptions,
}

#[derive(Debug, Serialize)]
struct ModelOptions {
    num_ctx: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

impl GenerateResponse {
    fn into_result(self, fallback_model: &str, duration_ms: u64) -> GenerationResult {
        GenerationResult {
            response: self.response,
            duration_ms,
            model: self.model.unwrap_or_else(|| fallback_model.to_string()),
            prompt_tokens: self.prompt_eval_count.unwrap_or(0),
            completion_tokens: self.eval_count.unwrap_or(0),
        }
    }
}

impl OllamaBackend {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = build_http_client()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn create_request<'a>(&'a self, request: &GenerationRequest<'a>) -> GenerateRequest<'a> {
        GenerateRequest {
            model: request.model.unwrap_or(&self.config.model),
            prompt: request.prompt,
            stream: false,
            system: request.system_prompt,
            options: ModelOptions {
                num_ctx: self.config.num_ctx,
                temperature: self.config.temperature,
            },
        }
    }

    async fn generate_attempt(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GenerationResult, LlmError> {
        let body = self.create_request(request);
        let url = format!("{}/api/generate", self.base_url());
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, "Ollama generate", self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Http {
                backend: self.config.name.clone(),
                status: status.as_u16(),
                body: error_text,
            });
        }

        // Read response as text first to provide better error messages
        let response_text = response
            .text()
            .await
            .map_err(|e| LlmError::from_reqwest(e, "Ollama generate", self.config.timeout))?;

        let response_data: GenerateResponse =
            serde_json::from_str(&response_text).map_err(|e| LlmError::InvalidResponse {
                message: format!(
                    "Failed to parse Ollama response: {}\nRaw response: {}",
                    e, response_text
                ),
            })?;

        Ok(response_data.into_result(body.model, elapsed_ms(started)))
    }
}

#[async_trait]
impl TierBackend for OllamaBackend {
    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url());
        is_available(&self.client, &url, None, self.config.probe_timeout).await
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<GenerationResult, LlmError> {
        with_timeout(
            "Ollama generate",
            self.config.timeout,
            self.generate_attempt(request),
        )
        .await
    }

    fn backend_name(&self) -> &str {
        &self.config.name
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
