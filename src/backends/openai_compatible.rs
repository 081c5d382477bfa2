use super::{
    GenerationRequest, GenerationResult, LlmError, PROBE_TIMEOUT, TierBackend, build_http_client,
    elapsed_ms, is_available, with_timeout,
};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const DEFAULT_CHEAP_BASE_URL: &str = "https://api.minimax.io/v1";
pub const DEFAULT_CHEAP_MODEL: &str = "MiniMax-M2";
pub const DEFAULT_CHEAP_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_CHEAP_TIMEOUT: Duration = Duration::from_secs(60);

/// The cheap backend rejects an exact zero and anything above one.
pub const MIN_TEMPERATURE: f32 = 0.01;
pub const MAX_TEMPERATURE: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct OpenAICompatibleConfig {
    pub name: String,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for OpenAICompatibleConfig {
    fn default() -> Self {
        Self {
            name: "cheap".to_string(),
            api_key: String::new(),
            model: DEFAULT_CHEAP_MODEL.to_string(),
            base_url: DEFAULT_CHEAP_BASE_URL.to_string(),
            temperature: DEFAULT_CHEAP_TEMPERATURE,
            max_tokens: None,
            timeout: DEFAULT_CHEAP_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
        }
    }
}

pub fn clamp_temperature(temperature: f32) -> f32 {
    if temperature.is_nan() {
        return DEFAULT_CHEAP_TEMPERATURE;
    }
    temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
}

pub struct OpenAICompatibleBackend {
    client: reqwest::Client,
    config: OpenAICompatibleConfig,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl ChatCompletionResponse {
    fn into_result(
        self,
        backend: &str,
        fallback_model: &str,
        duration_ms: u64,
    ) -> Result<GenerationResult, LlmError> {
        let response = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| LlmError::InvalidResponse {
                message: format!("No response content from {}", backend),
            })?;
        let usage = self.usage.unwrap_or_default();

        Ok(GenerationResult {
            response,
            duration_ms,
            model: self.model.unwrap_or_else(|| fallback_model.to_string()),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        })
    }
}

impl OpenAICompatibleBackend {
    pub fn new(config: OpenAICompatibleConfig) -> Result<Self> {
        let client = build_http_client()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAICompatibleConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn create_request<'a>(&'a self, request: &GenerationRequest<'a>) -> ChatCompletionRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system_prompt) = request.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system_prompt,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt,
        });

        ChatCompletionRequest {
            model: request.model.unwrap_or(&self.config.model),
            messages,
            temperature: clamp_temperature(self.config.temperature),
            max_tokens: self.config.max_tokens,
        }
    }

    async fn generate_attempt(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GenerationResult, LlmError> {
        if self.config.api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: format!(
                    "{} API key not configured. Set it with: triage config set cheap_api_key <your_key>",
                    self.config.name
                ),
            });
        }

        let body = self.create_request(request);
        let url = format!("{}/chat/completions", self.base_url());
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, "cheap generate", self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Http {
                backend: self.config.name.clone(),
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response_data: ChatCompletionResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })?;

        response_data.into_result(&self.config.name, body.model, elapsed_ms(started))
    }
}

#[async_trait]
impl TierBackend for OpenAICompatibleBackend {
    async fn is_available(&self) -> bool {
        if self.config.api_key.is_empty() {
            return false;
        }
        let url = format!("{}/models", self.base_url());
        is_available(
            &self.client,
            &url,
            Some(&self.config.api_key),
            self.config.probe_timeout,
        )
        .await
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<GenerationResult, LlmError> {
        with_timeout(
            "cheap generate",
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

#[cfg(test)]
#[path = "openai_compatible_tests.rs"]
mod tests;
