use super::{GenerationRequest, GenerationResult, LlmError, TierBackend};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// What a [`MockBackend`] does when asked to generate.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Respond(String),
    Fail(LlmError),
    Panic(String),
}

/// Scriptable in-process backend for routing tests and offline runs.
pub struct MockBackend {
    name: String,
    model: String,
    available: AtomicBool,
    behavior: MockBehavior,
    prompt_tokens: u64,
    completion_tokens: u64,
    probes: AtomicUsize,
    generations: AtomicUsize,
    last_system_prompt: Mutex<Option<String>>,
}

impl MockBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            model: format!("{}-mock", name),
            available: AtomicBool::new(true),
            behavior: MockBehavior::Respond(format!("Mock response from {}", name)),
            prompt_tokens: 0,
            completion_tokens: 0,
            probes: AtomicUsize::new(0),
            generations: AtomicUsize::new(0),
            last_system_prompt: Mutex::new(None),
        }
    }

    pub fn responding(name: &str, response: &str) -> Self {
        Self::new(name).with_behavior(MockBehavior::Respond(response.to_string()))
    }

    pub fn failing(name: &str, error: LlmError) -> Self {
        Self::new(name).with_behavior(MockBehavior::Fail(error))
    }

    pub fn unavailable(name: &str) -> Self {
        let backend = Self::new(name);
        backend.set_available(false);
        backend
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_tokens(mut self, prompt_tokens: u64, completion_tokens: u64) -> Self {
        self.prompt_tokens = prompt_tokens;
        self.completion_tokens = completion_tokens;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn generate_count(&self) -> usize {
        self.generations.load(Ordering::SeqCst)
    }

    pub fn last_system_prompt(&self) -> Option<String> {
        self.last_system_prompt
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl TierBackend for MockBackend {
    async fn is_available(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.available.load(Ordering::SeqCst)
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<GenerationResult, LlmError> {
        self.generations.fetch_add(1, Ordering::SeqCst);
        *self
            .last_system_prompt
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) =
            request.system_prompt.map(str::to_string);

        match &self.behavior {
            MockBehavior::Respond(response) => Ok(GenerationResult {
                response: response.clone(),
                duration_ms: 0,
                model: request.model.unwrap_or(&self.model).to_string(),
                prompt_tokens: self.prompt_tokens,
                completion_tokens: self.completion_tokens,
            }),
            MockBehavior::Fail(error) => Err(error.clone()),
            MockBehavior::Panic(message) => panic!("{}", message),
        }
    }

    fn backend_name(&self) -> &str {
        &self.name
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
