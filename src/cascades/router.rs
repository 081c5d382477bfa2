use anyhow::Result;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::backends::{GenerationRequest, GenerationResult, TierBackend, build_backends};
use crate::cascades::classifier::{PromptClassifier, RuleClassifier, classify_task};
use crate::cascades::{
    Decision, FallbackContext, LegacyTier, RouteResult, RouterConfig, TaskDecision,
    ThreeTierRouteResult, Tier,
};
use crate::console::console;
use crate::costs::CostLedger;

/// Failure label recorded when a tier's health check fails.
pub const UNAVAILABLE: &str = "unavailable";

/// Classifies prompts and dispatches them to the cheapest tier that answers.
///
/// The router owns no mutable state apart from the shared cost ledger. The
/// quality tier is never called: reaching it means the caller has to invoke
/// the full-capability backend itself.
pub struct TierRouter {
    config: RouterConfig,
    classifier: RuleClassifier,
    local: Arc<dyn TierBackend>,
    cheap: Arc<dyn TierBackend>,
    ledger: Arc<CostLedger>,
}

impl TierRouter {
    pub fn new(
        config: RouterConfig,
        local: Arc<dyn TierBackend>,
        cheap: Arc<dyn TierBackend>,
    ) -> Self {
        let ledger = Arc::new(CostLedger::new(config.rates));
        let classifier =
            RuleClassifier::new(config.max_local_prompt_length, config.routing_policy);
        Self {
            config,
            classifier,
            local,
            cheap,
            ledger,
        }
    }

    /// Validates `config` and builds the HTTP adapters it describes.
    pub fn from_config(config: RouterConfig) -> Result<Self> {
        config.validate()?;
        let (local, cheap) = build_backends(&config)?;
        Ok(Self::new(config, local, cheap))
    }

    /// Shares an existing ledger, e.g. one router per persona feeding a
    /// single cost report.
    pub fn with_ledger(mut self, ledger: Arc<CostLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<CostLedger> {
        &self.ledger
    }

    pub fn classify(&self, prompt: &str) -> Decision {
        self.classifier.classify(prompt)
    }

    pub fn classify_task(&self, prompt: &str) -> TaskDecision {
        classify_task(prompt, self.config.legacy_max_local_prompt_length)
    }

    fn backend_for(&self, tier: Tier) -> Option<&Arc<dyn TierBackend>> {
        match tier {
            Tier::Local => Some(&self.local),
            Tier::Cheap => Some(&self.cheap),
            Tier::Quality => None,
        }
    }

    fn trace(&self, message: impl FnOnce() -> String) {
        if self.config.debug {
            console().debug(&message());
        }
    }

    /// Three-tier routing: local, then cheap, then defer to quality.
    ///
    /// Never fails. Backend errors turn into fallback steps, and a panic inside
    /// a backend yields an unhandled result whose reason carries the message.
    pub async fn route_three_tier(&self, prompt: &str) -> ThreeTierRouteResult {
        let decision = self.classify(prompt);
        self.trace(|| {
            format!(
                "Classified as {} ({} confidence): {}",
                decision.tier, decision.confidence, decision.reason
            )
        });

        match AssertUnwindSafe(self.dispatch(prompt, decision.clone()))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                console().error(&format!("Routing failed: {}", message));
                let decision = Decision {
                    reason: format!("Routing failed: {}", message),
                    ..decision
                };
                ThreeTierRouteResult::exhausted(decision, Vec::new())
            }
        }
    }

    async fn dispatch(&self, prompt: &str, decision: Decision) -> ThreeTierRouteResult {
        if !self.config.enabled {
            self.trace(|| "Routing disabled, deferring to caller".to_string());
            return ThreeTierRouteResult::deferred(decision);
        }

        let mut context = FallbackContext::new(decision.tier);
        while let Some(tier) = context.pending_tier() {
            match self.attempt(tier, prompt).await {
                Ok(generation) => {
                    let cost = self.ledger.track(
                        tier,
                        &generation.model,
                        generation.prompt_tokens,
                        generation.completion_tokens,
                        generation.duration_ms,
                    );
                    self.trace(|| {
                        format!(
                            "{} answered with {} in {}ms (${:.6})",
                            tier,
                            generation.model,
                            generation.duration_ms,
                            cost.cost_usd()
                        )
                    });

                    return ThreeTierRouteResult {
                        decision,
                        handled: true,
                        response: Some(generation.response),
                        duration_ms: Some(generation.duration_ms),
                        actual_tier: Some(tier),
                        model: Some(generation.model),
                        cost: Some(cost),
                        attempts: context.attempts,
                    };
                }
                Err(failure) => {
                    self.trace(|| format!("{} failed: {}", tier, failure));
                    if context.record_failure(failure).is_err() {
                        break;
                    }
                }
            }
        }

        if context.attempts.is_empty() {
            self.trace(|| "Deferring to quality tier".to_string());
            ThreeTierRouteResult::deferred(decision)
        } else {
            self.trace(|| context.escalation_summary());
            ThreeTierRouteResult::exhausted(decision, context.attempts)
        }
    }

    /// Probe then generate on one tier. The error is the short failure label
    /// kept in the attempt history.
    async fn attempt(&self, tier: Tier, prompt: &str) -> Result<GenerationResult, String> {
        let backend = self
            .backend_for(tier)
            .ok_or_else(|| format!("{} tier is handled by the caller", tier))?;

        if !backend.is_available().await {
            return Err(UNAVAILABLE.to_string());
        }

        let request =
            GenerationRequest::new(prompt).with_system_prompt(self.config.system_prompt.as_deref());
        backend.generate(&request).await.map_err(|e| {
            self.trace(|| format!("{} generation error: {}", tier, e.user_message()));
            e.short_message()
        })
    }

    /// Legacy two-tier routing. Only the local tier is attempted; anything
    /// else comes back unhandled for the caller's cloud backend.
    pub async fn route(&self, prompt: &str) -> RouteResult {
        let decision = self.classify_task(prompt);
        self.trace(|| {
            format!(
                "Two-tier decision {} ({} confidence): {}",
                decision.tier, decision.confidence, decision.reason
            )
        });

        match AssertUnwindSafe(self.dispatch_legacy(prompt, decision.clone()))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                console().error(&format!("Routing failed: {}", message));
                RouteResult::unhandled(TaskDecision {
                    reason: format!("Routing failed: {}", message),
                    ..decision
                })
            }
        }
    }

    async fn dispatch_legacy(&self, prompt: &str, decision: TaskDecision) -> RouteResult {
        if !self.config.enabled || decision.tier != LegacyTier::Local {
            return RouteResult::unhandled(decision);
        }

        match self.attempt(Tier::Local, prompt).await {
            Ok(generation) => {
                self.ledger.track(
                    Tier::Local,
                    &generation.model,
                    generation.prompt_tokens,
                    generation.completion_tokens,
                    generation.duration_ms,
                );
                RouteResult {
                    decision,
                    handled: true,
                    response: Some(generation.response),
                    duration_ms: Some(generation.duration_ms),
                }
            }
            Err(failure) => {
                self.trace(|| format!("local failed: {}, deferring to cloud", failure));
                RouteResult::unhandled(decision)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
