pub mod classifier;
pub mod config;
pub mod context;
pub mod errors;
pub mod patterns;
pub mod router;
pub mod types;


pub use classifier::{
    PromptClassifier, RuleClassifier, classify, classify_task, classify_task_default,
    classify_with_policy, command_portion, has_inline_content,
};
pub use config::{RouterConfig, RoutingPolicy};
pub use context::FallbackContext;
pub use errors::CascadeError;
pub use patterns::TextMatcher;
pub use router::TierRouter;
pub use types::{
    Confidence, Decision, LegacyTier, RouteResult, TaskDecision, ThreeTierRouteResult, Tier,
    TierAttempt,
};
