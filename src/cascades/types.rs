use serde::{Deserialize, Serialize};

use crate::costs::CostEntry;

/// Execution tier, ordered from cheapest/least capable to most capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Local,
    Cheap,
    Quality,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Local, Tier::Cheap, Tier::Quality];

    /// The next more capable tier, if any.
    pub fn upgrade(self) -> Option<Tier> {
        match self {
            Tier::Local => Some(Tier::Cheap),
            Tier::Cheap => Some(Tier::Quality),
            Tier::Quality => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Local => write!(f, "local"),
            Tier::Cheap => write!(f, "cheap"),
            Tier::Quality => write!(f, "quality"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Tier::Local),
            "cheap" => Ok(Tier::Cheap),
            "quality" => Ok(Tier::Quality),
            _ => Err(format!("Unknown tier: {}", s)),
        }
    }
}

/// Tier vocabulary of the legacy two-tier classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LegacyTier {
    Local,
    Cloud,
}

impl std::fmt::Display for LegacyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LegacyTier::Local => write!(f, "local"),
            LegacyTier::Cloud => write!(f, "cloud"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Outcome of the three-tier classifier. Created once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub tier: Tier,
    pub reason: String,
    /// Character count of the original prompt.
    pub prompt_length: usize,
    pub confidence: Confidence,
}

impl Decision {
    pub fn new(tier: Tier, reason: impl Into<String>, prompt_length: usize, confidence: Confidence) -> Self {
        Self {
            tier,
            reason: reason.into(),
            prompt_length,
            confidence,
        }
    }
}

/// Outcome of the legacy two-tier classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDecision {
    pub tier: LegacyTier,
    pub reason: String,
    pub prompt_length: usize,
    pub confidence: Confidence,
}

/// One tier the fallback controller tried and why it did not answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierAttempt {
    pub tier: Tier,
    pub failure: String,
}

/// Result of the legacy two-tier `route`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub decision: TaskDecision,
    /// True when the local tier produced the response.
    pub handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl RouteResult {
    pub fn unhandled(decision: TaskDecision) -> Self {
        Self {
            decision,
            handled: false,
            response: None,
            duration_ms: None,
        }
    }
}

/// Result of `route_three_tier`.
///
/// `actual_tier` is `None` when the decision went straight to quality without
/// trying a cheaper tier; when present it differs from `decision.tier` exactly
/// when a fallback happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeTierRouteResult {
    pub decision: Decision,
    /// True when local or cheap produced the response; false means the caller
    /// must invoke the full-capability backend itself.
    pub handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<TierAttempt>,
}

impl ThreeTierRouteResult {
    /// Decision resolved to quality without attempting a cheaper tier.
    pub fn deferred(decision: Decision) -> Self {
        Self {
            decision,
            handled: false,
            response: None,
            duration_ms: None,
            actual_tier: None,
            model: None,
            cost: None,
            attempts: Vec::new(),
        }
    }

    /// Every cheaper tier was tried and failed.
    pub fn exhausted(decision: Decision, attempts: Vec<TierAttempt>) -> Self {
        Self {
            actual_tier: Some(Tier::Quality),
            attempts,
            ..Self::deferred(decision)
        }
    }

    pub fn fell_back(&self) -> bool {
        self.actual_tier
            .map(|actual| actual != self.decision.tier)
            .unwrap_or(false)
    }
}
