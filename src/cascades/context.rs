use serde::{Deserialize, Serialize};

use crate::cascades::{CascadeError, Tier, TierAttempt};

/// Per-request fallback state. Moves strictly upward through the tiers and
/// never revisits one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackContext {
    pub decided_tier: Tier,
    pub current_tier: Tier,
    pub attempts: Vec<TierAttempt>,
}

impl FallbackContext {
    pub fn new(decided_tier: Tier) -> Self {
        Self {
            decided_tier,
            current_tier: decided_tier,
            attempts: Vec::new(),
        }
    }

    pub fn was_attempted(&self, tier: Tier) -> bool {
        self.attempts.iter().any(|attempt| attempt.tier == tier)
    }

    /// The tier the controller should try next. `None` once the request has
    /// reached quality, which is always handed back to the caller.
    pub fn pending_tier(&self) -> Option<Tier> {
        if self.current_tier == Tier::Quality || self.was_attempted(self.current_tier) {
            return None;
        }
        Some(self.current_tier)
    }

    /// Record that the current tier failed and move one tier up.
    pub fn record_failure(&mut self, failure: impl Into<String>) -> Result<Tier, CascadeError> {
        if self.was_attempted(self.current_tier) {
            return Err(CascadeError::TierAlreadyAttempted(self.current_tier));
        }

        self.attempts.push(TierAttempt {
            tier: self.current_tier,
            failure: failure.into(),
        });
        self.escalate()
    }

    pub fn escalate(&mut self) -> Result<Tier, CascadeError> {
        let next_tier = self
            .current_tier
            .upgrade()
            .ok_or(CascadeError::AlreadyAtMaxTier)?;
        self.current_tier = next_tier;
        Ok(next_tier)
    }

    pub fn can_escalate(&self) -> bool {
        self.current_tier != Tier::Quality
    }

    pub fn fell_back(&self) -> bool {
        self.current_tier != self.decided_tier
    }

    pub fn escalation_summary(&self) -> String {
        format!(
            "Started at {}, now at {}, {} failed attempt(s)",
            self.decided_tier,
            self.current_tier,
            self.attempts.len()
        )
    }
}
