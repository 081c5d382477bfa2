use serde::{Deserialize, Serialize};

use crate::cascades::Tier;

/// USD price per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRate {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl TierRate {
    pub const FREE: TierRate = TierRate {
        input_per_million: 0.0,
        output_per_million: 0.0,
    };

    fn is_valid(&self) -> bool {
        self.input_per_million.is_finite()
            && self.output_per_million.is_finite()
            && self.input_per_million >= 0.0
            && self.output_per_million >= 0.0
    }
}

/// Static per-tier pricing. The local tier is always free and cannot be
/// overridden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub cheap: TierRate,
    pub quality: TierRate,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            cheap: TierRate {
                input_per_million: 0.3,
                output_per_million: 1.2,
            },
            quality: TierRate {
                input_per_million: 3.0,
                output_per_million: 15.0,
            },
        }
    }
}

impl RateTable {
    pub fn rate(&self, tier: Tier) -> TierRate {
        match tier {
            Tier::Local => TierRate::FREE,
            Tier::Cheap => self.cheap,
            Tier::Quality => self.quality,
        }
    }

    pub fn cost(&self, tier: Tier, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        let rate = self.rate(tier);
        prompt_tokens as f64 / 1e6 * rate.input_per_million
            + completion_tokens as f64 / 1e6 * rate.output_per_million
    }

    pub fn is_valid(&self) -> bool {
        self.cheap.is_valid() && self.quality.is_valid()
    }
}

/// Cost of a request under the default rate table.
pub fn calculate_cost(tier: Tier, prompt_tokens: u64, completion_tokens: u64) -> f64 {
    RateTable::default().cost(tier, prompt_tokens, completion_tokens)
}
