use std::fmt;

use crate::cascades::Tier;

#[derive(Debug, Clone, PartialEq)]
pub enum CascadeError {
    InvalidConfig(String),
    /// The tier was already tried for this request.
    TierAlreadyAttempted(Tier),
    AlreadyAtMaxTier,
}

impl fmt::Display for CascadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CascadeError::InvalidConfig(msg) => write!(f, "Invalid router config: {}", msg),
            CascadeError::TierAlreadyAttempted(tier) => {
                write!(f, "Tier already attempted: {}", tier)
            }
            CascadeError::AlreadyAtMaxTier => write!(f, "Already at maximum tier"),
        }
    }
}

impl std::error::Error for CascadeError {}
