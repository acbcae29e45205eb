use serde::{Deserialize, Serialize};

/// Quality rating that pays exactly the base reward.
pub const BASELINE_QUALITY: f64 = 3.0;

const BASE_GOLD: f64 = 50.0;
const BASE_REPUTATION: f64 = 10.0;
const BASE_SATISFACTION: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    pub gold: i64,
    pub reputation_delta: i64,
    pub satisfaction_delta: i64,
}

impl Reward {
    pub fn failure_penalty() -> Self {
        Self {
            gold: 0,
            reputation_delta: -5,
            satisfaction_delta: -10,
        }
    }

    pub fn for_quality(quality_rating: f64) -> Self {
        let multiplier = quality_rating / BASELINE_QUALITY;
        Self {
            gold: (BASE_GOLD * multiplier).floor() as i64,
            reputation_delta: (BASE_REPUTATION * multiplier).floor() as i64,
            satisfaction_delta: (BASE_SATISFACTION * multiplier).floor() as i64,
        }
    }
}

pub fn reward_for(success: bool, quality_rating: f64) -> Reward {
    if success {
        Reward::for_quality(quality_rating)
    } else {
        Reward::failure_penalty()
    }
}
