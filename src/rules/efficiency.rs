use serde::{Deserialize, Serialize};

use crate::simulation::agents::AgentState;

/// Forward progress guaranteed even for an exhausted, untrained agent.
pub const MIN_SPEED_MULTIPLIER: f64 = 0.3;
/// Success odds saturate below certainty.
pub const MAX_SUCCESS_PROBABILITY: f64 = 0.95;
pub const MAX_QUALITY_RATING: f64 = 5.0;

const BASE_SUCCESS_PROBABILITY: f64 = 0.5;
const SUCCESS_PER_SKILL_LEVEL: f64 = 0.08;
const EXPERIENCE_STEP: f64 = 100.0;
const BONUS_PER_EXPERIENCE_STEP: f64 = 0.1;
const MAX_FATIGUE_PENALTY: f64 = 0.3;

/// Speed/quality/success breakdown frozen into an assignment at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencySnapshot {
    pub speed_multiplier: f64,
    pub quality_rating: f64,
    pub success_probability: f64,
    pub base_skill: f64,
    pub experience_bonus: f64,
    pub fatigue_penalty: f64,
}

impl EfficiencySnapshot {
    pub fn from_terms(skill_level: u8, experience: f64, fatigue: f64) -> Self {
        let base_skill = f64::from(skill_level);
        let experience_bonus = experience_bonus(experience);
        let fatigue_penalty = fatigue.clamp(0.0, 1.0) * MAX_FATIGUE_PENALTY;

        let speed_multiplier = (base_skill * (1.0 + experience_bonus) * (1.0 - fatigue_penalty))
            .max(MIN_SPEED_MULTIPLIER);
        let quality_rating = (base_skill * (1.0 + experience_bonus * 0.5)).min(MAX_QUALITY_RATING);
        let success_probability = (BASE_SUCCESS_PROBABILITY
            + base_skill * SUCCESS_PER_SKILL_LEVEL
            + experience_bonus)
            .min(MAX_SUCCESS_PROBABILITY);

        Self {
            speed_multiplier,
            quality_rating,
            success_probability,
            base_skill,
            experience_bonus,
            fatigue_penalty,
        }
    }
}

/// 10% per full 100 experience, unbounded.
pub fn experience_bonus(experience: f64) -> f64 {
    (experience.max(0.0) / EXPERIENCE_STEP).floor() * BONUS_PER_EXPERIENCE_STEP
}

/// Efficiency of `agent` at `activity_type` given its current skill, experience and fatigue.
pub fn calculate(agent: &AgentState, activity_type: &str) -> EfficiencySnapshot {
    EfficiencySnapshot::from_terms(
        agent.skill_level(activity_type),
        agent.experience(activity_type),
        agent.fatigue,
    )
}
