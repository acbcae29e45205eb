pub mod efficiency;
pub mod modifiers;
pub mod progression;
pub mod reward;

pub use efficiency::{calculate, experience_bonus, EfficiencySnapshot};
pub use modifiers::{clamp_fatigue, clamp_mood, rest_recovery, MoodBand, PreferenceModifier};
pub use progression::{
    crosses_level_threshold, experience_grant, next_skill_level, MAX_SKILL_LEVEL,
    MIN_SKILL_LEVEL,
};
pub use reward::{reward_for, Reward};
