pub const MIN_SKILL_LEVEL: u8 = 1;
pub const MAX_SKILL_LEVEL: u8 = 5;
/// Agents below this level learn faster.
pub const NOVICE_LEVEL_CEILING: u8 = 3;
pub const EXPERIENCE_PER_LEVEL: f64 = 100.0;

const SUCCESS_EXPERIENCE: f64 = 10.0;
const FAILURE_EXPERIENCE: f64 = 5.0;
const NOVICE_MULTIPLIER: f64 = 1.5;

pub fn experience_grant(success: bool, current_skill: u8) -> f64 {
    let base = if success {
        SUCCESS_EXPERIENCE
    } else {
        FAILURE_EXPERIENCE
    };
    if current_skill < NOVICE_LEVEL_CEILING {
        base * NOVICE_MULTIPLIER
    } else {
        base
    }
}

/// True when moving from `old_experience` to `new_experience` crosses a multiple of 100.
pub fn crosses_level_threshold(old_experience: f64, new_experience: f64) -> bool {
    (new_experience / EXPERIENCE_PER_LEVEL).floor() > (old_experience / EXPERIENCE_PER_LEVEL).floor()
}

/// At most one level per grant, capped at the maximum.
pub fn next_skill_level(current: u8, old_experience: f64, new_experience: f64) -> u8 {
    if crosses_level_threshold(old_experience, new_experience) {
        current.saturating_add(1).min(MAX_SKILL_LEVEL)
    } else {
        current
    }
}
