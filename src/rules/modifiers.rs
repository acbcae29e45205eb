use serde::{Deserialize, Serialize};

use crate::data::preferences::Affinity;

pub const MAX_FATIGUE: f64 = 1.0;
pub const MAX_MOOD: f64 = 100.0;

const SECONDS_PER_FATIGUE_HOUR: f64 = 3600.0;
/// Thirty minutes of rest recovers a full unit of fatigue.
const REST_SECONDS_PER_FATIGUE_UNIT: f64 = 1800.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreferenceModifier {
    pub mood_change: f64,
    pub fatigue_rate: f64,
}

impl PreferenceModifier {
    pub fn for_affinity(affinity: Affinity) -> Self {
        match affinity {
            Affinity::Favorite => Self {
                mood_change: -2.0,
                fatigue_rate: 0.7,
            },
            Affinity::Neutral => Self {
                mood_change: -5.0,
                fatigue_rate: 1.0,
            },
            Affinity::Disliked => Self {
                mood_change: -10.0,
                fatigue_rate: 1.5,
            },
        }
    }

    pub fn fatigue_gain(&self, duration_seconds: f64) -> f64 {
        duration_seconds / SECONDS_PER_FATIGUE_HOUR * self.fatigue_rate
    }
}

pub fn rest_recovery(duration_seconds: f64) -> f64 {
    duration_seconds.max(0.0) / REST_SECONDS_PER_FATIGUE_UNIT
}

pub fn clamp_fatigue(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_FATIGUE)
}

pub fn clamp_mood(value: f64) -> f64 {
    if value.is_nan() {
        return MAX_MOOD;
    }
    value.clamp(0.0, MAX_MOOD)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodBand {
    Cheerful,
    Content,
    Low,
    Miserable,
}

impl MoodBand {
    pub fn from_mood(mood: f64) -> Self {
        if mood >= 70.0 {
            MoodBand::Cheerful
        } else if mood >= 40.0 {
            MoodBand::Content
        } else if mood >= 20.0 {
            MoodBand::Low
        } else {
            MoodBand::Miserable
        }
    }
}

impl std::fmt::Display for MoodBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MoodBand::Cheerful => "cheerful",
            MoodBand::Content => "content",
            MoodBand::Low => "low",
            MoodBand::Miserable => "miserable",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disliked_work_tires_faster() {
        let disliked = PreferenceModifier::for_affinity(Affinity::Disliked);
        let favorite = PreferenceModifier::for_affinity(Affinity::Favorite);
        assert_eq!(disliked.fatigue_gain(3600.0), 1.5);
        assert!((favorite.fatigue_gain(1800.0) - 0.35).abs() < 1e-12);
        assert!(disliked.mood_change < favorite.mood_change);
    }

    #[test]
    fn half_hour_rest_recovers_one_unit() {
        assert_eq!(rest_recovery(1800.0), 1.0);
        assert_eq!(rest_recovery(-60.0), 0.0);
    }

    #[test]
    fn clamps_stay_in_range() {
        assert_eq!(clamp_fatigue(1.7), 1.0);
        assert_eq!(clamp_fatigue(-0.2), 0.0);
        assert_eq!(clamp_mood(130.0), 100.0);
        assert_eq!(clamp_mood(-4.0), 0.0);
    }

    #[test]
    fn mood_bands() {
        assert_eq!(MoodBand::from_mood(100.0), MoodBand::Cheerful);
        assert_eq!(MoodBand::from_mood(39.9), MoodBand::Low);
        assert_eq!(MoodBand::from_mood(5.0), MoodBand::Miserable);
    }
}
