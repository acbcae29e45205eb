use bevy_utils::tracing::info;
use serde::{Deserialize, Serialize};

use crate::data::preferences::Affinity;
use crate::data::Catalogs;
use crate::rules::modifiers::rest_recovery;
use crate::simulation::state::DispatchState;

/// Fatigue at or above this blocks the suitability check.
pub const EXHAUSTED_FATIGUE: f64 = 0.9;
pub const LOW_MOOD: f64 = 40.0;
pub const CRITICAL_MOOD: f64 = 20.0;

/// Recover fatigue; touches nothing else.
pub fn rest(
    state: &mut DispatchState,
    catalogs: &Catalogs,
    agent_id: &str,
    duration_seconds: f64,
) -> f64 {
    let agent = state.agents.get_or_create(agent_id, &catalogs.roster);
    let recovered = if duration_seconds.is_finite() {
        rest_recovery(duration_seconds)
    } else {
        0.0
    };
    let fatigue = agent.adjust_fatigue(-recovered);
    info!(agent = agent_id, duration_seconds, fatigue, "agent rested");
    fatigue
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suitability {
    pub suitable: bool,
    pub reasons: Vec<String>,
    pub warnings: Vec<String>,
}

/// Advisory check for callers; `dispatch` never consults it.
pub fn is_suitable(
    state: &DispatchState,
    catalogs: &Catalogs,
    agent_id: &str,
    activity_type: &str,
) -> Suitability {
    let agent = state.agents.peek_or_default(agent_id, &catalogs.roster);
    let mut result = Suitability {
        suitable: true,
        ..Suitability::default()
    };

    if agent.fatigue >= EXHAUSTED_FATIGUE {
        result.suitable = false;
        result.reasons.push("fatigue too high".to_string());
    }

    if agent.mood < CRITICAL_MOOD {
        result
            .warnings
            .push(format!("{} is miserable and may refuse to cooperate", agent.display_name));
    } else if agent.mood < LOW_MOOD {
        result
            .warnings
            .push(format!("{} is in a low mood", agent.display_name));
    }

    match catalogs.activities.get(activity_type) {
        Some(activity) => {
            if catalogs.preferences.affinity(agent_id, activity_type) == Affinity::Disliked {
                result.warnings.push(format!(
                    "{} dislikes {}",
                    agent.display_name, activity.display_name
                ));
            }
        }
        None => result
            .warnings
            .push(format!("unknown activity {}", activity_type)),
    }

    result
}
