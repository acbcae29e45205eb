use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::Catalogs;
use crate::rules::modifiers::MoodBand;
use crate::simulation::agents::HistoryEntry;
use crate::simulation::state::DispatchState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSummary {
    pub level: u8,
    pub experience: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub assignment_id: u64,
    pub activity_type: String,
    pub display_name: String,
    pub progress: f64,
    pub remaining_seconds: f64,
}

/// Read-only view of one agent for UI callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterStatus {
    pub agent_id: String,
    pub display_name: String,
    pub fatigue: f64,
    /// `fatigue` on the 0..100 scale some UI surfaces expect.
    pub fatigue_percent: f64,
    pub mood: f64,
    pub mood_band: MoodBand,
    pub skills: BTreeMap<String, SkillSummary>,
    pub current_task: Option<TaskProgress>,
    /// Newest first.
    pub recent_history: Vec<HistoryEntry>,
}

pub fn character_status(
    state: &DispatchState,
    catalogs: &Catalogs,
    agent_id: &str,
) -> CharacterStatus {
    let agent = state.agents.peek_or_default(agent_id, &catalogs.roster);

    let mut skills = BTreeMap::new();
    let trained = agent
        .skill_by_activity
        .keys()
        .chain(agent.experience_by_activity.keys());
    for activity_type in trained {
        skills
            .entry(activity_type.clone())
            .or_insert_with(|| SkillSummary {
                level: agent.skill_level(activity_type),
                experience: agent.experience(activity_type),
            });
    }

    let current_task = state.assignments.get(agent_id).map(|task| TaskProgress {
        assignment_id: task.id,
        activity_type: task.activity_type.clone(),
        display_name: catalogs
            .activities
            .get(&task.activity_type)
            .map(|a| a.display_name.clone())
            .unwrap_or_else(|| task.activity_type.clone()),
        progress: task.progress,
        remaining_seconds: task.remaining_seconds(),
    });

    CharacterStatus {
        agent_id: agent.id.clone(),
        display_name: agent.display_name.clone(),
        fatigue: agent.fatigue,
        fatigue_percent: agent.fatigue * 100.0,
        mood: agent.mood,
        mood_band: MoodBand::from_mood(agent.mood),
        skills,
        current_task,
        recent_history: agent.history.iter().rev().cloned().collect(),
    }
}
