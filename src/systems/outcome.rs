use bevy_utils::tracing::info;
use serde::{Deserialize, Serialize};

use crate::core::collaborators::{Collaborators, NotificationKind};
use crate::data::Catalogs;
use crate::rules::modifiers::PreferenceModifier;
use crate::rules::progression::experience_grant;
use crate::rules::reward::{reward_for, Reward};
use crate::simulation::agents::HistoryEntry;
use crate::simulation::assignment::Assignment;
use crate::simulation::rng::RollSource;
use crate::simulation::state::DispatchState;

/// What happened when an assignment finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub assignment_id: u64,
    pub agent_id: String,
    pub activity_type: String,
    pub success: bool,
    pub roll: f64,
    pub reward: Reward,
    pub experience_gained: f64,
    pub skill_before: u8,
    pub skill_after: u8,
    pub fatigue: f64,
    pub mood: f64,
    pub completed_at: u64,
}

impl TaskOutcome {
    pub fn leveled_up(&self) -> bool {
        self.skill_after > self.skill_before
    }
}

/// Roll, pay out and update the agent for an assignment that has already left the live
/// table.
pub fn resolve_completion(
    state: &mut DispatchState,
    catalogs: &Catalogs,
    collaborators: &Collaborators,
    rolls: &mut dyn RollSource,
    assignment: Assignment,
) -> TaskOutcome {
    let roll = rolls.roll();
    let success = roll < assignment.efficiency.success_probability;

    let reward = reward_for(success, assignment.efficiency.quality_rating);
    collaborators.rewards.apply_reward(&reward);

    let completed_at = collaborators.clock.timestamp();
    let affinity = catalogs
        .preferences
        .affinity(&assignment.agent_id, &assignment.activity_type);
    let modifier = PreferenceModifier::for_affinity(affinity);

    let agent = state
        .agents
        .get_or_create(&assignment.agent_id, &catalogs.roster);
    let experience = experience_grant(success, agent.skill_level(&assignment.activity_type));
    let skill = agent.grant_experience(&assignment.activity_type, experience);
    let fatigue = agent.adjust_fatigue(modifier.fatigue_gain(assignment.duration));
    let mood = agent.adjust_mood(modifier.mood_change);
    agent.history.push(HistoryEntry {
        activity_type: assignment.activity_type.clone(),
        completed_at,
        success,
    });
    let agent_name = agent.display_name.clone();

    state.statistics.record_completion(success, experience);

    info!(
        agent = assignment.agent_id.as_str(),
        activity = assignment.activity_type.as_str(),
        success,
        roll,
        experience,
        fatigue,
        mood,
        "task resolved"
    );

    let activity_name = catalogs
        .activities
        .get(&assignment.activity_type)
        .map(|a| a.display_name.as_str())
        .unwrap_or(assignment.activity_type.as_str());
    if success {
        collaborators.notifier.notify(
            NotificationKind::Success,
            "Task complete",
            &format!(
                "{} finished {} (+{} gold, +{} reputation)",
                agent_name, activity_name, reward.gold, reward.reputation_delta
            ),
        );
    } else {
        collaborators.notifier.notify(
            NotificationKind::Warning,
            "Task failed",
            &format!(
                "{} botched {} ({} reputation)",
                agent_name, activity_name, reward.reputation_delta
            ),
        );
    }
    if skill.leveled_up() {
        collaborators.notifier.notify(
            NotificationKind::Success,
            "Skill up",
            &format!(
                "{} reached {} level {}",
                agent_name, activity_name, skill.new_level
            ),
        );
    }

    TaskOutcome {
        assignment_id: assignment.id,
        agent_id: assignment.agent_id,
        activity_type: assignment.activity_type,
        success,
        roll,
        reward,
        experience_gained: experience,
        skill_before: skill.old_level,
        skill_after: skill.new_level,
        fatigue,
        mood,
        completed_at,
    }
}
