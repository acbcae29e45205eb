use bevy_utils::tracing::{debug, info};

use crate::core::collaborators::{Collaborators, FacilityProvider, NotificationKind};
use crate::data::activities::ActivityDefinition;
use crate::data::Catalogs;
use crate::rules::efficiency::calculate;
use crate::simulation::assignment::{Assignment, AssignmentStatus};
use crate::simulation::state::DispatchState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    UnknownActivity(String),
    AlreadyAssigned {
        agent_id: String,
        activity_type: String,
    },
    FacilityUnmet {
        facility_id: String,
        facility_name: String,
        required_level: u32,
        /// `None` when the facility is locked or unknown to the provider.
        current_level: Option<u32>,
    },
    NotAssigned(String),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::UnknownActivity(activity) => {
                write!(f, "unknown activity {}", activity)
            }
            DispatchError::AlreadyAssigned {
                agent_id,
                activity_type,
            } => write!(f, "{} is already busy with {}", agent_id, activity_type),
            DispatchError::FacilityUnmet {
                facility_name,
                required_level,
                current_level: Some(level),
                ..
            } => write!(
                f,
                "{} must be level {} (currently level {})",
                facility_name, required_level, level
            ),
            DispatchError::FacilityUnmet {
                facility_name,
                required_level,
                current_level: None,
                ..
            } => write!(
                f,
                "{} must be unlocked at level {}",
                facility_name, required_level
            ),
            DispatchError::NotAssigned(agent_id) => {
                write!(f, "{} has no active task", agent_id)
            }
        }
    }
}

impl std::error::Error for DispatchError {}

/// Validate and start `activity_type` for `agent_id`.
///
/// Checks run in a fixed order (activity, agent busy, facility) and nothing is mutated
/// unless every check passes. The efficiency snapshot is computed here and frozen into the
/// assignment.
pub fn dispatch(
    state: &mut DispatchState,
    catalogs: &Catalogs,
    collaborators: &Collaborators,
    agent_id: &str,
    activity_type: &str,
) -> Result<Assignment, DispatchError> {
    let Some(activity) = catalogs.activities.get(activity_type) else {
        return Err(DispatchError::UnknownActivity(activity_type.to_string()));
    };
    if let Some(current) = state.assignments.get(agent_id) {
        return Err(DispatchError::AlreadyAssigned {
            agent_id: agent_id.to_string(),
            activity_type: current.activity_type.clone(),
        });
    }
    check_facility(collaborators.facilities.as_ref(), activity)?;

    let agent = state.agents.get_or_create(agent_id, &catalogs.roster);
    let efficiency = calculate(agent, activity_type);
    let agent_name = agent.display_name.clone();
    debug!(
        agent = agent_id,
        activity = activity_type,
        speed = efficiency.speed_multiplier,
        quality = efficiency.quality_rating,
        success = efficiency.success_probability,
        "efficiency snapshot"
    );

    let assignment = Assignment {
        id: state.assignments.allocate_id(),
        activity_type: activity_type.to_string(),
        agent_id: agent_id.to_string(),
        efficiency,
        started_at: collaborators.clock.timestamp(),
        duration: activity.nominal_duration,
        progress: 0.0,
        status: AssignmentStatus::InProgress,
    };
    let stored = match state.assignments.insert(assignment) {
        Ok(stored) => stored.clone(),
        Err(rejected) => {
            return Err(DispatchError::AlreadyAssigned {
                agent_id: rejected.agent_id,
                activity_type: rejected.activity_type,
            })
        }
    };

    info!(
        agent = agent_id,
        activity = activity_type,
        assignment = stored.id,
        "task dispatched"
    );
    collaborators.notifier.notify(
        NotificationKind::Info,
        "Task started",
        &format!("{} started {}", agent_name, activity.display_name),
    );
    Ok(stored)
}

/// Remove the agent's task without any reward, experience, fatigue or mood change.
pub fn cancel(
    state: &mut DispatchState,
    catalogs: &Catalogs,
    collaborators: &Collaborators,
    agent_id: &str,
) -> Result<Assignment, DispatchError> {
    let Some(assignment) = state.assignments.remove(agent_id) else {
        return Err(DispatchError::NotAssigned(agent_id.to_string()));
    };
    state.statistics.record_cancellation();

    let activity_name = catalogs
        .activities
        .get(&assignment.activity_type)
        .map(|a| a.display_name.as_str())
        .unwrap_or(assignment.activity_type.as_str());
    info!(
        agent = agent_id,
        activity = assignment.activity_type.as_str(),
        progress = assignment.progress,
        "task cancelled"
    );
    collaborators.notifier.notify(
        NotificationKind::Info,
        "Task cancelled",
        &format!("{} stopped {}", catalogs.roster.name(agent_id), activity_name),
    );
    Ok(assignment)
}

pub fn check_facility(
    provider: &dyn FacilityProvider,
    activity: &ActivityDefinition,
) -> Result<(), DispatchError> {
    let Some((facility_id, required_level)) = activity.facility_requirement() else {
        return Ok(());
    };
    match provider.facility_info(facility_id) {
        Some(info) if info.unlocked && info.level >= required_level => Ok(()),
        Some(info) => Err(DispatchError::FacilityUnmet {
            facility_id: facility_id.to_string(),
            facility_name: info.name,
            required_level,
            current_level: info.unlocked.then_some(info.level),
        }),
        None => Err(DispatchError::FacilityUnmet {
            facility_id: facility_id.to_string(),
            facility_name: facility_id.to_string(),
            required_level,
            current_level: None,
        }),
    }
}
