use bevy_utils::tracing::debug;

use crate::core::collaborators::Collaborators;
use crate::data::Catalogs;
use crate::simulation::assignment::{Assignment, AssignmentTable};
use crate::simulation::rng::RollSource;
use crate::simulation::state::DispatchState;
use crate::systems::outcome::{resolve_completion, TaskOutcome};

/// Move every active assignment forward and pull out the ones that finished, ordered by
/// agent id. Each assignment completes at most once no matter how large the step is.
pub fn collect_completed(assignments: &mut AssignmentTable, delta_seconds: f64) -> Vec<Assignment> {
    let delta_seconds = if delta_seconds.is_finite() {
        delta_seconds.max(0.0)
    } else {
        0.0
    };

    let mut finished: Vec<String> = Vec::new();
    for assignment in assignments.iter_mut() {
        if assignment.advance(delta_seconds) {
            finished.push(assignment.agent_id.clone());
        } else {
            debug!(
                agent = assignment.agent_id.as_str(),
                progress = assignment.progress,
                "task progressed"
            );
        }
    }
    finished.sort();

    finished
        .iter()
        .filter_map(|agent_id| assignments.remove(agent_id))
        .collect()
}

/// Advance all work by `delta_seconds` and resolve everything that completes, within the
/// same call.
pub fn advance(
    state: &mut DispatchState,
    catalogs: &Catalogs,
    collaborators: &Collaborators,
    rolls: &mut dyn RollSource,
    delta_seconds: f64,
) -> Vec<TaskOutcome> {
    let completed = collect_completed(&mut state.assignments, delta_seconds);
    let mut outcomes = Vec::with_capacity(completed.len());
    for assignment in completed {
        outcomes.push(resolve_completion(
            state,
            catalogs,
            collaborators,
            &mut *rolls,
            assignment,
        ));
    }
    outcomes
}
