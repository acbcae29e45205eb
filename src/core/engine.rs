use std::path::Path;

use bevy_ecs::prelude::*;
use bevy_utils::tracing::{info, warn};

use crate::core::collaborators::Collaborators;
use crate::core::serialization::{
    apply_save_data, extract_save_data, load_data_from_path, save_data_to_path, SaveData,
    SaveError,
};
use crate::data::Catalogs;
use crate::simulation::agents::{AgentState, DEFAULT_HISTORY_CAPACITY};
use crate::simulation::assignment::Assignment;
use crate::simulation::rng::{RollSource, SimRng, DEFAULT_SEED};
use crate::simulation::state::DispatchState;
use crate::simulation::stats::DispatchStatistics;
use crate::systems::{self, CharacterStatus, DispatchError, Suitability, TaskOutcome};

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub history_capacity: usize,
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            seed: DEFAULT_SEED,
        }
    }
}

/// Task dispatch and progression engine.
///
/// All state changes happen synchronously inside `dispatch`, `advance`, `cancel`, `rest`
/// and `load_save_data`; time only moves when the caller passes a step to `advance`.
#[derive(Resource)]
pub struct DispatchEngine {
    catalogs: Catalogs,
    state: DispatchState,
    collaborators: Collaborators,
    rolls: Box<dyn RollSource>,
}

impl DispatchEngine {
    pub fn new(catalogs: Catalogs, collaborators: Collaborators, config: EngineConfig) -> Self {
        Self {
            catalogs,
            state: DispatchState::with_history_capacity(config.history_capacity),
            collaborators,
            rolls: Box::new(SimRng::from_seed_u64(config.seed)),
        }
    }

    /// Engine over the bundled data files. Falls back to empty catalogs if they fail to
    /// parse, in which case every dispatch reports an unknown activity.
    pub fn with_builtin_data(collaborators: Collaborators, config: EngineConfig) -> Self {
        let catalogs = match Catalogs::builtin() {
            Ok(catalogs) => catalogs,
            Err(err) => {
                warn!("Failed to load bundled catalogs: {}", err);
                Catalogs::default()
            }
        };
        Self::new(catalogs, collaborators, config)
    }

    pub fn with_roll_source(mut self, rolls: impl RollSource + 'static) -> Self {
        self.rolls = Box::new(rolls);
        self
    }

    pub fn set_roll_source(&mut self, rolls: impl RollSource + 'static) {
        self.rolls = Box::new(rolls);
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn dispatch(
        &mut self,
        agent_id: &str,
        activity_type: &str,
    ) -> Result<Assignment, DispatchError> {
        systems::dispatch(
            &mut self.state,
            &self.catalogs,
            &self.collaborators,
            agent_id,
            activity_type,
        )
    }

    pub fn advance(&mut self, delta_seconds: f64) -> Vec<TaskOutcome> {
        systems::advance(
            &mut self.state,
            &self.catalogs,
            &self.collaborators,
            self.rolls.as_mut(),
            delta_seconds,
        )
    }

    pub fn cancel(&mut self, agent_id: &str) -> Result<Assignment, DispatchError> {
        systems::cancel(&mut self.state, &self.catalogs, &self.collaborators, agent_id)
    }

    /// Returns the agent's fatigue after resting.
    pub fn rest(&mut self, agent_id: &str, duration_seconds: f64) -> f64 {
        systems::rest(&mut self.state, &self.catalogs, agent_id, duration_seconds)
    }

    pub fn current_task(&self, agent_id: &str) -> Option<&Assignment> {
        self.state.assignments.get(agent_id)
    }

    /// Live assignments ordered by agent id.
    pub fn all_assignments(&self) -> Vec<&Assignment> {
        self.state.assignments.sorted()
    }

    pub fn character_status(&self, agent_id: &str) -> CharacterStatus {
        systems::character_status(&self.state, &self.catalogs, agent_id)
    }

    pub fn is_suitable(&self, agent_id: &str, activity_type: &str) -> Suitability {
        systems::is_suitable(&self.state, &self.catalogs, agent_id, activity_type)
    }

    pub fn statistics(&self) -> &DispatchStatistics {
        &self.state.statistics
    }

    pub fn agent(&self, agent_id: &str) -> Option<&AgentState> {
        self.state.agents.get(agent_id)
    }

    /// Direct access for seeding scenarios and tooling.
    pub fn agent_mut(&mut self, agent_id: &str) -> &mut AgentState {
        self.state
            .agents
            .get_or_create(agent_id, &self.catalogs.roster)
    }

    pub fn save_data(&self) -> SaveData {
        extract_save_data(&self.state)
    }

    pub fn load_save_data(&mut self, data: SaveData) -> Result<(), SaveError> {
        apply_save_data(data, &mut self.state, &self.catalogs.roster)?;
        info!(
            agents = self.state.agents.len(),
            assignments = self.state.assignments.len(),
            "save data loaded"
        );
        Ok(())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveError> {
        save_data_to_path(&self.save_data(), path)
    }

    pub fn load_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SaveError> {
        let data = load_data_from_path(path)?;
        self.load_save_data(data)
    }
}
