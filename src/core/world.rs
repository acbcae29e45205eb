use bevy_ecs::prelude::*;

use crate::core::collaborators::Collaborators;
use crate::core::ecs::{
    create_schedule, create_world, DispatchEvent, DispatchEventLog, DispatchIntent, IntentQueue,
    TickDelta,
};
use crate::core::engine::{DispatchEngine, EngineConfig};
use crate::simulation::time::{DayClock, GameTime};

/// Data snapshot returned to the caller after each tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub time_str: String,
    pub events: Vec<DispatchEvent>,
    pub active_assignments: usize,
}

/// Wrapper around the ECS world and schedule hosting one engine.
pub struct Session {
    world: World,
    schedule: Schedule,
}

impl Session {
    /// Build a session over the bundled catalogs.
    ///
    /// `clock` replaces any clock already set on `collaborators`: history is always stamped
    /// with the session's game day, which the session publishes through `clock` every tick.
    pub fn new(collaborators: Collaborators, config: EngineConfig, clock: DayClock) -> Self {
        let engine =
            DispatchEngine::with_builtin_data(collaborators.with_clock(clock.clone()), config);
        Self::from_engine(engine, clock)
    }

    /// Host an existing engine; `clock` should be the one the engine stamps history with.
    pub fn from_engine(engine: DispatchEngine, clock: DayClock) -> Self {
        Self {
            world: create_world(engine, clock),
            schedule: create_schedule(),
        }
    }

    /// Apply `intents`, advance everything by `delta_seconds` and report what happened.
    pub fn tick(&mut self, intents: Vec<DispatchIntent>, delta_seconds: f64) -> TickReport {
        self.world.resource_mut::<IntentQueue>().0 = intents;
        self.world.resource_mut::<TickDelta>().0 = delta_seconds;

        self.schedule.run(&mut self.world);

        TickReport {
            time_str: self.world.resource::<GameTime>().to_string(),
            events: self.world.resource::<DispatchEventLog>().0.clone(),
            active_assignments: self.engine().all_assignments().len(),
        }
    }

    pub fn engine(&self) -> &DispatchEngine {
        self.world.resource::<DispatchEngine>()
    }

    pub fn engine_mut(&mut self) -> Mut<'_, DispatchEngine> {
        self.world.resource_mut::<DispatchEngine>()
    }

    pub fn time(&self) -> &GameTime {
        self.world.resource::<GameTime>()
    }
}
