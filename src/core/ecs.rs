use bevy_ecs::prelude::*;
use bevy_ecs::schedule::SystemSet;

use crate::core::engine::DispatchEngine;
use crate::simulation::assignment::Assignment;
use crate::simulation::time::{advance_time_system, DayClock, GameTime};
use crate::systems::{DispatchError, TaskOutcome};

/// Canonical tick ordering.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum TickSet {
    Intake,
    Simulation,
    Time,
}

/// Caller commands applied at the start of the next tick.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchIntent {
    Dispatch {
        agent_id: String,
        activity_type: String,
    },
    Cancel {
        agent_id: String,
    },
    Rest {
        agent_id: String,
        duration_seconds: f64,
    },
}

#[derive(Resource, Default, Debug)]
pub struct IntentQueue(pub Vec<DispatchIntent>);

/// Game seconds simulated by the current tick.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct TickDelta(pub f64);

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    Started(Assignment),
    Cancelled(Assignment),
    Rested { agent_id: String, fatigue: f64 },
    Rejected {
        intent: DispatchIntent,
        error: DispatchError,
    },
    Completed(TaskOutcome),
}

/// Everything that happened during the last tick.
#[derive(Resource, Default, Debug)]
pub struct DispatchEventLog(pub Vec<DispatchEvent>);

pub fn create_world(engine: DispatchEngine, clock: DayClock) -> World {
    let mut world = World::new();
    let time = GameTime::default();
    clock.set(u64::from(time.day));
    world.insert_resource(time);
    world.insert_resource(clock);
    world.insert_resource(engine);
    world.insert_resource(IntentQueue::default());
    world.insert_resource(TickDelta::default());
    world.insert_resource(DispatchEventLog::default());
    world
}

pub fn create_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.configure_sets((TickSet::Intake, TickSet::Simulation, TickSet::Time).chain());

    schedule.add_systems((
        intent_intake_system.in_set(TickSet::Intake),
        progress_system.in_set(TickSet::Simulation),
        advance_time_system.in_set(TickSet::Time),
    ));

    schedule
}

/// System: applies queued intents in submission order.
pub fn intent_intake_system(
    mut queue: ResMut<IntentQueue>,
    mut engine: ResMut<DispatchEngine>,
    mut log: ResMut<DispatchEventLog>,
) {
    log.0.clear();

    for intent in queue.0.drain(..) {
        let event = match &intent {
            DispatchIntent::Dispatch {
                agent_id,
                activity_type,
            } => match engine.dispatch(agent_id, activity_type) {
                Ok(assignment) => DispatchEvent::Started(assignment),
                Err(error) => DispatchEvent::Rejected {
                    intent: intent.clone(),
                    error,
                },
            },
            DispatchIntent::Cancel { agent_id } => match engine.cancel(agent_id) {
                Ok(assignment) => DispatchEvent::Cancelled(assignment),
                Err(error) => DispatchEvent::Rejected {
                    intent: intent.clone(),
                    error,
                },
            },
            DispatchIntent::Rest {
                agent_id,
                duration_seconds,
            } => DispatchEvent::Rested {
                agent_id: agent_id.clone(),
                fatigue: engine.rest(agent_id, *duration_seconds),
            },
        };
        log.0.push(event);
    }
}

/// System: advances every assignment by the tick delta.
pub fn progress_system(
    delta: Res<TickDelta>,
    mut engine: ResMut<DispatchEngine>,
    mut log: ResMut<DispatchEventLog>,
) {
    for outcome in engine.advance(delta.0) {
        log.0.push(DispatchEvent::Completed(outcome));
    }
}
