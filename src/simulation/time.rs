use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::collaborators::Clock;
use crate::core::ecs::TickDelta;

pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Global resource tracking the simulation timeline in game seconds.
#[derive(Resource, Debug, Serialize, Deserialize, Clone)]
pub struct GameTime {
    pub elapsed_seconds: f64,
    pub day: u32,
    pub hour: u8,
}

impl Default for GameTime {
    fn default() -> Self {
        Self {
            elapsed_seconds: 0.0,
            day: 1,
            hour: 8,
        }
    }
}

impl std::fmt::Display for GameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Day {}, {:02}:00", self.day, self.hour)
    }
}

impl GameTime {
    pub fn advance(&mut self, delta_seconds: f64) {
        self.elapsed_seconds += delta_seconds.max(0.0);
        let start_offset = f64::from(Self::default().hour) * SECONDS_PER_HOUR;
        let absolute = self.elapsed_seconds + start_offset;
        self.day = 1 + (absolute / SECONDS_PER_DAY).floor() as u32;
        self.hour = ((absolute % SECONDS_PER_DAY) / SECONDS_PER_HOUR).floor() as u8;
    }
}

/// Shared day counter handed to the engine as its history stamp source.
#[derive(Resource, Debug, Clone, Default)]
pub struct DayClock(Arc<AtomicU64>);

impl DayClock {
    pub fn new(day: u64) -> Self {
        Self(Arc::new(AtomicU64::new(day)))
    }

    pub fn set(&self, day: u64) {
        self.0.store(day, Ordering::Relaxed);
    }
}

impl Clock for DayClock {
    fn timestamp(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// System: advances the clock by the tick delta and publishes the day.
pub fn advance_time_system(
    mut time: ResMut<GameTime>,
    delta: Res<TickDelta>,
    clock: Res<DayClock>,
) {
    time.advance(delta.0);
    clock.set(u64::from(time.day));
}
