// Re-export core modules for use by the binary or other consumers
pub mod core;
pub mod data;
pub mod rules;
pub mod simulation;
pub mod systems;
pub mod world;

// Expose the engine, the tick wrapper and the types needed for interaction
pub use crate::core::engine::{DispatchEngine, EngineConfig};
pub use crate::core::serialization::{SaveData, SaveError};
pub use crate::core::world::{Session, TickReport};
pub use crate::core::{DispatchEvent, DispatchIntent};
pub use crate::systems::{CharacterStatus, DispatchError, Suitability, TaskOutcome};
