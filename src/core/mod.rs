pub mod collaborators;
pub mod ecs;
pub mod engine;
pub mod serialization;
pub mod world;

pub use collaborators::{
    Clock, Collaborators, FacilityInfo, FacilityProvider, FacilityRegistry, Ledger,
    LedgerTotals, Notification, NotificationKind, NotificationLog, Notifier, RewardSink,
};
pub use ecs::{DispatchEvent, DispatchIntent, TickSet};
pub use engine::{DispatchEngine, EngineConfig};
pub use serialization::{SaveData, SaveError, SAVE_VERSION};
pub use world::{Session, TickReport};
