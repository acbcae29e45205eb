pub mod agents;
pub mod assignment;
pub mod rng;
pub mod state;
pub mod stats;
pub mod time;

pub use agents::{
    default_agent_state, AgentRegistry, AgentState, HistoryEntry, HistoryRing, SkillProgress,
    DEFAULT_HISTORY_CAPACITY,
};
pub use assignment::{Assignment, AssignmentStatus, AssignmentTable};
pub use stats::DispatchStatistics;
pub use time::{DayClock, GameTime};
pub use rng::{FixedRoll, RollSource, SimRng};
pub use state::DispatchState;
