use crate::simulation::agents::AgentRegistry;
use crate::simulation::assignment::AssignmentTable;
use crate::simulation::stats::DispatchStatistics;

/// All mutable engine state; everything else the engine holds is read-only configuration
/// or an external collaborator.
#[derive(Debug, Clone, Default)]
pub struct DispatchState {
    pub agents: AgentRegistry,
    pub assignments: AssignmentTable,
    pub statistics: DispatchStatistics,
}

impl DispatchState {
    pub fn with_history_capacity(history_capacity: usize) -> Self {
        Self {
            agents: AgentRegistry::with_history_capacity(history_capacity),
            ..Self::default()
        }
    }
}
