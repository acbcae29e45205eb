use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::rules::efficiency::EfficiencySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    InProgress,
    Completed,
}

/// One agent's active task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub activity_type: String,
    pub agent_id: String,
    pub efficiency: EfficiencySnapshot,
    pub started_at: u64,
    /// Nominal game-time seconds; actual time is scaled by the speed multiplier.
    pub duration: f64,
    pub progress: f64,
    pub status: AssignmentStatus,
}

impl Assignment {
    /// Apply `delta_seconds` of work. Returns true on the call that completes the task.
    pub fn advance(&mut self, delta_seconds: f64) -> bool {
        if self.status == AssignmentStatus::Completed {
            return false;
        }
        let step = if self.duration > 0.0 {
            delta_seconds.max(0.0) / self.duration * self.efficiency.speed_multiplier
        } else {
            1.0
        };
        self.progress += step;
        if self.progress >= 1.0 {
            self.progress = 1.0;
            self.status = AssignmentStatus::Completed;
            return true;
        }
        false
    }

    /// Game seconds left at the frozen speed.
    pub fn remaining_seconds(&self) -> f64 {
        let speed = self.efficiency.speed_multiplier;
        if speed <= 0.0 {
            return f64::INFINITY;
        }
        (1.0 - self.progress).max(0.0) * self.duration / speed
    }
}

/// Live assignments keyed by agent id. The key space enforces one task per agent.
#[derive(Debug, Clone, Default)]
pub struct AssignmentTable {
    by_agent: HashMap<String, Assignment>,
    next_id: u64,
}

impl AssignmentTable {
    pub fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.by_agent.contains_key(agent_id)
    }

    pub fn get(&self, agent_id: &str) -> Option<&Assignment> {
        self.by_agent.get(agent_id)
    }

    /// Rejects (and hands back) an assignment whose agent is already keyed.
    pub fn insert(&mut self, assignment: Assignment) -> Result<&Assignment, Assignment> {
        match self.by_agent.entry(assignment.agent_id.clone()) {
            Entry::Occupied(_) => Err(assignment),
            Entry::Vacant(slot) => Ok(slot.insert(assignment)),
        }
    }

    pub fn remove(&mut self, agent_id: &str) -> Option<Assignment> {
        self.by_agent.remove(agent_id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Assignment> {
        self.by_agent.values_mut()
    }

    pub fn len(&self) -> usize {
        self.by_agent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_agent.is_empty()
    }

    /// Snapshot ordered by agent id.
    pub fn sorted(&self) -> Vec<&Assignment> {
        let mut assignments: Vec<&Assignment> = self.by_agent.values().collect();
        assignments.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
        assignments
    }

    pub fn sync_next_id(&mut self) {
        let max_id = self.by_agent.values().map(|a| a.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id);
    }
}
