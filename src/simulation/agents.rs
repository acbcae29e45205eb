use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::roster::Roster;
use crate::rules::modifiers::{clamp_fatigue, clamp_mood, MAX_MOOD};
use crate::rules::progression::{next_skill_level, MIN_SKILL_LEVEL};

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub activity_type: String,
    pub completed_at: u64,
    #[serde(default)]
    pub success: bool,
}

/// Fixed-capacity record of recent completions. Once full, each push overwrites the oldest
/// slot in place.
#[derive(Debug, Clone)]
pub struct HistoryRing {
    slots: Vec<HistoryEntry>,
    head: usize,
    capacity: usize,
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Rings compare by their oldest-first contents, not slot layout.
impl PartialEq for HistoryRing {
    fn eq(&self, other: &Self) -> bool {
        self.capacity == other.capacity && self.iter().eq(other.iter())
    }
}

impl HistoryRing {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.slots.len() < self.capacity {
            self.slots.push(entry);
        } else {
            self.slots[self.head] = entry;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> + '_ {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.iter().next_back()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.iter().cloned().collect()
    }

    /// Rebuild from an oldest-first list, keeping only the most recent `capacity` entries.
    pub fn from_entries(entries: Vec<HistoryEntry>, capacity: usize) -> Self {
        let mut ring = Self::with_capacity(capacity);
        for entry in entries {
            ring.push(entry);
        }
        ring
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillProgress {
    pub old_level: u8,
    pub new_level: u8,
}

impl SkillProgress {
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.old_level
    }
}

/// Persistent per-agent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub skill_by_activity: HashMap<String, u8>,
    #[serde(default)]
    pub experience_by_activity: HashMap<String, f64>,
    pub fatigue: f64,
    pub mood: f64,
    #[serde(skip)]
    pub history: HistoryRing,
}

impl AgentState {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            skill_by_activity: HashMap::new(),
            experience_by_activity: HashMap::new(),
            fatigue: 0.0,
            mood: MAX_MOOD,
            history: HistoryRing::default(),
        }
    }

    pub fn skill_level(&self, activity_type: &str) -> u8 {
        self.skill_by_activity
            .get(activity_type)
            .copied()
            .unwrap_or(MIN_SKILL_LEVEL)
    }

    pub fn experience(&self, activity_type: &str) -> f64 {
        self.experience_by_activity
            .get(activity_type)
            .copied()
            .unwrap_or(0.0)
    }

    /// Add experience and advance the skill by at most one level.
    pub fn grant_experience(&mut self, activity_type: &str, amount: f64) -> SkillProgress {
        let old_experience = self.experience(activity_type);
        let new_experience = old_experience + amount.max(0.0);
        self.experience_by_activity
            .insert(activity_type.to_string(), new_experience);

        let old_level = self.skill_level(activity_type);
        let new_level = next_skill_level(old_level, old_experience, new_experience);
        if new_level != old_level {
            self.skill_by_activity
                .insert(activity_type.to_string(), new_level);
        }
        SkillProgress {
            old_level,
            new_level,
        }
    }

    pub fn adjust_fatigue(&mut self, delta: f64) -> f64 {
        self.fatigue = clamp_fatigue(self.fatigue + delta);
        self.fatigue
    }

    pub fn adjust_mood(&mut self, delta: f64) -> f64 {
        self.mood = clamp_mood(self.mood + delta);
        self.mood
    }

    /// Force fatigue and mood back into range, e.g. after loading external data.
    pub fn normalize(&mut self) {
        self.fatigue = clamp_fatigue(self.fatigue);
        self.mood = clamp_mood(self.mood);
    }
}

/// Default state for an agent seen for the first time.
pub fn default_agent_state(agent_id: &str, roster: &Roster, history_capacity: usize) -> AgentState {
    let mut state = AgentState::new(agent_id, roster.name(agent_id));
    state.history = HistoryRing::with_capacity(history_capacity);
    state
}

#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: HashMap<String, AgentState>,
    history_capacity: usize,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl AgentRegistry {
    pub fn with_history_capacity(history_capacity: usize) -> Self {
        Self {
            agents: HashMap::new(),
            history_capacity: history_capacity.max(1),
        }
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentState> {
        self.agents.get(agent_id)
    }

    pub fn get_mut(&mut self, agent_id: &str) -> Option<&mut AgentState> {
        self.agents.get_mut(agent_id)
    }

    /// Materialize default state on first access.
    pub fn get_or_create(&mut self, agent_id: &str, roster: &Roster) -> &mut AgentState {
        let capacity = self.history_capacity;
        self.agents
            .entry(agent_id.to_string())
            .or_insert_with(|| default_agent_state(agent_id, roster, capacity))
    }

    /// Read-only view that never inserts.
    pub fn peek_or_default<'a>(&'a self, agent_id: &str, roster: &Roster) -> Cow<'a, AgentState> {
        match self.agents.get(agent_id) {
            Some(state) => Cow::Borrowed(state),
            None => Cow::Owned(default_agent_state(agent_id, roster, self.history_capacity)),
        }
    }

    pub fn insert(&mut self, state: AgentState) {
        self.agents.insert(state.id.clone(), state);
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentState> {
        self.agents.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: u64) -> HistoryEntry {
        HistoryEntry {
            activity_type: format!("task{}", n),
            completed_at: n,
            success: true,
        }
    }

    #[test]
    fn ring_keeps_most_recent_entries() {
        let mut ring = HistoryRing::with_capacity(3);
        for n in 0..5 {
            ring.push(entry(n));
        }
        let stamps: Vec<u64> = ring.iter().map(|e| e.completed_at).collect();
        assert_eq!(stamps, vec![2, 3, 4]);
        assert_eq!(ring.latest().map(|e| e.completed_at), Some(4));
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn ring_rebuild_trims_to_capacity() {
        let entries: Vec<HistoryEntry> = (0..25).map(entry).collect();
        let ring = HistoryRing::from_entries(entries, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(ring.len(), DEFAULT_HISTORY_CAPACITY);
        assert_eq!(ring.iter().next().map(|e| e.completed_at), Some(5));
    }

    #[test]
    fn rings_compare_by_contents() {
        let mut wrapped = HistoryRing::with_capacity(2);
        for n in 0..3 {
            wrapped.push(entry(n));
        }
        let rebuilt = HistoryRing::from_entries(vec![entry(1), entry(2)], 2);
        assert_eq!(wrapped, rebuilt);
    }

    #[test]
    fn registry_materializes_defaults() {
        let roster = Roster::builtin().unwrap();
        let mut registry = AgentRegistry::default();
        assert!(registry.get("aya").is_none());
        let state = registry.get_or_create("aya", &roster);
        assert_eq!(state.display_name, "Aya");
        assert_eq!(state.fatigue, 0.0);
        assert_eq!(state.mood, 100.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn peek_does_not_insert() {
        let roster = Roster::builtin().unwrap();
        let registry = AgentRegistry::default();
        let view = registry.peek_or_default("ghost", &roster);
        assert_eq!(view.display_name, "unknown");
        assert!(registry.is_empty());
    }

    #[test]
    fn experience_levels_skill_once_per_grant() {
        let mut agent = AgentState::new("aya", "Aya");
        agent.experience_by_activity.insert("cooking".to_string(), 95.0);
        let progress = agent.grant_experience("cooking", 250.0);
        assert_eq!(progress.old_level, 1);
        assert_eq!(progress.new_level, 2);
        assert_eq!(agent.skill_level("cooking"), 2);
        assert_eq!(agent.experience("cooking"), 345.0);
    }

    #[test]
    fn fatigue_and_mood_are_clamped() {
        let mut agent = AgentState::new("aya", "Aya");
        assert_eq!(agent.adjust_fatigue(3.0), 1.0);
        assert_eq!(agent.adjust_mood(-250.0), 0.0);
        assert_eq!(agent.adjust_mood(500.0), 100.0);
    }
}
