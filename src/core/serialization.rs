use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::roster::Roster;
use crate::rules::efficiency::MIN_SPEED_MULTIPLIER;
use crate::rules::progression::{MAX_SKILL_LEVEL, MIN_SKILL_LEVEL};
use crate::simulation::agents::{AgentState, HistoryEntry, HistoryRing};
use crate::simulation::assignment::{Assignment, AssignmentStatus};
use crate::simulation::state::DispatchState;
use crate::simulation::stats::DispatchStatistics;

pub const SAVE_VERSION: u32 = 1;

/// Everything mutable in the engine, as plain JSON-friendly data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    #[serde(default = "default_save_version")]
    pub version: u32,
    #[serde(default)]
    pub assignments: BTreeMap<String, Assignment>,
    #[serde(default)]
    pub history: BTreeMap<String, Vec<HistoryEntry>>,
    #[serde(default)]
    pub agents: BTreeMap<String, AgentState>,
    #[serde(default)]
    pub statistics: DispatchStatistics,
}

fn default_save_version() -> u32 {
    SAVE_VERSION
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            assignments: BTreeMap::new(),
            history: BTreeMap::new(),
            agents: BTreeMap::new(),
            statistics: DispatchStatistics::default(),
        }
    }
}

#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Json(serde_json::Error),
    UnsupportedVersion(u32),
    InvalidData(String),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(err) => write!(f, "I/O error: {}", err),
            SaveError::Json(err) => write!(f, "Parse error: {}", err),
            SaveError::UnsupportedVersion(version) => {
                write!(f, "unsupported save version {}", version)
            }
            SaveError::InvalidData(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for SaveError {}

impl From<std::io::Error> for SaveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

pub fn extract_save_data(state: &DispatchState) -> SaveData {
    let assignments = state
        .assignments
        .sorted()
        .into_iter()
        .map(|a| (a.agent_id.clone(), a.clone()))
        .collect();

    let mut agents = BTreeMap::new();
    let mut history = BTreeMap::new();
    for agent in state.agents.iter() {
        if !agent.history.is_empty() {
            history.insert(agent.id.clone(), agent.history.to_vec());
        }
        agents.insert(agent.id.clone(), agent.clone());
    }

    SaveData {
        version: SAVE_VERSION,
        assignments,
        history,
        agents,
        statistics: state.statistics.clone(),
    }
}

/// Replace `state` with the contents of `data`. Nothing is touched if validation fails.
pub fn apply_save_data(
    data: SaveData,
    state: &mut DispatchState,
    roster: &Roster,
) -> Result<(), SaveError> {
    if data.version > SAVE_VERSION {
        return Err(SaveError::UnsupportedVersion(data.version));
    }
    for (key, assignment) in &data.assignments {
        if *key != assignment.agent_id {
            return Err(SaveError::InvalidData(format!(
                "assignment {} is keyed under {} but belongs to {}",
                assignment.id, key, assignment.agent_id
            )));
        }
        if !(assignment.duration > 0.0) {
            return Err(SaveError::InvalidData(format!(
                "assignment {} has a non-positive duration",
                assignment.id
            )));
        }
        let speed = assignment.efficiency.speed_multiplier;
        if !speed.is_finite() || speed < MIN_SPEED_MULTIPLIER {
            return Err(SaveError::InvalidData(format!(
                "assignment {} has speed multiplier {} (minimum {})",
                assignment.id, speed, MIN_SPEED_MULTIPLIER
            )));
        }
        if !assignment.progress.is_finite() {
            return Err(SaveError::InvalidData(format!(
                "assignment {} has non-finite progress",
                assignment.id
            )));
        }
    }
    for (key, agent) in &data.agents {
        validate_agent(key, agent)?;
    }

    let mut restored = DispatchState::with_history_capacity(state.agents.history_capacity());
    let capacity = restored.agents.history_capacity();
    let mut history = data.history;

    for (key, mut agent) in data.agents {
        agent.id = key;
        agent.normalize();
        agent.history =
            HistoryRing::from_entries(history.remove(&agent.id).unwrap_or_default(), capacity);
        restored.agents.insert(agent);
    }
    for (agent_id, entries) in history {
        let agent = restored.agents.get_or_create(&agent_id, roster);
        agent.history = HistoryRing::from_entries(entries, capacity);
    }

    for (_, mut assignment) in data.assignments {
        restored.agents.get_or_create(&assignment.agent_id, roster);
        assignment.progress = assignment.progress.clamp(0.0, 1.0);
        assignment.status = AssignmentStatus::InProgress;
        // Keys were checked above, so this cannot collide.
        let _ = restored.assignments.insert(assignment);
    }
    restored.assignments.sync_next_id();
    restored.statistics = data.statistics;

    *state = restored;
    Ok(())
}

fn validate_agent(key: &str, agent: &AgentState) -> Result<(), SaveError> {
    for (activity_type, &level) in &agent.skill_by_activity {
        if !(MIN_SKILL_LEVEL..=MAX_SKILL_LEVEL).contains(&level) {
            return Err(SaveError::InvalidData(format!(
                "agent {} has {} skill level {} (expected {}..={})",
                key, activity_type, level, MIN_SKILL_LEVEL, MAX_SKILL_LEVEL
            )));
        }
    }
    for (activity_type, &experience) in &agent.experience_by_activity {
        if !experience.is_finite() || experience < 0.0 {
            return Err(SaveError::InvalidData(format!(
                "agent {} has invalid {} experience {}",
                key, activity_type, experience
            )));
        }
    }
    Ok(())
}

pub fn save_data_to_path<P: AsRef<Path>>(data: &SaveData, path: P) -> Result<(), SaveError> {
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_data_from_path<P: AsRef<Path>>(path: P) -> Result<SaveData, SaveError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::efficiency::EfficiencySnapshot;

    fn populated_state(roster: &Roster) -> DispatchState {
        let mut state = DispatchState::default();
        let agent = state.agents.get_or_create("aya", roster);
        agent.skill_by_activity.insert("cooking".to_string(), 4);
        agent.experience_by_activity.insert("cooking".to_string(), 310.0);
        agent.fatigue = 0.4;
        agent.mood = 71.0;
        agent.history.push(HistoryEntry {
            activity_type: "cooking".to_string(),
            completed_at: 2,
            success: true,
        });
        let id = state.assignments.allocate_id();
        state
            .assignments
            .insert(Assignment {
                id,
                activity_type: "cooking".to_string(),
                agent_id: "aya".to_string(),
                efficiency: EfficiencySnapshot::from_terms(4, 310.0, 0.4),
                started_at: 2,
                duration: 1800.0,
                progress: 0.25,
                status: AssignmentStatus::InProgress,
            })
            .unwrap();
        state.statistics.record_completion(true, 10.0);
        state
    }

    #[test]
    fn save_restores_all_mutable_state() {
        let roster = Roster::builtin().unwrap();
        let original = populated_state(&roster);
        let json = serde_json::to_string(&extract_save_data(&original)).unwrap();
        let data: SaveData = serde_json::from_str(&json).unwrap();

        let mut restored = DispatchState::default();
        apply_save_data(data, &mut restored, &roster).unwrap();

        let agent = restored.agents.get("aya").unwrap();
        assert_eq!(agent.skill_level("cooking"), 4);
        assert_eq!(agent.mood, 71.0);
        assert_eq!(agent.history.latest().unwrap().completed_at, 2);
        let task = restored.assignments.get("aya").unwrap();
        assert_eq!(task.progress, 0.25);
        assert_eq!(
            task.efficiency,
            original.assignments.get("aya").unwrap().efficiency
        );
        assert_eq!(restored.statistics.successful_tasks, 1);
        assert_eq!(restored.assignments.allocate_id(), 2);
    }

    #[test]
    fn history_is_stored_outside_agent_records() {
        let roster = Roster::builtin().unwrap();
        let value = serde_json::to_value(extract_save_data(&populated_state(&roster))).unwrap();
        assert!(value["agents"]["aya"].get("history").is_none());
        assert_eq!(value["history"]["aya"][0]["activity_type"], "cooking");
    }

    #[test]
    fn rejects_mismatched_assignment_key() {
        let roster = Roster::builtin().unwrap();
        let mut data = extract_save_data(&populated_state(&roster));
        let task = data.assignments.remove("aya").unwrap();
        data.assignments.insert("bram".to_string(), task);

        let mut state = populated_state(&roster);
        let err = apply_save_data(data, &mut state, &roster).unwrap_err();
        assert!(matches!(err, SaveError::InvalidData(_)));
        assert!(state.assignments.contains("aya"));
    }

    #[test]
    fn rejects_future_versions() {
        let roster = Roster::builtin().unwrap();
        let data = SaveData {
            version: SAVE_VERSION + 1,
            ..SaveData::default()
        };
        let mut state = DispatchState::default();
        assert!(matches!(
            apply_save_data(data, &mut state, &roster),
            Err(SaveError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn out_of_range_values_are_clamped_on_load() {
        let roster = Roster::builtin().unwrap();
        let raw = r#"{
            "agents": {
                "emi": {"id": "emi", "display_name": "Emi", "fatigue": 4.0, "mood": -20.0}
            }
        }"#;
        let data: SaveData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.version, SAVE_VERSION);
        let mut state = DispatchState::default();
        apply_save_data(data, &mut state, &roster).unwrap();
        let emi = state.agents.get("emi").unwrap();
        assert_eq!(emi.fatigue, 1.0);
        assert_eq!(emi.mood, 0.0);
    }

    #[test]
    fn out_of_range_skill_and_experience_are_rejected() {
        let roster = Roster::builtin().unwrap();
        let cases = [
            r#"{"agents": {"aya": {"id": "aya", "display_name": "Aya", "fatigue": 0.0, "mood": 100.0,
                "skill_by_activity": {"cleaning": 9}}}}"#,
            r#"{"agents": {"aya": {"id": "aya", "display_name": "Aya", "fatigue": 0.0, "mood": 100.0,
                "skill_by_activity": {"cleaning": 0}}}}"#,
            r#"{"agents": {"aya": {"id": "aya", "display_name": "Aya", "fatigue": 0.0, "mood": 100.0,
                "experience_by_activity": {"cleaning": -500.0}}}}"#,
        ];
        for raw in cases {
            let data: SaveData = serde_json::from_str(raw).unwrap();
            let mut state = populated_state(&roster);
            let before = extract_save_data(&state);
            let err = apply_save_data(data, &mut state, &roster).unwrap_err();
            assert!(matches!(err, SaveError::InvalidData(_)), "{}", raw);
            assert_eq!(extract_save_data(&state), before);
        }
    }

    #[test]
    fn non_finite_experience_is_rejected() {
        let roster = Roster::builtin().unwrap();
        let mut data = extract_save_data(&populated_state(&roster));
        data.agents
            .get_mut("aya")
            .unwrap()
            .experience_by_activity
            .insert("cooking".to_string(), f64::INFINITY);
        let mut state = DispatchState::default();
        assert!(matches!(
            apply_save_data(data, &mut state, &roster),
            Err(SaveError::InvalidData(_))
        ));
        assert!(state.agents.is_empty());
    }

    #[test]
    fn slow_or_negative_speed_snapshots_are_rejected() {
        let roster = Roster::builtin().unwrap();
        for speed in [-2.0, 0.0, 0.29, f64::NAN, f64::INFINITY] {
            let mut data = extract_save_data(&populated_state(&roster));
            data.assignments
                .get_mut("aya")
                .unwrap()
                .efficiency
                .speed_multiplier = speed;
            let mut state = DispatchState::default();
            let err = apply_save_data(data, &mut state, &roster).unwrap_err();
            assert!(matches!(err, SaveError::InvalidData(_)), "speed {}", speed);
            assert!(state.assignments.is_empty());
        }
    }

    #[test]
    fn minimum_speed_snapshot_still_loads() {
        let roster = Roster::builtin().unwrap();
        let mut data = extract_save_data(&populated_state(&roster));
        data.assignments
            .get_mut("aya")
            .unwrap()
            .efficiency
            .speed_multiplier = MIN_SPEED_MULTIPLIER;
        let mut state = DispatchState::default();
        apply_save_data(data, &mut state, &roster).unwrap();
        let task = state.assignments.get("aya").unwrap();
        assert_eq!(task.efficiency.speed_multiplier, MIN_SPEED_MULTIPLIER);
    }
}
