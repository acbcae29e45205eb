use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::activities::ActivityCatalog;
use crate::data::{check_schema_version, CatalogError};

const BUILTIN_PREFERENCES: &str = include_str!("../../assets/data/preferences.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentPreferences {
    pub agent_id: String,
    #[serde(default)]
    pub favorites: HashSet<String>,
    #[serde(default)]
    pub disliked: HashSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PreferenceFile {
    schema_version: u32,
    agents: Vec<AgentPreferences>,
}

/// How an agent feels about an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Favorite,
    Neutral,
    Disliked,
}

/// Static per-agent favorite/disliked lists. Agents without an entry are neutral about
/// everything.
#[derive(Debug, Clone, Default)]
pub struct PreferenceTable {
    agents: HashMap<String, AgentPreferences>,
    empty: HashSet<String>,
}

impl PreferenceTable {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json("builtin:preferences.json", BUILTIN_PREFERENCES)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&path.display().to_string(), &raw)
    }

    fn from_json(origin: &str, raw: &str) -> Result<Self, CatalogError> {
        let file: PreferenceFile =
            serde_json::from_str(raw).map_err(|source| CatalogError::Json {
                path: origin.to_string(),
                source,
            })?;
        check_schema_version(origin, file.schema_version)?;
        Self::from_entries(file.agents)
    }

    pub fn from_entries(entries: Vec<AgentPreferences>) -> Result<Self, CatalogError> {
        let mut agents = HashMap::new();
        for entry in entries {
            if let Some(overlap) = entry.favorites.intersection(&entry.disliked).next() {
                return Err(CatalogError::Validation(format!(
                    "agent {} both likes and dislikes {}",
                    entry.agent_id, overlap
                )));
            }
            let key = entry.agent_id.clone();
            if agents.insert(key.clone(), entry).is_some() {
                return Err(CatalogError::Validation(format!(
                    "duplicate preference entry for {}",
                    key
                )));
            }
        }
        Ok(Self {
            agents,
            empty: HashSet::new(),
        })
    }

    /// Every listed activity must exist in the catalog.
    pub fn validate_against(&self, catalog: &ActivityCatalog) -> Result<(), CatalogError> {
        for entry in self.agents.values() {
            for activity in entry.favorites.iter().chain(entry.disliked.iter()) {
                if !catalog.contains(activity) {
                    return Err(CatalogError::Validation(format!(
                        "preferences for {} reference unknown activity {}",
                        entry.agent_id, activity
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn favorites(&self, agent_id: &str) -> &HashSet<String> {
        self.agents
            .get(agent_id)
            .map(|entry| &entry.favorites)
            .unwrap_or(&self.empty)
    }

    pub fn disliked(&self, agent_id: &str) -> &HashSet<String> {
        self.agents
            .get(agent_id)
            .map(|entry| &entry.disliked)
            .unwrap_or(&self.empty)
    }

    pub fn affinity(&self, agent_id: &str, activity_type: &str) -> Affinity {
        if self.favorites(agent_id).contains(activity_type) {
            Affinity::Favorite
        } else if self.disliked(agent_id).contains(activity_type) {
            Affinity::Disliked
        } else {
            Affinity::Neutral
        }
    }
}
