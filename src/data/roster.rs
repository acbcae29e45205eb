use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{check_schema_version, CatalogError};

const BUILTIN_ROSTER: &str = include_str!("../../assets/data/roster.json");

/// Display name returned for ids missing from the roster.
pub const UNKNOWN_AGENT_NAME: &str = "unknown";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RosterFile {
    schema_version: u32,
    agents: Vec<RosterEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    names: HashMap<String, String>,
    order: Vec<String>,
}

impl Roster {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json("builtin:roster.json", BUILTIN_ROSTER)
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
        let file: RosterFile = serde_json::from_str(raw).map_err(|source| CatalogError::Json {
            path: origin.to_string(),
            source,
        })?;
        check_schema_version(origin, file.schema_version)?;
        Self::from_entries(file.agents)
    }

    pub fn from_entries(entries: Vec<RosterEntry>) -> Result<Self, CatalogError> {
        let mut names = HashMap::new();
        let mut order = Vec::new();
        for entry in entries {
            if entry.id.trim().is_empty() {
                return Err(CatalogError::Validation(
                    "roster id cannot be empty".to_string(),
                ));
            }
            if names.insert(entry.id.clone(), entry.display_name).is_some() {
                return Err(CatalogError::Validation(format!(
                    "duplicate roster id {}",
                    entry.id
                )));
            }
            order.push(entry.id);
        }
        Ok(Self { names, order })
    }

    pub fn name(&self, agent_id: &str) -> &str {
        self.names
            .get(agent_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_AGENT_NAME)
    }

    /// Roster ids in file order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }
}
