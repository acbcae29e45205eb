pub mod activities;
pub mod preferences;
pub mod roster;

use std::path::Path;

pub use activities::{ActivityCatalog, ActivityCategory, ActivityDefinition};
pub use preferences::{Affinity, AgentPreferences, PreferenceTable};
pub use roster::{Roster, RosterEntry, UNKNOWN_AGENT_NAME};

#[derive(Debug)]
pub enum CatalogError {
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
    Validation(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            CatalogError::Json { path, source } => {
                write!(f, "failed to parse {}: {}", path, source)
            }
            CatalogError::Validation(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Highest data file layout this build understands.
pub const DATA_SCHEMA_VERSION: u32 = 1;

fn check_schema_version(origin: &str, version: u32) -> Result<(), CatalogError> {
    if version == 0 || version > DATA_SCHEMA_VERSION {
        return Err(CatalogError::Validation(format!(
            "{} has unsupported schema_version {}",
            origin, version
        )));
    }
    Ok(())
}

/// Read-only configuration handed to the engine at construction.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub activities: ActivityCatalog,
    pub preferences: PreferenceTable,
    pub roster: Roster,
}

impl Catalogs {
    pub fn builtin() -> Result<Self, CatalogError> {
        let catalogs = Self {
            activities: ActivityCatalog::builtin()?,
            preferences: PreferenceTable::builtin()?,
            roster: Roster::builtin()?,
        };
        catalogs.preferences.validate_against(&catalogs.activities)?;
        Ok(catalogs)
    }

    /// Load `activities.json`, `preferences.json` and `roster.json` from `dir`.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let catalogs = Self {
            activities: ActivityCatalog::load_from_path(dir.join("activities.json"))?,
            preferences: PreferenceTable::load_from_path(dir.join("preferences.json"))?,
            roster: Roster::load_from_path(dir.join("roster.json"))?,
        };
        catalogs.preferences.validate_against(&catalogs.activities)?;
        Ok(catalogs)
    }
}
