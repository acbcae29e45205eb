use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{check_schema_version, CatalogError};

const BUILTIN_ACTIVITIES: &str = include_str!("../../assets/data/activities.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Housework,
    Service,
    Outdoor,
    Training,
    Creative,
}

/// Immutable description of one kind of work an agent can be sent to do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDefinition {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub display_name: String,
    pub category: ActivityCategory,
    /// Game-time seconds at a speed multiplier of 1.0.
    pub nominal_duration: f64,
    #[serde(default)]
    pub required_facility: Option<String>,
    #[serde(default)]
    pub required_facility_level: Option<u32>,
}

impl ActivityDefinition {
    /// Facility gate as `(facility_id, minimum_level)`, if the activity declares one.
    pub fn facility_requirement(&self) -> Option<(&str, u32)> {
        self.required_facility
            .as_deref()
            .map(|facility| (facility, self.required_facility_level.unwrap_or(1)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActivityFile {
    schema_version: u32,
    activities: Vec<ActivityDefinition>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityCatalog {
    activities: HashMap<String, ActivityDefinition>,
}

impl ActivityCatalog {
    /// Catalog compiled into the crate from `assets/data/activities.json`.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json("builtin:activities.json", BUILTIN_ACTIVITIES)
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
        let file: ActivityFile = serde_json::from_str(raw).map_err(|source| CatalogError::Json {
            path: origin.to_string(),
            source,
        })?;
        check_schema_version(origin, file.schema_version)?;
        Self::from_definitions(file.activities)
    }

    pub fn from_definitions(
        definitions: Vec<ActivityDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut activities = HashMap::new();
        for definition in definitions {
            validate_definition(&definition)?;
            let key = definition.activity_type.clone();
            if activities.insert(key.clone(), definition).is_some() {
                return Err(CatalogError::Validation(format!(
                    "duplicate activity type {}",
                    key
                )));
            }
        }
        Ok(Self { activities })
    }

    pub fn get(&self, activity_type: &str) -> Option<&ActivityDefinition> {
        self.activities.get(activity_type)
    }

    pub fn contains(&self, activity_type: &str) -> bool {
        self.activities.contains_key(activity_type)
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Definitions sorted by type key for stable listings.
    pub fn sorted(&self) -> Vec<&ActivityDefinition> {
        let mut defs: Vec<&ActivityDefinition> = self.activities.values().collect();
        defs.sort_by(|a, b| a.activity_type.cmp(&b.activity_type));
        defs
    }
}

fn validate_definition(definition: &ActivityDefinition) -> Result<(), CatalogError> {
    if definition.activity_type.trim().is_empty() {
        return Err(CatalogError::Validation(
            "activity type cannot be empty".to_string(),
        ));
    }
    if !(definition.nominal_duration > 0.0) {
        return Err(CatalogError::Validation(format!(
            "activity {} must have a positive duration",
            definition.activity_type
        )));
    }
    match (&definition.required_facility, definition.required_facility_level) {
        (Some(facility), _) if facility.trim().is_empty() => {
            Err(CatalogError::Validation(format!(
                "activity {} names an empty facility",
                definition.activity_type
            )))
        }
        (Some(_), Some(0)) => Err(CatalogError::Validation(format!(
            "activity {} requires facility level 0",
            definition.activity_type
        ))),
        (None, Some(_)) => Err(CatalogError::Validation(format!(
            "activity {} has a facility level without a facility",
            definition.activity_type
        ))),
        _ => Ok(()),
    }
}
