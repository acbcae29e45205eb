use std::path::PathBuf;

use crate::core::serialization::{load_data_from_path, save_data_to_path, SaveData};
use crate::world::sqlite::SaveDb;

/// Somewhere engine save data can be written to and read back from.
pub trait SaveRepository {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<SaveData>, Box<dyn std::error::Error>>;
    fn save(&mut self, data: &SaveData) -> Result<(), Box<dyn std::error::Error>>;
}

impl SaveRepository for SaveDb {
    fn load(&self) -> Result<Option<SaveData>, Box<dyn std::error::Error>> {
        Ok(self.load_data()?)
    }

    fn save(&mut self, data: &SaveData) -> Result<(), Box<dyn std::error::Error>> {
        Ok(self.save_data(data)?)
    }
}

/// Pretty-printed JSON save file.
#[derive(Debug, Clone)]
pub struct JsonSaveFile {
    path: PathBuf,
}

impl JsonSaveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SaveRepository for JsonSaveFile {
    fn load(&self) -> Result<Option<SaveData>, Box<dyn std::error::Error>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(load_data_from_path(&self.path)?))
    }

    fn save(&mut self, data: &SaveData) -> Result<(), Box<dyn std::error::Error>> {
        Ok(save_data_to_path(data, &self.path)?)
    }
}
