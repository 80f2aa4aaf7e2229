//! File-based scene storage.

use super::{
    BoxFuture, SceneRecord, SceneStorage, SceneSummary, StorageError, StorageResult,
    sort_summaries, validate_name,
};
use crate::scene::Scene;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each scene as a JSON file named after its id.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage in the given directory, creating it if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/sketchcollab/scenes/`
    /// On Windows: `%LOCALAPPDATA%\sketchcollab\scenes\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("sketchcollab").join("scenes"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn scene_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    fn read_record(path: &Path) -> StorageResult<SceneRecord> {
        let json = fs::read_to_string(path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&json).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn write_record(&self, record: &SceneRecord) -> StorageResult<()> {
        let path = self.scene_path(&record.id);
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::info!("Saved scene '{}' to {}", record.name, path.display());
        Ok(())
    }

    /// Every readable record in the directory. Unreadable files are skipped.
    fn records(&self) -> StorageResult<Vec<SceneRecord>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut records = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match Self::read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(records)
    }
}

impl SceneStorage for FileStorage {
    fn save(&self, name: &str, scene: &Scene) -> BoxFuture<'_, StorageResult<SceneRecord>> {
        let name = validate_name(name).map(str::to_string);
        let scene = scene.clone();
        Box::pin(async move {
            let name = name?;
            let record = match self.records()?.into_iter().find(|r| r.name == name) {
                Some(mut existing) => {
                    existing.update(scene);
                    existing
                }
                None => SceneRecord::new(&name, scene),
            };
            self.write_record(&record)?;
            Ok(record)
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SceneRecord>> {
        let path = self.scene_path(id);
        let id = id.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            log::info!("Loading scene {} from {}", id, path.display());
            Self::read_record(&path)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.scene_path(id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<SceneSummary>>> {
        Box::pin(async move {
            let mut summaries: Vec<SceneSummary> =
                self.records()?.iter().map(SceneRecord::summary).collect();
            sort_summaries(&mut summaries);
            Ok(summaries)
        })
    }
}
