//! In-memory scene storage.

use super::{
    BoxFuture, SceneRecord, SceneStorage, SceneSummary, StorageError, StorageResult,
    sort_summaries, validate_name,
};
use crate::scene::Scene;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    scenes: RwLock<HashMap<String, SceneRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl SceneStorage for MemoryStorage {
    fn save(&self, name: &str, scene: &Scene) -> BoxFuture<'_, StorageResult<SceneRecord>> {
        let name = validate_name(name).map(str::to_string);
        let scene = scene.clone();
        Box::pin(async move {
            let name = name?;
            let mut scenes = self.scenes.write().map_err(lock_error)?;
            if let Some(existing) = scenes.values_mut().find(|r| r.name == name) {
                existing.update(scene);
                return Ok(existing.clone());
            }
            let record = SceneRecord::new(&name, scene);
            scenes.insert(record.id.clone(), record.clone());
            Ok(record)
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SceneRecord>> {
        let id = id.to_string();
        Box::pin(async move {
            let scenes = self.scenes.read().map_err(lock_error)?;
            scenes
                .get(&id)
                .cloned()
                .ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut scenes = self.scenes.write().map_err(lock_error)?;
            scenes.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<SceneSummary>>> {
        Box::pin(async move {
            let scenes = self.scenes.read().map_err(lock_error)?;
            let mut summaries: Vec<SceneSummary> = scenes.values().map(SceneRecord::summary).collect();
            sort_summaries(&mut summaries);
            Ok(summaries)
        })
    }
}
