//! Named scene persistence.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::elements::now_millis;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Scene not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A stored scene with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    pub id: String,
    pub name: String,
    /// Milliseconds since the UNIX epoch.
    pub created_at: u64,
    pub updated_at: u64,
    #[serde(rename = "scene_data")]
    pub scene: Scene,
}

impl SceneRecord {
    /// A fresh record with a generated id.
    pub fn new(name: &str, scene: Scene) -> Self {
        let now = now_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
            scene,
        }
    }

    /// Replace the scene, keeping identity and creation time.
    pub fn update(&mut self, scene: Scene) {
        self.scene = scene;
        self.updated_at = now_millis().max(self.updated_at);
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Listing entry for a stored scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSummary {
    pub id: String,
    pub name: String,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Trim and validate a scene name.
fn validate_name(name: &str) -> StorageResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StorageError::Other("scene name must not be empty".to_string()));
    }
    Ok(name)
}

/// Most recently updated first, then by name.
fn sort_summaries(summaries: &mut [SceneSummary]) {
    summaries.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Trait for scene storage backends.
///
/// Saving under a name that already exists updates that record.
pub trait SceneStorage: Send + Sync {
    /// Save a scene under a name, returning the stored record.
    fn save(&self, name: &str, scene: &Scene) -> BoxFuture<'_, StorageResult<SceneRecord>>;

    /// Load a scene record by id.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SceneRecord>>;

    /// Delete a scene by id. Deleting an absent id is not an error.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List stored scenes, most recently updated first.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<SceneSummary>>>;
}

#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    // Simple blocking executor for tests
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
