//! SketchCollab Core Library
//!
//! Platform-agnostic document model, undo history and animation playback for
//! the SketchCollab drawing editor.

pub mod animation;
pub mod camera;
pub mod elements;
pub mod engine;
pub mod events;
pub mod history;
pub mod scene;
pub mod storage;
pub mod tools;

pub use animation::{AnimationEngine, FrameRequest, FrameSampler, PlaybackState, SampledFrame};
pub use camera::ViewTransform;
pub use elements::{
    Element, ElementId, ElementKind, ElementPatch, ElementType, Fill, SerializableColor,
    StrokePoint,
};
pub use engine::DrawingEngine;
pub use events::{ChangeKind, DocumentChange, DocumentObserver};
pub use history::{History, MAX_HISTORY};
pub use scene::{Scene, SceneError};
pub use storage::{FileStorage, MemoryStorage, SceneRecord, SceneStorage, SceneSummary, StorageError};
pub use tools::{PointerEvent, ToolKind, ToolManager, ToolStyle};
