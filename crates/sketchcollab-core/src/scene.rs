//! Serialized scene snapshot: elements plus view transform.

use crate::camera::ViewTransform;
use crate::elements::{Element, now_millis};
use crate::engine::DrawingEngine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors at the scene serialization boundary.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A saved document state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_transform: Option<ViewTransform>,
    #[serde(default)]
    pub timestamp: u64,
}

impl Scene {
    pub fn new(elements: Vec<Element>, view_transform: Option<ViewTransform>) -> Self {
        Self {
            elements,
            view_transform,
            timestamp: now_millis(),
        }
    }

    /// Snapshot the engine's store and the host's view.
    pub fn capture(engine: &DrawingEngine, view: &ViewTransform) -> Self {
        Self::new(engine.elements().to_vec(), Some(*view))
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        serde_json::from_str(json).map_err(|e| {
            let message = e.to_string();
            if message.starts_with("invalid color") {
                SceneError::InvalidColor(message)
            } else {
                SceneError::Json(e)
            }
        })
    }

    /// Replace the engine's document with this scene's elements.
    ///
    /// Returns the saved view transform for the host to apply.
    pub fn load_into(self, engine: &mut DrawingEngine) -> Option<ViewTransform> {
        log::info!("Loading scene with {} elements", self.elements.len());
        engine.set_elements(self.elements);
        self.view_transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::SerializableColor;

    #[test]
    fn test_capture_and_reload() {
        let mut engine = DrawingEngine::new();
        engine.add_element(
            Element::rectangle(0.0, 0.0, 10.0, 10.0).with_stroke(SerializableColor::white(), 2.0),
        );
        engine.add_element(Element::text(5.0, 5.0, "note"));
        let view = ViewTransform::new(10.0, 20.0, 1.5);

        let json = Scene::capture(&engine, &view).to_json().unwrap();
        assert!(json.contains("\"viewTransform\""));

        let mut restored = DrawingEngine::new();
        let restored_view = Scene::from_json(&json).unwrap().load_into(&mut restored);
        assert_eq!(restored_view, Some(view));
        assert_eq!(restored.elements(), engine.elements());
    }

    #[test]
    fn test_loose_scene_gets_ids_and_z() {
        let json = r##"{
            "elements": [
                {"type": "line", "x": 0, "y": 0, "width": 10, "height": 5},
                {"type": "freedraw", "points": [[0, 0], [1, 1]], "strokeColor": "#fff"}
            ]
        }"##;
        let mut engine = DrawingEngine::new();
        let view = Scene::from_json(json).unwrap().load_into(&mut engine);
        assert!(view.is_none());
        assert_eq!(engine.len(), 2);
        assert!(engine.elements().iter().all(|e| !e.id.is_unassigned()));
        assert_eq!(engine.elements()[1].z_index, Some(1));
    }

    #[test]
    fn test_invalid_color_reported() {
        let json = r#"{"elements": [{"type": "rectangle", "x": 0, "y": 0, "strokeColor": "blue"}]}"#;
        assert!(matches!(Scene::from_json(json), Err(SceneError::InvalidColor(_))));
        assert!(matches!(Scene::from_json("{"), Err(SceneError::Json(_))));
    }

    #[test]
    fn test_saved_view_scale_is_clamped_on_load() {
        let json = r#"{"elements": [], "viewTransform": {"x": 0, "y": 0, "scale": 0}}"#;
        let mut engine = DrawingEngine::new();
        let view = Scene::from_json(json).unwrap().load_into(&mut engine).unwrap();
        assert_eq!(view, ViewTransform::new(0.0, 0.0, crate::camera::MIN_SCALE));
    }
}
