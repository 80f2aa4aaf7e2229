//! Partial element updates.

use super::{Element, ElementKind, Fill, SerializableColor, StrokePoint};
use serde::{Deserialize, Serialize};

/// A set of optional field changes merged into an existing element.
///
/// Fields that do not apply to the target variant are ignored. A patch never
/// changes an element's identity or variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<SerializableColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<StrokePoint>>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn with_stroke_color(mut self, color: SerializableColor) -> Self {
        self.stroke_color = Some(color);
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.background_color = Some(fill);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn with_points(mut self, points: Vec<StrokePoint>) -> Self {
        self.points = Some(points);
        self
    }

    /// Whether the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the patch into `element`.
    pub fn apply(&self, element: &mut Element) {
        if let Some(z) = self.z_index {
            element.z_index = Some(z);
        }
        if let Some(color) = self.stroke_color {
            element.stroke_color = Some(color);
        }
        if let Some(width) = self.stroke_width {
            element.stroke_width = Some(width);
        }
        if let Some(fill) = self.background_color {
            element.background_color = Some(fill);
        }
        if let Some(opacity) = self.opacity {
            element.opacity = Some(opacity.clamp(0.0, 1.0));
        }

        match &mut element.kind {
            ElementKind::Freedraw(stroke) => {
                if let Some(points) = &self.points {
                    stroke.points.clone_from(points);
                }
            }
            ElementKind::Rectangle(shape)
            | ElementKind::Ellipse(shape)
            | ElementKind::Line(shape)
            | ElementKind::Arrow(shape) => {
                shape.x = self.x.unwrap_or(shape.x);
                shape.y = self.y.unwrap_or(shape.y);
                shape.width = self.width.unwrap_or(shape.width);
                shape.height = self.height.unwrap_or(shape.height);
            }
            ElementKind::Text(text) => {
                text.x = self.x.unwrap_or(text.x);
                text.y = self.y.unwrap_or(text.y);
                if let Some(content) = &self.text {
                    text.text.clone_from(content);
                }
                text.font_size = self.font_size.unwrap_or(text.font_size);
            }
            ElementKind::Group(group) => {
                // The box follows the members, so width and height are ignored.
                let dx = self.x.map_or(0.0, |x| x - group.x);
                let dy = self.y.map_or(0.0, |y| y - group.y);
                group.translate(dx, dy);
            }
        }
    }
}
