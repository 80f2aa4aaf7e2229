//! Element definitions for the drawing document.

mod color;
mod freedraw;
mod group;
mod patch;
mod shape;
mod text;

pub use color::{ColorParseError, Fill, SerializableColor};
pub use freedraw::{Freedraw, StrokePoint};
pub use group::Group;
pub use patch::ElementPatch;
pub use shape::{ARROW_HEAD_ANGLE, ARROW_HEAD_LENGTH, BoxShape};
pub use text::{DEFAULT_FONT_SIZE, TEXT_WIDTH_FACTOR, Text};

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for elements.
///
/// An empty identifier means "not assigned yet"; the engine fills it in on
/// ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Create an identifier from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(format!("element_{}", Uuid::new_v4().simple()))
    }

    /// Whether no identifier has been assigned yet.
    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Type tag of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Freedraw,
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Text,
    Group,
}

impl ElementType {
    /// Wire name of the type tag.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Freedraw => "freedraw",
            ElementType::Rectangle => "rectangle",
            ElementType::Ellipse => "ellipse",
            ElementType::Line => "line",
            ElementType::Arrow => "arrow",
            ElementType::Text => "text",
            ElementType::Group => "group",
        }
    }
}

/// Variant-specific geometry of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Freedraw(Freedraw),
    Rectangle(BoxShape),
    Ellipse(BoxShape),
    Line(BoxShape),
    Arrow(BoxShape),
    Text(Text),
    Group(Group),
}

/// A drawable unit in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Identity, stable for the life of the element.
    #[serde(default, skip_serializing_if = "ElementId::is_unassigned")]
    pub id: ElementId,
    /// Variant geometry, tagged by `type` on the wire.
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Paint and hit-test precedence. `None` until the engine assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<SerializableColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Fill for closed shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Fill>,
    /// Opacity in `[0, 1]`; absent means fully opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Creation time in milliseconds since the UNIX epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl Element {
    /// Create an element with no identity, z-order or style.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::default(),
            kind,
            z_index: None,
            stroke_color: None,
            stroke_width: None,
            background_color: None,
            opacity: None,
            timestamp: None,
        }
    }

    pub fn freedraw(points: Vec<StrokePoint>) -> Self {
        Self::new(ElementKind::Freedraw(Freedraw::new(points)))
    }

    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Rectangle(BoxShape::new(x, y, width, height)))
    }

    pub fn ellipse(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Ellipse(BoxShape::new(x, y, width, height)))
    }

    pub fn line(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Line(BoxShape::new(x, y, width, height)))
    }

    pub fn arrow(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Arrow(BoxShape::new(x, y, width, height)))
    }

    pub fn text(x: f64, y: f64, content: impl Into<String>) -> Self {
        Self::new(ElementKind::Text(Text::new(x, y, content)))
    }

    /// Set the identity (builder style).
    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn with_stroke(mut self, color: SerializableColor, width: f64) -> Self {
        self.stroke_color = Some(color);
        self.stroke_width = Some(width);
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.background_color = Some(fill);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity.clamp(0.0, 1.0));
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The z-order used for sorting; absent values sort as 0.
    pub fn z(&self) -> i64 {
        self.z_index.unwrap_or(0)
    }

    pub fn element_type(&self) -> ElementType {
        match &self.kind {
            ElementKind::Freedraw(_) => ElementType::Freedraw,
            ElementKind::Rectangle(_) => ElementType::Rectangle,
            ElementKind::Ellipse(_) => ElementType::Ellipse,
            ElementKind::Line(_) => ElementType::Line,
            ElementKind::Arrow(_) => ElementType::Arrow,
            ElementKind::Text(_) => ElementType::Text,
            ElementKind::Group(_) => ElementType::Group,
        }
    }

    pub fn is_freedraw(&self) -> bool {
        matches!(self.kind, ElementKind::Freedraw(_))
    }

    pub fn as_freedraw(&self) -> Option<&Freedraw> {
        match &self.kind {
            ElementKind::Freedraw(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group(_))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            ElementKind::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Axis-aligned bounding box in world coordinates.
    ///
    /// Returns `None` for an element that has no extent yet (an empty stroke).
    pub fn bounds(&self) -> Option<Rect> {
        match &self.kind {
            ElementKind::Freedraw(f) => f.bounds(),
            ElementKind::Rectangle(s)
            | ElementKind::Ellipse(s)
            | ElementKind::Line(s)
            | ElementKind::Arrow(s) => Some(s.bounds()),
            ElementKind::Text(t) => Some(t.bounds()),
            ElementKind::Group(g) => g.bounds(),
        }
    }

    /// Inclusive bounding-box containment, the hit-test used for selection.
    pub fn contains_point(&self, point: Point) -> bool {
        self.bounds().is_some_and(|b| {
            point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
        })
    }

    /// Translate the element's geometry by a delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match &mut self.kind {
            ElementKind::Freedraw(f) => f.translate(dx, dy),
            ElementKind::Rectangle(s)
            | ElementKind::Ellipse(s)
            | ElementKind::Line(s)
            | ElementKind::Arrow(s) => s.translate(dx, dy),
            ElementKind::Text(t) => t.translate(dx, dy),
            ElementKind::Group(g) => g.translate(dx, dy),
        }
    }
}

/// Union of the bounding boxes of the given elements, skipping unbounded ones.
pub fn union_bounds<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Option<Rect> {
    elements
        .into_iter()
        .filter_map(Element::bounds)
        .reduce(|acc, b| acc.union(b))
}

/// Current wall-clock time in milliseconds since the UNIX epoch.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = ElementId::generate();
        let b = ElementId::generate();
        assert_ne!(a, b);
        assert!(!a.is_unassigned());
        assert!(ElementId::default().is_unassigned());
    }

    #[test]
    fn test_rectangle_bounds_normalized() {
        let rect = Element::rectangle(100.0, 100.0, -50.0, -20.0);
        let bounds = rect.bounds().unwrap();
        assert!((bounds.x0 - 50.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 80.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stroke_has_no_bounds() {
        let stroke = Element::freedraw(Vec::new());
        assert!(stroke.bounds().is_none());
        assert!(!stroke.contains_point(Point::ZERO));
    }

    #[test]
    fn test_contains_point_is_inclusive() {
        let rect = Element::rectangle(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_point(Point::new(10.0, 10.0)));
        assert!(rect.contains_point(Point::new(0.0, 5.0)));
        assert!(!rect.contains_point(Point::new(10.5, 5.0)));
    }

    #[test]
    fn test_union_bounds() {
        let elements = vec![
            Element::rectangle(0.0, 0.0, 10.0, 10.0),
            Element::freedraw(Vec::new()),
            Element::ellipse(20.0, 30.0, 5.0, 5.0),
        ];
        let bounds = union_bounds(&elements).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 25.0, 35.0));
        assert!(union_bounds(&Vec::<Element>::new()).is_none());
    }

    #[test]
    fn test_element_json_shape() {
        let element = Element::rectangle(1.0, 2.0, 3.0, 4.0)
            .with_id("element_1")
            .with_z_index(3)
            .with_fill(Fill::Transparent);
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "rectangle");
        assert_eq!(json["id"], "element_1");
        assert_eq!(json["zIndex"], 3);
        assert_eq!(json["backgroundColor"], "transparent");
        assert_eq!(json["width"], 3.0);
    }

    #[test]
    fn test_element_from_loose_json() {
        let json = r##"{
            "type": "freedraw",
            "points": [[0, 0], {"x": 5, "y": 5, "pressure": 0.5, "width": 1.5}],
            "strokeColor": "#ff0000",
            "strokeWidth": 3
        }"##;
        let element: Element = serde_json::from_str(json).unwrap();
        assert!(element.id.is_unassigned());
        assert!(element.z_index.is_none());
        let stroke = element.as_freedraw().unwrap();
        assert_eq!(stroke.points.len(), 2);
        assert_eq!(stroke.points[1].width, Some(1.5));
        assert_eq!(element.stroke_color, Some(SerializableColor::new(255, 0, 0, 255)));
    }

    #[test]
    fn test_translate_text() {
        let mut text = Element::text(10.0, 10.0, "hi");
        text.translate(5.0, -5.0);
        let bounds = text.bounds().unwrap();
        assert!((bounds.x0 - 15.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 5.0).abs() < f64::EPSILON);
    }
}
