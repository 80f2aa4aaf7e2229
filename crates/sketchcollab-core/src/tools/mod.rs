//! Drawing tools that drive the document engine from pointer input.

use crate::elements::{
    BoxShape, Element, ElementId, ElementKind, Fill, SerializableColor, StrokePoint, Text,
    now_millis,
};
use crate::engine::DrawingEngine;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Shapes whose extents do not exceed this on commit are discarded.
pub const MIN_SHAPE_EXTENT: f64 = 2.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pencil,
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Text,
}

impl ToolKind {
    /// Tool bound to a single-key shortcut.
    pub fn from_shortcut(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'v' => Some(ToolKind::Select),
            'p' => Some(ToolKind::Pencil),
            'r' => Some(ToolKind::Rectangle),
            'o' => Some(ToolKind::Ellipse),
            'l' => Some(ToolKind::Line),
            'a' => Some(ToolKind::Arrow),
            't' => Some(ToolKind::Text),
            _ => None,
        }
    }
}

/// Style applied to newly created elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolStyle {
    pub stroke_color: SerializableColor,
    pub fill_color: SerializableColor,
    pub fill_transparent: bool,
    pub stroke_width: f64,
    pub font_size: f64,
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::white(),
            fill_color: SerializableColor::black(),
            fill_transparent: true,
            stroke_width: 2.0,
            font_size: 16.0,
        }
    }
}

impl ToolStyle {
    pub fn with_stroke_color(mut self, color: SerializableColor) -> Self {
        self.stroke_color = color;
        self
    }

    pub fn with_fill_color(mut self, color: SerializableColor) -> Self {
        self.fill_color = color;
        self.fill_transparent = false;
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// The fill new shapes receive.
    pub fn fill(&self) -> Fill {
        if self.fill_transparent {
            Fill::Transparent
        } else {
            Fill::Color(self.fill_color)
        }
    }

    /// Segment width for a pressure sample.
    pub fn pressure_width(&self, pressure: f64) -> f64 {
        self.stroke_width * (0.5 + pressure * 0.5)
    }
}

/// A pointer sample in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    /// Device pressure in `[0, 1]`; absent means full pressure.
    pub pressure: Option<f64>,
}

impl PointerEvent {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            pressure: None,
        }
    }

    pub fn with_pressure(position: Point, pressure: f64) -> Self {
        Self {
            position,
            pressure: Some(pressure),
        }
    }

    fn pressure_or_full(&self) -> f64 {
        self.pressure
            .filter(|p| *p > 0.0)
            .map_or(1.0, |p| p.clamp(0.0, 1.0))
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    /// Waiting for a press.
    #[default]
    Idle,
    /// Collecting pencil points.
    Stroke { points: Vec<StrokePoint> },
    /// Dragging out a shape from `start`.
    Shape { start: Point, current: Point },
    /// Moving an element with the select tool.
    Drag {
        id: ElementId,
        last: Point,
        moved: bool,
    },
}

/// Translates pointer input into engine operations for the current tool.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    current_tool: ToolKind,
    pub style: ToolStyle,
    state: ToolState,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_tool(&self) -> ToolKind {
        self.current_tool
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    /// Switch tools, abandoning any interaction in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.state != ToolState::Idle
    }

    /// Abandon the current interaction without touching the document.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }

    pub fn pointer_down(&mut self, engine: &mut DrawingEngine, event: PointerEvent) {
        let point = event.position;
        self.state = match self.current_tool {
            ToolKind::Select => self.begin_selection(engine, point),
            ToolKind::Pencil => ToolState::Stroke {
                points: vec![StrokePoint::from(point)],
            },
            ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Line | ToolKind::Arrow => {
                ToolState::Shape {
                    start: point,
                    current: point,
                }
            }
            // Text is placed explicitly with `create_text`.
            ToolKind::Text => ToolState::Idle,
        };
    }

    fn begin_selection(&self, engine: &mut DrawingEngine, point: Point) -> ToolState {
        let Some(id) = engine.element_at_point(point).map(|e| e.id.clone()) else {
            engine.clear_selection();
            return ToolState::Idle;
        };
        if !engine.is_selected(&id) {
            engine.clear_selection();
            engine.select_element(&id);
        }
        ToolState::Drag {
            id,
            last: point,
            moved: false,
        }
    }

    pub fn pointer_move(&mut self, engine: &mut DrawingEngine, event: PointerEvent) {
        let point = event.position;
        match &mut self.state {
            ToolState::Idle => {}
            ToolState::Stroke { points } => {
                let pressure = event.pressure_or_full();
                let width = self.style.pressure_width(pressure);
                points.push(StrokePoint::from(point).with_pressure(pressure, width));
            }
            ToolState::Shape { current, .. } => *current = point,
            ToolState::Drag { id, last, moved } => {
                let dx = point.x - last.x;
                let dy = point.y - last.y;
                if engine.move_element(id, dx, dy) {
                    *moved = true;
                }
                *last = point;
            }
        }
    }

    /// Finish the interaction. Returns the identity of a created element.
    pub fn pointer_up(&mut self, engine: &mut DrawingEngine, event: PointerEvent) -> Option<ElementId> {
        if let ToolState::Shape { current, .. } = &mut self.state {
            *current = event.position;
        }
        match std::mem::take(&mut self.state) {
            ToolState::Idle => None,
            ToolState::Stroke { points } => {
                if points.len() < 2 {
                    log::debug!("Discarding stroke with {} points", points.len());
                    return None;
                }
                let stroke = Element::freedraw(points)
                    .with_stroke(self.style.stroke_color, self.style.stroke_width)
                    .with_timestamp(now_millis());
                Some(engine.add_element(stroke))
            }
            ToolState::Shape { start, current } => {
                let shape = self.committed_shape(start, current)?;
                Some(engine.add_element(shape))
            }
            ToolState::Drag { moved, .. } => {
                if moved {
                    engine.commit_history();
                }
                None
            }
        }
    }

    /// Place a text element. Blank content is ignored.
    pub fn create_text(
        &self,
        engine: &mut DrawingEngine,
        point: Point,
        content: &str,
    ) -> Option<ElementId> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        let text = Text::new(point.x, point.y, content).with_font_size(self.style.font_size);
        let mut element = Element::new(ElementKind::Text(text)).with_timestamp(now_millis());
        element.stroke_color = Some(self.style.stroke_color);
        Some(engine.add_element(element))
    }

    /// The element being drawn, for live preview.
    pub fn preview(&self) -> Option<Element> {
        match &self.state {
            ToolState::Stroke { points } if points.len() >= 2 => Some(
                Element::freedraw(points.clone())
                    .with_stroke(self.style.stroke_color, self.style.stroke_width),
            ),
            ToolState::Shape { start, current } => Some(self.shape_element(*start, *current)),
            _ => None,
        }
    }

    fn shape_element(&self, start: Point, end: Point) -> Element {
        let extent = BoxShape::from_points(start, end);
        let kind = match self.current_tool {
            ToolKind::Ellipse => ElementKind::Ellipse(extent.normalized()),
            ToolKind::Line => ElementKind::Line(extent),
            ToolKind::Arrow => ElementKind::Arrow(extent),
            _ => ElementKind::Rectangle(extent.normalized()),
        };
        Element::new(kind)
            .with_stroke(self.style.stroke_color, self.style.stroke_width)
            .with_fill(self.style.fill())
            .with_timestamp(now_millis())
    }

    /// The shape to commit, or `None` when it is too small.
    fn committed_shape(&self, start: Point, end: Point) -> Option<Element> {
        let extent = BoxShape::from_points(start, end);
        let big_enough = match self.current_tool {
            ToolKind::Line | ToolKind::Arrow => extent.length() > MIN_SHAPE_EXTENT,
            _ => extent.width.abs() > MIN_SHAPE_EXTENT && extent.height.abs() > MIN_SHAPE_EXTENT,
        };
        if !big_enough {
            log::debug!("Discarding degenerate {:?}", self.current_tool);
            return None;
        }
        Some(self.shape_element(start, end))
    }
}
