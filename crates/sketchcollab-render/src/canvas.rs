//! Host-side canvas pass: background, view transform, grid, document, selection.

use crate::pipeline::{RenderDocument, render_frame_elements};
use crate::renderer::{GridStyle, RenderSurface, StrokeParams};
use kurbo::{BezPath, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use sketchcollab_core::{DrawingEngine, FrameRequest, SerializableColor, ViewTransform};

/// Smallest on-screen grid spacing in pixels.
pub const GRID_MIN_SPACING: f64 = 10.0;
/// Largest on-screen grid spacing in pixels.
pub const GRID_MAX_SPACING: f64 = 100.0;

const GRID_ALPHA: f64 = 0.5;
const GRID_DOT_RADIUS: f64 = 1.5;

/// Colors and grid settings used when drawing the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderStyle {
    pub background: SerializableColor,
    /// Used by freehand strokes, lines, arrows and text without a stroke color.
    pub default_stroke: SerializableColor,
    pub grid_color: SerializableColor,
    pub selection_color: SerializableColor,
    pub grid: GridStyle,
    /// World-space grid spacing at scale 1.
    pub grid_size: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: SerializableColor::new(0x1a, 0x1a, 0x1a, 255),
            default_stroke: SerializableColor::white(),
            grid_color: SerializableColor::new(0x33, 0x33, 0x33, 255),
            selection_color: SerializableColor::new(0x00, 0x7b, 0xff, 255),
            grid: GridStyle::Lines,
            grid_size: 20.0,
        }
    }
}

impl RenderStyle {
    pub fn with_background(mut self, color: SerializableColor) -> Self {
        self.background = color;
        self
    }

    pub fn with_default_stroke(mut self, color: SerializableColor) -> Self {
        self.default_stroke = color;
        self
    }

    pub fn with_grid_color(mut self, color: SerializableColor) -> Self {
        self.grid_color = color;
        self
    }

    pub fn with_selection_color(mut self, color: SerializableColor) -> Self {
        self.selection_color = color;
        self
    }

    pub fn with_grid(mut self, grid: GridStyle) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_grid_size(mut self, grid_size: f64) -> Self {
        self.grid_size = grid_size;
        self
    }
}

/// Grid spacing adapted by powers of two so that it stays within
/// [`GRID_MIN_SPACING`, `GRID_MAX_SPACING`] pixels on screen.
pub fn grid_spacing(base: f64, scale: f64) -> f64 {
    let mut size = base;
    if !(size > 0.0 && scale > 0.0 && size.is_finite() && scale.is_finite()) {
        return size;
    }
    while size * scale < GRID_MIN_SPACING {
        size *= 2.0;
    }
    while size * scale > GRID_MAX_SPACING {
        size /= 2.0;
    }
    size
}

/// Draws the full canvas for a viewport.
#[derive(Debug, Clone)]
pub struct CanvasRenderer {
    style: RenderStyle,
    view: ViewTransform,
    viewport: Size,
}

impl CanvasRenderer {
    pub fn new(viewport: Size) -> Self {
        Self {
            style: RenderStyle::default(),
            view: ViewTransform::default(),
            viewport,
        }
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_view(mut self, view: ViewTransform) -> Self {
        self.view = view;
        self
    }

    pub fn with_grid(mut self, grid: GridStyle) -> Self {
        self.style.grid = grid;
        self
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Draw the whole canvas: background, grid, document and selection.
    pub fn render(&self, surface: &mut dyn RenderSurface, engine: &DrawingEngine) {
        surface.clear(self.style.background.into());
        surface.save();
        surface.transform(self.view.affine());
        self.render_grid(surface);
        engine.render(surface, &self.style, self.view.scale);
        surface.restore();
    }

    /// Draw an animation frame.
    ///
    /// A full request draws the canvas as usual. A partial request draws the
    /// revealed elements in the order given, without grid or selection.
    pub fn render_frame(
        &self,
        surface: &mut dyn RenderSurface,
        engine: &DrawingEngine,
        frame: &FrameRequest,
    ) {
        match frame {
            FrameRequest::Full => self.render(surface, engine),
            FrameRequest::Partial(elements) => {
                surface.clear(self.style.background.into());
                surface.save();
                surface.transform(self.view.affine());
                render_frame_elements(surface, elements, &self.style);
                surface.restore();
            }
        }
    }

    fn render_grid(&self, surface: &mut dyn RenderSurface) {
        if self.style.grid == GridStyle::None || !(self.view.scale > 0.0) {
            return;
        }
        let size = grid_spacing(self.style.grid_size, self.view.scale);
        let visible = self.view.visible_world_rect(self.viewport);
        if !(size > 0.0 && size.is_finite() && visible.is_finite()) {
            log::debug!("Skipping grid for view {:?}", self.view);
            return;
        }
        let start_x = (visible.x0 / size).floor() * size;
        let start_y = (visible.y0 / size).floor() * size;
        let columns = grid_steps(start_x, visible.x1, size);
        let rows = grid_steps(start_y, visible.y1, size);
        let color = self.style.grid_color;

        surface.save();
        surface.set_alpha(GRID_ALPHA);
        match self.style.grid {
            GridStyle::Lines => {
                let mut path = BezPath::new();
                for i in 0..=columns {
                    let x = start_x + i as f64 * size;
                    path.move_to(Point::new(x, visible.y0));
                    path.line_to(Point::new(x, visible.y1));
                }
                for j in 0..=rows {
                    let y = start_y + j as f64 * size;
                    path.move_to(Point::new(visible.x0, y));
                    path.line_to(Point::new(visible.x1, y));
                }
                surface.stroke_path(&path, &StrokeParams::new(color, 1.0 / self.view.scale));
            }
            GridStyle::Dots => {
                let radius = GRID_DOT_RADIUS / self.view.scale;
                for i in 0..=columns {
                    let x = start_x + i as f64 * size;
                    for j in 0..=rows {
                        let y = start_y + j as f64 * size;
                        surface.fill_rect(
                            Rect::new(x - radius, y - radius, x + radius, y + radius),
                            color.into(),
                        );
                    }
                }
            }
            GridStyle::None => {}
        }
        surface.restore();
    }
}

/// Grid steps of `size` from `start` up to the first multiple at or past `end`.
/// Far from the origin `x + size` can round back to `x`, so steps are counted.
fn grid_steps(start: f64, end: f64, size: f64) -> usize {
    ((end / size).ceil() - start / size).round().max(0.0) as usize
}
