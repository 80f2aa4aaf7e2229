//! Renderer trait abstraction.

use kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Stroke};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Invalid export options: {0}")]
    InvalidOptions(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridStyle {
    /// No grid.
    None,
    /// Full grid lines.
    #[default]
    Lines,
    /// Only dots at the intersections.
    Dots,
}

impl GridStyle {
    /// Cycle to the next grid style.
    pub fn next(self) -> Self {
        match self {
            GridStyle::None => GridStyle::Lines,
            GridStyle::Lines => GridStyle::Dots,
            GridStyle::Dots => GridStyle::None,
        }
    }

    /// Get display name for this grid style.
    pub fn name(self) -> &'static str {
        match self {
            GridStyle::None => "None",
            GridStyle::Lines => "Lines",
            GridStyle::Dots => "Dots",
        }
    }
}

/// Paint and geometry of a stroke.
#[derive(Debug, Clone)]
pub struct StrokeParams {
    pub color: Color,
    pub stroke: Stroke,
}

impl StrokeParams {
    /// Butt caps and miter joins, like a fresh 2D canvas context.
    pub fn new(color: impl Into<Color>, width: f64) -> Self {
        Self {
            color: color.into(),
            stroke: Stroke::new(width)
                .with_caps(Cap::Butt)
                .with_join(Join::Miter),
        }
    }

    /// Round caps and joins, as used for freehand strokes.
    pub fn round(mut self) -> Self {
        self.stroke = self.stroke.with_caps(Cap::Round).with_join(Join::Round);
        self
    }

    /// Evenly dashed with `dash` on and `dash` off.
    pub fn dashed(mut self, dash: f64) -> Self {
        self.stroke = self.stroke.with_dashes(0.0, [dash, dash]);
        self
    }

    pub fn width(&self) -> f64 {
        self.stroke.width
    }
}

/// A 2D drawing target.
///
/// Mirrors an immediate-mode canvas: `save`/`restore` bracket the transform
/// and alpha state, and `transform` post-multiplies the current matrix.
pub trait RenderSurface {
    /// Fill the whole target with `color`, ignoring the current transform.
    fn clear(&mut self, color: Color);

    fn save(&mut self);

    fn restore(&mut self);

    fn transform(&mut self, affine: Affine);

    /// Set the global alpha for subsequent drawing in this save scope.
    fn set_alpha(&mut self, alpha: f64);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, params: &StrokeParams);

    /// Fill the ellipse inscribed in `rect`.
    fn fill_ellipse(&mut self, rect: Rect, color: Color);

    /// Stroke the ellipse inscribed in `rect`.
    fn stroke_ellipse(&mut self, rect: Rect, params: &StrokeParams);

    fn stroke_path(&mut self, path: &BezPath, params: &StrokeParams);

    /// Draw `text` with its top-left corner at `origin`.
    fn fill_text(&mut self, origin: Point, text: &str, font_size: f64, color: Color);
}
