//! View transform for pan/zoom.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom level.
pub const MIN_SCALE: f64 = 0.1;
/// Maximum allowed zoom level.
pub const MAX_SCALE: f64 = 10.0;
/// Screen-space padding kept around content when fitting.
pub const FIT_PADDING: f64 = 50.0;
/// Fitting never zooms in past this level.
pub const MAX_FIT_SCALE: f64 = 2.0;

/// Pan offset and zoom mapping world coordinates to screen coordinates.
///
/// `screen = world * scale + (x, y)`. Owned by the host; the document
/// engine only reads it.
///
/// Deserialized views go through [`ViewTransform::new`], so a saved scale
/// outside `[MIN_SCALE, MAX_SCALE]` is clamped on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawViewTransform")]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

/// Wire form of [`ViewTransform`] before validation.
#[derive(Deserialize)]
struct RawViewTransform {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default = "default_scale")]
    scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl From<RawViewTransform> for ViewTransform {
    fn from(raw: RawViewTransform) -> Self {
        Self::new(raw.x, raw.y, raw.scale)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    /// Non-finite components fall back to the identity values.
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Self {
            x: finite_or(x, 0.0),
            y: finite_or(y, 0.0),
            scale: finite_or(scale, 1.0).clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// World-to-screen affine transform for rendering.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.offset()) * Affine::scale(self.scale)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        Point::new(
            (screen_point.x - self.x) / self.scale,
            (screen_point.y - self.y) / self.scale,
        )
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.affine() * world_point
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Zoom by `factor`, keeping the world point under `screen_center` fixed.
    pub fn zoom_at(&mut self, factor: f64, screen_center: Point) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }
        let world_point = self.screen_to_world(screen_center);
        self.scale = new_scale;
        self.x = screen_center.x - world_point.x * new_scale;
        self.y = screen_center.y - world_point.y * new_scale;
    }

    /// Set the scale directly, clamped to the allowed range.
    ///
    /// A non-finite scale is ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
    }

    /// Reset to the identity view.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Center `bounds` in `viewport` with padding, never zooming past 2x.
    ///
    /// Zero-area bounds leave the transform unchanged.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size) {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }

        let available = Size::new(
            (viewport.width - FIT_PADDING * 2.0).max(1.0),
            (viewport.height - FIT_PADDING * 2.0).max(1.0),
        );
        let scale_x = available.width / bounds.width();
        let scale_y = available.height / bounds.height();
        self.scale = scale_x
            .min(scale_y)
            .min(MAX_FIT_SCALE)
            .clamp(MIN_SCALE, MAX_SCALE);

        let center = bounds.center();
        self.x = viewport.width / 2.0 - center.x * self.scale;
        self.y = viewport.height / 2.0 - center.y * self.scale;
    }

    /// World-space rectangle visible in a viewport of the given size.
    pub fn visible_world_rect(&self, viewport: Size) -> Rect {
        Rect::from_points(
            self.screen_to_world(Point::ZERO),
            self.screen_to_world(Point::new(viewport.width, viewport.height)),
        )
    }
}
