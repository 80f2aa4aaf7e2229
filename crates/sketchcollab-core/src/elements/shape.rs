//! Box-anchored shapes: rectangle, ellipse, line and arrow.

use kurbo::{Line, Point, Rect};
use serde::{Deserialize, Serialize};

/// Length of each arrowhead segment in world units.
pub const ARROW_HEAD_LENGTH: f64 = 20.0;
/// Angle between the shaft and each arrowhead segment (30 degrees).
pub const ARROW_HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;

/// Anchor plus signed extent.
///
/// For rectangles and ellipses the extent describes the box; for lines and
/// arrows it is the vector from the start point to the end point, so the
/// sign carries direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl BoxShape {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from two corner (or end) points.
    pub fn from_points(start: Point, end: Point) -> Self {
        Self::new(start.x, start.y, end.x - start.x, end.y - start.y)
    }

    pub fn start(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Bounding box with positive extents.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.start(), self.end())
    }

    /// Same box rewritten so width and height are non-negative.
    pub fn normalized(&self) -> Self {
        let rect = self.bounds();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    /// Distance from start to end.
    pub fn length(&self) -> f64 {
        self.width.hypot(self.height)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// The two arrowhead segments at the end point, ±30° off the shaft.
    pub fn arrow_head(&self) -> [Line; 2] {
        let end = self.end();
        let angle = self.height.atan2(self.width);
        let wing = |offset: f64| {
            let a = angle + offset;
            Line::new(
                end,
                Point::new(
                    end.x - ARROW_HEAD_LENGTH * a.cos(),
                    end.y - ARROW_HEAD_LENGTH * a.sin(),
                ),
            )
        };
        [wing(-ARROW_HEAD_ANGLE), wing(ARROW_HEAD_ANGLE)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized() {
        let shape = BoxShape::new(10.0, 10.0, -4.0, 6.0).normalized();
        assert_eq!(shape, BoxShape::new(6.0, 10.0, 4.0, 6.0));
    }

    #[test]
    fn test_length() {
        assert!((BoxShape::new(0.0, 0.0, 3.0, -4.0).length() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_arrow_head_horizontal() {
        let shaft = BoxShape::new(0.0, 0.0, 100.0, 0.0);
        let [a, b] = shaft.arrow_head();
        assert_eq!(a.p0, Point::new(100.0, 0.0));
        let dx = 20.0 * ARROW_HEAD_ANGLE.cos();
        let dy = 20.0 * ARROW_HEAD_ANGLE.sin();
        assert!((a.p1.x - (100.0 - dx)).abs() < 1e-9);
        assert!((a.p1.y - dy).abs() < 1e-9);
        assert!((b.p1.x - (100.0 - dx)).abs() < 1e-9);
        assert!((b.p1.y + dy).abs() < 1e-9);
    }
}
