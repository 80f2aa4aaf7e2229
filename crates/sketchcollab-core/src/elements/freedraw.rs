//! Freehand stroke element.

use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// A single sampled point of a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Input pressure in `[0, 1]`, when the device reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    /// Rendering width of the segment starting at this point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: None,
            width: None,
        }
    }

    /// Attach pressure and the width derived from it.
    pub fn with_pressure(mut self, pressure: f64, width: f64) -> Self {
        self.pressure = Some(pressure.clamp(0.0, 1.0));
        self.width = Some(width);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

impl From<Point> for StrokePoint {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

/// Wire forms accepted for a point: `[x, y]` or `{x, y, pressure?, width?}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Pair(Vec<f64>),
    Object {
        x: f64,
        y: f64,
        #[serde(default)]
        pressure: Option<f64>,
        #[serde(default)]
        width: Option<f64>,
    },
}

impl TryFrom<RawPoint> for StrokePoint {
    type Error = String;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        match raw {
            RawPoint::Pair(coords) => match coords.as_slice() {
                [x, y, ..] => Ok(StrokePoint::new(*x, *y)),
                _ => Err(format!("point needs two coordinates, got {}", coords.len())),
            },
            RawPoint::Object {
                x,
                y,
                pressure,
                width,
            } => Ok(StrokePoint {
                x,
                y,
                pressure,
                width,
            }),
        }
    }
}

/// A freehand stroke (ordered series of points).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Freedraw {
    #[serde(default)]
    pub points: Vec<StrokePoint>,
}

impl Freedraw {
    pub fn new(points: Vec<StrokePoint>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: StrokePoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether any point carries its own rendering width.
    pub fn has_variable_width(&self) -> bool {
        self.points.iter().any(|p| p.width.is_some())
    }

    /// Min/max of all points; `None` for an empty stroke.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let init = Rect::from_points(first.position(), first.position());
        Some(
            self.points
                .iter()
                .skip(1)
                .fold(init, |acc, p| acc.union_pt(p.position())),
        )
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for point in &mut self.points {
            point.translate(dx, dy);
        }
    }

    /// The stroke as one open polyline.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut iter = self.points.iter();
        if let Some(first) = iter.next() {
            path.move_to(first.position());
            for point in iter {
                path.line_to(point.position());
            }
        }
        path
    }

    /// A copy holding only the first `count` points.
    pub fn truncated(&self, count: usize) -> Self {
        Self {
            points: self.points.iter().take(count).copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_min_max() {
        let stroke = Freedraw::new(vec![
            StrokePoint::new(5.0, 10.0),
            StrokePoint::new(-5.0, 20.0),
            StrokePoint::new(15.0, 0.0),
        ]);
        assert_eq!(stroke.bounds(), Some(Rect::new(-5.0, 0.0, 15.0, 20.0)));
    }

    #[test]
    fn test_single_point_bounds_are_degenerate() {
        let stroke = Freedraw::new(vec![StrokePoint::new(3.0, 4.0)]);
        assert_eq!(stroke.bounds(), Some(Rect::new(3.0, 4.0, 3.0, 4.0)));
    }

    #[test]
    fn test_point_forms_deserialize() {
        let points: Vec<StrokePoint> =
            serde_json::from_str(r#"[[1, 2], {"x": 3, "y": 4, "pressure": 0.25}]"#).unwrap();
        assert_eq!(points[0], StrokePoint::new(1.0, 2.0));
        assert_eq!(points[1].pressure, Some(0.25));
        assert_eq!(points[1].width, None);
    }

    #[test]
    fn test_short_pair_rejected() {
        assert!(serde_json::from_str::<StrokePoint>("[1]").is_err());
    }

    #[test]
    fn test_points_serialize_as_objects() {
        let json = serde_json::to_value(StrokePoint::new(1.0, 2.0)).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1.0, "y": 2.0}));
    }

    #[test]
    fn test_translate_and_truncate() {
        let mut stroke = Freedraw::new(vec![
            StrokePoint::new(0.0, 0.0),
            StrokePoint::new(1.0, 1.0).with_width(2.0),
        ]);
        stroke.translate(10.0, 20.0);
        assert_eq!(stroke.points[1].position(), Point::new(11.0, 21.0));
        assert!(stroke.has_variable_width());
        assert_eq!(stroke.truncated(1).len(), 1);
        assert_eq!(stroke.truncated(10).len(), 2);
    }
}
