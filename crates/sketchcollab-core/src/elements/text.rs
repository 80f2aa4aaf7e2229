//! Text element.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Font size used when an element does not specify one.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Average glyph advance as a fraction of the font size.
pub const TEXT_WIDTH_FACTOR: f64 = 0.6;

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

/// A single line of text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

impl Text {
    pub fn new(x: f64, y: f64, content: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: content.into(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Estimated bounds: character count times font size times 0.6, by one
    /// font size tall. Not exact glyph metrics.
    pub fn bounds(&self) -> Rect {
        let width = self.text.chars().count() as f64 * self.font_size * TEXT_WIDTH_FACTOR;
        Rect::new(self.x, self.y, self.x + width, self.y + self.font_size)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}
