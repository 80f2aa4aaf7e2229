//! Group element owning its members.

use super::{Element, union_bounds};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A group of elements manipulated as a single unit.
///
/// Members are owned by the group and do not appear in the document store.
/// Their z-order is independent of the group's own z-order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(rename = "elements", default)]
    pub members: Vec<Element>,
}

impl Group {
    /// Build a group whose box is the union of the members' bounds.
    ///
    /// Members without bounds leave the box at the default.
    pub fn from_members(members: Vec<Element>) -> Self {
        match union_bounds(&members) {
            Some(bounds) => Self {
                x: bounds.x0,
                y: bounds.y0,
                width: bounds.width(),
                height: bounds.height(),
                members,
            },
            None => Self {
                members,
                ..Self::default()
            },
        }
    }

    pub fn members(&self) -> &[Element] {
        &self.members
    }

    /// The stored group box, or `None` when no member has bounds.
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(&self.members)?;
        Some(Rect::from_points(
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y + self.height),
        ))
    }

    /// Move the anchor and every member, recursively.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        for member in &mut self.members {
            member.translate(dx, dy);
        }
    }
}
