//! Marquee selection rectangle.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Screen-space rectangle dragged out on the background in select mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marquee {
    pub start: Point,
    pub current: Point,
}

impl Marquee {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            current: start,
        }
    }

    pub fn extend_to(&mut self, point: Point) {
        self.current = point;
    }

    /// Normalized rectangle between the two corners.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }
}
