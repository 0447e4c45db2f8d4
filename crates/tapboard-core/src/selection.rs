//! Selection handles and corner resize.

use crate::camera::Camera;
use crate::shapes::{MIN_H, MIN_W, Shape, ShapeId};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Visible handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 12.0;
/// Handle hit box size in screen pixels. Larger than the visible square so
/// fingers can grab it.
pub const HANDLE_HIT_SIZE: f64 = 36.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    Nw,
    Ne,
    Se,
    Sw,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Se, Corner::Sw];

    /// The corner diagonally across, which stays fixed while this one is dragged.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::Nw => Corner::Se,
            Corner::Ne => Corner::Sw,
            Corner::Se => Corner::Nw,
            Corner::Sw => Corner::Ne,
        }
    }

    /// Position of this corner on a rectangle.
    pub fn of(self, rect: Rect) -> Point {
        match self {
            Corner::Nw => Point::new(rect.x0, rect.y0),
            Corner::Ne => Point::new(rect.x1, rect.y0),
            Corner::Se => Point::new(rect.x1, rect.y1),
            Corner::Sw => Point::new(rect.x0, rect.y1),
        }
    }
}

/// A resize handle with its position in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    pub shape_id: ShapeId,
    pub corner: Corner,
    pub position: Point,
}

impl Handle {
    /// Screen-space hit box of this handle.
    pub fn hit_box(&self, camera: &Camera, hit_size: f64) -> Rect {
        let center = camera.world_to_screen(self.position);
        Rect::from_center_size(center, Size::new(hit_size, hit_size))
    }
}

/// Corner handles for a shape.
pub fn corner_handles(shape: &Shape) -> Vec<Handle> {
    let bounds = shape.bounds();
    Corner::ALL
        .iter()
        .map(|&corner| Handle {
            shape_id: shape.id(),
            corner,
            position: corner.of(bounds),
        })
        .collect()
}

/// Find the handle whose hit box contains `screen_point`.
///
/// Hit boxes of small shapes overlap; the handle closest to the point wins.
pub fn hit_test_handles(
    shape: &Shape,
    camera: &Camera,
    screen_point: Point,
    hit_size: f64,
) -> Option<Corner> {
    corner_handles(shape)
        .into_iter()
        .filter(|handle| handle.hit_box(camera, hit_size).contains(screen_point))
        .map(|handle| {
            let center = camera.world_to_screen(handle.position);
            (handle.corner, (center - screen_point).hypot2())
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(corner, _)| corner)
}

/// Resize `bounds` by dragging `corner` by an incremental world delta.
///
/// The anchor is taken from the box before the change, the new size is
/// clamped to the minimum, and the moving edges are placed relative to the
/// anchor, so the opposite corner never moves even when the clamp engages.
pub fn apply_corner_resize(bounds: Rect, corner: Corner, delta: Vec2) -> Rect {
    let (x, y, w, h) = (bounds.x0, bounds.y0, bounds.width(), bounds.height());
    let right = x + w;
    let bottom = y + h;
    match corner {
        Corner::Se => {
            let new_w = (w + delta.x).max(MIN_W);
            let new_h = (h + delta.y).max(MIN_H);
            Rect::new(x, y, x + new_w, y + new_h)
        }
        Corner::Sw => {
            let new_w = (w - delta.x).max(MIN_W);
            let new_h = (h + delta.y).max(MIN_H);
            Rect::new(right - new_w, y, right, y + new_h)
        }
        Corner::Ne => {
            let new_w = (w + delta.x).max(MIN_W);
            let new_h = (h - delta.y).max(MIN_H);
            Rect::new(x, bottom - new_h, x + new_w, bottom)
        }
        Corner::Nw => {
            let new_w = (w - delta.x).max(MIN_W);
            let new_h = (h - delta.y).max(MIN_H);
            Rect::new(right - new_w, bottom - new_h, right, bottom)
        }
    }
}
