//! Camera module for pan/zoom transforms.
//!
//! Camera gestures report motion cumulatively since the gesture started, so the
//! camera captures a [`CameraSnapshot`] when a gesture begins and recomputes its
//! transform from that snapshot on every event.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default minimum zoom level.
pub const MIN_ZOOM: f64 = 0.2;
/// Default maximum zoom level.
pub const MAX_ZOOM: f64 = 5.0;

/// Offset and zoom captured at gesture start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    pub offset: Vec2,
    pub zoom: f64,
}

/// Camera manages the view transform for the canvas.
///
/// It handles panning (translation) and zooming (scaling) operations,
/// converting between screen coordinates and world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan) in screen pixels.
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
    /// Snapshot taken when the outermost camera gesture began.
    #[serde(skip)]
    gesture_start: Option<CameraSnapshot>,
    /// Number of camera gestures in progress. Pan and pinch run together.
    #[serde(skip)]
    gesture_depth: u32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::with_limits(MIN_ZOOM, MAX_ZOOM)
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an identity camera with custom zoom limits.
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom,
            max_zoom,
            gesture_start: None,
            gesture_depth: 0,
        }
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Convert a world rectangle to screen coordinates.
    pub fn world_rect_to_screen(&self, rect: Rect) -> Rect {
        self.transform().transform_rect_bbox(rect)
    }

    /// Convert a screen-space delta to world units.
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        self.offset += delta;
    }

    /// Capture the gesture-start snapshot.
    ///
    /// Nested calls share the snapshot of the outermost gesture, so a pinch
    /// joining a running pan does not rebase the pan.
    pub fn begin_gesture(&mut self) {
        if self.gesture_depth == 0 {
            self.gesture_start = Some(self.snapshot());
        }
        self.gesture_depth += 1;
    }

    /// Release one gesture. The snapshot is dropped when the last one ends.
    /// Idempotent once nothing is in progress.
    pub fn end_gesture(&mut self) {
        self.gesture_depth = self.gesture_depth.saturating_sub(1);
        if self.gesture_depth == 0 {
            self.gesture_start = None;
        }
    }

    /// Whether a camera gesture is in progress.
    pub fn is_gesturing(&self) -> bool {
        self.gesture_start.is_some()
    }

    /// Current offset and zoom.
    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            offset: self.offset,
            zoom: self.zoom,
        }
    }

    /// Set the offset to the gesture-start offset plus the total translation
    /// since the gesture started.
    pub fn apply_cumulative_pan(&mut self, total: Vec2) {
        if !total.is_finite() {
            log::debug!("Ignoring non-finite pan translation");
            return;
        }
        let start = self.start_snapshot();
        self.offset = start.offset + total;
    }

    /// Set the zoom to the gesture-start zoom times the cumulative pinch factor, clamped.
    pub fn zoom(&mut self, raw_factor: f64) {
        if !raw_factor.is_finite() || raw_factor <= 0.0 {
            log::debug!("Ignoring invalid zoom factor {raw_factor}");
            return;
        }
        let start = self.start_snapshot();
        self.zoom = (start.zoom * raw_factor).clamp(self.min_zoom, self.max_zoom);
    }

    /// Back to identity and drop any gesture in progress. Limits are kept.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
        self.gesture_start = None;
        self.gesture_depth = 0;
    }

    fn start_snapshot(&mut self) -> CameraSnapshot {
        let current = self.snapshot();
        *self.gesture_start.get_or_insert(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
        assert!(!camera.is_gesturing());
    }

    #[test]
    fn test_screen_to_world_with_offset() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_world_to_screen_formula() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(10.0, -5.0);
        camera.zoom = 2.0;
        let screen = camera.world_to_screen(Point::new(3.0, 4.0));
        assert!((screen.x - 16.0).abs() < 1e-10);
        assert!((screen.y - 3.0).abs() < 1e-10);

        let rect = camera.world_rect_to_screen(Rect::new(0.0, 0.0, 50.0, 25.0));
        assert!((rect.x0 - 10.0).abs() < 1e-10);
        assert!((rect.width() - 100.0).abs() < 1e-10);
        assert!((rect.height() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        for zoom in [MIN_ZOOM, 0.7, 1.0, 3.3, MAX_ZOOM] {
            let mut camera = Camera::new();
            camera.offset = Vec2::new(30.0, -20.0);
            camera.zoom = zoom;

            let original = Point::new(123.0, 456.0);
            let back = camera.world_to_screen(camera.screen_to_world(original));
            assert!((back.x - original.x).abs() < 1e-9);
            assert!((back.y - original.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_screen_delta_to_world() {
        let mut camera = Camera::new();
        camera.zoom = 4.0;
        let delta = camera.screen_delta_to_world(Vec2::new(8.0, -4.0));
        assert!((delta.x - 2.0).abs() < f64::EPSILON);
        assert!((delta.y + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.begin_gesture();
        camera.zoom(100.0);
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);
        camera.end_gesture();

        let mut camera = Camera::new();
        camera.begin_gesture();
        camera.zoom(0.0001);
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_is_cumulative_from_gesture_start() {
        let mut camera = Camera::new();
        camera.zoom = 2.0;
        camera.begin_gesture();
        camera.zoom(1.5);
        camera.zoom(1.5);
        assert!((camera.zoom - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_ignores_invalid_factor() {
        let mut camera = Camera::new();
        camera.begin_gesture();
        camera.zoom(f64::NAN);
        camera.zoom(0.0);
        camera.zoom(-2.0);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cumulative_pan_uses_start_snapshot() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(5.0, 5.0);
        camera.begin_gesture();
        camera.apply_cumulative_pan(Vec2::new(10.0, 0.0));
        camera.apply_cumulative_pan(Vec2::new(20.0, 3.0));
        assert_eq!(camera.offset, Vec2::new(25.0, 8.0));
        camera.end_gesture();
        camera.end_gesture();
        assert!(!camera.is_gesturing());
    }

    #[test]
    fn test_nested_gestures_share_snapshot() {
        let mut camera = Camera::new();
        camera.begin_gesture();
        camera.apply_cumulative_pan(Vec2::new(10.0, 0.0));
        camera.begin_gesture();
        camera.zoom(2.0);
        camera.apply_cumulative_pan(Vec2::new(20.0, 0.0));
        assert_eq!(camera.offset, Vec2::new(20.0, 0.0));

        camera.end_gesture();
        assert!(camera.is_gesturing());
        camera.apply_cumulative_pan(Vec2::new(30.0, 0.0));
        assert_eq!(camera.offset, Vec2::new(30.0, 0.0));
        assert!((camera.zoom - 2.0).abs() < f64::EPSILON);

        camera.end_gesture();
        assert!(!camera.is_gesturing());
    }

    #[test]
    fn test_reset() {
        let mut camera = Camera::with_limits(0.5, 2.0);
        camera.begin_gesture();
        camera.begin_gesture();
        camera.apply_cumulative_pan(Vec2::new(30.0, -10.0));
        camera.zoom(1.5);
        camera.reset();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
        assert!(!camera.is_gesturing());
        // One end_gesture after reset must not leave a stale snapshot behind.
        camera.begin_gesture();
        camera.end_gesture();
        assert!(!camera.is_gesturing());
        camera.zoom(10.0);
        assert!((camera.zoom - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(10.0, 20.0));
        camera.pan(Vec2::new(f64::INFINITY, 0.0));
        assert!((camera.offset.x - 10.0).abs() < f64::EPSILON);
        assert!((camera.offset.y - 20.0).abs() < f64::EPSILON);
    }
}
