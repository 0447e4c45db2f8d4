//! Touch input events and per-pointer tracking.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of one finger for the lifetime of its contact.
pub type PointerId = u64;

/// Touch phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single touch event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub pointer: PointerId,
    pub phase: TouchPhase,
    pub position: Point,
    /// Timestamp in milliseconds on the host's monotonic clock.
    #[serde(default)]
    pub time_ms: u64,
}

impl TouchEvent {
    pub fn new(pointer: PointerId, phase: TouchPhase, position: Point, time_ms: u64) -> Self {
        Self {
            pointer,
            phase,
            position,
            time_ms,
        }
    }

    pub fn down(pointer: PointerId, x: f64, y: f64, time_ms: u64) -> Self {
        Self::new(pointer, TouchPhase::Down, Point::new(x, y), time_ms)
    }

    pub fn moved(pointer: PointerId, x: f64, y: f64, time_ms: u64) -> Self {
        Self::new(pointer, TouchPhase::Move, Point::new(x, y), time_ms)
    }

    pub fn up(pointer: PointerId, x: f64, y: f64, time_ms: u64) -> Self {
        Self::new(pointer, TouchPhase::Up, Point::new(x, y), time_ms)
    }

    pub fn cancel(pointer: PointerId, time_ms: u64) -> Self {
        Self::new(pointer, TouchPhase::Cancel, Point::ZERO, time_ms)
    }
}

/// Tracks which pointers are down and where.
#[derive(Debug, Clone, Default)]
pub struct TouchState {
    pointers: BTreeMap<PointerId, Point>,
    /// Time of the latest accepted event or tick.
    pub time_ms: u64,
}

impl TouchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event and return it with a usable position, or `None` when
    /// it must be dropped.
    ///
    /// Moves and releases of unknown pointers are dropped, as are moves and
    /// presses at non-finite positions. A release at a non-finite position
    /// still lifts the pointer, at its last known position.
    pub fn handle_event(&mut self, event: &TouchEvent) -> Option<TouchEvent> {
        let finite = event.position.is_finite();
        let mut event = *event;
        match event.phase {
            TouchPhase::Down => {
                if !finite {
                    log::debug!("Dropping press of pointer {} at non-finite position", event.pointer);
                    return None;
                }
                if self.pointers.insert(event.pointer, event.position).is_some() {
                    // Repeated press of a pointer already down: a move.
                    event.phase = TouchPhase::Move;
                }
            }
            TouchPhase::Move => {
                let slot = self.pointers.get_mut(&event.pointer)?;
                if !finite {
                    log::debug!("Dropping move of pointer {} to non-finite position", event.pointer);
                    return None;
                }
                *slot = event.position;
            }
            TouchPhase::Up | TouchPhase::Cancel => {
                let last = self.pointers.remove(&event.pointer)?;
                if !finite || event.phase == TouchPhase::Cancel {
                    event.position = last;
                }
            }
        }
        self.time_ms = self.time_ms.max(event.time_ms);
        Some(event)
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_down(&self, pointer: PointerId) -> bool {
        self.pointers.contains_key(&pointer)
    }

    pub fn position(&self, pointer: PointerId) -> Option<Point> {
        self.pointers.get(&pointer).copied()
    }

    /// Centroid of the given pointers, ignoring those not down.
    pub fn centroid_of(&self, ids: &[PointerId]) -> Option<Point> {
        let positions: Vec<Point> = ids.iter().filter_map(|id| self.position(*id)).collect();
        if positions.is_empty() {
            return None;
        }
        let sum = positions
            .iter()
            .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
        Some((sum / positions.len() as f64).to_point())
    }

    /// Forget every pointer.
    pub fn clear(&mut self) {
        self.pointers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_pointer_count() {
        let mut touches = TouchState::new();
        touches.handle_event(&TouchEvent::down(1, 0.0, 0.0, 0));
        touches.handle_event(&TouchEvent::down(2, 10.0, 0.0, 5));
        assert_eq!(touches.pointer_count(), 2);
        touches.handle_event(&TouchEvent::up(1, 0.0, 0.0, 10));
        assert_eq!(touches.pointer_count(), 1);
        assert!(touches.is_down(2));
        assert_eq!(touches.time_ms, 10);
    }

    #[test]
    fn test_unknown_pointer_is_dropped() {
        let mut touches = TouchState::new();
        assert!(touches.handle_event(&TouchEvent::moved(7, 1.0, 1.0, 0)).is_none());
        assert!(touches.handle_event(&TouchEvent::up(7, 1.0, 1.0, 0)).is_none());
    }

    #[test]
    fn test_repeated_down_becomes_move() {
        let mut touches = TouchState::new();
        touches.handle_event(&TouchEvent::down(1, 0.0, 0.0, 0));
        let event = touches.handle_event(&TouchEvent::down(1, 4.0, 4.0, 1));
        assert_eq!(event.map(|e| e.phase), Some(TouchPhase::Move));
        assert_eq!(touches.position(1), Some(Point::new(4.0, 4.0)));
    }

    #[test]
    fn test_non_finite_release_uses_last_position() {
        let mut touches = TouchState::new();
        touches.handle_event(&TouchEvent::down(1, 3.0, 4.0, 0));
        assert!(touches.handle_event(&TouchEvent::moved(1, f64::NAN, 0.0, 1)).is_none());
        let event = touches.handle_event(&TouchEvent::up(1, f64::NAN, 0.0, 2));
        assert_eq!(event.map(|e| e.position), Some(Point::new(3.0, 4.0)));
        assert_eq!(touches.pointer_count(), 0);
    }

    #[test]
    fn test_centroid() {
        let mut touches = TouchState::new();
        touches.handle_event(&TouchEvent::down(1, 0.0, 0.0, 0));
        touches.handle_event(&TouchEvent::down(2, 10.0, 20.0, 0));
        let c = touches.centroid_of(&[1, 2]).unwrap_or_default();
        assert!((c.x - 5.0).abs() < f64::EPSILON);
        assert!((c.y - 10.0).abs() < f64::EPSILON);
        assert!(touches.centroid_of(&[9]).is_none());
    }

    #[test]
    fn test_event_json_shape() {
        let json = r#"{"pointer":1,"phase":"down","position":{"x":1.0,"y":2.0},"time_ms":30}"#;
        let event: TouchEvent = serde_json::from_str(json).expect("valid event");
        assert_eq!(event, TouchEvent::down(1, 1.0, 2.0, 30));
    }
}
