//! Board facade: owns the shape store, camera and gesture machinery, and is
//! the only entry point hosts need.

use crate::camera::{Camera, CameraSnapshot};
use crate::config::BoardConfig;
use crate::gesture::{ArbitrationContext, Arbiter, GestureGraph, GestureOutcome, RegionHit};
use crate::input::{TouchEvent, TouchPhase};
use crate::marquee::Marquee;
use crate::router::{RouteTarget, route};
use crate::selection::{Handle, corner_handles, hit_test_handles};
use crate::shapes::{Shape, ShapeDraft, ShapeId};
use crate::store::ShapeStore;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Requests from the toolbar and the text editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    AddRectangle,
    AddEllipse,
    AddText,
    SetSelectMode { enabled: bool },
    ToggleSelectMode,
    CommitText { id: ShapeId, text: String },
    EndEditing,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub revision: u64,
    pub shapes: Vec<Shape>,
    pub selected_id: Option<ShapeId>,
    /// Marquee selection in z-order.
    pub selected_ids: Vec<ShapeId>,
    pub editing_id: Option<ShapeId>,
    pub camera: CameraSnapshot,
    pub is_resizing: bool,
    pub select_mode: bool,
    /// Marquee rectangle in screen space while one is being drawn.
    pub marquee: Option<Rect>,
    /// Handles of the selected shape.
    pub handles: Vec<Handle>,
}

/// Observable state used to detect changes for the revision counter.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fingerprint {
    store_revision: u64,
    camera: CameraSnapshot,
    marquee: Option<Marquee>,
    select_mode: bool,
}

/// A whiteboard driven by touch input.
#[derive(Debug)]
pub struct Board {
    config: BoardConfig,
    store: ShapeStore,
    camera: Camera,
    graph: GestureGraph,
    arbiter: Arbiter,
    marquee: Option<Marquee>,
    select_mode: bool,
    /// Selection and shape count the graph was last built for.
    graph_key: (Option<ShapeId>, usize),
    revision: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        let mut graph = GestureGraph::new();
        graph.rebuild(&[], None);
        Self {
            camera: config.camera.camera(),
            arbiter: Arbiter::new(config.gestures.clone()),
            config,
            store: ShapeStore::new(),
            graph,
            marquee: None,
            select_mode: false,
            graph_key: (None, 0),
            revision: 0,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn graph(&self) -> &GestureGraph {
        &self.graph
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    pub fn select_mode(&self) -> bool {
        self.select_mode
    }

    /// Feed one touch event.
    pub fn handle_touch(&mut self, event: TouchEvent) {
        let before = self.fingerprint();
        let hit = if event.phase == TouchPhase::Down && self.arbiter.pointer_count() == 0 {
            self.region_hit(event.position)
        } else {
            RegionHit::default()
        };
        let ctx = self.context();
        let outcomes = self.arbiter.handle_touch(&event, &self.graph, &ctx, &hit);
        self.apply(&outcomes);
        self.after_change(before);
    }

    /// Advance timers to `time_ms`.
    pub fn tick(&mut self, time_ms: u64) {
        let before = self.fingerprint();
        let ctx = self.context();
        let outcomes = self.arbiter.tick(time_ms, &ctx);
        self.apply(&outcomes);
        self.after_change(before);
    }

    pub fn apply_intent(&mut self, intent: Intent) {
        let before = self.fingerprint();
        log::debug!("Applying intent {intent:?}");
        match intent {
            Intent::AddRectangle => {
                let id = self.store.add_rect(ShapeDraft::default());
                self.store.select(Some(id));
            }
            Intent::AddEllipse => {
                let id = self.store.add_ellipse(ShapeDraft::default());
                self.store.select(Some(id));
            }
            Intent::AddText => {
                let id = self.store.add_text(ShapeDraft::default());
                self.store.select(Some(id));
            }
            Intent::SetSelectMode { enabled } => self.set_select_mode(enabled),
            Intent::ToggleSelectMode => self.set_select_mode(!self.select_mode),
            Intent::CommitText { id, text } => {
                self.store.set_shape_text(id, text);
                if self.store.editing_id() == Some(id) {
                    self.store.end_editing();
                }
            }
            Intent::EndEditing => self.store.end_editing(),
        }
        self.after_change(before);
    }

    /// Cancel the running gesture and close every session.
    pub fn teardown(&mut self) {
        let before = self.fingerprint();
        let outcomes = self.arbiter.cancel_all();
        self.apply(&outcomes);
        self.store.teardown();
        self.marquee = None;
        self.after_change(before);
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let selected_ids = self
            .store
            .shapes()
            .iter()
            .map(Shape::id)
            .filter(|id| self.store.selected_ids().contains(id))
            .collect();
        BoardSnapshot {
            revision: self.revision,
            shapes: self.store.shapes().to_vec(),
            selected_id: self.store.selected_id(),
            selected_ids,
            editing_id: self.store.editing_id(),
            camera: self.camera.snapshot(),
            is_resizing: self.store.is_resizing(),
            select_mode: self.select_mode,
            marquee: self.marquee.map(|m| m.rect()),
            handles: self
                .store
                .selected_shape()
                .map(corner_handles)
                .unwrap_or_default(),
        }
    }

    fn set_select_mode(&mut self, enabled: bool) {
        if self.select_mode != enabled {
            log::debug!("Select mode {}", if enabled { "on" } else { "off" });
            self.select_mode = enabled;
        }
    }

    fn context(&self) -> ArbitrationContext {
        ArbitrationContext {
            resizing: self.store.is_resizing(),
            select_mode: self.select_mode,
            marquee_active: self.marquee.is_some(),
        }
    }

    fn region_hit(&self, screen_point: Point) -> RegionHit {
        let world = self.camera.screen_to_world(screen_point);
        let handle = self.store.selected_shape().and_then(|shape| {
            hit_test_handles(
                shape,
                &self.camera,
                screen_point,
                self.config.gestures.handle_hit_size,
            )
            .map(|corner| (shape.id(), corner))
        });
        RegionHit {
            shape: self.store.topmost_at(world).map(Shape::id),
            handle,
        }
    }

    fn apply(&mut self, outcomes: &[GestureOutcome]) {
        let mut target = RouteTarget {
            store: &mut self.store,
            camera: &mut self.camera,
            marquee: &mut self.marquee,
        };
        for outcome in outcomes {
            route(outcome, &mut target);
        }
    }

    fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            store_revision: self.store.revision(),
            camera: self.camera.snapshot(),
            marquee: self.marquee,
            select_mode: self.select_mode,
        }
    }

    fn after_change(&mut self, before: Fingerprint) {
        if self.fingerprint() != before {
            self.revision += 1;
        }
        self.sync_graph();
    }

    /// Rebuild the gesture graph when the selection or shape count changed.
    fn sync_graph(&mut self) {
        let key = (self.store.selected_id(), self.store.len());
        if key != self.graph_key {
            self.graph.rebuild(self.store.shapes(), key.0);
            self.graph_key = key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::NodeKey;
    use crate::selection::Corner;
    use crate::shapes::{MIN_H, MIN_W};
    use kurbo::Vec2;

    /// A board with one rectangle at (100,100) 160x100, selected.
    fn board_with_rect() -> (Board, ShapeId) {
        let mut board = Board::default();
        board.apply_intent(Intent::AddRectangle);
        let id = board.store().selected_id().expect("new shape is selected");
        (board, id)
    }

    fn bounds(board: &Board, id: ShapeId) -> Rect {
        board.store().shape(id).map(Shape::bounds).unwrap_or_default()
    }

    #[test]
    fn test_add_intents_select_new_shape() {
        let mut board = Board::default();
        board.apply_intent(Intent::AddEllipse);
        board.apply_intent(Intent::AddText);
        let snapshot = board.snapshot();
        assert_eq!(snapshot.shapes.len(), 2);
        assert_eq!(snapshot.selected_id, Some(snapshot.shapes[1].id()));
        assert_eq!(snapshot.handles.len(), 4);
        assert_eq!(board.graph().len(), 4 + 6 + 4);
    }

    #[test]
    fn test_tap_selects_shape() {
        let mut board = Board::default();
        board.apply_intent(Intent::AddRectangle);
        board.apply_intent(Intent::AddEllipse);
        let rect_id = board.snapshot().shapes[0].id();
        // Rectangle body away from the ellipse and its handles.
        board.handle_touch(TouchEvent::down(1, 110.0, 190.0, 0));
        board.handle_touch(TouchEvent::up(1, 112.0, 190.0, 40));
        assert_eq!(board.store().selected_id(), Some(rect_id));
        assert_eq!(bounds(&board, rect_id), Rect::new(100.0, 100.0, 260.0, 200.0));
    }

    #[test]
    fn test_tap_within_slop_does_not_move() {
        let (mut board, id) = board_with_rect();
        board.handle_touch(TouchEvent::down(1, 180.0, 150.0, 0));
        board.handle_touch(TouchEvent::moved(1, 186.0, 144.0, 10));
        board.handle_touch(TouchEvent::up(1, 186.0, 144.0, 20));
        assert_eq!(bounds(&board, id), Rect::new(100.0, 100.0, 260.0, 200.0));
        assert!(board.store().session().is_none());
    }

    #[test]
    fn test_drag_moves_shape_after_slop() {
        let (mut board, id) = board_with_rect();
        board.handle_touch(TouchEvent::down(1, 180.0, 150.0, 0));
        board.handle_touch(TouchEvent::moved(1, 185.0, 150.0, 10));
        board.handle_touch(TouchEvent::moved(1, 200.0, 150.0, 20));
        assert!(board.store().is_dragging());
        board.handle_touch(TouchEvent::moved(1, 230.0, 160.0, 30));
        board.handle_touch(TouchEvent::up(1, 230.0, 160.0, 40));
        // Sub-slop motion (5 px) is discarded.
        assert_eq!(bounds(&board, id).origin(), Point::new(145.0, 110.0));
        assert!(board.store().session().is_none());
    }

    #[test]
    fn test_drag_at_zoom_tracks_finger() {
        let (mut board, id) = board_with_rect();
        board.camera.zoom = 2.0;
        // Shape spans (200,200)-(520,400) on screen.
        board.handle_touch(TouchEvent::down(1, 300.0, 300.0, 0));
        board.handle_touch(TouchEvent::moved(1, 320.0, 300.0, 10));
        board.handle_touch(TouchEvent::moved(1, 340.0, 300.0, 20));
        board.handle_touch(TouchEvent::up(1, 340.0, 300.0, 30));
        // 40 screen px at zoom 2.
        assert_eq!(bounds(&board, id).origin(), Point::new(120.0, 100.0));
    }

    #[test]
    fn test_handle_wins_over_body() {
        let (mut board, id) = board_with_rect();
        // Inside the body and inside the Se handle hit box.
        board.handle_touch(TouchEvent::down(1, 255.0, 195.0, 0));
        assert!(board.store().is_resizing());
        assert!(board.snapshot().is_resizing);
        board.handle_touch(TouchEvent::moved(1, 275.0, 215.0, 10));
        board.handle_touch(TouchEvent::up(1, 275.0, 215.0, 20));
        assert_eq!(bounds(&board, id), Rect::new(100.0, 100.0, 280.0, 220.0));
        assert!(!board.store().is_resizing());
        assert_eq!(board.store().selected_id(), Some(id));
    }

    #[test]
    fn test_resize_floor_through_gestures() {
        let (mut board, id) = board_with_rect();
        board.handle_touch(TouchEvent::down(1, 100.0, 100.0, 0));
        board.handle_touch(TouchEvent::moved(1, 600.0, 600.0, 10));
        let b = bounds(&board, id);
        assert!(b.width() >= MIN_W && b.height() >= MIN_H);
        assert_eq!(Corner::Se.of(b), Point::new(260.0, 200.0));
        board.handle_touch(TouchEvent::up(1, 600.0, 600.0, 20));
    }

    #[test]
    fn test_long_press_enters_edit() {
        let (mut board, id) = board_with_rect();
        board.apply_intent(Intent::AddText);
        board.handle_touch(TouchEvent::down(1, 150.0, 190.0, 1000));
        assert!(board.store().is_dragging());
        board.tick(1300);
        assert_eq!(board.store().editing_id(), Some(id));
        assert!(board.store().session().is_none());
        board.handle_touch(TouchEvent::up(1, 150.0, 190.0, 1400));
        board.apply_intent(Intent::CommitText {
            id,
            text: "hello".into(),
        });
        assert_eq!(board.store().shape(id).and_then(Shape::text), Some("hello"));
        assert!(board.store().editing_id().is_none());
    }

    #[test]
    fn test_drag_after_long_press_leaves_edit() {
        let (mut board, id) = board_with_rect();
        board.handle_touch(TouchEvent::down(1, 180.0, 150.0, 0));
        board.tick(300);
        board.handle_touch(TouchEvent::up(1, 180.0, 150.0, 320));
        assert_eq!(board.store().editing_id(), Some(id));

        board.handle_touch(TouchEvent::down(1, 180.0, 150.0, 1000));
        board.handle_touch(TouchEvent::moved(1, 210.0, 150.0, 1010));
        assert!(board.store().is_dragging());
        assert!(board.store().editing_id().is_none());
        board.handle_touch(TouchEvent::up(1, 210.0, 150.0, 1020));
        assert_eq!(bounds(&board, id).origin(), Point::new(130.0, 100.0));
        assert!(board.snapshot().editing_id.is_none());
    }

    #[test]
    fn test_background_tap_clears_selection() {
        let (mut board, id) = board_with_rect();
        board.store.begin_editing(id);
        board.handle_touch(TouchEvent::down(1, 600.0, 600.0, 0));
        board.handle_touch(TouchEvent::up(1, 600.0, 600.0, 30));
        let snapshot = board.snapshot();
        assert!(snapshot.selected_id.is_none());
        assert!(snapshot.editing_id.is_none());
        assert!(snapshot.handles.is_empty());
        assert!(board.graph().node(&NodeKey::Handle(id, Corner::Se)).is_none());
    }

    #[test]
    fn test_one_finger_pan_moves_camera() {
        let (mut board, id) = board_with_rect();
        board.handle_touch(TouchEvent::down(1, 600.0, 600.0, 0));
        board.handle_touch(TouchEvent::moved(1, 620.0, 610.0, 10));
        board.handle_touch(TouchEvent::moved(1, 650.0, 640.0, 20));
        assert_eq!(board.camera().offset, Vec2::new(50.0, 40.0));
        board.handle_touch(TouchEvent::up(1, 650.0, 640.0, 30));
        assert!(!board.camera().is_gesturing());
        assert_eq!(board.store().selected_id(), Some(id));
        assert_eq!(bounds(&board, id), Rect::new(100.0, 100.0, 260.0, 200.0));
    }

    #[test]
    fn test_pinch_zooms_while_panning() {
        let mut board = Board::default();
        board.handle_touch(TouchEvent::down(1, 400.0, 400.0, 0));
        board.handle_touch(TouchEvent::down(2, 500.0, 400.0, 5));
        board.handle_touch(TouchEvent::moved(2, 600.0, 400.0, 10));
        assert!((board.camera().zoom - 2.0).abs() < 1e-10);
        // Centroid moved from (450,400) to (500,400).
        assert_eq!(board.camera().offset, Vec2::new(50.0, 0.0));
        board.handle_touch(TouchEvent::moved(1, 300.0, 400.0, 20));
        assert!((board.camera().zoom - 3.0).abs() < 1e-10);
        board.handle_touch(TouchEvent::up(1, 300.0, 400.0, 30));
        board.handle_touch(TouchEvent::up(2, 600.0, 400.0, 40));
        assert!(!board.camera().is_gesturing());
    }

    #[test]
    fn test_zoom_clamps() {
        let mut board = Board::default();
        board.handle_touch(TouchEvent::down(1, 400.0, 400.0, 0));
        board.handle_touch(TouchEvent::down(2, 401.0, 400.0, 5));
        board.handle_touch(TouchEvent::moved(2, 901.0, 400.0, 10));
        assert!((board.camera().zoom - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_select_mode_marquee() {
        let mut board = Board::default();
        board.apply_intent(Intent::AddRectangle);
        let a = board.snapshot().shapes[0].id();
        board.apply_intent(Intent::ToggleSelectMode);
        board.handle_touch(TouchEvent::down(1, 50.0, 50.0, 0));
        assert!(board.store().selected_id().is_none());
        board.handle_touch(TouchEvent::moved(1, 200.0, 150.0, 10));
        assert_eq!(board.snapshot().marquee, Some(Rect::new(50.0, 50.0, 200.0, 150.0)));
        board.handle_touch(TouchEvent::moved(1, 300.0, 250.0, 20));
        board.handle_touch(TouchEvent::up(1, 300.0, 250.0, 30));
        let snapshot = board.snapshot();
        assert!(snapshot.marquee.is_none());
        assert_eq!(snapshot.selected_ids, vec![a]);
        // Select mode keeps the camera still.
        assert_eq!(snapshot.camera.offset, Vec2::ZERO);
    }

    #[test]
    fn test_selection_change_closes_resize() {
        let (mut board, id) = board_with_rect();
        board.handle_touch(TouchEvent::down(1, 260.0, 200.0, 0));
        assert!(board.store().is_resizing());
        board.apply_intent(Intent::AddEllipse);
        assert!(!board.store().is_resizing());
        board.handle_touch(TouchEvent::moved(1, 300.0, 260.0, 10));
        assert_eq!(bounds(&board, id), Rect::new(100.0, 100.0, 260.0, 200.0));
        board.handle_touch(TouchEvent::up(1, 300.0, 260.0, 20));
        assert!(!board.arbiter().in_sequence());
    }

    #[test]
    fn test_teardown_closes_sessions() {
        let (mut board, id) = board_with_rect();
        board.handle_touch(TouchEvent::down(1, 180.0, 150.0, 0));
        board.handle_touch(TouchEvent::moved(1, 200.0, 150.0, 10));
        assert!(board.store().is_dragging());
        board.teardown();
        assert!(board.store().session().is_none());
        assert!(!board.arbiter().in_sequence());
        // Late events of the torn-down sequence are ignored.
        board.handle_touch(TouchEvent::moved(1, 260.0, 150.0, 20));
        assert_eq!(bounds(&board, id).origin(), Point::new(120.0, 100.0));
    }

    #[test]
    fn test_revision_tracks_changes() {
        let mut board = Board::default();
        let start = board.snapshot().revision;
        board.tick(100);
        assert_eq!(board.snapshot().revision, start);
        board.apply_intent(Intent::SetSelectMode { enabled: true });
        assert!(board.snapshot().revision > start);
    }

    #[test]
    fn test_snapshot_serializes() {
        let (board, _) = board_with_rect();
        let json = serde_json::to_string(&board.snapshot()).expect("serializable");
        let back: BoardSnapshot = serde_json::from_str(&json).expect("parsable");
        assert_eq!(back.shapes.len(), 1);
        assert!(matches!(back.shapes[0], Shape::Rectangle(_)));
    }

    #[test]
    fn test_intent_json() {
        let intent: Intent = serde_json::from_str(r#"{"type":"set_select_mode","enabled":true}"#)
            .expect("valid intent");
        assert_eq!(intent, Intent::SetSelectMode { enabled: true });
    }
}
