//! Shape store: the authoritative shape list, selection and manipulation session.
//!
//! Every mutation of shape geometry goes through this type so the size floor
//! and the single-session rule hold in one place.

use crate::camera::Camera;
use crate::selection::{Corner, apply_corner_resize};
use crate::shapes::{Ellipse, Rectangle, Shape, ShapeDraft, ShapeId, Text};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An active manipulation session. At most one is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Session {
    Drag { shape_id: ShapeId },
    Resize { shape_id: ShapeId, corner: Corner },
}

impl Session {
    pub fn shape_id(&self) -> ShapeId {
        match self {
            Session::Drag { shape_id } | Session::Resize { shape_id, .. } => *shape_id,
        }
    }
}

/// Owns shapes (in z-order), selection, edit state and the active session.
#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    /// Shapes back to front. Append-only.
    shapes: Vec<Shape>,
    /// Primary selection.
    selected_id: Option<ShapeId>,
    /// Marquee multi-selection. Visual only.
    selected_ids: HashSet<ShapeId>,
    /// Shape under inline text edit.
    editing_id: Option<ShapeId>,
    session: Option<Session>,
    /// Bumped on every committed mutation.
    revision: u64,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rectangle built from `draft`, on top of the z-order.
    pub fn add_rect(&mut self, draft: ShapeDraft) -> ShapeId {
        self.push(Shape::Rectangle(Rectangle::from_draft(&draft)))
    }

    /// Add an ellipse built from `draft`, on top of the z-order.
    pub fn add_ellipse(&mut self, draft: ShapeDraft) -> ShapeId {
        self.push(Shape::Ellipse(Ellipse::from_draft(&draft)))
    }

    /// Add a text box built from `draft`, on top of the z-order.
    pub fn add_text(&mut self, draft: ShapeDraft) -> ShapeId {
        self.push(Shape::Text(Text::from_draft(&draft)))
    }

    fn push(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        log::debug!("Adding {:?} shape {}", shape.kind(), id);
        self.shapes.push(shape);
        self.touch();
        id
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Set the sole selection. Does not affect the marquee set.
    pub fn select(&mut self, id: Option<ShapeId>) {
        if self.selected_id == id {
            return;
        }
        self.selected_id = id;
        self.on_selection_changed();
        self.touch();
    }

    /// Replace the marquee multi-selection.
    pub fn set_selected_ids(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        self.selected_ids = ids.into_iter().collect();
        self.touch();
    }

    /// Clear the marquee multi-selection.
    pub fn clear_selected_ids(&mut self) {
        if self.selected_ids.is_empty() {
            return;
        }
        self.selected_ids.clear();
        self.touch();
    }

    /// A resize session belongs to the shape whose handles were grabbed.
    /// Once the selection moves on, its handles are gone, so the session is
    /// closed before it can touch another shape.
    fn on_selection_changed(&mut self) {
        if self.is_resizing() {
            log::debug!("Selection changed, closing resize session");
            self.end_resize();
        }
    }

    /// Force-close every session and leave edit mode.
    pub fn teardown(&mut self) {
        self.on_teardown();
    }

    fn on_teardown(&mut self) {
        self.end_drag();
        self.end_resize();
        self.end_editing();
    }

    /// Open a drag session. Refused while another session is open.
    pub fn begin_drag(&mut self, id: ShapeId) -> bool {
        self.begin_session(Session::Drag { shape_id: id })
    }

    /// Move the dragged shape by a world delta since the previous call.
    pub fn drag_by(&mut self, delta: Vec2) {
        let Some(Session::Drag { shape_id }) = self.session else {
            return;
        };
        if !delta.is_finite() {
            log::debug!("Ignoring non-finite drag delta");
            return;
        }
        if let Some(shape) = self.shape_mut(shape_id) {
            shape.translate(delta);
            self.touch();
        }
    }

    /// Close the drag session. Idempotent.
    pub fn end_drag(&mut self) {
        if matches!(self.session, Some(Session::Drag { .. })) {
            log::debug!("Ending drag session");
            self.session = None;
            self.touch();
        }
    }

    /// Open a resize session on one corner. Refused while another session is open.
    pub fn begin_resize(&mut self, id: ShapeId, corner: Corner) -> bool {
        self.begin_session(Session::Resize {
            shape_id: id,
            corner,
        })
    }

    /// Resize the shape by a world delta since the previous call.
    pub fn resize_by(&mut self, delta: Vec2) {
        let Some(Session::Resize { shape_id, corner }) = self.session else {
            return;
        };
        if !delta.is_finite() {
            log::debug!("Ignoring non-finite resize delta");
            return;
        }
        if let Some(shape) = self.shape_mut(shape_id) {
            let bounds = apply_corner_resize(shape.bounds(), corner, delta);
            shape.set_bounds(bounds);
            self.touch();
        }
    }

    /// Close the resize session. Idempotent.
    pub fn end_resize(&mut self) {
        if matches!(self.session, Some(Session::Resize { .. })) {
            log::debug!("Ending resize session");
            self.session = None;
            self.touch();
        }
    }

    fn begin_session(&mut self, session: Session) -> bool {
        if let Some(open) = self.session {
            log::warn!("Refusing {session:?}: {open:?} is still open");
            return false;
        }
        if let Some(editing) = self.editing_id {
            log::debug!("Leaving edit of {editing} for {session:?}");
            self.end_editing();
        }
        log::debug!("Beginning {session:?}");
        self.session = Some(session);
        self.touch();
        true
    }

    /// Enter inline text edit for a shape: closes any session, selects the
    /// shape and clears the marquee set.
    pub fn begin_editing(&mut self, id: ShapeId) {
        self.end_drag();
        self.end_resize();
        self.select(Some(id));
        self.clear_selected_ids();
        if self.editing_id != Some(id) {
            log::debug!("Editing text of {id}");
            self.editing_id = Some(id);
            self.touch();
        }
    }

    /// Leave edit mode without changing the text. Idempotent.
    pub fn end_editing(&mut self) {
        if self.editing_id.take().is_some() {
            self.touch();
        }
    }

    /// Write the edited text and leave edit mode.
    pub fn commit_editing(&mut self, text: impl Into<String>) {
        if let Some(id) = self.editing_id {
            self.set_shape_text(id, text);
            self.end_editing();
        }
    }

    /// Overwrite a shape's text.
    pub fn set_shape_text(&mut self, id: ShapeId, text: impl Into<String>) {
        if let Some(shape) = self.shape_mut(id) {
            shape.set_text(Some(text.into()));
            self.touch();
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id() == id)
    }

    fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|shape| shape.id() == id)
    }

    /// Topmost shape whose box contains the world point.
    pub fn topmost_at(&self, point: Point) -> Option<&Shape> {
        self.shapes.iter().rev().find(|shape| shape.hit_test(point, 0.0))
    }

    /// Shapes whose screen-space box lies fully inside `screen_rect`, in z-order.
    pub fn shapes_contained_in(&self, screen_rect: Rect, camera: &Camera) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .filter(|shape| {
                let bounds = camera.world_rect_to_screen(shape.bounds());
                rect_contains(screen_rect, bounds)
            })
            .map(Shape::id)
            .collect()
    }

    pub fn selected_id(&self) -> Option<ShapeId> {
        self.selected_id
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selected_id.and_then(|id| self.shape(id))
    }

    pub fn selected_ids(&self) -> &HashSet<ShapeId> {
        &self.selected_ids
    }

    pub fn editing_id(&self) -> Option<ShapeId> {
        self.editing_id
    }

    pub fn session(&self) -> Option<Session> {
        self.session
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.session, Some(Session::Drag { .. }))
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.session, Some(Session::Resize { .. }))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Full containment, edges inclusive. `outer` may be unnormalized.
fn rect_contains(outer: Rect, inner: Rect) -> bool {
    let outer = outer.abs();
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}
