//! Gesture arbitration.
//!
//! Several recognizers compete for the touches of one sequence. The
//! [`GestureGraph`] declares which recognizers exist, where they listen, and
//! who waits for whom; the [`Arbiter`] runs one sequence at a time and decides
//! which recognizer's signals reach the rest of the board as
//! [`GestureOutcome`]s.

mod arbiter;
mod graph;
mod recognizers;

pub use arbiter::Arbiter;
pub use graph::{GestureGraph, NodeDescriptor};
pub use recognizers::{
    CanvasPan, CanvasPinch, Emission, HandlePan, LongPress, MarqueePan, Recognizer,
    RecognizerKind, RecognizerState, ShapePan, Tap,
};

use crate::selection::Corner;
use crate::shapes::ShapeId;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Identity of a node in the gesture graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "node", content = "target", rename_all = "snake_case")]
pub enum NodeKey {
    CanvasPan,
    CanvasPinch,
    BackgroundTap,
    Marquee,
    ShapeTap(ShapeId),
    ShapeLongPress(ShapeId),
    ShapePan(ShapeId),
    Handle(ShapeId, Corner),
}

/// Screen area a node listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    /// The whole board.
    Surface,
    /// The screen rectangle of a shape.
    Shape(ShapeId),
    /// The hit box of one corner handle.
    Handle(ShapeId, Corner),
}

/// What lies under the first press of a sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionHit {
    /// Topmost shape whose box contains the press.
    pub shape: Option<ShapeId>,
    /// Closest handle whose hit box contains the press.
    pub handle: Option<(ShapeId, Corner)>,
}

impl Region {
    pub fn matches(&self, hit: &RegionHit) -> bool {
        match *self {
            Region::Surface => true,
            Region::Shape(id) => hit.shape == Some(id),
            Region::Handle(id, corner) => hit.handle == Some((id, corner)),
        }
    }
}

/// Arbitration priority. Higher wins ties and is consulted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Priority(pub u8);

impl Priority {
    pub const HANDLE: Priority = Priority(70);
    pub const LONG_PRESS: Priority = Priority(60);
    pub const SHAPE_TAP: Priority = Priority(50);
    pub const SHAPE_PAN: Priority = Priority(40);
    pub const MARQUEE: Priority = Priority(30);
    pub const CANVAS: Priority = Priority(20);
    pub const BACKGROUND_TAP: Priority = Priority(10);
}

/// Board state that switches nodes on and off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArbitrationContext {
    pub resizing: bool,
    pub select_mode: bool,
    pub marquee_active: bool,
}

/// Conditions under which a node takes part in arbitration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enablement {
    pub disabled_while_resizing: bool,
    pub disabled_in_select_mode: bool,
    pub requires_select_mode: bool,
    pub disabled_while_marquee: bool,
}

impl Enablement {
    pub const ALWAYS: Enablement = Enablement {
        disabled_while_resizing: false,
        disabled_in_select_mode: false,
        requires_select_mode: false,
        disabled_while_marquee: false,
    };

    pub fn allows(&self, ctx: &ArbitrationContext) -> bool {
        !(self.disabled_while_resizing && ctx.resizing
            || self.disabled_in_select_mode && ctx.select_mode
            || self.requires_select_mode && !ctx.select_mode
            || self.disabled_while_marquee && ctx.marquee_active)
    }
}

/// Signals a recognizer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Began,
    Activated,
    Updated,
    Ended,
    Failed,
}

/// Transitions delivered to the router. `Cancelled` is decided by the
/// arbiter, never emitted by a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Began,
    Activated,
    Updated,
    Ended,
    Cancelled,
    Failed,
}

impl From<Signal> for Transition {
    fn from(signal: Signal) -> Self {
        match signal {
            Signal::Began => Transition::Began,
            Signal::Activated => Transition::Activated,
            Signal::Updated => Transition::Updated,
            Signal::Ended => Transition::Ended,
            Signal::Failed => Transition::Failed,
        }
    }
}

/// Motion data attached to a signal. All lengths are screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GesturePayload {
    /// Current absolute pointer position (centroid for multi-touch).
    pub position: Point,
    pub pointer_count: usize,
    /// Translation since the gesture started.
    pub translation: Vec2,
    /// Translation since the previous signal.
    pub delta: Vec2,
    /// Scale since the gesture started.
    pub scale: f64,
}

impl GesturePayload {
    pub fn at(position: Point, pointer_count: usize) -> Self {
        Self {
            position,
            pointer_count,
            translation: Vec2::ZERO,
            delta: Vec2::ZERO,
            scale: 1.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.translation.is_finite()
            && self.delta.is_finite()
            && self.scale.is_finite()
    }
}

impl Default for GesturePayload {
    fn default() -> Self {
        Self::at(Point::ZERO, 0)
    }
}

/// A delivered transition of one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureOutcome {
    pub key: NodeKey,
    pub transition: Transition,
    pub payload: GesturePayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_region_matching() {
        let id = Uuid::new_v4();
        let hit = RegionHit {
            shape: Some(id),
            handle: Some((id, Corner::Se)),
        };
        assert!(Region::Surface.matches(&RegionHit::default()));
        assert!(Region::Shape(id).matches(&hit));
        assert!(!Region::Shape(Uuid::new_v4()).matches(&hit));
        assert!(Region::Handle(id, Corner::Se).matches(&hit));
        assert!(!Region::Handle(id, Corner::Nw).matches(&hit));
    }

    #[test]
    fn test_enablement() {
        let ctx = ArbitrationContext {
            select_mode: true,
            ..Default::default()
        };
        assert!(Enablement::ALWAYS.allows(&ctx));
        let canvas = Enablement {
            disabled_in_select_mode: true,
            ..Enablement::ALWAYS
        };
        assert!(!canvas.allows(&ctx));
        let marquee = Enablement {
            requires_select_mode: true,
            disabled_while_resizing: true,
            ..Enablement::ALWAYS
        };
        assert!(marquee.allows(&ctx));
        assert!(!marquee.allows(&ArbitrationContext::default()));
        assert!(!marquee.allows(&ArbitrationContext {
            resizing: true,
            select_mode: true,
            marquee_active: false,
        }));
    }

    #[test]
    fn test_priority_order() {
        let order = [
            Priority::HANDLE,
            Priority::LONG_PRESS,
            Priority::SHAPE_TAP,
            Priority::SHAPE_PAN,
            Priority::MARQUEE,
            Priority::CANVAS,
            Priority::BACKGROUND_TAP,
        ];
        assert!(order.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_payload_finiteness() {
        let mut payload = GesturePayload::at(Point::new(1.0, 2.0), 1);
        assert!(payload.is_finite());
        payload.scale = f64::NAN;
        assert!(!payload.is_finite());
    }
}
