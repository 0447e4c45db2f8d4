//! Interaction router: turns delivered gesture outcomes into store, camera
//! and marquee calls.
//!
//! The router holds no state of its own. Screen deltas are divided by the
//! current zoom before they reach the store, so a finger moving 10 px drags a
//! shape 10 px on screen at any zoom.

use crate::camera::Camera;
use crate::gesture::{GestureOutcome, NodeKey, Transition};
use crate::marquee::Marquee;
use crate::store::ShapeStore;

/// Mutable board state the router may touch.
pub struct RouteTarget<'a> {
    pub store: &'a mut ShapeStore,
    pub camera: &'a mut Camera,
    pub marquee: &'a mut Option<Marquee>,
}

/// Apply one outcome.
pub fn route(outcome: &GestureOutcome, target: &mut RouteTarget<'_>) {
    let GestureOutcome {
        key,
        transition,
        payload,
    } = *outcome;
    if !payload.is_finite() {
        log::debug!("Dropping {transition:?} of {key:?}: non-finite payload");
        // Sessions still have to close.
        if !is_closing(transition) {
            return;
        }
    }
    log::trace!("Routing {transition:?} of {key:?}");

    match key {
        NodeKey::Handle(id, corner) => match transition {
            Transition::Began => {
                target.store.begin_resize(id, corner);
            }
            Transition::Activated | Transition::Updated => {
                let delta = target.camera.screen_delta_to_world(payload.delta);
                target.store.resize_by(delta);
            }
            Transition::Ended | Transition::Cancelled | Transition::Failed => {
                target.store.end_resize();
            }
        },
        NodeKey::ShapePan(id) => match transition {
            Transition::Began => {
                target.store.begin_drag(id);
            }
            Transition::Activated | Transition::Updated => {
                let delta = target.camera.screen_delta_to_world(payload.delta);
                target.store.drag_by(delta);
            }
            Transition::Ended | Transition::Cancelled | Transition::Failed => {
                target.store.end_drag();
            }
        },
        NodeKey::ShapeTap(id) => {
            if transition == Transition::Activated {
                target.store.select(Some(id));
                target.store.clear_selected_ids();
            }
        }
        NodeKey::ShapeLongPress(id) => {
            if transition == Transition::Activated {
                target.store.begin_editing(id);
            }
        }
        NodeKey::Marquee => match transition {
            Transition::Began => {
                target.store.select(None);
                target.store.clear_selected_ids();
                *target.marquee = Some(Marquee::new(payload.position));
            }
            Transition::Activated | Transition::Updated => {
                if let Some(marquee) = target.marquee.as_mut() {
                    marquee.extend_to(payload.position);
                }
            }
            Transition::Ended => {
                if let Some(mut marquee) = target.marquee.take() {
                    if payload.is_finite() {
                        marquee.extend_to(payload.position);
                    }
                    let ids = target
                        .store
                        .shapes_contained_in(marquee.rect(), target.camera);
                    log::debug!("Marquee selected {} shapes", ids.len());
                    target.store.set_selected_ids(ids);
                }
            }
            Transition::Cancelled | Transition::Failed => {
                *target.marquee = None;
            }
        },
        NodeKey::CanvasPan => match transition {
            Transition::Began => {}
            Transition::Activated => {
                target.camera.begin_gesture();
                target.camera.apply_cumulative_pan(payload.translation);
            }
            Transition::Updated => target.camera.apply_cumulative_pan(payload.translation),
            Transition::Ended | Transition::Cancelled | Transition::Failed => {
                target.camera.end_gesture();
            }
        },
        NodeKey::CanvasPinch => match transition {
            Transition::Began => {}
            Transition::Activated => {
                target.camera.begin_gesture();
                target.camera.zoom(payload.scale);
            }
            Transition::Updated => target.camera.zoom(payload.scale),
            Transition::Ended | Transition::Cancelled | Transition::Failed => {
                target.camera.end_gesture();
            }
        },
        NodeKey::BackgroundTap => {
            if transition == Transition::Activated {
                target.store.select(None);
                target.store.end_editing();
                target.store.clear_selected_ids();
            }
        }
    }
}

fn is_closing(transition: Transition) -> bool {
    matches!(
        transition,
        Transition::Ended | Transition::Cancelled | Transition::Failed
    )
}
