//! Recognizer state machines.
//!
//! A recognizer is created when a sequence starts and sees every touch event
//! of that sequence, starting with the first press. It never mutates the
//! board; it only emits [`Emission`]s for the arbiter to deliver or drop.

use super::{GesturePayload, Signal};
use crate::config::GestureConfig;
use crate::input::{PointerId, TouchEvent, TouchPhase, TouchState};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one recognizer instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerState {
    #[default]
    Undetermined,
    Began,
    Active,
    Ended,
    Failed,
    Cancelled,
}

impl RecognizerState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RecognizerState::Ended | RecognizerState::Failed | RecognizerState::Cancelled
        )
    }

    pub fn is_active(self) -> bool {
        self == RecognizerState::Active
    }
}

/// A signal with its payload, as produced by a recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    pub signal: Signal,
    pub payload: GesturePayload,
}

/// A gesture recognizer.
pub trait Recognizer: fmt::Debug {
    fn state(&self) -> RecognizerState;

    /// Feed one touch event. `touches` already reflects it.
    fn on_touch(&mut self, event: &TouchEvent, touches: &TouchState) -> Vec<Emission>;

    /// Advance timers.
    fn on_tick(&mut self, _time_ms: u64) -> Vec<Emission> {
        Vec::new()
    }

    /// Stop for good without emitting anything.
    fn cancel(&mut self);
}

/// Which recognizer a graph node runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerKind {
    CanvasPan,
    CanvasPinch,
    Tap,
    LongPress,
    ShapePan,
    HandlePan,
    Marquee,
}

impl RecognizerKind {
    /// Fresh recognizer for a new sequence.
    pub fn instantiate(self, config: &GestureConfig) -> Box<dyn Recognizer> {
        match self {
            RecognizerKind::CanvasPan => Box::new(CanvasPan::new(config.pan_slop)),
            RecognizerKind::CanvasPinch => Box::new(CanvasPinch::new()),
            RecognizerKind::Tap => Box::new(Tap::new(config.tap_slop)),
            RecognizerKind::LongPress => Box::new(LongPress::new(
                config.long_press_ms,
                config.long_press_max_distance,
            )),
            RecognizerKind::ShapePan => Box::new(ShapePan::new(config.pan_slop)),
            RecognizerKind::HandlePan => Box::new(HandlePan::new()),
            RecognizerKind::Marquee => Box::new(MarqueePan::new(config.pan_slop)),
        }
    }
}

/// State bookkeeping shared by every recognizer.
#[derive(Debug, Clone, Default)]
struct Lifecycle {
    state: RecognizerState,
}

impl Lifecycle {
    fn emit(&mut self, signal: Signal, payload: GesturePayload, out: &mut Vec<Emission>) {
        if self.state.is_terminal() {
            return;
        }
        self.state = match signal {
            Signal::Began => RecognizerState::Began,
            Signal::Activated => RecognizerState::Active,
            Signal::Updated => self.state,
            Signal::Ended => RecognizerState::Ended,
            Signal::Failed => RecognizerState::Failed,
        };
        out.push(Emission { signal, payload });
    }

    /// Emit `Began` and `Activated` together.
    fn activate(&mut self, payload: GesturePayload, out: &mut Vec<Emission>) {
        if self.state == RecognizerState::Undetermined {
            self.emit(Signal::Began, payload, out);
        }
        self.emit(Signal::Activated, payload, out);
    }

    fn fail(&mut self, payload: GesturePayload, out: &mut Vec<Emission>) {
        self.emit(Signal::Failed, payload, out);
    }

    fn cancel(&mut self) {
        if !self.state.is_terminal() {
            self.state = RecognizerState::Cancelled;
        }
    }

    fn is_active(&self) -> bool {
        self.state.is_active()
    }

    fn is_done(&self) -> bool {
        self.state.is_terminal()
    }
}

fn exceeds_per_axis(offset: Vec2, slop: f64) -> bool {
    offset.x.abs() > slop || offset.y.abs() > slop
}

/// Two-finger-capable surface pan.
///
/// Translation is the centroid's travel since the press. When a finger lands
/// or lifts, the centroid jumps; the travel so far is banked and measuring
/// restarts from the new centroid, so the reported translation stays
/// continuous.
#[derive(Debug, Clone)]
pub struct CanvasPan {
    lifecycle: Lifecycle,
    slop: f64,
    tracked: Vec<PointerId>,
    anchor: Point,
    last_centroid: Point,
    banked: Vec2,
    last_translation: Vec2,
}

impl CanvasPan {
    pub const MAX_POINTERS: usize = 2;

    pub fn new(slop: f64) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            slop,
            tracked: Vec::with_capacity(Self::MAX_POINTERS),
            anchor: Point::ZERO,
            last_centroid: Point::ZERO,
            banked: Vec2::ZERO,
            last_translation: Vec2::ZERO,
        }
    }

    fn translation(&self) -> Vec2 {
        self.banked + (self.last_centroid - self.anchor)
    }

    fn rebase(&mut self, touches: &TouchState) {
        self.banked += self.last_centroid - self.anchor;
        if let Some(centroid) = touches.centroid_of(&self.tracked) {
            self.anchor = centroid;
            self.last_centroid = centroid;
        }
    }

    fn payload(&mut self) -> GesturePayload {
        let translation = self.translation();
        let delta = translation - self.last_translation;
        self.last_translation = translation;
        GesturePayload {
            position: self.last_centroid,
            pointer_count: self.tracked.len(),
            translation,
            delta,
            scale: 1.0,
        }
    }
}

impl Recognizer for CanvasPan {
    fn state(&self) -> RecognizerState {
        self.lifecycle.state
    }

    fn on_touch(&mut self, event: &TouchEvent, touches: &TouchState) -> Vec<Emission> {
        let mut out = Vec::new();
        if self.lifecycle.is_done() {
            return out;
        }
        let own = self.tracked.contains(&event.pointer);
        match event.phase {
            TouchPhase::Down if !own => {
                if self.tracked.is_empty() {
                    self.tracked.push(event.pointer);
                    self.anchor = event.position;
                    self.last_centroid = event.position;
                } else if self.tracked.len() < Self::MAX_POINTERS {
                    self.tracked.push(event.pointer);
                    self.rebase(touches);
                } else if !self.lifecycle.is_active() {
                    let payload = self.payload();
                    self.lifecycle.fail(payload, &mut out);
                }
            }
            TouchPhase::Move if own => {
                if let Some(centroid) = touches.centroid_of(&self.tracked) {
                    self.last_centroid = centroid;
                }
                if self.lifecycle.is_active() {
                    let payload = self.payload();
                    log::trace!("Canvas pan by {:?}", payload.translation);
                    self.lifecycle.emit(Signal::Updated, payload, &mut out);
                } else if exceeds_per_axis(self.translation(), self.slop) {
                    let payload = self.payload();
                    self.lifecycle.activate(payload, &mut out);
                }
            }
            TouchPhase::Up if own => {
                self.tracked.retain(|id| *id != event.pointer);
                if !self.tracked.is_empty() {
                    self.rebase(touches);
                } else if self.lifecycle.is_active() {
                    let payload = self.payload();
                    self.lifecycle.emit(Signal::Ended, payload, &mut out);
                } else {
                    let payload = self.payload();
                    self.lifecycle.fail(payload, &mut out);
                }
            }
            TouchPhase::Cancel if own => {
                let payload = self.payload();
                self.lifecycle.fail(payload, &mut out);
            }
            _ => {}
        }
        out
    }

    fn cancel(&mut self) {
        self.lifecycle.cancel();
    }
}

/// Two-finger pinch. Active as soon as the second finger lands.
#[derive(Debug, Clone, Default)]
pub struct CanvasPinch {
    lifecycle: Lifecycle,
    tracked: Vec<PointerId>,
    start_distance: f64,
}

impl CanvasPinch {
    pub fn new() -> Self {
        Self::default()
    }

    fn distance(&self, touches: &TouchState) -> Option<f64> {
        match self.tracked.as_slice() {
            [a, b] => Some(touches.position(*a)?.distance(touches.position(*b)?)),
            _ => None,
        }
    }

    fn payload(&self, touches: &TouchState) -> GesturePayload {
        let position = touches.centroid_of(&self.tracked).unwrap_or_default();
        let scale = match self.distance(touches) {
            Some(d) if self.start_distance > f64::EPSILON => d / self.start_distance,
            _ => 1.0,
        };
        GesturePayload {
            scale,
            ..GesturePayload::at(position, self.tracked.len())
        }
    }
}

impl Recognizer for CanvasPinch {
    fn state(&self) -> RecognizerState {
        self.lifecycle.state
    }

    fn on_touch(&mut self, event: &TouchEvent, touches: &TouchState) -> Vec<Emission> {
        let mut out = Vec::new();
        if self.lifecycle.is_done() {
            return out;
        }
        let own = self.tracked.contains(&event.pointer);
        match event.phase {
            TouchPhase::Down if !own && self.tracked.len() < 2 => {
                self.tracked.push(event.pointer);
                if let Some(distance) = self.distance(touches) {
                    self.start_distance = distance;
                    let payload = self.payload(touches);
                    log::debug!("Pinch started at distance {distance:.1}");
                    self.lifecycle.activate(payload, &mut out);
                }
            }
            TouchPhase::Move if own && self.lifecycle.is_active() => {
                let payload = self.payload(touches);
                log::trace!("Pinch scale {:.3}", payload.scale);
                self.lifecycle.emit(Signal::Updated, payload, &mut out);
            }
            TouchPhase::Up if own => {
                let payload = GesturePayload {
                    position: event.position,
                    ..self.payload(touches)
                };
                if self.lifecycle.is_active() {
                    self.lifecycle.emit(Signal::Ended, payload, &mut out);
                } else {
                    self.lifecycle.fail(payload, &mut out);
                }
            }
            TouchPhase::Cancel if own => {
                let payload = self.payload(touches);
                self.lifecycle.fail(payload, &mut out);
            }
            _ => {}
        }
        out
    }

    fn cancel(&mut self) {
        self.lifecycle.cancel();
    }
}

/// Single-finger tap. Fires on release if the finger stayed within tolerance.
#[derive(Debug, Clone)]
pub struct Tap {
    lifecycle: Lifecycle,
    tolerance: f64,
    pointer: Option<PointerId>,
    start: Point,
}

impl Tap {
    pub fn new(tolerance: f64) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            tolerance,
            pointer: None,
            start: Point::ZERO,
        }
    }
}

impl Recognizer for Tap {
    fn state(&self) -> RecognizerState {
        self.lifecycle.state
    }

    fn on_touch(&mut self, event: &TouchEvent, touches: &TouchState) -> Vec<Emission> {
        let mut out = Vec::new();
        if self.lifecycle.is_done() {
            return out;
        }
        let payload = GesturePayload::at(event.position, touches.pointer_count());
        let own = self.pointer == Some(event.pointer);
        match event.phase {
            TouchPhase::Down if self.pointer.is_none() => {
                self.pointer = Some(event.pointer);
                self.start = event.position;
            }
            TouchPhase::Down => self.lifecycle.fail(payload, &mut out),
            TouchPhase::Move if own => {
                if exceeds_per_axis(event.position - self.start, self.tolerance) {
                    self.lifecycle.fail(payload, &mut out);
                }
            }
            TouchPhase::Up if own => {
                if exceeds_per_axis(event.position - self.start, self.tolerance) {
                    self.lifecycle.fail(payload, &mut out);
                } else {
                    self.lifecycle.activate(payload, &mut out);
                    self.lifecycle.emit(Signal::Ended, payload, &mut out);
                }
            }
            TouchPhase::Cancel if own => self.lifecycle.fail(payload, &mut out),
            _ => {}
        }
        out
    }

    fn cancel(&mut self) {
        self.lifecycle.cancel();
    }
}

/// Press and hold.
#[derive(Debug, Clone)]
pub struct LongPress {
    lifecycle: Lifecycle,
    hold_ms: u64,
    max_distance: f64,
    pointer: Option<PointerId>,
    start: Point,
    start_ms: u64,
    last: Point,
}

impl LongPress {
    pub fn new(hold_ms: u64, max_distance: f64) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            hold_ms,
            max_distance,
            pointer: None,
            start: Point::ZERO,
            start_ms: 0,
            last: Point::ZERO,
        }
    }

    fn check_timer(&mut self, time_ms: u64, out: &mut Vec<Emission>) {
        if self.pointer.is_none() || self.lifecycle.is_active() || self.lifecycle.is_done() {
            return;
        }
        let held = time_ms.saturating_sub(self.start_ms);
        if held >= self.hold_ms {
            log::debug!("Long press after {held} ms");
            self.lifecycle.activate(GesturePayload::at(self.last, 1), out);
        }
    }
}

impl Recognizer for LongPress {
    fn state(&self) -> RecognizerState {
        self.lifecycle.state
    }

    fn on_touch(&mut self, event: &TouchEvent, touches: &TouchState) -> Vec<Emission> {
        let mut out = Vec::new();
        if self.lifecycle.is_done() {
            return out;
        }
        let payload = GesturePayload::at(event.position, touches.pointer_count());
        let own = self.pointer == Some(event.pointer);
        match event.phase {
            TouchPhase::Down if self.pointer.is_none() => {
                self.pointer = Some(event.pointer);
                self.start = event.position;
                self.last = event.position;
                self.start_ms = event.time_ms;
            }
            TouchPhase::Down if !self.lifecycle.is_active() => {
                self.lifecycle.fail(payload, &mut out);
            }
            TouchPhase::Move if own => {
                self.last = event.position;
                if self.lifecycle.is_active() {
                    self.lifecycle.emit(Signal::Updated, payload, &mut out);
                } else if self.start.distance(event.position) > self.max_distance {
                    self.lifecycle.fail(payload, &mut out);
                } else {
                    self.check_timer(event.time_ms, &mut out);
                }
            }
            TouchPhase::Up if own => {
                if !self.lifecycle.is_active() {
                    self.check_timer(event.time_ms, &mut out);
                }
                if self.lifecycle.is_active() {
                    self.lifecycle.emit(Signal::Ended, payload, &mut out);
                } else {
                    self.lifecycle.fail(payload, &mut out);
                }
            }
            TouchPhase::Cancel if own => self.lifecycle.fail(payload, &mut out),
            _ => {}
        }
        out
    }

    fn on_tick(&mut self, time_ms: u64) -> Vec<Emission> {
        let mut out = Vec::new();
        self.check_timer(time_ms, &mut out);
        out
    }

    fn cancel(&mut self) {
        self.lifecycle.cancel();
    }
}

/// Single-finger drag of a shape body.
///
/// Begins on press, activates once the finger leaves the slop square and
/// then reports per-event deltas. Motion inside the slop is never reported.
#[derive(Debug, Clone)]
pub struct ShapePan {
    lifecycle: Lifecycle,
    slop: f64,
    pointer: Option<PointerId>,
    start: Point,
    last: Point,
}

impl ShapePan {
    pub fn new(slop: f64) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            slop,
            pointer: None,
            start: Point::ZERO,
            last: Point::ZERO,
        }
    }

    fn payload(&self, position: Point, delta: Vec2) -> GesturePayload {
        GesturePayload {
            translation: position - self.start,
            delta,
            ..GesturePayload::at(position, 1)
        }
    }
}

impl Recognizer for ShapePan {
    fn state(&self) -> RecognizerState {
        self.lifecycle.state
    }

    fn on_touch(&mut self, event: &TouchEvent, _touches: &TouchState) -> Vec<Emission> {
        let mut out = Vec::new();
        if self.lifecycle.is_done() {
            return out;
        }
        let own = self.pointer == Some(event.pointer);
        match event.phase {
            TouchPhase::Down if self.pointer.is_none() => {
                self.pointer = Some(event.pointer);
                self.start = event.position;
                self.last = event.position;
                let payload = self.payload(event.position, Vec2::ZERO);
                self.lifecycle.emit(Signal::Began, payload, &mut out);
            }
            TouchPhase::Down if !self.lifecycle.is_active() => {
                let payload = self.payload(self.last, Vec2::ZERO);
                self.lifecycle.fail(payload, &mut out);
            }
            TouchPhase::Move if own => {
                let delta = event.position - self.last;
                self.last = event.position;
                let payload = self.payload(event.position, delta);
                if self.lifecycle.is_active() {
                    log::trace!("Shape pan delta {delta:?}");
                    self.lifecycle.emit(Signal::Updated, payload, &mut out);
                } else if exceeds_per_axis(payload.translation, self.slop) {
                    self.lifecycle.emit(Signal::Activated, payload, &mut out);
                }
            }
            TouchPhase::Up if own => {
                let payload = self.payload(event.position, Vec2::ZERO);
                if self.lifecycle.is_active() {
                    self.lifecycle.emit(Signal::Ended, payload, &mut out);
                } else {
                    self.lifecycle.fail(payload, &mut out);
                }
            }
            TouchPhase::Cancel if own => {
                let payload = self.payload(self.last, Vec2::ZERO);
                self.lifecycle.fail(payload, &mut out);
            }
            _ => {}
        }
        out
    }

    fn cancel(&mut self) {
        self.lifecycle.cancel();
    }
}

/// Drag of a resize handle. Active from the press.
#[derive(Debug, Clone, Default)]
pub struct HandlePan {
    lifecycle: Lifecycle,
    pointer: Option<PointerId>,
    start: Point,
    last: Point,
}

impl HandlePan {
    pub fn new() -> Self {
        Self::default()
    }

    fn payload(&self, position: Point, delta: Vec2) -> GesturePayload {
        GesturePayload {
            translation: position - self.start,
            delta,
            ..GesturePayload::at(position, 1)
        }
    }
}

impl Recognizer for HandlePan {
    fn state(&self) -> RecognizerState {
        self.lifecycle.state
    }

    fn on_touch(&mut self, event: &TouchEvent, _touches: &TouchState) -> Vec<Emission> {
        let mut out = Vec::new();
        if self.lifecycle.is_done() {
            return out;
        }
        let own = self.pointer == Some(event.pointer);
        match event.phase {
            TouchPhase::Down if self.pointer.is_none() => {
                self.pointer = Some(event.pointer);
                self.start = event.position;
                self.last = event.position;
                let payload = self.payload(event.position, Vec2::ZERO);
                self.lifecycle.activate(payload, &mut out);
            }
            TouchPhase::Move if own => {
                let delta = event.position - self.last;
                self.last = event.position;
                let payload = self.payload(event.position, delta);
                self.lifecycle.emit(Signal::Updated, payload, &mut out);
            }
            TouchPhase::Up if own => {
                let payload = self.payload(event.position, Vec2::ZERO);
                self.lifecycle.emit(Signal::Ended, payload, &mut out);
            }
            TouchPhase::Cancel if own => {
                let payload = self.payload(self.last, Vec2::ZERO);
                self.lifecycle.fail(payload, &mut out);
            }
            _ => {}
        }
        out
    }

    fn cancel(&mut self) {
        self.lifecycle.cancel();
    }
}

/// Background drag that draws a selection rectangle. Reports absolute positions.
#[derive(Debug, Clone)]
pub struct MarqueePan {
    lifecycle: Lifecycle,
    slop: f64,
    pointer: Option<PointerId>,
    start: Point,
    last: Point,
}

impl MarqueePan {
    pub fn new(slop: f64) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            slop,
            pointer: None,
            start: Point::ZERO,
            last: Point::ZERO,
        }
    }

    fn payload(&self, position: Point) -> GesturePayload {
        GesturePayload {
            translation: position - self.start,
            ..GesturePayload::at(position, 1)
        }
    }
}

impl Recognizer for MarqueePan {
    fn state(&self) -> RecognizerState {
        self.lifecycle.state
    }

    fn on_touch(&mut self, event: &TouchEvent, _touches: &TouchState) -> Vec<Emission> {
        let mut out = Vec::new();
        if self.lifecycle.is_done() {
            return out;
        }
        let own = self.pointer == Some(event.pointer);
        match event.phase {
            TouchPhase::Down if self.pointer.is_none() => {
                self.pointer = Some(event.pointer);
                self.start = event.position;
                self.last = event.position;
                let payload = self.payload(event.position);
                self.lifecycle.emit(Signal::Began, payload, &mut out);
            }
            TouchPhase::Down if !self.lifecycle.is_active() => {
                let payload = self.payload(self.last);
                self.lifecycle.fail(payload, &mut out);
            }
            TouchPhase::Move if own => {
                self.last = event.position;
                let payload = self.payload(event.position);
                if self.lifecycle.is_active() {
                    self.lifecycle.emit(Signal::Updated, payload, &mut out);
                } else if exceeds_per_axis(payload.translation, self.slop) {
                    self.lifecycle.emit(Signal::Activated, payload, &mut out);
                }
            }
            TouchPhase::Up if own => {
                let payload = self.payload(event.position);
                if self.lifecycle.is_active() {
                    self.lifecycle.emit(Signal::Ended, payload, &mut out);
                } else {
                    self.lifecycle.fail(payload, &mut out);
                }
            }
            TouchPhase::Cancel if own => {
                let payload = self.payload(self.last);
                self.lifecycle.fail(payload, &mut out);
            }
            _ => {}
        }
        out
    }

    fn cancel(&mut self) {
        self.lifecycle.cancel();
    }
}
