//! Tapboard Core Library
//!
//! Platform-agnostic shape model, camera and gesture arbitration for the
//! Tapboard touch whiteboard. Hosts feed touch events, ticks and intents into
//! a [`Board`] and render its [`BoardSnapshot`].

pub mod board;
pub mod camera;
pub mod config;
pub mod gesture;
pub mod input;
pub mod marquee;
pub mod router;
pub mod selection;
pub mod shapes;
pub mod store;

pub use board::{Board, BoardSnapshot, Intent};
pub use camera::{Camera, CameraSnapshot};
pub use config::{BoardConfig, CameraConfig, ConfigError, GestureConfig};
pub use gesture::{
    Arbiter, ArbitrationContext, GestureGraph, GestureOutcome, GesturePayload, NodeDescriptor,
    NodeKey, Transition,
};
pub use input::{PointerId, TouchEvent, TouchPhase};
pub use marquee::Marquee;
pub use selection::{Corner, Handle};
pub use shapes::{Shape, ShapeDraft, ShapeId, ShapeKind};
pub use store::{Session, ShapeStore};
