//! Gesture dependency graph.

use super::{Enablement, NodeKey, Priority, RecognizerKind, Region};
use crate::selection::Corner;
use crate::shapes::{Shape, ShapeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How one node takes part in arbitration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub kind: RecognizerKind,
    pub region: Region,
    pub priority: Priority,
    pub enablement: Enablement,
    /// Nodes that must fail before this one may deliver anything.
    pub waits_for: Vec<NodeKey>,
    /// Nodes allowed to stay alive when this one activates.
    pub simultaneous_with: Vec<NodeKey>,
}

impl NodeDescriptor {
    pub fn new(kind: RecognizerKind, region: Region, priority: Priority) -> Self {
        Self {
            kind,
            region,
            priority,
            enablement: Enablement::ALWAYS,
            waits_for: Vec::new(),
            simultaneous_with: Vec::new(),
        }
    }

    pub fn with_enablement(mut self, enablement: Enablement) -> Self {
        self.enablement = enablement;
        self
    }

    pub fn waiting_for(mut self, keys: impl IntoIterator<Item = NodeKey>) -> Self {
        self.waits_for.extend(keys);
        self
    }

    pub fn simultaneous_with(mut self, keys: impl IntoIterator<Item = NodeKey>) -> Self {
        self.simultaneous_with.extend(keys);
        self
    }

    pub fn is_simultaneous_with(&self, key: &NodeKey) -> bool {
        self.simultaneous_with.contains(key)
    }
}

/// Registry of recognizer nodes keyed by [`NodeKey`].
#[derive(Debug, Clone, Default)]
pub struct GestureGraph {
    nodes: BTreeMap<NodeKey, NodeDescriptor>,
}

impl GestureGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node.
    pub fn register_node(&mut self, key: NodeKey, descriptor: NodeDescriptor) {
        self.nodes.insert(key, descriptor);
    }

    /// Remove a node. Sequences already running keep their own copy.
    pub fn unregister_node(&mut self, key: &NodeKey) -> Option<NodeDescriptor> {
        self.nodes.remove(key)
    }

    pub fn node(&self, key: &NodeKey) -> Option<&NodeDescriptor> {
        self.nodes.get(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeKey, &NodeDescriptor)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Recompute every node for the given shapes and selection.
    ///
    /// Surface nodes always exist. Each shape gets tap, long-press and pan
    /// nodes; the selected shape additionally gets one handle node per corner.
    pub fn rebuild(&mut self, shapes: &[Shape], selected_id: Option<ShapeId>) {
        self.nodes.clear();

        let handles: Vec<NodeKey> = selected_id
            .filter(|id| shapes.iter().any(|shape| shape.id() == *id))
            .map(|id| Corner::ALL.iter().map(|&c| NodeKey::Handle(id, c)).collect())
            .unwrap_or_default();
        let shape_nodes: Vec<NodeKey> = shapes
            .iter()
            .flat_map(|shape| {
                let id = shape.id();
                [
                    NodeKey::ShapeTap(id),
                    NodeKey::ShapeLongPress(id),
                    NodeKey::ShapePan(id),
                ]
            })
            .collect();

        for key in &handles {
            if let NodeKey::Handle(id, corner) = *key {
                self.register_node(
                    *key,
                    NodeDescriptor::new(
                        RecognizerKind::HandlePan,
                        Region::Handle(id, corner),
                        Priority::HANDLE,
                    ),
                );
            }
        }

        for shape in shapes {
            let id = shape.id();
            let region = Region::Shape(id);
            self.register_node(
                NodeKey::ShapeLongPress(id),
                NodeDescriptor::new(RecognizerKind::LongPress, region, Priority::LONG_PRESS)
                    .with_enablement(Enablement {
                        disabled_while_resizing: true,
                        ..Enablement::ALWAYS
                    })
                    .waiting_for(handles.iter().copied()),
            );
            self.register_node(
                NodeKey::ShapeTap(id),
                NodeDescriptor::new(RecognizerKind::Tap, region, Priority::SHAPE_TAP)
                    .waiting_for([NodeKey::ShapePan(id), NodeKey::ShapeLongPress(id)])
                    .waiting_for(handles.iter().copied()),
            );
            self.register_node(
                NodeKey::ShapePan(id),
                NodeDescriptor::new(RecognizerKind::ShapePan, region, Priority::SHAPE_PAN)
                    .waiting_for(handles.iter().copied()),
            );
        }

        self.register_node(
            NodeKey::Marquee,
            NodeDescriptor::new(RecognizerKind::Marquee, Region::Surface, Priority::MARQUEE)
                .with_enablement(Enablement {
                    requires_select_mode: true,
                    disabled_while_resizing: true,
                    ..Enablement::ALWAYS
                })
                .waiting_for(handles.iter().copied())
                .waiting_for(shape_nodes.iter().copied()),
        );
        self.register_node(
            NodeKey::CanvasPan,
            NodeDescriptor::new(RecognizerKind::CanvasPan, Region::Surface, Priority::CANVAS)
                .with_enablement(Enablement {
                    disabled_while_resizing: true,
                    disabled_in_select_mode: true,
                    disabled_while_marquee: true,
                    ..Enablement::ALWAYS
                })
                .waiting_for(handles.iter().copied())
                .waiting_for(shape_nodes.iter().copied())
                .waiting_for([NodeKey::Marquee])
                .simultaneous_with([NodeKey::CanvasPinch]),
        );
        self.register_node(
            NodeKey::CanvasPinch,
            NodeDescriptor::new(RecognizerKind::CanvasPinch, Region::Surface, Priority::CANVAS)
                .with_enablement(Enablement {
                    disabled_while_resizing: true,
                    ..Enablement::ALWAYS
                })
                .waiting_for(handles.iter().copied())
                .waiting_for(shape_nodes.iter().copied())
                .waiting_for([NodeKey::Marquee])
                .simultaneous_with([NodeKey::CanvasPan]),
        );
        self.register_node(
            NodeKey::BackgroundTap,
            NodeDescriptor::new(RecognizerKind::Tap, Region::Surface, Priority::BACKGROUND_TAP)
                .waiting_for(handles.iter().copied())
                .waiting_for(shape_nodes.iter().copied()),
        );

        log::debug!(
            "Rebuilt gesture graph: {} nodes for {} shapes, selection {:?}",
            self.nodes.len(),
            shapes.len(),
            selected_id
        );
    }
}
