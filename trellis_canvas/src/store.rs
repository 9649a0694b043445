// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host graph contract and an in-memory reference store.

use core::mem;

use hashbrown::HashMap;
use kurbo::{Rect, Vec2};
use trellis_annotation::{DragContext, NoSnap, NodeId, NodeLookup, SnapPolicy};
use trellis_index::rect_contains_rect;

/// A change notification about graph nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeEvent {
    /// Nodes changed position.
    Moved(Vec<NodeId>),
    /// Nodes changed size.
    Resized(Vec<NodeId>),
    /// Nodes were removed from the graph.
    Deleted(Vec<NodeId>),
    /// Nodes were added to the graph.
    Added(Vec<NodeId>),
}

impl NodeEvent {
    /// The node ids the event is about.
    pub fn ids(&self) -> &[NodeId] {
        match self {
            Self::Moved(ids) | Self::Resized(ids) | Self::Deleted(ids) | Self::Added(ids) => ids,
        }
    }
}

/// The host graph as seen by a [`Canvas`](crate::Canvas).
///
/// The canvas only mutates nodes through [`DragContext::move_nodes`], always
/// by id. Stores that emit change notifications queue them and hand them out
/// through [`take_events`](Self::take_events); the canvas drains the queue
/// after every bulk move it initiates, which is where feedback from its own
/// moves is filtered out.
pub trait NodeStore: DragContext {
    /// Drain pending notifications, oldest first.
    fn take_events(&mut self) -> Vec<NodeEvent> {
        Vec::new()
    }
}

#[derive(Clone, Debug)]
struct StoredNode {
    rect: Rect,
    visual: Rect,
    revision: u64,
}

/// A simple node store backed by a hash map.
///
/// Each node has an intended rectangle and a visual rectangle whose origin is
/// snapped by the store's [`SnapPolicy`]. Every geometry write bumps the node's
/// revision and queues a [`NodeEvent`].
#[derive(Debug)]
pub struct MemoryNodeStore {
    nodes: HashMap<NodeId, StoredNode>,
    snap: Box<dyn SnapPolicy>,
    events: Vec<NodeEvent>,
}

impl Default for MemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNodeStore {
    /// Create an empty store without snapping.
    pub fn new() -> Self {
        Self::with_snap(NoSnap)
    }

    /// Create an empty store that snaps node origins with `snap`.
    pub fn with_snap(snap: impl SnapPolicy + 'static) -> Self {
        Self {
            nodes: HashMap::new(),
            snap: Box::new(snap),
            events: Vec::new(),
        }
    }

    /// Insert or replace a node.
    pub fn insert(&mut self, id: impl Into<NodeId>, rect: Rect) {
        let id = id.into();
        let visual = self.snapped(rect);
        let revision = self.nodes.get(&id).map_or(0, |n| n.revision + 1);
        self.nodes.insert(
            id.clone(),
            StoredNode {
                rect,
                visual,
                revision,
            },
        );
        self.events.push(NodeEvent::Added(vec![id]));
    }

    /// Remove a node, returning its intended rectangle.
    pub fn remove(&mut self, id: &NodeId) -> Option<Rect> {
        let node = self.nodes.remove(id)?;
        self.events.push(NodeEvent::Deleted(vec![id.clone()]));
        Some(node.rect)
    }

    /// Replace a node's intended rectangle. Unknown ids are ignored.
    pub fn set_rect(&mut self, id: &NodeId, rect: Rect) -> bool {
        let visual = self.snapped(rect);
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let moved = node.rect.origin() != rect.origin();
        let resized = node.rect.size() != rect.size();
        node.rect = rect;
        node.visual = visual;
        node.revision += 1;
        if moved {
            self.events.push(NodeEvent::Moved(vec![id.clone()]));
        }
        if resized {
            self.events.push(NodeEvent::Resized(vec![id.clone()]));
        }
        true
    }

    /// The intended (unsnapped) rectangle of a node.
    pub fn intended_rect(&self, id: &NodeId) -> Option<Rect> {
        self.nodes.get(id).map(|n| n.rect)
    }

    /// How many geometry writes the node has seen since insertion.
    pub fn revision(&self, id: &NodeId) -> Option<u64> {
        self.nodes.get(id).map(|n| n.revision)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn snapped(&self, rect: Rect) -> Rect {
        let origin = self.snap.snap(rect.origin());
        Rect::from_origin_size(origin, rect.size())
    }
}

impl NodeLookup for MemoryNodeStore {
    fn node_rect(&self, id: &NodeId) -> Option<Rect> {
        self.nodes.get(id).map(|n| n.visual)
    }
}

impl DragContext for MemoryNodeStore {
    fn find_nodes_in_rect(&self, rect: Rect) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, n)| rect_contains_rect(rect, n.visual))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    fn move_nodes(&mut self, ids: &[NodeId], delta: Vec2) {
        let mut moved = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            node.rect = node.rect + delta;
            node.visual = Rect::from_origin_size(self.snap.snap(node.rect.origin()), node.rect.size());
            node.revision += 1;
            moved.push(id.clone());
        }
        if !moved.is_empty() {
            self.events.push(NodeEvent::Moved(moved));
        }
    }
}

impl NodeStore for MemoryNodeStore {
    fn take_events(&mut self) -> Vec<NodeEvent> {
        mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_annotation::GridSnap;

    #[test]
    fn moves_bump_revisions_and_queue_one_event() {
        let mut store = MemoryNodeStore::new();
        store.insert("a", Rect::new(0.0, 0.0, 10.0, 10.0));
        store.insert("b", Rect::new(20.0, 0.0, 30.0, 10.0));
        store.take_events();

        let ids = [NodeId::from("a"), NodeId::from("b"), NodeId::from("gone")];
        store.move_nodes(&ids, Vec2::new(5.0, 5.0));

        assert_eq!(store.revision(&ids[0]), Some(1));
        assert_eq!(store.node_rect(&ids[1]), Some(Rect::new(25.0, 5.0, 35.0, 15.0)));
        assert_eq!(
            store.take_events(),
            vec![NodeEvent::Moved(vec![ids[0].clone(), ids[1].clone()])]
        );
        assert!(store.take_events().is_empty());
    }

    #[test]
    fn lookups_report_snapped_rects() {
        let mut store = MemoryNodeStore::with_snap(GridSnap::new(10.0));
        let a = NodeId::from("a");
        store.insert(a.clone(), Rect::new(3.0, 14.0, 53.0, 44.0));
        assert_eq!(store.intended_rect(&a), Some(Rect::new(3.0, 14.0, 53.0, 44.0)));
        assert_eq!(store.node_rect(&a), Some(Rect::new(0.0, 10.0, 50.0, 40.0)));
    }

    #[test]
    fn containment_query_is_full_containment() {
        let mut store = MemoryNodeStore::new();
        store.insert("in", Rect::new(10.0, 10.0, 20.0, 20.0));
        store.insert("edge", Rect::new(90.0, 90.0, 110.0, 110.0));
        assert_eq!(
            store.find_nodes_in_rect(Rect::new(0.0, 0.0, 100.0, 100.0)),
            vec![NodeId::from("in")]
        );
    }

    #[test]
    fn set_rect_classifies_the_change() {
        let mut store = MemoryNodeStore::new();
        let a = NodeId::from("a");
        store.insert(a.clone(), Rect::new(0.0, 0.0, 10.0, 10.0));
        store.take_events();
        assert!(store.set_rect(&a, Rect::new(0.0, 0.0, 20.0, 10.0)));
        assert_eq!(store.take_events(), vec![NodeEvent::Resized(vec![a.clone()])]);
        assert!(!store.set_rect(&NodeId::from("b"), Rect::ZERO));
        assert_eq!(store.remove(&a), Some(Rect::new(0.0, 0.0, 20.0, 10.0)));
        assert_eq!(store.take_events(), vec![NodeEvent::Deleted(vec![a])]);
    }
}
