// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unified selection across annotations, nodes, and connections.
//!
//! A selection holds items of exactly one kind at a time. Selecting an item of
//! another kind, whether by replacing or toggling, drops everything else.
//! Several items of the same kind may be selected together.

use core::fmt;

use trellis_annotation::{AnnotationId, NodeId};

/// Stable identity of a connection between two node ports.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Create an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Which kind of item is currently selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionKind {
    /// Canvas annotations.
    Annotations,
    /// Graph nodes.
    Nodes,
    /// Connections between nodes.
    Connections,
}

/// The selected items, all of one [`SelectionKind`]. Insertion order is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    annotations: Vec<AnnotationId>,
    nodes: Vec<NodeId>,
    connections: Vec<ConnectionId>,
}

impl Selection {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The kind of item selected, or `None` when nothing is.
    pub fn kind(&self) -> Option<SelectionKind> {
        if !self.annotations.is_empty() {
            Some(SelectionKind::Annotations)
        } else if !self.nodes.is_empty() {
            Some(SelectionKind::Nodes)
        } else if !self.connections.is_empty() {
            Some(SelectionKind::Connections)
        } else {
            None
        }
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.kind().is_none()
    }

    /// Selected annotations.
    pub fn annotations(&self) -> &[AnnotationId] {
        &self.annotations
    }

    /// Selected nodes.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Selected connections.
    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }

    /// Whether the annotation is selected.
    pub fn contains_annotation(&self, id: &AnnotationId) -> bool {
        self.annotations.contains(id)
    }

    /// Whether the node is selected.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Replace the selection with annotations.
    pub fn set_annotations(&mut self, ids: impl IntoIterator<Item = AnnotationId>) {
        self.clear();
        extend_unique(&mut self.annotations, ids);
    }

    /// Toggle one annotation. Returns whether it is selected afterwards.
    pub fn toggle_annotation(&mut self, id: AnnotationId) -> bool {
        self.nodes.clear();
        self.connections.clear();
        toggle(&mut self.annotations, id)
    }

    /// Replace the selection with nodes.
    pub fn set_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.clear();
        extend_unique(&mut self.nodes, ids);
    }

    /// Toggle one node. Returns whether it is selected afterwards.
    pub fn toggle_node(&mut self, id: NodeId) -> bool {
        self.annotations.clear();
        self.connections.clear();
        toggle(&mut self.nodes, id)
    }

    /// Replace the selection with connections.
    pub fn set_connections(&mut self, ids: impl IntoIterator<Item = ConnectionId>) {
        self.clear();
        extend_unique(&mut self.connections, ids);
    }

    /// Drop one annotation, for example because it was removed.
    pub fn remove_annotation(&mut self, id: &AnnotationId) -> bool {
        remove(&mut self.annotations, id)
    }

    /// Drop nodes, for example because they were deleted from the graph.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| !ids.contains(n));
        self.nodes.len() != before
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.nodes.clear();
        self.connections.clear();
    }
}

fn extend_unique<T: PartialEq>(into: &mut Vec<T>, items: impl IntoIterator<Item = T>) {
    for item in items {
        if !into.contains(&item) {
            into.push(item);
        }
    }
}

fn toggle<T: PartialEq>(items: &mut Vec<T>, item: T) -> bool {
    if remove(items, &item) {
        false
    } else {
        items.push(item);
        true
    }
}

fn remove<T: PartialEq>(items: &mut Vec<T>, item: &T) -> bool {
    match items.iter().position(|i| i == item) {
        Some(at) => {
            items.remove(at);
            true
        }
        None => false,
    }
}
