// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Narrow capability traits injected into annotation callbacks.
//!
//! Annotations never reach into the graph store. During a drag or a node
//! lifecycle callback the orchestrator lends them one of these views, scoped
//! to the duration of the call.

use kurbo::{Rect, Vec2};

use crate::types::NodeId;

/// Resolve node geometry by id.
pub trait NodeLookup {
    /// The rendered (snapped) rectangle of a node, or `None` if the id is
    /// stale or unknown.
    fn node_rect(&self, id: &NodeId) -> Option<Rect>;
}

/// Capabilities available to an annotation while it is being dragged.
pub trait DragContext: NodeLookup {
    /// Ids of nodes whose rectangle lies fully inside `rect`.
    fn find_nodes_in_rect(&self, rect: Rect) -> Vec<NodeId>;

    /// Move nodes by `delta`. Unknown ids are skipped.
    fn move_nodes(&mut self, ids: &[NodeId], delta: Vec2);
}

/// A lookup that resolves nothing.
///
/// Useful when a caller has no graph at hand; every member is treated as stale.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoNodes;

impl NodeLookup for NoNodes {
    fn node_rect(&self, _id: &NodeId) -> Option<Rect> {
        None
    }
}
