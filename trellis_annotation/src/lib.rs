// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Annotation: overlays that live on a node-graph canvas next to the nodes.
//!
//! An [`Annotation`] is a positioned entity with shared state (id, intended and
//! visual position, z-index, visibility, selection, metadata) and one of a
//! closed set of kinds:
//!
//! - [`StickyNote`]: a resizable text note.
//! - [`Marker`]: a small circular badge.
//! - [`Group`]: a titled region that tracks graph nodes. Its [`GroupBehavior`]
//!   decides whether membership is spatial (`Bounds`) or stored (`Explicit`,
//!   `Parent`), and whether the group is fitted to its members.
//!
//! Annotations never own or reach into the graph. Node geometry is resolved
//! through the narrow [`NodeLookup`] and [`DragContext`] traits, which the
//! orchestrator lends for the duration of a call. Generic code reads
//! [`Capabilities`] instead of matching on the kind.
//!
//! Annotations serialize to a flat JSON object with [`Annotation::to_json`] and
//! come back through the lenient [`Annotation::from_json`].
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use kurbo::{Point, Rect, Size};
//! use trellis_annotation::{Annotation, Group, GroupBehavior, NodeId, NodeLookup};
//!
//! struct Nodes(HashMap<NodeId, Rect>);
//!
//! impl NodeLookup for Nodes {
//!     fn node_rect(&self, id: &NodeId) -> Option<Rect> {
//!         self.0.get(id).copied()
//!     }
//! }
//!
//! let nodes = Nodes(HashMap::from([
//!     (NodeId::from("a"), Rect::new(100.0, 100.0, 200.0, 150.0)),
//!     (NodeId::from("b"), Rect::new(300.0, 200.0, 400.0, 250.0)),
//! ]));
//!
//! let group = Group::new("Inputs", Size::new(100.0, 100.0))
//!     .with_behavior(GroupBehavior::Explicit)
//!     .with_members(["a", "b"]);
//! let mut g = Annotation::new("g1", Point::ZERO, group);
//! assert!(g.fit_to_nodes(&nodes));
//!
//! // Default padding is 20 left/right/bottom and 40 on top for the header.
//! assert_eq!(g.position(), Point::new(80.0, 60.0));
//! assert_eq!(g.size(), Size::new(340.0, 210.0));
//! ```

mod annotation;
mod context;
mod error;
mod group;
mod json;
mod marker;
mod note;
mod snap;
mod types;

pub use annotation::{Annotation, AnnotationKind};
pub use context::{DragContext, NoNodes, NodeLookup};
pub use error::AnnotationError;
pub use group::{Group, GroupBehavior};
pub use marker::{Marker, MarkerType};
pub use note::StickyNote;
pub use snap::{GridSnap, NoSnap, SnapPolicy};
pub use types::{AnnotationId, Capabilities, Color, NodeId, RenderLayer};
