// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Canvas: the headless orchestrator for annotations on a node graph.
//!
//! A [`Canvas`] owns the annotations of one editor surface and is the single
//! writer of their geometry. It keeps a spatial index, the selection, the node
//! monitoring registry, and a change bus in sync with every write.
//!
//! - Selection holds annotations, nodes, or connections, never a mix.
//! - Drag and resize run as sessions: `start_*`, any number of `update_*`,
//!   then `end_*` or `cancel_*`. Only one of each is active at a time.
//! - Dragging a group carries its nodes through the host's [`NodeStore`].
//!   While a drag is active, node move notifications are dropped so a group
//!   never re-fits in response to its own drag. Explicit groups settle once
//!   when the drag ends.
//! - Z-order: new annotations go on top. Stepping forward or backward
//!   first normalizes to a dense `0..N` sequence, then swaps within the
//!   annotation's render layer.
//! - Node notifications reach only the annotations that declared interest in
//!   those node ids ([`NodeMonitors`]).
//! - Snapshots are `{"annotations": [...]}` JSON documents.
//!
//! Host integration is the [`NodeStore`] trait. [`MemoryNodeStore`] is a
//! ready-made implementation for tests and tools.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Rect, Size, Vec2};
//! use trellis_annotation::{AnnotationId, GroupBehavior, NodeId};
//! use trellis_canvas::{Canvas, MemoryNodeStore, NodeStore};
//!
//! let mut store = MemoryNodeStore::new();
//! store.insert("a", Rect::new(0.0, 0.0, 100.0, 50.0));
//! store.insert("b", Rect::new(200.0, 100.0, 300.0, 150.0));
//! store.take_events();
//!
//! let mut canvas = Canvas::default();
//! canvas.select_nodes([NodeId::from("a"), NodeId::from("b")]);
//! canvas.group_selected_nodes("g", "Inputs", GroupBehavior::Explicit, &store);
//!
//! let g = AnnotationId::from("g");
//! assert_eq!(canvas.get(&g).unwrap().position(), Point::new(-20.0, -40.0));
//! assert_eq!(canvas.get(&g).unwrap().size(), Size::new(340.0, 210.0));
//!
//! // The new group is selected, so dragging moves it and its members.
//! canvas.start_drag(&mut store);
//! canvas.update_drag(Vec2::new(10.0, 10.0), &mut store);
//! canvas.end_drag(&mut store);
//!
//! assert_eq!(
//!     store.intended_rect(&NodeId::from("a")),
//!     Some(Rect::new(10.0, 10.0, 110.0, 60.0))
//! );
//! assert_eq!(canvas.get(&g).unwrap().position(), Point::new(-10.0, -30.0));
//! ```

mod canvas;
mod changes;
mod config;
mod monitor;
mod selection;
mod session;
mod store;

pub use canvas::Canvas;
pub use changes::{ChangeBus, ChangeFlags, SubscriptionId};
pub use config::CanvasConfig;
pub use monitor::NodeMonitors;
pub use selection::{ConnectionId, Selection, SelectionKind};
pub use session::ResizeHandle;
pub use store::{MemoryNodeStore, NodeEvent, NodeStore};
