// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag and resize session state.
//!
//! Sessions are bounded by start, update, and end (or cancel) calls from the
//! host gesture system. They hold only ids and pre-gesture geometry; the
//! annotations themselves live in the [`Canvas`](crate::Canvas).

use hashbrown::HashSet;
use kurbo::{Point, Rect, Size, Vec2};
use trellis_annotation::{AnnotationId, DragContext, NodeId, NodeLookup};

use crate::store::NodeStore;

/// One of the eight resize grips around an annotation's rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    /// Top-left corner.
    TopLeft,
    /// Middle of the top edge.
    Top,
    /// Top-right corner.
    TopRight,
    /// Middle of the right edge.
    Right,
    /// Bottom-right corner.
    BottomRight,
    /// Middle of the bottom edge.
    Bottom,
    /// Bottom-left corner.
    BottomLeft,
    /// Middle of the left edge.
    Left,
}

impl ResizeHandle {
    /// All handles, clockwise from the top-left corner.
    pub const ALL: [Self; 8] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::Left,
    ];

    /// Whether the handle drags the left edge.
    pub fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::Left | Self::BottomLeft)
    }

    /// Whether the handle drags the right edge.
    pub fn moves_right(self) -> bool {
        matches!(self, Self::TopRight | Self::Right | Self::BottomRight)
    }

    /// Whether the handle drags the top edge.
    pub fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::Top | Self::TopRight)
    }

    /// Whether the handle drags the bottom edge.
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::Bottom | Self::BottomRight)
    }

    /// Where the handle sits on `rect`.
    pub fn anchor(self, rect: Rect) -> Point {
        let c = rect.center();
        let x = if self.moves_left() {
            rect.x0
        } else if self.moves_right() {
            rect.x1
        } else {
            c.x
        };
        let y = if self.moves_top() {
            rect.y0
        } else if self.moves_bottom() {
            rect.y1
        } else {
            c.y
        };
        Point::new(x, y)
    }

    /// The handle of `rect` within `tolerance` of `point`, corners first.
    pub fn hit(rect: Rect, point: Point, tolerance: f64) -> Option<Self> {
        const CORNERS_FIRST: [ResizeHandle; 8] = [
            ResizeHandle::TopLeft,
            ResizeHandle::TopRight,
            ResizeHandle::BottomRight,
            ResizeHandle::BottomLeft,
            ResizeHandle::Top,
            ResizeHandle::Right,
            ResizeHandle::Bottom,
            ResizeHandle::Left,
        ];
        CORNERS_FIRST.into_iter().find(|h| {
            let a = h.anchor(rect);
            (a.x - point.x).abs() <= tolerance && (a.y - point.y).abs() <= tolerance
        })
    }
}

/// Apply a handle drag of `delta` to `start`, clamping each dimension to `floor`.
///
/// When a leading edge (left or top) would push the size below the floor, the
/// leading edge is pulled back so the trailing edge stays where it was.
pub(crate) fn resize_rect(handle: ResizeHandle, start: Rect, delta: Vec2, floor: Size) -> Rect {
    let (mut x0, mut y0, mut x1, mut y1) = (start.x0, start.y0, start.x1, start.y1);
    if handle.moves_left() {
        x0 += delta.x;
    }
    if handle.moves_right() {
        x1 += delta.x;
    }
    if handle.moves_top() {
        y0 += delta.y;
    }
    if handle.moves_bottom() {
        y1 += delta.y;
    }
    if x1 - x0 < floor.width {
        if handle.moves_left() {
            x0 = x1 - floor.width;
        } else {
            x1 = x0 + floor.width;
        }
    }
    if y1 - y0 < floor.height {
        if handle.moves_top() {
            y0 = y1 - floor.height;
        } else {
            y1 = y0 + floor.height;
        }
    }
    Rect::new(x0, y0, x1, y1)
}

/// State of an active drag of one or more annotations.
#[derive(Clone, Debug)]
pub(crate) struct DragSession {
    /// Participants and their intended positions at drag start.
    pub(crate) participants: Vec<(AnnotationId, Point)>,
    /// Accumulated pointer delta.
    pub(crate) total: Vec2,
    /// Every node moved on behalf of this drag.
    pub(crate) moved_nodes: HashSet<NodeId>,
}

impl DragSession {
    pub(crate) fn new(participants: Vec<(AnnotationId, Point)>) -> Self {
        Self {
            participants,
            total: Vec2::ZERO,
            moved_nodes: HashSet::new(),
        }
    }
}

/// State of an active resize of one annotation.
#[derive(Clone, Debug)]
pub(crate) struct ResizeSession {
    pub(crate) id: AnnotationId,
    pub(crate) handle: ResizeHandle,
    /// Intended rectangle at resize start.
    pub(crate) start: Rect,
    pub(crate) total: Vec2,
}

/// The [`DragContext`] lent to annotations during one drag step.
///
/// A node is moved at most once per step, however many dragged groups list it.
pub(crate) struct StepContext<'a, S> {
    pub(crate) store: &'a mut S,
    pub(crate) moved: &'a mut HashSet<NodeId>,
}

impl<S: NodeStore> NodeLookup for StepContext<'_, S> {
    fn node_rect(&self, id: &NodeId) -> Option<Rect> {
        self.store.node_rect(id)
    }
}

impl<S: NodeStore> DragContext for StepContext<'_, S> {
    fn find_nodes_in_rect(&self, rect: Rect) -> Vec<NodeId> {
        self.store.find_nodes_in_rect(rect)
    }

    fn move_nodes(&mut self, ids: &[NodeId], delta: Vec2) {
        let fresh: Vec<NodeId> = ids
            .iter()
            .filter(|id| self.moved.insert((*id).clone()))
            .cloned()
            .collect();
        if !fresh.is_empty() {
            self.store.move_nodes(&fresh, delta);
        }
    }
}
