// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The annotation entity: shared state plus a closed set of kinds.

use kurbo::{Circle, Insets, Point, Rect, Shape, Size, Vec2};
use serde_json::{Map, Value};

use crate::context::{DragContext, NodeLookup};
use crate::group::{Group, GroupBehavior};
use crate::marker::Marker;
use crate::note::StickyNote;
use crate::snap::SnapPolicy;
use crate::types::{AnnotationId, Capabilities, NodeId, RenderLayer};

/// Kind-specific payload of an annotation.
#[derive(Clone, Debug, PartialEq)]
pub enum AnnotationKind {
    /// A resizable text note.
    Sticky(StickyNote),
    /// A circular badge.
    Marker(Marker),
    /// A container tracking graph nodes.
    Group(Group),
}

impl AnnotationKind {
    /// Serialization discriminator.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Sticky(_) => "sticky",
            Self::Marker(_) => "marker",
            Self::Group(_) => "group",
        }
    }
}

impl From<StickyNote> for AnnotationKind {
    fn from(note: StickyNote) -> Self {
        Self::Sticky(note)
    }
}

impl From<Marker> for AnnotationKind {
    fn from(marker: Marker) -> Self {
        Self::Marker(marker)
    }
}

impl From<Group> for AnnotationKind {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

/// A positioned overlay on the canvas, independent of graph nodes.
///
/// `position` is the intended location; `visual_position` is what is displayed
/// and is only ever derived from `position` through a [`SnapPolicy`]
/// ([`Annotation::resnap`]). Until the first resnap the two are equal.
///
/// Lifecycle hooks (`on_*`) are no-ops for leaf kinds. For groups they drive
/// membership and geometry; after calling any hook that may move the
/// annotation, the owner re-derives the visual position.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    id: AnnotationId,
    position: Point,
    visual_position: Point,
    z_index: Option<i32>,
    visible: bool,
    selected: bool,
    interactive: bool,
    metadata: Map<String, Value>,
    kind: AnnotationKind,
}

impl Annotation {
    /// Create a visible, interactive annotation with no z-index assigned yet.
    pub fn new(id: impl Into<AnnotationId>, position: Point, kind: impl Into<AnnotationKind>) -> Self {
        Self {
            id: id.into(),
            position,
            visual_position: position,
            z_index: None,
            visible: true,
            selected: false,
            interactive: true,
            metadata: Map::new(),
            kind: kind.into(),
        }
    }

    /// Builder-style explicit z-index.
    pub fn with_z_index(mut self, z: i32) -> Self {
        self.z_index = Some(z);
        self
    }

    /// Builder-style interactivity. Fixed for the annotation's lifetime.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Builder-style visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Builder-style metadata bag.
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Stable identity.
    pub fn id(&self) -> &AnnotationId {
        &self.id
    }

    /// Intended (pre-snap) position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Displayed (post-snap) position.
    pub fn visual_position(&self) -> Point {
        self.visual_position
    }

    /// Render order within the layer, if one has been assigned.
    pub fn z_index(&self) -> Option<i32> {
        self.z_index
    }

    /// Whether the annotation is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the annotation is selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether the annotation reacts to pointer input.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Opaque host data, preserved through serialization.
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Mutable access to the metadata bag.
    pub fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.metadata
    }

    /// Kind-specific payload.
    pub fn kind(&self) -> &AnnotationKind {
        &self.kind
    }

    /// Mutable kind-specific payload.
    ///
    /// Geometry-affecting group changes should go through the `Annotation`
    /// methods so the position stays consistent.
    pub fn kind_mut(&mut self) -> &mut AnnotationKind {
        &mut self.kind
    }

    /// Serialization discriminator.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// The group payload, if this is a group.
    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            AnnotationKind::Group(g) => Some(g),
            _ => None,
        }
    }

    /// The mutable group payload, if this is a group.
    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match &mut self.kind {
            AnnotationKind::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Move the intended position. Call [`resnap`](Self::resnap) afterwards.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Re-derive the visual position from the intended one.
    pub fn resnap(&mut self, snap: &dyn SnapPolicy) {
        self.visual_position = snap.snap(self.position);
    }

    /// Assign the render order.
    pub fn set_z_index(&mut self, z: i32) {
        self.z_index = Some(z);
    }

    /// Show or hide.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Set the selection flag. The owner keeps the selection set in sync.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Current dimensions.
    pub fn size(&self) -> Size {
        match &self.kind {
            AnnotationKind::Sticky(n) => n.size(),
            AnnotationKind::Marker(m) => Size::new(m.diameter, m.diameter),
            AnnotationKind::Group(g) => g.size(),
        }
    }

    /// Displayed rectangle: visual position plus size.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.visual_position, self.size())
    }

    /// Whether `point` hits the annotation. Markers are circular.
    pub fn contains_point(&self, point: Point) -> bool {
        match &self.kind {
            AnnotationKind::Marker(_) => {
                let bounds = self.bounds();
                Circle::new(bounds.center(), bounds.width() / 2.0).contains(point)
            }
            _ => self.bounds().contains(point),
        }
    }

    /// Capability record for the current kind and behavior.
    pub fn capabilities(&self) -> Capabilities {
        match &self.kind {
            AnnotationKind::Sticky(_) => Capabilities::RESIZABLE,
            AnnotationKind::Marker(_) => Capabilities::empty(),
            AnnotationKind::Group(g) => g.capabilities(),
        }
    }

    /// Whether resize handles apply.
    pub fn is_resizable(&self) -> bool {
        self.capabilities().contains(Capabilities::RESIZABLE)
    }

    /// The smallest size [`set_size`](Self::set_size) accepts.
    pub fn min_size(&self) -> Size {
        match &self.kind {
            AnnotationKind::Sticky(_) => StickyNote::MIN_SIZE,
            AnnotationKind::Group(_) => Group::MIN_SIZE,
            AnnotationKind::Marker(_) => Size::ZERO,
        }
    }

    /// Resize, subject to the kind's own limits. No-op for non-resizable annotations.
    pub fn set_size(&mut self, size: Size) {
        match &mut self.kind {
            AnnotationKind::Sticky(n) => n.set_size(size),
            AnnotationKind::Group(g) => g.set_size(size),
            AnnotationKind::Marker(_) => {}
        }
    }

    /// Layer the annotation renders and hit-tests in.
    pub fn render_layer(&self) -> RenderLayer {
        match self.kind {
            AnnotationKind::Group(_) => RenderLayer::Background,
            _ => RenderLayer::Foreground,
        }
    }

    /// Node ids this annotation wants notifications for.
    pub fn monitored_nodes(&self) -> impl Iterator<Item = &NodeId> + '_ {
        let members = match &self.kind {
            AnnotationKind::Group(g) if g.capabilities().contains(Capabilities::MONITORS_NODES) => {
                Some(g.members())
            }
            _ => None,
        };
        members.into_iter().flatten()
    }

    /// Whether the annotation holds no stored members and asks to be removed when empty.
    pub fn should_remove_when_empty(&self) -> bool {
        self.capabilities()
            .contains(Capabilities::REMOVE_WHEN_EMPTY)
            && self.as_group().is_some_and(Group::is_empty)
    }

    // --- group geometry ---

    /// Fit an explicit group around its resolvable members.
    ///
    /// No-op (returns `false`) for other kinds and behaviors, or when no member resolves.
    pub fn fit_to_nodes(&mut self, lookup: &dyn NodeLookup) -> bool {
        match &mut self.kind {
            AnnotationKind::Group(g) => g.fit(&mut self.position, lookup),
            _ => false,
        }
    }

    /// Change a group's membership behavior.
    ///
    /// - `captured` is merged into the members when leaving `Bounds`.
    /// - `clear_on_bounds` drops stored members when entering `Bounds`.
    /// - Entering `Explicit` with members re-fits immediately if `lookup` is
    ///   given; otherwise geometry stays as is until the next fit.
    ///
    /// Returns `false` if this is not a group.
    pub fn set_behavior(
        &mut self,
        behavior: GroupBehavior,
        captured: Option<&[NodeId]>,
        clear_on_bounds: bool,
        lookup: Option<&dyn NodeLookup>,
    ) -> bool {
        let AnnotationKind::Group(g) = &mut self.kind else {
            return false;
        };
        if g.transition(behavior, captured, clear_on_bounds)
            && let Some(lookup) = lookup
        {
            g.fit(&mut self.position, lookup);
        }
        true
    }

    /// Change a group's padding, re-fitting explicit groups.
    pub fn set_padding(&mut self, padding: Insets, lookup: &dyn NodeLookup) -> bool {
        let AnnotationKind::Group(g) = &mut self.kind else {
            return false;
        };
        g.set_padding(padding);
        g.fit(&mut self.position, lookup);
        true
    }

    /// Whether a group contains the node.
    ///
    /// `Bounds` groups answer spatially from the node's current rectangle and
    /// never consult stored ids; the others answer from their id set.
    pub fn contains_node(&self, id: &NodeId, lookup: &dyn NodeLookup) -> bool {
        match &self.kind {
            AnnotationKind::Group(g) if g.behavior() == GroupBehavior::Bounds => lookup
                .node_rect(id)
                .is_some_and(|r| self.contains_rect(r)),
            AnnotationKind::Group(g) => g.members().contains(id),
            _ => false,
        }
    }

    /// Whether `rect` lies fully inside the displayed rectangle.
    pub fn contains_rect(&self, rect: Rect) -> bool {
        let b = self.bounds();
        b.x0 <= rect.x0 && b.y0 <= rect.y0 && rect.x1 <= b.x1 && rect.y1 <= b.y1
    }

    /// The nodes a group currently contains: spatial for `Bounds`, stored otherwise.
    pub fn contained_nodes(&self, ctx: &dyn DragContext) -> Vec<NodeId> {
        match &self.kind {
            AnnotationKind::Group(g) if g.behavior() == GroupBehavior::Bounds => {
                ctx.find_nodes_in_rect(self.bounds())
            }
            AnnotationKind::Group(g) => g.members().iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    // --- lifecycle hooks ---

    /// A drag is starting. Groups freeze the set of nodes they will move.
    pub fn on_drag_start(&mut self, ctx: &dyn DragContext) {
        let bounds = self.bounds();
        if let AnnotationKind::Group(g) = &mut self.kind {
            g.begin_drag(bounds, ctx);
        }
    }

    /// The annotation was moved by `delta`. Groups move their frozen set along.
    pub fn on_drag_move(&mut self, delta: Vec2, ctx: &mut dyn DragContext) {
        if let AnnotationKind::Group(g) = &self.kind {
            g.drag_by(delta, ctx);
        }
    }

    /// The drag finished or was cancelled.
    pub fn on_drag_end(&mut self) {
        if let AnnotationKind::Group(g) = &mut self.kind {
            g.end_drag();
        }
    }

    /// Nodes were deleted from the graph.
    ///
    /// Returns `true` when the annotation asks to be removed (an explicit group
    /// whose membership became empty through this deletion).
    pub fn on_nodes_deleted(&mut self, deleted: &[NodeId], lookup: &dyn NodeLookup) -> bool {
        let AnnotationKind::Group(g) = &mut self.kind else {
            return false;
        };
        if !g.forget(deleted) {
            return false;
        }
        if g.behavior() != GroupBehavior::Explicit {
            return false;
        }
        if g.is_empty() {
            tracing::debug!(annotation = %self.id, "explicit group lost its last member");
            return true;
        }
        g.fit(&mut self.position, lookup);
        false
    }

    /// A monitored node moved. Explicit groups re-fit; returns whether geometry changed.
    pub fn on_node_moved(&mut self, _id: &NodeId, lookup: &dyn NodeLookup) -> bool {
        self.fit_to_nodes(lookup)
    }

    /// A monitored node was resized. Explicit groups re-fit; returns whether geometry changed.
    pub fn on_node_resized(&mut self, _id: &NodeId, lookup: &dyn NodeLookup) -> bool {
        self.fit_to_nodes(lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::MarkerType;
    use crate::snap::GridSnap;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Graph {
        rects: HashMap<NodeId, Rect>,
        moves: Vec<(Vec<NodeId>, Vec2)>,
    }

    impl Graph {
        fn with(nodes: &[(&str, Rect)]) -> Self {
            Self {
                rects: nodes.iter().map(|(id, r)| (NodeId::from(*id), *r)).collect(),
                moves: Vec::new(),
            }
        }
    }

    impl NodeLookup for Graph {
        fn node_rect(&self, id: &NodeId) -> Option<Rect> {
            self.rects.get(id).copied()
        }
    }

    impl DragContext for Graph {
        fn find_nodes_in_rect(&self, rect: Rect) -> Vec<NodeId> {
            let mut ids: Vec<_> = self
                .rects
                .iter()
                .filter(|(_, r)| {
                    rect.x0 <= r.x0 && rect.y0 <= r.y0 && r.x1 <= rect.x1 && r.y1 <= rect.y1
                })
                .map(|(id, _)| id.clone())
                .collect();
            ids.sort();
            ids
        }

        fn move_nodes(&mut self, ids: &[NodeId], delta: Vec2) {
            for id in ids {
                if let Some(r) = self.rects.get_mut(id) {
                    *r = *r + delta;
                }
            }
            self.moves.push((ids.to_vec(), delta));
        }
    }

    fn explicit(padding: Insets, members: &[&str]) -> Annotation {
        Annotation::new(
            "g",
            Point::ZERO,
            Group::default()
                .with_behavior(GroupBehavior::Explicit)
                .with_padding(padding)
                .with_members(members.iter().copied()),
        )
    }

    fn two_nodes() -> Graph {
        Graph::with(&[
            ("a", Rect::new(0.0, 0.0, 100.0, 50.0)),
            ("b", Rect::new(200.0, 100.0, 300.0, 150.0)),
        ])
    }

    #[test]
    fn fit_wraps_members_with_padding() {
        let graph = two_nodes();
        let mut g = explicit(Group::DEFAULT_PADDING, &["a", "b"]);
        assert!(g.fit_to_nodes(&graph));
        assert_eq!(g.position(), Point::new(-20.0, -40.0));
        // 300 + 20 + 20, 150 + 40 + 20
        assert_eq!(g.size(), Size::new(340.0, 210.0));
    }

    #[test]
    fn fit_with_open_bottom_edge() {
        let graph = two_nodes();
        let mut g = explicit(Insets::new(20.0, 40.0, 20.0, 0.0), &["a", "b"]);
        g.fit_to_nodes(&graph);
        assert_eq!(g.position(), Point::new(-20.0, -40.0));
        assert_eq!(g.size(), Size::new(340.0, 190.0));
    }

    #[test]
    fn fit_skips_stale_members() {
        let graph = two_nodes();
        let mut with_ghost = explicit(Group::DEFAULT_PADDING, &["a", "b", "ghost"]);
        let mut without = explicit(Group::DEFAULT_PADDING, &["a", "b"]);
        with_ghost.fit_to_nodes(&graph);
        without.fit_to_nodes(&graph);
        assert_eq!(with_ghost.position(), without.position());
        assert_eq!(with_ghost.size(), without.size());
    }

    #[test]
    fn fit_without_resolvable_members_is_noop() {
        let graph = Graph::default();
        let mut g = explicit(Group::DEFAULT_PADDING, &["ghost"]);
        let before = (g.position(), g.size());
        assert!(!g.fit_to_nodes(&graph));
        assert_eq!((g.position(), g.size()), before);
    }

    #[test]
    fn fit_only_applies_to_explicit() {
        let graph = two_nodes();
        let mut g = Annotation::new(
            "g",
            Point::new(5.0, 5.0),
            Group::default()
                .with_behavior(GroupBehavior::Parent)
                .with_members(["a"]),
        );
        assert!(!g.fit_to_nodes(&graph));
        assert_eq!(g.position(), Point::new(5.0, 5.0));
    }

    #[test]
    fn bounds_to_explicit_without_lookup_defers_fit() {
        let mut g = Annotation::new("g", Point::new(10.0, 10.0), Group::default());
        let before = (g.position(), g.size());
        let captured = [NodeId::from("A"), NodeId::from("B")];
        assert!(g.set_behavior(GroupBehavior::Explicit, Some(&captured), true, None));
        let members: Vec<_> = g.as_group().unwrap().members().iter().cloned().collect();
        assert_eq!(members, captured.to_vec());
        assert_eq!((g.position(), g.size()), before);
    }

    #[test]
    fn entering_explicit_with_lookup_fits() {
        let graph = two_nodes();
        let mut g = Annotation::new("g", Point::new(10.0, 10.0), Group::default());
        let captured = [NodeId::from("a"), NodeId::from("b")];
        g.set_behavior(
            GroupBehavior::Explicit,
            Some(&captured),
            true,
            Some(&graph as &dyn NodeLookup),
        );
        assert_eq!(g.position(), Point::new(-20.0, -40.0));
    }

    #[test]
    fn bounds_containment_ignores_stored_ids() {
        let graph = Graph::with(&[
            ("in", Rect::new(10.0, 10.0, 20.0, 20.0)),
            ("out", Rect::new(500.0, 500.0, 510.0, 510.0)),
        ]);
        let mut group = Group::default().with_behavior(GroupBehavior::Parent);
        group.add_member(NodeId::from("out"));
        let mut g = Annotation::new("g", Point::ZERO, group);
        // Leave the stale id in place while switching to bounds.
        g.set_behavior(GroupBehavior::Bounds, None, false, None);
        assert!(g.contains_node(&NodeId::from("in"), &graph));
        assert!(!g.contains_node(&NodeId::from("out"), &graph));
        assert_eq!(g.contained_nodes(&graph), vec![NodeId::from("in")]);
    }

    #[test]
    fn bounds_drag_set_is_frozen_at_start() {
        let mut graph = Graph::with(&[
            ("inside", Rect::new(10.0, 10.0, 20.0, 20.0)),
            ("later", Rect::new(450.0, 10.0, 460.0, 20.0)),
        ]);
        let mut g = Annotation::new("g", Point::ZERO, Group::new("g", Size::new(400.0, 300.0)));
        g.on_drag_start(&graph);

        // Sweep the group right so that "later" ends up inside its rectangle.
        for _ in 0..10 {
            let delta = Vec2::new(10.0, 0.0);
            g.set_position(g.position() + delta);
            g.resnap(&crate::snap::NoSnap);
            g.on_drag_move(delta, &mut graph);
        }
        assert!(g.contains_rect(graph.rects[&NodeId::from("later")]));
        g.on_drag_end();

        assert_eq!(graph.rects[&NodeId::from("inside")].x0, 110.0);
        assert_eq!(graph.rects[&NodeId::from("later")].x0, 450.0);
        assert!(graph.moves.iter().all(|(ids, _)| ids == &[NodeId::from("inside")]));
        assert!(g.as_group().unwrap().drag_set().is_none());
    }

    #[test]
    fn explicit_group_drags_members() {
        let mut graph = two_nodes();
        let mut g = explicit(Group::DEFAULT_PADDING, &["a", "b"]);
        g.on_drag_start(&graph);
        g.on_drag_move(Vec2::new(5.0, 7.0), &mut graph);
        g.on_drag_end();
        assert_eq!(graph.rects[&NodeId::from("b")].origin(), Point::new(205.0, 107.0));
        assert_eq!(graph.moves.len(), 1);
    }

    #[test]
    fn deleting_all_members_of_explicit_group_requests_removal() {
        let graph = two_nodes();
        let mut g = explicit(Group::DEFAULT_PADDING, &["a", "b"]);
        g.fit_to_nodes(&graph);

        let after_a = Graph::with(&[("b", Rect::new(200.0, 100.0, 300.0, 150.0))]);
        assert!(!g.on_nodes_deleted(&[NodeId::from("a")], &after_a));
        assert_eq!(g.position(), Point::new(180.0, 60.0));
        assert_eq!(g.size(), Size::new(140.0, 110.0));

        assert!(g.on_nodes_deleted(&[NodeId::from("b")], &Graph::default()));
        assert!(g.should_remove_when_empty());
    }

    #[test]
    fn deleting_members_of_parent_group_never_requests_removal() {
        let mut g = Annotation::new(
            "g",
            Point::ZERO,
            Group::default()
                .with_behavior(GroupBehavior::Parent)
                .with_members(["a"]),
        );
        assert!(!g.on_nodes_deleted(&[NodeId::from("a")], &Graph::default()));
        assert!(g.as_group().unwrap().is_empty());
        assert!(!g.should_remove_when_empty());
    }

    #[test]
    fn unrelated_deletions_do_not_touch_geometry() {
        let graph = two_nodes();
        let mut g = explicit(Group::DEFAULT_PADDING, &["a", "b"]);
        g.fit_to_nodes(&graph);
        let before = (g.position(), g.size());
        assert!(!g.on_nodes_deleted(&[NodeId::from("zzz")], &Graph::default()));
        assert_eq!((g.position(), g.size()), before);
    }

    #[test]
    fn node_moves_only_refit_explicit_groups() {
        let mut graph = two_nodes();
        let mut exp = explicit(Group::DEFAULT_PADDING, &["a", "b"]);
        exp.fit_to_nodes(&graph);
        let mut parent = Annotation::new(
            "p",
            Point::ZERO,
            Group::default()
                .with_behavior(GroupBehavior::Parent)
                .with_members(["a", "b"]),
        );
        graph.move_nodes(&[NodeId::from("a")], Vec2::new(-100.0, 0.0));
        assert!(exp.on_node_moved(&NodeId::from("a"), &graph));
        assert_eq!(exp.position(), Point::new(-120.0, -40.0));
        assert!(!parent.on_node_moved(&NodeId::from("a"), &graph));
        assert_eq!(parent.position(), Point::ZERO);
    }

    #[test]
    fn visual_position_is_derived() {
        let mut note = Annotation::new("n", Point::new(13.0, 27.0), StickyNote::default());
        assert_eq!(note.visual_position(), Point::new(13.0, 27.0));
        note.resnap(&GridSnap::new(10.0));
        assert_eq!(note.visual_position(), Point::new(10.0, 30.0));
        assert_eq!(note.position(), Point::new(13.0, 27.0));
    }

    #[test]
    fn marker_hit_test_is_circular() {
        let m = Annotation::new("m", Point::ZERO, Marker::new(MarkerType::Risk));
        assert!(m.contains_point(Point::new(12.0, 12.0)));
        assert!(!m.contains_point(Point::new(1.0, 1.0)), "corner is outside the circle");
        assert!(!m.is_resizable());
    }

    #[test]
    fn leaf_hooks_are_noops() {
        let mut graph = two_nodes();
        let mut note = Annotation::new("n", Point::ZERO, StickyNote::default());
        let before = note.clone();
        note.on_drag_start(&graph);
        note.on_drag_move(Vec2::new(1.0, 1.0), &mut graph);
        note.on_drag_end();
        assert!(!note.on_nodes_deleted(&[NodeId::from("a")], &graph));
        assert_eq!(note, before);
        assert!(graph.moves.is_empty());
        assert_eq!(note.monitored_nodes().count(), 0);
    }
}
