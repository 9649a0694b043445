// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The annotation orchestrator.

use hashbrown::HashSet;
use kurbo::{Insets, Point, Rect, Size, Vec2};
use serde_json::{Value, json};
use tracing::{debug, trace, warn};
use trellis_annotation::{
    Annotation, AnnotationId, AnnotationKind, Color, DragContext, Group, GroupBehavior, NoSnap,
    NodeId, NodeLookup, RenderLayer, SnapPolicy,
};
use trellis_index::{GridIndex, SpatialIndex, rects_overlap};

use crate::changes::{ChangeBus, ChangeFlags, SubscriptionId};
use crate::config::CanvasConfig;
use crate::monitor::NodeMonitors;
use crate::selection::{ConnectionId, Selection, SelectionKind};
use crate::session::{DragSession, ResizeHandle, ResizeSession, StepContext, resize_rect};
use crate::store::{NodeEvent, NodeStore};

/// Owns the annotations of one canvas and every interaction on them.
///
/// The canvas is the only writer of annotation geometry, of the spatial index
/// `X`, and (through [`DragContext::move_nodes`]) of node positions. Every
/// geometry write is applied to the annotation first and then pushed to the
/// index and the [`ChangeBus`], so observers never see a half-applied update.
///
/// Operations that name an unknown id, or that are not allowed in the current
/// state, do nothing and report it through their return value.
#[derive(Debug)]
pub struct Canvas<X: SpatialIndex<AnnotationId> = GridIndex<AnnotationId>> {
    config: CanvasConfig,
    // Insertion order.
    annotations: Vec<Annotation>,
    index: X,
    snap: Box<dyn SnapPolicy>,
    selection: Selection,
    monitors: NodeMonitors,
    changes: ChangeBus,
    drag: Option<DragSession>,
    resize: Option<ResizeSession>,
    drop_target: Option<(NodeId, AnnotationId)>,
    // Held for the whole drag session.
    suppress_node_events: bool,
}

impl Canvas {
    /// A canvas backed by a [`GridIndex`] with the configured cell size.
    pub fn new(config: CanvasConfig) -> Self {
        Self::with_index(GridIndex::new(config.index_cell_size), config)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

fn z_of(a: &Annotation) -> i32 {
    a.z_index().unwrap_or(0)
}

// Topmost sorts last.
fn paint_key(a: &Annotation) -> (RenderLayer, i32, &AnnotationId) {
    (a.render_layer(), z_of(a), a.id())
}

impl<X: SpatialIndex<AnnotationId>> Canvas<X> {
    /// A canvas backed by a caller-supplied spatial index.
    pub fn with_index(mut index: X, config: CanvasConfig) -> Self {
        index.clear();
        Self {
            config,
            annotations: Vec::new(),
            index,
            snap: Box::new(NoSnap),
            selection: Selection::new(),
            monitors: NodeMonitors::new(),
            changes: ChangeBus::new(),
            drag: None,
            resize: None,
            drop_target: None,
            suppress_node_events: false,
        }
    }

    /// The configuration the canvas was built with.
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Number of annotations.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Whether the canvas holds no annotations.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Whether an annotation with this id exists.
    pub fn contains(&self, id: &AnnotationId) -> bool {
        self.position_of(id).is_some()
    }

    /// Look up an annotation.
    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    /// Annotations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations.iter()
    }

    /// The spatial index, kept in sync with every annotation's visual bounds.
    pub fn index(&self) -> &X {
        &self.index
    }

    /// The node monitoring registry.
    pub fn monitors(&self) -> &NodeMonitors {
        &self.monitors
    }

    /// Whether node move/resize notifications are currently being dropped.
    pub fn node_events_suppressed(&self) -> bool {
        self.suppress_node_events
    }

    fn position_of(&self, id: &AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| a.id() == id)
    }

    /// Resnap, then push the annotation's bounds to the index and notify observers.
    fn commit(&mut self, at: usize, flags: ChangeFlags) {
        let a = &mut self.annotations[at];
        a.resnap(&*self.snap);
        self.index.update(a.id().clone(), a.bounds());
        self.changes.publish(a.id(), flags);
    }

    fn resync_monitoring(&mut self, at: usize) {
        let a = &self.annotations[at];
        self.monitors.watch(a.id(), a.monitored_nodes());
    }

    // --- collection ---

    /// Add an annotation.
    ///
    /// An unset z-index becomes one above the current maximum; explicit values
    /// are kept. Returns `false` if the id is already taken.
    pub fn add(&mut self, mut annotation: Annotation) -> bool {
        if self.contains(annotation.id()) {
            warn!(annotation = %annotation.id(), "duplicate annotation id, add ignored");
            return false;
        }
        if annotation.z_index().is_none() {
            let z = self
                .annotations
                .iter()
                .map(z_of)
                .max()
                .map_or(0, |z| z.saturating_add(1));
            annotation.set_z_index(z);
        }
        annotation.set_selected(false);
        annotation.resnap(&*self.snap);
        self.index.update(annotation.id().clone(), annotation.bounds());
        self.annotations.push(annotation);
        self.resync_monitoring(self.annotations.len() - 1);
        true
    }

    /// Remove an annotation and every reference the canvas holds to it.
    pub fn remove(&mut self, id: &AnnotationId) -> Option<Annotation> {
        let at = self.position_of(id)?;
        let mut annotation = self.annotations.remove(at);
        self.index.remove(id);
        self.monitors.unwatch(id);
        self.selection.remove_annotation(id);
        annotation.set_selected(false);
        annotation.on_drag_end();
        if let Some(drag) = &mut self.drag {
            drag.participants.retain(|(p, _)| p != id);
        }
        if self.resize.as_ref().is_some_and(|r| &r.id == id) {
            self.resize = None;
        }
        if self.drop_target.as_ref().is_some_and(|(_, g)| g == id) {
            self.drop_target = None;
        }
        self.changes.publish(id, ChangeFlags::REMOVED);
        Some(annotation)
    }

    /// Remove every annotation and end all sessions.
    pub fn clear(&mut self) {
        for a in self.annotations.drain(..) {
            self.changes.publish(a.id(), ChangeFlags::REMOVED);
        }
        self.index.clear();
        self.monitors.clear();
        if self.selection.kind() == Some(SelectionKind::Annotations) {
            self.selection.clear();
        }
        self.drag = None;
        self.resize = None;
        self.drop_target = None;
        self.suppress_node_events = false;
    }

    // --- selection ---

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected annotations, in selection order.
    pub fn selected_annotations(&self) -> &[AnnotationId] {
        self.selection.annotations()
    }

    /// Kind of the current selection.
    pub fn selection_kind(&self) -> Option<SelectionKind> {
        self.selection.kind()
    }

    /// Replace the selection with one annotation, clearing node and connection selection.
    pub fn select_annotation(&mut self, id: &AnnotationId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selection.set_annotations([id.clone()]);
        self.sync_selection();
        true
    }

    /// Replace the selection with several annotations. Unknown ids are skipped.
    pub fn select_annotations(&mut self, ids: impl IntoIterator<Item = AnnotationId>) {
        let known: Vec<AnnotationId> = ids.into_iter().filter(|id| self.contains(id)).collect();
        self.selection.set_annotations(known);
        self.sync_selection();
    }

    /// Toggle one annotation. Returns whether it is selected afterwards.
    pub fn toggle_annotation(&mut self, id: &AnnotationId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let selected = self.selection.toggle_annotation(id.clone());
        self.sync_selection();
        selected
    }

    /// Replace the selection with nodes.
    pub fn select_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.selection.set_nodes(ids);
        self.sync_selection();
    }

    /// Toggle one node. Returns whether it is selected afterwards.
    pub fn toggle_node(&mut self, id: NodeId) -> bool {
        let selected = self.selection.toggle_node(id);
        self.sync_selection();
        selected
    }

    /// Replace the selection with connections.
    pub fn select_connections(&mut self, ids: impl IntoIterator<Item = ConnectionId>) {
        self.selection.set_connections(ids);
        self.sync_selection();
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.sync_selection();
    }

    fn sync_selection(&mut self) {
        for a in &mut self.annotations {
            let selected = self.selection.contains_annotation(a.id());
            if a.is_selected() != selected {
                a.set_selected(selected);
                self.changes.publish(a.id(), ChangeFlags::SELECTION);
            }
        }
    }

    // --- drag session ---

    /// Whether a drag session is active.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start dragging the selected interactive annotations.
    ///
    /// Each participant freezes the set of nodes it will carry. Ignored while
    /// another drag is active or when nothing draggable is selected.
    pub fn start_drag<S: NodeStore>(&mut self, store: &mut S) -> bool {
        if self.drag.is_some() {
            warn!("drag session already active, start ignored");
            return false;
        }
        let mut participants = Vec::new();
        for a in &mut self.annotations {
            if a.is_selected() && a.is_interactive() {
                a.on_drag_start(&*store);
                participants.push((a.id().clone(), a.position()));
            }
        }
        if participants.is_empty() {
            return false;
        }
        debug!(participants = participants.len(), "drag started");
        self.suppress_node_events = true;
        self.drag = Some(DragSession::new(participants));
        true
    }

    /// Select `id` unless it is already selected, then start a drag.
    pub fn start_drag_on<S: NodeStore>(&mut self, id: &AnnotationId, store: &mut S) -> bool {
        if self.drag.is_some() {
            warn!(annotation = %id, "drag session already active, start ignored");
            return false;
        }
        if !self.selection.contains_annotation(id) && !self.select_annotation(id) {
            return false;
        }
        self.start_drag(store)
    }

    /// Move the drag by `delta` since the previous update.
    ///
    /// All participants are repositioned first, then carried nodes are moved
    /// (each at most once), and only then are the index and observers updated.
    pub fn update_drag<S: NodeStore>(&mut self, delta: Vec2, store: &mut S) -> bool {
        let Some(mut session) = self.drag.take() else {
            return false;
        };
        session.total += delta;

        let mut touched = Vec::with_capacity(session.participants.len());
        for (id, origin) in &session.participants {
            if let Some(at) = self.position_of(id) {
                let a = &mut self.annotations[at];
                a.set_position(*origin + session.total);
                a.resnap(&*self.snap);
                touched.push(at);
            }
        }

        let mut step = HashSet::new();
        {
            let mut ctx = StepContext {
                store: &mut *store,
                moved: &mut step,
            };
            for &at in &touched {
                self.annotations[at].on_drag_move(delta, &mut ctx);
            }
        }
        session.moved_nodes.extend(step);

        for &at in &touched {
            let a = &self.annotations[at];
            self.index.update(a.id().clone(), a.bounds());
            self.changes.publish(a.id(), ChangeFlags::POSITION);
        }
        self.drag = Some(session);
        self.pump_node_events(store);
        true
    }

    /// Finish the drag. Positions are kept.
    ///
    /// The guard is released after the store's pending notifications (the echo
    /// of this drag's own moves) have been drained. Explicit groups watching a
    /// node the drag carried are then re-fitted once.
    pub fn end_drag<S: NodeStore>(&mut self, store: &mut S) -> bool {
        let Some(session) = self.drag.take() else {
            self.suppress_node_events = false;
            return false;
        };
        self.pump_node_events(store);
        self.suppress_node_events = false;
        for (id, _) in &session.participants {
            if let Some(at) = self.position_of(id) {
                self.annotations[at].on_drag_end();
            }
        }
        let moved: Vec<NodeId> = session.moved_nodes.into_iter().collect();
        self.route_geometry_change(&moved, false, &*store);
        debug!(
            participants = session.participants.len(),
            moved_nodes = moved.len(),
            "drag ended"
        );
        true
    }

    /// Abort the drag. Identical to [`end_drag`](Self::end_drag): moves are committed.
    pub fn cancel_drag<S: NodeStore>(&mut self, store: &mut S) -> bool {
        self.end_drag(store)
    }

    // --- resize session ---

    /// Whether a resize session is active.
    pub fn is_resizing(&self) -> bool {
        self.resize.is_some()
    }

    /// Start resizing an annotation from `handle`.
    ///
    /// Ignored while another resize is active, and for annotations that are
    /// not resizable (markers, explicit groups) or not interactive.
    pub fn start_resize(&mut self, id: &AnnotationId, handle: ResizeHandle) -> bool {
        if self.resize.is_some() {
            warn!(annotation = %id, "resize session already active, start ignored");
            return false;
        }
        let Some(a) = self.get(id) else {
            return false;
        };
        if !a.is_resizable() || !a.is_interactive() {
            return false;
        }
        let start = Rect::from_origin_size(a.position(), a.size());
        debug!(annotation = %id, ?handle, "resize started");
        self.resize = Some(ResizeSession {
            id: id.clone(),
            handle,
            start,
            total: Vec2::ZERO,
        });
        true
    }

    /// Move the active handle by `delta` since the previous update.
    ///
    /// The candidate rectangle is clamped to the larger of
    /// [`CanvasConfig::min_resize_size`] and the annotation's own minimum,
    /// keeping the trailing edge fixed. The annotation's own `set_size` runs
    /// last; if it clamps further, leading-edge handles still keep the
    /// trailing edge in place.
    pub fn update_resize(&mut self, delta: Vec2) -> bool {
        let Some(session) = self.resize.as_mut() else {
            return false;
        };
        session.total += delta;
        let (id, handle, start, total) = (
            session.id.clone(),
            session.handle,
            session.start,
            session.total,
        );
        let Some(at) = self
            .position_of(&id)
            .filter(|&at| self.annotations[at].is_resizable())
        else {
            debug!(annotation = %id, "resize target gone or no longer resizable, session ended");
            self.resize = None;
            return false;
        };

        let a = &mut self.annotations[at];
        let own = a.min_size();
        let floor = Size::new(
            self.config.min_resize_size.width.max(own.width),
            self.config.min_resize_size.height.max(own.height),
        );
        let target = resize_rect(handle, start, total, floor);
        a.set_size(target.size());
        let actual = a.size();
        let mut origin = target.origin();
        if handle.moves_left() {
            origin.x = target.x1 - actual.width;
        }
        if handle.moves_top() {
            origin.y = target.y1 - actual.height;
        }
        a.set_position(origin);
        self.commit(at, ChangeFlags::POSITION | ChangeFlags::SIZE);
        true
    }

    /// Finish the resize. The current geometry is kept.
    pub fn end_resize(&mut self) -> bool {
        let Some(session) = self.resize.take() else {
            return false;
        };
        debug!(annotation = %session.id, "resize ended");
        true
    }

    /// Abort the resize. Identical to [`end_resize`](Self::end_resize).
    pub fn cancel_resize(&mut self) -> bool {
        self.end_resize()
    }

    /// The resize handle of a selected, resizable annotation under `point`.
    pub fn resize_handle_at(
        &self,
        point: Point,
        tolerance: f64,
    ) -> Option<(AnnotationId, ResizeHandle)> {
        self.annotations
            .iter()
            .filter(|a| a.is_selected() && a.is_visible() && a.is_resizable())
            .filter_map(|a| ResizeHandle::hit(a.bounds(), point, tolerance).map(|h| (a, h)))
            .max_by(|(a, _), (b, _)| paint_key(a).cmp(&paint_key(b)))
            .map(|(a, h)| (a.id().clone(), h))
    }

    // --- z-order ---

    // Indices into `annotations`, bottom to top by (z, id).
    fn stacking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.annotations.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&self.annotations[a], &self.annotations[b]);
            (z_of(a), a.id()).cmp(&(z_of(b), b.id()))
        });
        order
    }

    // Indices of the annotations sharing `layer`, bottom to top by (z, id).
    fn layer_stacking(&self, layer: RenderLayer) -> Vec<usize> {
        self.stacking()
            .into_iter()
            .filter(|&at| self.annotations[at].render_layer() == layer)
            .collect()
    }

    // z-indices of the other annotations painted in the same layer as `at`.
    fn layer_peers_z(&self, at: usize) -> impl Iterator<Item = i32> + '_ {
        let layer = self.annotations[at].render_layer();
        self.annotations
            .iter()
            .enumerate()
            .filter(move |(i, a)| *i != at && a.render_layer() == layer)
            .map(|(_, a)| z_of(a))
    }

    fn set_z(&mut self, at: usize, z: i32) {
        let a = &mut self.annotations[at];
        if a.z_index() != Some(z) {
            a.set_z_index(z);
            self.changes.publish(a.id(), ChangeFlags::Z_INDEX);
        }
    }

    /// Place the annotation above every other one in its render layer.
    pub fn bring_to_front(&mut self, id: &AnnotationId) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        let top = self.layer_peers_z(at).max();
        match top {
            Some(top) if z_of(&self.annotations[at]) <= top => {
                self.set_z(at, top.saturating_add(1));
                true
            }
            _ => false,
        }
    }

    /// Place the annotation below every other one in its render layer.
    pub fn send_to_back(&mut self, id: &AnnotationId) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        let bottom = self.layer_peers_z(at).min();
        match bottom {
            Some(bottom) if z_of(&self.annotations[at]) >= bottom => {
                self.set_z(at, bottom.saturating_sub(1));
                true
            }
            _ => false,
        }
    }

    /// Reassign z-indices to a dense `0..N` sequence in (z, id) order.
    ///
    /// Returns whether any value changed.
    pub fn normalize_z_order(&mut self) -> bool {
        let mut changed = false;
        for (rank, at) in self.stacking().into_iter().enumerate() {
            let z = i32::try_from(rank).unwrap_or(i32::MAX);
            if self.annotations[at].z_index() != Some(z) {
                self.set_z(at, z);
                changed = true;
            }
        }
        if changed {
            debug!(count = self.annotations.len(), "z-order normalized");
        }
        changed
    }

    /// Swap the annotation with the one painted directly above it in the same
    /// render layer.
    pub fn bring_forward(&mut self, id: &AnnotationId) -> bool {
        self.step_z(id, true)
    }

    /// Swap the annotation with the one painted directly below it in the same
    /// render layer.
    pub fn send_backward(&mut self, id: &AnnotationId) -> bool {
        self.step_z(id, false)
    }

    fn step_z(&mut self, id: &AnnotationId, up: bool) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        self.normalize_z_order();
        let order = self.layer_stacking(self.annotations[at].render_layer());
        let Some(pos) = order.iter().position(|&i| i == at) else {
            return false;
        };
        let neighbor = if up {
            order.get(pos + 1)
        } else {
            pos.checked_sub(1).and_then(|p| order.get(p))
        };
        let Some(&other) = neighbor else {
            return false;
        };
        let (za, zb) = (z_of(&self.annotations[at]), z_of(&self.annotations[other]));
        self.set_z(at, zb);
        self.set_z(other, za);
        true
    }

    // --- hit testing ---

    /// Visible annotations bottom to top: background layer first, then by z.
    pub fn paint_order(&self) -> Vec<&Annotation> {
        let mut out: Vec<&Annotation> = self.annotations.iter().filter(|a| a.is_visible()).collect();
        out.sort_by(|a, b| paint_key(a).cmp(&paint_key(b)));
        out
    }

    /// The topmost visible, interactive annotation under `point`.
    ///
    /// Foreground annotations win over background ones, then higher z.
    pub fn annotation_at(&self, point: Point) -> Option<&AnnotationId> {
        self.index
            .query_point(point)
            .into_iter()
            .filter_map(|id| self.get(&id))
            .filter(|a| a.is_visible() && a.is_interactive() && a.contains_point(point))
            .max_by(|a, b| paint_key(a).cmp(&paint_key(b)))
            .map(Annotation::id)
    }

    /// Visible annotations overlapping `rect`, bottom to top.
    pub fn annotations_in_rect(&self, rect: Rect) -> Vec<&AnnotationId> {
        let mut hits: Vec<&Annotation> = self
            .index
            .query_rect(rect)
            .into_iter()
            .filter_map(|id| self.get(&id))
            .filter(|a| a.is_visible() && rects_overlap(a.bounds(), rect))
            .collect();
        hits.sort_by(|a, b| paint_key(a).cmp(&paint_key(b)));
        hits.into_iter().map(Annotation::id).collect()
    }

    /// Groups that contain `node`: spatially for bounds groups, by id otherwise.
    pub fn groups_containing(&self, node: &NodeId, lookup: &dyn NodeLookup) -> Vec<&AnnotationId> {
        self.annotations
            .iter()
            .filter(|a| a.contains_node(node, lookup))
            .map(Annotation::id)
            .collect()
    }

    // --- modifier drop onto groups ---

    /// Track a node drag. While `modifier_held`, surfaces the topmost group
    /// that overlaps the node, stores membership, and does not contain it yet.
    pub fn update_node_drag(
        &mut self,
        node: &NodeId,
        modifier_held: bool,
        lookup: &dyn NodeLookup,
    ) -> Option<&AnnotationId> {
        self.drop_target = None;
        if !modifier_held {
            return None;
        }
        let rect = lookup.node_rect(node)?;
        let target = self
            .annotations
            .iter()
            .filter(|a| a.is_visible() && a.is_interactive())
            .filter(|a| {
                a.as_group().is_some_and(|g| {
                    g.behavior().stores_members() && !g.members().contains(node)
                })
            })
            .filter(|a| rects_overlap(a.bounds(), rect))
            .max_by(|a, b| paint_key(a).cmp(&paint_key(b)))
            .map(|a| a.id().clone());
        self.drop_target = target.map(|g| (node.clone(), g));
        self.drop_candidate()
    }

    /// The group currently highlighted as the drop target, if any.
    pub fn drop_candidate(&self) -> Option<&AnnotationId> {
        self.drop_target.as_ref().map(|(_, g)| g)
    }

    /// Finish a node drag: add the node to the highlighted group, if any.
    ///
    /// Returns the group the node joined.
    pub fn finish_node_drag(&mut self, node: &NodeId, lookup: &dyn NodeLookup) -> Option<AnnotationId> {
        let (dragged, group) = self.drop_target.take()?;
        if &dragged != node {
            return None;
        }
        self.add_group_member(&group, node.clone(), lookup)
            .then_some(group)
    }

    /// Forget the drop target without changing membership.
    pub fn cancel_node_drag(&mut self) {
        self.drop_target = None;
    }

    // --- editing ---

    /// Move an annotation's intended position.
    pub fn set_position(&mut self, id: &AnnotationId, position: Point) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        self.annotations[at].set_position(position);
        self.commit(at, ChangeFlags::POSITION);
        true
    }

    /// Resize a resizable annotation directly, subject to its own limits.
    pub fn set_size(&mut self, id: &AnnotationId, size: Size) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        if !self.annotations[at].is_resizable() {
            return false;
        }
        self.annotations[at].set_size(size);
        self.commit(at, ChangeFlags::SIZE);
        true
    }

    /// Show or hide an annotation.
    pub fn set_visible(&mut self, id: &AnnotationId, visible: bool) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        if self.annotations[at].is_visible() == visible {
            return false;
        }
        self.annotations[at].set_visible(visible);
        self.changes.publish(id, ChangeFlags::VISIBILITY);
        true
    }

    /// Recolor any annotation.
    pub fn set_color(&mut self, id: &AnnotationId, color: Color) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        match self.annotations[at].kind_mut() {
            AnnotationKind::Sticky(n) => n.color = color,
            AnnotationKind::Marker(m) => m.color = color,
            AnnotationKind::Group(g) => g.color = color,
        }
        self.changes.publish(id, ChangeFlags::CONTENT);
        true
    }

    /// Replace a sticky note's text.
    pub fn set_note_text(&mut self, id: &AnnotationId, text: impl Into<String>) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        let AnnotationKind::Sticky(note) = self.annotations[at].kind_mut() else {
            return false;
        };
        note.text = text.into();
        self.changes.publish(id, ChangeFlags::CONTENT);
        true
    }

    /// Retitle a group.
    pub fn set_group_title(&mut self, id: &AnnotationId, title: impl Into<String>) -> bool {
        let Some(group) = self.group_mut(id) else {
            return false;
        };
        group.title = title.into();
        self.changes.publish(id, ChangeFlags::CONTENT);
        true
    }

    fn group_mut(&mut self, id: &AnnotationId) -> Option<&mut Group> {
        let at = self.position_of(id)?;
        self.annotations[at].as_group_mut()
    }

    /// Change a group's membership behavior.
    ///
    /// Leaving `Bounds` captures the nodes currently inside the group as
    /// members. Entering `Explicit` re-fits right away.
    pub fn set_group_behavior<S: DragContext>(
        &mut self,
        id: &AnnotationId,
        behavior: GroupBehavior,
        clear_on_bounds: bool,
        store: &S,
    ) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        let a = &mut self.annotations[at];
        let Some(from) = a.as_group().map(Group::behavior) else {
            return false;
        };
        let captured = (from == GroupBehavior::Bounds && behavior.stores_members())
            .then(|| a.contained_nodes(store));
        a.set_behavior(
            behavior,
            captured.as_deref(),
            clear_on_bounds,
            Some(store as &dyn NodeLookup),
        );
        debug!(group = %id, from = from.name(), to = behavior.name(), "group behavior changed");
        if !self.annotations[at].is_resizable() && self.resize.as_ref().is_some_and(|r| &r.id == id) {
            debug!(group = %id, "resize session ended by behavior change");
            self.resize = None;
        }
        self.resync_monitoring(at);
        self.commit(
            at,
            ChangeFlags::MEMBERSHIP | ChangeFlags::POSITION | ChangeFlags::SIZE,
        );
        true
    }

    /// Add a node to a group's stored membership. Rejected for bounds groups.
    pub fn add_group_member(&mut self, id: &AnnotationId, node: NodeId, lookup: &dyn NodeLookup) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        let added = self.annotations[at]
            .as_group_mut()
            .is_some_and(|g| g.add_member(node));
        if !added {
            return false;
        }
        self.annotations[at].fit_to_nodes(lookup);
        self.resync_monitoring(at);
        self.commit(
            at,
            ChangeFlags::MEMBERSHIP | ChangeFlags::POSITION | ChangeFlags::SIZE,
        );
        true
    }

    /// Remove a node from a group's stored membership.
    ///
    /// A group that asks to be removed when empty is removed once its last
    /// member goes.
    pub fn remove_group_member(&mut self, id: &AnnotationId, node: &NodeId, lookup: &dyn NodeLookup) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        let removed = self.annotations[at]
            .as_group_mut()
            .is_some_and(|g| g.remove_member(node));
        if !removed {
            return false;
        }
        if self.annotations[at].should_remove_when_empty() {
            debug!(group = %id, "group emptied, removing");
            self.remove(id);
            return true;
        }
        self.annotations[at].fit_to_nodes(lookup);
        self.resync_monitoring(at);
        self.commit(
            at,
            ChangeFlags::MEMBERSHIP | ChangeFlags::POSITION | ChangeFlags::SIZE,
        );
        true
    }

    /// Re-fit an explicit group around its members.
    pub fn fit_group(&mut self, id: &AnnotationId, lookup: &dyn NodeLookup) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        if !self.annotations[at].fit_to_nodes(lookup) {
            return false;
        }
        self.commit(at, ChangeFlags::POSITION | ChangeFlags::SIZE);
        true
    }

    /// Change a group's padding, re-fitting explicit groups.
    pub fn set_group_padding(&mut self, id: &AnnotationId, padding: Insets, lookup: &dyn NodeLookup) -> bool {
        let Some(at) = self.position_of(id) else {
            return false;
        };
        if !self.annotations[at].set_padding(padding, lookup) {
            return false;
        }
        self.commit(at, ChangeFlags::POSITION | ChangeFlags::SIZE);
        true
    }

    /// Wrap the selected nodes in a new group with the configured padding,
    /// then select the group.
    ///
    /// Returns `false` when no selected node resolves or the id is taken.
    pub fn group_selected_nodes(
        &mut self,
        id: impl Into<AnnotationId>,
        title: impl Into<String>,
        behavior: GroupBehavior,
        lookup: &dyn NodeLookup,
    ) -> bool {
        let id = id.into();
        let nodes = self.selection.nodes().to_vec();
        let Some(bbox) = nodes
            .iter()
            .filter_map(|n| lookup.node_rect(n))
            .reduce(|acc, r| acc.union(r))
        else {
            return false;
        };
        let pad = self.config.default_group_padding;
        let framed = Rect::new(
            bbox.x0 - pad.x0,
            bbox.y0 - pad.y0,
            bbox.x1 + pad.x1,
            bbox.y1 + pad.y1,
        );
        let group = Group::new(title, framed.size())
            .with_behavior(behavior)
            .with_padding(pad)
            .with_members(nodes);
        if !self.add(Annotation::new(id.clone(), framed.origin(), group)) {
            return false;
        }
        self.select_annotation(&id)
    }

    // --- node notifications ---

    /// Route one node notification to exactly the annotations watching those nodes.
    ///
    /// Move and resize notifications are dropped while a drag holds the guard.
    /// Deletions always go through: watching groups forget the nodes, and
    /// explicit groups left empty are removed.
    pub fn handle_node_event(&mut self, event: &NodeEvent, lookup: &dyn NodeLookup) {
        match event {
            NodeEvent::Moved(ids) | NodeEvent::Resized(ids) if self.suppress_node_events => {
                trace!(count = ids.len(), "node geometry notification suppressed");
            }
            NodeEvent::Moved(ids) => self.route_geometry_change(ids, false, lookup),
            NodeEvent::Resized(ids) => self.route_geometry_change(ids, true, lookup),
            NodeEvent::Deleted(ids) => self.forget_nodes(ids, lookup),
            NodeEvent::Added(ids) => trace!(count = ids.len(), "nodes added"),
        }
    }

    /// Drain the store's pending notifications and handle each.
    pub fn pump_node_events<S: NodeStore>(&mut self, store: &mut S) {
        for event in store.take_events() {
            self.handle_node_event(&event, &*store);
        }
    }

    fn route_geometry_change(&mut self, ids: &[NodeId], resized: bool, lookup: &dyn NodeLookup) {
        for watcher in self.monitors.watchers_of_any(ids) {
            let Some(at) = self.position_of(&watcher) else {
                continue;
            };
            let Some(node) = ids
                .iter()
                .find(|n| self.monitors.watchers(n).contains(&watcher))
            else {
                continue;
            };
            let a = &mut self.annotations[at];
            let changed = if resized {
                a.on_node_resized(node, lookup)
            } else {
                a.on_node_moved(node, lookup)
            };
            if changed {
                self.commit(at, ChangeFlags::POSITION | ChangeFlags::SIZE);
            }
        }
    }

    fn forget_nodes(&mut self, ids: &[NodeId], lookup: &dyn NodeLookup) {
        self.selection.remove_nodes(ids);
        if self
            .drop_target
            .as_ref()
            .is_some_and(|(n, _)| ids.contains(n))
        {
            self.drop_target = None;
        }
        for watcher in self.monitors.watchers_of_any(ids) {
            let Some(at) = self.position_of(&watcher) else {
                continue;
            };
            if self.annotations[at].on_nodes_deleted(ids, lookup) {
                debug!(group = %watcher, "explicit group lost all members, removing");
                self.remove(&watcher);
                continue;
            }
            self.resync_monitoring(at);
            self.commit(
                at,
                ChangeFlags::MEMBERSHIP | ChangeFlags::POSITION | ChangeFlags::SIZE,
            );
        }
    }

    // --- change bus ---

    /// Observe writes to one annotation.
    pub fn subscribe(&mut self, id: &AnnotationId) -> SubscriptionId {
        self.changes.subscribe(id.clone())
    }

    /// Stop observing.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.changes.unsubscribe(subscription)
    }

    /// Take the changes accumulated for a subscription since the last call.
    pub fn take_changes(&mut self, subscription: SubscriptionId) -> ChangeFlags {
        self.changes.take(subscription)
    }

    // --- snapping ---

    /// Replace the snap policy and re-derive every visual position.
    pub fn set_snap_policy(&mut self, snap: impl SnapPolicy + 'static) {
        self.snap = Box::new(snap);
        for at in 0..self.annotations.len() {
            let before = self.annotations[at].visual_position();
            self.annotations[at].resnap(&*self.snap);
            if self.annotations[at].visual_position() != before {
                self.commit(at, ChangeFlags::POSITION);
            }
        }
    }

    // --- snapshots ---

    /// Serialize every annotation, in insertion order, as `{"annotations": [...]}`.
    pub fn to_json(&self) -> Value {
        let annotations: Vec<Value> = self.annotations.iter().map(Annotation::to_json).collect();
        json!({ "annotations": annotations })
    }

    /// Replace the collection with a snapshot. Malformed entries are skipped.
    ///
    /// Returns how many annotations were loaded.
    pub fn load_json(&mut self, snapshot: &Value) -> usize {
        self.clear();
        let Some(entries) = snapshot.get("annotations").and_then(Value::as_array) else {
            warn!("snapshot has no `annotations` array");
            return 0;
        };
        let mut loaded = 0;
        for (index, entry) in entries.iter().enumerate() {
            match Annotation::from_json(entry) {
                Ok(annotation) => {
                    if self.add(annotation) {
                        loaded += 1;
                    }
                }
                Err(err) => warn!(index, %err, "skipping malformed snapshot entry"),
            }
        }
        debug!(loaded, skipped = entries.len() - loaded, "snapshot loaded");
        loaded
    }
}
