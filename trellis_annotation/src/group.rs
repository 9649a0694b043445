// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Groups: container annotations that track a set of graph nodes.
//!
//! A group's relationship to nodes is governed by its [`GroupBehavior`]:
//!
//! | Behavior   | Membership                         | Size              | Drag moves            |
//! |------------|------------------------------------|-------------------|-----------------------|
//! | `Bounds`   | nodes fully inside, queried live   | manual            | nodes inside at start |
//! | `Explicit` | stored id set                      | fitted to members | members               |
//! | `Parent`   | stored id set                      | manual            | members               |
//!
//! Geometry that depends on the group's position (fitting, the drag set of a
//! `Bounds` group) is driven through [`Annotation`](crate::Annotation), which
//! owns the position. This module holds the membership state machine.

use std::collections::BTreeSet;

use kurbo::{Insets, Point, Rect, Size, Vec2};

use crate::context::{DragContext, NodeLookup};
use crate::types::{Capabilities, Color, NodeId};

/// How a group relates to the nodes it contains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GroupBehavior {
    /// Membership is purely spatial and computed on demand.
    #[default]
    Bounds,
    /// Membership is an explicit id set; size is always fitted to the members.
    Explicit,
    /// Membership is an explicit id set; size is manual and members co-move.
    Parent,
}

impl GroupBehavior {
    /// Serialized name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bounds => "bounds",
            Self::Explicit => "explicit",
            Self::Parent => "parent",
        }
    }

    /// Parse a serialized name; unknown names fall back to [`GroupBehavior::Bounds`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "explicit" => Self::Explicit,
            "parent" => Self::Parent,
            _ => Self::Bounds,
        }
    }

    /// Whether membership is stored as ids rather than computed spatially.
    pub fn stores_members(self) -> bool {
        !matches!(self, Self::Bounds)
    }
}

/// A titled region grouping graph nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    /// Header title.
    pub title: String,
    /// Tint color.
    pub color: Color,
    behavior: GroupBehavior,
    members: BTreeSet<NodeId>,
    padding: Insets,
    size: Size,
    // Frozen for the duration of one drag.
    drag_set: Option<Vec<NodeId>>,
}

impl Group {
    /// Smallest size a manually sized group can be resized to.
    pub const MIN_SIZE: Size = Size::new(50.0, 50.0);

    /// Default padding: left, top, right, bottom. The top edge leaves room for the header.
    pub const DEFAULT_PADDING: Insets = Insets {
        x0: 20.0,
        y0: 40.0,
        x1: 20.0,
        y1: 20.0,
    };

    /// Create an empty `Bounds` group of the given size.
    pub fn new(title: impl Into<String>, size: Size) -> Self {
        Self {
            title: title.into(),
            color: Color::GROUP,
            behavior: GroupBehavior::Bounds,
            members: BTreeSet::new(),
            padding: Self::DEFAULT_PADDING,
            size: at_least(size, Self::MIN_SIZE),
            drag_set: None,
        }
    }

    /// Builder-style behavior. Unlike [`Annotation::set_behavior`](crate::Annotation::set_behavior)
    /// this does not touch membership or geometry.
    pub fn with_behavior(mut self, behavior: GroupBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Builder-style membership. Ignored for `Bounds` groups.
    pub fn with_members<I, T>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        if self.behavior.stores_members() {
            self.members.extend(members.into_iter().map(Into::into));
        }
        self
    }

    /// Builder-style padding.
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    /// Builder-style color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Current membership behavior.
    pub fn behavior(&self) -> GroupBehavior {
        self.behavior
    }

    /// Stored member ids. Always empty for `Bounds` groups built through this API.
    pub fn members(&self) -> &BTreeSet<NodeId> {
        &self.members
    }

    /// Padding applied when fitting: left (`x0`), top (`y0`), right (`x1`), bottom (`y1`).
    pub fn padding(&self) -> Insets {
        self.padding
    }

    /// Current size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Explicit groups derive their size; the others are resizable.
    pub fn is_resizable(&self) -> bool {
        self.behavior != GroupBehavior::Explicit
    }

    /// Resize a manually sized group, clamped to [`MIN_SIZE`](Self::MIN_SIZE).
    /// No-op for `Explicit` groups.
    pub fn set_size(&mut self, size: Size) {
        if self.is_resizable() {
            self.size = at_least(size, Self::MIN_SIZE);
        }
    }

    /// Add a node to the stored membership.
    ///
    /// Returns `false` for `Bounds` groups (containment there is spatial only)
    /// and for ids that are already members.
    pub fn add_member(&mut self, id: NodeId) -> bool {
        if !self.behavior.stores_members() {
            return false;
        }
        self.members.insert(id)
    }

    /// Remove a node from the stored membership. Returns whether it was a member.
    pub fn remove_member(&mut self, id: &NodeId) -> bool {
        self.members.remove(id)
    }

    /// Drop every stored member.
    pub fn clear_members(&mut self) {
        self.members.clear();
    }

    /// Whether the stored membership is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Capabilities for the current behavior.
    pub fn capabilities(&self) -> Capabilities {
        match self.behavior {
            GroupBehavior::Bounds => Capabilities::RESIZABLE,
            GroupBehavior::Explicit => {
                Capabilities::MONITORS_NODES | Capabilities::REMOVE_WHEN_EMPTY
            }
            GroupBehavior::Parent => Capabilities::RESIZABLE | Capabilities::MONITORS_NODES,
        }
    }

    /// Union of the rendered rectangles of all resolvable members.
    pub fn member_bounds(&self, lookup: &dyn NodeLookup) -> Option<Rect> {
        self.members
            .iter()
            .filter_map(|id| lookup.node_rect(id))
            .reduce(|acc, r| acc.union(r))
    }

    /// The drag set captured at drag start, if a drag is in progress.
    pub fn drag_set(&self) -> Option<&[NodeId]> {
        self.drag_set.as_deref()
    }

    /// Restore decoded state as stored: the size is not clamped and members
    /// are kept whatever the behavior.
    pub(crate) fn restore(&mut self, size: Size, members: impl IntoIterator<Item = NodeId>) {
        self.size = Size::new(size.width.max(0.0), size.height.max(0.0));
        self.members.extend(members);
    }

    pub(crate) fn set_padding(&mut self, padding: Insets) {
        self.padding = padding;
    }

    /// Fit `position` and size around the members. Explicit groups only.
    pub(crate) fn fit(&mut self, position: &mut Point, lookup: &dyn NodeLookup) -> bool {
        if self.behavior != GroupBehavior::Explicit {
            return false;
        }
        let Some(bbox) = self.member_bounds(lookup) else {
            return false;
        };
        let p = self.padding;
        *position = Point::new(bbox.x0 - p.x0, bbox.y0 - p.y0);
        self.size = Size::new(bbox.width() + p.x0 + p.x1, bbox.height() + p.y0 + p.y1);
        true
    }

    /// Apply a behavior transition. Returns whether the group should be re-fitted.
    pub(crate) fn transition(
        &mut self,
        behavior: GroupBehavior,
        captured: Option<&[NodeId]>,
        clear_on_bounds: bool,
    ) -> bool {
        let from = self.behavior;
        match behavior {
            GroupBehavior::Bounds => {
                if clear_on_bounds {
                    self.members.clear();
                }
            }
            GroupBehavior::Explicit | GroupBehavior::Parent => {
                if from == GroupBehavior::Bounds
                    && let Some(ids) = captured
                {
                    self.members.extend(ids.iter().cloned());
                }
            }
        }
        self.behavior = behavior;
        behavior == GroupBehavior::Explicit && !self.members.is_empty()
    }

    pub(crate) fn begin_drag(&mut self, current: Rect, ctx: &dyn DragContext) {
        let set = match self.behavior {
            GroupBehavior::Bounds => ctx.find_nodes_in_rect(current),
            GroupBehavior::Explicit | GroupBehavior::Parent => {
                self.members.iter().cloned().collect()
            }
        };
        self.drag_set = Some(set);
    }

    pub(crate) fn drag_by(&self, delta: Vec2, ctx: &mut dyn DragContext) {
        if let Some(set) = &self.drag_set
            && !set.is_empty()
        {
            ctx.move_nodes(set, delta);
        }
    }

    pub(crate) fn end_drag(&mut self) {
        self.drag_set = None;
    }

    /// Forget deleted members. Returns whether any were members.
    pub(crate) fn forget(&mut self, deleted: &[NodeId]) -> bool {
        let before = self.members.len();
        for id in deleted {
            self.members.remove(id);
        }
        self.members.len() != before
    }
}

fn at_least(size: Size, min: Size) -> Size {
    Size::new(size.width.max(min.width), size.height.max(min.height))
}

impl Default for Group {
    fn default() -> Self {
        Self::new("Group", Size::new(400.0, 300.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_behavior_name_is_bounds() {
        assert_eq!(GroupBehavior::from_name("explicit"), GroupBehavior::Explicit);
        assert_eq!(GroupBehavior::from_name("parent"), GroupBehavior::Parent);
        assert_eq!(GroupBehavior::from_name("bounds"), GroupBehavior::Bounds);
        assert_eq!(GroupBehavior::from_name("Explicit"), GroupBehavior::Bounds);
        assert_eq!(GroupBehavior::from_name(""), GroupBehavior::Bounds);
    }

    #[test]
    fn bounds_groups_reject_members() {
        let mut g = Group::new("g", Size::new(100.0, 100.0));
        assert!(!g.add_member(NodeId::from("a")));
        assert!(g.is_empty());

        let g = Group::new("g", Size::new(100.0, 100.0)).with_members(["a", "b"]);
        assert!(g.members().is_empty(), "builder ignores members for bounds");
    }

    #[test]
    fn stored_membership_dedupes() {
        let mut g = Group::default().with_behavior(GroupBehavior::Parent);
        assert!(g.add_member(NodeId::from("a")));
        assert!(!g.add_member(NodeId::from("a")));
        assert!(g.remove_member(&NodeId::from("a")));
        assert!(!g.remove_member(&NodeId::from("a")));
    }

    #[test]
    fn explicit_groups_are_not_resizable() {
        let mut g = Group::default().with_behavior(GroupBehavior::Explicit);
        let before = g.size();
        g.set_size(Size::new(900.0, 900.0));
        assert_eq!(g.size(), before);
        assert!(!g.capabilities().contains(Capabilities::RESIZABLE));
        assert!(g.capabilities().contains(Capabilities::REMOVE_WHEN_EMPTY));
    }

    #[test]
    fn manual_resize_clamps_to_floor() {
        let mut g = Group::default().with_behavior(GroupBehavior::Parent);
        g.set_size(Size::new(10.0, 500.0));
        assert_eq!(g.size(), Size::new(50.0, 500.0));
    }

    #[test]
    fn transitions_follow_membership_rules() {
        let a = NodeId::from("a");
        let b = NodeId::from("b");

        // bounds -> parent merges captured ids
        let mut g = Group::default();
        let refit = g.transition(GroupBehavior::Parent, Some(&[a.clone(), b.clone()]), true);
        assert!(!refit);
        assert_eq!(g.members().len(), 2);

        // parent -> explicit keeps members and asks for a fit
        assert!(g.transition(GroupBehavior::Explicit, Some(&[NodeId::from("c")]), true));
        assert_eq!(g.members().iter().collect::<Vec<_>>(), vec![&a, &b]);

        // explicit -> bounds without clearing keeps the ids around
        g.transition(GroupBehavior::Bounds, None, false);
        assert_eq!(g.members().len(), 2);

        // -> bounds with clearing drops them
        g.transition(GroupBehavior::Parent, None, true);
        g.transition(GroupBehavior::Bounds, None, true);
        assert!(g.members().is_empty());
    }
}
