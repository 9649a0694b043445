// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of which annotations watch which nodes.
//!
//! Each watching annotation declares exactly the node ids it cares about, so
//! routing a node notification costs O(watchers of that node) rather than a
//! scan over all annotations.

use hashbrown::HashMap;
use smallvec::SmallVec;
use trellis_annotation::{AnnotationId, NodeId};

/// Node id to watching annotations, and back.
#[derive(Clone, Debug, Default)]
pub struct NodeMonitors {
    by_node: HashMap<NodeId, SmallVec<[AnnotationId; 2]>>,
    by_annotation: HashMap<AnnotationId, Vec<NodeId>>,
}

impl NodeMonitors {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the node set watched by `annotation`. An empty set unregisters it.
    pub fn watch<'a>(
        &mut self,
        annotation: &AnnotationId,
        nodes: impl IntoIterator<Item = &'a NodeId>,
    ) {
        self.unwatch(annotation);
        let nodes: Vec<NodeId> = nodes.into_iter().cloned().collect();
        if nodes.is_empty() {
            return;
        }
        for node in &nodes {
            let watchers = self.by_node.entry(node.clone()).or_default();
            if !watchers.contains(annotation) {
                watchers.push(annotation.clone());
            }
        }
        self.by_annotation.insert(annotation.clone(), nodes);
    }

    /// Stop watching on behalf of `annotation`. Returns whether it watched anything.
    pub fn unwatch(&mut self, annotation: &AnnotationId) -> bool {
        let Some(nodes) = self.by_annotation.remove(annotation) else {
            return false;
        };
        for node in nodes {
            if let Some(watchers) = self.by_node.get_mut(&node) {
                watchers.retain(|a| a != annotation);
                if watchers.is_empty() {
                    self.by_node.remove(&node);
                }
            }
        }
        true
    }

    /// Annotations watching `node`.
    pub fn watchers(&self, node: &NodeId) -> &[AnnotationId] {
        self.by_node.get(node).map(|w| w.as_slice()).unwrap_or(&[])
    }

    /// Distinct annotations watching any of `nodes`, in first-seen order.
    pub fn watchers_of_any(&self, nodes: &[NodeId]) -> Vec<AnnotationId> {
        let mut out: Vec<AnnotationId> = Vec::new();
        for node in nodes {
            for a in self.watchers(node) {
                if !out.contains(a) {
                    out.push(a.clone());
                }
            }
        }
        out
    }

    /// Nodes watched by `annotation`.
    pub fn watched_by(&self, annotation: &AnnotationId) -> &[NodeId] {
        self.by_annotation
            .get(annotation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of (node, annotation) subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.by_annotation.values().map(Vec::len).sum()
    }

    /// Drop every subscription.
    pub fn clear(&mut self) {
        self.by_node.clear();
        self.by_annotation.clear();
    }
}
