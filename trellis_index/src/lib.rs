// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trellis Index: an id-keyed 2D rectangle index.
//!
//! Trellis Index keeps one axis-aligned [`Rect`](kurbo::Rect) per stable key
//! (for example an annotation id) and answers point and rectangle queries.
//! Higher layers treat it as a write-through cache: every geometry mutation is
//! pushed with [`SpatialIndex::update`] as soon as it is applied, and entries are
//! dropped with [`SpatialIndex::remove`].
//!
//! - [`GridIndex`]: uniform grid with a configurable cell size. A good fit for
//!   canvases where overlays are roughly uniformly distributed and queries are
//!   small compared to the world extent.
//! - [`FlatIndex`]: flat vector with linear scans. Good for very small sets.
//!
//! Both implement [`SpatialIndex`], so callers can swap strategies without
//! API churn.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use trellis_index::{GridIndex, SpatialIndex};
//!
//! let mut idx: GridIndex<&str> = GridIndex::new(64.0);
//! idx.update("note", Rect::new(0.0, 0.0, 10.0, 10.0));
//! idx.update("group", Rect::new(5.0, 5.0, 150.0, 150.0));
//!
//! let mut hits = idx.query_point(Point::new(6.0, 6.0));
//! hits.sort();
//! assert_eq!(hits, vec!["group", "note"]);
//!
//! // Moving an entry is just another update.
//! idx.update("note", Rect::new(200.0, 0.0, 210.0, 10.0));
//! assert_eq!(idx.query_point(Point::new(6.0, 6.0)), vec!["group"]);
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for coordinates. Debug builds may assert.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod flat;
mod grid;

use alloc::vec::Vec;

use kurbo::{Point, Rect};

pub use flat::FlatIndex;
pub use grid::{GridIndex, MAX_CELLS_PER_ENTRY};

/// Spatial index contract used by the canvas for annotation hit testing.
///
/// Keys are stable identities; an `update` for an unknown key inserts it.
pub trait SpatialIndex<K> {
    /// Insert or move the rectangle stored for `key`.
    fn update(&mut self, key: K, rect: Rect);

    /// Remove `key`. Unknown keys are ignored.
    fn remove(&mut self, key: &K);

    /// Remove every entry.
    fn clear(&mut self);

    /// The rectangle currently stored for `key`.
    fn rect(&self, key: &K) -> Option<Rect>;

    /// Keys whose rectangle contains the point (edges included).
    fn query_point(&self, point: Point) -> Vec<K>;

    /// Keys whose rectangle overlaps `rect` (shared edges count as overlap).
    fn query_rect(&self, rect: Rect) -> Vec<K>;

    /// Number of live entries.
    fn len(&self) -> usize;

    /// Whether the index holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether `outer` fully contains `inner`, edges included.
#[inline]
pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Whether two rectangles overlap, edges included.
#[inline]
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

#[inline]
pub(crate) fn rect_contains_point(r: Rect, p: Point) -> bool {
    r.x0 <= p.x && r.y0 <= p.y && p.x <= r.x1 && p.y <= r.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_includes_edges() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(rect_contains_rect(outer, outer));
        assert!(rect_contains_rect(outer, Rect::new(10.0, 10.0, 100.0, 20.0)));
        assert!(!rect_contains_rect(outer, Rect::new(10.0, 10.0, 100.5, 20.0)));
    }

    #[test]
    fn overlap_shares_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rects_overlap(a, Rect::new(10.0, 0.0, 20.0, 10.0)));
        assert!(!rects_overlap(a, Rect::new(11.0, 0.0, 20.0, 10.0)));
    }
}
