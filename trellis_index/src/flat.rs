// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector index with linear scans.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::{SpatialIndex, rect_contains_point, rects_overlap};

/// Linear-scan index. Entries keep their insertion order.
#[derive(Clone, Debug)]
pub struct FlatIndex<K> {
    entries: Vec<(K, Rect)>,
}

impl<K> Default for FlatIndex<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K> FlatIndex<K> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Clone + PartialEq> SpatialIndex<K> for FlatIndex<K> {
    fn update(&mut self, key: K, rect: Rect) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = rect,
            None => self.entries.push((key, rect)),
        }
    }

    fn remove(&mut self, key: &K) {
        self.entries.retain(|(k, _)| k != key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn rect(&self, key: &K) -> Option<Rect> {
        self.entries
            .iter()
            .find_map(|(k, r)| (k == key).then_some(*r))
    }

    fn query_point(&self, point: Point) -> Vec<K> {
        self.entries
            .iter()
            .filter(|(_, r)| rect_contains_point(*r, point))
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn query_rect(&self, rect: Rect) -> Vec<K> {
        self.entries
            .iter()
            .filter(|(_, r)| rects_overlap(*r, rect))
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn matches_grid_semantics() {
        let mut flat: FlatIndex<u8> = FlatIndex::new();
        flat.update(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        flat.update(2, Rect::new(5.0, 5.0, 15.0, 15.0));
        assert_eq!(flat.query_point(Point::new(6.0, 6.0)), vec![1, 2]);
        assert_eq!(flat.query_rect(Rect::new(11.0, 11.0, 12.0, 12.0)), vec![2]);

        flat.update(1, Rect::new(100.0, 100.0, 110.0, 110.0));
        assert_eq!(flat.query_point(Point::new(6.0, 6.0)), vec![2]);
        flat.remove(&2);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.rect(&1), Some(Rect::new(100.0, 100.0, 110.0, 110.0)));
    }
}
