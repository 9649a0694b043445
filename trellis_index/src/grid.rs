// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid index keyed by stable ids.
//!
//! Rectangles are bucketed into fixed-size cells; queries only touch the cells
//! overlapping the query primitive. Slots are recycled through a free list so
//! that churn (annotations added and removed over a session) does not grow the
//! slot table without bound.
//!
//! An entry spanning more than [`MAX_CELLS_PER_ENTRY`] cells is not bucketed.
//! It goes to a side list that every query scans linearly, so one huge
//! rectangle costs one slot instead of millions of buckets. Rectangle queries
//! wider than the same limit scan all slots instead of walking cells.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use kurbo::{Point, Rect};
use smallvec::SmallVec;

use crate::{SpatialIndex, rect_contains_point, rects_overlap};

type CellCoord = (i32, i32);

/// Largest number of cells an entry or a rectangle query walks.
pub const MAX_CELLS_PER_ENTRY: u64 = 1024;

/// Uniform grid over `f64` world coordinates.
pub struct GridIndex<K> {
    cell_size: f64,
    origin: Point,
    cells: HashMap<CellCoord, SmallVec<[usize; 8]>>,
    slots: Vec<Option<Slot<K>>>,
    keys: HashMap<K, usize>,
    free_list: Vec<usize>,
    // Slots too large to bucket.
    oversized: Vec<usize>,
}

#[derive(Clone, Debug)]
struct Slot<K> {
    key: K,
    rect: Rect,
    // Cells currently containing this rectangle; `None` when oversized.
    cells: Option<SmallVec<[CellCoord; 4]>>,
}

impl<K> Debug for GridIndex<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GridIndex")
            .field("cell_size", &self.cell_size)
            .field("origin", &self.origin)
            .field("live", &self.keys.len())
            .field("slots", &self.slots.len())
            .field("cells", &self.cells.len())
            .field("oversized", &self.oversized.len())
            .finish_non_exhaustive()
    }
}

impl<K: Clone + Eq + Hash> Default for GridIndex<K> {
    fn default() -> Self {
        Self::new(256.0)
    }
}

impl<K: Clone + Eq + Hash> GridIndex<K> {
    /// Create a grid with the given cell size and origin at (0, 0).
    pub fn new(cell_size: f64) -> Self {
        Self::with_origin(cell_size, Point::ZERO)
    }

    /// Create a grid with the given cell size and origin.
    pub fn with_origin(cell_size: f64, origin: Point) -> Self {
        debug_assert!(cell_size > 0.0, "cell_size must be strictly positive");
        Self {
            cell_size,
            origin,
            cells: HashMap::new(),
            slots: Vec::new(),
            keys: HashMap::new(),
            free_list: Vec::new(),
            oversized: Vec::new(),
        }
    }

    /// The configured cell size.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_coord(&self, value: f64, origin: f64) -> i32 {
        let t = (value - origin) / self.cell_size;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
        )]
        let coord = t as i32;
        // Round towards -inf (the cast above has already truncated).
        if t < 0.0 && f64::from(coord) > t {
            coord.saturating_sub(1)
        } else {
            coord
        }
    }

    fn cell_bounds(&self, rect: Rect) -> (CellCoord, CellCoord) {
        let (ix0, ix1) = self.cell_range(rect.x0, rect.x1, self.origin.x);
        let (iy0, iy1) = self.cell_range(rect.y0, rect.y1, self.origin.y);
        ((ix0, iy0), (ix1, iy1))
    }

    /// The cells `rect` covers, or `None` when there are more than
    /// [`MAX_CELLS_PER_ENTRY`] of them.
    fn covered_cells(&self, rect: Rect) -> Option<SmallVec<[CellCoord; 4]>> {
        let (lo, hi) = self.cell_bounds(rect);
        if cell_count(lo, hi) > MAX_CELLS_PER_ENTRY {
            return None;
        }
        let mut out = SmallVec::new();
        for ix in lo.0..=hi.0 {
            for iy in lo.1..=hi.1 {
                out.push((ix, iy));
            }
        }
        Some(out)
    }

    fn cell_range(&self, min: f64, max: f64, origin: f64) -> (i32, i32) {
        let c0 = self.cell_coord(min, origin);
        let c1 = self.cell_coord(max, origin);
        if c0 <= c1 { (c0, c1) } else { (c1, c0) }
    }

    fn link(&mut self, slot: usize, cells: Option<&[CellCoord]>) {
        let Some(cells) = cells else {
            self.oversized.push(slot);
            return;
        };
        for &cell in cells {
            self.cells.entry(cell).or_default().push(slot);
        }
    }

    fn unlink(&mut self, slot: usize, cells: Option<&[CellCoord]>) {
        let Some(cells) = cells else {
            self.oversized.retain(|&s| s != slot);
            return;
        };
        for cell in cells {
            let Some(bucket) = self.cells.get_mut(cell) else {
                continue;
            };
            if let Some(pos) = bucket.iter().position(|&s| s == slot) {
                bucket.swap_remove(pos);
            }
            if bucket.is_empty() {
                // Dropping empty cells keeps the map compact for sparse canvases.
                self.cells.remove(cell);
            }
        }
    }

    fn live(&self, slot: usize) -> Option<&Slot<K>> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }
}

fn cell_count(lo: CellCoord, hi: CellCoord) -> u64 {
    let span = |a: i32, b: i32| u64::try_from(i64::from(b) - i64::from(a) + 1).unwrap_or(0);
    span(lo.0, hi.0).saturating_mul(span(lo.1, hi.1))
}

impl<K: Clone + Eq + Hash> SpatialIndex<K> for GridIndex<K> {
    fn update(&mut self, key: K, rect: Rect) {
        let cells = self.covered_cells(rect);
        if let Some(&slot) = self.keys.get(&key) {
            let Some(mut entry) = self.slots[slot].take() else {
                return;
            };
            if entry.rect == rect {
                self.slots[slot] = Some(entry);
                return;
            }
            self.unlink(slot, entry.cells.as_deref());
            self.link(slot, cells.as_deref());
            entry.rect = rect;
            entry.cells = cells;
            self.slots[slot] = Some(entry);
            return;
        }

        let slot = match self.free_list.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };
        self.link(slot, cells.as_deref());
        self.keys.insert(key.clone(), slot);
        self.slots[slot] = Some(Slot { key, rect, cells });
    }

    fn remove(&mut self, key: &K) {
        let Some(slot) = self.keys.remove(key) else {
            return;
        };
        if let Some(entry) = self.slots[slot].take() {
            self.unlink(slot, entry.cells.as_deref());
        }
        self.free_list.push(slot);
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.slots.clear();
        self.keys.clear();
        self.free_list.clear();
        self.oversized.clear();
    }

    fn rect(&self, key: &K) -> Option<Rect> {
        let slot = *self.keys.get(key)?;
        self.live(slot).map(|s| s.rect)
    }

    fn query_point(&self, point: Point) -> Vec<K> {
        let ix = self.cell_coord(point.x, self.origin.x);
        let iy = self.cell_coord(point.y, self.origin.y);
        let bucket = self.cells.get(&(ix, iy)).map(|b| b.as_slice()).unwrap_or(&[]);
        bucket
            .iter()
            .chain(&self.oversized)
            .filter_map(|&slot| self.live(slot))
            .filter(|entry| rect_contains_point(entry.rect, point))
            .map(|entry| entry.key.clone())
            .collect()
    }

    fn query_rect(&self, rect: Rect) -> Vec<K> {
        let (lo, hi) = self.cell_bounds(rect);
        if cell_count(lo, hi) > MAX_CELLS_PER_ENTRY {
            return self
                .slots
                .iter()
                .flatten()
                .filter(|entry| rects_overlap(entry.rect, rect))
                .map(|entry| entry.key.clone())
                .collect();
        }
        let mut seen: HashSet<usize> = HashSet::new();
        let mut out: Vec<K> = self
            .oversized
            .iter()
            .filter_map(|&slot| self.live(slot))
            .filter(|entry| rects_overlap(entry.rect, rect))
            .map(|entry| entry.key.clone())
            .collect();
        for ix in lo.0..=hi.0 {
            for iy in lo.1..=hi.1 {
                let Some(bucket) = self.cells.get(&(ix, iy)) else {
                    continue;
                };
                for &slot in bucket {
                    if !seen.insert(slot) {
                        continue;
                    }
                    if let Some(entry) = self.live(slot)
                        && rects_overlap(entry.rect, rect)
                    {
                        out.push(entry.key.clone());
                    }
                }
            }
        }
        out
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn update_moves_and_remove_forgets() {
        let mut grid: GridIndex<u32> = GridIndex::new(10.0);
        grid.update(7, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(grid.query_point(Point::new(5.0, 5.0)), vec![7]);

        grid.update(7, Rect::new(20.0, 20.0, 30.0, 30.0));
        assert!(grid.query_point(Point::new(5.0, 5.0)).is_empty());
        assert_eq!(grid.query_point(Point::new(25.0, 25.0)), vec![7]);
        assert_eq!(grid.len(), 1);

        grid.remove(&7);
        assert!(grid.query_point(Point::new(25.0, 25.0)).is_empty());
        assert!(grid.is_empty());
        assert_eq!(grid.rect(&7), None);
    }

    #[test]
    fn rect_query_reports_each_key_once() {
        let mut grid: GridIndex<u32> = GridIndex::new(5.0);
        // Spans many cells.
        grid.update(1, Rect::new(0.0, 0.0, 20.0, 20.0));
        let hits = grid.query_rect(Rect::new(2.0, 2.0, 18.0, 18.0));
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut grid: GridIndex<u32> = GridIndex::new(10.0);
        grid.update(1, Rect::new(0.0, 0.0, 1.0, 1.0));
        grid.update(2, Rect::new(0.0, 0.0, 1.0, 1.0));
        grid.remove(&1);
        grid.update(3, Rect::new(50.0, 50.0, 51.0, 51.0));
        assert_eq!(grid.slots.len(), 2, "slot of key 1 should be recycled");
        assert_eq!(grid.query_point(Point::new(0.5, 0.5)), vec![2]);
        assert_eq!(grid.query_point(Point::new(50.5, 50.5)), vec![3]);
    }

    #[test]
    fn negative_coordinates_round_down() {
        let mut grid: GridIndex<u32> = GridIndex::new(10.0);
        grid.update(0, Rect::new(-25.0, -25.0, -5.0, -5.0));
        assert_eq!(grid.query_point(Point::new(-10.0, -10.0)), vec![0]);
        assert_eq!(grid.cell_coord(-0.5, 0.0), -1);
        assert_eq!(grid.cell_coord(0.5, 0.0), 0);
    }

    #[test]
    fn cell_coord_saturates() {
        let grid: GridIndex<u32> = GridIndex::new(1.0);
        assert_eq!(grid.cell_coord(1e20, 0.0), i32::MAX);
        assert_eq!(grid.cell_coord(-1e20, 0.0), i32::MIN);
    }

    #[test]
    fn huge_rects_skip_the_grid() {
        let mut grid: GridIndex<u32> = GridIndex::new(256.0);
        let huge = Rect::new(-1e6, -1e6, 1e6, 1e6);
        grid.update(1, huge);
        grid.update(2, Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(grid.cells.len(), 1, "only the small entry is bucketed");
        assert_eq!(grid.oversized, vec![0]);

        let mut hits = grid.query_point(Point::new(15.0, 15.0));
        hits.sort_unstable();
        assert_eq!(hits, vec![1, 2]);
        assert_eq!(grid.query_point(Point::new(5e5, -5e5)), vec![1]);
        assert_eq!(grid.query_rect(Rect::new(100.0, 100.0, 200.0, 200.0)), vec![1]);

        // A query wider than the cell budget scans every slot.
        let mut all = grid.query_rect(Rect::new(-2e6, -2e6, 2e6, 2e6));
        all.sort_unstable();
        assert_eq!(all, vec![1, 2]);

        // Shrinking moves the entry into the grid.
        grid.update(1, Rect::new(0.0, 0.0, 5.0, 5.0));
        assert!(grid.oversized.is_empty());
        assert_eq!(grid.query_point(Point::new(5e5, -5e5)), Vec::<u32>::new());
        grid.update(1, huge);
        grid.remove(&1);
        assert!(grid.oversized.is_empty());
        assert!(grid.query_point(Point::new(5e5, -5e5)).is_empty());
    }

    #[test]
    fn unchanged_update_keeps_cells() {
        let mut grid: GridIndex<u32> = GridIndex::new(10.0);
        let r = Rect::new(0.0, 0.0, 30.0, 30.0);
        grid.update(4, r);
        let cells = grid.cells.len();
        grid.update(4, r);
        assert_eq!(grid.cells.len(), cells);
        assert_eq!(grid.rect(&4), Some(r));
    }
}
