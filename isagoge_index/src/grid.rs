// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid bucketing element boxes by fixed-size cells.
//!
//! Every element is referenced from each cell its box touches, edges included,
//! so a query only has to look at the cells overlapping its own primitive.
//! The grid is filled once and never updated afterwards.

use core::fmt::Debug;
use core::ops::RangeInclusive;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::element::ElementId;
use crate::types::BoundingBox;

/// Map a coordinate to a cell index along one axis.
///
/// Euclidean division rounds toward -∞, which matches floor for negative
/// offsets as well. Results outside the `i32` range saturate.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Cell indices are intentionally i32; out-of-range values are saturated."
)]
#[inline]
pub(crate) fn cell_coord(value: i32, origin: i32, cell_size: i32) -> i32 {
    debug_assert!(cell_size > 0, "grid cell_size must be strictly positive");
    let rel = i64::from(value) - i64::from(origin);
    let coord = rel.div_euclid(i64::from(cell_size));
    if coord >= i64::from(i32::MAX) {
        i32::MAX
    } else if coord <= i64::from(i32::MIN) {
        i32::MIN
    } else {
        coord as i32
    }
}

/// Inclusive range of occupied cell coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct CellBounds {
    pub(crate) min_x: i32,
    pub(crate) min_y: i32,
    pub(crate) max_x: i32,
    pub(crate) max_y: i32,
}

impl CellBounds {
    fn include(&mut self, ix: i32, iy: i32) {
        self.min_x = self.min_x.min(ix);
        self.min_y = self.min_y.min(iy);
        self.max_x = self.max_x.max(ix);
        self.max_y = self.max_y.max(iy);
    }
}

#[derive(Default)]
struct Cell {
    slots: SmallVec<[ElementId; 8]>,
}

/// Uniform grid over element ids with fixed cell size.
pub(crate) struct Grid {
    cell_size: i32,
    origin_x: i32,
    origin_y: i32,
    cells: HashMap<(i32, i32), Cell>,
    bounds: Option<CellBounds>,
}

impl Debug for Grid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let references: usize = self.cells.values().map(|c| c.slots.len()).sum();
        f.debug_struct("Grid")
            .field("cell_size", &self.cell_size)
            .field("origin_x", &self.origin_x)
            .field("origin_y", &self.origin_y)
            .field("cells", &self.cells.len())
            .field("references", &references)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl Grid {
    /// Create an empty grid with the given cell size and origin.
    pub(crate) fn with_origin(cell_size: i32, origin_x: i32, origin_y: i32) -> Self {
        debug_assert!(cell_size > 0, "cell_size must be strictly positive");
        Self {
            cell_size,
            origin_x,
            origin_y,
            cells: HashMap::new(),
            bounds: None,
        }
    }

    #[inline]
    pub(crate) fn cell_size(&self) -> i32 {
        self.cell_size
    }

    #[inline]
    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Occupied cell range, or `None` for an empty grid.
    #[inline]
    pub(crate) fn bounds(&self) -> Option<CellBounds> {
        self.bounds
    }

    #[inline]
    pub(crate) fn cell_x(&self, x: i32) -> i32 {
        cell_coord(x, self.origin_x, self.cell_size)
    }

    #[inline]
    pub(crate) fn cell_y(&self, y: i32) -> i32 {
        cell_coord(y, self.origin_y, self.cell_size)
    }

    fn cell_range(&self, min: i32, max: i32, origin: i32) -> RangeInclusive<i32> {
        let c0 = cell_coord(min, origin, self.cell_size);
        let c1 = cell_coord(max, origin, self.cell_size);
        if c0 <= c1 { c0..=c1 } else { c1..=c0 }
    }

    /// Column range touched by the closed span `[min, max]` on the x axis.
    #[inline]
    pub(crate) fn x_range(&self, min: i32, max: i32) -> RangeInclusive<i32> {
        self.cell_range(min, max, self.origin_x)
    }

    /// Row range touched by the closed span `[min, max]` on the y axis.
    #[inline]
    pub(crate) fn y_range(&self, min: i32, max: i32) -> RangeInclusive<i32> {
        self.cell_range(min, max, self.origin_y)
    }

    /// Reference `id` from every cell its box touches.
    pub(crate) fn insert(&mut self, id: ElementId, bbox: &BoundingBox) {
        let xs = self.x_range(bbox.left(), bbox.right());
        let ys = self.y_range(bbox.bottom(), bbox.top());
        for ix in xs {
            for iy in ys.clone() {
                self.cells.entry((ix, iy)).or_default().slots.push(id);
                match &mut self.bounds {
                    Some(b) => b.include(ix, iy),
                    None => {
                        self.bounds = Some(CellBounds {
                            min_x: ix,
                            min_y: iy,
                            max_x: ix,
                            max_y: iy,
                        });
                    }
                }
            }
        }
    }

    /// Visit every id referenced by the cells in the given ranges.
    ///
    /// Ids spanning several cells are reported once per cell; callers dedup.
    pub(crate) fn visit_cells<F: FnMut(ElementId)>(
        &self,
        xs: RangeInclusive<i32>,
        ys: RangeInclusive<i32>,
        mut f: F,
    ) {
        for ix in xs {
            for iy in ys.clone() {
                if let Some(cell) = self.cells.get(&(ix, iy)) {
                    for &id in &cell.slots {
                        f(id);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    fn bbox(l: i32, b: i32, r: i32, t: i32) -> BoundingBox {
        BoundingBox::new(l, b, r, t).unwrap()
    }

    #[test]
    fn spanning_box_is_referenced_from_every_cell() {
        let mut grid = Grid::with_origin(5, 0, 0);
        grid.insert(ElementId(1), &bbox(0, 0, 12, 3));
        // Columns 0..=2, row 0.
        assert_eq!(grid.cell_count(), 3);
        let mut hits = Vec::new();
        grid.visit_cells(2..=2, 0..=0, |id| hits.push(id));
        assert_eq!(hits, vec![ElementId(1)]);
    }

    #[test]
    fn visit_reports_duplicates_across_cells() {
        let mut grid = Grid::with_origin(5, 0, 0);
        grid.insert(ElementId(4), &bbox(0, 0, 20, 20));
        let mut hits = Vec::new();
        grid.visit_cells(0..=3, 0..=3, |id| hits.push(id));
        assert!(hits.len() > 1);
        let unique: HashSet<_> = hits.into_iter().collect();
        assert_eq!(unique.len(), 1);
    }

    #[test]
    fn bounds_track_occupied_cells() {
        let mut grid = Grid::with_origin(10, 0, 0);
        assert_eq!(grid.bounds(), None);
        grid.insert(ElementId(0), &bbox(-25, -25, -5, -5));
        grid.insert(ElementId(1), &bbox(40, 0, 45, 5));
        let b = grid.bounds().unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (-3, -3, 4, 0));
    }

    #[test]
    fn cell_coord_floors_and_saturates() {
        assert_eq!(cell_coord(-1, 0, 10), -1);
        assert_eq!(cell_coord(9, 0, 10), 0);
        assert_eq!(cell_coord(10, 0, 10), 1);
        assert_eq!(cell_coord(15, 10, 10), 0);
        assert_eq!(cell_coord(i32::MAX, i32::MIN, 1), i32::MAX);
        assert_eq!(cell_coord(i32::MIN, i32::MAX, 1), i32::MIN);
    }
}
