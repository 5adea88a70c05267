// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stateful query cursors over a [`SpatialIndex`].
//!
//! A band cursor is lazy: it walks grid columns (for LEFT/RIGHT) or rows (for
//! UP/DOWN) outward from the origin edge one at a time and only sorts the
//! elements first seen in the current column or row. An element reached for
//! the first time in a farther column cannot have its near edge before any
//! element seen in a nearer one, so the sequence is in non-decreasing distance.
//!
//! Rectangle and radial cursors collect their whole answer up front.

use core::cmp::Reverse;
use core::ops::RangeInclusive;

use hashbrown::HashSet;

use crate::element::ElementId;
use crate::grid::CellBounds;
use crate::index::SpatialIndex;
use crate::types::{BoundingBox, Direction};

/// A band swept outward from an edge.
///
/// An element matches when
/// - its span on the cross axis overlaps the half-open band `[band_start, band_end)`, and
/// - it extends past `edge` in `direction` (e.g. `right > edge` for RIGHT).
///
/// Matches are ordered by [`Candidate::distance`], the signed gap between
/// `edge` and the element's near edge, then by id.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BandQuery {
    /// Direction of the sweep.
    pub direction: Direction,
    /// Coordinate the sweep starts from (an `x` for LEFT/RIGHT, a `y` for UP/DOWN).
    pub edge: i32,
    /// Inclusive start of the band on the cross axis.
    pub band_start: i32,
    /// Exclusive end of the band on the cross axis.
    pub band_end: i32,
    /// Elements with exactly this box are never returned.
    pub origin: Option<BoundingBox>,
}

impl BandQuery {
    /// A band query without an origin box.
    pub const fn new(direction: Direction, edge: i32, band_start: i32, band_end: i32) -> Self {
        Self {
            direction,
            edge,
            band_start,
            band_end,
            origin: None,
        }
    }

    /// A one-unit band at `offset` along `origin`'s boundary, swept away from `origin` in `direction`.
    ///
    /// For LEFT/RIGHT the band sits at `y = origin.bottom + offset`; for UP/DOWN at
    /// `x = origin.left + offset`.
    pub const fn unit_from(origin: &BoundingBox, direction: Direction, offset: i32) -> Self {
        let (low, _) = origin.cross_span(direction);
        Self {
            direction,
            edge: origin.edge(direction),
            band_start: low + offset,
            band_end: low + offset + 1,
            origin: Some(*origin),
        }
    }

    /// Skip elements whose box equals `origin`.
    pub const fn with_origin(mut self, origin: BoundingBox) -> Self {
        self.origin = Some(origin);
        self
    }

    fn matches(&self, bbox: &BoundingBox) -> bool {
        let (low, high) = bbox.cross_span(self.direction);
        if low >= self.band_end || high <= self.band_start {
            return false;
        }
        match self.direction {
            Direction::Right => bbox.right() > self.edge,
            Direction::Left => bbox.left() < self.edge,
            Direction::Up => bbox.top() > self.edge,
            Direction::Down => bbox.bottom() < self.edge,
        }
    }

    fn distance(&self, bbox: &BoundingBox) -> i64 {
        let edge = i64::from(self.edge);
        match self.direction {
            Direction::Right => i64::from(bbox.left()) - edge,
            Direction::Left => edge - i64::from(bbox.right()),
            Direction::Up => i64::from(bbox.bottom()) - edge,
            Direction::Down => edge - i64::from(bbox.top()),
        }
    }
}

/// One element produced by a cursor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// The element.
    pub id: ElementId,
    /// Its box.
    pub bbox: BoundingBox,
    /// Ordering key: signed edge gap for band queries, squared distance for
    /// radial queries, zero for rectangle queries.
    pub distance: i64,
}

#[derive(Debug)]
enum Walk {
    /// Walking cell columns or rows outward; `next` is the upcoming ring.
    Band {
        query: BandQuery,
        next: i32,
        last: i32,
        cross: RangeInclusive<i32>,
    },
    Done,
}

/// Stateful query result yielding candidates nearest first.
///
/// Each element is produced at most once per cursor, and never one whose box
/// equals the query's origin box.
#[derive(Debug)]
pub struct NeighborCursor<'a> {
    index: &'a SpatialIndex,
    walk: Walk,
    origin: Option<BoundingBox>,
    // Sorted farthest-first so `pop` yields the nearest.
    pending: Vec<Candidate>,
    seen: HashSet<ElementId>,
    visited: usize,
}

impl<'a> NeighborCursor<'a> {
    fn empty(index: &'a SpatialIndex, origin: Option<BoundingBox>) -> Self {
        Self {
            index,
            walk: Walk::Done,
            origin,
            pending: Vec::new(),
            seen: HashSet::new(),
            visited: 0,
        }
    }

    pub(crate) fn band(index: &'a SpatialIndex, query: &BandQuery) -> Self {
        let mut cursor = Self::empty(index, query.origin);
        let Some(bounds) = index.grid().bounds() else {
            return cursor;
        };
        if query.band_end <= query.band_start {
            return cursor;
        }
        let grid = index.grid();
        // `(first ring, lowest ring, highest ring, cross range)`
        let (start, low, high, cross) = if query.direction.is_horizontal() {
            let ys = grid.y_range(query.band_start, query.band_end - 1);
            let cross = clamp(ys, bounds.min_y, bounds.max_y);
            (grid.cell_x(query.edge), bounds.min_x, bounds.max_x, cross)
        } else {
            let xs = grid.x_range(query.band_start, query.band_end - 1);
            let cross = clamp(xs, bounds.min_x, bounds.max_x);
            (grid.cell_y(query.edge), bounds.min_y, bounds.max_y, cross)
        };
        let Some(cross) = cross else {
            return cursor;
        };
        // Rings before the occupied range are empty; rings past it are never reached.
        let (start, last, beyond) = if query.direction.is_ascending() {
            let start = start.max(low);
            (start, high, start > high)
        } else {
            let start = start.min(high);
            (start, low, start < low)
        };
        if !beyond {
            cursor.walk = Walk::Band {
                query: *query,
                next: start,
                last,
                cross,
            };
        }
        cursor
    }

    pub(crate) fn rect(
        index: &'a SpatialIndex,
        rect: &BoundingBox,
        origin: Option<BoundingBox>,
    ) -> Self {
        let mut cursor = Self::empty(index, origin);
        let Some((xs, ys)) = clamped_ranges(index, rect) else {
            return cursor;
        };
        let mut found = Vec::new();
        index.grid().visit_cells(xs, ys, |id| {
            if !cursor.seen.insert(id) {
                return;
            }
            let bbox = index.indexed_box(id);
            if bbox.overlaps(rect) && Some(bbox) != origin {
                found.push(Candidate {
                    id,
                    bbox,
                    distance: 0,
                });
            }
        });
        cursor.fill(found);
        cursor
    }

    pub(crate) fn radial(index: &'a SpatialIndex, x: i32, y: i32, radius: i32) -> Self {
        let mut cursor = Self::empty(index, None);
        if radius < 0 {
            return cursor;
        }
        let reach = BoundingBox::new(
            x.saturating_sub(radius),
            y.saturating_sub(radius),
            x.saturating_add(radius).saturating_add(1),
            y.saturating_add(radius).saturating_add(1),
        );
        let Ok(reach) = reach else {
            return cursor;
        };
        let Some((xs, ys)) = clamped_ranges(index, &reach) else {
            return cursor;
        };
        let limit = i64::from(radius) * i64::from(radius);
        let mut found = Vec::new();
        index.grid().visit_cells(xs, ys, |id| {
            if !cursor.seen.insert(id) {
                return;
            }
            let bbox = index.indexed_box(id);
            let d = bbox.distance_sq_to_point(x, y);
            if d <= limit {
                found.push(Candidate {
                    id,
                    bbox,
                    distance: d,
                });
            }
        });
        cursor.fill(found);
        cursor
    }

    fn fill(&mut self, mut found: Vec<Candidate>) {
        found.sort_unstable_by_key(|c| Reverse((c.distance, c.id)));
        self.pending = found;
    }

    /// Number of candidates produced so far.
    #[inline]
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Collect the next ring of a band walk into `pending`. Returns `false` once exhausted.
    fn advance(&mut self) -> bool {
        let Walk::Band {
            query,
            next,
            last,
            cross,
        } = &mut self.walk
        else {
            return false;
        };
        let query = *query;
        let ring = *next;
        let finished = ring == *last;
        if !finished {
            *next = if query.direction.is_ascending() {
                ring + 1
            } else {
                ring - 1
            };
        }
        let (xs, ys) = if query.direction.is_horizontal() {
            (ring..=ring, cross.clone())
        } else {
            (cross.clone(), ring..=ring)
        };
        if finished {
            self.walk = Walk::Done;
        }

        let index = self.index;
        let origin = self.origin;
        let seen = &mut self.seen;
        let mut found = Vec::new();
        index.grid().visit_cells(xs, ys, |id| {
            if !seen.insert(id) {
                return;
            }
            let bbox = index.indexed_box(id);
            if query.matches(&bbox) && Some(bbox) != origin {
                found.push(Candidate {
                    id,
                    bbox,
                    distance: query.distance(&bbox),
                });
            }
        });
        self.fill(found);
        true
    }
}

impl Iterator for NeighborCursor<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        loop {
            if let Some(c) = self.pending.pop() {
                self.visited += 1;
                return Some(c);
            }
            if !self.advance() {
                return None;
            }
        }
    }
}

fn clamp(range: RangeInclusive<i32>, min: i32, max: i32) -> Option<RangeInclusive<i32>> {
    let lo = (*range.start()).max(min);
    let hi = (*range.end()).min(max);
    (lo <= hi).then_some(lo..=hi)
}

fn clamped_ranges(
    index: &SpatialIndex,
    rect: &BoundingBox,
) -> Option<(RangeInclusive<i32>, RangeInclusive<i32>)> {
    let CellBounds {
        min_x,
        min_y,
        max_x,
        max_y,
    } = index.grid().bounds()?;
    let grid = index.grid();
    let xs = clamp(grid.x_range(rect.left(), rect.right()), min_x, max_x)?;
    let ys = clamp(grid.y_range(rect.bottom(), rect.top()), min_y, max_y)?;
    Some((xs, ys))
}
