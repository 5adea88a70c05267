// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types: integer bounding boxes and search directions.

use core::fmt;

use crate::error::{IndexError, Result};

/// Axis-aligned bounding box in page coordinates.
///
/// Coordinates are integer pixels with `y` growing upward, so `bottom < top`
/// and `left < right` always hold. Zero or negative extent is rejected by
/// [`BoundingBox::new`].
///
/// Spans are treated as half-open (`[left, right)`, `[bottom, top)`) by the
/// band and overlap tests, and as closed by the containment tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    left: i32,
    bottom: i32,
    right: i32,
    top: i32,
}

impl BoundingBox {
    /// Create a box from its four edges.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DegenerateBox`] when `left >= right` or `bottom >= top`.
    pub const fn new(left: i32, bottom: i32, right: i32, top: i32) -> Result<Self> {
        if left >= right || bottom >= top {
            return Err(IndexError::DegenerateBox {
                left,
                bottom,
                right,
                top,
            });
        }
        Ok(Self {
            left,
            bottom,
            right,
            top,
        })
    }

    /// Left edge.
    #[inline]
    pub const fn left(&self) -> i32 {
        self.left
    }

    /// Bottom edge.
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.bottom
    }

    /// Right edge.
    #[inline]
    pub const fn right(&self) -> i32 {
        self.right
    }

    /// Top edge.
    #[inline]
    pub const fn top(&self) -> i32 {
        self.top
    }

    /// Horizontal extent, always positive.
    #[inline]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Vertical extent, always positive.
    #[inline]
    pub const fn height(&self) -> i32 {
        self.top - self.bottom
    }

    /// Area in the widened integer type.
    #[inline]
    pub const fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Horizontal center, rounded toward the left edge.
    #[inline]
    pub const fn center_x(&self) -> i32 {
        self.left + self.width() / 2
    }

    /// Vertical center, rounded toward the bottom edge.
    #[inline]
    pub const fn center_y(&self) -> i32 {
        self.bottom + self.height() / 2
    }

    /// Whether `other` lies within this box, edges included.
    #[inline]
    pub const fn contains(&self, other: &Self) -> bool {
        self.left <= other.left
            && self.bottom <= other.bottom
            && other.right <= self.right
            && other.top <= self.top
    }

    /// Whether `other` lies within this box and is not the same box.
    #[inline]
    pub fn contains_strictly(&self, other: &Self) -> bool {
        self != other && self.contains(other)
    }

    /// Whether the two boxes touch or overlap, edges included.
    #[inline]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.bottom <= other.top
            && other.bottom <= self.top
    }

    /// The coordinate of this box's boundary facing `dir`.
    #[inline]
    pub const fn edge(&self, dir: Direction) -> i32 {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.top,
            Direction::Down => self.bottom,
        }
    }

    /// Span on the axis perpendicular to `dir`, as `(low, high)`.
    #[inline]
    pub const fn cross_span(&self, dir: Direction) -> (i32, i32) {
        if dir.is_horizontal() {
            (self.bottom, self.top)
        } else {
            (self.left, self.right)
        }
    }

    /// Center on the axis perpendicular to `dir`.
    #[inline]
    pub const fn cross_center(&self, dir: Direction) -> i32 {
        if dir.is_horizontal() {
            self.center_y()
        } else {
            self.center_x()
        }
    }

    /// Extent on the axis perpendicular to `dir`: height for LEFT/RIGHT, width for UP/DOWN.
    #[inline]
    pub const fn cross_extent(&self, dir: Direction) -> i32 {
        if dir.is_horizontal() {
            self.height()
        } else {
            self.width()
        }
    }

    /// Extent along `dir`'s own axis: width for LEFT/RIGHT, height for UP/DOWN.
    #[inline]
    pub const fn extent_along(&self, dir: Direction) -> i32 {
        if dir.is_horizontal() {
            self.width()
        } else {
            self.height()
        }
    }

    /// Signed gap from `reference`'s edge facing `dir` to this box's near edge.
    ///
    /// Positive when this box lies strictly beyond the reference edge, zero when
    /// it touches it, and negative when the two overlap along `dir`.
    #[inline]
    pub const fn gap_from(&self, reference: &Self, dir: Direction) -> i32 {
        match dir {
            Direction::Right => self.left - reference.right,
            Direction::Left => reference.left - self.right,
            Direction::Up => self.bottom - reference.top,
            Direction::Down => reference.bottom - self.top,
        }
    }

    /// Squared Euclidean distance from the point to the nearest point of the box.
    #[inline]
    pub fn distance_sq_to_point(&self, x: i32, y: i32) -> i64 {
        let dx = axis_distance(x, self.left, self.right);
        let dy = axis_distance(y, self.bottom, self.top);
        dx * dx + dy * dy
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.bottom, self.right, self.top
        )
    }
}

fn axis_distance(v: i32, lo: i32, hi: i32) -> i64 {
    if v < lo {
        i64::from(lo) - i64::from(v)
    } else if v > hi {
        i64::from(v) - i64::from(hi)
    } else {
        0
    }
}

/// A search direction on the page.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Toward smaller `x`.
    Left,
    /// Toward larger `x`.
    Right,
    /// Toward larger `y`.
    Up,
    /// Toward smaller `y`.
    Down,
}

impl Direction {
    /// All four directions, in a stable order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Whether the direction runs along the `x` axis.
    #[inline]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Whether the direction moves toward larger coordinates.
    #[inline]
    pub const fn is_ascending(self) -> bool {
        matches!(self, Self::Right | Self::Up)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}
