// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-page [`SpatialIndex`] and its configuration.

use crate::cursor::{BandQuery, NeighborCursor};
use crate::element::{ElementId, Page, PageId};
use crate::error::{IndexError, Result};
use crate::grid::Grid;
use crate::types::BoundingBox;

/// Construction parameters for a [`SpatialIndex`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct IndexConfig {
    /// Side length of a grid cell in page pixels.
    ///
    /// Roughly the height of a line of body text works well: bands then touch
    /// one or two rows of cells.
    pub cell_size: i32,
    /// Reject elements whose box is not fully inside the page extent.
    ///
    /// When off, such elements are still indexed and found by queries.
    pub strict: bool,
}

impl IndexConfig {
    /// Default cell size in page pixels.
    pub const DEFAULT_CELL_SIZE: i32 = 32;
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cell_size: Self::DEFAULT_CELL_SIZE,
            strict: true,
        }
    }
}

/// Read-only grid index over the element boxes of one page.
///
/// Built once from the page's full element set; queries never mutate it, so a
/// shared reference can be handed to any number of concurrent analyzers.
#[derive(Debug)]
pub struct SpatialIndex {
    page: PageId,
    extent: BoundingBox,
    boxes: Vec<BoundingBox>,
    grid: Grid,
}

impl SpatialIndex {
    /// Bucket every element of `page` into a grid over the page extent.
    ///
    /// # Errors
    ///
    /// - [`IndexError::InvalidCellSize`] when `config.cell_size` is not positive.
    /// - [`IndexError::OutOfExtent`] in strict mode when an element box is not
    ///   contained in the page extent. Construction stops at the first one.
    pub fn build(page: &Page, config: &IndexConfig) -> Result<Self> {
        if config.cell_size <= 0 {
            return Err(IndexError::InvalidCellSize(config.cell_size));
        }
        let extent = *page.extent();
        let mut grid = Grid::with_origin(config.cell_size, extent.left(), extent.bottom());
        let mut boxes = Vec::with_capacity(page.len());
        for element in page.elements() {
            let bbox = *element.bbox();
            if !extent.contains(&bbox) {
                if config.strict {
                    return Err(IndexError::OutOfExtent {
                        id: element.id(),
                        bbox,
                        extent,
                    });
                }
                tracing::debug!(
                    page = page.id().0,
                    element = %element.id(),
                    %bbox,
                    "indexing element outside page extent"
                );
            }
            grid.insert(element.id(), &bbox);
            boxes.push(bbox);
        }
        tracing::debug!(
            page = page.id().0,
            elements = boxes.len(),
            cells = grid.cell_count(),
            cell_size = grid.cell_size(),
            "built spatial index"
        );
        Ok(Self {
            page: page.id(),
            extent,
            boxes,
            grid,
        })
    }

    /// The page this index was built from.
    #[inline]
    pub const fn page(&self) -> PageId {
        self.page
    }

    /// The page extent.
    #[inline]
    pub const fn extent(&self) -> &BoundingBox {
        &self.extent
    }

    /// Number of indexed elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether no elements were indexed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// The indexed box of an element.
    #[inline]
    pub fn bbox(&self, id: ElementId) -> Option<&BoundingBox> {
        self.boxes.get(id.index())
    }

    /// Walk outward from an edge along a band, nearest elements first.
    ///
    /// See [`BandQuery`] for the exact matching rule.
    pub fn directional_search(&self, query: &BandQuery) -> NeighborCursor<'_> {
        NeighborCursor::band(self, query)
    }

    /// All elements whose box touches or overlaps `rect`, in id order.
    pub fn rect_search(&self, rect: &BoundingBox) -> NeighborCursor<'_> {
        NeighborCursor::rect(self, rect, None)
    }

    /// Like [`rect_search`](Self::rect_search), skipping elements whose box equals `origin`.
    pub fn rect_search_from(&self, rect: &BoundingBox, origin: &BoundingBox) -> NeighborCursor<'_> {
        NeighborCursor::rect(self, rect, Some(*origin))
    }

    /// All elements within Euclidean `radius` of `(x, y)`, nearest first.
    ///
    /// A negative radius yields an exhausted cursor.
    pub fn radial_search(&self, x: i32, y: i32, radius: i32) -> NeighborCursor<'_> {
        NeighborCursor::radial(self, x, y, radius)
    }

    #[inline]
    pub(crate) fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Box lookup for ids the grid handed out; these always exist.
    #[inline]
    pub(crate) fn indexed_box(&self, id: ElementId) -> BoundingBox {
        self.boxes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Covariates;

    fn bbox(l: i32, b: i32, r: i32, t: i32) -> BoundingBox {
        BoundingBox::new(l, b, r, t).unwrap()
    }

    #[test]
    fn strict_build_rejects_out_of_extent() {
        let mut page = Page::with_size(PageId(0), 100, 100).unwrap();
        page.push_box(bbox(0, 0, 10, 10));
        let outside = page.push(bbox(95, 95, 110, 105), Covariates::default());
        let err = SpatialIndex::build(&page, &IndexConfig::default()).unwrap_err();
        assert!(matches!(err, IndexError::OutOfExtent { id, .. } if id == outside));
    }

    #[test]
    fn lenient_build_keeps_out_of_extent() {
        let mut page = Page::with_size(PageId(0), 100, 100).unwrap();
        let outside = page.push_box(bbox(95, 95, 110, 105));
        let config = IndexConfig {
            strict: false,
            ..IndexConfig::default()
        };
        let index = SpatialIndex::build(&page, &config).unwrap();
        let hits: Vec<_> = index
            .rect_search(&bbox(100, 100, 120, 120))
            .map(|c| c.id)
            .collect();
        assert_eq!(hits, vec![outside]);
    }

    #[test]
    fn non_positive_cell_size_is_rejected() {
        let page = Page::with_size(PageId(0), 100, 100).unwrap();
        let config = IndexConfig {
            cell_size: 0,
            ..IndexConfig::default()
        };
        assert_eq!(
            SpatialIndex::build(&page, &config).unwrap_err(),
            IndexError::InvalidCellSize(0)
        );
    }

    #[test]
    fn empty_page_builds_and_queries_cleanly() {
        let page = Page::with_size(PageId(9), 50, 50).unwrap();
        let index = SpatialIndex::build(&page, &IndexConfig::default()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.page(), PageId(9));
        assert_eq!(index.rect_search(&bbox(0, 0, 50, 50)).count(), 0);
        assert_eq!(index.radial_search(10, 10, 100).count(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_fills_missing_fields_from_defaults() {
        let config: IndexConfig = serde_json::from_str(r#"{ "cell_size": 12 }"#).unwrap();
        assert_eq!(config.cell_size, 12);
        assert!(config.strict);
    }
}
