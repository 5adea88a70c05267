// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Isagoge Index: a bucketed 2D index over the elements of a scanned page.
//!
//! The upstream layout stage isolates small connected regions ("elements") on a
//! page image. This crate holds them and answers the geometric questions the
//! relation analyzers ask about them.
//!
//! - [`BoundingBox`] is an integer box with `y` growing upward; degenerate boxes are rejected.
//! - [`Page`] is the per-page arena handing out dense [`ElementId`]s.
//! - [`SpatialIndex`] buckets every element into each grid cell it touches.
//! - [`NeighborCursor`] walks the index lazily for directional band queries and
//!   eagerly for rectangle and radial queries.
//!
//! The index is built once from a page's full element set and never changes
//! afterwards, so any number of readers may share it.
//!
//! ## Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` for [`IndexConfig`] and [`Direction`].
//!
//! # Example
//!
//! ```rust
//! use isagoge_index::{BandQuery, BoundingBox, Direction, IndexConfig, Page, PageId, SpatialIndex};
//!
//! let mut page = Page::with_size(PageId(0), 200, 100)?;
//! let e = page.push_box(BoundingBox::new(0, 0, 10, 10)?);
//! let near = page.push_box(BoundingBox::new(12, 2, 20, 8)?);
//! let far = page.push_box(BoundingBox::new(60, 4, 70, 9)?);
//!
//! let index = SpatialIndex::build(&page, &IndexConfig::default())?;
//!
//! // Sweep right from the element's right edge along the row `y = 5`.
//! let origin = *page.element(e)?.bbox();
//! let query = BandQuery::unit_from(&origin, Direction::Right, 5);
//! let hits: Vec<_> = index.directional_search(&query).map(|c| c.id).collect();
//! assert_eq!(hits, vec![near, far]);
//! # Ok::<(), isagoge_index::IndexError>(())
//! ```

mod cursor;
mod element;
mod error;
mod grid;
mod index;
mod types;

pub use cursor::{BandQuery, Candidate, NeighborCursor};
pub use element::{Covariates, Element, ElementId, Page, PageId, WordInfo, WordPosition};
pub use error::{IndexError, Result};
pub use index::{IndexConfig, SpatialIndex};
pub use types::{BoundingBox, Direction};
