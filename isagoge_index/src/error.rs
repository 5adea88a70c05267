// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for index construction.

use thiserror::Error;

use crate::element::ElementId;
use crate::types::BoundingBox;

/// Errors raised while building boxes, pages, or the spatial index.
///
/// All of these are construction-time failures. Queries never fail: an empty
/// band or region simply yields an exhausted cursor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// A box with zero or negative extent on either axis.
    #[error("degenerate bounding box: left={left} bottom={bottom} right={right} top={top}")]
    DegenerateBox {
        /// Left edge.
        left: i32,
        /// Bottom edge.
        bottom: i32,
        /// Right edge.
        right: i32,
        /// Top edge.
        top: i32,
    },

    /// An element lies (partly) outside the configured page extent in strict mode.
    #[error("element {id} at {bbox} lies outside the index extent {extent}")]
    OutOfExtent {
        /// Offending element.
        id: ElementId,
        /// Its box.
        bbox: BoundingBox,
        /// The configured extent.
        extent: BoundingBox,
    },

    /// Grid cells must have a strictly positive size.
    #[error("invalid grid cell size: {0}")]
    InvalidCellSize(i32),

    /// An id that does not belong to the page the index was built from.
    #[error("unknown element: {0}")]
    UnknownElement(ElementId),
}

/// Result type for index operations.
pub type Result<T> = core::result::Result<T, IndexError>;
