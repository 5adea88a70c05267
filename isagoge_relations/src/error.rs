// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for relation analysis.

use isagoge_index::{ElementId, IndexError, PageId};
use thiserror::Error;

/// Errors raised by the relation analyzers.
///
/// An empty result is never an error; an element with no neighbors simply has
/// empty relation sets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelationError {
    /// Index construction or element lookup failed.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// The caller's cancellation flag was raised.
    #[error("analysis cancelled")]
    Cancelled,

    /// An internal consistency check failed.
    ///
    /// This indicates a logic defect, not bad input.
    #[error("relation invariant violated: {0}")]
    Invariant(String),

    /// The index passed in was not built from the page being analyzed.
    #[error("index was built for page {index:?} with {indexed} elements, not page {page:?} with {elements}")]
    IndexMismatch {
        /// Page the index was built from.
        index: PageId,
        /// Number of elements it holds.
        indexed: usize,
        /// Page being analyzed.
        page: PageId,
        /// Number of elements on that page.
        elements: usize,
    },

    /// The index holds a different box for an element than the page does.
    #[error("index box for element {id} differs from the page")]
    StaleIndex {
        /// First element whose boxes disagree.
        id: ElementId,
    },
}

/// Result type for relation analysis.
pub type Result<T> = core::result::Result<T, RelationError>;
