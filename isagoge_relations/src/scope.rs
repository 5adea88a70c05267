// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use isagoge_index::{Element, ElementId, Page, SpatialIndex};

use crate::cancel::CancelFlag;
use crate::error::{RelationError, Result};

/// The read-only inputs shared by every analyzer of one page.
///
/// Pairs a page with the index built from it, and carries the cancellation
/// flag analyzers poll while they walk cursors.
#[derive(Clone, Debug)]
pub struct Scope<'a> {
    page: &'a Page,
    index: &'a SpatialIndex,
    cancel: CancelFlag,
}

impl<'a> Scope<'a> {
    /// Pair `page` with `index`.
    ///
    /// # Errors
    ///
    /// [`RelationError::IndexMismatch`] when `index` was not built from `page`,
    /// [`RelationError::StaleIndex`] when an element moved since it was built.
    pub fn new(page: &'a Page, index: &'a SpatialIndex) -> Result<Self> {
        if index.page() != page.id() || index.len() != page.len() {
            return Err(RelationError::IndexMismatch {
                index: index.page(),
                indexed: index.len(),
                page: page.id(),
                elements: page.len(),
            });
        }
        if let Some(stale) = page
            .elements()
            .iter()
            .find(|e| index.bbox(e.id()) != Some(e.bbox()))
        {
            return Err(RelationError::StaleIndex { id: stale.id() });
        }
        Ok(Self {
            page,
            index,
            cancel: CancelFlag::default(),
        })
    }

    /// Poll `cancel` during analysis.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// The page.
    #[inline]
    pub fn page(&self) -> &'a Page {
        self.page
    }

    /// The index built from the page.
    #[inline]
    pub fn index(&self) -> &'a SpatialIndex {
        self.index
    }

    #[inline]
    pub(crate) fn element(&self, id: ElementId) -> Result<&'a Element> {
        Ok(self.page.element(id)?)
    }

    #[inline]
    pub(crate) fn check_cancel(&self) -> Result<()> {
        self.cancel.check()
    }
}
