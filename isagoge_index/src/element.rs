// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page elements, their read-only covariates, and the per-page element arena.

use core::fmt;
use std::sync::Arc;

use crate::error::{IndexError, Result};
use crate::types::BoundingBox;

/// Identifier of an element within its page.
///
/// Ids are dense arena indices assigned by [`Page::push`]; they are stable for
/// the lifetime of the page and unique within it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    /// The arena slot this id refers to.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Rebuild an id from an arena slot, e.g. when iterating results by position.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Pages never hold more than u32::MAX elements; Page::push enforces it."
    )]
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of the page an element belongs to, supplied by the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PageId(pub u32);

bitflags::bitflags! {
    /// Where an element sits inside its recognized word.
    ///
    /// An interior element has neither flag; a single-element word has both.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct WordPosition: u8 {
        /// First element of the word.
        const FIRST = 0b0000_0001;
        /// Last element of the word.
        const LAST  = 0b0000_0010;
    }
}

impl WordPosition {
    /// Neither first nor last.
    #[inline]
    pub const fn is_interior(self) -> bool {
        self.is_empty()
    }
}

/// Identity and text of the recognized word an element belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordInfo {
    /// Upstream word identifier, shared by every element of the word.
    pub id: u32,
    /// Recognized text.
    pub text: Arc<str>,
}

/// Recognition covariates supplied by the upstream layout stage.
///
/// These are inputs only; nothing in this workspace writes to them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Covariates {
    /// The element belongs to a word the recognizer validated against its dictionary.
    pub validated_word: bool,
    /// Recognition confidence of that word, on the upstream engine's scale.
    pub confidence: Option<f32>,
    /// The element's text row looks like ordinary running text.
    pub normal_row: bool,
    /// Position within the recognized word, when the element belongs to one.
    pub word_position: Option<WordPosition>,
    /// The recognized word itself.
    pub word: Option<WordInfo>,
}

impl Covariates {
    /// Whether the element belongs to a validated word recognized with at least `threshold` confidence.
    #[inline]
    pub fn is_confident_word(&self, threshold: f32) -> bool {
        self.validated_word && self.confidence.is_some_and(|c| c >= threshold)
    }

    /// Whether the element is the first element of its word.
    #[inline]
    pub fn is_word_first(&self) -> bool {
        self.word_position
            .is_some_and(|p| p.contains(WordPosition::FIRST))
    }

    /// Whether the element is the last element of its word.
    #[inline]
    pub fn is_word_last(&self) -> bool {
        self.word_position
            .is_some_and(|p| p.contains(WordPosition::LAST))
    }

    /// The recognized word's text, if any.
    #[inline]
    pub fn word_text(&self) -> Option<&str> {
        self.word.as_ref().map(|w| &*w.text)
    }
}

/// A connected region isolated by the upstream layout stage.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    id: ElementId,
    page: PageId,
    bbox: BoundingBox,
    covariates: Covariates,
}

impl Element {
    /// This element's id.
    #[inline]
    pub const fn id(&self) -> ElementId {
        self.id
    }

    /// The owning page.
    #[inline]
    pub const fn page(&self) -> PageId {
        self.page
    }

    /// Bounding box.
    #[inline]
    pub const fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Read-only recognition covariates.
    #[inline]
    pub const fn covariates(&self) -> &Covariates {
        &self.covariates
    }
}

/// All elements of one page, addressed by [`ElementId`].
#[derive(Clone, Debug)]
pub struct Page {
    id: PageId,
    extent: BoundingBox,
    elements: Vec<Element>,
}

impl Page {
    /// Create an empty page covering `extent`.
    pub fn new(id: PageId, extent: BoundingBox) -> Self {
        Self {
            id,
            extent,
            elements: Vec::new(),
        }
    }

    /// Create an empty page of the given pixel size with its origin at `(0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DegenerateBox`] when either dimension is not positive.
    pub fn with_size(id: PageId, width: i32, height: i32) -> Result<Self> {
        Ok(Self::new(id, BoundingBox::new(0, 0, width, height)?))
    }

    /// Add an element and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the page already holds `u32::MAX` elements.
    pub fn push(&mut self, bbox: BoundingBox, covariates: Covariates) -> ElementId {
        let id = u32::try_from(self.elements.len())
            .map(ElementId)
            .expect("page element count exceeds u32::MAX");
        self.elements.push(Element {
            id,
            page: self.id,
            bbox,
            covariates,
        });
        id
    }

    /// Add an element without covariates.
    pub fn push_box(&mut self, bbox: BoundingBox) -> ElementId {
        self.push(bbox, Covariates::default())
    }

    /// The page id.
    #[inline]
    pub const fn id(&self) -> PageId {
        self.id
    }

    /// The page extent the index is built over.
    #[inline]
    pub const fn extent(&self) -> &BoundingBox {
        &self.extent
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the page has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Look up an element.
    #[inline]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    /// Look up an element, failing with [`IndexError::UnknownElement`].
    ///
    /// # Errors
    ///
    /// Returns an error when `id` was not issued by this page.
    #[inline]
    pub fn element(&self, id: ElementId) -> Result<&Element> {
        self.get(id).ok_or(IndexError::UnknownElement(id))
    }

    /// All elements in id order.
    #[inline]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// All element ids in order.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = ElementId> + '_ {
        self.elements.iter().map(Element::id)
    }
}
