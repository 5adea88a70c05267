// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sorted, deduplicated sets of related element ids.

use isagoge_index::ElementId;
use smallvec::SmallVec;

use crate::error::{RelationError, Result};

/// Ordered set of element ids related to one owner element.
///
/// Ids are kept sorted ascending and appear at most once. Most elements have
/// only a handful of neighbors, so small sets stay inline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RelationSet {
    ids: SmallVec<[ElementId; 4]>,
}

impl RelationSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id`, keeping the set sorted. Returns `false` if it was already present.
    pub fn insert(&mut self, id: ElementId) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(at) => {
                self.ids.insert(at, id);
                true
            }
        }
    }

    /// Insert `id` into the set owned by `owner`.
    ///
    /// # Errors
    ///
    /// [`RelationError::Invariant`] when `id == owner`; an element is never related to itself.
    pub(crate) fn insert_for(&mut self, owner: ElementId, id: ElementId) -> Result<bool> {
        if id == owner {
            tracing::error!(element = %owner, "element offered as its own neighbor");
            return Err(RelationError::Invariant(format!(
                "element {owner} cannot be related to itself"
            )));
        }
        Ok(self.insert(id))
    }

    /// Whether `id` is in the set.
    #[inline]
    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Number of ids.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The ids in ascending order.
    #[inline]
    pub fn as_slice(&self) -> &[ElementId] {
        &self.ids
    }

    /// Iterate the ids in ascending order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = ElementId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<ElementId> for RelationSet {
    fn from_iter<I: IntoIterator<Item = ElementId>>(iter: I) -> Self {
        let mut ids: SmallVec<[ElementId; 4]> = iter.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }
}

impl<'a> IntoIterator for &'a RelationSet {
    type Item = &'a ElementId;
    type IntoIter = core::slice::Iter<'a, ElementId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: usize) -> ElementId {
        ElementId::from_index(i)
    }

    #[test]
    fn insert_keeps_sorted_and_unique() {
        let mut set = RelationSet::new();
        assert!(set.insert(id(5)));
        assert!(set.insert(id(1)));
        assert!(set.insert(id(3)));
        assert!(!set.insert(id(3)));
        assert_eq!(set.as_slice(), &[id(1), id(3), id(5)]);
        assert!(set.contains(id(5)));
        assert!(!set.contains(id(4)));
    }

    #[test]
    fn owner_is_refused() {
        let mut set = RelationSet::new();
        assert!(matches!(
            set.insert_for(id(2), id(2)),
            Err(RelationError::Invariant(_))
        ));
        assert_eq!(set.insert_for(id(2), id(7)), Ok(true));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn collect_sorts_and_dedups() {
        let set: RelationSet = [id(9), id(2), id(9), id(4)].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![id(2), id(4), id(9)]);
    }
}
