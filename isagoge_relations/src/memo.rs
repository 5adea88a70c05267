// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use hashbrown::HashSet;
use isagoge_index::ElementId;

/// Accept/reject cache for one (element, direction or role) search.
///
/// A candidate that has been tested once is never tested again within the
/// same search. A fresh memo is created for every search, so repeated runs
/// see identical state.
#[derive(Debug, Default)]
pub(crate) struct Memo {
    accepted: HashSet<ElementId>,
    rejected: HashSet<ElementId>,
}

impl Memo {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seed with ids accepted by an earlier pass.
    pub(crate) fn with_accepted(ids: impl IntoIterator<Item = ElementId>) -> Self {
        Self {
            accepted: ids.into_iter().collect(),
            rejected: HashSet::new(),
        }
    }

    /// Whether `id` has been tested already, either way.
    #[inline]
    pub(crate) fn is_known(&self, id: ElementId) -> bool {
        self.accepted.contains(&id) || self.rejected.contains(&id)
    }

    pub(crate) fn accept(&mut self, id: ElementId) -> bool {
        self.accepted.insert(id)
    }

    pub(crate) fn reject(&mut self, id: ElementId) -> bool {
        self.rejected.insert(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_both_outcomes() {
        let a = ElementId::from_index(1);
        let b = ElementId::from_index(2);
        let mut memo = Memo::with_accepted([a]);
        assert!(memo.is_known(a));
        assert!(!memo.accept(a));
        assert!(!memo.is_known(b));
        assert!(memo.reject(b));
        assert!(!memo.reject(b));
        assert!(memo.is_known(b));
        assert!(Memo::new().accept(b));
    }
}
