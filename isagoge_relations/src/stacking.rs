// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacking: chains of adjacent elements above and below an element.
//!
//! Starting from the host, each step searches from the previous link's edge
//! across the previous link's span and takes the nearest unchained element
//! beyond it. The chain grows while each new link is close to the previous one
//! and not too small next to the host; the first failure ends it.

use isagoge_index::{BandQuery, BoundingBox, Candidate, Direction, ElementId};

use crate::config::StackingPolicy;
use crate::error::{RelationError, Result};
use crate::memo::Memo;
use crate::scope::Scope;
use crate::stats::AnalyzerStats;

/// Stacking chains of one element, nearest link first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackingRelations {
    /// Chain above the element.
    pub up: Vec<ElementId>,
    /// Chain below the element.
    pub down: Vec<ElementId>,
}

impl StackingRelations {
    /// Total number of stacked elements in both chains.
    #[inline]
    pub fn count(&self) -> usize {
        self.up.len() + self.down.len()
    }

    /// Whether `id` appears in either chain.
    pub fn contains(&self, id: ElementId) -> bool {
        self.up.contains(&id) || self.down.contains(&id)
    }
}

/// Whether `candidate` may extend a chain whose last link is `previous`.
///
/// `host` is the chain's owner and sets the scale: the candidate must have at
/// least `area(host) / min_area_divisor` area, and its gap to `previous` must
/// be at most the host's extent along `dir` divided by `max_gap_divisor`.
pub fn is_adjacent(
    policy: &StackingPolicy,
    candidate: &BoundingBox,
    previous: &BoundingBox,
    host: &BoundingBox,
    dir: Direction,
) -> bool {
    if let Some(k) = policy.min_area_divisor.filter(|k| *k > 0)
        && candidate.area() * i64::from(k) < host.area()
    {
        return false;
    }
    if let Some(k) = policy.max_gap_divisor.filter(|k| *k > 0) {
        let gap = i64::from(candidate.gap_from(previous, dir));
        if gap * i64::from(k) > i64::from(host.extent_along(dir)) {
            return false;
        }
    }
    true
}

/// Computes stacking chains for the elements of one page.
#[derive(Debug)]
pub struct StackingAnalyzer<'a> {
    scope: Scope<'a>,
    policy: &'a StackingPolicy,
    stats: AnalyzerStats,
}

impl<'a> StackingAnalyzer<'a> {
    /// Create an analyzer over `scope`.
    pub fn new(scope: &Scope<'a>, policy: &'a StackingPolicy) -> Self {
        Self {
            scope: scope.clone(),
            policy,
            stats: AnalyzerStats::default(),
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> AnalyzerStats {
        self.stats
    }

    fn is_normal_text(&self, id: ElementId) -> Result<bool> {
        let cov = self.scope.element(id)?.covariates();
        Ok(self.policy.skip_normal_text && (cov.validated_word || cov.normal_row))
    }

    /// The chain stacked on `id` in `dir`, nearest link first.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not on the page, when analysis is cancelled, or if a
    /// chain would revisit an element.
    pub fn chain(&mut self, id: ElementId, dir: Direction) -> Result<Vec<ElementId>> {
        let host = *self.scope.element(id)?.bbox();
        let mut chain = Vec::new();
        if self.is_normal_text(id)? {
            return Ok(chain);
        }
        let mut memo = Memo::new();
        let mut previous = host;
        // Each accepted link is new, so the page size bounds the walk.
        while chain.len() < self.scope.page().len() {
            let Some(next) = self.next_link(id, &previous, dir, &memo)? else {
                break;
            };
            if !is_adjacent(self.policy, &next.bbox, &previous, &host, dir)
                || self.is_normal_text(next.id)?
            {
                self.stats.rejected += 1;
                break;
            }
            if !memo.accept(next.id) {
                tracing::error!(element = %id, link = %next.id, %dir, "stacking chain revisited an element");
                return Err(RelationError::Invariant(format!(
                    "stacking chain of {id} revisited {}",
                    next.id
                )));
            }
            self.stats.accepted += 1;
            tracing::trace!(element = %id, link = %next.id, %dir, "stacked");
            chain.push(next.id);
            previous = next.bbox;
        }
        Ok(chain)
    }

    fn next_link(
        &mut self,
        id: ElementId,
        previous: &BoundingBox,
        dir: Direction,
        memo: &Memo,
    ) -> Result<Option<Candidate>> {
        let (low, high) = previous.cross_span(dir);
        let query = BandQuery::new(dir, previous.edge(dir), low, high).with_origin(*previous);
        for candidate in self.scope.index().directional_search(&query) {
            self.scope.check_cancel()?;
            self.stats.visited += 1;
            if candidate.id == id
                || candidate.bbox.gap_from(previous, dir) < 0
                || memo.is_known(candidate.id)
            {
                continue;
            }
            return Ok(Some(candidate));
        }
        Ok(None)
    }

    /// Both chains of `id`.
    ///
    /// # Errors
    ///
    /// As [`chain`](Self::chain).
    pub fn analyze_element(&mut self, id: ElementId) -> Result<StackingRelations> {
        Ok(StackingRelations {
            up: self.chain(id, Direction::Up)?,
            down: self.chain(id, Direction::Down)?,
        })
    }

    /// Number of elements stacked on `id`, above and below.
    ///
    /// # Errors
    ///
    /// As [`chain`](Self::chain).
    pub fn stacked_count(&mut self, id: ElementId) -> Result<usize> {
        Ok(self.analyze_element(id)?.count())
    }

    /// Chains of every element, indexed by element id.
    ///
    /// # Errors
    ///
    /// As [`chain`](Self::chain).
    pub fn analyze_page(&mut self) -> Result<Vec<StackingRelations>> {
        self.scope
            .page()
            .ids()
            .map(|id| self.analyze_element(id))
            .collect()
    }
}
