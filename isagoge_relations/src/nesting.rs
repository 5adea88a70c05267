// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nesting: elements properly and substantially contained in another.

use isagoge_index::ElementId;

use crate::config::NestingPolicy;
use crate::error::Result;
use crate::scope::Scope;
use crate::set::RelationSet;
use crate::stats::AnalyzerStats;

/// Computes nested sets for the elements of one page.
///
/// Every element inside the host counts, including elements nested inside
/// other nested elements, so a radical containing a fraction containing digits
/// reports all of them.
#[derive(Debug)]
pub struct NestingAnalyzer<'a> {
    scope: Scope<'a>,
    policy: &'a NestingPolicy,
    stats: AnalyzerStats,
}

impl<'a> NestingAnalyzer<'a> {
    /// Create an analyzer over `scope`.
    pub fn new(scope: &Scope<'a>, policy: &'a NestingPolicy) -> Self {
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

    /// Elements nested in `id`.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not on the page or when analysis is cancelled.
    pub fn nested(&mut self, id: ElementId) -> Result<RelationSet> {
        let host = *self.scope.element(id)?.bbox();
        let mut nested = RelationSet::new();
        for candidate in self.scope.index().rect_search_from(&host, &host) {
            self.scope.check_cancel()?;
            self.stats.visited += 1;
            if candidate.id == id || nested.contains(candidate.id) {
                continue;
            }
            let substantial = self
                .policy
                .min_area_divisor
                .filter(|k| *k > 0)
                .is_none_or(|k| candidate.bbox.area() * i64::from(k) > host.area());
            if host.contains_strictly(&candidate.bbox) && substantial {
                nested.insert_for(id, candidate.id)?;
                self.stats.accepted += 1;
                tracing::trace!(element = %id, nested = %candidate.id, "nested");
            } else {
                self.stats.rejected += 1;
            }
        }
        Ok(nested)
    }

    /// Number of elements nested in `id`.
    ///
    /// # Errors
    ///
    /// As [`nested`](Self::nested).
    pub fn nested_count(&mut self, id: ElementId) -> Result<usize> {
        Ok(self.nested(id)?.len())
    }

    /// Nested sets of every element, indexed by element id.
    ///
    /// # Errors
    ///
    /// As [`nested`](Self::nested).
    pub fn analyze_page(&mut self) -> Result<Vec<RelationSet>> {
        self.scope.page().ids().map(|id| self.nested(id)).collect()
    }
}
