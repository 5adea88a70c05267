// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-page analysis: run every analyzer and gather per-element results.

use isagoge_index::{Direction, ElementId, Page, PageId, SpatialIndex};

use crate::cancel::CancelFlag;
use crate::config::AnalysisConfig;
use crate::coverage::{CoverageAnalyzer, CoverageRelations};
use crate::error::{RelationError, Result};
use crate::features::{FeatureSet, FeatureVector};
use crate::nesting::NestingAnalyzer;
use crate::scope::Scope;
use crate::scripts::{ScriptAnalyzer, ScriptRelations};
use crate::set::RelationSet;
use crate::stacking::{StackingAnalyzer, StackingRelations};
use crate::stats::{AnalyzerStats, PageStats};

/// Every relation computed for one element.
///
/// Each analyzer owns exactly one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementRelations {
    /// The element.
    pub id: ElementId,
    /// Covered neighbors per direction.
    pub coverage: CoverageRelations,
    /// Nested elements.
    pub nested: RelationSet,
    /// Stacking chains.
    pub stacking: StackingRelations,
    /// Sub/superscript partners and hosts.
    pub scripts: ScriptRelations,
}

impl ElementRelations {
    /// No relations at all.
    pub fn empty(id: ElementId) -> Self {
        Self {
            id,
            coverage: CoverageRelations::default(),
            nested: RelationSet::new(),
            stacking: StackingRelations::default(),
            scripts: ScriptRelations::default(),
        }
    }

    /// Number of neighbors covered in `dir`.
    #[inline]
    pub fn covered_count(&self, dir: Direction) -> usize {
        self.coverage.count(dir)
    }

    /// Number of nested elements.
    #[inline]
    pub fn nested_count(&self) -> usize {
        self.nested.len()
    }

    /// Number of elements stacked above and below.
    #[inline]
    pub fn stacked_count(&self) -> usize {
        self.stacking.count()
    }

    /// Classifier features selected by `set`.
    pub fn features(&self, set: FeatureSet) -> FeatureVector {
        FeatureVector::assemble(set, self)
    }
}

/// Relations of every element on a page, indexed by element id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRelations {
    page: PageId,
    elements: Vec<ElementRelations>,
    stats: PageStats,
}

impl PageRelations {
    /// The analyzed page.
    #[inline]
    pub fn page(&self) -> PageId {
        self.page
    }

    /// Relations of one element.
    #[inline]
    pub fn get(&self, id: ElementId) -> Option<&ElementRelations> {
        self.elements.get(id.index())
    }

    /// Relations of all elements in id order.
    #[inline]
    pub fn elements(&self) -> &[ElementRelations] {
        &self.elements
    }

    /// Per-analyzer counters for this page.
    #[inline]
    pub fn stats(&self) -> &PageStats {
        &self.stats
    }

    /// Feature vectors of all elements in id order.
    pub fn feature_vectors(&self, set: FeatureSet) -> Vec<FeatureVector> {
        self.elements.iter().map(|e| e.features(set)).collect()
    }
}

type Analyzed<T> = Result<(Vec<T>, AnalyzerStats)>;

/// Runs all four analyzers over pages with one configuration.
#[derive(Clone, Debug)]
pub struct PageAnalyzer<'c> {
    config: &'c AnalysisConfig,
    cancel: CancelFlag,
}

impl<'c> PageAnalyzer<'c> {
    /// Create an analyzer using `config`.
    pub fn new(config: &'c AnalysisConfig) -> Self {
        Self {
            config,
            cancel: CancelFlag::default(),
        }
    }

    /// Poll `cancel` during analysis.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Build the index for `page` and analyze it.
    ///
    /// # Errors
    ///
    /// Index construction errors, cancellation, and invariant failures.
    pub fn analyze(&self, page: &Page) -> Result<PageRelations> {
        let index = SpatialIndex::build(page, &self.config.index)?;
        self.analyze_indexed(page, &index)
    }

    /// Analyze `page` with an index already built from it.
    ///
    /// The four analyzers only read the page and index and each produces its
    /// own field, so with the `parallel` feature they run concurrently.
    ///
    /// # Errors
    ///
    /// [`RelationError::IndexMismatch`] if `index` belongs to another page,
    /// then as [`analyze`](Self::analyze).
    pub fn analyze_indexed(&self, page: &Page, index: &SpatialIndex) -> Result<PageRelations> {
        let scope = Scope::new(page, index)?.with_cancel(self.cancel.clone());
        let ((coverage, nesting), (stacking, scripts)) = self.run(&scope);
        let (coverage, coverage_stats) = coverage?;
        let (nested, nesting_stats) = nesting?;
        let (stacking, stacking_stats) = stacking?;
        let (scripts, scripts_stats) = scripts?;

        let elements = page
            .ids()
            .zip(coverage)
            .zip(nested)
            .zip(stacking)
            .zip(scripts)
            .map(
                |((((id, coverage), nested), stacking), scripts)| ElementRelations {
                    id,
                    coverage,
                    nested,
                    stacking,
                    scripts,
                },
            )
            .collect::<Vec<_>>();
        if elements.len() != page.len() {
            return Err(RelationError::Invariant(format!(
                "page {:?} produced {} results for {} elements",
                page.id(),
                elements.len(),
                page.len()
            )));
        }

        let stats = PageStats {
            coverage: coverage_stats,
            nesting: nesting_stats,
            stacking: stacking_stats,
            scripts: scripts_stats,
        };
        tracing::debug!(
            page = page.id().0,
            elements = elements.len(),
            covered = stats.coverage.accepted,
            nested = stats.nesting.accepted,
            stacked = stats.stacking.accepted,
            scripts = stats.scripts.accepted,
            visited = stats.coverage.visited
                + stats.nesting.visited
                + stats.stacking.visited
                + stats.scripts.visited,
            "analyzed page"
        );
        Ok(PageRelations {
            page: page.id(),
            elements,
            stats,
        })
    }

    #[allow(
        clippy::type_complexity,
        reason = "One result slot per analyzer, mirroring the join tree."
    )]
    fn run(
        &self,
        scope: &Scope<'_>,
    ) -> (
        (Analyzed<CoverageRelations>, Analyzed<RelationSet>),
        (Analyzed<StackingRelations>, Analyzed<ScriptRelations>),
    ) {
        let config = self.config;
        let coverage = || {
            let mut a = CoverageAnalyzer::new(scope, &config.coverage);
            a.analyze_page().map(|r| (r, a.stats()))
        };
        let nesting = || {
            let mut a = NestingAnalyzer::new(scope, &config.nesting);
            a.analyze_page().map(|r| (r, a.stats()))
        };
        let stacking = || {
            let mut a = StackingAnalyzer::new(scope, &config.stacking);
            a.analyze_page().map(|r| (r, a.stats()))
        };
        let scripts = || {
            let mut a = ScriptAnalyzer::new(scope, &config.scripts);
            a.analyze_page().map(|r| (r, a.stats()))
        };

        #[cfg(feature = "parallel")]
        {
            rayon::join(
                || rayon::join(coverage, nesting),
                || rayon::join(stacking, scripts),
            )
        }
        #[cfg(not(feature = "parallel"))]
        {
            ((coverage(), nesting()), (stacking(), scripts()))
        }
    }
}

/// Analyze independent pages, each with its own index.
///
/// Results are returned in input order; a failing page does not affect the
/// others. With the `parallel` feature pages are spread over the rayon pool.
pub fn analyze_pages(
    pages: &[Page],
    config: &AnalysisConfig,
    cancel: &CancelFlag,
) -> Vec<Result<PageRelations>> {
    let analyzer = PageAnalyzer::new(config).with_cancel(cancel.clone());
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        pages.par_iter().map(|page| analyzer.analyze(page)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        pages.iter().map(|page| analyzer.analyze(page)).collect()
    }
}
