// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coverage: aligned, close, non-trivial neighbors in each direction.
//!
//! For an element with reference box `R` and a direction `d`, one unit-wide
//! band is swept outward from `R`'s edge for every unit of `R`'s extent on the
//! cross axis. Each band contributes at most one fresh candidate, the nearest
//! one lying strictly beyond `R`'s edge, which is then tested with
//! [`is_neighbor_covered`]. Every tested candidate is memoized, so a neighbor
//! spanning many bands is judged once.

use isagoge_index::{BandQuery, BoundingBox, Direction, ElementId};

use crate::config::CoveragePolicy;
use crate::error::Result;
use crate::memo::Memo;
use crate::scope::Scope;
use crate::set::RelationSet;
use crate::stats::AnalyzerStats;

/// Reference for aggregate-mode coverage.
///
/// A later pass measures coverage against a merged box (for instance a whole
/// candidate region) rather than a single element's box, starting from the
/// neighbors an earlier pass already accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageReference {
    /// The merged box searched from.
    pub bbox: BoundingBox,
    /// Neighbors accepted by the earlier pass; never re-tested.
    pub prior: RelationSet,
    /// Gap divisor `K` applied against this reference.
    pub gap_divisor: i32,
}

impl CoverageReference {
    /// Aggregate reference with the default gap divisor.
    pub fn new(bbox: BoundingBox, prior: RelationSet) -> Self {
        Self {
            bbox,
            prior,
            gap_divisor: CoveragePolicy::AGGREGATE_GAP_DIVISOR,
        }
    }

    /// Override the gap divisor.
    pub fn with_gap_divisor(mut self, gap_divisor: i32) -> Self {
        self.gap_divisor = gap_divisor;
        self
    }
}

/// Covered sets of one element in all four directions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoverageRelations {
    /// Neighbors covered to the left.
    pub left: RelationSet,
    /// Neighbors covered to the right.
    pub right: RelationSet,
    /// Neighbors covered above.
    pub up: RelationSet,
    /// Neighbors covered below.
    pub down: RelationSet,
}

impl CoverageRelations {
    /// The covered set for `dir`.
    pub fn get(&self, dir: Direction) -> &RelationSet {
        match dir {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }

    fn get_mut(&mut self, dir: Direction) -> &mut RelationSet {
        match dir {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }

    /// Number of neighbors covered in `dir`.
    #[inline]
    pub fn count(&self, dir: Direction) -> usize {
        self.get(dir).len()
    }
}

/// Whether `neighbor` is covered by `reference` in `dir`.
///
/// With extent `x` being `reference`'s height for LEFT/RIGHT and width for
/// UP/DOWN, and `gap` the distance between the facing edges:
/// - the neighbor's cross-axis center lies within `reference`'s cross span, edges included;
/// - `gap <= x / gap_divisor`;
/// - `area(neighbor) > x / policy.min_area_divisor`;
/// - `gap < policy.max_gap_to_size * max(width, height)` of the neighbor.
///
/// `gap_divisor` is `None` when the policy disables the distance test.
pub fn is_neighbor_covered(
    policy: &CoveragePolicy,
    neighbor: &BoundingBox,
    reference: &BoundingBox,
    dir: Direction,
    gap_divisor: Option<i32>,
) -> bool {
    let extent = i64::from(reference.cross_extent(dir));
    let gap = i64::from(neighbor.gap_from(reference, dir));

    if policy.require_cross_alignment {
        let (low, high) = reference.cross_span(dir);
        let center = neighbor.cross_center(dir);
        if center < low || center > high {
            return false;
        }
    }
    if let Some(k) = gap_divisor.filter(|k| *k > 0)
        && gap * i64::from(k) > extent
    {
        return false;
    }
    if let Some(k) = policy.min_area_divisor.filter(|k| *k > 0)
        && neighbor.area() * i64::from(k) <= extent
    {
        return false;
    }
    if let Some(k) = policy.max_gap_to_size {
        let size = i64::from(neighbor.width().max(neighbor.height()));
        if gap >= i64::from(k) * size {
            return false;
        }
    }
    true
}

/// Computes covered sets for the elements of one page.
#[derive(Debug)]
pub struct CoverageAnalyzer<'a> {
    scope: Scope<'a>,
    policy: &'a CoveragePolicy,
    stats: AnalyzerStats,
}

impl<'a> CoverageAnalyzer<'a> {
    /// Create an analyzer over `scope`.
    pub fn new(scope: &Scope<'a>, policy: &'a CoveragePolicy) -> Self {
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

    /// Neighbors of `id` covered by its own box in `dir`.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not on the page, when analysis is cancelled, or when
    /// an internal invariant breaks.
    pub fn covered(&mut self, id: ElementId, dir: Direction) -> Result<RelationSet> {
        let element = self.scope.element(id)?;
        let cov = element.covariates();
        if self.policy.skip_normal_text_words && cov.validated_word && cov.normal_row {
            return Ok(RelationSet::new());
        }
        let reference = *element.bbox();
        self.search(
            id,
            &reference,
            dir,
            RelationSet::new(),
            Memo::new(),
            self.policy.gap_divisor,
        )
    }

    /// Neighbors of `id` covered by an aggregate `reference` in `dir`.
    ///
    /// The result starts from `reference.prior`, whose members are not tested again.
    ///
    /// # Errors
    ///
    /// As [`covered`](Self::covered); also an invariant error if `reference.prior` contains `id`.
    pub fn covered_aggregate(
        &mut self,
        id: ElementId,
        dir: Direction,
        reference: &CoverageReference,
    ) -> Result<RelationSet> {
        self.scope.element(id)?;
        let mut seeded = RelationSet::new();
        for prior in &reference.prior {
            seeded.insert_for(id, *prior)?;
        }
        let memo = Memo::with_accepted(reference.prior.iter());
        let gap_divisor = self.policy.gap_divisor.map(|_| reference.gap_divisor);
        self.search(id, &reference.bbox, dir, seeded, memo, gap_divisor)
    }

    /// Covered sets of `id` in all four directions.
    ///
    /// # Errors
    ///
    /// As [`covered`](Self::covered).
    pub fn analyze_element(&mut self, id: ElementId) -> Result<CoverageRelations> {
        let mut out = CoverageRelations::default();
        for dir in Direction::ALL {
            *out.get_mut(dir) = self.covered(id, dir)?;
        }
        Ok(out)
    }

    /// Covered sets of every element, indexed by element id.
    ///
    /// # Errors
    ///
    /// As [`covered`](Self::covered).
    pub fn analyze_page(&mut self) -> Result<Vec<CoverageRelations>> {
        self.scope
            .page()
            .ids()
            .map(|id| self.analyze_element(id))
            .collect()
    }

    fn search(
        &mut self,
        id: ElementId,
        reference: &BoundingBox,
        dir: Direction,
        mut covered: RelationSet,
        mut memo: Memo,
        gap_divisor: Option<i32>,
    ) -> Result<RelationSet> {
        let own = *self.scope.element(id)?.bbox();
        let index = self.scope.index();
        let range = reference.cross_extent(dir);
        for offset in 0..range {
            let query = BandQuery::unit_from(reference, dir, offset);
            let mut fresh = None;
            for candidate in index.directional_search(&query) {
                self.scope.check_cancel()?;
                self.stats.visited += 1;
                if candidate.id == id
                    || candidate.bbox == own
                    || candidate.bbox.gap_from(reference, dir) <= 0
                    || memo.is_known(candidate.id)
                {
                    continue;
                }
                fresh = Some(candidate);
                break;
            }
            let Some(neighbor) = fresh else {
                continue;
            };
            if is_neighbor_covered(self.policy, &neighbor.bbox, reference, dir, gap_divisor) {
                covered.insert_for(id, neighbor.id)?;
                memo.accept(neighbor.id);
                self.stats.accepted += 1;
                tracing::trace!(element = %id, neighbor = %neighbor.id, %dir, "covered");
            } else {
                memo.reject(neighbor.id);
                self.stats.rejected += 1;
            }
        }
        Ok(covered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isagoge_index::{Covariates, IndexConfig, Page, PageId, SpatialIndex};

    fn bbox(l: i32, b: i32, r: i32, t: i32) -> BoundingBox {
        BoundingBox::new(l, b, r, t).unwrap()
    }

    fn page_of(boxes: &[BoundingBox]) -> (Page, SpatialIndex) {
        let mut page = Page::with_size(PageId(0), 200, 200).unwrap();
        for b in boxes {
            page.push_box(*b);
        }
        let index = SpatialIndex::build(&page, &IndexConfig::default()).unwrap();
        (page, index)
    }

    fn id(i: usize) -> ElementId {
        ElementId::from_index(i)
    }

    #[test]
    fn close_aligned_neighbor_is_covered_both_ways() {
        let (page, index) = page_of(&[bbox(0, 0, 10, 10), bbox(12, 2, 20, 8)]);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = CoveragePolicy::default();
        let mut analyzer = CoverageAnalyzer::new(&scope, &policy);

        let right = analyzer.covered(id(0), Direction::Right).unwrap();
        assert_eq!(right.as_slice(), &[id(1)]);
        let left = analyzer.covered(id(1), Direction::Left).unwrap();
        assert_eq!(left.as_slice(), &[id(0)]);
        assert!(analyzer.covered(id(0), Direction::Left).unwrap().is_empty());
    }

    #[test]
    fn coverage_need_not_be_mutual() {
        let (page, index) = page_of(&[bbox(0, 0, 10, 10), bbox(12, 4, 14, 6)]);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = CoveragePolicy::default();
        let mut analyzer = CoverageAnalyzer::new(&scope, &policy);

        let right = analyzer.covered(id(0), Direction::Right).unwrap();
        assert_eq!(right.as_slice(), &[id(1)]);
        // From the small box the gap is too wide for its two-unit height.
        assert!(analyzer.covered(id(1), Direction::Left).unwrap().is_empty());
    }

    #[test]
    fn distant_neighbor_is_rejected_once() {
        let (page, index) = page_of(&[bbox(0, 0, 10, 10), bbox(30, 0, 40, 10)]);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = CoveragePolicy::default();
        let mut analyzer = CoverageAnalyzer::new(&scope, &policy);

        assert!(analyzer.covered(id(0), Direction::Right).unwrap().is_empty());
        let stats = analyzer.stats();
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.accepted, 0);
    }

    #[test]
    fn rejected_near_candidate_does_not_hide_farther_ones() {
        // Element 1 is tiny and sits in the same bands as element 2.
        let (page, index) = page_of(&[
            bbox(0, 0, 40, 40),
            bbox(42, 18, 43, 19),
            bbox(50, 10, 60, 30),
        ]);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = CoveragePolicy::default();
        let mut analyzer = CoverageAnalyzer::new(&scope, &policy);
        let right = analyzer.covered(id(0), Direction::Right).unwrap();
        assert_eq!(right.as_slice(), &[id(2)]);
    }

    #[test]
    fn vertical_directions_use_width() {
        let (page, index) = page_of(&[
            bbox(10, 10, 30, 20),
            bbox(14, 24, 26, 34), // 4 above, center x 20
            bbox(12, 0, 28, 6),   // 4 below
        ]);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = CoveragePolicy::default();
        let mut analyzer = CoverageAnalyzer::new(&scope, &policy);
        let all = analyzer.analyze_element(id(0)).unwrap();
        assert_eq!(all.up.as_slice(), &[id(1)]);
        assert_eq!(all.down.as_slice(), &[id(2)]);
        assert_eq!(all.count(Direction::Right), 0);
    }

    #[test]
    fn results_never_contain_the_owner_and_are_repeatable() {
        let boxes = [
            bbox(0, 0, 10, 10),
            bbox(12, 2, 20, 8),
            bbox(22, 0, 32, 10),
            bbox(0, 12, 10, 22),
            bbox(0, 0, 10, 10),
        ];
        let (page, index) = page_of(&boxes);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = CoveragePolicy::default();
        let first = CoverageAnalyzer::new(&scope, &policy).analyze_page().unwrap();
        let second = CoverageAnalyzer::new(&scope, &policy).analyze_page().unwrap();
        assert_eq!(first, second);
        for (i, rel) in first.iter().enumerate() {
            for dir in Direction::ALL {
                assert!(!rel.get(dir).contains(id(i)));
            }
        }
        // Duplicate boxes never cover each other.
        assert!(!first[0].right.contains(id(4)));
    }

    #[test]
    fn aggregate_reference_seeds_and_uses_tighter_gap() {
        let (page, index) = page_of(&[
            bbox(0, 0, 10, 20),
            bbox(12, 0, 22, 20),
            bbox(26, 4, 34, 16), // 4 past the merged box
            bbox(30, 40, 40, 50),
        ]);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = CoveragePolicy::default();
        let mut analyzer = CoverageAnalyzer::new(&scope, &policy);

        let merged = bbox(0, 0, 22, 20);
        let prior: RelationSet = [id(3)].into_iter().collect();
        let reference = CoverageReference::new(merged, prior);
        let right = analyzer
            .covered_aggregate(id(0), Direction::Right, &reference)
            .unwrap();
        // gap 4 * 4 <= 20
        assert_eq!(right.as_slice(), &[id(2), id(3)]);

        let strict = reference.clone().with_gap_divisor(8);
        let right = analyzer
            .covered_aggregate(id(0), Direction::Right, &strict)
            .unwrap();
        assert_eq!(right.as_slice(), &[id(3)]);

        let own: RelationSet = [id(0)].into_iter().collect();
        let bad = CoverageReference::new(merged, own);
        assert!(analyzer
            .covered_aggregate(id(0), Direction::Right, &bad)
            .is_err());
    }

    #[test]
    fn normal_text_policy_short_circuits() {
        let mut page = Page::with_size(PageId(0), 100, 100).unwrap();
        let word = Covariates {
            validated_word: true,
            normal_row: true,
            ..Covariates::default()
        };
        let e = page.push(bbox(0, 0, 10, 10), word);
        page.push_box(bbox(12, 2, 20, 8));
        let index = SpatialIndex::build(&page, &IndexConfig::default()).unwrap();
        let scope = Scope::new(&page, &index).unwrap();

        let on = CoveragePolicy {
            skip_normal_text_words: true,
            ..CoveragePolicy::default()
        };
        assert!(CoverageAnalyzer::new(&scope, &on)
            .covered(e, Direction::Right)
            .unwrap()
            .is_empty());
        let off = CoveragePolicy::default();
        assert_eq!(
            CoverageAnalyzer::new(&scope, &off)
                .covered(e, Direction::Right)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn disabled_tests_are_skipped() {
        let reference = bbox(0, 0, 10, 10);
        let far = bbox(25, 0, 35, 10);
        let policy = CoveragePolicy::default();
        assert!(!is_neighbor_covered(&policy, &far, &reference, Direction::Right, Some(2)));
        assert!(is_neighbor_covered(&policy, &far, &reference, Direction::Right, None));
        let misaligned = bbox(12, 8, 20, 30);
        assert!(!is_neighbor_covered(&policy, &misaligned, &reference, Direction::Right, Some(2)));
        let loose = CoveragePolicy {
            require_cross_alignment: false,
            ..policy
        };
        assert!(is_neighbor_covered(&loose, &misaligned, &reference, Direction::Right, Some(2)));
    }
}
