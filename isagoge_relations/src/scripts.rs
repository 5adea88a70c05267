// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sub/superscripts: smaller, vertically offset partners just right of a host.
//!
//! For each role the host's right side is probed with one-unit rightward bands
//! stepping from its vertical center toward the top (superscripts) or the
//! bottom (subscripts), up to half the host's height. Each band offers its
//! nearest plausible candidate; the first one passing every test becomes the
//! partner and the search for that role ends.

use core::fmt;

use isagoge_index::{BandQuery, BoundingBox, Candidate, Covariates, Direction, ElementId};

use crate::config::ScriptPolicy;
use crate::error::{RelationError, Result};
use crate::memo::Memo;
use crate::scope::Scope;
use crate::set::RelationSet;
use crate::stats::AnalyzerStats;

/// Which kind of partner is searched for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScriptRole {
    /// Below the host's center line.
    Subscript,
    /// Above the host's center line.
    Superscript,
}

impl ScriptRole {
    /// Both roles.
    pub const ALL: [Self; 2] = [Self::Subscript, Self::Superscript];
}

impl fmt::Display for ScriptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Subscript => "subscript",
            Self::Superscript => "superscript",
        })
    }
}

/// A directed host → partner relation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScriptRelation {
    /// The element carrying the script.
    pub host: ElementId,
    /// The script itself.
    pub partner: ElementId,
    /// Sub or super.
    pub role: ScriptRole,
}

/// Script relations of one element, in both directions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptRelations {
    /// This element's subscript.
    pub subscript: Option<ElementId>,
    /// This element's superscript.
    pub superscript: Option<ElementId>,
    /// Hosts this element is a subscript of.
    pub subscript_of: RelationSet,
    /// Hosts this element is a superscript of.
    pub superscript_of: RelationSet,
}

impl ScriptRelations {
    /// The partner in `role`, if any.
    pub fn partner(&self, role: ScriptRole) -> Option<ElementId> {
        match role {
            ScriptRole::Subscript => self.subscript,
            ScriptRole::Superscript => self.superscript,
        }
    }

    /// Whether this element is some host's partner in `role`.
    pub fn is_partner(&self, role: ScriptRole) -> bool {
        match role {
            ScriptRole::Subscript => !self.subscript_of.is_empty(),
            ScriptRole::Superscript => !self.superscript_of.is_empty(),
        }
    }
}

fn ends_with_terminal_punctuation(text: &str) -> bool {
    text.ends_with(['.', ',', '?'])
}

fn is_possessive(text: &str) -> bool {
    text.ends_with("'s") || text.ends_with("\u{2019}s")
}

/// Computes sub/superscript relations for the elements of one page.
#[derive(Debug)]
pub struct ScriptAnalyzer<'a> {
    scope: Scope<'a>,
    policy: &'a ScriptPolicy,
    stats: AnalyzerStats,
}

impl<'a> ScriptAnalyzer<'a> {
    /// Create an analyzer over `scope`.
    pub fn new(scope: &Scope<'a>, policy: &'a ScriptPolicy) -> Self {
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

    fn host_searches(&self, cov: &Covariates, role: ScriptRole) -> bool {
        let policy = self.policy;
        if policy.require_host_word_last && cov.validated_word && !cov.is_word_last() {
            return false;
        }
        if role == ScriptRole::Subscript
            && policy.skip_punctuated_subscript_hosts
            && cov.normal_row
            && cov.is_confident_word(policy.very_confident_word)
            && cov.word_text().is_some_and(ends_with_terminal_punctuation)
        {
            return false;
        }
        true
    }

    /// A superscript that is really the rest of a word shared with the host.
    fn is_word_continuation(&self, host: &Covariates, partner: &Covariates) -> bool {
        let (Some(host_word), Some(partner_word)) = (&host.word, &partner.word) else {
            return false;
        };
        if host_word.id != partner_word.id || !host.is_confident_word(self.policy.confident_word) {
            return false;
        }
        let text = &*host_word.text;
        (text.starts_with('(') && host.is_word_first()) || is_possessive(text)
    }

    /// The `role` partner of `id`, if one qualifies.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not on the page or when analysis is cancelled.
    pub fn find_partner(&mut self, id: ElementId, role: ScriptRole) -> Result<Option<ScriptRelation>> {
        let host = self.scope.element(id)?;
        if !self.host_searches(host.covariates(), role) {
            return Ok(None);
        }
        let b = *host.bbox();
        let reach = b.width() / self.policy.reach_divisor.max(1);
        let min_area = self
            .policy
            .min_area_divisor
            .filter(|k| *k > 0)
            .map(|k| b.area() / i64::from(k));
        let center = b.center_y();
        let super_floor = center - (center - b.bottom()) / self.policy.superscript_slack_divisor.max(1);
        let search_edge = b.right() + 1;

        let mut memo = Memo::new();
        for offset in 0..b.height() / 2 {
            let y = match role {
                ScriptRole::Superscript => center + offset,
                ScriptRole::Subscript => center - offset,
            };
            let query = BandQuery::new(Direction::Right, search_edge, y, y + 1).with_origin(b);
            let Some(candidate) = self.next_candidate(id, &b, reach, &query, &mut memo)? else {
                continue;
            };
            let n = candidate.bbox;
            let partner_cov = self.scope.element(candidate.id)?.covariates();
            let fits = min_area.is_none_or(|min| n.area() >= min)
                && n.left() - b.right() <= reach
                && !(self.policy.require_partner_word_first
                    && partner_cov.is_confident_word(self.policy.confident_word)
                    && !partner_cov.is_word_first())
                && match role {
                    ScriptRole::Superscript => {
                        n.bottom() > super_floor
                            && !(self.policy.filter_possessive_superscripts
                                && self.is_word_continuation(host.covariates(), partner_cov))
                    }
                    ScriptRole::Subscript => n.top() < center,
                };
            if !fits {
                memo.reject(candidate.id);
                self.stats.rejected += 1;
                continue;
            }
            self.stats.accepted += 1;
            tracing::trace!(host = %id, partner = %candidate.id, %role, "script partner");
            return Ok(Some(ScriptRelation {
                host: id,
                partner: candidate.id,
                role,
            }));
        }
        Ok(None)
    }

    /// First candidate in `query` that is not trivially out of place.
    ///
    /// Trivial misses are boxes identical to the host, boxes not extending past
    /// its right edge or starting too far back inside it, and boxes vertically
    /// disjoint from it. They are remembered so later bands skip them at once.
    fn next_candidate(
        &mut self,
        id: ElementId,
        b: &BoundingBox,
        reach: i32,
        query: &BandQuery,
        memo: &mut Memo,
    ) -> Result<Option<Candidate>> {
        for candidate in self.scope.index().directional_search(query) {
            self.scope.check_cancel()?;
            self.stats.visited += 1;
            if memo.is_known(candidate.id) {
                continue;
            }
            let n = &candidate.bbox;
            if candidate.id == id
                || n == b
                || n.right() <= b.right()
                || n.left() <= b.right() - reach
                || n.bottom() > b.top()
                || n.top() < b.bottom()
            {
                memo.reject(candidate.id);
                continue;
            }
            return Ok(Some(candidate));
        }
        Ok(None)
    }

    /// Script relations of every element, indexed by element id.
    ///
    /// Each host gets at most one partner per role; partners learn their hosts.
    ///
    /// # Errors
    ///
    /// As [`find_partner`](Self::find_partner), plus an invariant error if a
    /// host were given two partners in one role.
    pub fn analyze_page(&mut self) -> Result<Vec<ScriptRelations>> {
        let page = self.scope.page();
        let mut out = vec![ScriptRelations::default(); page.len()];
        for id in page.ids() {
            for role in ScriptRole::ALL {
                let Some(rel) = self.find_partner(id, role)? else {
                    continue;
                };
                let slot = match role {
                    ScriptRole::Subscript => &mut out[id.index()].subscript,
                    ScriptRole::Superscript => &mut out[id.index()].superscript,
                };
                if slot.replace(rel.partner).is_some() {
                    tracing::error!(host = %id, %role, "second script partner for one role");
                    return Err(RelationError::Invariant(format!(
                        "{id} has more than one {role}"
                    )));
                }
                let partner = &mut out[rel.partner.index()];
                match role {
                    ScriptRole::Subscript => partner.subscript_of.insert_for(rel.partner, id)?,
                    ScriptRole::Superscript => partner.superscript_of.insert_for(rel.partner, id)?,
                };
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isagoge_index::{IndexConfig, Page, PageId, SpatialIndex, WordInfo, WordPosition};
    use std::sync::Arc;

    fn bbox(l: i32, b: i32, r: i32, t: i32) -> BoundingBox {
        BoundingBox::new(l, b, r, t).unwrap()
    }

    fn id(i: usize) -> ElementId {
        ElementId::from_index(i)
    }

    fn build(page: &Page) -> SpatialIndex {
        SpatialIndex::build(page, &IndexConfig::default()).unwrap()
    }

    fn word(word_id: u32, text: &str, position: WordPosition) -> Covariates {
        Covariates {
            validated_word: true,
            confidence: Some(95.0),
            normal_row: true,
            word_position: Some(position),
            word: Some(WordInfo {
                id: word_id,
                text: Arc::from(text),
            }),
        }
    }

    // Host spans y 10..30 with its center at 20.
    fn host_page() -> Page {
        let mut page = Page::with_size(PageId(0), 100, 100).unwrap();
        page.push_box(bbox(0, 10, 20, 30));
        page
    }

    #[test]
    fn superscript_and_subscript_are_found() {
        let mut page = host_page();
        page.push_box(bbox(22, 22, 30, 34)); // 1: raised
        page.push_box(bbox(22, 6, 30, 18)); // 2: lowered
        let index = build(&page);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = ScriptPolicy::default();
        let rel = ScriptAnalyzer::new(&scope, &policy).analyze_page().unwrap();

        assert_eq!(rel[0].superscript, Some(id(1)));
        assert_eq!(rel[0].subscript, Some(id(2)));
        assert_eq!(rel[1].superscript_of.as_slice(), &[id(0)]);
        assert!(rel[2].is_partner(ScriptRole::Subscript));
        assert!(!rel[2].is_partner(ScriptRole::Superscript));
    }

    #[test]
    fn nearest_qualifying_partner_wins() {
        let mut page = host_page();
        page.push_box(bbox(28, 22, 34, 34)); // 1: farther
        page.push_box(bbox(22, 22, 27, 34)); // 2: nearer
        let index = build(&page);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = ScriptPolicy::default();
        let mut analyzer = ScriptAnalyzer::new(&scope, &policy);
        let rel = analyzer.find_partner(id(0), ScriptRole::Superscript).unwrap();
        assert_eq!(rel.map(|r| r.partner), Some(id(2)));

        let all = analyzer.analyze_page().unwrap();
        assert!(all[1].superscript_of.is_empty());
        for r in &all {
            assert!(r.superscript_of.len() + r.subscript_of.len() <= 2);
        }
    }

    #[test]
    fn band_closest_to_center_decides_between_offsets() {
        let mut page = host_page();
        page.push_box(bbox(21, 25, 27, 35)); // 1: nearer, only reached from offset 5
        page.push_box(bbox(28, 20, 34, 31)); // 2: farther, reached at offset 0
        let index = build(&page);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = ScriptPolicy::default();
        let rel = ScriptAnalyzer::new(&scope, &policy).analyze_page().unwrap();

        assert_eq!(rel[0].superscript, Some(id(2)));
        assert_eq!(rel[2].superscript_of.as_slice(), &[id(0)]);
        assert!(rel[1].superscript_of.is_empty());
        let superscripts = rel.iter().filter(|r| r.superscript_of.contains(id(0))).count();
        assert_eq!(superscripts, 1);
    }

    #[test]
    fn centered_neighbor_is_neither() {
        let mut page = host_page();
        page.push_box(bbox(22, 12, 32, 28));
        let index = build(&page);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = ScriptPolicy::default();
        let rel = ScriptAnalyzer::new(&scope, &policy).analyze_page().unwrap();
        assert_eq!(rel[0], ScriptRelations::default());
    }

    #[test]
    fn too_small_or_too_far_is_rejected() {
        let mut page = host_page();
        page.push_box(bbox(22, 24, 24, 26)); // 1: area 4, below 400 / 8
        page.push_box(bbox(33, 22, 40, 34)); // 2: 13 past the edge
        let index = build(&page);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = ScriptPolicy::default();
        let mut analyzer = ScriptAnalyzer::new(&scope, &policy);
        assert_eq!(analyzer.find_partner(id(0), ScriptRole::Superscript).unwrap(), None);
        assert!(analyzer.stats().rejected >= 2);
    }

    #[test]
    fn possessive_superscript_is_filtered() {
        let mut page = Page::with_size(PageId(0), 100, 100).unwrap();
        page.push(bbox(0, 10, 20, 30), word(7, "Taylor's", WordPosition::empty()));
        page.push(bbox(22, 22, 30, 34), word(7, "Taylor's", WordPosition::empty()));
        let index = build(&page);
        let scope = Scope::new(&page, &index).unwrap();

        let policy = ScriptPolicy::default();
        let found = ScriptAnalyzer::new(&scope, &policy)
            .find_partner(id(0), ScriptRole::Superscript)
            .unwrap();
        assert_eq!(found, None);

        let off = ScriptPolicy {
            filter_possessive_superscripts: false,
            ..ScriptPolicy::default()
        };
        let found = ScriptAnalyzer::new(&scope, &off)
            .find_partner(id(0), ScriptRole::Superscript)
            .unwrap();
        assert_eq!(found.map(|r| r.partner), Some(id(1)));
    }

    #[test]
    fn opening_parenthesis_is_filtered_from_the_first_element() {
        let mut page = Page::with_size(PageId(0), 100, 100).unwrap();
        page.push(bbox(0, 10, 20, 30), word(3, "(x)", WordPosition::FIRST));
        page.push(bbox(22, 22, 30, 34), word(3, "(x)", WordPosition::empty()));
        let index = build(&page);
        let scope = Scope::new(&page, &index).unwrap();
        let policy = ScriptPolicy::default();
        let found = ScriptAnalyzer::new(&scope, &policy)
            .find_partner(id(0), ScriptRole::Superscript)
            .unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn word_position_filters() {
        let mut page = Page::with_size(PageId(0), 100, 100).unwrap();
        page.push(bbox(0, 10, 20, 30), word(1, "ab.", WordPosition::FIRST));
        page.push(bbox(22, 6, 30, 18), word(2, "xy", WordPosition::LAST));
        let index = build(&page);
        let scope = Scope::new(&page, &index).unwrap();

        let default = ScriptPolicy::default();
        let found = ScriptAnalyzer::new(&scope, &default)
            .find_partner(id(0), ScriptRole::Subscript)
            .unwrap();
        assert_eq!(found.map(|r| r.partner), Some(id(1)));

        let host_last = ScriptPolicy {
            require_host_word_last: true,
            ..ScriptPolicy::default()
        };
        let mut analyzer = ScriptAnalyzer::new(&scope, &host_last);
        assert_eq!(analyzer.find_partner(id(0), ScriptRole::Subscript).unwrap(), None);

        let partner_first = ScriptPolicy {
            require_partner_word_first: true,
            ..ScriptPolicy::default()
        };
        let mut analyzer = ScriptAnalyzer::new(&scope, &partner_first);
        assert_eq!(analyzer.find_partner(id(0), ScriptRole::Subscript).unwrap(), None);

        let punctuated = ScriptPolicy {
            skip_punctuated_subscript_hosts: true,
            ..ScriptPolicy::default()
        };
        let mut analyzer = ScriptAnalyzer::new(&scope, &punctuated);
        assert_eq!(analyzer.find_partner(id(0), ScriptRole::Subscript).unwrap(), None);
    }

    #[test]
    fn helpers() {
        assert!(is_possessive("Simpson\u{2019}s"));
        assert!(is_possessive("it's"));
        assert!(!is_possessive("its"));
        assert!(ends_with_terminal_punctuation("end."));
        assert!(!ends_with_terminal_punctuation("end"));
    }
}
