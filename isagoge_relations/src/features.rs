// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feature vectors for the downstream region classifier.
//!
//! Relation counts are squashed into `[0, 1)` with [`exp_normalize`];
//! sub/superscript relations become binary features.

use isagoge_index::Direction;

use crate::page::ElementRelations;
use crate::scripts::ScriptRole;

bitflags::bitflags! {
    /// Which features are emitted, in declaration order.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FeatureSet: u16 {
        /// Normalized count of neighbors covered to the right.
        const COVERED_RIGHT   = 1 << 0;
        /// Normalized count of neighbors covered above.
        const COVERED_UP      = 1 << 1;
        /// Normalized count of neighbors covered below.
        const COVERED_DOWN    = 1 << 2;
        /// Normalized count of neighbors covered to the left.
        const COVERED_LEFT    = 1 << 3;
        /// Normalized count of nested elements.
        const NESTED          = 1 << 4;
        /// Normalized count of stacked elements.
        const STACKED         = 1 << 5;
        /// The element has a subscript.
        const HAS_SUBSCRIPT   = 1 << 6;
        /// The element is a subscript.
        const IS_SUBSCRIPT    = 1 << 7;
        /// The element has a superscript.
        const HAS_SUPERSCRIPT = 1 << 8;
        /// The element is a superscript.
        const IS_SUPERSCRIPT  = 1 << 9;
    }
}

impl Default for FeatureSet {
    /// Everything except leftward coverage, which mirrors rightward coverage
    /// of the neighbor and adds little on its own.
    fn default() -> Self {
        Self::all().difference(Self::COVERED_LEFT)
    }
}

const NAMES: [(FeatureSet, &str); 10] = [
    (FeatureSet::COVERED_RIGHT, "covered_right"),
    (FeatureSet::COVERED_UP, "covered_up"),
    (FeatureSet::COVERED_DOWN, "covered_down"),
    (FeatureSet::COVERED_LEFT, "covered_left"),
    (FeatureSet::NESTED, "nested"),
    (FeatureSet::STACKED, "stacked"),
    (FeatureSet::HAS_SUBSCRIPT, "has_subscript"),
    (FeatureSet::IS_SUBSCRIPT, "is_subscript"),
    (FeatureSet::HAS_SUPERSCRIPT, "has_superscript"),
    (FeatureSet::IS_SUPERSCRIPT, "is_superscript"),
];

impl FeatureSet {
    /// Stable name of a single-flag set, or `None` for other sets.
    pub fn name(self) -> Option<&'static str> {
        NAMES.iter().find(|(flag, _)| *flag == self).map(|(_, name)| *name)
    }
}

/// Map a count onto `[0, 1)` as `1 - e^(-count)`.
pub fn exp_normalize(count: usize) -> f64 {
    let x = f64::from(u32::try_from(count).unwrap_or(u32::MAX));
    1.0 - (-x).exp()
}

fn binary(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

fn value_of(flag: FeatureSet, rel: &ElementRelations) -> f64 {
    let scripts = &rel.scripts;
    if flag == FeatureSet::COVERED_RIGHT {
        exp_normalize(rel.covered_count(Direction::Right))
    } else if flag == FeatureSet::COVERED_UP {
        exp_normalize(rel.covered_count(Direction::Up))
    } else if flag == FeatureSet::COVERED_DOWN {
        exp_normalize(rel.covered_count(Direction::Down))
    } else if flag == FeatureSet::COVERED_LEFT {
        exp_normalize(rel.covered_count(Direction::Left))
    } else if flag == FeatureSet::NESTED {
        exp_normalize(rel.nested_count())
    } else if flag == FeatureSet::STACKED {
        exp_normalize(rel.stacked_count())
    } else if flag == FeatureSet::HAS_SUBSCRIPT {
        binary(scripts.partner(ScriptRole::Subscript).is_some())
    } else if flag == FeatureSet::IS_SUBSCRIPT {
        binary(scripts.is_partner(ScriptRole::Subscript))
    } else if flag == FeatureSet::HAS_SUPERSCRIPT {
        binary(scripts.partner(ScriptRole::Superscript).is_some())
    } else {
        binary(scripts.is_partner(ScriptRole::Superscript))
    }
}

/// Named feature values for one element, in [`FeatureSet`] declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(&'static str, f64)>,
}

impl FeatureVector {
    /// Compute the features selected by `set` from an element's relations.
    pub fn assemble(set: FeatureSet, relations: &ElementRelations) -> Self {
        let entries = NAMES
            .iter()
            .filter(|(flag, _)| set.contains(*flag))
            .map(|(flag, name)| (*name, value_of(*flag, relations)))
            .collect();
        Self { entries }
    }

    /// Number of features.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no features were selected.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the named feature.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    /// Feature names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    /// Feature values in order, as the classifier consumes them.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }
}
