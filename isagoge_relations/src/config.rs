// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Analyzer policies and the page-level analysis configuration.
//!
//! Every threshold is a named field with a default equal to the tuned value.
//! Ratio thresholds are expressed as integer divisors so that all comparisons
//! stay in exact integer arithmetic; setting one to `None` disables that test.
//! Heuristics that depend on upstream word recognition are separate toggles.

use isagoge_index::IndexConfig;

use crate::features::FeatureSet;

/// Tuning for coverage analysis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CoveragePolicy {
    /// A neighbor's gap must be at most `extent / gap_divisor`.
    ///
    /// Aggregate searches use the divisor carried by their reference instead.
    pub gap_divisor: Option<i32>,
    /// A neighbor's area must exceed `extent / min_area_divisor`.
    pub min_area_divisor: Option<i32>,
    /// A neighbor's gap must be less than `max_gap_to_size` times its larger side.
    pub max_gap_to_size: Option<i32>,
    /// Require the neighbor's center on the cross axis to lie within the reference span.
    pub require_cross_alignment: bool,
    /// Report no coverage for elements of a validated word on a normal text row.
    pub skip_normal_text_words: bool,
}

impl CoveragePolicy {
    /// Default for [`gap_divisor`](Self::gap_divisor).
    pub const GAP_DIVISOR: i32 = 2;
    /// Gap divisor used against merged references in aggregate mode.
    pub const AGGREGATE_GAP_DIVISOR: i32 = 4;
    /// Default for [`min_area_divisor`](Self::min_area_divisor).
    pub const MIN_AREA_DIVISOR: i32 = 32;
    /// Default for [`max_gap_to_size`](Self::max_gap_to_size).
    pub const MAX_GAP_TO_SIZE: i32 = 2;
}

impl Default for CoveragePolicy {
    fn default() -> Self {
        Self {
            gap_divisor: Some(Self::GAP_DIVISOR),
            min_area_divisor: Some(Self::MIN_AREA_DIVISOR),
            max_gap_to_size: Some(Self::MAX_GAP_TO_SIZE),
            require_cross_alignment: true,
            skip_normal_text_words: false,
        }
    }
}

/// Tuning for nesting analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NestingPolicy {
    /// A nested element's area must exceed `area(host) / min_area_divisor`.
    pub min_area_divisor: Option<i32>,
}

impl NestingPolicy {
    /// Default for [`min_area_divisor`](Self::min_area_divisor).
    pub const MIN_AREA_DIVISOR: i32 = 64;
}

impl Default for NestingPolicy {
    fn default() -> Self {
        Self {
            min_area_divisor: Some(Self::MIN_AREA_DIVISOR),
        }
    }
}

/// Tuning for stacking analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StackingPolicy {
    /// A stacked element's area must be at least `area(host) / min_area_divisor`.
    pub min_area_divisor: Option<i32>,
    /// The gap to the previous chain link must be at most the host's extent
    /// along the search direction divided by this.
    pub max_gap_divisor: Option<i32>,
    /// Report no stacking for elements of a validated word or a normal text row,
    /// and never stack such elements onto others.
    pub skip_normal_text: bool,
}

impl StackingPolicy {
    /// Default for [`min_area_divisor`](Self::min_area_divisor).
    pub const MIN_AREA_DIVISOR: i32 = 16;
    /// Default for [`max_gap_divisor`](Self::max_gap_divisor).
    pub const MAX_GAP_DIVISOR: i32 = 2;
}

impl Default for StackingPolicy {
    fn default() -> Self {
        Self {
            min_area_divisor: Some(Self::MIN_AREA_DIVISOR),
            max_gap_divisor: Some(Self::MAX_GAP_DIVISOR),
            skip_normal_text: false,
        }
    }
}

/// Tuning for sub/superscript analysis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ScriptPolicy {
    /// A partner may start at most `width(host) / reach_divisor` past the host's right edge,
    /// and must start later than that distance before it.
    pub reach_divisor: i32,
    /// A partner's area must be at least `area(host) / min_area_divisor`.
    pub min_area_divisor: Option<i32>,
    /// A superscript's bottom may dip below the host's vertical center by at most
    /// `(center - bottom) / superscript_slack_divisor`.
    pub superscript_slack_divisor: i32,
    /// Word confidence at or above which upstream recognition is trusted.
    pub confident_word: f32,
    /// Word confidence required by the punctuation filter.
    pub very_confident_word: f32,
    /// Skip subscript search for hosts in a very confident word on a normal row
    /// ending in `.`, `,` or `?`.
    pub skip_punctuated_subscript_hosts: bool,
    /// A host inside a validated word only looks for scripts when it is the word's last element.
    pub require_host_word_last: bool,
    /// A partner in a confident word must be that word's first element.
    pub require_partner_word_first: bool,
    /// Discard superscripts that are really the rest of a confident word shared
    /// with the host: a word opening with `(` seen from its first element, or a
    /// possessive ending in `'s`.
    pub filter_possessive_superscripts: bool,
}

impl ScriptPolicy {
    /// Default for [`reach_divisor`](Self::reach_divisor).
    pub const REACH_DIVISOR: i32 = 2;
    /// Default for [`min_area_divisor`](Self::min_area_divisor).
    pub const MIN_AREA_DIVISOR: i32 = 8;
    /// Default for [`superscript_slack_divisor`](Self::superscript_slack_divisor).
    pub const SUPERSCRIPT_SLACK_DIVISOR: i32 = 8;
    /// Default for [`confident_word`](Self::confident_word).
    pub const CONFIDENT_WORD: f32 = 80.0;
    /// Default for [`very_confident_word`](Self::very_confident_word).
    pub const VERY_CONFIDENT_WORD: f32 = 90.0;
}

impl Default for ScriptPolicy {
    fn default() -> Self {
        Self {
            reach_divisor: Self::REACH_DIVISOR,
            min_area_divisor: Some(Self::MIN_AREA_DIVISOR),
            superscript_slack_divisor: Self::SUPERSCRIPT_SLACK_DIVISOR,
            confident_word: Self::CONFIDENT_WORD,
            very_confident_word: Self::VERY_CONFIDENT_WORD,
            skip_punctuated_subscript_hosts: false,
            require_host_word_last: false,
            require_partner_word_first: false,
            filter_possessive_superscripts: true,
        }
    }
}

/// Everything needed to analyze a page.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AnalysisConfig {
    /// Index construction.
    pub index: IndexConfig,
    /// Coverage analysis.
    pub coverage: CoveragePolicy,
    /// Nesting analysis.
    pub nesting: NestingPolicy,
    /// Stacking analysis.
    pub stacking: StackingPolicy,
    /// Sub/superscript analysis.
    pub scripts: ScriptPolicy,
    /// Features emitted per element.
    pub features: FeatureSet,
}
