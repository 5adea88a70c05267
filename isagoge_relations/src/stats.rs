// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::AddAssign;

/// Counters for one analyzer invocation.
///
/// Statistics are local to an invocation; nothing is accumulated globally.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalyzerStats {
    /// Candidates pulled from cursors, including skipped ones.
    pub visited: usize,
    /// Candidates that passed the acceptance test.
    pub accepted: usize,
    /// Candidates tested and rejected.
    pub rejected: usize,
}

impl AddAssign for AnalyzerStats {
    fn add_assign(&mut self, rhs: Self) {
        self.visited += rhs.visited;
        self.accepted += rhs.accepted;
        self.rejected += rhs.rejected;
    }
}

/// Statistics for one page, per analyzer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageStats {
    /// Coverage analysis.
    pub coverage: AnalyzerStats,
    /// Nesting analysis.
    pub nesting: AnalyzerStats,
    /// Stacking analysis.
    pub stacking: AnalyzerStats,
    /// Sub/superscript analysis.
    pub scripts: AnalyzerStats,
}
