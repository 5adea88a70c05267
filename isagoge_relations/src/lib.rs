// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Isagoge Relations: geometric relations between page elements for finding math regions.
//!
//! Built on the [`isagoge_index`] grid, four independent analyzers turn raw
//! element boxes into relation sets that a downstream classifier consumes as
//! features:
//!
//! - [`CoverageAnalyzer`]: aligned, close, non-trivial neighbors in each direction.
//! - [`NestingAnalyzer`]: elements properly and substantially inside another.
//! - [`StackingAnalyzer`]: chains of adjacent elements above and below.
//! - [`ScriptAnalyzer`]: at most one subscript and one superscript partner to the right.
//!
//! Each analyzer reads a shared [`Scope`] (a page and the index built from it)
//! and keeps its own accept/reject memo per search, so results never depend on
//! the order analyzers or elements are processed in. [`PageAnalyzer`] runs all
//! four over a page and assembles [`PageRelations`]; [`analyze_pages`] does so
//! for many independent pages.
//!
//! All thresholds live in the policy structs of [`AnalysisConfig`].
//!
//! ## Features
//!
//! - `parallel` *(default)*: run the analyzers of a page, and separate pages, on the rayon pool.
//! - `serde`: derive `Serialize`/`Deserialize` for the configuration and statistics types.
//!
//! # Example
//!
//! ```rust
//! use isagoge_index::{BoundingBox, Page, PageId};
//! use isagoge_relations::{AnalysisConfig, PageAnalyzer, ScriptRole};
//!
//! let mut page = Page::with_size(PageId(0), 100, 100)?;
//! let x = page.push_box(BoundingBox::new(10, 50, 30, 70)?);
//! let two = page.push_box(BoundingBox::new(32, 62, 40, 74)?);
//!
//! let config = AnalysisConfig::default();
//! let relations = PageAnalyzer::new(&config).analyze(&page)?;
//!
//! let host = relations.get(x).unwrap();
//! assert_eq!(host.scripts.partner(ScriptRole::Superscript), Some(two));
//! let features = host.features(config.features);
//! assert_eq!(features.get("has_superscript"), Some(1.0));
//! # Ok::<(), isagoge_relations::RelationError>(())
//! ```

mod cancel;
mod config;
mod coverage;
mod error;
mod features;
mod memo;
mod nesting;
mod page;
mod scope;
mod scripts;
mod set;
mod stacking;
mod stats;

pub use cancel::CancelFlag;
pub use config::{AnalysisConfig, CoveragePolicy, NestingPolicy, ScriptPolicy, StackingPolicy};
pub use coverage::{CoverageAnalyzer, CoverageReference, CoverageRelations, is_neighbor_covered};
pub use error::{RelationError, Result};
pub use features::{FeatureSet, FeatureVector, exp_normalize};
pub use nesting::NestingAnalyzer;
pub use page::{ElementRelations, PageAnalyzer, PageRelations, analyze_pages};
pub use scope::Scope;
pub use scripts::{ScriptAnalyzer, ScriptRelation, ScriptRelations, ScriptRole};
pub use set::RelationSet;
pub use stacking::{StackingAnalyzer, StackingRelations, is_adjacent};
pub use stats::{AnalyzerStats, PageStats};
