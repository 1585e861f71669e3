//! # rnaseq-dge
//!
//! Differential gene expression analysis for bulk RNA-seq expression matrices.
//!
//! Given a gene × sample expression matrix and a group label per sample, the crate
//! normalizes and log-transforms the data, picks a statistical test from the group
//! structure, tests every gene, applies a Bonferroni-style correction and filters
//! the significant genes.
//!
//! ## Core Features
//!
//! - **Preprocessing**: length/depth normalization, log2 transform, z-scores and variance filtering
//! - **Method selection**: t-test, Wilcoxon rank-sum, one-way ANOVA or Kruskal-Wallis from group sizes
//! - **Differential expression**: per-gene tests with fold changes, run in parallel
//! - **Pipeline**: CSV in, timestamped result tables out
//!
//! ## Module Organization
//!
//! - **[`data`]**: Expression matrix, group labels and gene lengths
//! - **[`preprocessing`]**: Matrix transforms applied before testing
//! - **[`testing`]**: Method selection, hypothesis tests, correction and the per-gene engine
//! - **[`io`]**: Reading input tables and writing result tables
//! - **[`pipeline`]**: The end-to-end driver used by the command line

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod preprocessing;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{DataType, PipelineConfig};
    pub use crate::data::{ExpressionMatrix, GeneLengths, GroupLabels};
    pub use crate::error::{DgeError, Result};
    pub use crate::preprocessing::{
        filter_low_variance, log_transform, normalize, z_score, NormalizationMethod,
    };
    pub use crate::testing::engine::{differential_expression, differential_expression_with, DeOutput, Thresholds};
    pub use crate::testing::inference::{HypothesisTests, StatrsTests};
    pub use crate::testing::selection::{suggest_method, suggest_method_with_reason};
    pub use crate::testing::{GeneResult, ResultsTable, SkipReason, TestMethod};
}
