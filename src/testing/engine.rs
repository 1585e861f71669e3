//! Per-gene differential expression testing.
//!
//! Genes are tested independently (in parallel with rayon); the Bonferroni
//! correction, significance filter and ordering run only once every gene has
//! finished.

use log::{debug, info};
use rayon::prelude::*;

use crate::data::{ExpressionMatrix, GroupLabels};
use crate::error::{DgeError, Result};
use crate::testing::correction::bonferroni_uncapped;
use crate::testing::effect::log2_fold_change;
use crate::testing::inference::{HypothesisTests, StatrsTests};
use crate::testing::utils::{all_identical, get_group_indices, partition_values};
use crate::testing::{GeneResult, ResultsTable, SkipReason, TestMethod, TestResult};

/// Pseudo count added to group means before taking log2
pub const FOLD_CHANGE_PSEUDO_COUNT: f64 = 1.0;

/// Outcome of testing a single gene
#[derive(Debug, Clone, PartialEq)]
pub enum GeneOutcome {
    Included {
        log2_fold_change: Option<f64>,
        result: TestResult,
    },
    Skipped(SkipReason),
}

/// Both tables produced by a run, plus the genes that were left out.
#[derive(Debug, Clone)]
pub struct DeOutput {
    /// Rows passing the significance thresholds, ascending adjusted p-value
    pub significant: ResultsTable,
    /// Every tested gene, in matrix order
    pub full: ResultsTable,
    /// Genes with no row, and why
    pub skipped: Vec<(String, SkipReason)>,
}

/// Thresholds applied to the full table to select significant genes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum absolute log2 fold change (two-group tests only)
    pub log2fc: f64,
    /// Adjusted p-value cutoff
    pub pval: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            log2fc: 1.0,
            pval: 0.05,
        }
    }
}

impl Thresholds {
    pub fn is_significant(&self, row: &GeneResult, two_group: bool) -> bool {
        let p_ok = row.adjusted_p_value < self.pval;
        if two_group {
            p_ok && row.log2_fold_change.is_some_and(|fc| fc.abs() > self.log2fc)
        } else {
            p_ok
        }
    }
}

/// Test one gene's grouped values.
///
/// `groups` holds the non-missing values per group, in first-occurrence order.
/// Fails with [`DgeError::UnsupportedMethod`] when `method` does not fit the
/// number of groups.
pub fn test_gene(tests: &dyn HypothesisTests, method: TestMethod, groups: &[Vec<f64>]) -> Result<GeneOutcome> {
    method.check_group_count(groups.len())?;
    if groups.iter().any(|g| g.is_empty()) {
        return Ok(GeneOutcome::Skipped(SkipReason::AllMissing));
    }

    if method.is_two_group() {
        let (reference, other) = (&groups[0], &groups[1]);
        let lfc = log2_fold_change(reference, other, FOLD_CHANGE_PSEUDO_COUNT);
        let result = tests.run_two_sample(method, reference, other)?;
        Ok(GeneOutcome::Included {
            log2_fold_change: Some(lfc),
            result,
        })
    } else {
        if all_identical(groups) {
            return Ok(GeneOutcome::Skipped(SkipReason::Degenerate));
        }
        let slices: Vec<&[f64]> = groups.iter().map(|g| g.as_slice()).collect();
        let result = tests.run_k_sample(method, &slices)?;
        Ok(GeneOutcome::Included {
            log2_fold_change: None,
            result,
        })
    }
}

/// Run differential expression with the default statistics back end.
///
/// See [`differential_expression_with`].
pub fn differential_expression(
    matrix: &ExpressionMatrix,
    labels: &GroupLabels,
    method: TestMethod,
    log2fc_thresh: f64,
    pval_thresh: f64,
) -> Result<DeOutput> {
    differential_expression_with(
        &StatrsTests,
        matrix,
        labels,
        method,
        Thresholds {
            log2fc: log2fc_thresh,
            pval: pval_thresh,
        },
    )
}

/// Perform differential expression analysis on every gene of `matrix`.
///
/// The labels are aligned to the matrix columns first. Configuration problems
/// (unlabelled samples, fewer than two groups, a method that does not fit the
/// number of groups) abort before any gene is tested. Genes whose values are
/// missing for a whole group, or constant across all groups in a multi-group
/// test, are left out of both tables.
///
/// For two groups the fold change is `log2(mean(second) + 1) - log2(mean(first) + 1)`
/// where "first" is the group whose label appears first in the aligned labels.
///
/// Adjusted p-values are the raw p-values multiplied by the number of rows in the
/// full table, without capping.
///
/// # Arguments
///
/// * `tests` - Statistics back end
/// * `matrix` - Expression matrix (genes × samples), normally log transformed
/// * `labels` - Group label of every sample in the matrix
/// * `method` - Test family; must match the number of groups
/// * `thresholds` - Fold-change and adjusted p-value cutoffs for the significant table
pub fn differential_expression_with(
    tests: &dyn HypothesisTests,
    matrix: &ExpressionMatrix,
    labels: &GroupLabels,
    method: TestMethod,
    thresholds: Thresholds,
) -> Result<DeOutput> {
    let aligned = labels.align_to(matrix.sample_ids())?;
    let groups = aligned.distinct_groups();
    if groups.len() < 2 {
        return Err(DgeError::invalid_grouping(format!(
            "at least 2 distinct groups are needed for a comparison, found {}",
            groups.len()
        )));
    }
    method.check_group_count(groups.len())?;

    let group_indices = get_group_indices(aligned.labels(), &groups);
    debug!(
        "Testing {} genes across groups {:?} with {}",
        matrix.n_genes(),
        groups,
        method
    );

    let outcomes: Vec<GeneOutcome> = (0..matrix.n_genes())
        .into_par_iter()
        .map(|gene_idx| {
            let values = partition_values(matrix.row(gene_idx), &group_indices);
            test_gene(tests, method, &values)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut skipped = Vec::new();
    let mut tested = Vec::new();
    for (gene_id, outcome) in matrix.gene_ids().iter().zip(outcomes) {
        match outcome {
            GeneOutcome::Included {
                log2_fold_change,
                result,
            } => tested.push((gene_id.clone(), log2_fold_change, result)),
            GeneOutcome::Skipped(reason) => {
                debug!("Skipping gene {}: {}", gene_id, reason);
                skipped.push((gene_id.clone(), reason));
            }
        }
    }

    let p_values: Vec<f64> = tested.iter().map(|(_, _, r)| r.p_value).collect();
    let adjusted = bonferroni_uncapped(&p_values);

    let rows = tested
        .into_iter()
        .zip(adjusted)
        .map(|((gene_id, log2_fold_change, result), adjusted_p_value)| GeneResult {
            gene_id,
            log2_fold_change,
            statistic: result.statistic,
            p_value: result.p_value,
            adjusted_p_value,
        })
        .collect();

    let group_names: Vec<String> = groups.iter().map(|g| g.to_string()).collect();
    let full = ResultsTable::new(method, group_names, rows);
    let two_group = method.is_two_group();
    let significant = full
        .filter(|row| thresholds.is_significant(row, two_group))
        .sorted_by_adjusted_p();

    info!(
        "Tested {} genes ({} skipped), {} significant",
        full.len(),
        skipped.len(),
        significant.len()
    );

    Ok(DeOutput {
        significant,
        full,
        skipped,
    })
}
