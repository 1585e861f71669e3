//! End-to-end driver: load, preprocess, select a test, run the engine, write tables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use log::{info, warn};

use crate::config::{DataType, PipelineConfig};
use crate::data::{ExpressionMatrix, GeneLengths, GroupLabels};
use crate::io;
use crate::preprocessing::{filter_low_variance, log_transform, normalize, z_score};
use crate::testing::engine::{differential_expression_with, Thresholds};
use crate::testing::inference::{HypothesisTests, StatrsTests};
use crate::testing::selection::suggest_method;
use crate::testing::{GeneResult, ResultsTable, TestMethod};

/// Input files of a run
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub expression: PathBuf,
    pub sample_info: PathBuf,
    /// Needed only when raw counts are normalized
    pub gene_lengths: Option<PathBuf>,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub method: TestMethod,
    pub n_genes: usize,
    pub n_samples: usize,
    /// Genes left after z-scoring and the variance filter
    pub n_display_genes: usize,
    pub significant: ResultsTable,
    pub full: ResultsTable,
    /// Significant genes, or the best `top_n` of the full table when none passed
    pub top_genes: Vec<GeneResult>,
    /// Files written, significant table first
    pub written: Vec<PathBuf>,
}

/// Run the pipeline on files and write both result tables into `config.output_dir`.
pub fn run(config: &PipelineConfig, inputs: &PipelineInputs) -> Result<PipelineReport> {
    let matrix = io::read_expression_matrix(&inputs.expression)
        .with_context(|| format!("Failed to read expression matrix {}", inputs.expression.display()))?;
    let labels = io::read_sample_info(&inputs.sample_info, &config.sample_col, &config.group_col)
        .with_context(|| format!("Failed to read sample info {}", inputs.sample_info.display()))?;
    let gene_lengths = inputs
        .gene_lengths
        .as_ref()
        .map(|path| {
            io::read_gene_lengths(path)
                .with_context(|| format!("Failed to read gene lengths {}", path.display()))
        })
        .transpose()?;

    let mut report = analyze(&StatrsTests, config, &matrix, &labels, gene_lengths.as_ref())?;
    report.written = write_tables(config, &report)?;
    Ok(report)
}

/// Run the in-memory part of the pipeline; nothing is written.
pub fn analyze(
    tests: &dyn HypothesisTests,
    config: &PipelineConfig,
    matrix: &ExpressionMatrix,
    labels: &GroupLabels,
    gene_lengths: Option<&GeneLengths>,
) -> Result<PipelineReport> {
    // columns follow the metadata order
    let matrix = matrix
        .select_samples(labels.samples())
        .context("Failed to match expression columns to sample info")?;
    info!("Loaded {} genes and {} samples", matrix.n_genes(), matrix.n_samples());

    let log_expr = match config.data_type {
        DataType::Raw => {
            let counts = match (config.normalization, gene_lengths) {
                (Some(method), Some(lengths)) => {
                    info!("Normalizing raw counts ({}) and applying log2 transformation", method);
                    normalize(&matrix, lengths, method, config.min_expression)
                        .context("Normalization failed")?
                }
                (Some(method), None) => {
                    warn!("{} normalization requested without gene lengths, skipping it", method);
                    matrix.clone()
                }
                (None, _) => {
                    info!("Applying log2 transformation to raw counts");
                    matrix.clone()
                }
            };
            log_transform(&counts).context("Log transform failed")?
        }
        DataType::Normalized => {
            info!("Using pre-normalized expression matrix (assumed log2 transformed)");
            matrix.clone()
        }
    };

    let display = filter_low_variance(&z_score(&log_expr)?, config.variance_threshold)?;
    info!("Retained {} genes after variance filtering", display.n_genes());

    let method = match config.method {
        Some(method) => {
            info!("Using requested method: {}", method);
            method
        }
        None => suggest_method(labels).context("Could not select a test method")?,
    };

    let thresholds = Thresholds {
        log2fc: config.log2fc_thresh,
        pval: config.pval_thresh,
    };
    let output = differential_expression_with(tests, &log_expr, labels, method, thresholds)
        .context("Differential expression failed")?;

    let top_genes: Vec<GeneResult> = if output.significant.is_empty() {
        warn!(
            "No significant genes found, reporting the top {} by adjusted p-value",
            config.top_n
        );
        output.full.top_n(config.top_n).into_iter().cloned().collect()
    } else {
        output.significant.rows().to_vec()
    };

    Ok(PipelineReport {
        method,
        n_genes: log_expr.n_genes(),
        n_samples: log_expr.n_samples(),
        n_display_genes: display.n_genes(),
        significant: output.significant,
        full: output.full,
        top_genes,
        written: Vec::new(),
    })
}

fn write_tables(config: &PipelineConfig, report: &PipelineReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory {}", config.output_dir.display()))?;

    let timestamp = Local::now();
    let significant_path = config
        .output_dir
        .join(io::results_filename("DEG", &config.group_col, &timestamp));
    let full_path = config
        .output_dir
        .join(io::results_filename("DEG_full", &config.group_col, &timestamp));

    io::write_results(&report.significant, &significant_path)
        .with_context(|| format!("Failed to write {}", significant_path.display()))?;
    info!("DEG results saved to: {}", significant_path.display());

    io::write_results(&report.full, &full_path)
        .with_context(|| format!("Failed to write {}", full_path.display()))?;
    info!("Full results saved to: {}", full_path.display());

    Ok(vec![significant_path, full_path])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    #[test]
    fn test_analyze_reorders_columns_to_metadata() {
        // matrix columns are in reverse metadata order
        let matrix = ExpressionMatrix::from_rows(
            vec![vec![100.0, 100.0, 1.0, 1.0], vec![5.0, 6.0, 5.0, 6.0]],
            ids("g", 2),
            vec!["s4".into(), "s3".into(), "s2".into(), "s1".into()],
        )
        .unwrap();
        let labels = GroupLabels::from_pairs([("s1", "a"), ("s2", "a"), ("s3", "b"), ("s4", "b")]).unwrap();

        let report = analyze(&StatrsTests, &PipelineConfig::default(), &matrix, &labels, None).unwrap();
        assert_eq!(report.method, TestMethod::RankSum);
        assert_eq!(report.n_samples, 4);
        assert_eq!(report.full.groups(), &["a".to_string(), "b".to_string()]);
        // b has the larger counts, so the fold change is positive
        assert!(report.full.get("g1").unwrap().log2_fold_change.unwrap() > 0.0);
        assert!(report.written.is_empty());
    }

    #[test]
    fn test_analyze_falls_back_to_top_genes() {
        let matrix = ExpressionMatrix::from_rows(
            vec![vec![1.0, 2.0, 3.0, 4.0], vec![2.0, 2.0, 3.0, 3.0], vec![4.0, 3.0, 2.0, 1.0]],
            ids("g", 3),
            ids("s", 4),
        )
        .unwrap();
        let labels = GroupLabels::from_pairs([("s1", "a"), ("s2", "a"), ("s3", "b"), ("s4", "b")]).unwrap();
        let config = PipelineConfig {
            top_n: 2,
            ..PipelineConfig::default()
        };

        let report = analyze(&StatrsTests, &config, &matrix, &labels, None).unwrap();
        assert!(report.significant.is_empty());
        assert_eq!(report.top_genes.len(), 2);
    }

    #[test]
    fn test_analyze_unknown_sample_fails() {
        let matrix = ExpressionMatrix::from_rows(vec![vec![1.0, 2.0]], ids("g", 1), ids("s", 2)).unwrap();
        let labels = GroupLabels::from_pairs([("s1", "a"), ("s9", "b")]).unwrap();
        assert!(analyze(&StatrsTests, &PipelineConfig::default(), &matrix, &labels, None).is_err());
    }
}
