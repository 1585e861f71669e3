//! Command-line interface for rnaseq-dge

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DataType, PipelineConfig};
use crate::error::Result;
use crate::pipeline::PipelineInputs;
use crate::preprocessing::NormalizationMethod;
use crate::testing::TestMethod;

#[derive(Parser, Debug)]
#[command(name = "rnaseq-dge")]
#[command(version)]
#[command(about = "Differential gene expression analysis for bulk RNA-seq")]
#[command(after_long_help = "\
Examples:
  # Auto-selected test on raw counts, grouped by the 'integration' column
  rnaseq-dge --expression expr.csv --sample-info sample_info.csv

  # FPKM normalization with gene lengths and an explicit Kruskal-Wallis test
  rnaseq-dge --expression counts.csv --sample-info info.csv --gene-lengths lengths.csv \\
    --normalization fpkm --group-col fusion --method kruskal")]
pub struct Cli {
    /// Path to expression matrix CSV file
    #[arg(short, long,
        long_help = "Path to expression matrix CSV file.\n\
            Format: first column = gene IDs, remaining columns = one per sample.\n\
            Supports both CSV (comma) and TSV (tab) delimiters (auto-detected).")]
    pub expression: PathBuf,

    /// Path to sample metadata CSV file
    #[arg(short, long,
        long_help = "Path to sample metadata CSV file.\n\
            Must contain a sample ID column (default 'Sample') and the group column.")]
    pub sample_info: PathBuf,

    /// Gene lengths CSV (gene,length); required for normalization
    #[arg(long)]
    pub gene_lengths: Option<PathBuf>,

    /// YAML configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Metadata column to group by [default: integration]
    #[arg(short, long)]
    pub group_col: Option<String>,

    /// Metadata column holding sample IDs [default: Sample]
    #[arg(long)]
    pub sample_col: Option<String>,

    /// Whether the expression data is raw counts or already normalized [default: raw]
    #[arg(long, value_enum)]
    pub data_type: Option<DataType>,

    /// Statistical test: ttest, wilcoxon, anova, kruskal [default: auto-select]
    #[arg(short, long)]
    pub method: Option<TestMethod>,

    /// Normalization of raw counts: scaled-depth or fpkm
    #[arg(short, long)]
    pub normalization: Option<NormalizationMethod>,

    /// Absolute log2 fold-change threshold [default: 1.0]
    #[arg(long)]
    pub log2fc_thresh: Option<f64>,

    /// Adjusted p-value threshold [default: 0.05]
    #[arg(long)]
    pub pval_thresh: Option<f64>,

    /// Minimum total count for a gene to survive normalization [default: 10]
    #[arg(long)]
    pub min_expression: Option<f64>,

    /// Variance threshold of the z-scored display matrix [default: 0.1]
    #[arg(long)]
    pub variance_threshold: Option<f64>,

    /// Genes reported when nothing is significant [default: 20]
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Output directory for result tables [default: .]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the run configuration: file values first, then command-line overrides.
    pub fn to_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_yaml_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(v) = &self.group_col {
            config.group_col = v.clone();
        }
        if let Some(v) = &self.sample_col {
            config.sample_col = v.clone();
        }
        if let Some(v) = self.data_type {
            config.data_type = v;
        }
        if self.method.is_some() {
            config.method = self.method;
        }
        if self.normalization.is_some() {
            config.normalization = self.normalization;
        }
        if let Some(v) = self.log2fc_thresh {
            config.log2fc_thresh = v;
        }
        if let Some(v) = self.pval_thresh {
            config.pval_thresh = v;
        }
        if let Some(v) = self.min_expression {
            config.min_expression = v;
        }
        if let Some(v) = self.variance_threshold {
            config.variance_threshold = v;
        }
        if let Some(v) = self.top_n {
            config.top_n = v;
        }
        if let Some(v) = &self.output_dir {
            config.output_dir = v.clone();
        }

        Ok(config)
    }

    pub fn inputs(&self) -> PipelineInputs {
        PipelineInputs {
            expression: self.expression.clone(),
            sample_info: self.sample_info.clone(),
            gene_lengths: self.gene_lengths.clone(),
        }
    }
}
