//! Run configuration with defaults, loadable from YAML.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::preprocessing::NormalizationMethod;
use crate::testing::TestMethod;

/// Whether the expression input still needs normalization and log transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Raw counts
    Raw,
    /// Already normalized and log2 transformed
    Normalized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Metadata column holding the group of each sample
    #[serde(default = "group_col_default")]
    pub group_col: String,
    /// Metadata column holding the sample identifiers
    #[serde(default = "sample_col_default")]
    pub sample_col: String,
    #[serde(default = "data_type_default")]
    pub data_type: DataType,
    /// Explicit test; chosen from the group sizes when absent
    #[serde(default)]
    pub method: Option<TestMethod>,
    /// Normalization of raw counts; needs gene lengths
    #[serde(default)]
    pub normalization: Option<NormalizationMethod>,
    #[serde(default = "log2fc_thresh_default")]
    pub log2fc_thresh: f64,
    #[serde(default = "pval_thresh_default")]
    pub pval_thresh: f64,
    #[serde(default = "min_expression_default")]
    pub min_expression: f64,
    #[serde(default = "variance_threshold_default")]
    pub variance_threshold: f64,
    /// Number of genes reported when nothing passes the thresholds
    #[serde(default = "top_n_default")]
    pub top_n: usize,
    #[serde(default = "output_dir_default")]
    pub output_dir: PathBuf,
}

fn group_col_default() -> String {
    "integration".to_string()
}
fn sample_col_default() -> String {
    "Sample".to_string()
}
fn data_type_default() -> DataType {
    DataType::Raw
}
fn log2fc_thresh_default() -> f64 {
    1.0
}
fn pval_thresh_default() -> f64 {
    0.05
}
fn min_expression_default() -> f64 {
    10.0
}
fn variance_threshold_default() -> f64 {
    0.1
}
fn top_n_default() -> usize {
    20
}
fn output_dir_default() -> PathBuf {
    PathBuf::from(".")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            group_col: group_col_default(),
            sample_col: sample_col_default(),
            data_type: data_type_default(),
            method: None,
            normalization: None,
            log2fc_thresh: log2fc_thresh_default(),
            pval_thresh: pval_thresh_default(),
            min_expression: min_expression_default(),
            variance_threshold: variance_threshold_default(),
            top_n: top_n_default(),
            output_dir: output_dir_default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file; missing keys take their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: PipelineConfig = serde_yaml::from_reader(reader)?;
        config.check();
        Ok(config)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(s)?;
        config.check();
        Ok(config)
    }

    fn check(&self) {
        if !(0.0..=1.0).contains(&self.pval_thresh) {
            warn!("p-value threshold {} is outside [0, 1]", self.pval_thresh);
        }
        if self.log2fc_thresh < 0.0 {
            warn!("Negative log2 fold-change threshold {} keeps every fold change", self.log2fc_thresh);
        }
        if self.normalization.is_some() && self.data_type == DataType::Normalized {
            warn!("Normalization is ignored for pre-normalized input");
        }
    }
}
