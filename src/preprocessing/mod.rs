//! Stateless matrix transforms applied before testing.
//!
//! Every function here takes an [`ExpressionMatrix`] by reference and returns a new
//! one. Row statistics skip missing (`NaN`) values.

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::data::{ExpressionMatrix, GeneLengths};
use crate::error::{DgeError, Result};

/// Library-size normalization applied to raw counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizationMethod {
    /// Reads per kilobase, then each sample scaled by its RPK total / 1e6 (TPM-like)
    #[serde(alias = "raw", alias = "tpm")]
    ScaledDepth,
    /// Reads per kilobase, divided by the sample's raw total count and multiplied by 1e6
    #[serde(alias = "FPKM")]
    Fpkm,
}

impl FromStr for NormalizationMethod {
    type Err = DgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "scaled-depth" | "raw" | "tpm" => Ok(NormalizationMethod::ScaledDepth),
            "fpkm" => Ok(NormalizationMethod::Fpkm),
            _ => Err(DgeError::unsupported_method(
                s,
                "normalization must be 'scaled-depth' or 'FPKM'",
            )),
        }
    }
}

impl fmt::Display for NormalizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationMethod::ScaledDepth => write!(f, "scaled-depth"),
            NormalizationMethod::Fpkm => write!(f, "FPKM"),
        }
    }
}

fn finite_values(row: ArrayView1<'_, f64>) -> impl Iterator<Item = f64> + '_ {
    row.into_iter().copied().filter(|x| !x.is_nan())
}

/// Mean of the non-missing values, `NaN` if there are none.
pub(crate) fn nan_mean(row: ArrayView1<'_, f64>) -> f64 {
    let (sum, n) = finite_values(row).fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Variance of the non-missing values with `ddof` degrees of freedom removed.
pub(crate) fn nan_variance(row: ArrayView1<'_, f64>, ddof: usize) -> f64 {
    let mean = nan_mean(row);
    let (ss, n) = finite_values(row).fold((0.0, 0usize), |(s, n), x| (s + (x - mean).powi(2), n + 1));
    if n <= ddof { f64::NAN } else { ss / (n - ddof) as f64 }
}

/// Normalize raw counts for gene length and sequencing depth.
///
/// Genes whose total count across samples is below `min_expression` are dropped
/// first. Every remaining gene must have a length in `gene_lengths`.
///
/// # Arguments
///
/// * `counts` - Raw count matrix (genes × samples)
/// * `gene_lengths` - Gene lengths in base pairs
/// * `method` - Scaling scheme applied after the per-kilobase step
/// * `min_expression` - Minimum row total for a gene to be kept
///
/// # Returns
///
/// A new matrix holding the retained genes, normalized.
pub fn normalize(
    counts: &ExpressionMatrix,
    gene_lengths: &GeneLengths,
    method: NormalizationMethod,
    min_expression: f64,
) -> Result<ExpressionMatrix> {
    let kept: Vec<usize> = (0..counts.n_genes())
        .filter(|&i| counts.row(i).iter().filter(|x| !x.is_nan()).sum::<f64>() >= min_expression)
        .collect();

    let dropped = counts.n_genes() - kept.len();
    if dropped > 0 {
        info!(
            "Dropped {} of {} genes with total count below {}",
            dropped,
            counts.n_genes(),
            min_expression
        );
    }

    let filtered = counts.select_rows(&kept)?;
    let lengths = filtered
        .gene_ids()
        .iter()
        .map(|g| {
            gene_lengths
                .get(g)
                .ok_or_else(|| DgeError::MissingGeneLength { gene: g.clone() })
        })
        .collect::<Result<Vec<f64>>>()?;

    let raw = filtered.values();
    let mut rpk = raw.to_owned();
    for (mut row, &len) in rpk.axis_iter_mut(Axis(0)).zip(lengths.iter()) {
        row.mapv_inplace(|c| c / len * 1e3);
    }

    let scale: Vec<f64> = match method {
        NormalizationMethod::ScaledDepth => rpk
            .axis_iter(Axis(1))
            .map(|col| col.iter().filter(|x| !x.is_nan()).sum::<f64>() / 1e6)
            .collect(),
        NormalizationMethod::Fpkm => raw
            .axis_iter(Axis(1))
            .map(|col| col.iter().filter(|x| !x.is_nan()).sum::<f64>() / 1e6)
            .collect(),
    };

    for (mut col, &factor) in rpk.axis_iter_mut(Axis(1)).zip(scale.iter()) {
        col.mapv_inplace(|v| v / factor);
    }

    debug!("Normalized {} genes with {}", filtered.n_genes(), method);
    filtered.with_values(rpk)
}

/// Element-wise `log2(x + 1)`.
///
/// Negative values are rejected; missing values stay missing.
pub fn log_transform(matrix: &ExpressionMatrix) -> Result<ExpressionMatrix> {
    if let Some(v) = matrix.values().iter().find(|&&x| x < 0.0) {
        return Err(DgeError::invalid_input(format!(
            "log transform requires non-negative values, found {}",
            v
        )));
    }
    matrix.with_values(matrix.values().mapv(|x| (x + 1.0).log2()))
}

/// Row-wise standardization `(x - mean) / std` using the population standard
/// deviation. Constant rows come out as `NaN`.
pub fn z_score(matrix: &ExpressionMatrix) -> Result<ExpressionMatrix> {
    let mut out = Array2::<f64>::zeros(matrix.values().dim());
    for (i, row) in matrix.values().axis_iter(Axis(0)).enumerate() {
        // constant rows are NaN even when the mean is inexact
        let mut present = finite_values(row);
        let constant = match present.next() {
            Some(first) => present.all(|x| x == first),
            None => true,
        };
        if constant {
            out.row_mut(i).fill(f64::NAN);
            continue;
        }
        let mean = nan_mean(row);
        let std = nan_variance(row, 0).sqrt();
        for (j, &x) in row.iter().enumerate() {
            out[[i, j]] = (x - mean) / std;
        }
    }
    matrix.with_values(out)
}

/// Keep genes whose sample variance is strictly greater than `threshold`.
///
/// An empty result is valid.
pub fn filter_low_variance(matrix: &ExpressionMatrix, threshold: f64) -> Result<ExpressionMatrix> {
    let kept: Vec<usize> = matrix
        .values()
        .axis_iter(Axis(0))
        .enumerate()
        .filter(|(_, row)| nan_variance(*row, 1) > threshold)
        .map(|(i, _)| i)
        .collect();

    debug!(
        "Variance filter kept {} of {} genes (threshold {})",
        kept.len(),
        matrix.n_genes(),
        threshold
    );
    matrix.select_rows(&kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn counts() -> ExpressionMatrix {
        ExpressionMatrix::from_rows(
            vec![
                vec![100.0, 200.0, 300.0],
                vec![1.0, 2.0, 3.0],
                vec![50.0, 50.0, 100.0],
            ],
            ids("g", 3),
            ids("s", 3),
        )
        .unwrap()
    }

    fn lengths() -> GeneLengths {
        vec![
            ("g1".to_string(), 2000.0),
            ("g2".to_string(), 500.0),
            ("g3".to_string(), 1000.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_normalize_drops_low_genes() {
        let norm = normalize(&counts(), &lengths(), NormalizationMethod::ScaledDepth, 10.0).unwrap();
        assert_eq!(norm.gene_ids(), &["g1".to_string(), "g3".to_string()]);
    }

    #[test]
    fn test_scaled_depth_columns_sum_to_one_million() {
        let norm = normalize(&counts(), &lengths(), NormalizationMethod::ScaledDepth, 0.0).unwrap();
        for col in norm.values().axis_iter(Axis(1)) {
            assert_relative_eq!(col.sum(), 1e6, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_fpkm_values() {
        let norm = normalize(&counts(), &lengths(), NormalizationMethod::Fpkm, 10.0).unwrap();
        // g1, s1: rpk = 100 / 2000 * 1000 = 50; raw total of s1 after filter = 150
        assert_relative_eq!(norm.values()[[0, 0]], 50.0 / 150.0 * 1e6, max_relative = 1e-12);
        // g3, s3: rpk = 100; raw total of s3 = 400
        assert_relative_eq!(norm.values()[[1, 2]], 100.0 / 400.0 * 1e6, max_relative = 1e-12);
    }

    #[test]
    fn test_normalize_needs_gene_lengths() {
        let mut partial = GeneLengths::new();
        partial.insert("g1", 1000.0).unwrap();
        let result = normalize(&counts(), &partial, NormalizationMethod::Fpkm, 10.0);
        assert!(matches!(result, Err(DgeError::MissingGeneLength { .. })));
    }

    #[test]
    fn test_unknown_normalization_method() {
        assert_eq!("FPKM".parse::<NormalizationMethod>().unwrap(), NormalizationMethod::Fpkm);
        assert_eq!("raw".parse::<NormalizationMethod>().unwrap(), NormalizationMethod::ScaledDepth);
        assert!(matches!(
            "RPKM-ish".parse::<NormalizationMethod>(),
            Err(DgeError::UnsupportedMethod { .. })
        ));
    }

    #[test]
    fn test_log_transform() {
        let m = ExpressionMatrix::from_rows(vec![vec![0.0, 1.0, 3.0, f64::NAN]], ids("g", 1), ids("s", 4)).unwrap();
        let logged = log_transform(&m).unwrap();
        let row = logged.row(0);
        assert_eq!(row[0], 0.0);
        assert_eq!(row[1], 1.0);
        assert_eq!(row[2], 2.0);
        assert!(row[3].is_nan());
    }

    #[test]
    fn test_log_transform_rejects_negative() {
        let m = ExpressionMatrix::from_rows(vec![vec![-1.0, 1.0]], ids("g", 1), ids("s", 2)).unwrap();
        assert!(log_transform(&m).is_err());
    }

    #[test]
    fn test_z_score_constant_row_is_nan() {
        let m = ExpressionMatrix::from_rows(vec![vec![4.0, 4.0, 4.0]], ids("g", 1), ids("s", 3)).unwrap();
        let z = z_score(&m).unwrap();
        assert!(z.row(0).iter().all(|x| x.is_nan()));
    }

    #[test]
    fn test_z_score_inexact_constant_rows_are_nan() {
        let m = ExpressionMatrix::from_rows(
            vec![vec![0.1, 0.1, 0.1], vec![0.7, 0.7, f64::NAN], vec![1.0, 2.0, 3.0]],
            ids("g", 3),
            ids("s", 3),
        )
        .unwrap();
        let z = z_score(&m).unwrap();
        assert!(z.row(0).iter().all(|x| x.is_nan()));
        assert!(z.row(1).iter().all(|x| x.is_nan()));
        assert_relative_eq!(z.row(2)[2], 1.224744871391589, epsilon = 1e-12);
    }

    #[test]
    fn test_filter_low_variance_uses_sample_variance() {
        // sample variance of [1, 2, 3] is 1.0
        let m = ExpressionMatrix::from_rows(
            vec![vec![1.0, 2.0, 3.0], vec![1.0, 1.1, 1.2]],
            ids("g", 2),
            ids("s", 3),
        )
        .unwrap();
        let kept = filter_low_variance(&m, 0.1).unwrap();
        assert_eq!(kept.gene_ids(), &["g1".to_string()]);

        let none = filter_low_variance(&m, 1.0).unwrap();
        assert!(none.is_empty());
        assert_eq!(none.n_samples(), 3);
    }
}
