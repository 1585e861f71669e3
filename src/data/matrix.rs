//! Dense expression matrix (genes x samples)

use std::collections::{HashMap, HashSet};

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{DgeError, Result};

fn ensure_unique(ids: &[String], kind: &'static str) -> Result<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(DgeError::DuplicateId {
                kind,
                id: id.clone(),
            });
        }
    }
    Ok(())
}

/// An expression matrix with gene rows and sample columns.
///
/// Missing measurements are stored as `NaN`. The matrix is never mutated by the
/// analysis: every transform builds a new `ExpressionMatrix`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionMatrix {
    values: Array2<f64>,
    gene_ids: Vec<String>,
    sample_ids: Vec<String>,
}

impl ExpressionMatrix {
    /// Create a new matrix, validating shape, identifier uniqueness and values.
    pub fn new(values: Array2<f64>, gene_ids: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        let (n_genes, n_samples) = values.dim();

        if gene_ids.len() != n_genes {
            return Err(DgeError::DimensionMismatch {
                expected: format!("{} gene IDs", n_genes),
                got: format!("{} gene IDs", gene_ids.len()),
            });
        }

        if sample_ids.len() != n_samples {
            return Err(DgeError::DimensionMismatch {
                expected: format!("{} sample IDs", n_samples),
                got: format!("{} sample IDs", sample_ids.len()),
            });
        }

        ensure_unique(&gene_ids, "gene")?;
        ensure_unique(&sample_ids, "sample")?;

        if values.iter().any(|x| x.is_infinite()) {
            return Err(DgeError::invalid_input(
                "Expression values must be finite or NaN for missing",
            ));
        }

        Ok(Self {
            values,
            gene_ids,
            sample_ids,
        })
    }

    /// Build a matrix from row vectors, mostly useful for small fixtures.
    pub fn from_rows(rows: Vec<Vec<f64>>, gene_ids: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        let n_samples = sample_ids.len();
        let mut flat = Vec::with_capacity(rows.len() * n_samples);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_samples {
                return Err(DgeError::DimensionMismatch {
                    expected: format!("{} values in row {}", n_samples, i),
                    got: format!("{} values", row.len()),
                });
            }
            flat.extend_from_slice(row);
        }
        let values = Array2::from_shape_vec((rows.len(), n_samples), flat)
            .map_err(|e| DgeError::invalid_input(e.to_string()))?;
        Self::new(values, gene_ids, sample_ids)
    }

    /// Replace the values while keeping the identifiers. Used by the transforms.
    pub(crate) fn with_values(&self, values: Array2<f64>) -> Result<Self> {
        Self::new(values, self.gene_ids.clone(), self.sample_ids.clone())
    }

    pub fn n_genes(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Values of one gene across all samples
    pub fn row(&self, gene_idx: usize) -> ArrayView1<'_, f64> {
        self.values.row(gene_idx)
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Keep the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let gene_ids = indices.iter().map(|&i| self.gene_ids[i].clone()).collect();
        Self::new(
            self.values.select(Axis(0), indices),
            gene_ids,
            self.sample_ids.clone(),
        )
    }

    /// Reorder/subset the columns to the given sample identifiers.
    pub fn select_samples(&self, sample_ids: &[String]) -> Result<Self> {
        let positions: HashMap<&str, usize> = self
            .sample_ids
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();

        let indices = sample_ids
            .iter()
            .map(|s| {
                positions.get(s.as_str()).copied().ok_or_else(|| DgeError::InvalidInput {
                    reason: format!("sample '{}' is not a column of the expression matrix", s),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(
            self.values.select(Axis(1), &indices),
            self.gene_ids.clone(),
            sample_ids.to_vec(),
        )
    }
}
