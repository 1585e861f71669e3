//! Sample group labels and gene lengths

use std::collections::{HashMap, HashSet};

use crate::error::{DgeError, Result};

/// Mapping from sample identifier to group label.
///
/// Insertion order is kept: group order everywhere in the crate is the order in
/// which distinct labels first appear, never sorted order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLabels {
    samples: Vec<String>,
    labels: Vec<String>,
}

impl GroupLabels {
    pub fn new(samples: Vec<String>, labels: Vec<String>) -> Result<Self> {
        if samples.len() != labels.len() {
            return Err(DgeError::DimensionMismatch {
                expected: format!("{} labels", samples.len()),
                got: format!("{} labels", labels.len()),
            });
        }

        let mut seen = HashSet::with_capacity(samples.len());
        for s in &samples {
            if !seen.insert(s.as_str()) {
                return Err(DgeError::DuplicateId {
                    kind: "sample",
                    id: s.clone(),
                });
            }
        }

        Ok(Self { samples, labels })
    }

    /// Build from `(sample, label)` pairs.
    pub fn from_pairs<S, L, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, L)>,
        S: Into<String>,
        L: Into<String>,
    {
        let (samples, labels) = pairs
            .into_iter()
            .map(|(s, l)| (s.into(), l.into()))
            .unzip();
        Self::new(samples, labels)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn get(&self, sample: &str) -> Option<&str> {
        self.samples
            .iter()
            .position(|s| s == sample)
            .map(|i| self.labels[i].as_str())
    }

    /// Distinct labels in first-occurrence order
    pub fn distinct_groups(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.labels
            .iter()
            .filter(|l| seen.insert(l.as_str()))
            .map(|l| l.as_str())
            .collect()
    }

    /// Sample count per group, in first-occurrence order
    pub fn group_sizes(&self) -> Vec<(&str, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for l in &self.labels {
            *counts.entry(l.as_str()).or_insert(0) += 1;
        }
        self.distinct_groups()
            .into_iter()
            .map(|g| (g, counts.get(g).copied().unwrap_or(0)))
            .collect()
    }

    /// Restrict and reorder the labels to `sample_ids` (the matrix column order).
    ///
    /// Every requested sample must be labelled; labels for samples not in
    /// `sample_ids` are dropped.
    pub fn align_to(&self, sample_ids: &[String]) -> Result<Self> {
        let lookup: HashMap<&str, &str> = self
            .samples
            .iter()
            .zip(self.labels.iter())
            .map(|(s, l)| (s.as_str(), l.as_str()))
            .collect();

        let labels = sample_ids
            .iter()
            .map(|s| {
                lookup
                    .get(s.as_str())
                    .map(|l| l.to_string())
                    .ok_or_else(|| DgeError::UnlabeledSample { sample: s.clone() })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(sample_ids.to_vec(), labels)
    }
}

/// Gene lengths in base pairs, used by length-aware normalization
#[derive(Debug, Clone, Default)]
pub struct GeneLengths {
    lengths: HashMap<String, f64>,
}

impl GeneLengths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, gene: impl Into<String>, length: f64) -> Result<()> {
        let gene = gene.into();
        if !(length.is_finite() && length > 0.0) {
            return Err(DgeError::invalid_input(format!(
                "gene length for '{}' must be positive, got {}",
                gene, length
            )));
        }
        self.lengths.insert(gene, length);
        Ok(())
    }

    pub fn get(&self, gene: &str) -> Option<f64> {
        self.lengths.get(gene).copied()
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

impl FromIterator<(String, f64)> for GeneLengths {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            lengths: iter.into_iter().collect(),
        }
    }
}
